//! Liquidity-position statistics for one account

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account's stake in a single pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPosition {
    pub pair_id: String,
    pub liquidity_token_balance: Decimal,
    pub usd_value: Decimal,
    pub fees_earned_usd: Decimal,
    pub impermanent_loss_usd: Decimal,
}

/// Aggregated positions of one account across pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub account: String,
    pub positions: Vec<PairPosition>,
}

impl PositionSnapshot {
    pub fn position_for(&self, pair_id: &str) -> Option<&PairPosition> {
        self.positions
            .iter()
            .find(|position| position.pair_id.eq_ignore_ascii_case(pair_id))
    }

    pub fn total_usd_value(&self) -> Decimal {
        self.positions.iter().map(|position| position.usd_value).sum()
    }

    pub fn total_fees_earned_usd(&self) -> Decimal {
        self.positions
            .iter()
            .map(|position| position.fees_earned_usd)
            .sum()
    }
}
