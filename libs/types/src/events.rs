//! Recent on-chain pair events

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single swap against the pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapEvent {
    /// Transaction hash
    pub id: String,
    pub timestamp: i64,
    pub sender: String,
    pub to: String,
    pub amount0_in: Decimal,
    pub amount1_in: Decimal,
    pub amount0_out: Decimal,
    pub amount1_out: Decimal,
    pub amount_usd: Decimal,
}

impl SwapEvent {
    /// True when token0 was sold into the pool
    pub fn sells_token0(&self) -> bool {
        self.amount0_in > Decimal::ZERO
    }
}

/// Liquidity added to or removed from the pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityChange {
    /// Transaction hash
    pub id: String,
    pub timestamp: i64,
    pub sender: Option<String>,
    pub liquidity: Decimal,
    pub amount0: Decimal,
    pub amount1: Decimal,
    pub amount_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LiquidityEvent {
    Mint(LiquidityChange),
    Burn(LiquidityChange),
}

impl LiquidityEvent {
    pub fn change(&self) -> &LiquidityChange {
        match self {
            LiquidityEvent::Mint(change) | LiquidityEvent::Burn(change) => change,
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.change().timestamp
    }

    pub fn is_mint(&self) -> bool {
        matches!(self, LiquidityEvent::Mint(_))
    }
}
