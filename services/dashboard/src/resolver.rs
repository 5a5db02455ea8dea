//! Balance and allowance resolution
//!
//! For a connected account and a pair this resolves seven chain values
//! concurrently (native balance, then balance + allowance for token0, token1
//! and the pair token) and joins them all-or-nothing into a [`BalanceMap`].
//! Missing token addresses fail the resolution before any query is issued.

use crate::client::{bounded, ChainQuery};
use crate::config::DashboardConfig;
use crate::constants::{NATIVE_DECIMALS, PAIR_TOKEN_DECIMALS};
use crate::error::{DashboardError, Result};
use ethers_core::types::U256;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use types::{BalanceMap, PairSnapshot, TokenBalanceEntry, TokenInfo, CURRENT_PAIR_KEY};

/// Chooses the spender whose allowance matters for a token.
///
/// Constituent tokens are spent by the add-liquidity contract; the pair's own
/// liquidity token is spent by the remove-liquidity contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpenderRouting {
    pub add_liquidity: String,
    pub remove_liquidity: String,
}

impl SpenderRouting {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            add_liquidity: config.add_liquidity_spender.clone(),
            remove_liquidity: config.remove_liquidity_spender.clone(),
        }
    }

    pub fn spender_for(&self, token: &str, pair: &PairSnapshot) -> &str {
        if token.eq_ignore_ascii_case(&pair.id) {
            &self.remove_liquidity
        } else {
            &self.add_liquidity
        }
    }
}

pub struct BalanceResolver {
    chain: Arc<dyn ChainQuery>,
    spenders: SpenderRouting,
    native_address: String,
    native_symbol: String,
    timeout: Duration,
}

impl BalanceResolver {
    pub fn new(chain: Arc<dyn ChainQuery>, config: &DashboardConfig) -> Self {
        Self {
            chain,
            spenders: SpenderRouting::from_config(config),
            native_address: config.native_token_address.clone(),
            native_symbol: config.native_symbol.clone(),
            timeout: config.chain_query_timeout(),
        }
    }

    pub fn spenders(&self) -> &SpenderRouting {
        &self.spenders
    }

    pub async fn resolve(&self, account: &str, pair: &PairSnapshot) -> Result<BalanceMap> {
        let token0 = required_address(pair, &pair.token0, "token0")?;
        let token1 = required_address(pair, &pair.token1, "token1")?;
        if pair.id.is_empty() {
            return Err(DashboardError::MissingAddress {
                pair_id: pair.id.clone(),
                token: "pair token",
            });
        }

        let (native, (token0_balance, token0_allowance), (token1_balance, token1_allowance), (pair_balance, pair_allowance)) =
            tokio::try_join!(
                bounded("native_balance", self.timeout, self.chain.native_balance(account)),
                self.token_position(token0, account, pair),
                self.token_position(token1, account, pair),
                self.token_position(&pair.id, account, pair),
            )
            .inspect_err(|e| warn!("Could not fetch balances for {} on {}: {}", account, pair.id, e))?;

        let mut balances = BalanceMap::new();
        balances.insert(
            self.native_symbol.clone(),
            TokenBalanceEntry {
                token_id: self.native_address.clone(),
                symbol: self.native_symbol.clone(),
                decimals: NATIVE_DECIMALS,
                balance: native,
                allowance: U256::zero(),
            },
        )?;
        balances.insert(
            pair.token0.symbol.clone(),
            constituent_entry(token0, &pair.token0, token0_balance, token0_allowance),
        )?;
        balances.insert(
            pair.token1.symbol.clone(),
            constituent_entry(token1, &pair.token1, token1_balance, token1_allowance),
        )?;
        balances.insert(
            CURRENT_PAIR_KEY,
            TokenBalanceEntry {
                token_id: pair.id.clone(),
                symbol: pair.pair_symbol(),
                decimals: PAIR_TOKEN_DECIMALS,
                balance: pair_balance,
                allowance: pair_allowance,
            },
        )?;

        debug!(account, pair = %pair.id, entries = balances.len(), "balances resolved");
        Ok(balances)
    }

    /// Balance and routed allowance of one token
    async fn token_position(&self, token: &str, account: &str, pair: &PairSnapshot) -> Result<(U256, U256)> {
        let spender = self.spenders.spender_for(token, pair);
        tokio::try_join!(
            bounded("balance_of", self.timeout, self.chain.balance_of(token, account)),
            bounded("allowance", self.timeout, self.chain.allowance(token, account, spender)),
        )
    }
}

fn required_address<'a>(pair: &PairSnapshot, token: &'a TokenInfo, side: &'static str) -> Result<&'a str> {
    match token.id.as_deref() {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(DashboardError::MissingAddress {
            pair_id: pair.id.clone(),
            token: side,
        }),
    }
}

fn constituent_entry(token_id: &str, token: &TokenInfo, balance: U256, allowance: U256) -> TokenBalanceEntry {
    TokenBalanceEntry {
        token_id: token_id.to_string(),
        symbol: token.symbol.clone(),
        decimals: token.decimals,
        balance,
        allowance,
    }
}
