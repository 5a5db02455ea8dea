//! Pair snapshots
//!
//! A pair snapshot is what the market-data API returns for a two-token
//! liquidity pool. Identity fields (pair address, token addresses, creation
//! time) are fixed for the life of the pair; the statistics block is replaced
//! on every refresh.

use crate::error::TypesError;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One side of a pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token contract address; the API occasionally omits it
    pub id: Option<String>,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// Statistical fields of a pair, replaced wholesale on refresh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairStats {
    pub reserve0: Decimal,
    pub reserve1: Decimal,
    pub reserve_usd: Decimal,
    pub volume_usd: Decimal,
    pub token0_price: Decimal,
    pub token1_price: Decimal,
    pub tx_count: u64,
}

/// Pair overview as returned by the market-data API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSnapshot {
    /// Pair (liquidity token) contract address
    pub id: String,
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    /// Unix seconds
    pub created_at_timestamp: i64,
    #[serde(flatten)]
    pub stats: PairStats,
}

impl PairSnapshot {
    /// Creation time of the pair as a UTC date
    pub fn created_at(&self) -> Result<DateTime<Utc>, TypesError> {
        Utc.timestamp_opt(self.created_at_timestamp, 0)
            .single()
            .ok_or(TypesError::InvalidTimestamp {
                timestamp: self.created_at_timestamp,
            })
    }

    /// Display symbol of the liquidity token, e.g. `WETH/USDC`
    pub fn pair_symbol(&self) -> String {
        format!("{}/{}", self.token0.symbol, self.token1.symbol)
    }

    /// Check that `fresh` describes the same pair as `self`
    pub fn check_identity(&self, fresh: &PairSnapshot) -> Result<(), TypesError> {
        let mismatch = |field: &'static str, expected: String, actual: String| {
            TypesError::IdentityMismatch {
                pair_id: self.id.clone(),
                field,
                expected,
                actual,
            }
        };

        if !self.id.eq_ignore_ascii_case(&fresh.id) {
            return Err(mismatch("id", self.id.clone(), fresh.id.clone()));
        }
        if !same_address(&self.token0.id, &fresh.token0.id) {
            return Err(mismatch(
                "token0.id",
                display_address(&self.token0.id),
                display_address(&fresh.token0.id),
            ));
        }
        if !same_address(&self.token1.id, &fresh.token1.id) {
            return Err(mismatch(
                "token1.id",
                display_address(&self.token1.id),
                display_address(&fresh.token1.id),
            ));
        }
        if self.created_at_timestamp != fresh.created_at_timestamp {
            return Err(mismatch(
                "created_at_timestamp",
                self.created_at_timestamp.to_string(),
                fresh.created_at_timestamp.to_string(),
            ));
        }
        Ok(())
    }

    /// Merge a fresh fetch of the same pair into this snapshot.
    ///
    /// Identity fields are kept from `self` after validating that `fresh`
    /// agrees with them. Token metadata and statistics come from `fresh`.
    pub fn refreshed_with(&self, fresh: PairSnapshot) -> Result<PairSnapshot, TypesError> {
        self.check_identity(&fresh)?;

        Ok(PairSnapshot {
            id: self.id.clone(),
            token0: TokenInfo {
                id: self.token0.id.clone(),
                ..fresh.token0
            },
            token1: TokenInfo {
                id: self.token1.id.clone(),
                ..fresh.token1
            },
            created_at_timestamp: self.created_at_timestamp,
            stats: fresh.stats,
        })
    }
}

fn same_address(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

fn display_address(address: &Option<String>) -> String {
    address.clone().unwrap_or_else(|| "<none>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn token(id: &str, symbol: &str, decimals: u8) -> TokenInfo {
        TokenInfo {
            id: Some(id.to_string()),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals,
        }
    }

    fn snapshot(volume: Decimal) -> PairSnapshot {
        PairSnapshot {
            id: "0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc".to_string(),
            token0: token("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USDC", 6),
            token1: token("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "WETH", 18),
            created_at_timestamp: 1_589_747_086,
            stats: PairStats {
                volume_usd: volume,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_created_at_from_unix_seconds() {
        let pair = snapshot(dec!(0));
        let created = pair.created_at().unwrap();
        assert_eq!(created.timestamp(), 1_589_747_086);
        assert_eq!(created.format("%Y-%m-%d").to_string(), "2020-05-17");
    }

    #[test]
    fn test_refresh_replaces_statistics() {
        let prior = snapshot(dec!(100));
        let merged = prior.refreshed_with(snapshot(dec!(250.5))).unwrap();

        assert_eq!(merged.stats.volume_usd, dec!(250.5));
        assert_eq!(merged.id, prior.id);
        assert_eq!(merged.pair_symbol(), "USDC/WETH");
    }

    #[test]
    fn test_refresh_rejects_changed_token_address() {
        let prior = snapshot(dec!(100));
        let mut fresh = snapshot(dec!(100));
        fresh.token1.id = Some("0x6b175474e89094c44da98b954eedeac495271d0f".to_string());

        let err = prior.refreshed_with(fresh).unwrap_err();
        assert!(matches!(
            err,
            TypesError::IdentityMismatch { field: "token1.id", .. }
        ));
    }

    #[test]
    fn test_address_comparison_ignores_case() {
        let prior = snapshot(dec!(1));
        let mut fresh = snapshot(dec!(2));
        fresh.id = fresh.id.to_uppercase().replacen("0X", "0x", 1);
        assert!(prior.check_identity(&fresh).is_ok());
    }

    #[test]
    fn test_stats_flatten_in_json() {
        let json = serde_json::to_value(snapshot(dec!(3))).unwrap();
        assert!(json.get("volume_usd").is_some());
        assert!(json.get("stats").is_none());
    }
}
