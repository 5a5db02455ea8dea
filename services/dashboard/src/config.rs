//! Dashboard configuration

use crate::constants::{self, defaults};
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Spender checked for token0/token1 allowances
    pub add_liquidity_spender: String,

    /// Spender checked for the pair token allowance
    pub remove_liquidity_spender: String,

    /// Sentinel address reported for the native currency entry
    pub native_token_address: String,

    /// Symbol (and balance key) of the native currency entry
    pub native_symbol: String,

    /// Per-call timeout for market-data API calls in milliseconds
    pub market_data_timeout_ms: u64,

    /// Per-call timeout for chain queries in milliseconds
    pub chain_query_timeout_ms: u64,

    /// Days of hourly history requested
    pub hourly_window_days: i64,

    /// Overview refresh interval in seconds
    pub pair_refresh_interval_secs: u64,

    /// Swaps and mints/burns refresh interval in seconds
    pub trades_refresh_interval_secs: u64,

    /// Balance and allowance refresh interval in seconds
    pub balance_refresh_interval_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            add_liquidity_spender: constants::EXCHANGE_ADD_LIQUIDITY_ADDRESS.to_string(),
            remove_liquidity_spender: constants::EXCHANGE_REMOVE_LIQUIDITY_ADDRESS.to_string(),
            native_token_address: constants::NATIVE_TOKEN_ADDRESS.to_string(),
            native_symbol: constants::NATIVE_SYMBOL.to_string(),
            market_data_timeout_ms: defaults::MARKET_DATA_TIMEOUT_MS,
            chain_query_timeout_ms: defaults::CHAIN_QUERY_TIMEOUT_MS,
            hourly_window_days: defaults::HOURLY_WINDOW_DAYS,
            pair_refresh_interval_secs: defaults::PAIR_REFRESH_INTERVAL_SECS,
            trades_refresh_interval_secs: defaults::TRADES_REFRESH_INTERVAL_SECS,
            balance_refresh_interval_secs: defaults::BALANCE_REFRESH_INTERVAL_SECS,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json` file, or TOML for any other extension
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(DashboardError::Configuration {
                message: message.to_string(),
            })
        };

        if self.market_data_timeout_ms == 0 || self.chain_query_timeout_ms == 0 {
            return invalid("timeouts must be greater than zero");
        }
        if !(1..=365).contains(&self.hourly_window_days) {
            return invalid("hourly_window_days must be between 1 and 365");
        }
        if self.pair_refresh_interval_secs == 0
            || self.trades_refresh_interval_secs == 0
            || self.balance_refresh_interval_secs == 0
        {
            return invalid("refresh intervals must be greater than zero");
        }
        if self
            .add_liquidity_spender
            .eq_ignore_ascii_case(&self.remove_liquidity_spender)
        {
            return invalid("add and remove liquidity spenders must differ");
        }
        if self.native_symbol.is_empty() {
            return invalid("native_symbol must not be empty");
        }
        Ok(())
    }

    pub fn market_data_timeout(&self) -> Duration {
        Duration::from_millis(self.market_data_timeout_ms)
    }

    pub fn chain_query_timeout(&self) -> Duration {
        Duration::from_millis(self.chain_query_timeout_ms)
    }

    pub fn hourly_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.hourly_window_days)
    }

    pub fn pair_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.pair_refresh_interval_secs)
    }

    pub fn trades_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.trades_refresh_interval_secs)
    }

    pub fn balance_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.balance_refresh_interval_secs)
    }
}
