//! Dashboard constants and well-known values
//!
//! Default addresses and windows used when configuration does not override them.

/// Sentinel address standing in for the chain's native currency
pub const NATIVE_TOKEN_ADDRESS: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

/// Native currency symbol
pub const NATIVE_SYMBOL: &str = "ETH";

/// Decimals of the native currency
pub const NATIVE_DECIMALS: u8 = 18;

/// Decimals of every pair liquidity token
pub const PAIR_TOKEN_DECIMALS: u8 = 18;

/// Spender approved for add-liquidity transfers
pub const EXCHANGE_ADD_LIQUIDITY_ADDRESS: &str = "0xFd8A61F94604aeD5977B31930b48f1a94ff3a195";

/// Spender approved for remove-liquidity transfers
pub const EXCHANGE_REMOVE_LIQUIDITY_ADDRESS: &str = "0x418915329226AE7fCcB20A2354BbbF0F6c22Bd92";

/// Default values for timeouts and refresh cadence
pub mod defaults {
    /// Market-data API call timeout
    pub const MARKET_DATA_TIMEOUT_MS: u64 = 10_000;

    /// Chain query timeout
    pub const CHAIN_QUERY_TIMEOUT_MS: u64 = 10_000;

    /// Span of the hourly series, counted back from now
    pub const HOURLY_WINDOW_DAYS: i64 = 7;

    pub const PAIR_REFRESH_INTERVAL_SECS: u64 = 60;
    pub const TRADES_REFRESH_INTERVAL_SECS: u64 = 15;
    pub const BALANCE_REFRESH_INTERVAL_SECS: u64 = 30;
}
