//! Shared mocks and fixtures for the dashboard integration tests
//!
//! `MockMarketData` and `MockChain` record every call they receive and can be
//! told to fail or to stall individual calls. Delays use `tokio::time::sleep`,
//! so tests running with a paused clock complete them instantly and in a
//! deterministic order.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ethers_core::types::U256;
use pair_dashboard::{
    ChainQuery, DashboardConfig, FixedClock, MarketDataApi, PairDashboard, RemoteError,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use types::{
    HistoricalPoint, LiquidityChange, LiquidityEvent, PairPosition, PairSnapshot, PairStats,
    PositionSnapshot, SwapEvent, TokenInfo,
};

pub const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
pub const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
pub const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const DAI_WETH: &str = "0xA478c2975Ab1Ea89e8196811F51A7B7Ade33eB11";
pub const USDC_WETH: &str = "0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc";
pub const ACCOUNT: &str = "0x00000000000000000000000000000000000000De";

/// Creation time of [`DAI_WETH`]
pub const DAI_WETH_CREATED_AT: i64 = 1_589_300_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("pair_dashboard=debug")
        .with_test_writer()
        .try_init();
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

// -- Fixtures ---------------------------------------------------------------

pub fn token(id: &str, symbol: &str, decimals: u8) -> TokenInfo {
    TokenInfo {
        id: Some(id.to_string()),
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        decimals,
    }
}

pub fn dai_weth() -> PairSnapshot {
    PairSnapshot {
        id: DAI_WETH.to_string(),
        token0: token(DAI, "DAI", 18),
        token1: token(WETH, "WETH", 18),
        created_at_timestamp: DAI_WETH_CREATED_AT,
        stats: PairStats {
            reserve0: Decimal::new(41_250_000, 0),
            reserve1: Decimal::new(12_500, 0),
            reserve_usd: Decimal::new(82_500_000, 0),
            volume_usd: Decimal::new(1_250_000, 0),
            token0_price: Decimal::new(3300, 0),
            token1_price: Decimal::new(3, 4),
            tx_count: 0,
        },
    }
}

pub fn usdc_weth() -> PairSnapshot {
    PairSnapshot {
        id: USDC_WETH.to_string(),
        token0: token(USDC, "USDC", 6),
        token1: token(WETH, "WETH", 18),
        created_at_timestamp: 1_588_700_000,
        stats: PairStats::default(),
    }
}

pub fn point(timestamp: i64, reserve_usd: i64) -> HistoricalPoint {
    HistoricalPoint {
        timestamp,
        reserve0: Decimal::ZERO,
        reserve1: Decimal::ZERO,
        reserve_usd: Decimal::new(reserve_usd, 0),
        volume_usd: Decimal::new(1_000, 0),
        volume_token0: Decimal::ZERO,
        volume_token1: Decimal::ZERO,
    }
}

pub fn swap(id: &str, timestamp: i64) -> SwapEvent {
    SwapEvent {
        id: id.to_string(),
        timestamp,
        sender: ACCOUNT.to_string(),
        to: ACCOUNT.to_string(),
        amount0_in: Decimal::new(1_000, 0),
        amount1_in: Decimal::ZERO,
        amount0_out: Decimal::ZERO,
        amount1_out: Decimal::new(3, 1),
        amount_usd: Decimal::new(1_000, 0),
    }
}

pub fn mint(id: &str, timestamp: i64) -> LiquidityEvent {
    LiquidityEvent::Mint(LiquidityChange {
        id: id.to_string(),
        timestamp,
        sender: Some(ACCOUNT.to_string()),
        liquidity: Decimal::new(5, 0),
        amount0: Decimal::new(3_300, 0),
        amount1: Decimal::ONE,
        amount_usd: Decimal::new(6_600, 0),
    })
}

pub fn config() -> DashboardConfig {
    DashboardConfig {
        market_data_timeout_ms: 2_000,
        chain_query_timeout_ms: 2_000,
        ..DashboardConfig::default()
    }
}

pub struct Harness {
    pub dashboard: PairDashboard,
    pub market: Arc<MockMarketData>,
    pub chain: Arc<MockChain>,
}

pub fn harness() -> Harness {
    harness_with(config())
}

pub fn harness_with(config: DashboardConfig) -> Harness {
    init_tracing();
    let market = Arc::new(MockMarketData::new());
    market.add_pair(dai_weth());
    market.add_pair(usdc_weth());
    let chain = Arc::new(MockChain::new());

    let dashboard = PairDashboard::with_clock(
        config,
        market.clone(),
        chain.clone(),
        Arc::new(FixedClock(now())),
    )
    .unwrap();

    Harness {
        dashboard,
        market,
        chain,
    }
}

// -- Market data ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MarketCall {
    pub call: &'static str,
    pub subject: String,
    pub since: Option<DateTime<Utc>>,
}

/// In-memory market-data API
///
/// Every overview response carries a `tx_count` one higher than the last, so
/// tests can tell successive refreshes apart.
pub struct MockMarketData {
    pairs: Mutex<HashMap<String, PairSnapshot>>,
    failures: Mutex<HashMap<&'static str, String>>,
    delays: Mutex<HashMap<(&'static str, String), Duration>>,
    next_delays: Mutex<HashMap<(&'static str, String), Duration>>,
    calls: Mutex<Vec<MarketCall>>,
    overviews_served: AtomicU64,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            pairs: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            next_delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            overviews_served: AtomicU64::new(0),
        }
    }

    pub fn add_pair(&self, pair: PairSnapshot) {
        self.pairs.lock().insert(pair.id.clone(), pair);
    }

    /// Make every subsequent `call` fail with `reason`
    pub fn fail(&self, call: &'static str, reason: &str) {
        self.failures.lock().insert(call, reason.to_string());
    }

    pub fn recover(&self, call: &'static str) {
        self.failures.lock().remove(call);
    }

    /// Stall `call` for `subject` (pair id or account) before answering
    pub fn delay(&self, call: &'static str, subject: &str, delay: Duration) {
        self.delays.lock().insert((call, subject.to_string()), delay);
    }

    /// Stall only the next `call` for `subject`
    pub fn delay_next(&self, call: &'static str, subject: &str, delay: Duration) {
        self.next_delays.lock().insert((call, subject.to_string()), delay);
    }

    pub fn calls(&self) -> Vec<MarketCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.call == call).count()
    }

    pub fn since_of(&self, call: &str) -> Option<DateTime<Utc>> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|c| c.call == call)
            .and_then(|c| c.since)
    }

    async fn enter(&self, call: &'static str, subject: &str, since: Option<DateTime<Utc>>) -> Result<(), RemoteError> {
        self.calls.lock().push(MarketCall {
            call,
            subject: subject.to_string(),
            since,
        });

        let key = (call, subject.to_string());
        let next = self.next_delays.lock().remove(&key);
        let delay = next.or_else(|| self.delays.lock().get(&key).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.failures.lock().get(call) {
            Some(reason) => Err(RemoteError::new(reason.clone())),
            None => Ok(()),
        }
    }

    fn pair(&self, pair_id: &str) -> Result<PairSnapshot, RemoteError> {
        self.pairs
            .lock()
            .get(pair_id)
            .cloned()
            .ok_or_else(|| RemoteError::new(format!("pair {pair_id} not found")))
    }
}

#[async_trait]
impl MarketDataApi for MockMarketData {
    async fn pair_overview(&self, pair_id: &str) -> Result<PairSnapshot, RemoteError> {
        self.enter("pair_overview", pair_id, None).await?;
        let mut pair = self.pair(pair_id)?;
        pair.stats.tx_count = self.overviews_served.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(pair)
    }

    async fn historical_daily_data(
        &self,
        pair_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<HistoricalPoint>, RemoteError> {
        self.enter("historical_daily_data", pair_id, Some(since)).await?;
        let start = since.timestamp();
        Ok(vec![point(start + 2 * 86_400, 900), point(start, 700), point(start + 86_400, 800)])
    }

    async fn historical_hourly_data(
        &self,
        pair_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<HistoricalPoint>, RemoteError> {
        self.enter("historical_hourly_data", pair_id, Some(since)).await?;
        let start = since.timestamp();
        Ok((0..24).map(|h| point(start + h * 3_600, 1_000 + h)).collect())
    }

    async fn latest_swaps(&self, pair_id: &str) -> Result<Vec<SwapEvent>, RemoteError> {
        self.enter("latest_swaps", pair_id, None).await?;
        Ok(vec![swap("0xswap-2", 1_709_290_000), swap("0xswap-1", 1_709_280_000)])
    }

    async fn mints_and_burns(&self, pair_id: &str) -> Result<Vec<LiquidityEvent>, RemoteError> {
        self.enter("mints_and_burns", pair_id, None).await?;
        Ok(vec![mint("0xmint-1", 1_709_270_000)])
    }

    async fn position_stats(&self, account: &str) -> Result<PositionSnapshot, RemoteError> {
        self.enter("position_stats", account, None).await?;
        Ok(PositionSnapshot {
            account: account.to_string(),
            positions: vec![PairPosition {
                pair_id: DAI_WETH.to_string(),
                liquidity_token_balance: Decimal::new(5, 0),
                usd_value: Decimal::new(6_600, 0),
                fees_earned_usd: Decimal::new(42, 0),
                impermanent_loss_usd: Decimal::new(-12, 0),
            }],
        })
    }
}

// -- Chain ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
    BalanceOf { token: String, account: String },
    Allowance { token: String, owner: String, spender: String },
    NativeBalance { account: String },
}

/// In-memory chain client. Unknown tokens report a zero balance and zero
/// allowance.
pub struct MockChain {
    balances: Mutex<HashMap<String, U256>>,
    allowances: Mutex<HashMap<(String, String), U256>>,
    native: Mutex<U256>,
    failure: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<ChainCall>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            allowances: Mutex::new(HashMap::new()),
            native: Mutex::new(U256::exp10(18)),
            failure: Mutex::new(None),
            delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_balance(&self, token: &str, balance: U256) {
        self.balances.lock().insert(token.to_lowercase(), balance);
    }

    pub fn set_allowance(&self, token: &str, spender: &str, allowance: U256) {
        self.allowances
            .lock()
            .insert((token.to_lowercase(), spender.to_lowercase()), allowance);
    }

    /// Make every subsequent `balance_of` call fail with `reason`
    pub fn fail_balances(&self, reason: &str) {
        *self.failure.lock() = Some(reason.to_string());
    }

    pub fn delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> Vec<ChainCall> {
        self.calls.lock().clone()
    }

    /// Spender each allowance query was made for, keyed by lowercased token
    pub fn spenders(&self) -> HashMap<String, String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                ChainCall::Allowance { token, spender, .. } => Some((token.to_lowercase(), spender.clone())),
                _ => None,
            })
            .collect()
    }

    async fn enter(&self, call: ChainCall) {
        self.calls.lock().push(call);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ChainQuery for MockChain {
    async fn balance_of(&self, token: &str, account: &str) -> Result<U256, RemoteError> {
        self.enter(ChainCall::BalanceOf {
            token: token.to_string(),
            account: account.to_string(),
        })
        .await;

        if let Some(reason) = self.failure.lock().clone() {
            return Err(RemoteError::new(reason));
        }
        Ok(self
            .balances
            .lock()
            .get(&token.to_lowercase())
            .copied()
            .unwrap_or_default())
    }

    async fn allowance(&self, token: &str, owner: &str, spender: &str) -> Result<U256, RemoteError> {
        self.enter(ChainCall::Allowance {
            token: token.to_string(),
            owner: owner.to_string(),
            spender: spender.to_string(),
        })
        .await;

        Ok(self
            .allowances
            .lock()
            .get(&(token.to_lowercase(), spender.to_lowercase()))
            .copied()
            .unwrap_or_default())
    }

    async fn native_balance(&self, account: &str) -> Result<U256, RemoteError> {
        self.enter(ChainCall::NativeBalance {
            account: account.to_string(),
        })
        .await;
        Ok(*self.native.lock())
    }
}
