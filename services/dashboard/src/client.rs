//! Remote collaborators: the market-data API and the chain query client
//!
//! Both are consumed through traits; transport concerns live in their
//! implementations. Every call made by this crate goes through [`bounded`],
//! which applies the configured per-call timeout.

use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers_core::types::U256;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use types::{HistoricalPoint, LiquidityEvent, PairSnapshot, PositionSnapshot, SwapEvent};

/// Failure reported by a remote collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RemoteError(pub String);

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Market-data API (pair statistics, history, events, positions)
#[async_trait]
pub trait MarketDataApi: Send + Sync {
    async fn pair_overview(&self, pair_id: &str) -> std::result::Result<PairSnapshot, RemoteError>;

    async fn historical_daily_data(
        &self,
        pair_id: &str,
        since: DateTime<Utc>,
    ) -> std::result::Result<Vec<HistoricalPoint>, RemoteError>;

    async fn historical_hourly_data(
        &self,
        pair_id: &str,
        since: DateTime<Utc>,
    ) -> std::result::Result<Vec<HistoricalPoint>, RemoteError>;

    async fn latest_swaps(&self, pair_id: &str) -> std::result::Result<Vec<SwapEvent>, RemoteError>;

    async fn mints_and_burns(&self, pair_id: &str) -> std::result::Result<Vec<LiquidityEvent>, RemoteError>;

    async fn position_stats(&self, account: &str) -> std::result::Result<PositionSnapshot, RemoteError>;
}

/// On-chain ERC20 and native balance queries
#[async_trait]
pub trait ChainQuery: Send + Sync {
    async fn balance_of(&self, token: &str, account: &str) -> std::result::Result<U256, RemoteError>;

    async fn allowance(
        &self,
        token: &str,
        owner: &str,
        spender: &str,
    ) -> std::result::Result<U256, RemoteError>;

    async fn native_balance(&self, account: &str) -> std::result::Result<U256, RemoteError>;
}

/// Source of the current time, injectable for tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Run a remote call under a timeout, mapping both failure kinds into [`DashboardError`]
pub(crate) async fn bounded<T, F>(call: &'static str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, RemoteError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(DashboardError::from),
        Err(_) => Err(DashboardError::Timeout {
            call,
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}
