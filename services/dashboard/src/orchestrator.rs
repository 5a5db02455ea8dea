//! Fetch orchestration for pair data and trades
//!
//! The pair overview is a hard dependency: historical ranges are derived from
//! its creation timestamp, so nothing else in the pair group is launched until
//! it succeeds. The dependents are then launched together and joined
//! all-or-nothing. When several of them fail, the reported reason follows a
//! fixed declaration order:
//!
//! - pair group: daily → hourly → position
//! - trades group: swaps → mints/burns

use crate::aggregator::{PairPrices, Trades};
use crate::client::{bounded, Clock, MarketDataApi};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::state::Pipeline;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use types::{HistoricalSeries, PairSnapshot, Resolution};

/// Start dates of the two historical series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    /// Pair creation date
    pub daily_since: DateTime<Utc>,
    /// `now - hourly window`
    pub hourly_since: DateTime<Utc>,
}

pub struct FetchOrchestrator {
    market: Arc<dyn MarketDataApi>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    hourly_window: chrono::Duration,
}

impl FetchOrchestrator {
    pub fn new(market: Arc<dyn MarketDataApi>, clock: Arc<dyn Clock>, config: &DashboardConfig) -> Self {
        Self {
            market,
            clock,
            timeout: config.market_data_timeout(),
            hourly_window: config.hourly_window(),
        }
    }

    pub fn history_window(&self, pair: &PairSnapshot) -> Result<HistoryWindow> {
        Ok(HistoryWindow {
            daily_since: pair.created_at()?,
            hourly_since: self.clock.now() - self.hourly_window,
        })
    }

    pub async fn fetch_overview(&self, pair_id: &str) -> Result<PairSnapshot> {
        bounded("pair_overview", self.timeout, self.market.pair_overview(pair_id))
            .await
            .inspect_err(|e| warn!("Could not fetch pair data for {}: {}", pair_id, e))
    }

    /// Overview first, then the historical group
    pub async fn fetch_pair_prices(&self, pair_id: &str, account: Option<&str>) -> Result<PairPrices> {
        let pair = self.fetch_overview(pair_id).await?;
        self.fetch_history(pair, account).await
    }

    /// Daily series, hourly series and (with an account) position stats for
    /// an already fetched overview, joined all-or-nothing
    pub async fn fetch_history(&self, pair: PairSnapshot, account: Option<&str>) -> Result<PairPrices> {
        let window = self.history_window(&pair)?;
        let pair_id = pair.id.as_str();

        let daily = bounded(
            "historical_daily_data",
            self.timeout,
            self.market.historical_daily_data(pair_id, window.daily_since),
        );
        let hourly = bounded(
            "historical_hourly_data",
            self.timeout,
            self.market.historical_hourly_data(pair_id, window.hourly_since),
        );
        let position = async {
            match account {
                Some(account) => bounded("position_stats", self.timeout, self.market.position_stats(account))
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };

        let (daily, hourly, position) = futures::join!(daily, hourly, position);

        let failed = [daily.is_err(), hourly.is_err(), position.is_err()]
            .into_iter()
            .filter(|failed| *failed)
            .count();
        let incomplete = |err: DashboardError| {
            warn!("Could not fetch historical data for {}: {}", pair_id, err);
            DashboardError::incomplete(Pipeline::Pair, failed, 3, err)
        };

        let daily = daily.map_err(incomplete)?;
        let hourly = hourly.map_err(incomplete)?;
        let position = position.map_err(incomplete)?;

        debug!(
            pair = pair_id,
            daily_points = daily.len(),
            hourly_points = hourly.len(),
            with_position = position.is_some(),
            "pair data fetched"
        );

        Ok(PairPrices {
            historical_daily: HistoricalSeries::new(Resolution::Daily, window.daily_since, daily),
            historical_hourly: HistoricalSeries::new(Resolution::Hourly, window.hourly_since, hourly),
            pair_data: pair,
            position,
        })
    }

    /// Latest swaps and mints/burns, joined all-or-nothing
    pub async fn fetch_trades(&self, pair_id: &str) -> Result<Trades> {
        let (swaps, mints_and_burns) = futures::join!(
            bounded("latest_swaps", self.timeout, self.market.latest_swaps(pair_id)),
            bounded("mints_and_burns", self.timeout, self.market.mints_and_burns(pair_id)),
        );

        let failed = usize::from(swaps.is_err()) + usize::from(mints_and_burns.is_err());
        let incomplete = |err: DashboardError| {
            warn!("Could not fetch trades data for {}: {}", pair_id, err);
            DashboardError::incomplete(Pipeline::Trades, failed, 2, err)
        };

        Ok(Trades {
            swaps: swaps.map_err(incomplete)?,
            mints_and_burns: mints_and_burns.map_err(incomplete)?,
        })
    }
}
