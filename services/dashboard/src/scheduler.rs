//! Periodic refresh of the current selection
//!
//! Each group refreshes on its own interval and each tick is spawned, so a
//! slow pair refresh never delays trades or balances. Refreshes capture the
//! generation when they start; ticks that land across a selection change are
//! dropped by the aggregator like any other stale result.

use crate::aggregator::CommitOutcome;
use crate::config::DashboardConfig;
use crate::dashboard::PairDashboard;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

pub struct RefreshScheduler {
    dashboard: PairDashboard,
    pair_every: Duration,
    trades_every: Duration,
    balances_every: Duration,
}

impl RefreshScheduler {
    pub fn new(dashboard: PairDashboard, config: &DashboardConfig) -> Self {
        Self {
            dashboard,
            pair_every: config.pair_refresh_interval(),
            trades_every: config.trades_refresh_interval(),
            balances_every: config.balance_refresh_interval(),
        }
    }

    /// Tick until `shutdown` flips to `true` or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut pair = ticker(self.pair_every);
        let mut trades = ticker(self.trades_every);
        let mut balances = ticker(self.balances_every);

        info!(
            pair_secs = self.pair_every.as_secs(),
            trades_secs = self.trades_every.as_secs(),
            balances_secs = self.balances_every.as_secs(),
            "Refresh scheduler started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = pair.tick() => {
                    let dashboard = self.dashboard.clone();
                    spawn_refresh("overview", async move { dashboard.refresh_overview().await });
                }
                _ = trades.tick() => {
                    let dashboard = self.dashboard.clone();
                    spawn_refresh("trades", async move { dashboard.refresh_trades().await });
                }
                _ = balances.tick() => {
                    let dashboard = self.dashboard.clone();
                    spawn_refresh("balances", async move { dashboard.refresh_balances().await });
                }
            }
        }

        info!("Refresh scheduler stopped");
    }
}

/// Interval whose first tick is one period away
fn ticker(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

fn spawn_refresh<F>(group: &'static str, refresh: F)
where
    F: Future<Output = CommitOutcome> + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = refresh.await;
        debug!(group, ?outcome, "scheduled refresh finished");
    });
}
