//! Dashboard entry point
//!
//! [`PairDashboard`] ties the selection tracker, the orchestrator, the
//! balance resolver and the aggregator together. Each public operation
//! captures a commit ticket before doing any remote work and hands its result
//! to the aggregator, which drops it if the selection moved on meanwhile.

use crate::aggregator::{Aggregator, CommitOutcome, CommitTicket, CycleTickets};
use crate::client::{ChainQuery, Clock, MarketDataApi, SystemClock};
use crate::config::DashboardConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{DashboardError, Result};
use crate::orchestrator::FetchOrchestrator;
use crate::resolver::BalanceResolver;
use crate::selection::{Generation, SelectionKey};
use crate::state::{DashboardView, Pipeline};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use types::{BalanceMap, PairSnapshot};

/// Outcomes of a full load of the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub generation: Generation,
    pub pair: CommitOutcome,
    pub trades: CommitOutcome,
    pub balances: CommitOutcome,
}

struct Inner {
    config: DashboardConfig,
    aggregator: Aggregator,
    orchestrator: FetchOrchestrator,
    resolver: BalanceResolver,
}

#[derive(Clone)]
pub struct PairDashboard {
    inner: Arc<Inner>,
}

impl PairDashboard {
    pub fn new(
        config: DashboardConfig,
        market: Arc<dyn MarketDataApi>,
        chain: Arc<dyn ChainQuery>,
    ) -> Result<Self> {
        Self::with_clock(config, market, chain, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: DashboardConfig,
        market: Arc<dyn MarketDataApi>,
        chain: Arc<dyn ChainQuery>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let orchestrator = FetchOrchestrator::new(market, clock, &config);
        let resolver = BalanceResolver::new(chain, &config);

        info!(
            market_data_timeout_ms = config.market_data_timeout_ms,
            chain_query_timeout_ms = config.chain_query_timeout_ms,
            "Pair dashboard initialized"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                aggregator: Aggregator::new(),
                orchestrator,
                resolver,
            }),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    // -- Selection ---------------------------------------------------------

    /// Switch to a new selection. Re-selecting the current key is a no-op
    /// that keeps in-flight work valid.
    pub fn select(&self, key: SelectionKey) -> Generation {
        self.inner.aggregator.restart(key, false)
    }

    /// Restart the current selection under a new generation, clearing errors
    pub fn retry(&self) -> Generation {
        let key = self.inner.aggregator.tracker().current_key();
        self.inner.aggregator.restart(key, true)
    }

    pub fn current_generation(&self) -> Generation {
        self.inner.aggregator.tracker().current_generation()
    }

    pub fn is_stale(&self, generation: Generation) -> bool {
        self.inner.aggregator.tracker().is_stale(generation)
    }

    // -- Observation -------------------------------------------------------

    pub fn snapshot(&self) -> DashboardView {
        self.inner.aggregator.view()
    }

    /// Receiver notified after every selection change and commit
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.inner.aggregator.subscribe()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::from(&self.snapshot())
    }

    // -- Pipelines ---------------------------------------------------------

    /// Full cycle for the current selection: overview, then the pair group,
    /// the trades group and balances concurrently. An overview failure fails
    /// every pipeline of the cycle without launching anything else.
    pub async fn load(&self) -> LoadReport {
        let cycle = self.inner.aggregator.begin_cycle();
        self.run_cycle(cycle).await
    }

    /// Run [`load`](Self::load) on the runtime. The cycle is bound to the
    /// generation current when this is called, not when the task first runs.
    pub fn spawn_load(&self) -> JoinHandle<LoadReport> {
        let cycle = self.inner.aggregator.begin_cycle();
        let dashboard = self.clone();
        tokio::spawn(async move { dashboard.run_cycle(cycle).await })
    }

    /// Select `key` and launch a load for it
    pub fn select_and_load(&self, key: SelectionKey) -> (Generation, JoinHandle<LoadReport>) {
        let generation = self.select(key);
        (generation, self.spawn_load())
    }

    async fn run_cycle(&self, cycle: CycleTickets) -> LoadReport {
        let aggregator = &self.inner.aggregator;
        let generation = cycle.generation;
        if cycle.is_empty() {
            return LoadReport::skipped(generation);
        }
        let Some(pair_id) = cycle.selection.pair_id.as_deref() else {
            return LoadReport::skipped(generation);
        };
        let account = cycle.selection.account.as_deref();

        let overview = match self.inner.orchestrator.fetch_overview(pair_id).await {
            Ok(overview) => overview,
            Err(err) => {
                let reason = err.to_string();
                let network = || DashboardError::Network { message: reason.clone() };
                return LoadReport {
                    generation,
                    pair: self.settle(cycle.pair, |ticket| aggregator.commit_pair(ticket, Err(err))),
                    trades: self.settle(cycle.trades, |ticket| aggregator.commit_trades(ticket, Err(network()))),
                    balances: self.settle(cycle.balances, |ticket| {
                        aggregator.commit_balances(ticket, Err(network()))
                    }),
                };
            }
        };

        let pair_cycle = async {
            let Some(ticket) = cycle.pair else {
                return CommitOutcome::Skipped;
            };
            let result = self.inner.orchestrator.fetch_history(overview.clone(), account).await;
            self.settle(Some(ticket), |ticket| aggregator.commit_pair(ticket, result))
        };
        let trades_cycle = async {
            let Some(ticket) = cycle.trades else {
                return CommitOutcome::Skipped;
            };
            let result = self.inner.orchestrator.fetch_trades(pair_id).await;
            self.settle(Some(ticket), |ticket| aggregator.commit_trades(ticket, result))
        };
        let balances_cycle = async {
            match (cycle.balances, account) {
                (Some(ticket), Some(account)) => self.resolve_balances(ticket, account, &overview).await,
                _ => CommitOutcome::Skipped,
            }
        };

        let (pair, trades, balances) = futures::join!(pair_cycle, trades_cycle, balances_cycle);
        LoadReport {
            generation,
            pair,
            trades,
            balances,
        }
    }

    /// Overview plus the historical group
    pub async fn refresh_pair(&self) -> CommitOutcome {
        let Some((ticket, key)) = self.inner.aggregator.begin(Pipeline::Pair) else {
            return CommitOutcome::Skipped;
        };
        let Some(pair_id) = key.pair_id.as_deref() else {
            return CommitOutcome::Skipped;
        };

        let result = self
            .inner
            .orchestrator
            .fetch_pair_prices(pair_id, key.account.as_deref())
            .await;
        self.settle(Some(ticket), |ticket| self.inner.aggregator.commit_pair(ticket, result))
    }

    /// Overview only, merged into the visible pair data
    pub async fn refresh_overview(&self) -> CommitOutcome {
        let Some((ticket, key)) = self.inner.aggregator.begin(Pipeline::Pair) else {
            return CommitOutcome::Skipped;
        };
        let Some(pair_id) = key.pair_id.as_deref() else {
            return CommitOutcome::Skipped;
        };

        let result = self.inner.orchestrator.fetch_overview(pair_id).await;
        self.settle(Some(ticket), |ticket| {
            self.inner.aggregator.commit_overview(ticket, result)
        })
    }

    /// Swaps and mints/burns, independent of the pair group
    pub async fn refresh_trades(&self) -> CommitOutcome {
        let Some((ticket, key)) = self.inner.aggregator.begin(Pipeline::Trades) else {
            return CommitOutcome::Skipped;
        };
        let Some(pair_id) = key.pair_id.as_deref() else {
            return CommitOutcome::Skipped;
        };

        let result = self.inner.orchestrator.fetch_trades(pair_id).await;
        self.settle(Some(ticket), |ticket| self.inner.aggregator.commit_trades(ticket, result))
    }

    /// Balances and allowances of the selected account. Uses the visible pair
    /// data when it is ready, otherwise fetches the overview first.
    pub async fn refresh_balances(&self) -> CommitOutcome {
        let Some((ticket, key)) = self.inner.aggregator.begin(Pipeline::Balances) else {
            return CommitOutcome::Skipped;
        };
        let (Some(pair_id), Some(account)) = (key.pair_id.as_deref(), key.account.as_deref()) else {
            return CommitOutcome::Skipped;
        };

        let visible = self
            .snapshot()
            .pair
            .ready()
            .map(|prices| prices.pair_data.clone());
        let pair = match visible {
            Some(pair) => pair,
            None => match self.inner.orchestrator.fetch_overview(pair_id).await {
                Ok(pair) => pair,
                Err(err) => {
                    return self.settle(Some(ticket), |ticket| {
                        self.inner.aggregator.commit_balances(ticket, Err(err))
                    })
                }
            },
        };

        self.resolve_balances(ticket, account, &pair).await
    }

    /// Resolve balances for an explicit pair without touching dashboard state
    pub async fn resolve_balances_for(&self, account: &str, pair: &PairSnapshot) -> Result<BalanceMap> {
        self.inner.resolver.resolve(account, pair).await
    }

    async fn resolve_balances(&self, ticket: CommitTicket, account: &str, pair: &PairSnapshot) -> CommitOutcome {
        let result = self.inner.resolver.resolve(account, pair).await;
        self.settle(Some(ticket), |ticket| {
            self.inner.aggregator.commit_balances(ticket, result)
        })
    }

    /// Apply a commit, turning discarded results into [`CommitOutcome::Discarded`]
    fn settle<F>(&self, ticket: Option<CommitTicket>, commit: F) -> CommitOutcome
    where
        F: FnOnce(CommitTicket) -> Result<CommitOutcome>,
    {
        let Some(ticket) = ticket else {
            return CommitOutcome::Skipped;
        };
        match commit(ticket) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!("Dropped result: {}", err);
                CommitOutcome::Discarded
            }
        }
    }
}

impl LoadReport {
    fn skipped(generation: Generation) -> Self {
        Self {
            generation,
            pair: CommitOutcome::Skipped,
            trades: CommitOutcome::Skipped,
            balances: CommitOutcome::Skipped,
        }
    }
}
