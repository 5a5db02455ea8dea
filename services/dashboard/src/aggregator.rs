//! Result aggregation and the single commit path
//!
//! Every mutation of the visible [`DashboardView`] goes through the
//! [`Aggregator`]. A commit takes the ledger lock, re-checks that the
//! captured generation is still current and that no later-launched refresh of
//! the same pipeline has already landed, then applies the whole result at
//! once and publishes the new view.

use crate::error::{DashboardError, Result};
use crate::selection::{Generation, SelectionKey, SelectionTracker};
use crate::state::{DashboardView, FetchState, Pipeline};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error};
use types::{BalanceMap, HistoricalSeries, LiquidityEvent, PairSnapshot, PositionSnapshot, SwapEvent};

/// Ready payload of the pair pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPrices {
    pub pair_data: PairSnapshot,
    pub historical_daily: HistoricalSeries,
    pub historical_hourly: HistoricalSeries,
    /// Present when an account was selected
    pub position: Option<PositionSnapshot>,
}

impl PairPrices {
    /// Merge a fresh payload into this one. Identity fields of the pair must
    /// agree; statistics and series are replaced wholesale.
    pub fn merge(&self, fresh: PairPrices) -> Result<PairPrices> {
        let pair_data = self.pair_data.refreshed_with(fresh.pair_data)?;
        Ok(PairPrices { pair_data, ..fresh })
    }

    /// Replace only the pair statistics, keeping the series
    pub fn with_overview(&self, fresh: PairSnapshot) -> Result<PairPrices> {
        let pair_data = self.pair_data.refreshed_with(fresh)?;
        Ok(PairPrices {
            pair_data,
            ..self.clone()
        })
    }
}

/// Ready payload of the trades pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trades {
    pub swaps: Vec<SwapEvent>,
    pub mints_and_burns: Vec<LiquidityEvent>,
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitOutcome {
    /// The result (success or failure) is now visible
    Applied,
    /// The result was superseded and dropped without a state change
    Discarded,
    /// Nothing was launched, or the result did not apply to the current state
    Skipped,
}

/// Permission to commit, captured when a pipeline run is launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitTicket {
    pub pipeline: Pipeline,
    pub generation: Generation,
    pub sequence: u64,
}

/// Tickets of one load cycle; `None` for pipelines that are not launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTickets {
    pub generation: Generation,
    pub selection: SelectionKey,
    pub pair: Option<CommitTicket>,
    pub trades: Option<CommitTicket>,
    pub balances: Option<CommitTicket>,
}

impl CycleTickets {
    pub fn is_empty(&self) -> bool {
        self.pair.is_none() && self.trades.is_none() && self.balances.is_none()
    }
}

struct Ledger {
    view: DashboardView,
    launched: [u64; 3],
    applied: [u64; 3],
}

impl Ledger {
    fn issue(&mut self, pipeline: Pipeline) -> Option<CommitTicket> {
        if self.view.is_failed(pipeline) {
            return None;
        }

        let slot = pipeline.index();
        self.launched[slot] += 1;
        Some(CommitTicket {
            pipeline,
            generation: self.view.generation,
            sequence: self.launched[slot],
        })
    }
}

pub struct Aggregator {
    tracker: SelectionTracker,
    ledger: Mutex<Ledger>,
    updates: watch::Sender<DashboardView>,
}

impl Aggregator {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(DashboardView::default());
        Self {
            tracker: SelectionTracker::new(),
            ledger: Mutex::new(Ledger {
                view: DashboardView::default(),
                launched: [0; 3],
                applied: [0; 3],
            }),
            updates,
        }
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn view(&self) -> DashboardView {
        self.ledger.lock().view.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.updates.subscribe()
    }

    /// Switch selection and reset every pipeline for the new generation
    pub fn restart(&self, key: SelectionKey, force: bool) -> Generation {
        let mut ledger = self.ledger.lock();
        let Some(generation) = self.tracker.advance(key.clone(), force) else {
            return ledger.view.generation;
        };

        ledger.view = DashboardView::restarted(generation, key);
        ledger.launched = [0; 3];
        ledger.applied = [0; 3];
        debug!(%generation, selection = ?ledger.view.selection, "selection changed");
        self.publish(&ledger.view);
        generation
    }

    /// Register a run of `pipeline` for the current generation.
    ///
    /// Returns `None` while the pipeline sits in `Error`; errors hold until
    /// the next selection.
    pub fn begin(&self, pipeline: Pipeline) -> Option<(CommitTicket, SelectionKey)> {
        let mut ledger = self.ledger.lock();
        let ticket = ledger.issue(pipeline)?;
        Some((ticket, ledger.view.selection.clone()))
    }

    /// Tickets for a full load of the current selection, issued under one
    /// lock so every pipeline of the cycle shares a generation
    pub fn begin_cycle(&self) -> CycleTickets {
        let mut ledger = self.ledger.lock();
        let selection = ledger.view.selection.clone();
        let pair = selection.has_pair().then(|| ledger.issue(Pipeline::Pair)).flatten();
        let trades = selection.has_pair().then(|| ledger.issue(Pipeline::Trades)).flatten();
        let balances = selection
            .wants_balances()
            .then(|| ledger.issue(Pipeline::Balances))
            .flatten();

        CycleTickets {
            generation: ledger.view.generation,
            selection,
            pair,
            trades,
            balances,
        }
    }

    pub fn commit_pair(&self, ticket: CommitTicket, result: Result<PairPrices>) -> Result<CommitOutcome> {
        self.commit(ticket, |view| {
            let next = match result {
                Ok(fresh) => match view.pair.ready() {
                    Some(prior) => prior.merge(fresh),
                    None => Ok(fresh),
                },
                Err(err) => Err(err),
            };
            view.pair = settle(Pipeline::Pair, next);
            CommitOutcome::Applied
        })
    }

    /// Stale-while-revalidate refresh of the pair statistics.
    ///
    /// Only applies on top of a `Ready` payload; before the first full load
    /// the overview alone cannot produce one.
    pub fn commit_overview(&self, ticket: CommitTicket, result: Result<PairSnapshot>) -> Result<CommitOutcome> {
        self.commit(ticket, |view| {
            let Some(prior) = view.pair.ready() else {
                return CommitOutcome::Skipped;
            };
            let next = result.and_then(|fresh| prior.with_overview(fresh));
            view.pair = settle(Pipeline::Pair, next);
            CommitOutcome::Applied
        })
    }

    pub fn commit_trades(&self, ticket: CommitTicket, result: Result<Trades>) -> Result<CommitOutcome> {
        self.commit(ticket, |view| {
            view.trades = settle(Pipeline::Trades, result);
            CommitOutcome::Applied
        })
    }

    pub fn commit_balances(&self, ticket: CommitTicket, result: Result<BalanceMap>) -> Result<CommitOutcome> {
        self.commit(ticket, |view| {
            view.balances = settle(Pipeline::Balances, result);
            CommitOutcome::Applied
        })
    }

    fn commit<F>(&self, ticket: CommitTicket, apply: F) -> Result<CommitOutcome>
    where
        F: FnOnce(&mut DashboardView) -> CommitOutcome,
    {
        let mut ledger = self.ledger.lock();
        self.tracker.guard(ticket.pipeline, ticket.generation)?;

        let slot = ticket.pipeline.index();
        if ticket.sequence <= ledger.applied[slot] {
            return Err(DashboardError::SupersededRefresh {
                pipeline: ticket.pipeline,
                sequence: ticket.sequence,
                applied: ledger.applied[slot],
            });
        }
        if ledger.view.is_failed(ticket.pipeline) {
            return Ok(CommitOutcome::Skipped);
        }

        let outcome = apply(&mut ledger.view);
        if outcome == CommitOutcome::Applied {
            ledger.applied[slot] = ticket.sequence;
            debug!(
                generation = %ticket.generation,
                pipeline = %ticket.pipeline,
                sequence = ticket.sequence,
                state = ledger.view.label(ticket.pipeline),
                "committed"
            );
            self.publish(&ledger.view);
        }
        Ok(outcome)
    }

    fn publish(&self, view: &DashboardView) {
        self.updates.send_replace(view.clone());
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn settle<T>(pipeline: Pipeline, result: Result<T>) -> FetchState<T> {
    match result {
        Ok(payload) => FetchState::Ready(payload),
        Err(err) => {
            if let DashboardError::Model(types::TypesError::IdentityMismatch { .. }) = &err {
                error!("Refusing {} refresh: {}", pipeline, err);
            }
            FetchState::Error(err.to_string())
        }
    }
}
