//! Finite state exposed to the presentation layer
//!
//! Each pipeline (pair data, trades, balances) follows the same machine:
//!
//! ```text
//! Idle ──select──▶ Loading ──commit──▶ Ready(payload) ──refresh──▶ Ready(payload')
//!                     │                                   │
//!                     └──────failure──▶ Error(reason) ◀───┘
//! ```
//!
//! A refresh from `Ready` never passes back through `Loading`. `Error` holds
//! until the next selection; stale results cause no transition at all.

use crate::aggregator::{PairPrices, Trades};
use crate::selection::{Generation, SelectionKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use types::BalanceMap;

/// Independently committed pipelines of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    Pair,
    Trades,
    Balances,
}

impl Pipeline {
    pub const ALL: [Pipeline; 3] = [Pipeline::Pair, Pipeline::Trades, Pipeline::Balances];

    pub(crate) fn index(self) -> usize {
        match self {
            Pipeline::Pair => 0,
            Pipeline::Trades => 1,
            Pipeline::Balances => 2,
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pipeline::Pair => "pair data",
            Pipeline::Trades => "trades",
            Pipeline::Balances => "balances",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Error(String),
    Ready(T),
}

impl<T> FetchState<T> {
    /// Initial state for a new selection
    pub(crate) fn restart(active: bool) -> Self {
        if active {
            FetchState::Loading
        } else {
            FetchState::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, FetchState::Ready(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchState::Error(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Error(_) => "error",
            FetchState::Ready(_) => "ready",
        }
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

/// Everything the presentation layer can observe
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub generation: Generation,
    pub selection: SelectionKey,
    pub pair: FetchState<PairPrices>,
    pub trades: FetchState<Trades>,
    pub balances: FetchState<BalanceMap>,
}

impl DashboardView {
    /// Fresh view for a newly minted generation
    pub(crate) fn restarted(generation: Generation, selection: SelectionKey) -> Self {
        Self {
            generation,
            pair: FetchState::restart(selection.has_pair()),
            trades: FetchState::restart(selection.has_pair()),
            balances: FetchState::restart(selection.wants_balances()),
            selection,
        }
    }

    pub fn is_failed(&self, pipeline: Pipeline) -> bool {
        match pipeline {
            Pipeline::Pair => self.pair.is_error(),
            Pipeline::Trades => self.trades.is_error(),
            Pipeline::Balances => self.balances.is_error(),
        }
    }

    pub fn label(&self, pipeline: Pipeline) -> &'static str {
        match pipeline {
            Pipeline::Pair => self.pair.label(),
            Pipeline::Trades => self.trades.label(),
            Pipeline::Balances => self.balances.label(),
        }
    }
}
