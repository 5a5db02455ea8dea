//! Explicit debug export of the dashboard state

use crate::aggregator::PairPrices;
use crate::error::Result;
use crate::selection::{Generation, SelectionKey};
use crate::state::{DashboardView, Pipeline};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;
use types::{BalanceMap, PairSnapshot, PositionSnapshot};

/// Serializable snapshot of what the dashboard currently shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub generation: Generation,
    pub selection: SelectionKey,
    /// `idle` / `loading` / `error` / `ready` per pipeline
    pub states: BTreeMap<Pipeline, &'static str>,
    pub errors: BTreeMap<Pipeline, String>,
    pub pair_data: Option<PairSnapshot>,
    pub position: Option<PositionSnapshot>,
    pub balances: Option<BalanceMap>,
}

impl Diagnostics {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Emit the export as a single debug event
    pub fn log(&self) {
        match serde_json::to_string(self) {
            Ok(json) => debug!(generation = %self.generation, diagnostics = %json, "dashboard diagnostics"),
            Err(e) => debug!(generation = %self.generation, "diagnostics not serializable: {}", e),
        }
    }
}

impl From<&DashboardView> for Diagnostics {
    fn from(view: &DashboardView) -> Self {
        let states = Pipeline::ALL
            .into_iter()
            .map(|pipeline| (pipeline, view.label(pipeline)))
            .collect();

        let errors = [
            (Pipeline::Pair, view.pair.error()),
            (Pipeline::Trades, view.trades.error()),
            (Pipeline::Balances, view.balances.error()),
        ]
        .into_iter()
        .filter_map(|(pipeline, reason)| reason.map(|r| (pipeline, r.to_string())))
        .collect();

        let prices: Option<&PairPrices> = view.pair.ready();

        Self {
            generation: view.generation,
            selection: view.selection.clone(),
            states,
            errors,
            pair_data: prices.map(|p| p.pair_data.clone()),
            position: prices.and_then(|p| p.position.clone()),
            balances: view.balances.ready().cloned(),
        }
    }
}
