//! Error types for the dashboard data layer

use crate::client::RemoteError;
use crate::selection::Generation;
use crate::state::Pipeline;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Remote call failed; displays the remote reason verbatim
    #[error("{message}")]
    Network { message: String },

    #[error("{call} timed out after {timeout_ms}ms")]
    Timeout { call: &'static str, timeout_ms: u64 },

    #[error("Pair {pair_id} is missing the {token} address")]
    MissingAddress { pair_id: String, token: &'static str },

    /// Not every member of a joined fetch set succeeded. Displays the reason
    /// of the first failed member in declaration order.
    #[error("{source}")]
    AggregateIncomplete {
        group: Pipeline,
        failed: usize,
        total: usize,
        source: Box<DashboardError>,
    },

    #[error("{pipeline} result from generation {generation} discarded, current generation is {current}")]
    StaleResultDiscarded {
        pipeline: Pipeline,
        generation: Generation,
        current: Generation,
    },

    #[error("{pipeline} refresh #{sequence} superseded by refresh #{applied}")]
    SupersededRefresh {
        pipeline: Pipeline,
        sequence: u64,
        applied: u64,
    },

    #[error(transparent)]
    Model(#[from] types::TypesError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Wrap the first failure of a joined set of `total` calls, `failed` of which failed
    pub(crate) fn incomplete(group: Pipeline, failed: usize, total: usize, first: DashboardError) -> Self {
        DashboardError::AggregateIncomplete {
            group,
            failed,
            total,
            source: Box::new(first),
        }
    }

    /// True for results dropped by the staleness guard; these never reach the user
    pub fn is_discarded(&self) -> bool {
        matches!(
            self,
            DashboardError::StaleResultDiscarded { .. } | DashboardError::SupersededRefresh { .. }
        )
    }
}

impl From<RemoteError> for DashboardError {
    fn from(err: RemoteError) -> Self {
        DashboardError::Network {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
