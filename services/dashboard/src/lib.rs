//! Pair Dashboard Data Layer
//!
//! Keeps the pair dashboard consistent while the selected pair and wallet
//! change under in-flight requests. Every asynchronous result is tagged with
//! the generation of the selection it was launched for and committed only if
//! that selection is still current.

pub mod aggregator;
pub mod client;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod orchestrator;
pub mod resolver;
pub mod scheduler;
pub mod selection;
pub mod state;

pub use aggregator::{CommitOutcome, PairPrices, Trades};
pub use client::{ChainQuery, Clock, FixedClock, MarketDataApi, RemoteError, SystemClock};
pub use config::DashboardConfig;
pub use dashboard::{LoadReport, PairDashboard};
pub use diagnostics::Diagnostics;
pub use error::{DashboardError, Result};
pub use format::{format_usd, format_usd_amount};
pub use resolver::SpenderRouting;
pub use scheduler::RefreshScheduler;
pub use selection::{Generation, SelectionKey};
pub use state::{DashboardView, FetchState, Pipeline};

/// Re-export the data model
pub use types;
