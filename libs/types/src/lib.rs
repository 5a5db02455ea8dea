//! # Pair Dashboard Types
//!
//! Shared data model for the pair dashboard services.
//!
//! ## Design Philosophy
//!
//! - **Identity vs statistics**: a [`PairSnapshot`] separates the fields that never
//!   change for a pair (addresses, creation time) from the statistics that are
//!   replaced on every refresh
//! - **No Precision Loss**: USD statistics are `rust_decimal::Decimal`, on-chain
//!   balances and allowances are 256-bit integers
//! - **Wholesale replacement**: historical series and event windows are replaced
//!   as a unit, never patched point by point
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{BalanceMap, TokenBalanceEntry};
//! use ethers_core::types::U256;
//!
//! let mut balances = BalanceMap::new();
//! balances
//!     .insert(
//!         "ETH",
//!         TokenBalanceEntry {
//!             token_id: "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE".to_string(),
//!             symbol: "ETH".to_string(),
//!             decimals: 18,
//!             balance: U256::from(1_000u64),
//!             allowance: U256::zero(),
//!         },
//!     )
//!     .unwrap();
//! assert_eq!(balances.len(), 1);
//! ```

pub mod balances;
pub mod error;
pub mod events;
pub mod pair;
pub mod position;
pub mod series;

pub use balances::{BalanceMap, TokenBalanceEntry, CURRENT_PAIR_KEY};
pub use error::TypesError;
pub use events::{LiquidityChange, LiquidityEvent, SwapEvent};
pub use pair::{PairSnapshot, PairStats, TokenInfo};
pub use position::{PairPosition, PositionSnapshot};
pub use series::{HistoricalPoint, HistoricalSeries, Resolution};
