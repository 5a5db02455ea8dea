//! Selection key tracking and the staleness guard
//!
//! The tracker owns the current `(pair, account)` selection and a generation
//! counter that advances on every change. Asynchronous work captures the
//! generation at launch and is only allowed to commit while that generation
//! is still current. Superseded work is not cancelled; it runs to completion
//! and its result is dropped by [`SelectionTracker::guard`].

use crate::error::{DashboardError, Result};
use crate::state::Pipeline;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter distinguishing successive selections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    pub const INITIAL: Generation = Generation(0);

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// What the dashboard is currently looking at
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionKey {
    pub pair_id: Option<String>,
    pub account: Option<String>,
}

impl SelectionKey {
    pub fn new(pair_id: Option<String>, account: Option<String>) -> Self {
        Self { pair_id, account }
    }

    /// Selection of a pair with no wallet connected
    pub fn pair(pair_id: impl Into<String>) -> Self {
        Self {
            pair_id: Some(pair_id.into()),
            account: None,
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn has_pair(&self) -> bool {
        self.pair_id.is_some()
    }

    /// Balances need both a pair and a connected wallet
    pub fn wants_balances(&self) -> bool {
        self.pair_id.is_some() && self.account.is_some()
    }
}

pub struct SelectionTracker {
    key: RwLock<SelectionKey>,
    generation: AtomicU64,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self {
            key: RwLock::new(SelectionKey::default()),
            generation: AtomicU64::new(Generation::INITIAL.0),
        }
    }

    pub fn current_generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::Acquire))
    }

    pub fn current_key(&self) -> SelectionKey {
        self.key.read().clone()
    }

    /// Current key and generation, read together
    pub fn capture(&self) -> (Generation, SelectionKey) {
        let key = self.key.read();
        (self.current_generation(), key.clone())
    }

    pub fn is_stale(&self, captured: Generation) -> bool {
        captured != self.current_generation()
    }

    /// Error out when `captured` is no longer the current generation
    pub fn guard(&self, pipeline: Pipeline, captured: Generation) -> Result<()> {
        let current = self.current_generation();
        if captured != current {
            return Err(DashboardError::StaleResultDiscarded {
                pipeline,
                generation: captured,
                current,
            });
        }
        Ok(())
    }

    /// Switch to `key`, minting a new generation.
    ///
    /// Returns `None` when `key` equals the current selection and `force` is
    /// not set, so re-selecting the same pair keeps in-flight work valid.
    pub(crate) fn advance(&self, key: SelectionKey, force: bool) -> Option<Generation> {
        let mut current = self.key.write();
        if *current == key && !force {
            return None;
        }
        *current = key;
        let next = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        Some(Generation(next))
    }
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_advances_on_change() {
        let tracker = SelectionTracker::new();
        assert_eq!(tracker.current_generation(), Generation::INITIAL);

        let g1 = tracker.advance(SelectionKey::pair("0xabc"), false).unwrap();
        let g2 = tracker
            .advance(SelectionKey::pair("0xabc").with_account("0xdef"), false)
            .unwrap();

        assert!(g2 > g1);
        assert_eq!(tracker.current_generation(), g2);
        assert!(tracker.is_stale(g1));
        assert!(!tracker.is_stale(g2));
    }

    #[test]
    fn test_same_key_keeps_generation() {
        let tracker = SelectionTracker::new();
        let g1 = tracker.advance(SelectionKey::pair("0xabc"), false).unwrap();

        assert_eq!(tracker.advance(SelectionKey::pair("0xabc"), false), None);
        assert_eq!(tracker.current_generation(), g1);

        let forced = tracker.advance(SelectionKey::pair("0xabc"), true).unwrap();
        assert!(forced > g1);
    }

    #[test]
    fn test_guard_reports_stale_generation() {
        let tracker = SelectionTracker::new();
        let g1 = tracker.advance(SelectionKey::pair("0xabc"), false).unwrap();
        tracker.advance(SelectionKey::pair("0x123"), false);

        let err = tracker.guard(Pipeline::Pair, g1).unwrap_err();
        assert!(err.is_discarded());
        assert_eq!(tracker.capture().1, SelectionKey::pair("0x123"));
    }

    #[test]
    fn test_balances_need_pair_and_account() {
        assert!(!SelectionKey::pair("0xabc").wants_balances());
        assert!(SelectionKey::pair("0xabc").with_account("0xdef").wants_balances());
        assert!(!SelectionKey::new(None, Some("0xdef".to_string())).wants_balances());
    }
}
