//! Wallet balances and spending allowances

use crate::error::TypesError;
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the synthesized liquidity-token entry
pub const CURRENT_PAIR_KEY: &str = "currentPair";

/// Balance and allowance of one token for the connected account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalanceEntry {
    pub token_id: String,
    pub symbol: String,
    pub decimals: u8,
    pub balance: U256,
    pub allowance: U256,
}

impl TokenBalanceEntry {
    /// True when spending `amount` requires a fresh approval
    pub fn needs_approval(&self, amount: U256) -> bool {
        self.allowance < amount
    }

    /// True when the account holds at least `amount`
    pub fn covers(&self, amount: U256) -> bool {
        self.balance >= amount
    }
}

/// Balances keyed by symbol; keys are unique
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceMap {
    entries: BTreeMap<String, TokenBalanceEntry>,
}

impl BalanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, rejecting a key that is already present
    pub fn insert(&mut self, key: impl Into<String>, entry: TokenBalanceEntry) -> Result<(), TypesError> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(TypesError::DuplicateBalanceKey { key });
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&TokenBalanceEntry> {
        self.entries.get(key)
    }

    /// The synthesized liquidity-token entry
    pub fn current_pair(&self) -> Option<&TokenBalanceEntry> {
        self.entries.get(CURRENT_PAIR_KEY)
    }

    /// Look an entry up by token address instead of key
    pub fn by_token(&self, token_id: &str) -> Option<&TokenBalanceEntry> {
        self.entries
            .values()
            .find(|entry| entry.token_id.eq_ignore_ascii_case(token_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenBalanceEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}
