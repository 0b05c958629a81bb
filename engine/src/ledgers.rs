//! Seal, won-this-batch, history and favorite ledgers plus the completion
//! latch.
//!
//! Mutation rules live here; so does the per-key persistence encoding, so
//! the store only ever sees opaque strings. Decoding is tolerant: missing
//! or malformed values become empty/false, never errors.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use rondo_types::ItemName;

use crate::store::{PersistentStore, keys};

/// The five persisted ledger fields.
///
/// `Clone` doubles as the undo snapshot mechanism: a snapshot is a plain
/// copy of this struct, and restoring replaces the whole struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledgers {
    sealed: BTreeSet<ItemName>,
    won_this_batch: BTreeSet<ItemName>,
    history: Vec<ItemName>,
    favorites: BTreeSet<ItemName>,
    completion: bool,
}

impl Ledgers {
    /// Decode all ledgers from the store.
    pub fn load(store: &impl PersistentStore) -> Self {
        Self {
            sealed: decode_set(store, keys::SEALED),
            won_this_batch: decode_set(store, keys::WON_THIS_BATCH),
            history: decode_list(store, keys::HISTORY),
            favorites: decode_set(store, keys::FAVORITES),
            completion: decode_flag(store, keys::COMPLETION),
        }
    }

    pub(crate) fn persist(&self, store: &mut impl PersistentStore) {
        store.set(keys::SEALED, &encode_names(self.sealed.iter()));
        store.set(
            keys::WON_THIS_BATCH,
            &encode_names(self.won_this_batch.iter()),
        );
        store.set(keys::HISTORY, &encode_names(self.history.iter()));
        store.set(keys::FAVORITES, &encode_names(self.favorites.iter()));
        store.set(
            keys::COMPLETION,
            if self.completion { "true" } else { "false" },
        );
    }

    /// Items permanently retired from winner eligibility.
    #[must_use]
    pub fn sealed(&self) -> &BTreeSet<ItemName> {
        &self.sealed
    }

    /// Items already won in the currently active batch.
    #[must_use]
    pub fn won_this_batch(&self) -> &BTreeSet<ItemName> {
        &self.won_this_batch
    }

    /// Accepted picks, first-occurrence order, each at most once.
    #[must_use]
    pub fn history(&self) -> &[ItemName] {
        &self.history
    }

    #[must_use]
    pub fn favorites(&self) -> &BTreeSet<ItemName> {
        &self.favorites
    }

    #[must_use]
    pub fn is_favorite(&self, name: &ItemName) -> bool {
        self.favorites.contains(name)
    }

    /// Whether every pool item has been sealed at least once this cycle.
    #[must_use]
    pub fn completion(&self) -> bool {
        self.completion
    }

    /// Record an accepted winner. Returns true when this call latches the
    /// completion flag; the latch fires at most once per reset cycle.
    pub(crate) fn accept_win(&mut self, name: &ItemName, pool_len: usize) -> bool {
        self.won_this_batch.insert(name.clone());
        self.sealed.insert(name.clone());
        if !self.history.contains(name) {
            self.history.push(name.clone());
        }
        if !self.completion && pool_len > 0 && self.sealed.len() >= pool_len {
            self.completion = true;
            return true;
        }
        false
    }

    /// Forget a pick: drop `name` from sealed, won and history. No-op for
    /// names recorded in none of them.
    pub(crate) fn forget(&mut self, name: &ItemName) {
        self.sealed.remove(name);
        self.won_this_batch.remove(name);
        self.history.retain(|recorded| recorded != name);
    }

    /// Whether `name` appears in any pick-tracking ledger.
    pub(crate) fn has_record(&self, name: &ItemName) -> bool {
        self.sealed.contains(name)
            || self.won_this_batch.contains(name)
            || self.history.contains(name)
    }

    /// Toggle favorite membership; returns the new state.
    pub(crate) fn toggle_favorite(&mut self, name: &ItemName) -> bool {
        if self.favorites.remove(name) {
            false
        } else {
            self.favorites.insert(name.clone());
            true
        }
    }

    pub(crate) fn clear_favorites(&mut self) {
        self.favorites.clear();
    }

    /// A batch is the no-repeat scope for wins; sampling a new one clears
    /// this set.
    pub(crate) fn clear_won(&mut self) {
        self.won_this_batch.clear();
    }

    /// Clear sealed + won and unlatch completion. History and favorites
    /// are untouched.
    pub(crate) fn reset_no_repeat(&mut self) {
        self.sealed.clear();
        self.won_this_batch.clear();
        self.completion = false;
    }
}

fn encode_names<'a>(names: impl Iterator<Item = &'a ItemName>) -> String {
    serde_json::to_string(&names.collect::<Vec<_>>()).expect("id lists always serialize")
}

fn decode_list(store: &impl PersistentStore, key: &str) -> Vec<ItemName> {
    let Some(raw) = store.get(key) else {
        return Vec::new();
    };
    let parsed: Vec<String> = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Ignoring malformed persisted value for {key}: {e}");
            return Vec::new();
        }
    };

    // Blank entries are dropped, duplicates keep their first occurrence.
    let mut seen = BTreeSet::new();
    parsed
        .into_iter()
        .filter_map(|raw_name| ItemName::new(&raw_name).ok())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn decode_set(store: &impl PersistentStore, key: &str) -> BTreeSet<ItemName> {
    decode_list(store, key).into_iter().collect()
}

fn decode_flag(store: &impl PersistentStore, key: &str) -> bool {
    store
        .get(key)
        .is_some_and(|raw| raw.trim() == "true")
}
