//! Bounded undo snapshots.
//!
//! Every mutating operation pushes a full copy of the ledger fields first;
//! `undo` replaces (never merges) live state with the popped copy. Single
//! direction: popped snapshots are discarded, there is no redo.

use serde::{Deserialize, Serialize};

use crate::ledgers::Ledgers;
use crate::store::{PersistentStore, keys};

/// Max snapshots retained; the oldest is dropped on overflow.
pub const MAX_UNDO_DEPTH: usize = 40;

/// One immutable capture of the ledger fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoSnapshot {
    /// The operation that pushed this snapshot, for display.
    pub label: String,
    state: Ledgers,
}

impl UndoSnapshot {
    pub(crate) fn into_state(self) -> Ledgers {
        self.state
    }
}

/// LIFO stack of [`UndoSnapshot`]s, persisted as one JSON array.
#[derive(Debug, Default)]
pub struct UndoStack {
    snapshots: Vec<UndoSnapshot>,
}

impl UndoStack {
    /// Decode the stack from the store; malformed content is an empty
    /// stack, oversized content keeps the newest entries.
    pub fn load(store: &impl PersistentStore) -> Self {
        let Some(raw) = store.get(keys::UNDO_STACK) else {
            return Self::default();
        };
        match serde_json::from_str::<Vec<UndoSnapshot>>(&raw) {
            Ok(mut snapshots) => {
                trim_to_depth(&mut snapshots);
                Self { snapshots }
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed undo stack: {e}");
                Self::default()
            }
        }
    }

    pub(crate) fn persist(&self, store: &mut impl PersistentStore) {
        let json = serde_json::to_string(&self.snapshots).expect("snapshots always serialize");
        store.set(keys::UNDO_STACK, &json);
    }

    pub(crate) fn push(&mut self, label: &'static str, state: &Ledgers) {
        self.snapshots.push(UndoSnapshot {
            label: label.to_owned(),
            state: state.clone(),
        });
        trim_to_depth(&mut self.snapshots);
    }

    pub(crate) fn pop(&mut self) -> Option<UndoSnapshot> {
        self.snapshots.pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot labels, oldest first.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.snapshots
            .iter()
            .map(|snapshot| snapshot.label.as_str())
            .collect()
    }
}

fn trim_to_depth(snapshots: &mut Vec<UndoSnapshot>) {
    if snapshots.len() > MAX_UNDO_DEPTH {
        let overflow = snapshots.len() - MAX_UNDO_DEPTH;
        snapshots.drain(0..overflow);
    }
}
