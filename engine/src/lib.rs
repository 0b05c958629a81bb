//! Selection engine for Rondo: ledgers, batches and spins.
//!
//! One [`Engine`] instance owns every piece of mutable session state (pool,
//! ledgers, active batch, rotation, undo stack); there are no process-wide
//! statics. Persistence goes through the injected [`PersistentStore`]
//! capability, so tests run against an in-memory fake and a UI runs against
//! the JSON file store.

mod candidates;
mod ledgers;
mod pool;
mod sampler;
mod spin;
mod store;
mod undo;

#[cfg(test)]
mod tests;

pub use candidates::{Scope, resolve_candidates};
pub use ledgers::Ledgers;
pub use pool::Pool;
pub use sampler::ActiveBatch;
pub use spin::SpinOutcome;
pub use store::{JsonFileStore, MemoryStore, PersistentStore, keys};
pub use undo::{MAX_UNDO_DEPTH, UndoSnapshot, UndoStack};

use rand::SeedableRng;
use rand::rngs::StdRng;

use rondo_types::{DEFAULT_BATCH_SIZE, EmptyNameError, Item, ItemName, Mode, ScopeError};

use crate::spin::SpinPhase;

/// The selection engine. Constructed once per session.
///
/// All operations are synchronous and atomic with respect to each other;
/// the only asynchronous element (the animated spin) lives on the caller
/// side of the [`Engine::spin`] / [`Engine::settle`] boundary.
pub struct Engine<S: PersistentStore> {
    store: S,
    pool: Pool,
    mode: Mode,
    batch_size: usize,
    ledgers: Ledgers,
    undo: UndoStack,
    batch: Option<ActiveBatch>,
    last_winner: Option<ItemName>,
    rotation: f64,
    phase: SpinPhase,
    rng: StdRng,
}

impl<S: PersistentStore> Engine<S> {
    /// Build an engine over `store`, adopting whatever ledger state the
    /// store already holds.
    ///
    /// `items` come from the data-source collaborator with ids already
    /// trimmed and deduplicated; the pool re-dedupes defensively.
    pub fn new(store: S, items: impl IntoIterator<Item = Item>) -> Self {
        let pool = Pool::from_items(items);
        let ledgers = Ledgers::load(&store);
        let undo = UndoStack::load(&store);
        Self {
            store,
            pool,
            mode: Mode::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            ledgers,
            undo,
            batch: None,
            last_winner: None,
            rotation: 0.0,
            phase: SpinPhase::default(),
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Override the target batch size (wedge count). Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Reseed the RNG for reproducible draws.
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn active_batch(&self) -> Option<&ActiveBatch> {
        self.batch.as_ref()
    }

    /// The most recently accepted winner, if it is still current.
    #[must_use]
    pub fn last_winner(&self) -> Option<&ItemName> {
        self.last_winner.as_ref()
    }

    #[must_use]
    pub fn ledgers(&self) -> &Ledgers {
        &self.ledgers
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tear down the engine and hand back the store, e.g. to reopen a
    /// session against it.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Resolve the current mode without sampling, for availability hints.
    pub fn current_scope(&self) -> Result<Scope, ScopeError> {
        resolve_candidates(&self.pool, &self.mode, self.ledgers.sealed())
    }

    // ------------------------------------------------------------------
    // Scope & batches
    // ------------------------------------------------------------------

    /// Switch the candidate scope. The active batch belongs to the old
    /// scope and is dropped; sample a new one before spinning.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.batch = None;
        self.last_winner = None;
    }

    /// Sample a fresh batch for the current mode.
    ///
    /// Clears won-this-batch (a batch is the no-repeat scope for wins) and
    /// forgets the previous winner. A `force_include` name that survives
    /// the filter is guaranteed a slot. On a terminal scope condition the
    /// active batch is dropped and the condition returned.
    pub fn new_batch(
        &mut self,
        force_include: Option<&ItemName>,
    ) -> Result<&ActiveBatch, ScopeError> {
        let scope = match self.current_scope() {
            Ok(scope) => scope,
            Err(e) => {
                self.batch = None;
                self.last_winner = None;
                return Err(e);
            }
        };

        let batch = sampler::sample_batch(&scope, self.batch_size, force_include, &mut self.rng);
        self.ledgers.clear_won();
        self.ledgers.persist(&mut self.store);
        self.last_winner = None;
        tracing::debug!(len = batch.len(), "sampled new batch");
        Ok(self.batch.insert(batch))
    }

    /// Append an item to the pool. Trims the name; blank names are
    /// rejected, duplicates leave the pool unchanged.
    ///
    /// Ledgers are untouched and no snapshot is pushed: growing the pool
    /// is not an undoable pick mutation. Re-sample with
    /// `new_batch(Some(&name))` to offer the new item immediately.
    pub fn add_item(&mut self, raw: &str) -> Result<ItemName, EmptyNameError> {
        let name = ItemName::new(raw)?;
        if self.pool.insert(Item::new(name.clone())) {
            tracing::debug!(item = %name, "added item to pool");
        }
        Ok(name)
    }

    // ------------------------------------------------------------------
    // Ledger mutations
    // ------------------------------------------------------------------

    /// Preserve the most recently accepted winner: unseal it, un-win it
    /// and strike it from history, as if the pick never happened. No-op
    /// for any other name.
    pub fn preserve(&mut self, name: &ItemName) {
        if self.last_winner.as_ref() != Some(name) {
            tracing::debug!(item = %name, "preserve ignored: not the current winner");
            return;
        }
        self.push_undo("preserve");
        self.ledgers.forget(name);
        self.ledgers.persist(&mut self.store);
        self.last_winner = None;
    }

    /// Strike any past pick: unseal, un-win and remove from history, which
    /// makes the item immediately drawable again. Unlike
    /// [`Engine::preserve`] this addresses any recorded id. Absent ids
    /// no-op.
    pub fn delete_record(&mut self, name: &ItemName) {
        if !self.ledgers.has_record(name) {
            return;
        }
        self.push_undo("delete-record");
        self.ledgers.forget(name);
        self.ledgers.persist(&mut self.store);
        if self.last_winner.as_ref() == Some(name) {
            self.last_winner = None;
        }
    }

    /// Toggle favorite membership; favorites are independent of every
    /// other ledger. Returns the new state.
    pub fn toggle_favorite(&mut self, name: &ItemName) -> bool {
        self.push_undo("favorite");
        let now_favorite = self.ledgers.toggle_favorite(name);
        self.ledgers.persist(&mut self.store);
        now_favorite
    }

    /// Empty the favorites set. No-op when already empty.
    pub fn clear_favorites(&mut self) {
        if self.ledgers.favorites().is_empty() {
            return;
        }
        self.push_undo("clear-favorites");
        self.ledgers.clear_favorites();
        self.ledgers.persist(&mut self.store);
    }

    /// Clear the no-repeat state (sealed + won) and unlatch completion.
    /// History and favorites stay.
    pub fn reset_no_repeat(&mut self) {
        self.push_undo("reset");
        self.ledgers.reset_no_repeat();
        self.ledgers.persist(&mut self.store);
    }

    // ------------------------------------------------------------------
    // Undo
    // ------------------------------------------------------------------

    /// Restore the most recent snapshot, replacing all five ledger fields.
    ///
    /// Returns false when there is nothing to undo or a spin is unsettled.
    /// After a successful undo the active batch is stale (seal/won
    /// membership may have changed retroactively) and is dropped; sample a
    /// new one before spinning.
    pub fn undo(&mut self) -> bool {
        if self.is_spinning() {
            tracing::debug!("undo ignored while spinning");
            return false;
        }
        let Some(snapshot) = self.undo.pop() else {
            return false;
        };
        tracing::debug!(label = %snapshot.label, "restoring snapshot");
        self.ledgers = snapshot.into_state();
        self.ledgers.persist(&mut self.store);
        self.undo.persist(&mut self.store);
        self.batch = None;
        self.last_winner = None;
        true
    }

    fn push_undo(&mut self, label: &'static str) {
        self.undo.push(label, &self.ledgers);
        self.undo.persist(&mut self.store);
    }
}
