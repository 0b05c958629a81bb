//! Spin resolution: winner selection and the angle contract.
//!
//! Two-phase protocol: [`Engine::spin`] resolves the winner and commits the
//! ledger mutation synchronously; the caller then animates and reports
//! [`Engine::settle`]. The outcome is durable the moment `spin` returns;
//! settle only advances the wheel's visual resting angle.

use rand::RngExt;
use rand::seq::IndexedRandom;

use rondo_types::wheel::{self, MAX_FULL_SPINS, MIN_FULL_SPINS};
use rondo_types::{ItemName, SpinError};

use crate::Engine;
use crate::store::PersistentStore;

/// What the engine hands the presentation collaborator after a resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcome {
    pub winner: ItemName,
    /// Wedge order, frozen for this batch.
    pub batch: Vec<ItemName>,
    /// Absolute rotation the animation should stop at, in degrees.
    pub final_rotation: f64,
    pub wedge_count: usize,
    /// True exactly once: on the accept that sealed the last pool item.
    pub completion_reached: bool,
}

/// The `Idle → Spinning → Idle` gate. Spinning begins at resolve and ends
/// at settle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) enum SpinPhase {
    #[default]
    Idle,
    /// A resolved spin is animating; holds the rotation to adopt on settle.
    Spinning { final_rotation: f64 },
}

impl<S: PersistentStore> Engine<S> {
    /// Resolve a spin: pick a winner uniformly from the eligible slots of
    /// the active batch and commit the accept.
    ///
    /// The commit happens before this returns, so the pick stands even if
    /// the animation never completes. Re-entry before [`Engine::settle`] is
    /// rejected; a batch with no unsealed, un-won slot resolves to
    /// [`SpinError::NoEligibleWinner`] without mutating anything.
    pub fn spin(&mut self) -> Result<SpinOutcome, SpinError> {
        if self.is_spinning() {
            return Err(SpinError::SpinInProgress);
        }

        let Some(batch) = &self.batch else {
            return Err(SpinError::NoEligibleWinner);
        };

        let eligible: Vec<&ItemName> = batch
            .order()
            .iter()
            .filter(|name| {
                !self.ledgers.won_this_batch().contains(*name)
                    && !self.ledgers.sealed().contains(*name)
            })
            .collect();
        let Some(winner) = eligible.choose(&mut self.rng).map(|name| (*name).clone()) else {
            return Err(SpinError::NoEligibleWinner);
        };

        let wedge_count = batch.len();
        let index = batch
            .index_of(&winner)
            .expect("winner drawn from the batch");
        let order = batch.order().to_vec();

        // Commit before any presentation runs.
        self.push_undo("spin");
        let completion_reached = self.ledgers.accept_win(&winner, self.pool.len());
        self.ledgers.persist(&mut self.store);
        self.last_winner = Some(winner.clone());

        let full_spins = self.rng.random_range(MIN_FULL_SPINS..=MAX_FULL_SPINS);
        let final_rotation = wheel::final_rotation(self.rotation, index, wedge_count, full_spins);
        self.phase = SpinPhase::Spinning { final_rotation };

        tracing::debug!(winner = %winner, index, wedge_count, completion_reached, "spin resolved");

        Ok(SpinOutcome {
            winner,
            batch: order,
            final_rotation,
            wedge_count,
            completion_reached,
        })
    }

    /// Report that the animation finished.
    ///
    /// Adopts the resolved rotation as the new resting angle so the next
    /// spin continues from where the wheel stopped. No ledger effect; no-op
    /// when nothing is spinning.
    pub fn settle(&mut self) {
        if let SpinPhase::Spinning { final_rotation } = self.phase {
            self.rotation = wheel::normalize_deg(final_rotation);
            self.phase = SpinPhase::Idle;
        }
    }

    /// True between a resolved [`Engine::spin`] and its settle.
    #[must_use]
    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, SpinPhase::Spinning { .. })
    }

    /// Current resting angle in `[0, 360)`.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }
}
