//! Core domain types for Rondo.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the engine.

mod geo;
pub mod wheel;

pub use geo::{LatLng, haversine_km};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of wedges offered per batch.
pub const DEFAULT_BATCH_SIZE: usize = 6;

/// Default size of the nearest-mode base pool.
pub const DEFAULT_NEAREST_LIMIT: usize = 30;

// ============================================================================
// Item identity
// ============================================================================

/// A trimmed, non-empty item identifier.
///
/// Parsing happens at the boundary: every name entering the engine goes
/// through [`ItemName::new`], so the rest of the code never re-trims or
/// re-validates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("item name must not be empty")]
pub struct EmptyNameError;

impl ItemName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmptyNameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            Err(EmptyNameError)
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ItemName {
    type Error = EmptyNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ItemName {
    type Error = EmptyNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemName> for String {
    fn from(value: ItemName) -> Self {
        value.0
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ItemName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Items
// ============================================================================

/// One selectable item, immutable once loaded.
///
/// The loader owns trimming and deduplication of incoming ids; region and
/// coordinates are optional metadata used only by the scope filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: ItemName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<LatLng>,
}

impl Item {
    #[must_use]
    pub fn new(name: ItemName) -> Self {
        Self {
            name,
            region: None,
            coordinates: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_coordinates(mut self, coordinates: LatLng) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

// ============================================================================
// Scope modes
// ============================================================================

/// Candidate scope selection.
///
/// A single tagged variant replaces string-keyed mode branching: every
/// consumer dispatches through one resolver instead of re-interpreting mode
/// strings at each call site.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    /// The whole pool.
    #[default]
    All,
    /// Items whose region matches; `None` falls back to the whole pool.
    ByRegion(Option<String>),
    /// The `limit` items closest to `location` (by great-circle distance).
    ///
    /// The location is an already-resolved collaborator result; `None` means
    /// the collaborator has not produced one and the scope is not evaluable.
    Nearest {
        location: Option<LatLng>,
        limit: usize,
    },
}

impl Mode {
    /// Nearest mode with the default pool limit.
    #[must_use]
    pub fn nearest(location: Option<LatLng>) -> Self {
        Self::Nearest {
            location,
            limit: DEFAULT_NEAREST_LIMIT,
        }
    }
}

// ============================================================================
// Error states
// ============================================================================

/// Why a scope produced no batch. All variants are non-fatal: the engine
/// stays usable (mode switch, reset, undo) after any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// Nearest mode was invoked without a location. Distinct from an empty
    /// result: the scope was never evaluated.
    #[error("nearest mode requires a location")]
    LocationRequired,
    /// The current filter matches zero items.
    #[error("no items in the current scope")]
    EmptyScope,
    /// Every item in scope is already sealed.
    #[error("every item in the current scope is already sealed")]
    ScopeExhausted,
}

/// Why a spin could not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpinError {
    /// `spin()` was re-entered before `settle()`.
    #[error("a spin is already in progress")]
    SpinInProgress,
    /// The active batch has no unsealed, un-won candidate. The sampler's
    /// contract makes this unreachable in normal call order; it is still a
    /// typed state for out-of-order callers.
    #[error("the active batch has no eligible winner")]
    NoEligibleWinner,
}
