//! Candidate resolution: one dispatcher from (pool, mode, sealed) to the
//! eligible id set.

use std::collections::BTreeSet;

use rondo_types::{ItemName, LatLng, Mode, ScopeError, haversine_km};

use crate::pool::Pool;

/// A resolved scope.
///
/// `base_pool` is everything the filter matched, sealed included: pool
/// order for all/region modes, distance-ascending for nearest. `candidates`
/// is the drawable subset. Both are non-empty by construction; the terminal
/// conditions are [`ScopeError`] values instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub candidates: Vec<ItemName>,
    pub base_pool: Vec<ItemName>,
}

/// Resolve `mode` against the pool.
///
/// `EmptyScope` and `ScopeExhausted` are distinct terminals: the first means
/// the filter matched nothing, the second that everything it matched is
/// already sealed. `LocationRequired` means the scope was never evaluated
/// at all.
pub fn resolve_candidates(
    pool: &Pool,
    mode: &Mode,
    sealed: &BTreeSet<ItemName>,
) -> Result<Scope, ScopeError> {
    let base_pool = match mode {
        Mode::All | Mode::ByRegion(None) => pool.names().to_vec(),
        Mode::ByRegion(Some(region)) => pool
            .iter()
            .filter(|item| item.region.as_deref() == Some(region.as_str()))
            .map(|item| item.name.clone())
            .collect(),
        Mode::Nearest { location, limit } => {
            let origin = (*location).ok_or(ScopeError::LocationRequired)?;
            nearest_names(pool, origin, *limit)
        }
    };

    if base_pool.is_empty() {
        return Err(ScopeError::EmptyScope);
    }

    let candidates: Vec<ItemName> = base_pool
        .iter()
        .filter(|name| !sealed.contains(*name))
        .cloned()
        .collect();
    if candidates.is_empty() {
        return Err(ScopeError::ScopeExhausted);
    }

    Ok(Scope {
        candidates,
        base_pool,
    })
}

/// Distance-ascending prefix of the items that carry coordinates.
fn nearest_names(pool: &Pool, origin: LatLng, limit: usize) -> Vec<ItemName> {
    let mut with_distance: Vec<(f64, &ItemName)> = pool
        .iter()
        .filter_map(|item| {
            item.coordinates
                .map(|at| (haversine_km(origin, at), &item.name))
        })
        .collect();
    with_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
    with_distance
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.clone())
        .collect()
}
