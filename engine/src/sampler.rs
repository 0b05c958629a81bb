//! Batch sampling without replacement.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

use rondo_types::ItemName;

use crate::candidates::Scope;

/// The fixed working batch. Position is the wedge-index assignment and is
/// frozen for the batch's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBatch {
    order: Vec<ItemName>,
}

impl ActiveBatch {
    /// Wedge order, index 0 first.
    #[must_use]
    pub fn order(&self) -> &[ItemName] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn index_of(&self, name: &ItemName) -> Option<usize> {
        self.order.iter().position(|slot| slot == name)
    }

    #[must_use]
    pub fn contains(&self, name: &ItemName) -> bool {
        self.order.contains(name)
    }
}

/// Draw a batch of exactly `min(target, |base_pool|)` names.
///
/// The primary draw is uniform without replacement from the candidates. A
/// forced include that missed the draw takes the last slot when the draw is
/// already full, otherwise it is appended. Any remaining slots are padded
/// from the rest of the base pool, where sealed names are legal filler.
pub(crate) fn sample_batch(
    scope: &Scope,
    target: usize,
    force_include: Option<&ItemName>,
    rng: &mut impl Rng,
) -> ActiveBatch {
    let max_len = target.min(scope.base_pool.len());

    let mut order = draw(&scope.candidates, target.min(scope.candidates.len()), rng);

    if let Some(forced) = force_include
        && !order.contains(forced)
    {
        if order.len() >= max_len && !order.is_empty() {
            let last = order.len() - 1;
            order[last] = forced.clone();
        } else {
            order.push(forced.clone());
        }
        dedupe_in_place(&mut order);
    }

    if order.len() < max_len {
        let remainder: Vec<ItemName> = scope
            .base_pool
            .iter()
            .filter(|name| !order.contains(name))
            .cloned()
            .collect();
        let filler = draw(&remainder, max_len - order.len(), rng);
        order.extend(filler);
    }

    order.truncate(max_len);
    ActiveBatch { order }
}

/// Uniform draw without replacement: unbiased shuffle, take the prefix.
fn draw(names: &[ItemName], count: usize, rng: &mut impl Rng) -> Vec<ItemName> {
    let mut shuffled = names.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

fn dedupe_in_place(order: &mut Vec<ItemName>) {
    let mut seen = BTreeSet::new();
    order.retain(|name| seen.insert(name.clone()));
}
