//! Append-only item pool.

use std::collections::HashMap;

use rondo_types::{Item, ItemName};

/// Ordered, deduplicated item pool. Items are created once at load; the
/// pool only ever grows for the lifetime of an engine.
#[derive(Debug, Default)]
pub struct Pool {
    order: Vec<ItemName>,
    items: HashMap<ItemName, Item>,
}

impl Pool {
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut pool = Self::default();
        for item in items {
            pool.insert(item);
        }
        pool
    }

    /// Insert an item; the first occurrence of a name wins. Returns whether
    /// the pool grew.
    pub fn insert(&mut self, item: Item) -> bool {
        if self.items.contains_key(&item.name) {
            return false;
        }
        self.order.push(item.name.clone());
        self.items.insert(item.name.clone(), item);
        true
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
    pub fn contains(&self, name: &ItemName) -> bool {
        self.items.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &ItemName) -> Option<&Item> {
        self.items.get(name)
    }

    /// Names in load order.
    #[must_use]
    pub fn names(&self) -> &[ItemName] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.order.iter().filter_map(|name| self.items.get(name))
    }
}
