//! Insertion-ordered accumulator used for frequency counting
//!
//! Sorting results by count is stable, so ties keep the order in which
//! names were first seen.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub(crate) struct Tally<V> {
    items: Vec<V>,
    index: HashMap<String, usize>,
}

impl<V> Tally<V> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Get the value for `key`, creating it with `make` on first sight
    pub fn entry(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.items.push(make());
                self.index.insert(key.to_string(), self.items.len() - 1);
                self.items.len() - 1
            }
        };
        &mut self.items[idx]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn into_vec(self) -> Vec<V> {
        self.items
    }
}

impl<V> Default for Tally<V> {
    fn default() -> Self {
        Self::new()
    }
}
