use std::collections::HashMap;
use std::hash::Hash;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Weighted occurrence counter that remembers first-insertion order.
///
/// Ties are always resolved in favour of the key that was seen first, which
/// keeps rankings deterministic for a given input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally<K: Eq + Hash> {
    entries: Vec<(K, u64)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash> Default for Tally<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K, weight: u64) {
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 += weight,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, weight));
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    /// Highest count, earliest key on ties.
    pub fn most_common(&self) -> Option<(&K, u64)> {
        let mut best: Option<(&K, u64)> = None;
        for (key, count) in self.iter() {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((key, count));
            }
        }
        best
    }

    /// The `limit` highest counts in descending order, earliest key on ties.
    pub fn ranked(&self, limit: usize) -> Vec<(K, u64)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);
        ranked
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.add(key, 1);
        }
        tally
    }
}

impl<K: Eq + Hash + Serialize> Serialize for Tally<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}
