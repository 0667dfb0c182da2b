//! Canonical layout keys and the lookup table that merges equivalent nodes.

use crate::tree::node::{GameTreeNode, NodeId};
use core::fmt;
use ofc_core::{Card, Layout, Row};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Sorted row contents plus the number of cards placed. Placement order and
/// in-row order do not affect the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TranspositionKey {
    top: Vec<Card>,
    middle: Vec<Card>,
    bottom: Vec<Card>,
    cards_placed: usize,
}

impl TranspositionKey {
    pub fn new(layout: &Layout, cards_placed: usize) -> Self {
        Self {
            top: layout.sorted_row(Row::Top),
            middle: layout.sorted_row(Row::Middle),
            bottom: layout.sorted_row(Row::Bottom),
            cards_placed,
        }
    }

    pub fn for_node(node: &GameTreeNode) -> Self {
        Self::new(&node.layout, node.cards_placed)
    }
}

impl fmt::Display for TranspositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |cards: &[Card]| {
            cards
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        write!(
            f,
            "T:{}|M:{}|B:{}|{}",
            join(&self.top),
            join(&self.middle),
            join(&self.bottom),
            self.cards_placed
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TranspositionStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Unbounded key to node map. Entries are written once and never replaced.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<TranspositionKey, NodeId>,
    hits: u64,
    misses: u64,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&mut self, key: &TranspositionKey) -> Option<NodeId> {
        match self.entries.get(key) {
            Some(id) => {
                self.hits += 1;
                Some(*id)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Returns false when the key was already present.
    pub fn store(&mut self, key: TranspositionKey, id: NodeId) -> bool {
        match self.entries.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    /// Groups of two or more nodes that share a key, ordered by key.
    pub fn find_equivalent_nodes<'a>(
        &self,
        nodes: impl IntoIterator<Item = &'a GameTreeNode>,
    ) -> Vec<Vec<NodeId>> {
        let mut groups: BTreeMap<TranspositionKey, Vec<NodeId>> = BTreeMap::new();
        for node in nodes {
            groups
                .entry(TranspositionKey::for_node(node))
                .or_default()
                .push(node.id);
        }
        groups
            .into_values()
            .filter(|ids| ids.len() > 1)
            .map(|mut ids| {
                ids.sort_unstable();
                ids
            })
            .collect()
    }

    pub fn get_statistics(&self) -> TranspositionStats {
        let lookups = self.hits + self.misses;
        TranspositionStats {
            size: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
