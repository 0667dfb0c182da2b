//! MCTS node arena keyed by canonical position hash.

use ofc_core::{Move, Position};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MctsNodeId(pub u32);

#[derive(Debug, Clone)]
pub struct MctsNode {
    pub position: Position,
    pub visits: u32,
    pub value_sum: f64,
    pub min_value: f64,
    pub max_value: f64,
    /// Expanded edges. A node reached by transposition may appear under
    /// several parents with different moves.
    pub children: Vec<(Move, MctsNodeId)>,
    /// Legal moves not yet expanded.
    pub untried: Vec<Move>,
    pub is_terminal: bool,
}

impl MctsNode {
    fn new(position: Position) -> Self {
        let untried = position.get_legal_moves();
        let is_terminal = position.is_terminal_position();
        Self {
            position,
            visits: 0,
            value_sum: 0.0,
            min_value: f64::INFINITY,
            max_value: f64::NEG_INFINITY,
            children: Vec::new(),
            untried,
            is_terminal,
        }
    }

    #[inline]
    pub fn average_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / f64::from(self.visits)
        }
    }

    /// Selection stops here: nothing left to expand through UCB1.
    pub fn is_frontier(&self) -> bool {
        self.is_terminal || !self.untried.is_empty() || self.children.is_empty()
    }

    pub fn record(&mut self, value: f64) {
        self.visits += 1;
        self.value_sum += value;
        self.min_value = self.min_value.min(value);
        self.max_value = self.max_value.max(value);
    }
}

/// Arena of search nodes plus the position-hash index used to share
/// transposed positions.
#[derive(Debug, Default)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
    index: HashMap<String, MctsNodeId>,
    transposition_hits: u64,
}

impl MctsTree {
    pub fn new(root: Position) -> Self {
        let mut tree = Self::default();
        tree.intern(root);
        tree
    }

    pub fn root(&self) -> MctsNodeId {
        MctsNodeId(0)
    }

    /// Returns the node for `position`, creating it when the position has
    /// not been seen. The flag is true for a fresh node.
    pub fn intern(&mut self, position: Position) -> (MctsNodeId, bool) {
        if let Some(id) = self.index.get(position.get_position_hash()) {
            self.transposition_hits += 1;
            return (*id, false);
        }
        let id = MctsNodeId(self.nodes.len() as u32);
        self.index
            .insert(position.get_position_hash().to_string(), id);
        self.nodes.push(MctsNode::new(position));
        (id, true)
    }

    pub fn get(&self, id: MctsNodeId) -> &MctsNode {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: MctsNodeId) -> &mut MctsNode {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn transposition_hits(&self) -> u64 {
        self.transposition_hits
    }

    /// Most visited root move; the earliest expanded move wins ties.
    pub fn best_move(&self) -> Option<Move> {
        let root = self.get(self.root());
        let mut best: Option<(Move, u32)> = None;
        for (mv, child) in &root.children {
            let visits = self.get(*child).visits;
            if best.is_none_or(|(_, top)| visits > top) {
                best = Some((*mv, visits));
            }
        }
        best.map(|(mv, _)| mv)
    }
}
