use crate::tree::node::{GameTreeNode, NodeAction, NodeId, PineappleAction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub leaf_nodes: usize,
    pub terminal_nodes: usize,
    pub fouled_nodes: usize,
    pub max_depth: u32,
    pub total_actions: usize,
}

/// Sole owner of every node and edge. Nodes refer to each other by id only.
#[derive(Debug, Clone, Default)]
pub struct GameTree {
    nodes: BTreeMap<NodeId, GameTreeNode>,
    actions: BTreeMap<(NodeId, NodeId), NodeAction>,
    next_id: u32,
}

impl GameTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    pub(crate) fn insert(&mut self, node: GameTreeNode) {
        self.nodes.insert(node.id, node);
    }

    /// Records the edge and appends `to` to the parent's children.
    pub(crate) fn link(
        &mut self,
        from: NodeId,
        to: NodeId,
        action: PineappleAction,
        action_index: usize,
    ) {
        if let Some(parent) = self.nodes.get_mut(&from) {
            if !parent.children.contains(&to) {
                parent.children.push(to);
            }
        }
        self.actions.insert(
            (from, to),
            NodeAction {
                from,
                to,
                action,
                action_index,
            },
        );
    }

    pub fn get(&self, id: NodeId) -> Option<&GameTreeNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut GameTreeNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GameTreeNode> {
        self.nodes.values()
    }

    pub fn actions(&self) -> impl Iterator<Item = &NodeAction> {
        self.actions.values()
    }

    pub fn action(&self, from: NodeId, to: NodeId) -> Option<&NodeAction> {
        self.actions.get(&(from, to))
    }

    pub fn incoming(&self, to: NodeId) -> impl Iterator<Item = &NodeAction> {
        self.actions.values().filter(move |edge| edge.to == to)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deletes a node, every edge touching it, and its entry in parents'
    /// child lists. Children of the node are left in place.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<GameTreeNode> {
        let node = self.nodes.remove(&id)?;
        let parents: Vec<NodeId> = self
            .actions
            .keys()
            .filter(|(_, to)| *to == id)
            .map(|(from, _)| *from)
            .collect();
        for parent in parents.iter().chain(node.parent.iter()) {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.retain(|child| *child != id);
            }
        }
        self.actions.retain(|(from, to), _| *from != id && *to != id);
        Some(node)
    }

    /// Points every edge into `from` at `to` instead.
    pub(crate) fn redirect(&mut self, from: NodeId, to: NodeId) {
        let moved: Vec<NodeAction> = self
            .actions
            .values()
            .filter(|edge| edge.to == from)
            .cloned()
            .collect();
        for edge in moved {
            self.actions.remove(&(edge.from, from));
            if let Some(parent) = self.nodes.get_mut(&edge.from) {
                parent.children.retain(|child| *child != from);
            }
            self.link(edge.from, to, edge.action, edge.action_index);
        }
    }

    pub fn get_tree_stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            total_nodes: self.nodes.len(),
            total_actions: self.actions.len(),
            ..TreeStats::default()
        };
        for node in self.nodes.values() {
            if node.is_leaf() {
                stats.leaf_nodes += 1;
            }
            if node.is_terminal {
                stats.terminal_nodes += 1;
            }
            if node.is_fouled {
                stats.fouled_nodes += 1;
            }
            stats.max_depth = stats.max_depth.max(node.depth);
        }
        stats
    }
}
