use crate::tree::node::{GameTreeNode, NodeAction, NodeId};
use crate::tree::store::GameTree;
use std::collections::{HashSet, VecDeque};

impl GameTree {
    /// Pre-order walk from `root`. Shared (transposed) nodes are visited once.
    /// Nodes deeper than `max_depth` levels below the root are skipped.
    pub fn depth_first<F>(&self, root: NodeId, max_depth: Option<u32>, mut visit: F)
    where
        F: FnMut(&GameTreeNode, u32),
    {
        let mut seen = HashSet::new();
        let mut stack = vec![(root, 0u32)];
        while let Some((id, level)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(node) = self.get(id) else {
                continue;
            };
            visit(node, level);
            if max_depth.is_some_and(|cap| level >= cap) {
                continue;
            }
            for child in node.children.iter().rev() {
                stack.push((*child, level + 1));
            }
        }
    }

    /// Level-order walk from `root` with the same rules as [`GameTree::depth_first`].
    pub fn breadth_first<F>(&self, root: NodeId, max_depth: Option<u32>, mut visit: F)
    where
        F: FnMut(&GameTreeNode, u32),
    {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([(root, 0u32)]);
        while let Some((id, level)) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            let Some(node) = self.get(id) else {
                continue;
            };
            visit(node, level);
            if max_depth.is_some_and(|cap| level >= cap) {
                continue;
            }
            queue.extend(node.children.iter().map(|child| (*child, level + 1)));
        }
    }

    pub fn count_nodes_at_depth(&self, root: NodeId, depth: u32) -> usize {
        let mut count = 0;
        self.breadth_first(root, Some(depth), |_, level| {
            if level == depth {
                count += 1;
            }
        });
        count
    }

    pub fn collect_leaves(&self, root: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        self.depth_first(root, None, |node, _| {
            if node.is_leaf() {
                leaves.push(node.id);
            }
        });
        leaves
    }

    /// Highest scoring leaf under `root`; the first one wins ties.
    pub fn find_best_leaf<F>(&self, root: NodeId, eval_fn: F) -> Option<&GameTreeNode>
    where
        F: Fn(&GameTreeNode) -> f64,
    {
        let mut best: Option<(&GameTreeNode, f64)> = None;
        for id in self.collect_leaves(root) {
            let Some(node) = self.get(id) else {
                continue;
            };
            let score = eval_fn(node);
            if best.is_none_or(|(_, top)| score.total_cmp(&top).is_gt()) {
                best = Some((node, score));
            }
        }
        best.map(|(node, _)| node)
    }

    /// Node ids from the root down to `id` following parent links.
    pub fn get_path_to_node(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = self.get(id);
        while let Some(node) = cursor {
            path.push(node.id);
            cursor = node.parent.and_then(|parent| self.get(parent));
        }
        path.reverse();
        path
    }

    pub fn get_actions_on_path(&self, id: NodeId) -> Vec<&NodeAction> {
        self.get_path_to_node(id)
            .windows(2)
            .filter_map(|pair| self.action(pair[0], pair[1]))
            .collect()
    }
}
