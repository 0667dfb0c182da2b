use crate::tree::node::{GameTreeNode, NodeId};
use crate::tree::store::GameTree;
use crate::tree::transposition::TranspositionKey;
use std::collections::{BTreeMap, HashSet};

impl GameTree {
    /// Scores the current leaves under `root` and removes the lowest
    /// `1 - keep_ratio` share of them. At least one leaf always survives.
    /// Parents left childless are not removed; call again to prune deeper.
    pub fn prune_worst_branches<F>(&mut self, root: NodeId, eval_fn: F, keep_ratio: f64) -> usize
    where
        F: Fn(&GameTreeNode) -> f64,
    {
        let ranked = self.ranked_leaves(root, &eval_fn);
        if ranked.len() <= 1 {
            return 0;
        }
        let ratio = if keep_ratio.is_nan() {
            1.0
        } else {
            keep_ratio.clamp(0.0, 1.0)
        };
        let keep = ((ranked.len() as f64 * ratio) as usize).max(1);
        let mut pruned = 0;
        for id in ranked.into_iter().skip(keep) {
            if id != root && self.remove(id).is_some() {
                pruned += 1;
            }
        }
        pruned
    }

    /// Keeps the `n` best leaves and the paths leading to them; everything
    /// else below `root` is removed.
    pub fn keep_top_n_leaves<F>(&mut self, root: NodeId, eval_fn: F, n: usize) -> usize
    where
        F: Fn(&GameTreeNode) -> f64,
    {
        let ranked = self.ranked_leaves(root, &eval_fn);
        let mut keep: HashSet<NodeId> = HashSet::from([root]);
        for leaf in ranked.iter().take(n) {
            keep.extend(self.get_path_to_node(*leaf));
        }
        let doomed: Vec<NodeId> = self
            .reachable(root)
            .into_iter()
            .filter(|id| !keep.contains(id))
            .collect();
        doomed
            .into_iter()
            .filter(|id| self.remove(*id).is_some())
            .count()
    }

    /// Removes every node more than `max_depth` levels below `root`.
    pub fn prune_by_depth(&mut self, root: NodeId, max_depth: u32) -> usize {
        let mut doomed = Vec::new();
        self.depth_first(root, None, |node, level| {
            if level > max_depth {
                doomed.push(node.id);
            }
        });
        doomed
            .into_iter()
            .filter(|id| self.remove(*id).is_some())
            .count()
    }

    /// Merges nodes under `root` that share a transposition key into the
    /// lowest-numbered one, then drops whatever became unreachable.
    pub fn prune_duplicate_positions(&mut self, root: NodeId) -> usize {
        let before = self.reachable(root);
        let mut groups: BTreeMap<TranspositionKey, Vec<NodeId>> = BTreeMap::new();
        for id in &before {
            if let Some(node) = self.get(*id) {
                groups
                    .entry(TranspositionKey::for_node(node))
                    .or_default()
                    .push(*id);
            }
        }
        for mut ids in groups.into_values().filter(|ids| ids.len() > 1) {
            ids.sort_unstable();
            let keeper = ids[0];
            for duplicate in &ids[1..] {
                if *duplicate != root {
                    self.redirect(*duplicate, keeper);
                }
            }
        }
        let after: HashSet<NodeId> = self.reachable(root).into_iter().collect();
        before
            .into_iter()
            .filter(|id| !after.contains(id))
            .filter(|id| self.remove(*id).is_some())
            .count()
    }

    fn ranked_leaves<F>(&self, root: NodeId, eval_fn: &F) -> Vec<NodeId>
    where
        F: Fn(&GameTreeNode) -> f64,
    {
        let mut scored: Vec<(NodeId, f64)> = self
            .collect_leaves(root)
            .into_iter()
            .filter_map(|id| self.get(id).map(|node| (id, eval_fn(node))))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.into_iter().map(|(id, _)| id).collect()
    }

    fn reachable(&self, root: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.depth_first(root, None, |node, _| ids.push(node.id));
        ids
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::builder::{TreeBuilder, TreeConfig};
    use crate::tree::node::NodeId;
    use crate::tree::store::GameTree;
    use crate::tree::store::tests::bare_node;
    use ofc_core::{Deck, Layout};

    fn built(depth: u32) -> (GameTree, NodeId) {
        let deck = Deck::shuffled_with_seed(23).into_cards();
        let mut builder = TreeBuilder::new(TreeConfig::default());
        let root = builder.build_tree(&Layout::new(), &deck, depth);
        (builder.into_tree(), root)
    }

    #[test]
    fn worst_branches_only_touch_leaves() {
        let (mut tree, root) = built(2);
        let before = tree.get_tree_stats();
        let pruned = tree.prune_worst_branches(root, |node| f64::from(node.id.0), 0.5);
        assert_eq!(pruned, 5);
        let after = tree.get_tree_stats();
        assert_eq!(after.total_nodes, before.total_nodes - 5);
        assert_eq!(tree.count_nodes_at_depth(root, 1), 3);
        assert_eq!(tree.collect_leaves(root).len(), 4 + 1);
    }

    #[test]
    fn keep_ratio_always_leaves_one() {
        let (mut tree, root) = built(1);
        let pruned = tree.prune_worst_branches(root, |_| 0.0, 0.0);
        assert_eq!(pruned, 2);
        assert_eq!(tree.get(root).unwrap().children.len(), 1);
    }

    #[test]
    fn top_n_keeps_paths_to_best_leaves() {
        let (mut tree, root) = built(2);
        let best = tree.find_best_leaf(root, |node| f64::from(node.id.0)).unwrap().id;
        let pruned = tree.keep_top_n_leaves(root, |node| f64::from(node.id.0), 1);
        assert_eq!(pruned, 13 - 3);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get_path_to_node(best).len(), 3);
    }

    #[test]
    fn depth_cap_removes_deep_nodes() {
        let (mut tree, root) = built(3);
        assert_eq!(tree.prune_by_depth(root, 1), 9 + 27);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.get_tree_stats().max_depth, 1);
    }

    #[test]
    fn duplicates_collapse_into_first_node() {
        let mut tree = GameTree::new();
        let root = bare_node(&mut tree, None, 0);
        let a = bare_node(&mut tree, Some(root), 1);
        let b = bare_node(&mut tree, Some(root), 1);
        let below_b = bare_node(&mut tree, Some(b), 3);
        let removed = tree.prune_duplicate_positions(root);
        assert_eq!(removed, 2);
        assert!(tree.get(b).is_none());
        assert!(tree.get(below_b).is_none());
        assert_eq!(tree.get(root).unwrap().children, vec![a]);
    }
}
