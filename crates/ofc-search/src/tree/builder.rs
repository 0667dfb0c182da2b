use crate::tree::node::{GameTreeNode, NodeId, PineappleAction};
use crate::tree::store::{GameTree, TreeStats};
use crate::tree::transposition::{TranspositionKey, TranspositionStats, TranspositionTable};
use core::marker::PhantomData;
use ofc_core::model::layout::LAYOUT_SIZE;
use ofc_core::{Card, HandEvaluator, Layout, Move, Row};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use tracing::{Level, event, warn};

const DEAL_SIZE: usize = 3;
const PAIRS: [(usize, usize, usize); 3] = [(0, 1, 2), (0, 2, 1), (1, 2, 0)];

/// How the two kept cards are assigned to rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// Fill the first two free slots scanning top, middle, bottom.
    #[default]
    FirstAvailable,
    /// Every row assignment with room for both cards.
    Exhaustive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default = "default_use_transpositions")]
    pub use_transpositions: bool,
    #[serde(default)]
    pub placement: PlacementPolicy,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            use_transpositions: default_use_transpositions(),
            placement: PlacementPolicy::default(),
        }
    }
}

impl TreeConfig {
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_transpositions(mut self, enabled: bool) -> Self {
        self.use_transpositions = enabled;
        self
    }

    pub fn with_placement(mut self, placement: PlacementPolicy) -> Self {
        self.placement = placement;
        self
    }
}

fn default_max_depth() -> u32 {
    3
}

fn default_use_transpositions() -> bool {
    true
}

/// Expands a starting layout into a tree of 3-pick-2 decisions.
///
/// A builder owns its node arena and transposition table for the lifetime of
/// one analysis. It is `!Sync`; concurrent requests each need their own.
/// Repeated builds on the same instance share the table, so a second build
/// links into nodes created by the first.
#[derive(Debug)]
pub struct TreeBuilder {
    config: TreeConfig,
    tree: GameTree,
    table: TranspositionTable,
    evaluator: HandEvaluator,
    _single_owner: PhantomData<Cell<()>>,
}

impl TreeBuilder {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            tree: GameTree::new(),
            table: TranspositionTable::new(),
            evaluator: HandEvaluator::new(),
            _single_owner: PhantomData,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Builds to the configured depth.
    pub fn build(&mut self, layout: &Layout, deck: &[Card]) -> NodeId {
        self.build_tree(layout, deck, self.config.max_depth)
    }

    /// Deals `deck` three cards at a time in the given order; the builder
    /// never reorders or shuffles it.
    pub fn build_tree(&mut self, layout: &Layout, deck: &[Card], max_depth: u32) -> NodeId {
        let cards_placed = layout.placed_count();
        let root = self.create_node(layout.clone(), cards_placed, 0, None);
        if self.config.use_transpositions {
            self.table
                .store(TranspositionKey::new(layout, cards_placed), root);
        }
        self.expand(root, deck, max_depth);

        if tracing::enabled!(Level::DEBUG) {
            let stats = self.tree.get_tree_stats();
            let table = self.table.get_statistics();
            event!(
                target: "ofc_search::tree",
                Level::DEBUG,
                root = %root,
                max_depth,
                total_nodes = stats.total_nodes,
                leaf_nodes = stats.leaf_nodes,
                fouled_nodes = stats.fouled_nodes,
                total_actions = stats.total_actions,
                transposition_hits = table.hits,
                transpositions_enabled = self.config.use_transpositions,
            );
        }
        root
    }

    fn create_node(
        &mut self,
        layout: Layout,
        cards_placed: usize,
        depth: u32,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = self.tree.allocate_id();
        let is_fouled = layout.is_complete() && self.layout_fouled(&layout);
        self.tree.insert(GameTreeNode {
            id,
            depth,
            is_terminal: cards_placed >= LAYOUT_SIZE,
            is_fouled,
            layout,
            cards_placed,
            dealt: None,
            possible_actions: Vec::new(),
            parent,
            children: Vec::new(),
        });
        id
    }

    /// A complete layout the evaluator rejects is treated as fouled.
    fn layout_fouled(&self, layout: &Layout) -> bool {
        match self.evaluator.is_fouled(layout) {
            Ok(fouled) => fouled,
            Err(err) => {
                warn!(
                    target: "ofc_search::tree",
                    error = %err,
                    cards = layout.placed_count(),
                    "complete layout failed evaluation; marking fouled"
                );
                true
            }
        }
    }

    fn expand(&mut self, id: NodeId, deck: &[Card], remaining_depth: u32) {
        if remaining_depth == 0 || deck.len() < DEAL_SIZE {
            return;
        }
        let Some(node) = self.tree.get(id) else {
            return;
        };
        if node.is_terminal || node.is_fouled {
            return;
        }
        let layout = node.layout.clone();
        let depth = node.depth;
        let cards_placed = node.cards_placed;
        let dealt = [deck[0], deck[1], deck[2]];
        let actions = self.enumerate_actions(&layout, dealt);

        if let Some(node) = self.tree.get_mut(id) {
            node.dealt = Some(dealt);
            node.possible_actions = actions.clone();
        }

        for (index, action) in actions.into_iter().enumerate() {
            let Some(next) = action.apply(&layout) else {
                continue;
            };
            let key = TranspositionKey::new(&next, cards_placed + 2);
            if self.config.use_transpositions {
                if let Some(existing) = self.table.lookup(&key) {
                    if self.tree.contains(existing) {
                        self.tree.link(id, existing, action, index);
                        continue;
                    }
                }
            }

            let child = self.create_node(next, cards_placed + 2, depth + 1, Some(id));
            if self.config.use_transpositions {
                self.table.store(key, child);
            }
            self.tree.link(id, child, action, index);
            self.expand(child, &deck[DEAL_SIZE..], remaining_depth - 1);
        }
    }

    /// All feasible ways to keep two of the three dealt cards.
    pub fn enumerate_actions(&self, layout: &Layout, dealt: [Card; 3]) -> Vec<PineappleAction> {
        let mut actions = Vec::new();
        for (a, b, discard) in PAIRS {
            let (first, second, discard) = (dealt[a], dealt[b], dealt[discard]);
            match self.config.placement {
                PlacementPolicy::FirstAvailable => {
                    let slots: Vec<Row> = Row::ALL
                        .into_iter()
                        .flat_map(|row| std::iter::repeat_n(row, layout.free_slots(row)))
                        .take(2)
                        .collect();
                    if let [row_a, row_b] = slots[..] {
                        actions.push(PineappleAction {
                            placements: [Move::new(first, row_a), Move::new(second, row_b)],
                            discard,
                        });
                    }
                }
                PlacementPolicy::Exhaustive => {
                    for row_a in Row::ALL {
                        for row_b in Row::ALL {
                            let needed = if row_a == row_b { 2 } else { 1 };
                            if layout.free_slots(row_a) < needed
                                || layout.free_slots(row_b) < needed
                            {
                                continue;
                            }
                            actions.push(PineappleAction {
                                placements: [Move::new(first, row_a), Move::new(second, row_b)],
                                discard,
                            });
                        }
                    }
                }
            }
        }
        actions
    }

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut GameTree {
        &mut self.tree
    }

    pub fn into_tree(self) -> GameTree {
        self.tree
    }

    pub fn get_tree_stats(&self) -> TreeStats {
        self.tree.get_tree_stats()
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.table
    }

    pub fn transposition_stats(&self) -> TranspositionStats {
        self.table.get_statistics()
    }
}
