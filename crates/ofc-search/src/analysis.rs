//! Entry points for one analysis request each. Every call builds its own
//! evaluator, builder or simulator and shares nothing with other calls.

use crate::error::SearchError;
use crate::mcts::{AnalysisResult, MctsConfig, MctsSimulator};
use crate::strategy::{EvRange, Strategy, StrategyCalculator};
use crate::tree::{GameTree, NodeId, TreeBuilder, TreeConfig, TranspositionStats, TreeStats};
use ofc_core::{
    AnyCard, Card, EvalError, FantasyError, FantasyLand, FantasyPlacement, HandEvaluator,
    HandRanking, Layout, Position, Variant, WildEvaluation,
};

/// A finished tree together with its root and the transposition counters
/// collected while building it.
#[derive(Debug, Clone)]
pub struct BuiltTree {
    pub root: NodeId,
    pub tree: GameTree,
    pub transpositions: TranspositionStats,
}

impl BuiltTree {
    pub fn stats(&self) -> TreeStats {
        self.tree.get_tree_stats()
    }
}

/// Recommends a placement for the player to act.
pub fn analyze_position(
    position: &Position,
    config: &MctsConfig,
) -> Result<AnalysisResult, SearchError> {
    position.check_cards()?;
    let mut simulator = MctsSimulator::new(config.clone())?;
    Ok(simulator.analyze(position))
}

pub fn build_tree(layout: &Layout, deck: &[Card], max_depth: u32) -> BuiltTree {
    build_tree_with(layout, deck, TreeConfig::default().with_max_depth(max_depth))
}

pub fn build_tree_with(layout: &Layout, deck: &[Card], config: TreeConfig) -> BuiltTree {
    let mut builder = TreeBuilder::new(config);
    let root = builder.build(layout, deck);
    let transpositions = builder.transposition_stats();
    BuiltTree {
        root,
        tree: builder.into_tree(),
        transpositions,
    }
}

/// Best first action for `layout` when `deck` is dealt in the given order.
pub fn calculate_optimal_strategy(layout: &Layout, deck: &[Card], max_depth: u32) -> Strategy {
    StrategyCalculator::default().calculate_optimal_strategy(layout, deck, max_depth)
}

pub fn calculate_ev_range(
    layout: &Layout,
    deck: &[Card],
    iterations: usize,
    seed: u64,
) -> EvRange {
    StrategyCalculator::default().calculate_ev_range(layout, deck, iterations, seed)
}

pub fn evaluate_hand(cards: &[Card]) -> Result<HandRanking, EvalError> {
    HandEvaluator::new().evaluate(cards)
}

/// Best ranking reachable by substituting every wild card.
pub fn evaluate_hand_with_wilds(cards: &[AnyCard]) -> Result<WildEvaluation, EvalError> {
    HandEvaluator::new().evaluate_with_wilds(cards, None)
}

pub fn check_fantasy_land_entry(top: &[Card]) -> bool {
    FantasyLand::new(Variant::Pineapple).check_entry_qualification(top)
}

pub fn check_fantasy_land_stay(top: &[Card], middle: &[Card], bottom: &[Card]) -> bool {
    FantasyLand::new(Variant::Pineapple).check_stay_qualification(top, middle, bottom)
}

/// `Ok(())` for a valid 13-of-14 placement; the error text is the reason.
pub fn validate_fantasy_placement(placed: &[Card], dealt: &[Card]) -> Result<(), FantasyError> {
    FantasyLand::new(Variant::Pineapple).validate_fantasy_placement(placed, dealt)
}

/// Best 13-card setting for a Pineapple Fantasy Land deal of 14.
pub fn recommend_fantasy_placement(dealt: &[Card]) -> Result<FantasyPlacement, FantasyError> {
    FantasyLand::new(Variant::Pineapple).recommend_placement(dealt)
}
