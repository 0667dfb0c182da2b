#![deny(warnings)]
pub mod analysis;
pub mod error;
pub mod mcts;
pub mod scoring;
pub mod strategy;
pub mod tree;

pub use analysis::{
    BuiltTree, analyze_position, build_tree, build_tree_with, calculate_ev_range,
    calculate_optimal_strategy, check_fantasy_land_entry, check_fantasy_land_stay, evaluate_hand,
    evaluate_hand_with_wilds, recommend_fantasy_placement, validate_fantasy_placement,
};
pub use error::SearchError;
pub use mcts::{AnalysisResult, MctsConfig, MctsSimulator, RolloutScorer, SearchStats};
pub use scoring::PositionScorer;
pub use strategy::{EvRange, Strategy, StrategyCalculator};
pub use tree::{GameTree, GameTreeNode, NodeId, PlacementPolicy, TreeBuilder, TreeConfig};
