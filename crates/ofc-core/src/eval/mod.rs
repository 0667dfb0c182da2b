//! Hand classification, royalty scoring, and foul detection.

pub mod evaluator;
pub mod ranking;
pub mod royalty;
pub mod wild;

pub use evaluator::{CacheStats, EvalError, HandEvaluator};
pub use ranking::{HandRanking, HandType};
pub use royalty::RoyaltyTable;
pub use wild::WildEvaluation;
