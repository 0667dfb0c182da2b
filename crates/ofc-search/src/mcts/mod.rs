//! Monte Carlo tree search over single-card placements.

pub mod config;
pub mod node;
pub mod rollout;
pub mod simulator;

pub use config::{MctsConfig, RolloutScorer};
pub use node::{MctsNode, MctsNodeId, MctsTree};
pub use rollout::{HeuristicRollout, RandomBaseline, RolloutEvaluator, evaluator_for};
pub use simulator::{AnalysisResult, MctsSimulator, SearchStats, ucb1};
