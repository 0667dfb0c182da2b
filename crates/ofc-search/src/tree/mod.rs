//! Arena-backed game tree of Pineapple placement decisions.

pub mod builder;
pub mod node;
pub mod pruning;
pub mod store;
pub mod transposition;
pub mod traversal;

pub use builder::{PlacementPolicy, TreeBuilder, TreeConfig};
pub use node::{GameTreeNode, NodeAction, NodeId, PineappleAction};
pub use store::{GameTree, TreeStats};
pub use transposition::{TranspositionKey, TranspositionStats, TranspositionTable};
