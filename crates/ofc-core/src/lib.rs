#![deny(warnings)]
pub mod eval;
pub mod fantasy;
pub mod game;
pub mod model;

pub use eval::{EvalError, HandEvaluator, HandRanking, HandType, WildEvaluation};
pub use fantasy::{FantasyError, FantasyLand, FantasyPlacement, TopRowOutlook};
pub use game::{
    GameRules, Move, PlacementError, PlacementSafety, PlacementValidator, PlayerId, Position,
    PositionError, PositionSnapshot, Seat, Variant,
};
pub use model::{AnyCard, Card, CardParseError, Deck, Layout, LayoutError, Rank, Row, Suit};
