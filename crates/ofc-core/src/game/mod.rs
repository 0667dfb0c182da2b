pub mod position;
pub mod rules;
pub mod snapshot;
pub mod validate;

pub use position::{Move, PlayerId, Position, PositionError, Seat};
pub use rules::{GameRules, Variant};
pub use snapshot::PositionSnapshot;
pub use validate::{PlacementError, PlacementSafety, PlacementValidator};
