use super::position::{PlayerId, Position, PositionError, Seat};
use super::rules::GameRules;
use crate::model::card::Card;
use serde::{Deserialize, Serialize};

/// Plain-data form of a [`Position`] for storage layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionSnapshot {
    pub game_id: String,
    pub seats: Vec<Seat>,
    pub remaining: Vec<Card>,
    pub current_player: PlayerId,
    pub round: u32,
    pub rules: GameRules,
    pub position_hash: String,
}

impl PositionSnapshot {
    pub fn capture(position: &Position) -> Self {
        PositionSnapshot {
            game_id: position.game_id().to_string(),
            seats: position.seats().to_vec(),
            remaining: position.remaining().to_vec(),
            current_player: position.current_player(),
            round: position.round(),
            rules: *position.rules(),
            position_hash: position.get_position_hash().to_string(),
        }
    }

    pub fn restore(self) -> Result<Position, PositionError> {
        Position::new(
            self.game_id,
            self.seats,
            self.remaining,
            self.current_player,
            self.round,
            self.rules,
        )
    }

    pub fn to_json(position: &Position) -> serde_json::Result<String> {
        let snapshot = Self::capture(position);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::PositionSnapshot;
    use crate::game::position::{PlayerId, Position, Seat};
    use crate::game::rules::GameRules;
    use crate::model::card::parse_cards;
    use crate::model::deck::Deck;
    use crate::model::layout::Layout;

    fn sample() -> Position {
        let placed = parse_cards("Qh Qd 7c 7s").unwrap();
        let hand = parse_cards("2d 9c 4h").unwrap();
        let layout = Layout::from_rows(placed[..2].to_vec(), placed[2..].to_vec(), vec![])
            .unwrap()
            .with_dealt(&hand)
            .unwrap();
        let mut used = placed;
        used.extend(hand);
        Position::new(
            "snap",
            vec![
                Seat { player: PlayerId(0), layout },
                Seat { player: PlayerId(1), layout: Layout::new() },
            ],
            Deck::standard().without(&used).into_cards(),
            PlayerId(0),
            2,
            GameRules::default(),
        )
        .unwrap()
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let position = sample();
        let json = PositionSnapshot::to_json(&position).unwrap();
        assert!(json.contains("\"Qh\""));
        assert!(json.contains("\"pineapple\""));
    }

    #[test]
    fn snapshot_restores_equivalent_position() {
        let position = sample();
        let json = PositionSnapshot::to_json(&position).unwrap();
        let snapshot = PositionSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.position_hash, position.get_position_hash());
        let restored = snapshot.restore().unwrap();
        assert_eq!(restored, position);
        assert_eq!(restored.remaining(), position.remaining());
    }
}
