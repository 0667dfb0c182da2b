use crate::game::rules::GameRules;
use crate::model::card::Card;
use crate::model::layout::{Layout, LayoutError};
use crate::model::row::Row;
use core::fmt;
use core::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Place one card from the current player's hand into a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub card: Card,
    pub row: Row,
}

impl Move {
    pub const fn new(card: Card, row: Row) -> Self {
        Self { card, row }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.card, self.row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("a position needs at least one player")]
    NoPlayers,
    #[error("player {0} is seated twice")]
    DuplicatePlayer(PlayerId),
    #[error("player {0} is not seated")]
    UnknownPlayer(PlayerId),
    #[error("card {0} appears in more than one place")]
    DuplicateCard(Card),
    #[error("remaining deck has {available} cards, {requested} requested")]
    DeckExhausted { requested: usize, available: usize },
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub player: PlayerId,
    pub layout: Layout,
}

/// Immutable snapshot of a game in progress.
///
/// Seats keep their construction order, which is also the turn rotation.
/// Every transition returns a new position. The canonical hash is computed
/// on first use and cached on the instance, which makes `Position` `!Sync`.
#[derive(Debug, Clone)]
pub struct Position {
    game_id: String,
    seats: Vec<Seat>,
    remaining: Vec<Card>,
    current: usize,
    round: u32,
    rules: GameRules,
    hash: OnceCell<String>,
}

impl Position {
    pub fn new(
        game_id: impl Into<String>,
        seats: Vec<Seat>,
        remaining: Vec<Card>,
        current_player: PlayerId,
        round: u32,
        rules: GameRules,
    ) -> Result<Self, PositionError> {
        if seats.is_empty() {
            return Err(PositionError::NoPlayers);
        }
        for (index, seat) in seats.iter().enumerate() {
            if seats[..index].iter().any(|other| other.player == seat.player) {
                return Err(PositionError::DuplicatePlayer(seat.player));
            }
            seat.layout.check()?;
        }
        let current = seats
            .iter()
            .position(|seat| seat.player == current_player)
            .ok_or(PositionError::UnknownPlayer(current_player))?;
        let position = Self {
            game_id: game_id.into(),
            seats,
            remaining,
            current,
            round,
            rules,
            hash: OnceCell::new(),
        };
        position.check_cards()?;
        Ok(position)
    }

    /// Fails if any card is held twice across layouts, hands, and the deck.
    pub fn check_cards(&self) -> Result<(), PositionError> {
        let mut seen = [false; 64];
        let all = self
            .seats
            .iter()
            .flat_map(|seat| seat.layout.all_cards())
            .chain(self.remaining.iter().copied());
        for card in all {
            let slot = card_index(card);
            if seen[slot] {
                return Err(PositionError::DuplicateCard(card));
            }
            seen[slot] = true;
        }
        Ok(())
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn layout(&self, player: PlayerId) -> Option<&Layout> {
        self.seats
            .iter()
            .find(|seat| seat.player == player)
            .map(|seat| &seat.layout)
    }

    pub fn current_player(&self) -> PlayerId {
        self.seats[self.current].player
    }

    pub fn current_layout(&self) -> &Layout {
        &self.seats[self.current].layout
    }

    pub fn remaining(&self) -> &[Card] {
        &self.remaining
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Every in-hand card of the current player crossed with every row that
    /// still has room.
    pub fn get_legal_moves(&self) -> Vec<Move> {
        let layout = self.current_layout();
        let open_rows: Vec<Row> = Row::ALL
            .into_iter()
            .filter(|row| layout.has_capacity(*row))
            .collect();
        layout
            .in_hand()
            .iter()
            .flat_map(|card| open_rows.iter().map(move |row| Move::new(*card, *row)))
            .collect()
    }

    /// Places the card for the current player and passes the turn on.
    /// No cards are dealt; see [`Position::deal_to_current`].
    pub fn apply_move(&self, mv: Move) -> Result<Position, PositionError> {
        let layout = self.current_layout().place_from_hand(mv.card, mv.row)?;
        let mut seats = self.seats.clone();
        seats[self.current].layout = layout;
        Ok(Self {
            game_id: self.game_id.clone(),
            seats,
            remaining: self
                .remaining
                .iter()
                .copied()
                .filter(|card| *card != mv.card)
                .collect(),
            current: (self.current + 1) % self.seats.len(),
            round: self.round,
            rules: self.rules,
            hash: OnceCell::new(),
        })
    }

    /// Moves `count` cards from the head of the remaining deck into the
    /// current player's hand.
    pub fn deal_to_current(&self, count: usize) -> Result<Position, PositionError> {
        if count > self.remaining.len() {
            return Err(PositionError::DeckExhausted {
                requested: count,
                available: self.remaining.len(),
            });
        }
        let layout = self.current_layout().with_dealt(&self.remaining[..count])?;
        let mut next = self.clone_without_hash();
        next.seats[self.current].layout = layout;
        next.remaining.drain(..count);
        Ok(next)
    }

    /// Drops a card from the current player's hand out of the game.
    pub fn discard_from_current(&self, card: Card) -> Result<Position, PositionError> {
        let layout = self.current_layout().discard(card)?;
        let mut next = self.clone_without_hash();
        next.seats[self.current].layout = layout;
        Ok(next)
    }

    pub fn with_round(&self, round: u32) -> Position {
        let mut next = self.clone_without_hash();
        next.round = round;
        next
    }

    /// Canonical signature: sorted rows and hand per seat, then the player to
    /// act and the round.
    pub fn get_position_hash(&self) -> &str {
        self.hash.get_or_init(|| {
            let mut out = String::with_capacity(64 * self.seats.len());
            for seat in &self.seats {
                out.push_str(&seat.player.to_string());
                for row in Row::ALL {
                    out.push(if row == Row::Top { ':' } else { '|' });
                    push_sorted(&mut out, seat.layout.row(row));
                }
                out.push('|');
                push_sorted(&mut out, seat.layout.in_hand());
                out.push(';');
            }
            out.push_str(&format!("cur={};round={}", self.current_player(), self.round));
            out
        })
    }

    pub fn is_terminal_position(&self) -> bool {
        self.seats
            .iter()
            .all(|seat| seat.layout.placed_count() == crate::model::layout::LAYOUT_SIZE)
    }

    fn clone_without_hash(&self) -> Position {
        let mut next = self.clone();
        next.hash = OnceCell::new();
        next
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.get_position_hash() == other.get_position_hash()
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get_position_hash().hash(state);
    }
}

fn card_index(card: Card) -> usize {
    usize::from(card.rank.value()) * 4 + card.suit as usize - 8
}

fn push_sorted(out: &mut String, cards: &[Card]) {
    let mut sorted = cards.to_vec();
    sorted.sort_unstable();
    for (index, card) in sorted.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&card.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::{Move, PlayerId, Position, PositionError, Seat};
    use crate::game::rules::GameRules;
    use crate::model::card::parse_cards;
    use crate::model::deck::Deck;
    use crate::model::layout::Layout;
    use crate::model::row::Row;

    fn two_player(top_a: &str, hand_a: &str) -> Position {
        let top = parse_cards(top_a).unwrap();
        let hand = parse_cards(hand_a).unwrap();
        let layout = Layout::from_rows(top.clone(), vec![], vec![])
            .unwrap()
            .with_dealt(&hand)
            .unwrap();
        let mut used = top;
        used.extend(hand);
        let remaining = Deck::standard().without(&used).into_cards();
        Position::new(
            "g1",
            vec![
                Seat { player: PlayerId(1), layout },
                Seat { player: PlayerId(2), layout: Layout::new() },
            ],
            remaining,
            PlayerId(1),
            1,
            GameRules::default(),
        )
        .unwrap()
    }

    #[test]
    fn legal_moves_cross_hand_with_open_rows() {
        let position = two_player("As Ks", "2c 3c");
        assert_eq!(position.get_legal_moves().len(), 6);
        let full_top = two_player("As Ks Qs", "2c 3c");
        let moves = full_top.get_legal_moves();
        assert_eq!(moves.len(), 4);
        assert!(moves.iter().all(|mv| mv.row != Row::Top));
    }

    #[test]
    fn apply_move_returns_new_position_and_rotates() {
        let position = two_player("As", "2c 3c");
        let card = parse_cards("2c").unwrap()[0];
        let next = position.apply_move(Move::new(card, Row::Bottom)).unwrap();
        assert_eq!(position.current_player(), PlayerId(1));
        assert_eq!(next.current_player(), PlayerId(2));
        assert_eq!(next.layout(PlayerId(1)).unwrap().bottom(), &[card]);
        assert_eq!(position.layout(PlayerId(1)).unwrap().bottom().len(), 0);
        assert!(next.get_legal_moves().is_empty());
    }

    #[test]
    fn illegal_move_is_rejected() {
        let position = two_player("As", "2c 3c");
        let card = parse_cards("4d").unwrap()[0];
        assert!(matches!(
            position.apply_move(Move::new(card, Row::Top)),
            Err(PositionError::Layout(_))
        ));
    }

    #[test]
    fn hash_ignores_row_order() {
        let a = two_player("As Ks", "2c 3c");
        let b = two_player("Ks As", "3c 2c");
        assert_eq!(a.get_position_hash(), b.get_position_hash());
        assert_eq!(a, b);
        let c = two_player("As Qs", "2c 3c");
        assert_ne!(a.get_position_hash(), c.get_position_hash());
        assert_ne!(a.get_position_hash(), a.with_round(2).get_position_hash());
    }

    #[test]
    fn dealing_moves_cards_from_deck_to_hand() {
        let position = two_player("As", "");
        let head = position.remaining()[..3].to_vec();
        let dealt = position.deal_to_current(3).unwrap();
        assert_eq!(dealt.current_layout().in_hand(), head.as_slice());
        assert_eq!(dealt.remaining().len(), position.remaining().len() - 3);
        let discarded = dealt.discard_from_current(head[2]).unwrap();
        assert_eq!(discarded.current_layout().in_hand().len(), 2);
        assert!(matches!(
            position.deal_to_current(100),
            Err(PositionError::DeckExhausted { .. })
        ));
    }

    #[test]
    fn constructor_rejects_duplicate_cards_and_unknown_player() {
        let cards = parse_cards("As").unwrap();
        let layout = Layout::from_rows(cards.clone(), vec![], vec![]).unwrap();
        let seats = vec![Seat { player: PlayerId(1), layout }];
        assert_eq!(
            Position::new("g", seats.clone(), cards.clone(), PlayerId(1), 1, GameRules::default())
                .unwrap_err(),
            PositionError::DuplicateCard(cards[0])
        );
        assert_eq!(
            Position::new("g", seats, vec![], PlayerId(9), 1, GameRules::default()).unwrap_err(),
            PositionError::UnknownPlayer(PlayerId(9))
        );
    }

    #[test]
    fn terminal_when_every_layout_is_full() {
        let cards = Deck::standard().into_cards();
        let layout =
            Layout::from_rows(cards[..3].to_vec(), cards[3..8].to_vec(), cards[8..13].to_vec())
                .unwrap();
        let position = Position::new(
            "g",
            vec![Seat { player: PlayerId(1), layout }],
            cards[13..].to_vec(),
            PlayerId(1),
            5,
            GameRules::pineapple(1),
        )
        .unwrap();
        assert!(position.is_terminal_position());
        assert!(!two_player("As", "2c").is_terminal_position());
    }
}
