use crate::model::card::Card;
use crate::model::row::Row;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const LAYOUT_SIZE: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("{0} row is full")]
    RowFull(Row),
    #[error("card {0} is already part of the layout")]
    DuplicateCard(Card),
    #[error("card {0} is not in hand")]
    NotInHand(Card),
    #[error("{row} row holds {count} cards but only {capacity} fit")]
    Overfilled {
        row: Row,
        count: usize,
        capacity: usize,
    },
}

/// One player's board: three rows plus the cards dealt but not yet placed.
///
/// Placement never mutates in place; every operation returns a new layout so
/// that tree nodes and positions can hold their own frozen copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    top: Vec<Card>,
    middle: Vec<Card>,
    bottom: Vec<Card>,
    #[serde(default)]
    in_hand: Vec<Card>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(
        top: Vec<Card>,
        middle: Vec<Card>,
        bottom: Vec<Card>,
    ) -> Result<Self, LayoutError> {
        let layout = Self {
            top,
            middle,
            bottom,
            in_hand: Vec::new(),
        };
        layout.check()?;
        Ok(layout)
    }

    /// Verifies row capacities and card uniqueness.
    pub fn check(&self) -> Result<(), LayoutError> {
        for row in Row::ALL {
            let count = self.row(row).len();
            if count > row.capacity() {
                return Err(LayoutError::Overfilled {
                    row,
                    count,
                    capacity: row.capacity(),
                });
            }
        }
        let mut seen: Vec<Card> = Vec::with_capacity(LAYOUT_SIZE + self.in_hand.len());
        for card in self.all_cards() {
            if seen.contains(&card) {
                return Err(LayoutError::DuplicateCard(card));
            }
            seen.push(card);
        }
        Ok(())
    }

    pub fn row(&self, row: Row) -> &[Card] {
        match row {
            Row::Top => &self.top,
            Row::Middle => &self.middle,
            Row::Bottom => &self.bottom,
        }
    }

    fn row_mut(&mut self, row: Row) -> &mut Vec<Card> {
        match row {
            Row::Top => &mut self.top,
            Row::Middle => &mut self.middle,
            Row::Bottom => &mut self.bottom,
        }
    }

    pub fn top(&self) -> &[Card] {
        &self.top
    }

    pub fn middle(&self) -> &[Card] {
        &self.middle
    }

    pub fn bottom(&self) -> &[Card] {
        &self.bottom
    }

    pub fn in_hand(&self) -> &[Card] {
        &self.in_hand
    }

    pub fn free_slots(&self, row: Row) -> usize {
        row.capacity().saturating_sub(self.row(row).len())
    }

    pub fn has_capacity(&self, row: Row) -> bool {
        self.free_slots(row) > 0
    }

    pub fn total_free_slots(&self) -> usize {
        Row::ALL.iter().map(|row| self.free_slots(*row)).sum()
    }

    pub fn placed_count(&self) -> usize {
        self.top.len() + self.middle.len() + self.bottom.len()
    }

    /// All three rows are filled (3/5/5).
    pub fn is_complete(&self) -> bool {
        Row::ALL.iter().all(|row| self.free_slots(*row) == 0)
    }

    pub fn placed_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.top
            .iter()
            .chain(self.middle.iter())
            .chain(self.bottom.iter())
            .copied()
    }

    pub fn all_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.placed_cards().chain(self.in_hand.iter().copied())
    }

    pub fn contains(&self, card: Card) -> bool {
        self.all_cards().any(|c| c == card)
    }

    /// Places a card that is not yet on the board, without consulting the hand.
    pub fn place_card(&self, card: Card, row: Row) -> Result<Layout, LayoutError> {
        if self.placed_cards().any(|c| c == card) {
            return Err(LayoutError::DuplicateCard(card));
        }
        if !self.has_capacity(row) {
            return Err(LayoutError::RowFull(row));
        }
        let mut next = self.clone();
        next.in_hand.retain(|c| *c != card);
        next.row_mut(row).push(card);
        Ok(next)
    }

    /// Moves a card from the hand into the given row.
    pub fn place_from_hand(&self, card: Card, row: Row) -> Result<Layout, LayoutError> {
        if !self.in_hand.contains(&card) {
            return Err(LayoutError::NotInHand(card));
        }
        self.place_card(card, row)
    }

    pub fn with_dealt(&self, cards: &[Card]) -> Result<Layout, LayoutError> {
        let mut next = self.clone();
        for card in cards {
            if next.contains(*card) {
                return Err(LayoutError::DuplicateCard(*card));
            }
            next.in_hand.push(*card);
        }
        Ok(next)
    }

    pub fn discard(&self, card: Card) -> Result<Layout, LayoutError> {
        if !self.in_hand.contains(&card) {
            return Err(LayoutError::NotInHand(card));
        }
        let mut next = self.clone();
        next.in_hand.retain(|c| *c != card);
        Ok(next)
    }

    /// Row contents sorted by card, used for canonical keys.
    pub fn sorted_row(&self, row: Row) -> Vec<Card> {
        let mut cards = self.row(row).to_vec();
        cards.sort_unstable();
        cards
    }
}
