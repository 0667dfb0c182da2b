//! Pre-flight checks for a single card placement.

use crate::eval::HandEvaluator;
use crate::eval::evaluator::strictly_above;
use crate::game::position::{PlayerId, Position};
use crate::model::card::Card;
use crate::model::layout::{Layout, LayoutError};
use crate::model::row::Row;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("cannot place cards in a completed game")]
    GameComplete,
    #[error("player {0} is not seated")]
    UnknownPlayer(PlayerId),
    #[error("it is not player {0}'s turn")]
    NotYourTurn(PlayerId),
    #[error("player {player} does not hold {card}")]
    CardNotHeld { player: PlayerId, card: Card },
    #[error("{row} row is full ({capacity}/{capacity})")]
    RowFull { row: Row, capacity: usize },
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// How a legal placement leaves the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementSafety {
    Safe,
    /// A full row no longer sits strictly below the row under it. The lower
    /// row may still be improved by later cards.
    MayFoul,
    /// The placement completes the layout and the layout is fouled.
    Fouls,
}

#[derive(Debug, Default)]
pub struct PlacementValidator {
    evaluator: HandEvaluator,
}

impl PlacementValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn, ownership and capacity checks, in that order.
    pub fn validate_card_placement(
        &self,
        position: &Position,
        player: PlayerId,
        card: Card,
        row: Row,
    ) -> Result<(), PlacementError> {
        if position.is_terminal_position() {
            return Err(PlacementError::GameComplete);
        }
        let layout = position
            .layout(player)
            .ok_or(PlacementError::UnknownPlayer(player))?;
        if position.current_player() != player {
            return Err(PlacementError::NotYourTurn(player));
        }
        if !layout.in_hand().contains(&card) {
            return Err(PlacementError::CardNotHeld { player, card });
        }
        if !layout.has_capacity(row) {
            return Err(PlacementError::RowFull {
                row,
                capacity: row.capacity(),
            });
        }
        Ok(())
    }

    /// Validates the placement, then looks at the rows it would produce.
    pub fn can_place_card_safely(
        &self,
        position: &Position,
        player: PlayerId,
        card: Card,
        row: Row,
    ) -> Result<PlacementSafety, PlacementError> {
        self.validate_card_placement(position, player, card, row)?;
        let layout = position
            .layout(player)
            .ok_or(PlacementError::UnknownPlayer(player))?
            .place_from_hand(card, row)?;
        Ok(self.safety(&layout))
    }

    /// Rows the player still has room in; empty for an unknown player.
    pub fn get_available_positions(&self, position: &Position, player: PlayerId) -> Vec<Row> {
        position
            .layout(player)
            .map(|layout| {
                Row::ALL
                    .into_iter()
                    .filter(|row| layout.has_capacity(*row))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn safety(&self, layout: &Layout) -> PlacementSafety {
        if layout.is_complete() {
            return match self.evaluator.is_fouled(layout) {
                Ok(false) => PlacementSafety::Safe,
                _ => PlacementSafety::Fouls,
            };
        }
        let pairs = [(Row::Top, Row::Middle), (Row::Middle, Row::Bottom)];
        for (upper, lower) in pairs {
            let upper_cards = layout.row(upper);
            let lower_cards = layout.row(lower);
            if layout.free_slots(upper) > 0 || lower_cards.len() < 3 {
                continue;
            }
            let (Ok(upper_rank), Ok(lower_rank)) = (
                self.evaluator.evaluate_row(upper_cards, upper),
                self.evaluator.evaluate_row(lower_cards, lower),
            ) else {
                continue;
            };
            if !strictly_above(&lower_rank, &upper_rank) {
                return PlacementSafety::MayFoul;
            }
        }
        PlacementSafety::Safe
    }
}
