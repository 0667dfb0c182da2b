use crate::eval::evaluator::{EvalError, HandEvaluator, find_duplicate, rank_hand};
use crate::eval::ranking::HandRanking;
use crate::eval::royalty::RoyaltyTable;
use crate::model::card::{AnyCard, Card};
use crate::model::deck::Deck;
use crate::model::row::Row;
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

const MAX_WILDS: usize = 2;

/// Best ranking reachable by substituting the wild cards, with the concrete
/// cards chosen for each wild in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildEvaluation {
    pub ranking: HandRanking,
    pub substitutions: Vec<Card>,
}

impl HandEvaluator {
    /// Searches every substitution for up to two wilds. Substitutes are drawn
    /// from the cards not already present in the hand, and the winner is the
    /// strongest ranking with royalty as the tie-breaker.
    pub fn evaluate_with_wilds(
        &self,
        cards: &[AnyCard],
        row: Option<Row>,
    ) -> Result<WildEvaluation, EvalError> {
        let (natural, wilds) = AnyCard::split(cards);
        if wilds > MAX_WILDS {
            return Err(EvalError::TooManyWilds(wilds));
        }
        let table = match row {
            Some(row) => RoyaltyTable::for_row(row),
            None => RoyaltyTable::for_size(cards.len()),
        };
        if wilds == 0 {
            return Ok(WildEvaluation {
                ranking: self.evaluate_with_table(&natural, table)?,
                substitutions: Vec::new(),
            });
        }

        let total = natural.len() + wilds;
        if !(3..=5).contains(&total) {
            return Err(EvalError::InvalidCardCount(total));
        }
        if let Some(card) = find_duplicate(&natural) {
            return Err(EvalError::DuplicateCard(card));
        }

        let candidates = Deck::standard().without(&natural).into_cards();
        let mut hand = natural.clone();
        hand.resize(total, candidates[0]);

        let base = natural.len();
        let mut best: Option<WildEvaluation> = None;
        let mut consider = |hand: &[Card], substitutions: &[Card]| {
            let ranking = rank_hand(hand, table);
            let better = match &best {
                None => true,
                Some(current) => match ranking.cmp_strength(&current.ranking) {
                    Ordering::Greater => true,
                    Ordering::Equal => ranking.royalty > current.ranking.royalty,
                    Ordering::Less => false,
                },
            };
            if better {
                best = Some(WildEvaluation {
                    ranking,
                    substitutions: substitutions.to_vec(),
                });
            }
        };

        for (i, first) in candidates.iter().enumerate() {
            hand[base] = *first;
            if wilds == 1 {
                consider(&hand, &[*first]);
                continue;
            }
            for second in &candidates[i + 1..] {
                hand[base + 1] = *second;
                consider(&hand, &[*first, *second]);
            }
        }

        best.ok_or(EvalError::InvalidCardCount(total))
    }
}
