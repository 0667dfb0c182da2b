use crate::eval::ranking::{HandRanking, HandType};
use crate::eval::royalty::RoyaltyTable;
use crate::model::card::Card;
use crate::model::layout::Layout;
use crate::model::row::Row;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use thiserror::Error;

const MIN_HAND: usize = 3;
const MAX_HAND: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("hand must contain 3 to 5 cards, got {0}")]
    InvalidCardCount(usize),
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("at most 2 wild cards are supported, got {0}")]
    TooManyWilds(usize),
    #[error("{row} row needs {expected} cards, got {actual}")]
    RowSize {
        row: Row,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EvalCacheKey {
    cards: Vec<Card>,
    table: RoyaltyTable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Classifies hands and scores royalties.
///
/// Each evaluator owns its own memo table. The interior `RefCell` keeps the
/// evaluator `!Sync`, so concurrent requests must each build their own.
#[derive(Debug, Default)]
pub struct HandEvaluator {
    cache: RefCell<HashMap<EvalCacheKey, HandRanking>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl HandEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranks a 3 or 5 card hand (4 cards are accepted for partial rows).
    /// Royalties use the front table for three cards and the standard
    /// schedule otherwise.
    pub fn evaluate(&self, cards: &[Card]) -> Result<HandRanking, EvalError> {
        self.evaluate_with_table(cards, RoyaltyTable::for_size(cards.len()))
    }

    /// Ranks a hand as it would score in the given row.
    pub fn evaluate_row(&self, cards: &[Card], row: Row) -> Result<HandRanking, EvalError> {
        self.evaluate_with_table(cards, RoyaltyTable::for_row(row))
    }

    pub fn evaluate_with_table(
        &self,
        cards: &[Card],
        table: RoyaltyTable,
    ) -> Result<HandRanking, EvalError> {
        check_cards(cards)?;
        let mut sorted = cards.to_vec();
        sorted.sort_unstable();
        let key = EvalCacheKey {
            cards: sorted,
            table,
        };
        if let Some(hit) = self.cache.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return Ok(hit.clone());
        }
        self.misses.set(self.misses.get() + 1);
        let ranking = rank_hand(&key.cards, table);
        self.cache.borrow_mut().insert(key, ranking.clone());
        Ok(ranking)
    }

    pub fn compare(
        &self,
        a: &[Card],
        b: &[Card],
    ) -> Result<std::cmp::Ordering, EvalError> {
        Ok(self.evaluate(a)?.cmp_strength(&self.evaluate(b)?))
    }

    /// Top row of exactly three cards holding trips or a pair of queens or better.
    pub fn is_fantasy_land_qualifying(&self, top: &[Card]) -> bool {
        if top.len() != 3 {
            return false;
        }
        self.evaluate(top)
            .map(|ranking| ranking.qualifies_for_fantasy_land())
            .unwrap_or(false)
    }

    /// Rows must strictly increase from top to bottom. Two adjacent rows with
    /// the same hand type and the same primary strength count as a foul even
    /// when their kickers differ. Rows must hold exactly 3, 5 and 5 cards.
    pub fn validate_progression(
        &self,
        top: &[Card],
        middle: &[Card],
        bottom: &[Card],
    ) -> Result<bool, EvalError> {
        for (row, cards) in [(Row::Top, top), (Row::Middle, middle), (Row::Bottom, bottom)] {
            if cards.len() != row.capacity() {
                return Err(EvalError::RowSize {
                    row,
                    expected: row.capacity(),
                    actual: cards.len(),
                });
            }
        }
        let top = self.evaluate_row(top, Row::Top)?;
        let middle = self.evaluate_row(middle, Row::Middle)?;
        let bottom = self.evaluate_row(bottom, Row::Bottom)?;
        Ok(strictly_above(&middle, &top) && strictly_above(&bottom, &middle))
    }

    /// Incomplete layouts are never fouled.
    pub fn is_fouled(&self, layout: &Layout) -> Result<bool, EvalError> {
        if !layout.is_complete() {
            return Ok(false);
        }
        self.validate_progression(layout.top(), layout.middle(), layout.bottom())
            .map(|valid| !valid)
    }

    /// Sum of row royalties over the rows that are already full.
    pub fn total_royalties(&self, layout: &Layout) -> Result<u32, EvalError> {
        let mut total = 0;
        for row in Row::ALL {
            if layout.free_slots(row) == 0 {
                total += self.evaluate_row(layout.row(row), row)?.royalty;
            }
        }
        Ok(total)
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.borrow().len(),
            hits: self.hits.get(),
            misses: self.misses.get(),
        }
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
        self.hits.set(0);
        self.misses.set(0);
    }
}

pub(crate) fn strictly_above(upper: &HandRanking, lower: &HandRanking) -> bool {
    !upper.same_class(lower) && upper.beats(lower)
}

fn check_cards(cards: &[Card]) -> Result<(), EvalError> {
    if !(MIN_HAND..=MAX_HAND).contains(&cards.len()) {
        return Err(EvalError::InvalidCardCount(cards.len()));
    }
    match find_duplicate(cards) {
        Some(card) => Err(EvalError::DuplicateCard(card)),
        None => Ok(()),
    }
}

pub(crate) fn find_duplicate(cards: &[Card]) -> Option<Card> {
    cards
        .iter()
        .enumerate()
        .find(|(index, card)| cards[index + 1..].contains(*card))
        .map(|(_, card)| *card)
}

/// Uncached classification; callers validate the card count.
pub(crate) fn rank_hand(cards: &[Card], table: RoyaltyTable) -> HandRanking {
    let mut ranks: Vec<u8> = cards.iter().map(|card| card.value()).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let mut counts = [0u8; 15];
    for rank in &ranks {
        counts[*rank as usize] += 1;
    }
    // (count, rank) groups, largest group first then highest rank.
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter(|rank| counts[*rank as usize] > 0)
        .map(|rank| (counts[rank as usize], rank))
        .collect();
    groups.sort_by(|a, b| b.cmp(a));

    let five = cards.len() == 5;
    let is_flush = five && cards.iter().all(|card| card.suit == cards[0].suit);
    let straight_high = if five && groups.len() == 5 {
        if ranks[0] - ranks[4] == 4 {
            Some(ranks[0])
        } else if ranks == [14, 5, 4, 3, 2] {
            Some(5)
        } else {
            None
        }
    } else {
        None
    };

    let singles = |skip: &[u8]| -> Vec<u8> {
        ranks
            .iter()
            .copied()
            .filter(|rank| !skip.contains(rank))
            .collect()
    };

    let (hand_type, strength, kickers) = match (is_flush, straight_high, groups[0].0) {
        (true, Some(14), _) => (HandType::RoyalFlush, 14, Vec::new()),
        (true, Some(high), _) => (HandType::StraightFlush, high, Vec::new()),
        (_, _, 4) => (HandType::FourOfAKind, groups[0].1, singles(&[groups[0].1])),
        (_, _, 3) if groups.len() > 1 && groups[1].0 == 2 => {
            (HandType::FullHouse, groups[0].1, vec![groups[1].1])
        }
        (true, None, _) => (HandType::Flush, ranks[0], ranks[1..].to_vec()),
        (false, Some(high), _) => (HandType::Straight, high, Vec::new()),
        (_, _, 3) => (HandType::ThreeOfAKind, groups[0].1, singles(&[groups[0].1])),
        (_, _, 2) if groups.len() > 1 && groups[1].0 == 2 => {
            let (high, low) = (groups[0].1, groups[1].1);
            let mut kickers = vec![low];
            kickers.extend(singles(&[high, low]));
            (HandType::TwoPair, high, kickers)
        }
        (_, _, 2) => (HandType::Pair, groups[0].1, singles(&[groups[0].1])),
        _ => (HandType::HighCard, ranks[0], ranks[1..].to_vec()),
    };

    HandRanking {
        hand_type,
        strength,
        royalty: table.royalty(hand_type, strength),
        kickers,
    }
}
