//! Fantasy Land entry, stay, and re-placement rules.

use crate::eval::evaluator::strictly_above;
use crate::eval::{HandEvaluator, HandRanking, HandType};
use crate::game::rules::Variant;
use crate::model::card::Card;
use crate::model::row::Row;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Royalty-equivalent value of keeping Fantasy Land for another hand.
const STAY_VALUE: i64 = 20;
const ENTRY_VALUE: f64 = 10.0;
const FOUL_COST: f64 = 6.0;
/// Below this entry probability a top-row card is not worth chasing.
const CHASE_THRESHOLD: f64 = 0.15;
const CARDS_KEPT_PER_STREET: usize = 2;
/// First three cards on top, next five in the middle, next five on the bottom.
const DEAL_ORDER_SPLIT: [u16; 3] = [0x0007, 0x00f8, 0x1f00];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FantasyError {
    #[error("Must deal exactly {expected} cards in Fantasy Land")]
    WrongDealCount { expected: usize, actual: usize },
    #[error("Must place exactly 13 cards")]
    WrongPlacementCount(usize),
    #[error("Duplicate cards in placement")]
    DuplicateCards,
    #[error("Placed cards not from dealt cards")]
    ForeignCards,
}

/// A full Fantasy Land setting chosen from the deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FantasyPlacement {
    pub top: Vec<Card>,
    pub middle: Vec<Card>,
    pub bottom: Vec<Card>,
    pub discarded: Vec<Card>,
    /// Zero when the setting is fouled.
    pub royalties: u32,
    pub can_stay: bool,
    pub fouled: bool,
}

impl FantasyPlacement {
    pub fn placed(&self) -> Vec<Card> {
        let mut cards = self.top.clone();
        cards.extend_from_slice(&self.middle);
        cards.extend_from_slice(&self.bottom);
        cards
    }
}

/// Rough outlook for putting one more card on the top row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TopRowOutlook {
    pub fl_probability: f64,
    pub foul_risk: f64,
    pub expected_value: f64,
    /// From -1 (avoid) to 1 (play it).
    pub recommendation: f64,
}

#[derive(Debug, Default)]
pub struct FantasyLand {
    evaluator: HandEvaluator,
    variant: Variant,
}

impl FantasyLand {
    pub fn new(variant: Variant) -> Self {
        Self {
            evaluator: HandEvaluator::new(),
            variant,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn cards_dealt(&self) -> usize {
        self.variant.fantasy_deal_size()
    }

    pub fn check_entry_qualification(&self, top: &[Card]) -> bool {
        self.evaluator.is_fantasy_land_qualifying(top)
    }

    /// Stay rule for the configured variant.
    pub fn check_stay_qualification(&self, top: &[Card], middle: &[Card], bottom: &[Card]) -> bool {
        match self.variant {
            Variant::Pineapple => self.check_pineapple_stay(top),
            Variant::Standard => self.check_standard_stay(top, middle, bottom),
        }
    }

    /// Pineapple keeps the entry condition: queens or better on top.
    pub fn check_pineapple_stay(&self, top: &[Card]) -> bool {
        self.check_entry_qualification(top)
    }

    /// Trips on top, a full house or better in the middle, or quads or
    /// better on the bottom.
    pub fn check_standard_stay(&self, top: &[Card], middle: &[Card], bottom: &[Card]) -> bool {
        let meets = |cards: &[Card], row: Row, floor: HandType| {
            cards.len() == row.capacity()
                && self
                    .evaluator
                    .evaluate_row(cards, row)
                    .map(|ranking| ranking.hand_type >= floor)
                    .unwrap_or(false)
        };
        meets(top, Row::Top, HandType::ThreeOfAKind)
            || meets(middle, Row::Middle, HandType::FullHouse)
            || meets(bottom, Row::Bottom, HandType::FourOfAKind)
    }

    fn stays_with(&self, top: &HandRanking, middle: &HandRanking, bottom: &HandRanking) -> bool {
        match self.variant {
            Variant::Pineapple => top.qualifies_for_fantasy_land(),
            Variant::Standard => {
                top.hand_type >= HandType::ThreeOfAKind
                    || middle.hand_type >= HandType::FullHouse
                    || bottom.hand_type >= HandType::FourOfAKind
            }
        }
    }

    /// Searches every 3/5/5 split of the deal for the setting worth the most
    /// royalties, counting a kept Fantasy Land as extra value. Fouled
    /// settings are only returned when nothing else exists. Ties keep the
    /// first split found.
    pub fn recommend_placement(&self, dealt: &[Card]) -> Result<FantasyPlacement, FantasyError> {
        let expected = self.cards_dealt();
        if dealt.len() != expected {
            return Err(FantasyError::WrongDealCount {
                expected,
                actual: dealt.len(),
            });
        }
        if has_duplicates(dealt) {
            return Err(FantasyError::DuplicateCards);
        }

        let size = dealt.len();
        let full = ((1u32 << size) - 1) as u16;
        let fives = subsets(size, 5);
        let rank_all = |masks: &[u16], row: Row| {
            let mut ranked: Vec<Option<HandRanking>> = vec![None; 1 << size];
            for mask in masks {
                ranked[usize::from(*mask)] =
                    self.evaluator.evaluate_row(&pick(dealt, *mask), row).ok();
            }
            ranked
        };
        let tops = rank_all(&subsets(size, 3)[..], Row::Top);
        let middles = rank_all(&fives[..], Row::Middle);
        let bottoms = rank_all(&fives[..], Row::Bottom);

        let mut best: Option<(i64, [u16; 3])> = None;
        for &bottom in &fives {
            let Some(bottom_rank) = &bottoms[usize::from(bottom)] else {
                continue;
            };
            for &middle in &fives {
                if middle & bottom != 0 {
                    continue;
                }
                let Some(middle_rank) = &middles[usize::from(middle)] else {
                    continue;
                };
                let lower_sound = strictly_above(bottom_rank, middle_rank);
                if !lower_sound && best.is_some() {
                    continue;
                }
                let rest = full & !bottom & !middle;
                for top in submasks(rest, 3) {
                    let Some(top_rank) = &tops[usize::from(top)] else {
                        continue;
                    };
                    let value = if lower_sound && strictly_above(middle_rank, top_rank) {
                        let royalties =
                            i64::from(top_rank.royalty + middle_rank.royalty + bottom_rank.royalty);
                        let stay = self.stays_with(top_rank, middle_rank, bottom_rank);
                        royalties + if stay { STAY_VALUE } else { 0 }
                    } else {
                        -1
                    };
                    if best.is_none_or(|(current, _)| value > current) {
                        best = Some((value, [top, middle, bottom]));
                    }
                }
            }
        }

        let (value, [top, middle, bottom]) = best.unwrap_or((-1, DEAL_ORDER_SPLIT));
        let fouled = value < 0;
        let (royalties, can_stay) = match (
            &tops[usize::from(top)],
            &middles[usize::from(middle)],
            &bottoms[usize::from(bottom)],
        ) {
            (Some(t), Some(m), Some(b)) if !fouled => {
                (t.royalty + m.royalty + b.royalty, self.stays_with(t, m, b))
            }
            _ => (0, false),
        };
        Ok(FantasyPlacement {
            top: pick(dealt, top),
            middle: pick(dealt, middle),
            bottom: pick(dealt, bottom),
            discarded: pick(dealt, full & !(top | middle | bottom)),
            royalties,
            can_stay,
            fouled,
        })
    }

    /// Heuristic chances and risk of adding `candidate` to the top row with
    /// `remaining_streets` deals still to come. A full row yields the default.
    pub fn analyze_top_row_placement(
        &self,
        current_top: &[Card],
        candidate: Card,
        remaining_streets: usize,
    ) -> TopRowOutlook {
        if current_top.len() >= Row::Top.capacity() {
            return TopRowOutlook::default();
        }
        let mut top = current_top.to_vec();
        top.push(candidate);

        let fl_probability = self.top_row_probability(&top, remaining_streets);
        let foul_risk = top_row_risk(&top, candidate);
        let expected_value = fl_probability * ENTRY_VALUE - foul_risk * FOUL_COST;
        let recommendation = if fl_probability >= CHASE_THRESHOLD && foul_risk < 0.3 {
            (fl_probability * 2.0).min(1.0)
        } else if foul_risk > 0.5 {
            -1.0
        } else {
            (expected_value / ENTRY_VALUE).clamp(-1.0, 1.0)
        };
        TopRowOutlook {
            fl_probability,
            foul_risk,
            expected_value,
            recommendation,
        }
    }

    fn top_row_probability(&self, top: &[Card], remaining_streets: usize) -> f64 {
        if top.len() >= Row::Top.capacity() {
            return if self.evaluator.is_fantasy_land_qualifying(top) {
                1.0
            } else {
                0.0
            };
        }
        if pair_rank(top).is_some_and(|rank| rank >= 12) {
            return 0.95;
        }
        let high_cards = top.iter().filter(|card| card.value() >= 12).count();
        let needed = Row::Top.capacity() - top.len();
        let opportunities = needed.min(remaining_streets * CARDS_KEPT_PER_STREET) as f64;
        let per_card = match high_cards {
            0 => 0.05,
            1 => 0.15,
            _ => 0.25,
        };
        (per_card * opportunities).min(0.8)
    }

    /// Crude chance of reaching the listed row's qualifying hand given how
    /// many cards are already out of the deck.
    pub fn fantasy_land_probability(cards_seen: &[Card], row: Row) -> f64 {
        let unseen = 52usize.saturating_sub(cards_seen.len()) as f64 / 40.0;
        match row {
            Row::Top => (0.15 * unseen).min(0.20),
            Row::Middle => (0.10 * unseen).min(0.15),
            Row::Bottom => (0.25 * unseen).min(0.35),
        }
    }

    /// Checks a Fantasy Land re-placement of 13 cards chosen from the deal.
    pub fn validate_fantasy_placement(
        &self,
        placed: &[Card],
        dealt: &[Card],
    ) -> Result<(), FantasyError> {
        let expected = self.cards_dealt();
        if dealt.len() != expected {
            return Err(FantasyError::WrongDealCount {
                expected,
                actual: dealt.len(),
            });
        }
        if placed.len() != 13 {
            return Err(FantasyError::WrongPlacementCount(placed.len()));
        }
        if has_duplicates(placed) {
            return Err(FantasyError::DuplicateCards);
        }
        if placed.iter().any(|card| !dealt.contains(card)) {
            return Err(FantasyError::ForeignCards);
        }
        Ok(())
    }
}

fn has_duplicates(cards: &[Card]) -> bool {
    let mut unique = cards.to_vec();
    unique.sort_unstable();
    unique.dedup();
    unique.len() != cards.len()
}

/// Highest rank held at least twice.
fn pair_rank(cards: &[Card]) -> Option<u8> {
    let mut counts = [0u8; 15];
    for card in cards {
        counts[usize::from(card.value())] += 1;
    }
    (2..=14u8).rev().find(|rank| counts[usize::from(*rank)] >= 2)
}

fn top_row_risk(top: &[Card], candidate: Card) -> f64 {
    if top.len() >= 2 && pair_rank(top).is_some_and(|rank| rank >= 10) {
        return 0.2;
    }
    let mut risk = f64::from(candidate.value()) / 14.0 * 0.4;
    if top.len() == Row::Top.capacity() {
        risk *= 1.5;
    }
    risk.min(0.9)
}

/// Bit masks over `size` cards with exactly `count` bits set, ascending.
fn subsets(size: usize, count: u32) -> Vec<u16> {
    (0u32..(1 << size))
        .filter(|mask| mask.count_ones() == count)
        .map(|mask| mask as u16)
        .collect()
}

fn submasks(set: u16, count: u32) -> Vec<u16> {
    let mut found = Vec::new();
    let mut sub = set;
    loop {
        if sub.count_ones() == count {
            found.push(sub);
        }
        if sub == 0 {
            break;
        }
        sub = (sub - 1) & set;
    }
    found.reverse();
    found
}

fn pick(cards: &[Card], mask: u16) -> Vec<Card> {
    cards
        .iter()
        .enumerate()
        .filter(|(index, _)| mask & (1 << index) != 0)
        .map(|(_, card)| *card)
        .collect()
}
