use core::cmp::Ordering;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandType {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandType {
    pub const fn value(self) -> u8 {
        match self {
            HandType::HighCard => 0,
            HandType::Pair => 1,
            HandType::TwoPair => 2,
            HandType::ThreeOfAKind => 3,
            HandType::Straight => 4,
            HandType::Flush => 5,
            HandType::FullHouse => 6,
            HandType::FourOfAKind => 7,
            HandType::StraightFlush => 8,
            HandType::RoyalFlush => 9,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            HandType::HighCard => "high card",
            HandType::Pair => "pair",
            HandType::TwoPair => "two pair",
            HandType::ThreeOfAKind => "three of a kind",
            HandType::Straight => "straight",
            HandType::Flush => "flush",
            HandType::FullHouse => "full house",
            HandType::FourOfAKind => "four of a kind",
            HandType::StraightFlush => "straight flush",
            HandType::RoyalFlush => "royal flush",
        }
    }
}

impl fmt::Display for HandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a 3 or 5 card set.
///
/// `strength` is the primary grouped rank (the trips rank of a full house,
/// the high card of a straight, 5 for the wheel) and `kickers` break ties
/// in descending order. `royalty` depends on which table produced the
/// ranking and is ignored by comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandRanking {
    pub hand_type: HandType,
    pub strength: u8,
    pub kickers: Vec<u8>,
    pub royalty: u32,
}

impl HandRanking {
    /// Total ordering by hand type, then strength, then kickers.
    pub fn cmp_strength(&self, other: &HandRanking) -> Ordering {
        self.hand_type
            .cmp(&other.hand_type)
            .then(self.strength.cmp(&other.strength))
            .then_with(|| self.kickers.cmp(&other.kickers))
    }

    pub fn beats(&self, other: &HandRanking) -> bool {
        self.cmp_strength(other) == Ordering::Greater
    }

    /// Same hand type and same primary strength, regardless of kickers.
    pub fn same_class(&self, other: &HandRanking) -> bool {
        self.hand_type == other.hand_type && self.strength == other.strength
    }

    /// Trips, or a pair of queens or better. Only meaningful for a top row.
    pub fn qualifies_for_fantasy_land(&self) -> bool {
        match self.hand_type {
            HandType::ThreeOfAKind => true,
            HandType::Pair => self.strength >= 12,
            _ => false,
        }
    }
}

impl fmt::Display for HandRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.hand_type, self.strength)?;
        if self.royalty > 0 {
            write!(f, " +{}", self.royalty)?;
        }
        Ok(())
    }
}
