use crate::eval::ranking::HandType;
use crate::model::row::Row;
use serde::{Deserialize, Serialize};

/// Royalty point schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoyaltyTable {
    /// Three-card front row: trips and pairs of sixes or better.
    Top,
    /// Pineapple middle row, roughly double the standard schedule.
    PineappleMiddle,
    /// Standard five-card schedule, used for the bottom row.
    Standard,
}

impl RoyaltyTable {
    pub const fn for_row(row: Row) -> Self {
        match row {
            Row::Top => RoyaltyTable::Top,
            Row::Middle => RoyaltyTable::PineappleMiddle,
            Row::Bottom => RoyaltyTable::Standard,
        }
    }

    /// Table used when no row is given: front table for three cards,
    /// standard schedule otherwise.
    pub const fn for_size(size: usize) -> Self {
        if size == 3 {
            RoyaltyTable::Top
        } else {
            RoyaltyTable::Standard
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            RoyaltyTable::Top => "top",
            RoyaltyTable::PineappleMiddle => "mid",
            RoyaltyTable::Standard => "std",
        }
    }

    pub fn royalty(self, hand_type: HandType, strength: u8) -> u32 {
        match self {
            RoyaltyTable::Top => match hand_type {
                HandType::ThreeOfAKind => 10 + u32::from(strength.saturating_sub(2)),
                HandType::Pair if strength >= 6 => u32::from(strength - 5),
                _ => 0,
            },
            RoyaltyTable::PineappleMiddle => match hand_type {
                HandType::ThreeOfAKind => 2,
                HandType::Straight => 4,
                HandType::Flush => 8,
                HandType::FullHouse => 12,
                HandType::FourOfAKind => 20,
                HandType::StraightFlush => 30,
                HandType::RoyalFlush => 50,
                _ => 0,
            },
            RoyaltyTable::Standard => match hand_type {
                HandType::Straight => 2,
                HandType::Flush => 4,
                HandType::FullHouse => 6,
                HandType::FourOfAKind => 10,
                HandType::StraightFlush => 15,
                HandType::RoyalFlush => 25,
                _ => 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RoyaltyTable;
    use crate::eval::ranking::HandType;

    #[test]
    fn top_table_scales_with_rank() {
        assert_eq!(RoyaltyTable::Top.royalty(HandType::ThreeOfAKind, 2), 10);
        assert_eq!(RoyaltyTable::Top.royalty(HandType::ThreeOfAKind, 14), 22);
        assert_eq!(RoyaltyTable::Top.royalty(HandType::Pair, 6), 1);
        assert_eq!(RoyaltyTable::Top.royalty(HandType::Pair, 14), 9);
        assert_eq!(RoyaltyTable::Top.royalty(HandType::Pair, 5), 0);
    }

    #[test]
    fn middle_table_outpays_standard() {
        for hand_type in [
            HandType::Straight,
            HandType::Flush,
            HandType::FullHouse,
            HandType::FourOfAKind,
            HandType::StraightFlush,
            HandType::RoyalFlush,
        ] {
            assert!(
                RoyaltyTable::PineappleMiddle.royalty(hand_type, 10)
                    > RoyaltyTable::Standard.royalty(hand_type, 10)
            );
        }
        assert_eq!(RoyaltyTable::PineappleMiddle.royalty(HandType::ThreeOfAKind, 9), 2);
        assert_eq!(RoyaltyTable::Standard.royalty(HandType::ThreeOfAKind, 9), 0);
    }
}
