use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const WILD_LABEL: &str = "Jk";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardParseError {
    #[error("card '{0}' must be a rank symbol followed by a suit symbol")]
    Malformed(String),
    #[error("unknown rank symbol '{0}'")]
    UnknownRank(char),
    #[error("unknown suit symbol '{0}'")]
    UnknownSuit(char),
}

/// A concrete playing card. Ordering is by rank first, then suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn value(self) -> u8 {
        self.rank.value()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let (Some(rank), Some(suit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(CardParseError::Malformed(trimmed.to_string()));
        };
        let rank = Rank::from_symbol(rank).ok_or(CardParseError::UnknownRank(rank))?;
        let suit = Suit::from_symbol(suit).ok_or(CardParseError::UnknownSuit(suit))?;
        Ok(Card::new(rank, suit))
    }
}

impl TryFrom<String> for Card {
    type Error = CardParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

/// A dealt card that may be a wild (joker) standing in for any concrete card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AnyCard {
    Natural(Card),
    Wild,
}

impl AnyCard {
    pub const fn is_wild(self) -> bool {
        matches!(self, AnyCard::Wild)
    }

    pub const fn natural(self) -> Option<Card> {
        match self {
            AnyCard::Natural(card) => Some(card),
            AnyCard::Wild => None,
        }
    }

    /// Separates concrete cards from wild markers, returning the wild count.
    pub fn split(cards: &[AnyCard]) -> (Vec<Card>, usize) {
        let mut natural = Vec::with_capacity(cards.len());
        let mut wilds = 0;
        for card in cards {
            match card {
                AnyCard::Natural(card) => natural.push(*card),
                AnyCard::Wild => wilds += 1,
            }
        }
        (natural, wilds)
    }
}

impl From<Card> for AnyCard {
    fn from(card: Card) -> Self {
        AnyCard::Natural(card)
    }
}

impl fmt::Display for AnyCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyCard::Natural(card) => fmt::Display::fmt(card, f),
            AnyCard::Wild => f.write_str(WILD_LABEL),
        }
    }
}

impl FromStr for AnyCard {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(WILD_LABEL) {
            return Ok(AnyCard::Wild);
        }
        s.parse().map(AnyCard::Natural)
    }
}

impl TryFrom<String> for AnyCard {
    type Error = CardParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AnyCard> for String {
    fn from(card: AnyCard) -> Self {
        card.to_string()
    }
}

/// Parses a whitespace or comma separated card list such as `"As Kd, Tc"`.
pub fn parse_cards(text: &str) -> Result<Vec<Card>, CardParseError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}
