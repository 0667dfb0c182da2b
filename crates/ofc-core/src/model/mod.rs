pub mod card;
pub mod deck;
pub mod layout;
pub mod rank;
pub mod row;
pub mod suit;

pub use card::{AnyCard, Card, CardParseError, parse_cards};
pub use deck::Deck;
pub use layout::{Layout, LayoutError};
pub use rank::Rank;
pub use row::Row;
pub use suit::Suit;
