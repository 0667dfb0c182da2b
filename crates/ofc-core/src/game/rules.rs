use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Standard,
    #[default]
    Pineapple,
}

impl Variant {
    /// Cards dealt at once to a player in Fantasy Land.
    pub const fn fantasy_deal_size(self) -> usize {
        match self {
            Variant::Standard => 13,
            Variant::Pineapple => 14,
        }
    }

    /// Cards dealt per turn after the initial five.
    pub const fn cards_per_turn(self) -> usize {
        match self {
            Variant::Standard => 1,
            Variant::Pineapple => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Pineapple => "pineapple",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRules {
    pub variant: Variant,
    pub player_count: u8,
    pub fantasy_land: bool,
}

impl GameRules {
    pub const INITIAL_DEAL: usize = 5;

    pub const fn pineapple(player_count: u8) -> Self {
        Self {
            variant: Variant::Pineapple,
            player_count,
            fantasy_land: true,
        }
    }

    pub const fn standard(player_count: u8) -> Self {
        Self {
            variant: Variant::Standard,
            player_count,
            fantasy_land: true,
        }
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::pineapple(2)
    }
}
