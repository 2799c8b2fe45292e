//! Lottery game identification and pool definitions.

use crate::error::DomainError;
use crate::pool::Pool;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_POOLS: [Pool; 1] = [Pool::new("Lotto Max Numbers", 1, 50, 7)];
const GRAND_POOLS: [Pool; 2] = [
    Pool::new("Main Numbers", 1, 49, 5),
    Pool::new("Grand Number", 1, 7, 1),
];
const LOTTARIO_POOLS: [Pool; 1] = [Pool::new("Lottario Numbers", 1, 45, 6)];

/// Supported lottery games.
///
/// Parsed case-insensitively from the wire strings `max`, `grand`, and
/// `lottario`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotteryType {
    /// Lotto Max: 7 unique numbers from 1-50
    Max,

    /// Daily Grand: 5 unique main numbers from 1-49 plus a grand number from 1-7
    Grand,

    /// Lottario: 6 unique numbers from 1-45
    Lottario,
}

impl LotteryType {
    /// Every supported game, in presentation order.
    pub const ALL: [LotteryType; 3] = [Self::Max, Self::Grand, Self::Lottario];

    /// Human-facing label used in response headers.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Max => "Max",
            Self::Grand => "Grand",
            Self::Lottario => "Lottario",
        }
    }

    /// Lowercase name used on the wire and the CLI.
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Grand => "grand",
            Self::Lottario => "lottario",
        }
    }

    /// The pool rules a single ticket of this game draws from, in game order.
    pub const fn pools(&self) -> &'static [Pool] {
        match self {
            Self::Max => &MAX_POOLS,
            Self::Grand => &GRAND_POOLS,
            Self::Lottario => &LOTTARIO_POOLS,
        }
    }
}

impl FromStr for LotteryType {
    type Err = DomainError;

    /// Case-insensitive parse; the error echoes the normalized value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase();
        match normalized.as_str() {
            "max" => Ok(Self::Max),
            "grand" => Ok(Self::Grand),
            "lottario" => Ok(Self::Lottario),
            _ => Err(DomainError::UnknownLotteryType { value: normalized }),
        }
    }
}

impl fmt::Display for LotteryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
