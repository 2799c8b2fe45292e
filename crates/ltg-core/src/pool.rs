//! Number pools and single-pool draws.
//!
//! A pool is a named range-and-count rule ("7 unique numbers from 1-50").
//! Drawing from a pool samples without replacement and yields the numbers
//! in ascending order.

use crate::error::{DomainError, DomainResult};
use rand::Rng;
use std::fmt;

/// A named range-and-count rule belonging to a lottery game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pool {
    name: &'static str,
    low: u32,
    high: u32,
    picks: u32,
}

impl Pool {
    /// Creates a pool rule.
    ///
    /// Construction is unchecked so game definitions can live in consts;
    /// [`Pool::validate`] checks the range/pick rules.
    pub const fn new(name: &'static str, low: u32, high: u32, picks: u32) -> Self {
        Self {
            name,
            low,
            high,
            picks,
        }
    }

    /// Pool name as it appears in rendered tickets.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Inclusive lower bound of the number range.
    pub const fn low(&self) -> u32 {
        self.low
    }

    /// Inclusive upper bound of the number range.
    pub const fn high(&self) -> u32 {
        self.high
    }

    /// How many unique numbers a draw takes from the range.
    pub const fn picks(&self) -> u32 {
        self.picks
    }

    /// Checks the pool rules: `low < high` and `1 <= picks <= range size`.
    pub fn validate(&self) -> DomainResult<()> {
        if self.low >= self.high {
            return Err(DomainError::InvalidPool {
                name: self.name.to_string(),
                reason: format!("range {}-{} is empty or inverted", self.low, self.high),
            });
        }
        let span = self.high - self.low + 1;
        if self.picks == 0 || self.picks > span {
            return Err(DomainError::InvalidPool {
                name: self.name.to_string(),
                reason: format!("cannot pick {} from a range of {}", self.picks, span),
            });
        }
        Ok(())
    }

    /// Draws `picks` unique numbers from the range, sorted ascending.
    pub fn draw_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Draw {
        let span = (self.high - self.low + 1) as usize;
        // index::sample requires amount <= length; validate() enforces this
        // for every shipped game definition.
        let take = (self.picks as usize).min(span);
        let mut numbers: Vec<u32> = rand::seq::index::sample(rng, span, take)
            .into_vec()
            .into_iter()
            .map(|offset| self.low + offset as u32)
            .collect();
        numbers.sort_unstable();
        Draw {
            pool_name: self.name,
            numbers,
        }
    }
}

/// One pool's drawn numbers, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pool_name: &'static str,
    numbers: Vec<u32>,
}

impl Draw {
    /// Name of the pool this draw came from.
    pub fn pool_name(&self) -> &'static str {
        self.pool_name
    }

    /// The drawn numbers, sorted ascending.
    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }
}

impl fmt::Display for Draw {
    /// Renders as `{pool name}: {numbers space-separated}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.numbers.iter().map(u32::to_string).collect();
        write!(f, "{}: {}", self.pool_name, rendered.join(" "))
    }
}
