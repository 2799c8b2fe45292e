//! A generated ticket: one draw per pool of its game.

use crate::game::LotteryType;
use crate::pool::Draw;
use rand::Rng;
use std::fmt;

/// One generated ticket.
///
/// Holds a [`Draw`] for every pool of the game it was generated for, in
/// game order. Rendering yields one line per draw with no trailing newline,
/// which is the block format used in wire responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    draws: Vec<Draw>,
}

impl Ticket {
    /// Draws a fresh ticket for `lottery` using the supplied RNG.
    pub fn draw_with_rng<R: Rng + ?Sized>(lottery: LotteryType, rng: &mut R) -> Self {
        let draws = lottery
            .pools()
            .iter()
            .map(|pool| pool.draw_with_rng(rng))
            .collect();
        Self { draws }
    }

    /// The per-pool draws, in game order.
    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.draws.iter().map(Draw::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}
