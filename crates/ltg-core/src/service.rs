//! Ticket generation service.

use crate::game::LotteryType;
use crate::ticket::Ticket;
use rand::Rng;

/// Stateless generator the daemon and console both call into.
///
/// Generation itself cannot fail for a known game; resolving a wire string
/// to a [`LotteryType`] is the caller's fallible step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketService;

impl TicketService {
    pub fn new() -> Self {
        Self
    }

    /// Generates `count` independently drawn tickets.
    pub fn generate(&self, lottery: LotteryType, count: u32) -> Vec<Ticket> {
        self.generate_with_rng(&mut rand::thread_rng(), lottery, count)
    }

    /// Seedable variant of [`TicketService::generate`].
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        lottery: LotteryType,
        count: u32,
    ) -> Vec<Ticket> {
        (0..count)
            .map(|_| Ticket::draw_with_rng(lottery, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generates_requested_count() {
        let service = TicketService::new();
        let tickets = service.generate(LotteryType::Lottario, 4);
        assert_eq!(tickets.len(), 4);
    }

    #[test]
    fn test_each_ticket_satisfies_game_rules() {
        let service = TicketService::new();
        for ticket in service.generate(LotteryType::Max, 10) {
            let draw = &ticket.draws()[0];
            assert_eq!(draw.numbers().len(), 7);
            assert!(draw.numbers().iter().all(|n| (1..=50).contains(n)));
            assert!(draw.numbers().windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let service = TicketService::new();
        let first =
            service.generate_with_rng(&mut StdRng::seed_from_u64(99), LotteryType::Grand, 3);
        let second =
            service.generate_with_rng(&mut StdRng::seed_from_u64(99), LotteryType::Grand, 3);
        assert_eq!(first, second);
    }
}
