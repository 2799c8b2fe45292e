//! Local ticket generation without a daemon.

use ltg_core::{LotteryType, TicketService};
use ltg_protocol::TicketResponse;

/// Generates tickets in-process and renders them exactly like a daemon
/// reply, so console and network output stay interchangeable.
pub fn generate_local(lottery: LotteryType, request_id: &str, count: u32) -> String {
    let service = TicketService::new();
    let tickets = service.generate(lottery, count);
    TicketResponse::new(request_id.to_string(), lottery, tickets).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_output_shape() {
        let output = generate_local(LotteryType::Max, "local-1", 2);

        let sections: Vec<&str> = output.split("\n\n").collect();
        assert_eq!(sections.len(), 3, "header plus two tickets: {output}");
        assert_eq!(
            sections[0],
            "Generation Request ID: local-1\nTicket Type: Max"
        );
        for ticket in &sections[1..] {
            assert!(ticket.starts_with("Lotto Max Numbers: "), "{ticket}");
        }
    }

    #[test]
    fn test_local_grand_ticket_lines() {
        let output = generate_local(LotteryType::Grand, "local-2", 1);

        let ticket = output.split("\n\n").nth(1).unwrap();
        let lines: Vec<&str> = ticket.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Main Numbers: "));
        assert!(lines[1].starts_with("Grand Number: "));
    }
}
