use chrono::{DateTime, Utc};

use crate::format::capitalize;

/// Represents a Zendesk ticket status.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TicketStatus {
    New,
    Open,
    Pending,
    Hold,
    Solved,
    Closed,
    Other(String),
}

impl TicketStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Open => "open",
            TicketStatus::Pending => "pending",
            TicketStatus::Hold => "hold",
            TicketStatus::Solved => "solved",
            TicketStatus::Closed => "closed",
            TicketStatus::Other(s) => s,
        }
    }

    pub fn from_api(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "new" => TicketStatus::New,
            "open" => TicketStatus::Open,
            "pending" => TicketStatus::Pending,
            "hold" | "on-hold" => TicketStatus::Hold,
            "solved" => TicketStatus::Solved,
            "closed" => TicketStatus::Closed,
            _ => TicketStatus::Other(s.trim().to_string()),
        }
    }

    /// Capitalized form shown to the user, e.g. `Open`.
    pub fn display_name(&self) -> String {
        capitalize(self.as_str())
    }
}

/// A single Zendesk ticket, as fetched for one view.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRecord {
    pub id: u64,
    pub subject: String,
    pub description: String,
    pub created: DateTime<Utc>,
    pub status: TicketStatus,
    pub requester: String,
    pub submitter: String,
}

impl TicketRecord {
    pub fn created_date(&self) -> String {
        self.created.format("%m/%d/%y").to_string()
    }

    pub fn created_time(&self) -> String {
        self.created.format("%H:%M:%S").to_string()
    }

    pub fn created_display(&self) -> String {
        self.created.format("%m/%d/%y %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_ticket;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(TicketStatus::from_api("open"), TicketStatus::Open);
        assert_eq!(TicketStatus::from_api("Pending"), TicketStatus::Pending);
        assert_eq!(TicketStatus::from_api("SOLVED"), TicketStatus::Solved);
        assert_eq!(TicketStatus::from_api("hold"), TicketStatus::Hold);
        assert_eq!(
            TicketStatus::from_api("escalated"),
            TicketStatus::Other("escalated".to_string())
        );
    }

    #[test]
    fn status_display_name_is_capitalized() {
        assert_eq!(TicketStatus::New.display_name(), "New");
        assert_eq!(TicketStatus::Closed.display_name(), "Closed");
        assert_eq!(
            TicketStatus::Other("AWAITING vendor".to_string()).display_name(),
            "Awaiting vendor"
        );
    }

    #[test]
    fn created_timestamp_formats() {
        let ticket = sample_ticket(1);
        assert_eq!(ticket.created_date(), "01/01/19");
        assert_eq!(ticket.created_time(), "00:05:20");
        assert_eq!(ticket.created_display(), "01/01/19 00:05:20");
    }
}
