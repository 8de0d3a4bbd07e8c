use std::cell::Cell;

use chrono::{TimeZone, Utc};

use crate::ticket::{TicketRecord, TicketStatus};
use crate::zendesk_client::{SourceError, TicketSource};

pub fn sample_ticket(id: u64) -> TicketRecord {
    TicketRecord {
        id,
        subject: format!("Sample ticket {}", id),
        description: format!("First line of {}\nSecond line", id),
        created: Utc.with_ymd_and_hms(2019, 1, 1, 0, 5, 20).unwrap(),
        status: TicketStatus::Open,
        requester: format!("Requester {}", id),
        submitter: format!("Submitter {}", id),
    }
}

pub fn sample_tickets(count: u64) -> Vec<TicketRecord> {
    (1..=count).map(sample_ticket).collect()
}

/// In-memory ticket source with an optional scripted failure.
pub struct FakeSource {
    pub tickets: Vec<TicketRecord>,
    pub failure: Option<SourceError>,
    pub list_calls: Cell<usize>,
}

impl FakeSource {
    pub fn with_tickets(count: u64) -> Self {
        Self {
            tickets: sample_tickets(count),
            failure: None,
            list_calls: Cell::new(0),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            tickets: Vec::new(),
            failure: Some(error),
            list_calls: Cell::new(0),
        }
    }
}

impl TicketSource for FakeSource {
    async fn fetch_all(&self) -> Result<Vec<TicketRecord>, SourceError> {
        self.list_calls.set(self.list_calls.get() + 1);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.tickets.clone()),
        }
    }

    async fn fetch_by_id(&self, id: u64) -> Result<TicketRecord, SourceError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(SourceError::NotFound(id))
    }
}

/// Bytes written by a view, as text.
pub fn output_text(output: Vec<u8>) -> String {
    String::from_utf8(output).expect("output should be UTF-8")
}
