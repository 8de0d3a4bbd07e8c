use std::io::Write;

use anyhow::Result;

use crate::format::{pad, sanitize};
use crate::ticket::TicketRecord;
use crate::zendesk_client::{SourceError, TicketSource};

const RULE_WIDTH: usize = 80;
const LABEL_WIDTH: usize = 15;
const VALUE_WIDTH: usize = 65;

pub const NOT_FOUND_MESSAGE: &str = "Record Not Found";

/// What happened when a ticket was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
    Shown,
    NotFound,
    Unavailable,
}

/// Bordered label/value block for one ticket, one string per output line.
pub fn render_detail(ticket: &TicketRecord) -> Vec<String> {
    let rule = "*".repeat(RULE_WIDTH);
    let fields = [
        ("Ticket ID", ticket.id.to_string()),
        ("Subject", sanitize(&ticket.subject)),
        ("Description", sanitize(&ticket.description)),
        ("Created", ticket.created_display()),
        ("Submitted by", ticket.submitter.clone()),
        ("Status", ticket.status.display_name()),
    ];

    let mut lines = Vec::with_capacity(fields.len() + 2);
    lines.push(rule.clone());
    for (label, value) in fields {
        lines.push(format!("{}{}", pad(label, LABEL_WIDTH), pad(&value, VALUE_WIDTH)));
    }
    lines.push(rule);
    lines
}

/// Fetch and print a single ticket. Lookup failures are reported to the user
/// and returned as an outcome; only terminal write errors escape.
pub async fn show_ticket<S, W>(source: &S, id: u64, output: &mut W) -> Result<DetailOutcome>
where
    S: TicketSource,
    W: Write,
{
    writeln!(output, "Fetching ticket {} from Zendesk...", id)?;
    output.flush()?;

    let outcome = match source.fetch_by_id(id).await {
        Ok(ticket) => {
            for line in render_detail(&ticket) {
                writeln!(output, "{}", line)?;
            }
            DetailOutcome::Shown
        }
        Err(SourceError::NotFound(_)) => {
            writeln!(output, "{}", NOT_FOUND_MESSAGE)?;
            DetailOutcome::NotFound
        }
        Err(e) => {
            writeln!(output, "Unable to fetch ticket {}: {}", id, e)?;
            DetailOutcome::Unavailable
        }
    };
    output.flush()?;
    Ok(outcome)
}
