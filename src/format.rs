use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ticket::TicketRecord;

/// Suffix appended to truncated cells. Occupies four columns.
pub const ELLIPSIS: &str = "... ";

/// Smallest column width that can hold at least one char plus the ellipsis.
pub const MIN_COLUMN_WIDTH: usize = ELLIPSIS.len() + 1;

/// Fixed character widths of the ticket table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSpec {
    pub id: usize,
    pub subject: usize,
    pub user: usize,
    pub date: usize,
    pub time: usize,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            id: 8,
            subject: 32,
            user: 20,
            date: 10,
            time: 10,
        }
    }
}

impl ColumnSpec {
    pub fn total_width(&self) -> usize {
        self.id + self.subject + self.user + self.date + self.time
    }

    /// Reject widths too narrow to show truncated content.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("id", self.id),
            ("subject", self.subject),
            ("user", self.user),
            ("date", self.date),
            ("time", self.time),
        ];
        for (name, width) in named {
            if width < MIN_COLUMN_WIDTH {
                anyhow::bail!(
                    "column width for `{}` must be at least {} (got {})",
                    name,
                    MIN_COLUMN_WIDTH,
                    width
                );
            }
        }
        Ok(())
    }
}

/// Pad `content` on the right to exactly `width` chars, shortening it with
/// an ellipsis when it does not fit.
///
/// Content that is as long as the column or longer keeps its first
/// `width - 4` chars followed by `"... "`. Below a width of 5 there is no
/// room for content, so the result is the leading part of the ellipsis.
pub fn pad(content: &str, width: usize) -> String {
    let len = content.chars().count();
    if len < width {
        let mut out = String::with_capacity(content.len() + width - len);
        out.push_str(content);
        out.extend(std::iter::repeat(' ').take(width - len));
        return out;
    }

    if width < MIN_COLUMN_WIDTH {
        return ELLIPSIS.chars().take(width).collect();
    }

    let mut out: String = content.chars().take(width - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Collapse multi-line text onto one line, one space per line break.
pub fn sanitize(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Upper-case the first char and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

/// Lays out ticket table rows using a fixed set of column widths.
#[derive(Debug, Clone)]
pub struct TableFormatter {
    columns: ColumnSpec,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new(ColumnSpec::default())
    }
}

impl TableFormatter {
    pub fn new(columns: ColumnSpec) -> Self {
        Self { columns }
    }

    pub fn line(&self, id: &str, subject: &str, user: &str, date: &str, time: &str) -> String {
        let c = &self.columns;
        let mut out = String::with_capacity(c.total_width());
        out.push_str(&pad(id, c.id));
        out.push_str(&pad(subject, c.subject));
        out.push_str(&pad(user, c.user));
        out.push_str(&pad(date, c.date));
        out.push_str(&pad(time, c.time));
        out
    }

    pub fn header(&self) -> String {
        self.line("ID", "SUBJECT", "USER", "DATE", "TIME")
    }

    pub fn ticket_row(&self, ticket: &TicketRecord) -> String {
        self.line(
            &ticket.id.to_string(),
            &sanitize(&ticket.subject),
            &ticket.requester,
            &ticket.created_date(),
            &ticket.created_time(),
        )
    }
}
