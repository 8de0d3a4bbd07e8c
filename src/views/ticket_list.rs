use std::io::{BufRead, Write};
use std::ops::Range;

use anyhow::Result;

use crate::format::TableFormatter;
use crate::prompt::read_line;
use crate::ticket::TicketRecord;
use crate::zendesk_client::TicketSource;

/// Tickets shown per screen.
pub const PAGE_SIZE: usize = 5;

/// Offset of the first ticket on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    offset: usize,
    total: usize,
}

impl PageCursor {
    pub fn new(total: usize) -> Self {
        Self { offset: 0, total }
    }

    fn last_offset(&self) -> usize {
        self.total.saturating_sub(PAGE_SIZE)
    }

    /// Indices of the tickets on the current page.
    pub fn window(&self) -> Range<usize> {
        let start = self.offset.min(self.total);
        start..(self.offset + PAGE_SIZE).min(self.total)
    }

    /// Advance one page, stopping at the last full page.
    pub fn next_page(&mut self) {
        self.offset = (self.offset + PAGE_SIZE).min(self.last_offset());
    }

    pub fn prev_page(&mut self) {
        self.offset = self.offset.saturating_sub(PAGE_SIZE);
    }

    /// 1-indexed, inclusive range of the visible tickets.
    pub fn status_line(&self) -> String {
        let window = self.window();
        let first = if window.is_empty() { 0 } else { window.start + 1 };
        format!(
            "Showing tickets {} to {} of {}. Type 'next', 'prev', or 'exit' to continue.",
            first, window.end, self.total
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCommand {
    Next,
    Prev,
    Exit,
    Invalid,
}

impl ListCommand {
    pub fn parse(input: &str) -> Self {
        match input {
            "next" => ListCommand::Next,
            "prev" => ListCommand::Prev,
            "exit" => ListCommand::Exit,
            _ => ListCommand::Invalid,
        }
    }
}

fn render_page<W: Write>(
    output: &mut W,
    formatter: &TableFormatter,
    tickets: &[TicketRecord],
    cursor: &PageCursor,
) -> Result<()> {
    writeln!(output, "{}", formatter.header())?;
    for ticket in &tickets[cursor.window()] {
        writeln!(output, "{}", formatter.ticket_row(ticket))?;
    }
    writeln!(output, "{}", cursor.status_line())?;
    output.flush()?;
    Ok(())
}

/// Interactive, paginated ticket table.
///
/// Fetches every ticket up front, then pages through the snapshot until the
/// user types `exit` or input ends. A failed fetch is returned to the caller
/// as a [`crate::zendesk_client::SourceError`].
pub async fn browse_tickets<S, R, W>(
    source: &S,
    formatter: &TableFormatter,
    input: &mut R,
    output: &mut W,
) -> Result<()>
where
    S: TicketSource,
    R: BufRead,
    W: Write,
{
    writeln!(output, "Gathering tickets from Zendesk...")?;
    output.flush()?;

    // TODO: page through the API on demand instead of loading the whole
    // workspace before the first screen.
    let tickets = source.fetch_all().await?;
    let mut cursor = PageCursor::new(tickets.len());

    loop {
        render_page(output, formatter, &tickets, &cursor)?;

        let Some(line) = read_line(input)? else {
            return Ok(());
        };
        match ListCommand::parse(&line) {
            ListCommand::Next => cursor.next_page(),
            ListCommand::Prev => cursor.prev_page(),
            ListCommand::Exit => return Ok(()),
            ListCommand::Invalid => writeln!(output, "Invalid option, try again.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{output_text, FakeSource};
    use crate::zendesk_client::SourceError;

    fn status_lines(text: &str) -> Vec<&str> {
        text.lines()
            .filter(|l| l.starts_with("Showing tickets"))
            .collect()
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let mut cursor = PageCursor::new(12);
        assert_eq!(cursor.window(), 0..5);

        cursor.next_page();
        assert_eq!(cursor.window().start, 5);
        cursor.next_page();
        assert_eq!(cursor.window().start, 7);
        assert_eq!(cursor.window(), 7..12);
        cursor.next_page();
        assert_eq!(cursor.window().start, 7);

        cursor.prev_page();
        assert_eq!(cursor.window().start, 2);
        cursor.prev_page();
        assert_eq!(cursor.window().start, 0);
        cursor.prev_page();
        assert_eq!(cursor.window().start, 0);
    }

    #[test]
    fn cursor_on_short_collection_never_moves() {
        let mut cursor = PageCursor::new(3);
        cursor.next_page();
        assert_eq!(cursor.window().start, 0);
        assert_eq!(cursor.window(), 0..3);
        assert!(cursor.status_line().starts_with("Showing tickets 1 to 3 of 3."));
    }

    #[test]
    fn cursor_on_empty_collection() {
        let mut cursor = PageCursor::new(0);
        cursor.next_page();
        cursor.prev_page();
        assert!(cursor.window().is_empty());
        assert!(cursor.status_line().starts_with("Showing tickets 0 to 0 of 0."));
    }

    #[test]
    fn list_commands_match_exactly() {
        assert_eq!(ListCommand::parse("next"), ListCommand::Next);
        assert_eq!(ListCommand::parse("prev"), ListCommand::Prev);
        assert_eq!(ListCommand::parse("exit"), ListCommand::Exit);
        assert_eq!(ListCommand::parse("NEXT"), ListCommand::Invalid);
        assert_eq!(ListCommand::parse(""), ListCommand::Invalid);
    }

    #[tokio::test]
    async fn first_page_shows_five_rows() {
        let source = FakeSource::with_tickets(12);
        let formatter = TableFormatter::default();
        let mut input = "exit\n".as_bytes();
        let mut output = Vec::new();

        browse_tickets(&source, &formatter, &mut input, &mut output)
            .await
            .expect("browse should succeed");

        let text = output_text(output);
        assert!(text.starts_with("Gathering tickets from Zendesk...\n"));
        assert!(text.contains(&formatter.header()));
        assert_eq!(text.matches("Sample ticket").count(), 5);
        assert!(text.contains("Sample ticket 5"));
        assert!(!text.contains("Sample ticket 6"));
        assert_eq!(
            status_lines(&text),
            vec!["Showing tickets 1 to 5 of 12. Type 'next', 'prev', or 'exit' to continue."]
        );
        assert_eq!(source.list_calls.get(), 1);
    }

    #[tokio::test]
    async fn navigation_walks_pages_without_wrapping() {
        let source = FakeSource::with_tickets(12);
        let formatter = TableFormatter::default();
        let mut input = "next\nnext\nnext\nprev\nprev\nprev\nexit\n".as_bytes();
        let mut output = Vec::new();

        browse_tickets(&source, &formatter, &mut input, &mut output)
            .await
            .expect("browse should succeed");

        let text = output_text(output);
        let ranges: Vec<String> = status_lines(&text)
            .iter()
            .map(|l| l.split('.').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            ranges,
            vec![
                "Showing tickets 1 to 5 of 12",
                "Showing tickets 6 to 10 of 12",
                "Showing tickets 8 to 12 of 12",
                "Showing tickets 8 to 12 of 12",
                "Showing tickets 3 to 7 of 12",
                "Showing tickets 1 to 5 of 12",
                "Showing tickets 1 to 5 of 12",
            ]
        );
        assert_eq!(source.list_calls.get(), 1);
    }

    #[tokio::test]
    async fn unknown_command_rerenders_same_page() {
        let source = FakeSource::with_tickets(8);
        let formatter = TableFormatter::default();
        let mut input = "forward\nexit\n".as_bytes();
        let mut output = Vec::new();

        browse_tickets(&source, &formatter, &mut input, &mut output)
            .await
            .expect("browse should succeed");

        let text = output_text(output);
        assert!(text.contains("Invalid option, try again.\n"));
        let lines = status_lines(&text);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], lines[1]);
    }

    #[tokio::test]
    async fn non_utf8_command_is_invalid_not_fatal() {
        let source = FakeSource::with_tickets(3);
        let formatter = TableFormatter::default();
        let mut input: &[u8] = b"\xff\nexit\n";
        let mut output = Vec::new();

        browse_tickets(&source, &formatter, &mut input, &mut output)
            .await
            .expect("browse should succeed");

        let text = output_text(output);
        assert!(text.contains("Invalid option, try again.\n"));
        assert_eq!(status_lines(&text).len(), 2);
    }

    #[tokio::test]
    async fn end_of_input_leaves_the_view() {
        let source = FakeSource::with_tickets(2);
        let formatter = TableFormatter::default();
        let mut input = "".as_bytes();
        let mut output = Vec::new();

        browse_tickets(&source, &formatter, &mut input, &mut output)
            .await
            .expect("browse should succeed");

        assert_eq!(status_lines(&output_text(output)).len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_is_returned_to_caller() {
        let source = FakeSource::failing(SourceError::Request("boom".to_string()));
        let formatter = TableFormatter::default();
        let mut input = "exit\n".as_bytes();
        let mut output = Vec::new();

        let err = browse_tickets(&source, &formatter, &mut input, &mut output)
            .await
            .expect_err("fetch failure should propagate");

        assert_eq!(
            err.downcast_ref::<SourceError>(),
            Some(&SourceError::Request("boom".to_string()))
        );
        assert!(status_lines(&output_text(output)).is_empty());
    }
}
