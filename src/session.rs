use std::io::{BufRead, Write};

use anyhow::Result;

use crate::format::TableFormatter;
use crate::prompt::read_line;
use crate::views::ticket_detail::show_ticket;
use crate::views::ticket_list::browse_tickets;
use crate::zendesk_client::{SourceError, TicketSource};

const MENU: &str = "Choose one of the following options:\n\
                    tickets: to list all tickets\n\
                    <ticket_number>: to show details for a single ticket\n\
                    exit: to quit";

pub const INVALID_OPTION_MESSAGE: &str = "Invalid Option";
pub const FAREWELL_MESSAGE: &str = "Goodbye!";

/// A line typed at the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    ListTickets,
    ShowTicket(u64),
    Exit,
    Invalid,
}

impl SessionCommand {
    pub fn parse(input: &str) -> Self {
        match input {
            "tickets" => SessionCommand::ListTickets,
            "exit" => SessionCommand::Exit,
            other => other
                .parse::<u64>()
                .map(SessionCommand::ShowTicket)
                .unwrap_or(SessionCommand::Invalid),
        }
    }
}

/// Main menu loop of an authenticated session.
pub struct Session<'a, S, R, W> {
    source: &'a S,
    formatter: &'a TableFormatter,
    input: R,
    output: W,
}

impl<'a, S, R, W> Session<'a, S, R, W>
where
    S: TicketSource,
    R: BufRead,
    W: Write,
{
    pub fn new(source: &'a S, formatter: &'a TableFormatter, input: R, output: W) -> Self {
        Self {
            source,
            formatter,
            input,
            output,
        }
    }

    /// Serve menu commands until the user exits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;
            self.output.flush()?;

            let Some(line) = read_line(&mut self.input)? else {
                return Ok(());
            };

            match SessionCommand::parse(&line) {
                SessionCommand::ListTickets => self.list_tickets().await?,
                SessionCommand::ShowTicket(id) => {
                    show_ticket(self.source, id, &mut self.output).await?;
                }
                SessionCommand::Exit => {
                    writeln!(self.output, "{}", FAREWELL_MESSAGE)?;
                    self.output.flush()?;
                    return Ok(());
                }
                SessionCommand::Invalid => writeln!(self.output, "{}", INVALID_OPTION_MESSAGE)?,
            }
        }
    }

    async fn list_tickets(&mut self) -> Result<()> {
        let result = browse_tickets(
            self.source,
            self.formatter,
            &mut self.input,
            &mut self.output,
        )
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) => match e.downcast_ref::<SourceError>() {
                Some(source_error) => {
                    writeln!(self.output, "Unable to fetch tickets: {}", source_error)?;
                    Ok(())
                }
                None => Err(e),
            },
        }
    }
}
