use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::config::ZendeskConfig;
use crate::zendesk_client::Credentials;

/// Read one line, without its line terminator. `None` once input is exhausted.
///
/// Bytes that are not valid UTF-8 become U+FFFD, so a stray byte is just an
/// unrecognized command rather than a read error.
pub fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let read = input
        .read_until(b'\n', &mut buf)
        .context("Failed to read from terminal")?;
    if read == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;
    read_line(input)?
        .map(|line| line.trim().to_string())
        .with_context(|| format!("Input closed before `{}` was answered", label.trim()))
}

/// How the password or API token is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretInput {
    /// Keystrokes are read in raw mode and never echoed.
    Terminal,
    /// Plain line from the input stream (piped stdin, tests).
    Line,
}

impl SecretInput {
    pub fn detect() -> Self {
        if io::stdin().is_terminal() {
            SecretInput::Terminal
        } else {
            SecretInput::Line
        }
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode().context("Failed to switch terminal to raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn read_secret_from_terminal<W: Write>(output: &mut W, label: &str) -> Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;

    let secret = {
        let _raw = RawModeGuard::enable()?;
        let mut secret = String::new();
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Char('c') | KeyCode::Char('d')
                    if key.modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    anyhow::bail!("Login cancelled");
                }
                KeyCode::Char(c) => secret.push(c),
                KeyCode::Backspace => {
                    secret.pop();
                }
                _ => {}
            }
        }
        secret
    };

    writeln!(output)?;
    Ok(secret)
}

fn prompt_secret<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    mode: SecretInput,
) -> Result<String> {
    match mode {
        SecretInput::Terminal => read_secret_from_terminal(output, label),
        SecretInput::Line => {
            write!(output, "{}", label)?;
            output.flush()?;
            let secret = read_line(input)?.context("Input closed before the password was entered")?;
            writeln!(output)?;
            Ok(secret)
        }
    }
}

/// Ask for whatever the config and CLI flags did not already supply.
///
/// Prompts run in the order email, secret, subdomain.
pub fn gather_credentials<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    zendesk: &ZendeskConfig,
    secret_mode: SecretInput,
) -> Result<Credentials> {
    let email = match zendesk.email.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(email) => email.trim().to_string(),
        None => prompt_line(input, output, "Email: ")?,
    };

    let label = if zendesk.api_token { "API token: " } else { "Password: " };
    let secret = prompt_secret(input, output, label, secret_mode)?;

    let subdomain = match zendesk.subdomain.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(subdomain) => subdomain.trim().to_string(),
        None => prompt_line(input, output, "Subdomain: ")?,
    };

    Ok(Credentials {
        email,
        secret,
        subdomain,
        api_token: zendesk.api_token,
    })
}
