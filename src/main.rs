mod config;
mod format;
mod prompt;
mod session;
mod ticket;
mod views;
mod zendesk_client;

#[cfg(test)]
mod test_support;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::AppConfig;
use crate::format::TableFormatter;
use crate::prompt::SecretInput;
use crate::session::Session;
use crate::zendesk_client::ZendeskClient;

/// "Zendesk" in figlet's slant font.
const BANNER: &str = r"
    _____                __          __
   /__  /  ___  ____  ____/ /__  _____/ /__
     / /  / _ \/ __ \/ __  / _ \/ ___/ //_/
    / /__/  __/ / / / /_/ /  __(__  ) ,<
   /____/\___/_/ /_/\__,_/\___/____/_/|_|
";

const WELCOME_MESSAGE: &str =
    "Welcome to the Zendesk ticket viewer!\nEnter your details below to log in.";

const AUTH_FAILURE_MESSAGE: &str = "Error connecting to the Zendesk service. Please try again.\n\
                                    - Are your credentials correct?\n\
                                    - Is your internet connection working?";

#[derive(Parser, Debug)]
#[command(
    name = "zendesk-viewer",
    version,
    about = "Browse Zendesk tickets from the terminal"
)]
struct Cli {
    /// Agent email address (skips the prompt)
    #[arg(short, long)]
    email: Option<String>,

    /// Zendesk subdomain, e.g. `acme` for acme.zendesk.com (skips the prompt)
    #[arg(short, long)]
    subdomain: Option<String>,

    /// Log in with an API token instead of the account password
    #[arg(long)]
    token: bool,

    /// Config file to use instead of ~/.config/zendesk-viewer/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_app_config(cli: &Cli) -> Result<AppConfig> {
    match &cli.config {
        Some(path) => config::load_config_from(path)?
            .with_context(|| format!("Config file not found: {}", path.display())),
        None => Ok(config::load_config()?.unwrap_or_default()),
    }
}

fn write_welcome<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output, "{}", BANNER)?;
    writeln!(output, "{}", WELCOME_MESSAGE)?;
    output.flush()
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut app_config = load_app_config(&cli)?;
    app_config.apply_cli(cli.email, cli.subdomain, cli.token);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    write_welcome(&mut output)?;

    let credentials = prompt::gather_credentials(
        &mut input,
        &mut output,
        &app_config.zendesk,
        SecretInput::detect(),
    )?;

    writeln!(output, "Connecting to the Zendesk API...")?;
    output.flush()?;

    let client =
        match ZendeskClient::connect(&credentials, &app_config.zendesk.client_options()).await {
            Ok(client) => client,
            Err(e) => {
                writeln!(output, "{}", AUTH_FAILURE_MESSAGE)?;
                output.flush()?;
                eprintln!("Error: {}", e);
                return Ok(ExitCode::FAILURE);
            }
        };

    let formatter = TableFormatter::new(app_config.columns);
    Session::new(&client, &formatter, &mut input, &mut output)
        .run()
        .await?;

    Ok(ExitCode::SUCCESS)
}
