use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::format::ColumnSpec;
use crate::zendesk_client::ClientOptions;

/// Top-level application configuration, persisted as TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub zendesk: ZendeskConfig,
    #[serde(default)]
    pub columns: ColumnSpec,
}

/// Login defaults and API settings. Anything left unset is prompted for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZendeskConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The secret is an API token rather than the account password.
    #[serde(default)]
    pub api_token: bool,
    /// Overrides `https://{subdomain}.zendesk.com/api/v2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl ZendeskConfig {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_url: self.api_url.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl AppConfig {
    /// Command-line values win over the config file.
    pub fn apply_cli(&mut self, email: Option<String>, subdomain: Option<String>, api_token: bool) {
        if email.is_some() {
            self.zendesk.email = email;
        }
        if subdomain.is_some() {
            self.zendesk.subdomain = subdomain;
        }
        if api_token {
            self.zendesk.api_token = true;
        }
    }
}

/// Returns the zendesk-viewer config directory path (`~/.config/zendesk-viewer/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home).join(".config").join("zendesk-viewer"))
}

/// Returns the config file path (`~/.config/zendesk-viewer/config.toml`).
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the config from the default location. Returns `Ok(None)` if the file does not exist.
pub fn load_config() -> Result<Option<AppConfig>> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Option<AppConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    config
        .columns
        .validate()
        .with_context(|| format!("Invalid [columns] in {}", path.display()))?;
    Ok(Some(config))
}
