use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::ticket::{TicketRecord, TicketStatus};

const ZENDESK_HOST_SUFFIX: &str = ".zendesk.com";
const USER_AGENT: &str = concat!("zendesk-viewer/", env!("CARGO_PKG_VERSION"));
const LIST_PAGE_SIZE: u32 = 100;
const UNKNOWN_USER: &str = "Unknown";

/// Failures a ticket source can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The credentials were rejected or the service could not be reached at login.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// No ticket exists with the requested id.
    #[error("ticket {0} not found")]
    NotFound(u64),
    /// Transport, HTTP or decoding failure after login.
    #[error("{0}")]
    Request(String),
}

/// Anything that can hand out ticket records: the Zendesk API in production,
/// an in-memory list in tests.
#[allow(async_fn_in_trait)]
pub trait TicketSource {
    /// Every ticket visible to the agent, in API order.
    async fn fetch_all(&self) -> Result<Vec<TicketRecord>, SourceError>;

    async fn fetch_by_id(&self, id: u64) -> Result<TicketRecord, SourceError>;
}

/// Login details gathered from the prompt, CLI and config.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub secret: String,
    pub subdomain: String,
    /// `secret` is an API token rather than the account password.
    pub api_token: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .field("subdomain", &self.subdomain)
            .field("api_token", &self.api_token)
            .finish()
    }
}

impl Credentials {
    fn username(&self) -> String {
        if self.api_token {
            format!("{}/token", self.email)
        } else {
            self.email.clone()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Replaces `https://{subdomain}.zendesk.com/api/v2` when set.
    pub api_url: Option<String>,
    /// Per-request timeout. Requests wait indefinitely when unset.
    pub request_timeout: Option<Duration>,
}

/// Accepts `acme`, `acme.zendesk.com` or `https://acme.zendesk.com/`.
pub fn normalize_subdomain(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let trimmed = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let subdomain = trimmed
        .strip_suffix(ZENDESK_HOST_SUFFIX)
        .unwrap_or(trimmed)
        .to_lowercase();

    if subdomain.is_empty() {
        return Err("subdomain is empty".to_string());
    }
    if !subdomain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(format!("`{}` is not a valid Zendesk subdomain", raw.trim()));
    }
    Ok(subdomain)
}

fn base_url_for(subdomain: &str) -> Result<String, String> {
    let subdomain = normalize_subdomain(subdomain)?;
    Ok(format!("https://{}{}/api/v2", subdomain, ZENDESK_HOST_SUFFIX))
}

/// Authenticated handle on one Zendesk workspace.
pub struct ZendeskClient {
    http: Client,
    base_url: String,
    username: String,
    secret: String,
}

impl ZendeskClient {
    /// Build the client and check the credentials against `/users/me`.
    pub async fn connect(
        credentials: &Credentials,
        options: &ClientOptions,
    ) -> Result<Self, SourceError> {
        let base_url = match options.api_url.as_deref() {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => base_url_for(&credentials.subdomain).map_err(SourceError::Authentication)?,
        };

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            SourceError::Authentication(format!("failed to build HTTP client: {}", e))
        })?;

        let client = Self {
            http,
            base_url,
            username: credentials.username(),
            secret: credentials.secret.clone(),
        };

        let (status, body) = client
            .send(&client.endpoint("users/me.json"))
            .await
            .map_err(|e| SourceError::Authentication(e.to_string()))?;
        expect_success(status, body)
            .and_then(|body| parse_current_user(&body))
            .map_err(|e| match e {
                SourceError::Authentication(reason) => SourceError::Authentication(reason),
                other => SourceError::Authentication(other.to_string()),
            })?;

        Ok(client)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, url: &str) -> Result<(StatusCode, String), SourceError> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.secret))
            .send()
            .await
            .map_err(|e| SourceError::Request(format!("Zendesk API request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            SourceError::Request(format!("Zendesk API response read failed: {}", e))
        })?;
        Ok((status, body))
    }
}

fn expect_success(status: StatusCode, body: String) -> Result<String, SourceError> {
    if status.is_success() {
        return Ok(body);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SourceError::Authentication(
            format!("Zendesk rejected the credentials ({})", status),
        )),
        _ => Err(SourceError::Request(format!(
            "Zendesk API request failed with status {}: {}",
            status,
            body.trim()
        ))),
    }
}

impl TicketSource for ZendeskClient {
    async fn fetch_all(&self) -> Result<Vec<TicketRecord>, SourceError> {
        let mut tickets = Vec::new();
        let mut next = Some(self.endpoint(&format!(
            "tickets.json?include=users&per_page={}",
            LIST_PAGE_SIZE
        )));

        while let Some(url) = next {
            let (status, body) = self.send(&url).await?;
            let page = parse_ticket_page(&expect_success(status, body)?)?;
            tickets.extend(page.tickets);
            next = page.next_page;
        }

        Ok(tickets)
    }

    async fn fetch_by_id(&self, id: u64) -> Result<TicketRecord, SourceError> {
        let (status, body) = self
            .send(&self.endpoint(&format!("tickets/{}.json?include=users", id)))
            .await?;
        ticket_response(id, status, body)
    }
}

/// Decode the answer to `/tickets/{id}.json`. A 404 means the id does not exist.
fn ticket_response(
    id: u64,
    status: StatusCode,
    body: String,
) -> Result<TicketRecord, SourceError> {
    if status == StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(id));
    }
    parse_ticket(&expect_success(status, body)?)
}

#[derive(Debug, Deserialize)]
struct TicketPayload {
    id: u64,
    subject: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    status: Option<String>,
    requester_id: Option<u64>,
    submitter_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: u64,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TicketPagePayload {
    tickets: Vec<TicketPayload>,
    #[serde(default)]
    users: Vec<UserPayload>,
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SingleTicketPayload {
    ticket: TicketPayload,
    #[serde(default)]
    users: Vec<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct CurrentUserPayload {
    user: CurrentUser,
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: Option<u64>,
    name: Option<String>,
}

/// One page of `/tickets.json`.
#[derive(Debug)]
pub(crate) struct TicketPage {
    pub tickets: Vec<TicketRecord>,
    pub next_page: Option<String>,
}

fn user_names(users: Vec<UserPayload>) -> HashMap<u64, String> {
    users
        .into_iter()
        .filter_map(|u| u.name.map(|name| (u.id, name)))
        .collect()
}

fn name_for(names: &HashMap<u64, String>, id: Option<u64>) -> String {
    id.and_then(|id| names.get(&id))
        .cloned()
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

impl TicketPayload {
    fn into_record(self, names: &HashMap<u64, String>) -> TicketRecord {
        TicketRecord {
            id: self.id,
            subject: self.subject.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            created: self.created_at,
            status: TicketStatus::from_api(self.status.as_deref().unwrap_or("new")),
            requester: name_for(names, self.requester_id),
            submitter: name_for(names, self.submitter_id),
        }
    }
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| {
        SourceError::Request(format!("Zendesk API response was malformed JSON: {}", e))
    })
}

pub(crate) fn parse_ticket_page(body: &str) -> Result<TicketPage, SourceError> {
    let payload: TicketPagePayload = decode(body)?;
    let names = user_names(payload.users);
    Ok(TicketPage {
        tickets: payload
            .tickets
            .into_iter()
            .map(|t| t.into_record(&names))
            .collect(),
        next_page: payload.next_page.filter(|url| !url.is_empty()),
    })
}

pub(crate) fn parse_ticket(body: &str) -> Result<TicketRecord, SourceError> {
    let payload: SingleTicketPayload = decode(body)?;
    let names = user_names(payload.users);
    Ok(payload.ticket.into_record(&names))
}

/// Zendesk answers `/users/me` with an anonymous user (null id) when the
/// request carried no usable credentials.
fn parse_current_user(body: &str) -> Result<String, SourceError> {
    let payload: CurrentUserPayload = decode(body)?;
    match payload.user.id {
        Some(_) => Ok(payload.user.name.unwrap_or_default()),
        None => Err(SourceError::Authentication(
            "Zendesk did not recognise these credentials".to_string(),
        )),
    }
}
