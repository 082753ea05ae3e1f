use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::query::SearchParams;

pub const DEFAULT_ENDPOINT: &str = "https://connpass.com/api/v1/event/";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid search parameters: {0}")]
    Query(#[from] crate::query::QueryError),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub results_start: u32,
    pub results_returned: u32,
    pub results_available: u32,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl SearchResult {
    /// True once this page reaches the last available result.
    pub fn is_last_page(&self) -> bool {
        self.results_start
            .saturating_add(self.results_returned)
            .saturating_sub(1)
            >= self.results_available
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub title: String,
    #[serde(rename = "event_url")]
    pub url: String,
    pub started_at: DateTime<FixedOffset>,
    pub ended_at: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub series: Series,
}

/// The group an event is published under.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything that can answer one page of an event search.
pub trait Searcher {
    fn search(&self, params: &SearchParams) -> Result<SearchResult, FetchError>;
}

pub struct ConnpassClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl ConnpassClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl Searcher for ConnpassClient {
    fn search(&self, params: &SearchParams) -> Result<SearchResult, FetchError> {
        let url = format!("{}?{}", self.endpoint, params.encode());
        debug!(action = "request", component = "connpass_client", url = %url, "Sending search request");

        let resp = self.client.get(&url).send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}
