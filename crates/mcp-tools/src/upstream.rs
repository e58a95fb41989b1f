//! HTTP client for the upstream conference database
//!
//! The search query coming from the agent is an opaque URL-encoded string.
//! It is decoded into key/value pairs and forwarded as query parameters on a
//! single GET; the JSON envelope that comes back is shaped into plain text.

use confhub_common::protocol::ToolCallResult;
use confhub_common::ConferenceApiConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::UpstreamError;

/// Returned when the API answers with an empty payload
pub const NO_RESULTS: &str = "No conferences found matching the criteria.";

/// Response envelope of the conference API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub payload: Option<Value>,

    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
}

/// Normalized outcome of one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutput {
    /// Serialized payload
    Found(String),
    NoResults,
    /// Human-readable failure description
    Failed(String),
}

impl SearchOutput {
    pub fn text(&self) -> &str {
        match self {
            SearchOutput::Found(text) | SearchOutput::Failed(text) => text,
            SearchOutput::NoResults => NO_RESULTS,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SearchOutput::Failed(_))
    }

    /// Shape an API envelope.
    ///
    /// A non-empty payload is serialized, an empty one yields [`NO_RESULTS`],
    /// a `null` or missing payload is an API error.
    pub fn from_envelope(envelope: ApiEnvelope) -> Self {
        match envelope.payload {
            Some(Value::Null) | None => SearchOutput::Failed(format!(
                "Error from API: {}",
                envelope
                    .error_message
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .unwrap_or("Unknown error")
            )),
            Some(payload) if is_empty_payload(&payload) => SearchOutput::NoResults,
            Some(payload) => match serde_json::to_string(&payload) {
                Ok(text) => SearchOutput::Found(text),
                Err(e) => SearchOutput::Failed(format!("Error: Unexpected response from conference API: {}", e)),
            },
        }
    }
}

impl From<SearchOutput> for ToolCallResult {
    fn from(output: SearchOutput) -> Self {
        if output.is_error() {
            ToolCallResult::error_text(output.text())
        } else {
            ToolCallResult::text(output.text())
        }
    }
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Null => true,
    }
}

/// Decode an `application/x-www-form-urlencoded` search query.
///
/// Every pair is forwarded as written, blank values included; repeated keys
/// are kept in order (`topics=AI&topics=ML` sends both).
pub fn decode_search_query(search_query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(search_query.trim().as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Conference API client with connection pooling
#[derive(Debug, Clone)]
pub struct ConferenceApiClient {
    base_url: String,
    client: Client,
}

impl ConferenceApiClient {
    #[instrument(skip_all, fields(base_url = %config.base_url))]
    pub fn new(config: &ConferenceApiConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        info!(
            "Initialized conference API client: base_url={}, timeout={}s",
            config.base_url, config.timeout_secs
        );

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    /// GET the API with the given parameters and decode the envelope
    #[instrument(skip(self), fields(base_url = %self.base_url, param_count = params.len()))]
    pub async fn fetch(&self, params: &[(String, String)]) -> Result<ApiEnvelope, UpstreamError> {
        debug!(?params, "Sending conference API request");

        let response = self.client.get(&self.base_url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UpstreamError::Status { status, body });
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<ApiEnvelope>(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Run one search; never fails, errors come back as [`SearchOutput::Failed`]
    #[instrument(skip(self))]
    pub async fn search(&self, search_query: &str) -> SearchOutput {
        let params = decode_search_query(search_query);

        let output = match self.fetch(&params).await {
            Ok(envelope) => SearchOutput::from_envelope(envelope),
            Err(UpstreamError::Decode(reason)) => {
                SearchOutput::Failed(format!("Error: Unexpected response from conference API: {}", reason))
            }
            Err(e) => SearchOutput::Failed(format!(
                "Error: Network error while fetching conferences: {}",
                e
            )),
        };

        if output.is_error() {
            warn!(output = %output.text(), "Conference search failed");
        } else {
            info!(no_results = (output == SearchOutput::NoResults), "Conference search completed");
        }
        output
    }
}
