//! Wire types of the chat API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Incoming chat request from the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChatRequest {
    pub query: String,
    pub user_id: String,
    pub conversation_id: String,
}

/// One server-sent event of a chat turn.
///
/// A stream carries any number of `status` events and ends with exactly one
/// `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Status { step: String, message: String },
    Result { message: String },
    Error { message: String },
}

impl StreamEvent {
    pub fn status(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Status {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn result(message: impl Into<String>) -> Self {
        Self::Result {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// `result` and `error` close the stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Status { .. })
    }
}

/// Error body for requests rejected before streaming starts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
    pub error: String,
    pub code: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthStatus {
    pub status: String,
}
