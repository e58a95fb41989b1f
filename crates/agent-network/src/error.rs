use confhub_common::protocol::{JsonRpcError, RequestId};
use confhub_common::ConfhubError;
use std::time::Duration;
use thiserror::Error;

/// Failure of one exchange with the tool service
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("session closed")]
    Closed,

    #[error("Duplicate request id: {0}")]
    DuplicateRequestId(RequestId),

    #[error("Tool service returned an error: {0}")]
    Rpc(JsonRpcError),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{operation} timed out after {}s", .after.as_secs_f32())]
    Timeout { operation: String, after: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}

/// Failure handing work from a blocking thread to the runtime
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("task ended without a result: {0}")]
    Cancelled(String),
}

/// Core error type for a chat turn
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfhubError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Invalid output from {agent}: {reason}")]
    InvalidModelOutput { agent: String, reason: String },

    #[error("Tool service executable not found: {}", .path.display())]
    ToolServiceNotFound { path: std::path::PathBuf },

    #[error("Invalid tool service URL {url}: {reason}")]
    InvalidToolUrl { url: String, reason: String },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl AgentError {
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    pub fn invalid_output(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidModelOutput {
            agent: agent.into(),
            reason: reason.into(),
        }
    }
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
pub type AgentResult<T> = std::result::Result<T, AgentError>;
