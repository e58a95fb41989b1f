use thiserror::Error;

/// Failure talking to the upstream conference API
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("conference API returned status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("could not decode conference API response: {0}")]
    Decode(String),
}

/// Why a `tools/call` could not be dispatched
#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}
