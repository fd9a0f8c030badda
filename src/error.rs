/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum AnnounceError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success response that is not a "model loading" condition.
    /// Never retried.
    #[error("API Error: {body}")]
    Api { status: u16, body: String },
    /// Every attempt ended in a retryable failure.
    #[error("failed to fetch after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts consumed, equal to the policy's limit.
        attempts: u32,
        /// Failure of the final attempt.
        #[source]
        source: AttemptError,
    },
    /// The caller cancelled the operation while it was in flight or waiting.
    #[error("request cancelled")]
    Cancelled,
    /// A request could not be constructed from the given parts.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Request body serialization error.
    #[error("encode error: {0}")]
    Encode(String),
    /// Response decoding or shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// The upstream answered successfully but produced no text.
    #[error("no response text generated")]
    EmptyGeneration,
    /// A generation outlived the server's per-request deadline.
    #[error("generation deadline of {seconds}s exceeded")]
    DeadlineExceeded { seconds: u64 },
    /// Listener bind or accept failure.
    #[error("server error: {0}")]
    Server(std::io::Error),
    /// Missing or malformed configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Failure of a single attempt that spends one slot of the retry budget.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// Connect error, reset, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success response whose body is not JSON, e.g. a gateway error page.
    #[error("unreadable error body (status {status}): {body}")]
    UnreadableBody { status: u16, body: String },
}

impl AttemptError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptError::Transport(err) if err.is_timeout())
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, AttemptError::Transport(err) if err.is_connect())
    }
}
