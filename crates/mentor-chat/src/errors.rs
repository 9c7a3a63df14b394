/// Errors raised while opening or reading a chat response before they are
/// classified into a [`StreamOutcome`](crate::StreamOutcome).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Endpoint answered with a non-success status.
    #[error("chat endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// Request could not be sent or the response head never arrived.
    #[error("chat request failed: {0}")]
    Request(String),
    /// Response body read failed mid-stream.
    #[error("chat stream read failed: {0}")]
    Read(String),
}

impl TransportError {
    /// Creates a status error from a rejected response.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Returns the HTTP status for `Status` errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(_) | Self::Read(_) => None,
        }
    }
}

/// Top-level error type for the public chat API.
///
/// Per-attempt failures (rate limits, dropped streams) are not errors at this
/// level; they arrive as a terminal [`StreamOutcome`](crate::StreamOutcome).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid user input.
    #[error("validation error: {0}")]
    Validation(String),
    /// A run is already in flight for this conversation.
    #[error("a reply is already in progress")]
    Busy,
    /// Internal protocol misuse or invariant violation.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ChatError {
    pub(crate) fn protocol_msg(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}
