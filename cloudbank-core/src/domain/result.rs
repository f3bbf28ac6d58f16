//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Network operations report exactly one of `Transport`, `Rejected` or
/// `Decode` on failure; `Precondition` is raised before any request is sent.
#[derive(Error, Debug)]
pub enum Error {
    /// No response was obtained (connect, DNS, TLS, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The bank answered, but not with the success tag for this endpoint
    #[error("Bank rejected the request ({status}): {message}")]
    Rejected { status: String, message: String },

    /// Local misuse detected before any network call
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Serial number {0} is outside every denomination range")]
    SerialOutOfRange(i64),

    /// The bank answered with a body that does not decode for the endpoint
    #[error("Malformed bank response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a remote rejection
    pub fn rejected(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// "We couldn't reach the bank"
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// "The bank said no"
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
