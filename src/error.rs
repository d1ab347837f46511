//! Error types for the quest bot

use thiserror::Error;

/// Result type alias for quest bot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a task
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Profile store unreachable or failing
    #[error("profile store unavailable: {0}")]
    ProfileUnavailable(String),

    /// OCR engine reported an internal failure
    #[error("OCR failure: {0}")]
    Ocr(String),

    /// Image could not be decoded
    #[error("image error: {0}")]
    Image(String),

    /// Could not download a file from the transport
    #[error("transport fetch failure: {0}")]
    TransportFetch(String),

    /// Reasoning service failed after all retries
    #[error("reasoning service failure: {0}")]
    ReasoningService(#[from] ReasoningError),

    /// Channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A single failed call to the reasoning service
#[derive(Debug, Error)]
pub enum ReasoningError {
    /// Connection-level failure (DNS, refused, reset)
    #[error("connection error: {0}")]
    Connection(String),

    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Service answered with a non-success status
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    /// Success status but the body lacked the expected fields
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ReasoningError {
    /// Whether this failure is worth another attempt
    ///
    /// Client errors other than 429 are permanent: a bad credential or a
    /// rejected payload will not improve on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout | Self::Malformed(_) => true,
            Self::Status { status, .. } => crate::reasoning::retry::is_recoverable(*status),
        }
    }
}

impl From<reqwest::Error> for ReasoningError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Connection(e.to_string())
        }
    }
}

impl Error {
    /// Whether the failure came from the network-facing collaborators
    ///
    /// Both present the same networking apology to the user.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::TransportFetch(_) | Self::ReasoningService(_) | Self::Http(_)
        )
    }
}
