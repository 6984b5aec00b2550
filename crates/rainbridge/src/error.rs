//! Error types for the import library.

use thiserror::Error;

/// Exit code for configuration errors (bad YAML, missing tokens, etc.).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for network-level failures.
pub const EXIT_TRANSPORT_ERROR: u8 = 3;
/// Exit code when a remote kept answering 429 past the retry cap.
pub const EXIT_RATE_LIMITED: u8 = 4;
/// Exit code for a non-success HTTP status.
pub const EXIT_STATUS_ERROR: u8 = 5;
/// Exit code for a malformed response body.
pub const EXIT_DECODE_ERROR: u8 = 6;
/// Exit code for file operations.
pub const EXIT_IO_ERROR: u8 = 7;
/// Exit code when pagination hit the configured page cap.
pub const EXIT_PAGE_LIMIT: u8 = 8;

/// Main error type for import operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration error (invalid YAML, missing tokens, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response (DNS, refused, timeout).
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The remote answered 429 on every attempt.
    #[error("rate limited after {retries} retries: {status}")]
    RateLimitExhausted { retries: u32, status: String },

    /// The remote answered with a status the operation does not accept.
    #[error("failed to {operation}: {status}")]
    UnexpectedStatus { operation: String, status: String },

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// Pagination did not reach an empty page within the configured cap.
    #[error("pagination exceeded {pages} pages without reaching an empty page")]
    PageLimitExceeded { pages: usize },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error (request bodies, reports)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// Wrap any transport-level failure.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        BridgeError::Transport(err.into())
    }

    /// Create an UnexpectedStatus error from an operation name and status line.
    pub fn status(operation: impl Into<String>, status: impl Into<String>) -> Self {
        BridgeError::UnexpectedStatus {
            operation: operation.into(),
            status: status.into(),
        }
    }

    /// Create a Decode error for the given operation.
    pub fn decode(operation: impl Into<String>, source: serde_json::Error) -> Self {
        BridgeError::Decode {
            operation: operation.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            BridgeError::Config(_) | BridgeError::Yaml(_) => EXIT_CONFIG_ERROR,
            BridgeError::Transport(_) => EXIT_TRANSPORT_ERROR,
            BridgeError::RateLimitExhausted { .. } => EXIT_RATE_LIMITED,
            BridgeError::UnexpectedStatus { .. } => EXIT_STATUS_ERROR,
            BridgeError::Decode { .. } | BridgeError::Json(_) => EXIT_DECODE_ERROR,
            BridgeError::Io(_) => EXIT_IO_ERROR,
            BridgeError::PageLimitExceeded { .. } => EXIT_PAGE_LIMIT,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::transport(err)
    }
}

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
