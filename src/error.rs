use std::sync::Arc;

/// Represents a result type for operations in the Hyphen SDK.
///
/// This `Result` type is a standard Rust `Result` type where the error variant is defined by the
/// hyphen-specific [`Error`] enum.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type of a [`HttpTransport`](crate::HttpTransport) implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Enum representing possible errors that can occur in the Hyphen SDK.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// The request could not be sent or no response was received (connection refused, DNS
    /// failure, timeout, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        /// URL of the failed request.
        url: String,
        /// Underlying transport error.
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The server answered with a status code the operation does not expect.
    #[error("HTTP {status}: {status_text}")]
    UnexpectedStatus {
        /// Numeric status code.
        status: u16,
        /// Status line, e.g. `500 Internal Server Error`.
        status_text: String,
    },

    /// The response body does not have the expected shape.
    #[error("failed to parse response body")]
    MalformedResponse(#[source] Arc<serde_json::Error>),

    /// The request body could not be serialized.
    #[error("failed to serialize request body")]
    Serialization(#[source] Arc<serde_json::Error>),

    /// Every configured Horizon URL failed. Wraps the error of the last attempt.
    #[error("all horizon URLs failed, last error: {0}")]
    AllEndpointsFailed(#[source] Box<Error>),

    /// Invalid input or configuration. Never retried.
    #[error("{0}")]
    Validation(String),

    /// A configured base URL could not be parsed.
    #[error("invalid URL {url:?}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parse error.
        #[source]
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] Arc<reqwest::Error>),

    /// A `.env` file exists but could not be loaded.
    #[error("failed to load {}", path.display())]
    EnvFile {
        /// The offending file.
        path: std::path::PathBuf,
        /// Read or parse error.
        #[source]
        source: Arc<dotenvy::Error>,
    },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub(crate) fn transport(url: impl Into<String>, source: TransportError) -> Self {
        Error::Transport {
            url: url.into(),
            source: Arc::from(source),
        }
    }

    /// Returns `true` if the error was produced by a single failed request and trying another
    /// endpoint may succeed.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::UnexpectedStatus { .. } | Error::MalformedResponse(_)
        )
    }
}
