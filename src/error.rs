use crate::token::TokenStoreError;
use crate::wire::FormatError;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// HTTP status the API uses for missing or stale bearer tokens
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Error returned by the API for any non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status code: {status}, message: {message}")]
pub struct ApiError {
    /// Status reported in the error body, or the HTTP status when absent
    pub status: u16,
    /// `statusMessage` from the error body, or the raw body text
    pub message: String,
}

/// Structured error body as sent by the API
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: u16,
    #[serde(default, rename = "statusMessage")]
    status_message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    /// Build an error from a failed HTTP exchange.
    ///
    /// The status and message embedded in a JSON body take precedence over
    /// the HTTP status line. Bodies that are not JSON, or JSON without those
    /// fields, fall back to the HTTP status and the verbatim body text.
    pub fn from_response(http_status: u16, body: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(body).into_owned();
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

        let status = if parsed.status == 0 {
            http_status
        } else {
            parsed.status
        };
        let message = if parsed.status_message.is_empty() {
            raw
        } else {
            parsed.status_message
        };

        ApiError { status, message }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == STATUS_UNAUTHORIZED
    }
}

/// Classifies a network-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Could not establish a connection
    Connect,
    /// The call's deadline elapsed
    Timeout,
    /// The caller cancelled the call
    Cancelled,
    /// Any other I/O or protocol failure
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Cancelled => "cancelled",
            TransportErrorKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// Main error type for Oblio API operations
#[derive(Debug, Error)]
pub enum OblioError {
    /// Malformed credentials or request payload, detected before any network call
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A wire value could not be parsed into its domain type
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Network-level failure (connection, timeout, cancellation)
    #[error("transport error ({kind})")]
    Transport {
        kind: TransportErrorKind,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Non-2xx response from the API
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A 2xx response body did not match the expected shape
    #[error("decode: {0}")]
    Decode(#[source] serde_json::Error),

    /// The token store rejected a read or write
    #[error("token store: {0}")]
    TokenStore(#[from] TokenStoreError),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Request building error
    #[error("failed to build request: {0}")]
    RequestBuild(String),
}

impl OblioError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        OblioError::InvalidArgument(msg.into())
    }

    pub fn cancelled() -> Self {
        OblioError::Transport {
            kind: TransportErrorKind::Cancelled,
            source: None,
        }
    }

    pub fn timeout() -> Self {
        OblioError::Transport {
            kind: TransportErrorKind::Timeout,
            source: None,
        }
    }

    /// Check if this error is an API error with status 401
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, OblioError::Api(e) if e.is_unauthorized())
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, OblioError::Api(ApiError { status: 404, .. }))
    }

    /// Get the status code if this is an API error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OblioError::Api(e) => Some(e.status),
            _ => None,
        }
    }

    /// Get the transport failure kind, if any
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            OblioError::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OblioError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };

        OblioError::Transport {
            kind,
            source: Some(err),
        }
    }
}

/// Result type for Oblio operations
pub type Result<T> = std::result::Result<T, OblioError>;
