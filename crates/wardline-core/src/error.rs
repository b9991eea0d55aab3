// ── Core error types and error signals ──
//
// `ErrorSignal` is what registered error handlers consume: a closed
// classification set synthesized by the connection manager whenever it
// detects a failure class, never persisted, never thrown. `CoreError`
// is for fallible operations the CLI awaits directly.

use thiserror::Error;

use wardline_api::PushError;

// ── ErrorSignal ──────────────────────────────────────────────────────

/// Closed set of failure classes the connection manager reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No bearer token in the store; no network attempt was made.
    NoToken,
    /// The hub rejected the token. Terminal for automatic retry.
    Unauthorized,
    /// Transport-level failure (DNS, refused, reset, timeout).
    NetworkError,
    /// Cross-origin rejection surfaced by a proxy.
    CorsError,
    /// The retry budget is exhausted; manual `reconnect()` required.
    MaxRetries,
    /// Anything that did not classify.
    Other,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoToken => "NO_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NetworkError => "NETWORK_ERROR",
            Self::CorsError => "CORS_ERROR",
            Self::MaxRetries => "MAX_RETRIES",
            Self::Other => "ERROR",
        };
        f.write_str(s)
    }
}

/// A classified failure, fanned out to registered error handlers and
/// then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSignal {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorSignal {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<&PushError> for ErrorSignal {
    fn from(err: &PushError) -> Self {
        let code = match err {
            PushError::Unauthorized { .. } => ErrorCode::Unauthorized,
            PushError::Network(_) => ErrorCode::NetworkError,
            PushError::Cors(_) => ErrorCode::CorsError,
            PushError::Handshake { .. } | PushError::Closed { .. } | PushError::Protocol(_) => {
                ErrorCode::Other
            }
        };
        Self::new(code, err.to_string())
    }
}

impl std::fmt::Display for ErrorSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

// ── CoreError ────────────────────────────────────────────────────────

/// Unified error type for fallible core operations.
///
/// Consumers never see raw HTTP status codes or JSON parse failures;
/// the `From<wardline_api::Error>` impl translates transport-layer
/// errors into domain-appropriate variants.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("No bearer token configured")]
    NoToken,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach the roster backend: {reason}")]
    ConnectionFailed { reason: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<wardline_api::Error> for CoreError {
    fn from(err: wardline_api::Error) -> Self {
        match err {
            wardline_api::Error::NoToken => Self::NoToken,
            wardline_api::Error::Unauthorized { message } => {
                Self::AuthenticationFailed { message }
            }
            wardline_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    Self::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    Self::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            wardline_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            wardline_api::Error::Tls(msg) => Self::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            wardline_api::Error::Api {
                message_en, status, ..
            } => Self::Api {
                message: message_en,
                status,
            },
            wardline_api::Error::Deserialization { message, .. } => {
                Self::Internal(format!("Deserialization error: {message}"))
            }
            wardline_api::Error::Push(e) => match e {
                PushError::Unauthorized { status } => Self::AuthenticationFailed {
                    message: format!("push hub rejected credentials (status {status})"),
                },
                other => Self::ConnectionFailed {
                    reason: other.to_string(),
                },
            },
        }
    }
}
