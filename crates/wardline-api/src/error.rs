use thiserror::Error;

use crate::push::PushError;

/// Top-level error type for the `wardline-api` crate.
///
/// Covers every failure mode across both API surfaces: the REST
/// notification endpoints and the push hub. `wardline-core` maps these
/// into user-facing diagnostics and error signals.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No bearer token available in the token store.
    #[error("No bearer token available")]
    NoToken,

    /// The backend rejected the token (expired session, revoked token).
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── REST API ────────────────────────────────────────────────────
    /// The `{success, data, messageEn, messageAr}` envelope reported
    /// failure. Both language-paired messages are retained so the
    /// consumer can pick one by locale.
    #[error("API error: {message_en}")]
    Api {
        message_en: String,
        message_ar: String,
        status: Option<u16>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Push hub ────────────────────────────────────────────────────
    /// Failure on the push connection.
    #[error(transparent)]
    Push(#[from] PushError),
}

impl Error {
    /// Returns `true` if this error means the session is dead and
    /// re-authentication is required.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::NoToken | Self::Unauthorized { .. } | Self::Push(PushError::Unauthorized { .. })
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Push(e) => e.is_transient(),
            _ => false,
        }
    }
}
