//! CLI error types with miette diagnostics.
//!
//! Maps api/core errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes for process termination.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the roster service at {url}")]
    #[diagnostic(
        code(wardline::connection_failed),
        help(
            "Check that the roster service is running and accessible.\n\
             URL: {url}\n\
             Try: wardline unread --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Push connection could not be established")]
    #[diagnostic(
        code(wardline::push_failed),
        help("Check the hub URL and your network; see the error signals above for the cause.")
    )]
    PushFailed,

    // ── Authentication ───────────────────────────────────────────────

    #[error("The roster service rejected your credentials")]
    #[diagnostic(
        code(wardline::auth_failed),
        help(
            "Your bearer token is missing, expired, or revoked.\n\
             Refresh it with: wardline config init\n\
             Or set the WARDLINE_TOKEN environment variable."
        )
    )]
    AuthFailed,

    #[error("No bearer token configured for profile '{profile}'")]
    #[diagnostic(
        code(wardline::no_credentials),
        help(
            "Configure a token with: wardline config init\n\
             Or set the WARDLINE_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Roster API error: {message}")]
    #[diagnostic(code(wardline::api_error))]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wardline::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wardline::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wardline config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No roster service configured")]
    #[diagnostic(
        code(wardline::no_config),
        help(
            "Create a profile with: wardline config init\n\
             Or pass --api-url / set WARDLINE_API_URL.\n\
             Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(wardline::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wardline::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(wardline::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::PushFailed => exit_code::CONNECTION,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── wardline_api::Error → CliError mapping ───────────────────────────

impl From<wardline_api::Error> for CliError {
    fn from(err: wardline_api::Error) -> Self {
        match err {
            wardline_api::Error::NoToken => Self::NoCredentials {
                profile: "current".into(),
            },

            wardline_api::Error::Unauthorized { .. } => Self::AuthFailed,

            wardline_api::Error::Api {
                message_en,
                message_ar,
                status,
            } => Self::Api {
                message: if message_en.is_empty() {
                    message_ar
                } else {
                    message_en
                },
                status,
            },

            wardline_api::Error::Transport(e) => {
                let url = e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string);
                Self::ConnectionFailed {
                    url,
                    source: e.into(),
                }
            }

            other => Self::Api {
                message: other.to_string(),
                status: None,
            },
        }
    }
}
