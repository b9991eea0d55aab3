//! Configuration: TOML profiles, env overrides, token resolution.
//!
//! Profiles live in a `config.toml` under the platform config directory
//! and are merged with `WARDLINE_*` environment variables via figment.
//! Bearer tokens resolve through env var > system keyring > plaintext,
//! re-read on every use so a refreshed token is picked up without a
//! restart.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use wardline_api::{NotificationsClient, TlsMode, TokenProvider, TransportConfig};
use wardline_core::{HubConfig, Locale};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub const KEYRING_SERVICE: &str = "wardline";

// ── TOML config structs ──────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Named service profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            profiles: HashMap::new(),
        }
    }
}

/// A named roster service profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Roster API base URL (e.g., "https://roster.example.com").
    pub api_url: String,

    /// Push hub URL. Defaults to `<api_url>/hubs/notifications`.
    pub hub_url: Option<String>,

    /// Bearer token (plaintext -- prefer keyring or token_env).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// Display locale for bilingual fields ("en" or "ar").
    pub locale: Option<String>,

    /// Accept self-signed TLS certificates.
    pub insecure: Option<bool>,

    /// Request timeout override, seconds.
    pub timeout: Option<u64>,

    /// Reconnection attempt budget.
    pub max_retries: Option<u32>,

    /// Delay before the first reconnection attempt, seconds.
    pub retry_delay_secs: Option<u64>,

    /// Health watchdog interval, seconds.
    pub watchdog_secs: Option<u64>,
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "wardline", "wardline").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wardline");
    p
}

// ── Config loading / saving ──────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("WARDLINE_CONFIG_").split("_"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), CliError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg).map_err(|e| CliError::Validation {
        field: "config".into(),
        reason: format!("failed to serialize config: {e}"),
    })?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

// ── Token resolution ─────────────────────────────────────────────────

/// A [`TokenProvider`] over the CLI credential chain.
///
/// Resolution order on every call: `--token` flag > profile's env var >
/// system keyring > plaintext config value. The env and keyring steps
/// re-read their sources each time, so a token refreshed elsewhere is
/// used on the next connection attempt.
pub struct ProfileTokenProvider {
    flag: Option<SecretString>,
    token_env: Option<String>,
    profile_name: String,
    plaintext: Option<SecretString>,
}

impl ProfileTokenProvider {
    pub fn new(global: &GlobalOpts, profile: &Profile, profile_name: &str) -> Self {
        Self {
            flag: global.token.clone().map(SecretString::from),
            token_env: profile.token_env.clone(),
            profile_name: profile_name.to_string(),
            plaintext: profile.token.clone().map(SecretString::from),
        }
    }
}

impl TokenProvider for ProfileTokenProvider {
    fn bearer_token(&self) -> Option<SecretString> {
        if let Some(ref flag) = self.flag {
            return Some(flag.clone());
        }
        if let Some(ref var) = self.token_env {
            if let Ok(value) = std::env::var(var) {
                return Some(SecretString::from(value));
            }
        }
        if let Ok(entry) =
            keyring::Entry::new(KEYRING_SERVICE, &format!("{}/token", self.profile_name))
        {
            if let Ok(secret) = entry.get_password() {
                return Some(SecretString::from(secret));
            }
        }
        self.plaintext.clone()
    }
}

// ── Session assembly ─────────────────────────────────────────────────

/// Everything a service-bound command needs, resolved from profile +
/// flags.
pub struct Session {
    pub client: NotificationsClient,
    pub hub: HubConfig,
    pub tokens: std::sync::Arc<dyn TokenProvider>,
    pub locale: Locale,
}

/// Resolve profile + CLI flag overrides into a [`Session`].
///
/// Flag > env > profile for every field. With no profile at all, the
/// `--api-url` flag (or `WARDLINE_API_URL`) alone is enough.
pub fn build_session(global: &GlobalOpts) -> Result<Session, CliError> {
    let config = load_config_or_default();
    let profile_name = active_profile_name(global, &config);

    let profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.api_url.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> =
                config.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // 1. API base URL (flag > env > profile)
    let api_url_str = global.api_url.as_deref().unwrap_or(&profile.api_url);
    if api_url_str.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }
    let api_url: Url = api_url_str.parse().map_err(|_| CliError::Validation {
        field: "api-url".into(),
        reason: format!("invalid URL: {api_url_str}"),
    })?;

    // 2. Push hub URL
    let hub_url: Url = match global.hub_url.as_deref().or(profile.hub_url.as_deref()) {
        Some(explicit) => explicit.parse().map_err(|_| CliError::Validation {
            field: "hub-url".into(),
            reason: format!("invalid URL: {explicit}"),
        })?,
        None => api_url
            .join("hubs/notifications")
            .map_err(|e| CliError::Validation {
                field: "hub-url".into(),
                reason: e.to_string(),
            })?,
    };

    // 3. Credentials
    let tokens: std::sync::Arc<dyn TokenProvider> = std::sync::Arc::new(
        ProfileTokenProvider::new(global, &profile, &profile_name),
    );

    // 4. TLS + timeout
    let tls = if global.insecure || profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };
    let transport = TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(global.timeout)),
    };

    // 5. Locale (flag > profile > default En)
    let locale = match (global.locale, profile.locale.as_deref()) {
        (Some(locale), _) => locale,
        (None, Some(name)) => name.parse().map_err(|reason| CliError::Validation {
            field: "locale".into(),
            reason,
        })?,
        (None, None) => Locale::default(),
    };

    // 6. Hub config with retry / watchdog tuning
    let mut hub = HubConfig::new(hub_url);
    if let Some(max_retries) = profile.max_retries {
        hub.retry.max_retries = max_retries;
    }
    if let Some(secs) = profile.retry_delay_secs {
        hub.retry.initial_delay = Duration::from_secs(secs);
    }
    if let Some(secs) = profile.watchdog_secs {
        hub.watchdog_interval = Duration::from_secs(secs);
    }

    let client = NotificationsClient::new(api_url, std::sync::Arc::clone(&tokens), &transport)?;

    Ok(Session {
        client,
        hub,
        tokens,
        locale,
    })
}
