// Bearer-token resolution.
//
// The push manager and the REST client both resolve the token through
// this trait on every attempt/request. Nothing caches the token: a
// refresh written to the underlying store (env var, keyring, config)
// between attempts is honored without recreating any client.

use secrecy::SecretString;

/// Source of the bearer token for the roster backend.
///
/// Implementations must tolerate being called on every connection
/// attempt; `None` means no token is currently available and the caller
/// must not make a network attempt.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<SecretString>;
}

/// A fixed token, resolved once at construction.
///
/// Used when the token comes from a config profile or a CLI flag.
pub struct StaticToken(Option<SecretString>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(SecretString::from(token.into())))
    }

    /// A provider that never yields a token.
    pub fn absent() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<SecretString> {
        self.0.clone()
    }
}

/// Reads the token from an environment variable on every call.
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvToken {
    fn bearer_token(&self) -> Option<SecretString> {
        match std::env::var(&self.var) {
            Ok(v) if !v.is_empty() => Some(SecretString::from(v)),
            _ => None,
        }
    }
}
