//! Push-hub transport: payloads, failure taxonomy, and the WebSocket
//! connector.
//!
//! The roster backend exposes a single hub endpoint that emits one named
//! event, `"notification"`, as JSON text frames of the shape
//! `{"event": "notification", "payload": {...}}`. This module owns the
//! wire model and a [`PushConnector`] seam the connection manager in
//! `wardline-core` is generic over, so retry behavior can be tested
//! without a socket.

use std::future::Future;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::model::{Locale, Priority, pick_localized};

// ── NotificationPayload ──────────────────────────────────────────────

/// Payload kind discriminator.
///
/// `diagnostic_ping` is a liveness probe; `notification` carries a
/// language-paired title/message body. Anything else is passed through
/// as [`Other`](PayloadKind::Other) for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    DiagnosticPing,
    Notification,
    #[serde(other)]
    Other,
}

impl Default for PayloadKind {
    fn default() -> Self {
        Self::Other
    }
}

/// A payload received over the push connection.
///
/// Opaque to the connection manager: only dispatched handlers interpret
/// `kind` and `priority`. `#[serde(flatten)]` captures routing metadata
/// so nothing from the hub is silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(default)]
    pub kind: PayloadKind,

    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub title_ar: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub message_en: Option<String>,
    #[serde(default)]
    pub message_ar: Option<String>,

    #[serde(default)]
    pub priority: Option<Priority>,

    /// Routing metadata and anything else the hub sends.
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl NotificationPayload {
    /// Title for the given locale (requested -> untagged -> other -> "").
    pub fn title_for(&self, locale: Locale) -> &str {
        pick_localized(locale, &self.title_en, &self.title_ar, &self.title)
    }

    /// Message body for the given locale, same fallback chain.
    pub fn message_for(&self, locale: Locale) -> &str {
        pick_localized(locale, &self.message_en, &self.message_ar, &self.message)
    }
}

// ── PushError ────────────────────────────────────────────────────────

/// Structured failure taxonomy for the push connection.
///
/// The transport surfaces a structured reason (HTTP status, close code)
/// wherever the underlying library exposes one; free-text sniffing via
/// [`classify_str`](PushError::classify_str) is a fallback only.
#[derive(Debug, Clone, Error)]
pub enum PushError {
    /// The hub rejected the token (401/403 upgrade response, or a
    /// policy close frame citing authorization).
    #[error("push hub rejected credentials (status {status})")]
    Unauthorized { status: u16 },

    /// Could not reach the hub (DNS, refused, reset, timeout).
    #[error("push connection failed: {0}")]
    Network(String),

    /// Browser-style cross-origin rejection surfaced by a proxy.
    #[error("push connection blocked by CORS policy: {0}")]
    Cors(String),

    /// The upgrade handshake failed with a non-auth HTTP status.
    #[error("push handshake failed (status {status}): {message}")]
    Handshake { status: u16, message: String },

    /// The hub closed the connection abnormally.
    #[error("push connection closed (code {code}): {reason}")]
    Closed { code: u16, reason: String },

    /// A frame violated the expected wire shape.
    #[error("push protocol error: {0}")]
    Protocol(String),
}

impl PushError {
    /// Worth an automatic retry? Authorization failures are terminal.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Unauthorized { .. })
    }

    /// Classify a free-text transport error.
    ///
    /// Known-fragile compatibility shim: matches substrings of error
    /// messages ("401"/"unauthorized", "cors", fetch/connect phrasing).
    /// Used only when the transport library gives us no structured
    /// status to work with.
    pub fn classify_str(text: &str) -> Self {
        let lower = text.to_ascii_lowercase();
        if lower.contains("401") || lower.contains("unauthorized") {
            Self::Unauthorized { status: 401 }
        } else if lower.contains("cors") {
            Self::Cors(text.to_string())
        } else {
            // "Failed to fetch", "connection refused", timeouts and the
            // rest of the free-text zoo all land here.
            Self::Network(text.to_string())
        }
    }
}

// ── Connector seam ───────────────────────────────────────────────────

/// An established push connection yielding parsed payloads.
///
/// `None` means the hub closed the connection cleanly; `Some(Err(_))`
/// is an abnormal end and carries the structured reason.
pub trait PushStream: Send {
    fn next_event(
        &mut self,
    ) -> impl Future<Output = Option<Result<NotificationPayload, PushError>>> + Send;
}

/// Opens push connections. One call per connection attempt; the caller
/// re-resolves the bearer token before every call.
pub trait PushConnector: Send + Sync + 'static {
    type Stream: PushStream + 'static;

    fn connect(
        &self,
        hub_url: &Url,
        token: &str,
    ) -> impl Future<Output = Result<Self::Stream, PushError>> + Send;
}

// ── WebSocket implementation ─────────────────────────────────────────

/// Production connector over tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

impl PushConnector for WsConnector {
    type Stream = WsPushStream;

    async fn connect(&self, hub_url: &Url, token: &str) -> Result<WsPushStream, PushError> {
        let url = hub_ws_url(hub_url, token)?;
        tracing::info!(url = %redact_token(&url), "connecting to push hub");

        let uri: tungstenite::http::Uri = url
            .as_str()
            .parse()
            .map_err(|e: tungstenite::http::uri::InvalidUri| PushError::Protocol(e.to_string()))?;

        let request = ClientRequestBuilder::new(uri);
        let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(map_connect_error)?;

        tracing::info!("push hub connected");
        Ok(WsPushStream { inner: ws_stream })
    }
}

/// Map a tungstenite connect error to the structured taxonomy.
///
/// HTTP rejections carry a status we can use directly; everything else
/// falls back to the substring shim.
fn map_connect_error(err: tungstenite::Error) -> PushError {
    match err {
        tungstenite::Error::Http(response) => {
            let status = response.status().as_u16();
            if status == 401 || status == 403 {
                PushError::Unauthorized { status }
            } else {
                PushError::Handshake {
                    status,
                    message: "upgrade rejected".into(),
                }
            }
        }
        tungstenite::Error::Io(e) => PushError::Network(e.to_string()),
        other => PushError::classify_str(&other.to_string()),
    }
}

/// Build the upgrade URL: http(s) scheme mapped to ws(s), token appended
/// as the `access_token` query parameter (the hub reads it during the
/// handshake; header auth is not honored across its transport fallbacks).
fn hub_ws_url(hub_url: &Url, token: &str) -> Result<Url, PushError> {
    let mut url = hub_url.clone();
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(PushError::Protocol(format!(
                "unsupported hub URL scheme '{other}'"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| PushError::Protocol("hub URL cannot carry a ws scheme".into()))?;
    url.query_pairs_mut().append_pair("access_token", token);
    Ok(url)
}

/// Redacted rendering for logs: the token never hits the log stream.
fn redact_token(url: &Url) -> String {
    let mut redacted = url.clone();
    if url.query().is_some() {
        redacted.set_query(Some("access_token=***"));
    }
    redacted.to_string()
}

/// Live WebSocket stream reading `{"event", "payload"}` frames.
pub struct WsPushStream {
    inner: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl PushStream for WsPushStream {
    async fn next_event(&mut self) -> Option<Result<NotificationPayload, PushError>> {
        loop {
            match self.inner.next().await {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    if let Some(payload) = parse_frame(&text) {
                        return Some(Ok(payload));
                    }
                    // Unknown event or malformed frame: logged and skipped.
                }
                Some(Ok(tungstenite::Message::Ping(_))) => {
                    // tungstenite replies with pongs automatically
                    tracing::trace!("push hub ping");
                }
                Some(Ok(tungstenite::Message::Close(frame))) => {
                    return close_outcome(frame);
                }
                Some(Err(e)) => {
                    return Some(Err(map_connect_error(e)));
                }
                None => {
                    tracing::info!("push stream ended");
                    return None;
                }
                _ => {
                    // Binary, Pong, raw frames -- ignore
                }
            }
        }
    }
}

/// Interpret a close frame: policy closes citing authorization are
/// surfaced as `Unauthorized` so the manager knows not to retry, a
/// normal close (1000) or a bare close is a clean end, and every other
/// code is an abnormal `Closed` error that error handlers should see.
fn close_outcome(
    frame: Option<tungstenite::protocol::CloseFrame>,
) -> Option<Result<NotificationPayload, PushError>> {
    use tungstenite::protocol::frame::coding::CloseCode;

    let Some(cf) = frame else {
        tracing::info!("push close frame received (no payload)");
        return None;
    };

    let code = u16::from(cf.code);
    let reason = cf.reason.to_string();
    tracing::info!(code, reason = %reason, "push close frame received");

    // The hub signals a dead token with a policy close; the reason text
    // check doubles as the substring shim for proxies that rewrite the
    // close code.
    let lower = reason.to_ascii_lowercase();
    if lower.contains("401") || lower.contains("unauthorized") {
        return Some(Err(PushError::Unauthorized { status: 401 }));
    }

    if cf.code == CloseCode::Normal {
        None
    } else {
        Some(Err(PushError::Closed { code, reason }))
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

/// Wire envelope for push frames.
#[derive(Debug, Deserialize)]
struct PushFrame {
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Parse a text frame; returns the payload only for `"notification"`
/// events. Malformed or unknown frames are logged and dropped.
fn parse_frame(text: &str) -> Option<NotificationPayload> {
    let frame: PushFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse push frame");
            return None;
        }
    };

    if frame.event != "notification" {
        tracing::debug!(event = %frame.event, "ignoring unknown push event");
        return None;
    }

    match serde_json::from_value::<NotificationPayload>(frame.payload) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::debug!(error = %e, "could not deserialize notification payload");
            None
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
