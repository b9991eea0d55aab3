// Notification REST client
//
// Wraps `reqwest::Client` with roster-backend URL construction, bearer
// auth, and `{success, data, messageEn, messageAr}` envelope unwrapping.
// The bearer token is resolved through the `TokenProvider` on every
// request so a refreshed token is honored without rebuilding the client.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::TokenProvider;
use crate::error::Error;
use crate::model::{ApiEnvelope, NotificationRecord};
use crate::transport::TransportConfig;

/// HTTP client for the roster backend's notification endpoints.
pub struct NotificationsClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

/// Body for bulk mark-read / bulk delete requests.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdList<'a> {
    notification_ids: &'a [i64],
}

impl NotificationsClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `https://roster.example.com`).
    pub fn new(
        base_url: Url,
        tokens: Arc<dyn TokenProvider>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Number of unread notifications for the authenticated user.
    pub async fn unread_count(&self) -> Result<u64, Error> {
        let url = self.api_url("notifications/unread-count")?;
        self.get(url).await
    }

    /// One page of notifications. `is_read = None` returns both read
    /// and unread; the backend paginates server-side.
    pub async fn list(
        &self,
        page: u32,
        page_size: u32,
        is_read: Option<bool>,
    ) -> Result<Vec<NotificationRecord>, Error> {
        let mut url = self.api_url("notifications")?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("page", &page.to_string());
            q.append_pair("pageSize", &page_size.to_string());
            if let Some(is_read) = is_read {
                q.append_pair("isRead", if is_read { "true" } else { "false" });
            }
        }
        self.get(url).await
    }

    /// Mark a single notification as read.
    pub async fn mark_read(&self, id: i64) -> Result<(), Error> {
        let url = self.api_url(&format!("notifications/{id}/read"))?;
        self.put_ack(url, &serde_json::json!({})).await
    }

    /// Mark several notifications as read in one call.
    pub async fn mark_many_read(&self, ids: &[i64]) -> Result<(), Error> {
        let url = self.api_url("notifications/read")?;
        self.put_ack(url, &IdList { notification_ids: ids }).await
    }

    /// Mark every notification for the authenticated user as read.
    pub async fn mark_all_read(&self) -> Result<(), Error> {
        let url = self.api_url("notifications/read-all")?;
        self.put_ack(url, &serde_json::json!({})).await
    }

    /// Delete a single notification.
    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        let url = self.api_url(&format!("notifications/{id}"))?;
        debug!("DELETE {}", url);
        let resp = self.authed(self.http.delete(url))?.send().await?;
        self.parse_ack(resp).await
    }

    /// Delete several notifications in one call.
    pub async fn delete_many(&self, ids: &[i64]) -> Result<(), Error> {
        let url = self.api_url("notifications")?;
        debug!("DELETE {}", url);
        let resp = self
            .authed(self.http.delete(url))?
            .json(&IdList { notification_ids: ids })
            .send()
            .await?;
        self.parse_ack(resp).await
    }

    // ── URL / request helpers ────────────────────────────────────────

    /// Build `{base}/api/{path}`.
    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    /// Attach a freshly-resolved bearer token to the request.
    fn authed(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        let token = self.tokens.bearer_token().ok_or(Error::NoToken)?;
        Ok(req.bearer_auth(token.expose_secret()))
    }

    /// Send a GET request and unwrap the envelope.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.authed(self.http.get(url))?.send().await?;
        self.parse_envelope(resp).await
    }

    /// Send a PUT request whose envelope carries no payload.
    async fn put_ack(&self, url: Url, body: &impl Serialize) -> Result<(), Error> {
        debug!("PUT {}", url);
        let resp = self.authed(self.http.put(url))?.json(body).send().await?;
        self.parse_ack(resp).await
    }

    /// Parse the envelope, returning `data` on success.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized {
                message: "session expired or token revoked".into(),
            });
        }

        let body = resp.text().await?;
        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if !envelope.success {
            return Err(envelope_error(&envelope, status.as_u16()));
        }

        envelope.data.ok_or_else(|| Error::Deserialization {
            message: "envelope reported success but carried no data".into(),
            body,
        })
    }

    /// Parse the envelope of a mutation acknowledgment (no payload).
    async fn parse_ack(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized {
                message: "session expired or token revoked".into(),
            });
        }

        let body = resp.text().await?;
        let envelope: ApiEnvelope<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        if envelope.success {
            Ok(())
        } else {
            Err(envelope_error(&envelope, status.as_u16()))
        }
    }
}

fn envelope_error<T>(envelope: &ApiEnvelope<T>, status: u16) -> Error {
    Error::Api {
        message_en: envelope
            .message_en
            .clone()
            .unwrap_or_else(|| "request failed".into()),
        message_ar: envelope.message_ar.clone().unwrap_or_default(),
        status: Some(status),
    }
}
