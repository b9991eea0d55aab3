// wardline-api: Async Rust client for the Wardline roster backend
// (notification REST API + realtime push hub)

pub mod auth;
pub mod error;
pub mod model;
pub mod notifications;
pub mod push;
pub mod transport;

pub use auth::{EnvToken, StaticToken, TokenProvider};
pub use error::Error;
pub use model::{Locale, NotificationRecord, Priority};
pub use notifications::NotificationsClient;
pub use push::{
    NotificationPayload, PayloadKind, PushConnector, PushError, PushStream, WsConnector,
};
pub use transport::{TlsMode, TransportConfig};
