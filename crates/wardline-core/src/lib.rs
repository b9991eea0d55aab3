// wardline-core: Connection lifecycle and notification fan-out between
// wardline-api and consumers (CLI).

pub mod config;
pub mod dispatch;
pub mod error;
pub mod page;
pub mod realtime;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{HubConfig, RetryPolicy};
pub use dispatch::{HandlerRegistry, Subscription};
pub use error::{CoreError, ErrorCode, ErrorSignal};
pub use page::{ListView, Page, PageInfo, Searchable, filter_by_search, paginate};
pub use realtime::{ConnectionState, Realtime, watchdog};

// Re-export the wire types consumers handle.
pub use wardline_api::{Locale, NotificationPayload, NotificationRecord, PayloadKind, Priority};
