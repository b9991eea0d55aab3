// Wire-level types shared by the REST and push surfaces.
//
// The roster backend is bilingual (English LTR / Arabic RTL): every
// user-visible string arrives as a language pair plus a legacy untagged
// fallback field. Consumers pick a side via `Locale`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Locale ───────────────────────────────────────────────────────────

/// Display locale for language-paired fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    /// Right-to-left script?
    pub fn is_rtl(self) -> bool {
        matches!(self, Self::Ar)
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "ar" | "arabic" => Ok(Self::Ar),
            other => Err(format!("unknown locale '{other}' (expected 'en' or 'ar')")),
        }
    }
}

// ── Priority ─────────────────────────────────────────────────────────

/// Notification priority, controlling display treatment downstream.
///
/// Ordered so that `Urgent > High > Normal > Low`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "PascalCase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

// ── REST envelope ────────────────────────────────────────────────────

/// The `{success, data, messageEn, messageAr}` envelope every REST
/// endpoint responds with. `data` is absent on failure and on
/// mutation acknowledgments.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message_en: Option<String>,
    pub message_ar: Option<String>,
}

// ── NotificationRecord ───────────────────────────────────────────────

/// A persisted notification from the REST list endpoint.
///
/// `#[serde(flatten)]` captures routing metadata and any fields this
/// client does not model, so nothing from the backend is silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: i64,

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
    pub priority: Priority,

    #[serde(default)]
    pub is_read: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Routing metadata and anything else the backend sends.
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl NotificationRecord {
    /// Title for the given locale, falling back to the untagged field,
    /// then to the other language.
    pub fn title_for(&self, locale: Locale) -> &str {
        pick_localized(locale, &self.title_en, &self.title_ar, &self.title)
    }

    /// Message body for the given locale, with the same fallback chain.
    pub fn message_for(&self, locale: Locale) -> &str {
        pick_localized(locale, &self.message_en, &self.message_ar, &self.message)
    }
}

/// Fallback chain: requested language -> untagged -> other language -> "".
pub(crate) fn pick_localized<'a>(
    locale: Locale,
    en: &'a Option<String>,
    ar: &'a Option<String>,
    untagged: &'a Option<String>,
) -> &'a str {
    let (primary, secondary) = match locale {
        Locale::En => (en, ar),
        Locale::Ar => (ar, en),
    };
    primary
        .as_deref()
        .or(untagged.as_deref())
        .or(secondary.as_deref())
        .unwrap_or("")
}
