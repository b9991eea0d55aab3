//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses
//! `tabled`, structured formats use serde, plain emits one value per
//! line. Color goes through `owo-colors` with `NO_COLOR` and tty
//! detection.

use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use wardline_core::{Locale, NotificationPayload, NotificationRecord, PayloadKind, Priority};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Style a priority label: Urgent red, High yellow, Low dimmed.
fn priority_label(priority: Priority, color: bool) -> String {
    let name = match priority {
        Priority::Urgent => "urgent",
        Priority::High => "high",
        Priority::Normal => "normal",
        Priority::Low => "low",
    };
    if !color {
        return name.to_string();
    }
    match priority {
        Priority::Urgent => name.red().bold().to_string(),
        Priority::High => name.yellow().to_string(),
        Priority::Normal => name.to_string(),
        Priority::Low => name.dimmed().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("<serialization failed: {e}>"))
}

// ── Notification rendering ───────────────────────────────────────────

/// Table row for the `list` command.
#[derive(Tabled)]
pub struct NotificationRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "PRIORITY")]
    pub priority: String,
    #[tabled(rename = "TITLE")]
    pub title: String,
    #[tabled(rename = "MESSAGE")]
    pub message: String,
    #[tabled(rename = "READ")]
    pub read: &'static str,
    #[tabled(rename = "CREATED")]
    pub created: String,
}

pub fn notification_row(
    record: &NotificationRecord,
    locale: Locale,
    color: bool,
) -> NotificationRow {
    NotificationRow {
        id: record.id,
        priority: priority_label(record.priority, color),
        title: record.title_for(locale).to_string(),
        message: record.message_for(locale).to_string(),
        read: if record.is_read { "yes" } else { "" },
        created: record.created_at.map(format_local_time).unwrap_or_default(),
    }
}

fn format_local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// One line of `watch` output for an inbound push payload.
///
/// Notifications are styled by priority; diagnostic pings come out as
/// an unobtrusive dimmed line so stream liveness stays visible without
/// drowning the real traffic.
pub fn push_line(payload: &NotificationPayload, locale: Locale, color: bool) -> String {
    let stamp = Local::now().format("%H:%M:%S");

    if payload.kind == PayloadKind::DiagnosticPing {
        let line = format!("{stamp}  . ping");
        return if color { line.dimmed().to_string() } else { line };
    }

    let priority = payload.priority.unwrap_or_default();
    let title = payload.title_for(locale);
    let message = payload.message_for(locale);

    let mut line = format!("{stamp}  [{}] {title}", priority_label(priority, color));
    if !message.is_empty() {
        line.push_str(": ");
        line.push_str(message);
    }
    line
}
