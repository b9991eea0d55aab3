//! Clap derive structures for the `wardline` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use wardline_core::Locale;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wardline -- notification client for the ward roster service
#[derive(Debug, Parser)]
#[command(
    name = "wardline",
    version,
    about = "Follow and manage ward roster notifications from the command line",
    long_about = "A client for the hospital ward roster notification service.\n\n\
        Streams realtime notifications over the push hub and manages the\n\
        persisted notification list through the roster REST API.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "WARDLINE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Roster API base URL (overrides profile)
    #[arg(long, env = "WARDLINE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Push hub URL (defaults to <api-url>/hubs/notifications)
    #[arg(long, env = "WARDLINE_HUB_URL", global = true)]
    pub hub_url: Option<String>,

    /// Bearer token for the roster API
    #[arg(long, env = "WARDLINE_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Display locale for bilingual fields (en or ar)
    #[arg(long, short = 'l', env = "WARDLINE_LOCALE", global = true)]
    pub locale: Option<Locale>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WARDLINE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "WARDLINE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "WARDLINE_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream realtime notifications until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// List persisted notifications
    #[command(alias = "ls")]
    List(ListArgs),

    /// Print the unread notification count
    Unread,

    /// Mark notifications as read
    #[command(name = "mark-read", alias = "mr")]
    MarkRead(MarkReadArgs),

    /// Delete notifications
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),
}

// ── Per-command args ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Disable the periodic health watchdog
    #[arg(long)]
    pub no_watchdog: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// 1-based page to fetch
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Items per page
    #[arg(long, default_value = "10")]
    pub page_size: u32,

    /// Only unread notifications
    #[arg(long, conflicts_with = "read")]
    pub unread: bool,

    /// Only read notifications
    #[arg(long, conflicts_with = "unread")]
    pub read: bool,

    /// Client-side case-insensitive filter over titles and messages
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

impl ListArgs {
    /// The `isRead` query filter: `--unread` / `--read` / neither.
    pub fn is_read_filter(&self) -> Option<bool> {
        if self.unread {
            Some(false)
        } else if self.read {
            Some(true)
        } else {
            None
        }
    }
}

#[derive(Debug, Args)]
pub struct MarkReadArgs {
    /// Notification ids to mark as read
    #[arg(required_unless_present = "all")]
    pub ids: Vec<i64>,

    /// Mark every notification as read
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Notification ids to delete
    #[arg(required = true)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration (tokens redacted)
    Show,
    /// Interactively create a profile
    Init,
    /// Print the config file path
    Path,
}
