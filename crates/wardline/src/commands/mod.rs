//! Command dispatch: bridges CLI args -> api/core calls -> output.

pub mod config_cmd;
pub mod notifications;
pub mod watch;

use std::io::IsTerminal;

use crate::cli::{Command, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) => watch::handle(session, args, global).await,
        Command::List(args) => notifications::list(session, args, global).await,
        Command::Unread => notifications::unread(session, global).await,
        Command::MarkRead(args) => notifications::mark_read(session, args, global).await,
        Command::Delete(args) => notifications::delete(session, args, global).await,
        // Config is handled before dispatch
        Command::Config(_) => unreachable!(),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to answer the prompt, so a
/// destructive action is refused unless `--yes` was given.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.to_string(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
