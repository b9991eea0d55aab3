//! Notification list/read/delete command handlers.

use wardline_core::{ListView, NotificationRecord};

use crate::cli::{DeleteArgs, GlobalOpts, ListArgs, MarkReadArgs};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::confirm;

pub async fn list(session: Session, args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let records = session
        .client
        .list(args.page, args.page_size, args.is_read_filter())
        .await?;

    // `--search` narrows the fetched page client-side and re-paginates
    // what is left.
    let visible: Vec<NotificationRecord> = match args.search.as_deref() {
        Some(term) if !term.trim().is_empty() => {
            let mut view = ListView::new(args.page_size as usize);
            view.set_items(records);
            view.set_search(term);
            view.visible().items.into_iter().cloned().collect()
        }
        _ => records,
    };

    let color = output::should_color(&global.color);
    let locale = session.locale;
    let rendered = output::render_list(
        &global.output,
        &visible,
        |record| output::notification_row(record, locale, color),
        |record| record.id.to_string(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}

pub async fn unread(session: Session, global: &GlobalOpts) -> Result<(), CliError> {
    let count = session.client.unread_count().await?;
    output::print_output(&count.to_string(), global.quiet);
    Ok(())
}

pub async fn mark_read(
    session: Session,
    args: MarkReadArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.all {
        session.client.mark_all_read().await?;
        if !global.quiet {
            eprintln!("All notifications marked as read");
        }
        return Ok(());
    }

    match args.ids.as_slice() {
        [id] => session.client.mark_read(*id).await?,
        ids => session.client.mark_many_read(ids).await?,
    }
    if !global.quiet {
        eprintln!("{} notification(s) marked as read", args.ids.len());
    }
    Ok(())
}

pub async fn delete(
    session: Session,
    args: DeleteArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let prompt = format!(
        "Delete {} notification(s)? This cannot be undone.",
        args.ids.len()
    );
    if !confirm(&prompt, global.yes)? {
        return Ok(());
    }

    match args.ids.as_slice() {
        [id] => session.client.delete(*id).await?,
        ids => session.client.delete_many(ids).await?,
    }
    if !global.quiet {
        eprintln!("{} notification(s) deleted", args.ids.len());
    }
    Ok(())
}
