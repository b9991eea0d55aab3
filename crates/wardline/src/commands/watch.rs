//! `wardline watch`: stream realtime notifications until interrupted.

use tokio_util::sync::CancellationToken;
use tracing::warn;

use wardline_core::{ConnectionState, ErrorSignal, Realtime, watchdog};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    session: Session,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let locale = session.locale;
    let quiet = global.quiet;

    let realtime = Realtime::over_websocket(session.hub.clone(), session.tokens);

    // Notification fan-out: print the line, then queue an unread-count
    // refresh. The refresh runs on the select loop below so handlers
    // stay synchronous and cheap.
    let (refresh_tx, mut refresh_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
    let _notifications = realtime.on_notification(move |payload| {
        println!("{}", output::push_line(payload, locale, color));
        let _ = refresh_tx.send(());
    });
    let _errors = realtime.on_error(move |signal: &ErrorSignal| {
        eprintln!("{signal}");
    });

    if !realtime.start().await {
        return Err(CliError::PushFailed);
    }
    if !quiet {
        eprintln!("Connected. Waiting for notifications (Ctrl-C to stop).");
    }

    let watchdog_cancel = CancellationToken::new();
    let watchdog_task = if args.no_watchdog {
        None
    } else {
        Some(tokio::spawn(watchdog(
            realtime.clone(),
            session.hub.watchdog_interval,
            watchdog_cancel.clone(),
        )))
    };

    let mut state_rx = realtime.watch_state();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            Some(()) = refresh_rx.recv() => {
                match session.client.unread_count().await {
                    Ok(count) if !quiet => eprintln!("unread: {count}"),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "unread count refresh failed"),
                }
            }

            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                if !quiet {
                    eprintln!("{}", state_line(&state));
                }
                // Failed is terminal for automatic recovery; without a
                // human at the other end there is nothing left to wait for.
                if state == ConnectionState::Failed {
                    break;
                }
            }
        }
    }

    watchdog_cancel.cancel();
    if let Some(task) = watchdog_task {
        let _ = task.await;
    }
    realtime.stop().await;

    if !quiet {
        eprintln!("Stopped.");
    }
    Ok(())
}

fn state_line(state: &ConnectionState) -> String {
    match state {
        ConnectionState::Disconnected => "-- disconnected".into(),
        ConnectionState::Connecting => "-- connecting".into(),
        ConnectionState::Connected => "-- connected".into(),
        ConnectionState::Reconnecting { attempt } => {
            format!("-- reconnecting (attempt {attempt})")
        }
        ConnectionState::Failed => "-- connection failed; restart to try again".into(),
    }
}
