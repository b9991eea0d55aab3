//! Realtime connection manager with a single coherent retry policy.
//!
//! Owns exactly one push connection to the roster hub and the
//! [`ConnectionState`] that describes it. Recovery is one cancellable
//! state machine (`Disconnected -> Connecting -> Connected ->
//! Reconnecting(n) -> Failed`): the [`RetryPolicy`](crate::RetryPolicy)
//! budget is the only attempt counter and delay source. The transport
//! layer performs no retries of its own, and the [`watchdog`] restarts
//! the client only when it is fully down.
//!
//! The manager is an explicitly constructed service: cheaply cloneable,
//! injected wherever it is needed, with its lifetime owned by the
//! composition root rather than a module-level singleton.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use secrecy::ExposeSecret;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wardline_api::auth::TokenProvider;
use wardline_api::push::{NotificationPayload, PushConnector, PushError, PushStream, WsConnector};

use crate::config::HubConfig;
use crate::dispatch::{HandlerRegistry, Subscription};
use crate::error::{ErrorCode, ErrorSignal};

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
///
/// Driven only by transport lifecycle outcomes and explicit
/// `start`/`stop` calls; no other code can set it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    /// Terminal for automatic recovery: the token is dead or the retry
    /// budget is exhausted. Only a manual `reconnect()` leaves it.
    Failed,
}

// ── Realtime ─────────────────────────────────────────────────────────

/// Handle to the realtime notification client.
///
/// Cheaply cloneable via `Arc`; all clones share the one connection,
/// state, and handler registries.
pub struct Realtime<C: PushConnector = WsConnector> {
    inner: Arc<RealtimeInner<C>>,
}

impl<C: PushConnector> Clone for Realtime<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct RealtimeInner<C> {
    config: HubConfig,
    connector: C,
    tokens: Arc<dyn TokenProvider>,
    state: watch::Sender<ConnectionState>,
    notifications: HandlerRegistry<NotificationPayload>,
    errors: HandlerRegistry<ErrorSignal>,
    /// Duplicate-start guard: set while a `start()` attempt is in
    /// flight so concurrent callers return early.
    start_in_flight: AtomicBool,
    session: Mutex<Option<SessionHandle>>,
}

struct SessionHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Realtime<WsConnector> {
    /// Production client over the WebSocket connector.
    pub fn over_websocket(config: HubConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::new(config, WsConnector::new(), tokens)
    }
}

impl<C: PushConnector> Realtime<C> {
    /// Create a client. Does NOT connect -- call [`start`](Self::start).
    pub fn new(config: HubConfig, connector: C, tokens: Arc<dyn TokenProvider>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(RealtimeInner {
                config,
                connector,
                tokens,
                state,
                notifications: HandlerRegistry::new(),
                errors: HandlerRegistry::new(),
                start_in_flight: AtomicBool::new(false),
                session: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Open the push connection.
    ///
    /// Idempotent-ish: if an attempt is already in flight or a session
    /// is live (`Connecting`/`Connected`/`Reconnecting`), returns `true`
    /// immediately without starting a second attempt. The bearer token
    /// is re-read from the provider on this and every subsequent
    /// attempt. Failures are classified and fanned out to error
    /// handlers; `start` itself never errors, it resolves `false`.
    pub async fn start(&self) -> bool {
        if matches!(
            self.state(),
            ConnectionState::Connected
                | ConnectionState::Connecting
                | ConnectionState::Reconnecting { .. }
        ) {
            return true;
        }
        if self.inner.start_in_flight.swap(true, Ordering::SeqCst) {
            return true;
        }

        let result = self.try_start().await;
        self.inner.start_in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn try_start(&self) -> bool {
        // Reap any finished session (Failed state leaves one behind).
        self.teardown_session().await;

        let Some(token) = self.inner.tokens.bearer_token() else {
            warn!("no bearer token available, not connecting");
            self.dispatch_error(ErrorSignal::new(
                ErrorCode::NoToken,
                "no bearer token in the credential store",
            ));
            return false;
        };

        self.set_state(ConnectionState::Connecting);
        let connected = self
            .inner
            .connector
            .connect(&self.inner.config.hub_url, token.expose_secret())
            .await;

        match connected {
            Ok(stream) => {
                self.set_state(ConnectionState::Connected);
                let cancel = CancellationToken::new();
                let task = tokio::spawn(session_task(self.clone(), stream, cancel.clone()));
                *self.inner.session.lock().await = Some(SessionHandle { cancel, task });
                true
            }
            Err(e) => {
                warn!(error = %e, "push connection attempt failed");
                self.dispatch_error(ErrorSignal::from(&e));
                self.set_state(ConnectionState::Disconnected);
                false
            }
        }
    }

    /// Close the connection.
    ///
    /// Cancels the session task and waits for it to finish. Safe to
    /// call when never started; never errors. Must not be called from
    /// inside a registered handler (the session task is joined here).
    pub async fn stop(&self) {
        self.teardown_session().await;
        self.set_state(ConnectionState::Disconnected);
        debug!("realtime client stopped");
    }

    /// `stop()` then `start()`, with a fresh retry budget.
    pub async fn reconnect(&self) -> bool {
        self.stop().await;
        self.start().await
    }

    async fn teardown_session(&self) {
        if let Some(session) = self.inner.session.lock().await.take() {
            session.cancel.cancel();
            let _ = session.task.await;
        }
    }

    // ── State observation ────────────────────────────────────────────

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// `true` iff the state is exactly [`Connected`](ConnectionState::Connected).
    pub fn is_connected(&self) -> bool {
        matches!(self.state(), ConnectionState::Connected)
    }

    // ── Handler registration ─────────────────────────────────────────

    /// Register a notification handler. Fan-out is synchronous, in
    /// registration order; the returned subscription removes exactly
    /// this registration.
    pub fn on_notification(
        &self,
        handler: impl Fn(&NotificationPayload) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.notifications.register(handler)
    }

    /// Register an error-signal handler.
    pub fn on_error(
        &self,
        handler: impl Fn(&ErrorSignal) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.errors.register(handler)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_state(&self, state: ConnectionState) {
        self.inner.state.send_replace(state);
    }

    fn dispatch_error(&self, signal: ErrorSignal) {
        debug!(code = %signal.code, message = %signal.message, "error signal");
        self.inner.errors.dispatch(&signal);
    }

    fn dispatch_notification(&self, payload: &NotificationPayload) {
        self.inner.notifications.dispatch(payload);
    }
}

// ── Session task ─────────────────────────────────────────────────────

enum SessionEnd {
    /// Deliberate `stop()`.
    Cancelled,
    /// The hub rejected our credentials: terminal, no retry.
    Unauthorized(PushError),
    /// Unexpected close or transport error: eligible for retry.
    Interrupted(Option<PushError>),
}

/// Read events until the connection ends, then drive the retry loop.
async fn session_task<C: PushConnector>(
    realtime: Realtime<C>,
    stream: C::Stream,
    cancel: CancellationToken,
) {
    let mut stream = stream;
    let mut attempt: u32 = 0;

    loop {
        match read_until_end(&realtime, &mut stream, &cancel).await {
            SessionEnd::Cancelled => return,
            SessionEnd::Unauthorized(e) => {
                warn!(error = %e, "push hub rejected credentials, not retrying");
                realtime.dispatch_error(ErrorSignal::from(&e));
                realtime.set_state(ConnectionState::Failed);
                return;
            }
            SessionEnd::Interrupted(maybe_err) => {
                if let Some(e) = &maybe_err {
                    warn!(error = %e, "push connection interrupted");
                    realtime.dispatch_error(ErrorSignal::from(e));
                } else {
                    info!("push connection closed by hub, retrying");
                }
            }
        }

        match retry_until_connected(&realtime, &cancel, &mut attempt).await {
            Some(next) => stream = next,
            None => return,
        }
    }
}

/// Dispatch inbound payloads until the stream ends.
async fn read_until_end<C: PushConnector>(
    realtime: &Realtime<C>,
    stream: &mut C::Stream,
    cancel: &CancellationToken,
) -> SessionEnd {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return SessionEnd::Cancelled,
            event = stream.next_event() => {
                match event {
                    Some(Ok(payload)) => realtime.dispatch_notification(&payload),
                    Some(Err(e @ PushError::Unauthorized { .. })) => {
                        return SessionEnd::Unauthorized(e);
                    }
                    Some(Err(e)) => return SessionEnd::Interrupted(Some(e)),
                    None => return SessionEnd::Interrupted(None),
                }
            }
        }
    }
}

/// The single retry loop. Returns the new stream, or `None` when the
/// session is over (cancelled, unauthorized, token gone, or budget
/// exhausted). A successful reconnect resets the attempt counter.
async fn retry_until_connected<C: PushConnector>(
    realtime: &Realtime<C>,
    cancel: &CancellationToken,
    attempt: &mut u32,
) -> Option<C::Stream> {
    let policy = realtime.inner.config.retry.clone();

    loop {
        if *attempt >= policy.max_retries {
            warn!(
                max_retries = policy.max_retries,
                "reconnection budget exhausted, giving up"
            );
            realtime.dispatch_error(ErrorSignal::new(
                ErrorCode::MaxRetries,
                format!("gave up after {} reconnection attempts", policy.max_retries),
            ));
            realtime.set_state(ConnectionState::Failed);
            return None;
        }

        let delay = policy.delay(*attempt);
        *attempt += 1;
        realtime.set_state(ConnectionState::Reconnecting { attempt: *attempt });
        debug!(?delay, attempt = *attempt, "waiting before reconnect");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        // Token is re-read on every attempt so a refresh elsewhere is
        // picked up mid-recovery.
        let Some(token) = realtime.inner.tokens.bearer_token() else {
            realtime.dispatch_error(ErrorSignal::new(
                ErrorCode::NoToken,
                "bearer token disappeared during reconnection",
            ));
            realtime.set_state(ConnectionState::Failed);
            return None;
        };

        let connected = realtime
            .inner
            .connector
            .connect(&realtime.inner.config.hub_url, token.expose_secret())
            .await;

        match connected {
            Ok(stream) => {
                info!(attempt = *attempt, "push hub reconnected");
                realtime.set_state(ConnectionState::Connected);
                *attempt = 0;
                return Some(stream);
            }
            Err(e) if !e.is_transient() => {
                warn!(error = %e, "reconnect rejected, not retrying");
                realtime.dispatch_error(ErrorSignal::from(&e));
                realtime.set_state(ConnectionState::Failed);
                return None;
            }
            Err(e) => {
                warn!(error = %e, attempt = *attempt, "reconnect attempt failed");
                realtime.dispatch_error(ErrorSignal::from(&e));
            }
        }
    }
}

// ── Health watchdog ──────────────────────────────────────────────────

/// Belt-and-suspenders recovery: on a fixed interval, restart the
/// client if it reports fully `Disconnected`.
///
/// Deliberately does NOT touch `Failed` -- a dead token or an exhausted
/// retry budget requires a manual `reconnect()`. Redundant `start()`
/// calls racing a manual reconnect are absorbed by the duplicate-start
/// guard.
pub async fn watchdog<C: PushConnector>(
    realtime: Realtime<C>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if realtime.state() == ConnectionState::Disconnected {
                    info!("watchdog: push connection is down, restarting");
                    let _ = realtime.start().await;
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;

    use url::Url;
    use wardline_api::auth::StaticToken;

    use super::*;

    // ── Mock transport ───────────────────────────────────────────────

    struct MockStream {
        items: VecDeque<Result<NotificationPayload, PushError>>,
        /// After the scripted items: hang (stay connected) or close.
        then_hang: bool,
    }

    impl MockStream {
        fn hanging(items: Vec<Result<NotificationPayload, PushError>>) -> Self {
            Self {
                items: items.into(),
                then_hang: true,
            }
        }
    }

    impl PushStream for MockStream {
        async fn next_event(&mut self) -> Option<Result<NotificationPayload, PushError>> {
            match self.items.pop_front() {
                Some(item) => Some(item),
                None if self.then_hang => std::future::pending().await,
                None => None,
            }
        }
    }

    /// Scripted connector: pops one outcome per connect call; an empty
    /// script fails every further attempt with a network error.
    struct MockConnector {
        attempts: Arc<AtomicUsize>,
        script: StdMutex<VecDeque<Result<MockStream, PushError>>>,
        connect_delay: Duration,
    }

    impl MockConnector {
        fn scripted(script: Vec<Result<MockStream, PushError>>) -> (Self, Arc<AtomicUsize>) {
            let attempts = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    attempts: Arc::clone(&attempts),
                    script: StdMutex::new(script.into()),
                    connect_delay: Duration::ZERO,
                },
                attempts,
            )
        }
    }

    impl PushConnector for MockConnector {
        type Stream = MockStream;

        async fn connect(&self, _url: &Url, _token: &str) -> Result<MockStream, PushError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if !self.connect_delay.is_zero() {
                tokio::time::sleep(self.connect_delay).await;
            }
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(PushError::Network("connection refused".into())))
        }
    }

    fn hub_config() -> HubConfig {
        HubConfig::new(Url::parse("https://roster.example.com/hubs/notifications").unwrap())
    }

    fn collecting_errors(realtime: &Realtime<MockConnector>) -> Arc<StdMutex<Vec<ErrorSignal>>> {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        realtime.on_error(move |signal| sink.lock().unwrap().push(signal.clone()));
        seen
    }

    fn payload(kind: &str) -> NotificationPayload {
        serde_json::from_value(serde_json::json!({ "kind": kind })).unwrap()
    }

    /// Wait (under paused time) until the state matches.
    async fn wait_for_state(realtime: &Realtime<MockConnector>, want: &ConnectionState) {
        let mut rx = realtime.watch_state();
        loop {
            if *rx.borrow() == *want {
                return;
            }
            rx.changed().await.expect("state channel closed");
        }
    }

    // ── Tests ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn no_token_short_circuits_with_one_signal() {
        let (connector, attempts) = MockConnector::scripted(vec![]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::absent()));
        let errors = collecting_errors(&realtime);

        assert!(!realtime.start().await);

        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::NoToken);
        assert_eq!(attempts.load(Ordering::SeqCst), 0, "no network attempt");
        assert_eq!(realtime.state(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_starts_share_one_attempt() {
        let (mut connector, attempts) =
            MockConnector::scripted(vec![Ok(MockStream::hanging(vec![]))]);
        connector.connect_delay = Duration::from_millis(50);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));

        let a = realtime.clone();
        let b = realtime.clone();
        let (ra, rb) = tokio::join!(a.start(), b.start());

        assert!(ra && rb);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(realtime.is_connected());

        // A third start against a live session is also a no-op.
        assert!(realtime.start().await);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        realtime.stop().await;
    }

    #[tokio::test]
    async fn stop_without_start_is_safe() {
        let (connector, _) = MockConnector::scripted(vec![]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));

        realtime.stop().await;
        assert_eq!(realtime.state(), ConnectionState::Disconnected);
        assert!(!realtime.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn inbound_payloads_fan_out_and_unsubscribe_sticks() {
        let (connector, _) = MockConnector::scripted(vec![Ok(MockStream::hanging(vec![
            Ok(payload("notification")),
            Ok(payload("diagnostic_ping")),
        ]))]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = realtime.on_notification(move |p| sink.lock().unwrap().push(p.kind));

        assert!(realtime.start().await);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                wardline_api::PayloadKind::Notification,
                wardline_api::PayloadKind::DiagnosticPing
            ]
        );

        // After unsubscribing, later payloads never reach the handler.
        sub.unsubscribe();
        sub.unsubscribe(); // second call is a no-op
        realtime.dispatch_notification(&payload("notification"));
        assert_eq!(seen.lock().unwrap().len(), 2);

        realtime.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn initial_failure_resolves_false_and_classifies() {
        let (connector, attempts) = MockConnector::scripted(vec![Err(PushError::Cors(
            "blocked by CORS policy".into(),
        ))]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));
        let errors = collecting_errors(&realtime);

        assert!(!realtime.start().await);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(realtime.state(), ConnectionState::Disconnected);

        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::CorsError);
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_close_is_terminal() {
        let (connector, attempts) = MockConnector::scripted(vec![Ok(MockStream::hanging(
            vec![Err(PushError::Unauthorized { status: 401 })],
        ))]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));
        let errors = collecting_errors(&realtime);

        assert!(realtime.start().await);
        wait_for_state(&realtime, &ConnectionState::Failed).await;

        // No automatic retry against a dead token.
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::Unauthorized);
    }

    #[tokio::test(start_paused = true)]
    async fn abnormal_close_reaches_error_handlers_before_reconnect() {
        let (connector, attempts) = MockConnector::scripted(vec![
            Ok(MockStream::hanging(vec![Err(PushError::Closed {
                code: 1006,
                reason: "going away".into(),
            })])),
            Ok(MockStream::hanging(vec![])),
        ]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));
        let errors = collecting_errors(&realtime);

        assert!(realtime.start().await);

        // The close is signalled immediately, well inside the first
        // reconnect delay.
        tokio::time::sleep(Duration::from_millis(100)).await;
        {
            let errors = errors.lock().unwrap();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].code, ErrorCode::Other);
            assert!(errors[0].message.contains("1006"));
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        // The close stays transient: recovery still runs and succeeds.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(realtime.state(), ConnectionState::Connected);
        assert_eq!(errors.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_exhaustion_signals_max_retries_once() {
        // First connect succeeds, then the stream errors; every
        // reconnect attempt fails (empty script -> network error).
        let (connector, attempts) = MockConnector::scripted(vec![Ok(MockStream::hanging(
            vec![Err(PushError::Network("reset by peer".into()))],
        ))]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));
        let errors = collecting_errors(&realtime);

        assert!(realtime.start().await);
        wait_for_state(&realtime, &ConnectionState::Failed).await;

        // Initial connect + the full budget of 5 reconnect attempts.
        assert_eq!(attempts.load(Ordering::SeqCst), 6);

        let max_retries = errors
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.code == ErrorCode::MaxRetries)
            .count();
        assert_eq!(max_retries, 1);

        // And nothing further happens without a manual reconnect.
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_reconnect_resets_the_budget() {
        let (connector, attempts) = MockConnector::scripted(vec![
            // Session 1: drops immediately.
            Ok(MockStream::hanging(vec![Err(PushError::Network(
                "reset".into(),
            ))])),
            // Reconnect attempt 1 fails, attempt 2 succeeds.
            Err(PushError::Network("refused".into())),
            Ok(MockStream::hanging(vec![])),
        ]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));

        assert!(realtime.start().await);

        // The state is Connected both before and after the drop, so
        // wait on the connect attempt count instead.
        for _ in 0..1000 {
            if attempts.load(Ordering::SeqCst) == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        // Back to Connected after two reconnect attempts, with the
        // attempt counter reset for the next interruption.
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(realtime.is_connected());

        realtime.stop().await;
        assert_eq!(realtime.state(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_reconnect_recovers_from_failed() {
        let (connector, attempts) = MockConnector::scripted(vec![
            Err(PushError::Network("down".into())),
            Ok(MockStream::hanging(vec![])),
        ]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));

        assert!(!realtime.start().await);
        assert!(realtime.reconnect().await);
        assert!(realtime.is_connected());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        realtime.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_restarts_only_from_disconnected() {
        let (connector, attempts) = MockConnector::scripted(vec![]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(watchdog(
            realtime.clone(),
            Duration::from_secs(10),
            cancel.clone(),
        ));

        // Disconnected -> each tick triggers a (failing) start.
        tokio::time::sleep(Duration::from_secs(25)).await;
        let after_two_ticks = attempts.load(Ordering::SeqCst);
        assert!(after_two_ticks >= 2, "watchdog should have retried, got {after_two_ticks}");

        cancel.cancel();
        let _ = handle.await;
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_leaves_failed_alone() {
        let (connector, attempts) = MockConnector::scripted(vec![Ok(MockStream::hanging(
            vec![Err(PushError::Unauthorized { status: 401 })],
        ))]);
        let realtime = Realtime::new(hub_config(), connector, Arc::new(StaticToken::new("t")));

        assert!(realtime.start().await);
        wait_for_state(&realtime, &ConnectionState::Failed).await;
        let baseline = attempts.load(Ordering::SeqCst);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(watchdog(
            realtime.clone(),
            Duration::from_secs(10),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), baseline);

        cancel.cancel();
        let _ = handle.await;
    }
}
