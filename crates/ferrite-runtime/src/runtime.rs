//! Main runtime orchestration.
//!
//! The runtime owns the session state and the dispatcher, installs the
//! default handlers, and drives one connection until it ends or shutdown is
//! requested.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ferrite_runtime::FerriteRuntime;
//!
//! // Loads ferrite.toml and FERRITE_* variables, then reads the token file
//! let runtime = FerriteRuntime::builder().build()?;
//!
//! let connector = DiscordConnector::new(runtime.gateway_config(), runtime.rest_config());
//! runtime.run_with(&connector).await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ConfigLoader, FerriteConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging::{self, LogGuard};
use crate::token::load_token;
use ferrite_core::{
    ActionExecutor, ApiError, ApiResult, BoxedGateway, Connection, Connector, DispatchOutcome,
    Dispatcher, EventKind, Gateway, GatewayConfig, Handler, Ignore, InboundEvent, Method,
    MessageRelayHandler, ReadyHandler, RestConfig, SessionState, TransportError, TransportResult,
};

// =============================================================================
// RuntimeStats
// =============================================================================

/// Event counters for one runtime.
#[derive(Debug, Default)]
pub struct RuntimeStats {
    received: AtomicU64,
    dispatched: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`RuntimeStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Events read from the connection.
    pub received: u64,
    /// Events that reached a handler, successful or not.
    pub dispatched: u64,
    /// Handler invocations that returned an error or panicked.
    pub failed: u64,
}

impl RuntimeStats {
    fn record(&self, outcome: DispatchOutcome) {
        self.received.fetch_add(1, Ordering::Relaxed);
        if outcome.was_invoked() {
            self.dispatched.fetch_add(1, Ordering::Relaxed);
        }
        if outcome == DispatchOutcome::Failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// Late-bound gateway
// =============================================================================

/// Gateway that forwards to whichever connection is currently attached.
///
/// Handlers are built before any connection exists, so they hold this
/// instead of a concrete gateway.
#[derive(Default)]
struct SharedGateway {
    inner: RwLock<Option<BoxedGateway>>,
}

impl SharedGateway {
    fn attach(&self, gateway: BoxedGateway) {
        *self.inner.write() = Some(gateway);
    }

    fn detach(&self) -> Option<BoxedGateway> {
        self.inner.write().take()
    }

    fn current(&self) -> Option<BoxedGateway> {
        self.inner.read().clone()
    }
}

#[async_trait]
impl Gateway for SharedGateway {
    async fn call(&self, method: Method, path: &str, body: Value) -> ApiResult<Value> {
        match self.current() {
            Some(gateway) => gateway.call(method, path, body).await,
            None => Err(ApiError::NotConnected),
        }
    }

    async fn send(&self, opcode: u8, payload: Value) -> TransportResult<()> {
        match self.current() {
            Some(gateway) => gateway.send(opcode, payload).await,
            None => Err(TransportError::NotAvailable {
                transport: "gateway",
            }),
        }
    }
}

// =============================================================================
// FerriteRuntime
// =============================================================================

/// Owns the dispatcher and session for one bot.
pub struct FerriteRuntime {
    config: FerriteConfig,
    token: String,
    session: Arc<SessionState>,
    dispatcher: Arc<Dispatcher>,
    gateway: Arc<SharedGateway>,
    stats: Arc<RuntimeStats>,
    shutdown: CancellationToken,
    _log_guard: LogGuard,
}

impl FerriteRuntime {
    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// Initializes logging from `config.logging` and installs the default
    /// handlers.
    pub fn from_config(config: &FerriteConfig, token: impl Into<String>) -> Self {
        let log_guard = logging::init_from_config(&config.logging);

        let runtime = Self {
            config: config.clone(),
            token: token.into(),
            session: Arc::new(SessionState::new()),
            dispatcher: Arc::new(Dispatcher::new()),
            gateway: Arc::new(SharedGateway::default()),
            stats: Arc::new(RuntimeStats::default()),
            shutdown: CancellationToken::new(),
            _log_guard: log_guard,
        };
        runtime.install_default_handlers();

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            "Runtime initialized from configuration"
        );
        runtime
    }

    pub fn config(&self) -> &FerriteConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Gateway settings resolved with the loaded token.
    pub fn gateway_config(&self) -> GatewayConfig {
        self.config.gateway.to_gateway_config(&self.token)
    }

    /// REST settings resolved with the loaded token.
    pub fn rest_config(&self) -> RestConfig {
        self.config
            .rest
            .to_rest_config(&self.token, self.config.gateway.api_version)
    }

    /// Token that stops [`run_with`](Self::run_with) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Registers the built-in handlers, replacing any existing ones for the
    /// same kinds.
    ///
    /// `READY` records the identity, `MESSAGE_CREATE` runs the relay, and
    /// `GUILD_CREATE`, `PRESENCE_UPDATE` and `TYPING_START` are acknowledged
    /// without doing anything.
    pub fn install_default_handlers(&self) {
        let executor = ActionExecutor::new(Arc::clone(&self.gateway) as BoxedGateway);

        self.dispatcher
            .register(EventKind::Ready, ReadyHandler::new(Arc::clone(&self.session)));
        self.dispatcher.register(
            EventKind::MessageCreate,
            MessageRelayHandler::new(Arc::clone(&self.session), executor),
        );
        for kind in [
            EventKind::GuildCreate,
            EventKind::PresenceUpdate,
            EventKind::TypingStart,
        ] {
            self.dispatcher.register(kind, Ignore);
        }
    }

    /// Registers a handler, replacing any existing one for `kind`.
    pub fn register<H: Handler + 'static>(&self, kind: EventKind, handler: H) {
        self.dispatcher.register(kind, handler);
    }

    /// Connects and dispatches events until the stream ends, Ctrl+C is
    /// pressed, or the shutdown token is cancelled.
    ///
    /// Events are dispatched one at a time in arrival order.
    pub async fn run_with<C>(&self, connector: &C) -> RuntimeResult<()>
    where
        C: Connector + ?Sized,
    {
        let Connection { gateway, mut events } = connector.connect().await?;
        self.gateway.attach(gateway);
        info!("Connected, dispatching events. Press Ctrl+C to stop.");

        let shutdown = wait_for_shutdown(self.shutdown.clone());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        info!("Event stream ended");
                        break;
                    }
                },
            }
        }

        if let Some(gateway) = self.gateway.detach() {
            gateway.close();
        }

        let stats = self.stats.snapshot();
        info!(
            received = stats.received,
            dispatched = stats.dispatched,
            failed = stats.failed,
            "Runtime stopped"
        );
        Ok(())
    }

    async fn handle_event(&self, event: InboundEvent) {
        let outcome = self.dispatcher.dispatch(event).await;
        self.stats.record(outcome);
    }
}

/// Resolves on Ctrl+C or when `token` is cancelled.
async fn wait_for_shutdown(token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => {
            debug!("Shutdown requested");
        }
        result = signal::ctrl_c() => match result {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                token.cancelled().await;
            }
        },
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`FerriteRuntime`] from configuration sources.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    token: Option<String>,
    token_file: Option<PathBuf>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            token: None,
            token_file: None,
        }
    }

    /// Loads exactly this configuration file.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration programmatically.
    pub fn merge(mut self, config: FerriteConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Uses this token instead of reading the token file.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Reads the token from this file instead of `bot.token_file`.
    pub fn token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Loads and validates the configuration, then resolves the token.
    pub fn build(self) -> RuntimeResult<FerriteRuntime> {
        let mut config = self.config_loader.load()?;
        if let Some(path) = self.token_file {
            config.bot.token_file = path;
        }
        validate_config(&config)?;

        let token = match self.token {
            Some(token) => token,
            None => load_token(&config.bot.token_file)?,
        };
        Ok(FerriteRuntime::from_config(&config, token))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use crate::token::TokenError;
    use ferrite_core::{Identity, handler_fn};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct MockGateway {
        calls: Mutex<Vec<(String, Value)>>,
        sends: Mutex<Vec<(u8, Value)>>,
        closed: AtomicBool,
    }

    #[async_trait]
    impl Gateway for MockGateway {
        async fn call(&self, _method: Method, path: &str, body: Value) -> ApiResult<Value> {
            self.calls.lock().push((path.to_string(), body));
            Ok(json!({}))
        }

        async fn send(&self, opcode: u8, payload: Value) -> TransportResult<()> {
            self.sends.lock().push((opcode, payload));
            Ok(())
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    /// Hands out a pre-filled event stream once.
    struct ScriptedConnector {
        gateway: Arc<MockGateway>,
        events: Mutex<Option<mpsc::Receiver<InboundEvent>>>,
    }

    impl ScriptedConnector {
        fn new(events: Vec<InboundEvent>, keep_open: bool) -> (Self, Option<mpsc::Sender<InboundEvent>>) {
            let (tx, rx) = mpsc::channel(events.len().max(1));
            for event in events {
                tx.try_send(event).unwrap();
            }
            let connector = Self {
                gateway: Arc::new(MockGateway::default()),
                events: Mutex::new(Some(rx)),
            };
            (connector, keep_open.then_some(tx))
        }
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        async fn connect(&self) -> TransportResult<Connection> {
            let events = self.events.lock().take().ok_or(TransportError::ConnectionFailed {
                url: "mock".into(),
                reason: "already connected".into(),
            })?;
            Ok(Connection {
                gateway: self.gateway.clone(),
                events,
            })
        }
    }

    struct FailingConnector;

    #[async_trait]
    impl Connector for FailingConnector {
        async fn connect(&self) -> TransportResult<Connection> {
            Err(TransportError::ConnectionFailed {
                url: "wss://gateway.invalid".into(),
                reason: "refused".into(),
            })
        }
    }

    fn runtime() -> FerriteRuntime {
        FerriteRuntime::from_config(&FerriteConfig::default(), "secret")
    }

    fn ready() -> InboundEvent {
        InboundEvent::of(
            EventKind::Ready,
            json!({"user": {"id": "42", "username": "ferrite"}, "session_id": "abc"}),
        )
    }

    fn mention(content: &str) -> InboundEvent {
        InboundEvent::of(
            EventKind::MessageCreate,
            json!({
                "id": "1",
                "channel_id": "9",
                "content": content,
                "author": {"id": "7", "username": "alice"},
                "mentions": [{"id": "42"}]
            }),
        )
    }

    #[tokio::test]
    async fn test_full_session_relays_mention() {
        let runtime = Arc::new(runtime());
        let (connector, sender) = ScriptedConnector::new(
            vec![
                ready(),
                InboundEvent::of(EventKind::GuildCreate, json!({"id": "1"})),
                InboundEvent::new("CHANNEL_PINS_UPDATE", json!({})),
                mention("<@42> hello"),
            ],
            true,
        );
        let gateway = Arc::clone(&connector.gateway);

        let task = {
            let runtime = Arc::clone(&runtime);
            tokio::spawn(async move { runtime.run_with(&connector).await })
        };

        // Outbound actions run on a background task.
        tokio::time::timeout(Duration::from_secs(1), async {
            while gateway.calls.lock().is_empty() || gateway.sends.lock().is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        drop(sender);
        task.await.unwrap().unwrap();

        assert_eq!(runtime.session().identity(), Some(&Identity::new("42", "ferrite")));
        assert_eq!(
            runtime.stats(),
            StatsSnapshot {
                received: 4,
                dispatched: 3,
                failed: 0
            }
        );
        assert!(gateway.closed.load(Ordering::SeqCst));

        let calls = gateway.calls.lock();
        assert_eq!(calls[0], ("/channels/9/messages".to_string(), json!({"content": "hello"})));
        let sends = gateway.sends.lock();
        assert_eq!(sends[0].0, 3);
        assert_eq!(sends[0].1["game"]["name"], "with alice");
    }

    #[tokio::test]
    async fn test_failures_are_counted_and_skipped() {
        let runtime = runtime();
        let (connector, _) = ScriptedConnector::new(
            vec![
                InboundEvent::of(EventKind::Ready, json!({"user": "nobody"})),
                ready(),
            ],
            false,
        );

        runtime.run_with(&connector).await.unwrap();

        assert!(runtime.session().is_ready());
        assert_eq!(
            runtime.stats(),
            StatsSnapshot {
                received: 2,
                dispatched: 2,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_registered_handler_overrides_default() {
        let runtime = runtime();
        let seen = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&seen);
        runtime.register(
            EventKind::Ready,
            handler_fn(move |_event| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        let (connector, _) = ScriptedConnector::new(vec![ready()], false);
        runtime.run_with(&connector).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(!runtime.session().is_ready());
    }

    #[tokio::test]
    async fn test_shutdown_token_stops_open_stream() {
        let runtime = Arc::new(runtime());
        let (connector, sender) = ScriptedConnector::new(vec![ready()], true);
        let token = runtime.shutdown_token();

        let task = {
            let runtime = Arc::clone(&runtime);
            tokio::spawn(async move { runtime.run_with(&connector).await })
        };

        tokio::time::timeout(Duration::from_secs(1), async {
            while !runtime.session().is_ready() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        drop(sender);
    }

    #[tokio::test]
    async fn test_connect_failure_is_returned() {
        let err = runtime().run_with(&FailingConnector).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_shared_gateway_without_connection() {
        let gateway = SharedGateway::default();
        assert!(matches!(
            gateway.call(Method::Post, "/x", json!({})).await,
            Err(ApiError::NotConnected)
        ));
        assert!(matches!(
            gateway.send(3, json!({})).await,
            Err(TransportError::NotAvailable { .. })
        ));
    }

    #[test]
    fn test_builder_with_explicit_token() {
        let runtime = FerriteRuntime::builder()
            .search_path(tempfile::tempdir().unwrap().path())
            .without_env()
            .token("abc")
            .build()
            .unwrap();

        assert_eq!(runtime.gateway_config().token, "abc");
        assert_eq!(runtime.rest_config().token, "abc");
        assert_eq!(
            runtime.rest_config().endpoint("/gateway/bot"),
            "https://discord.com/api/v10/gateway/bot"
        );
    }

    #[test]
    fn test_builder_missing_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FerriteRuntime::builder()
            .search_path(dir.path())
            .without_env()
            .token_file(dir.path().join("token.dat"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RuntimeError::Token(TokenError::Missing { .. })));
    }
}
