//! Session runtime: an actor task that owns the session store, the
//! navigation guard and the grace timer.
//!
//! Everything that reads or changes session state goes through one
//! command channel, and the timer is just another branch of the same
//! `select!` loop. A grace expiry therefore never lands in the middle of
//! a login or a navigation decision: whichever comes first runs to
//! completion before the other starts.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tollgate_guard::{GuardConfig, Navigation, NavigationGuard};
use tollgate_session::{
    Clock, Issuer, LoginPayload, RegisterPayload, Registration, SessionConfig, SessionError,
    SessionRecord, SessionStore, TrustState,
};
use tollgate_storage::Repository;
use tollgate_timer::GraceTimer;
use tollgate_token::Credential;
use tracing::{debug, info};

use crate::TollgateError;

/// Bound on queued commands. Senders wait when it fills up.
const DEFAULT_CHANNEL_SIZE: usize = 32;

/// A navigation the runtime started on its own, without the user asking.
///
/// Published when the grace period ends: the user is sent to the login
/// view wherever they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedNavigation {
    pub to: String,
}

/// Commands sent to the session actor. Most carry a reply channel.
enum Command {
    Register {
        payload: RegisterPayload,
        reply: oneshot::Sender<Result<Registration, SessionError>>,
    },
    Login {
        payload: LoginPayload,
        reply: oneshot::Sender<Result<Credential, SessionError>>,
    },
    Logout {
        reply: oneshot::Sender<()>,
    },
    Restore {
        reply: oneshot::Sender<TrustState>,
    },
    Navigate {
        to: String,
        from: String,
        reply: oneshot::Sender<Navigation>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionRecord>,
    },
    Shutdown,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Entry point for starting a session runtime.
///
/// # Example
///
/// ```rust,ignore
/// use tollgate::prelude::*;
///
/// let (session, mut forced) = SessionRuntime::builder()
///     .guard_config(GuardConfig::default())
///     .spawn(HttpIssuer::new(IssuerConfig::from_env()?), MemoryRepository::new(), SystemClock);
///
/// match session.navigate("/dashboard", "/").await? {
///     Navigation::Allow => { /* render */ }
///     Navigation::Redirect(path) => { /* go to path */ }
/// }
/// ```
pub struct SessionRuntime;

impl SessionRuntime {
    pub fn builder() -> SessionRuntimeBuilder {
        SessionRuntimeBuilder::new()
    }
}

/// Configures and spawns a session runtime.
#[derive(Debug, Clone)]
pub struct SessionRuntimeBuilder {
    session_config: SessionConfig,
    guard_config: GuardConfig,
    channel_size: usize,
}

impl SessionRuntimeBuilder {
    pub fn new() -> Self {
        Self {
            session_config: SessionConfig::default(),
            guard_config: GuardConfig::default(),
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn guard_config(mut self, config: GuardConfig) -> Self {
        self.guard_config = config;
        self
    }

    /// Command queue capacity. Values below 1 are raised to 1.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.channel_size = size.max(1);
        self
    }

    /// Spawns the actor on the current Tokio runtime.
    ///
    /// The actor restores the persisted session before it handles any
    /// command, and arms the grace timer if a grace period is live.
    ///
    /// Returns the handle for talking to the actor and the stream of
    /// [`ForcedNavigation`]s the router should follow.
    ///
    /// # Panics
    /// Outside a Tokio runtime, like `tokio::spawn`.
    pub fn spawn<I, R, C>(
        self,
        issuer: I,
        repository: R,
        clock: C,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<ForcedNavigation>)
    where
        I: Issuer,
        R: Repository,
        C: Clock,
    {
        let (tx, rx) = mpsc::channel(self.channel_size);
        let (forced_tx, forced_rx) = mpsc::unbounded_channel();

        let actor = SessionActor {
            store: SessionStore::new(issuer, repository, clock, self.session_config),
            guard: NavigationGuard::new(self.guard_config),
            timer: GraceTimer::new(),
            receiver: rx,
            forced: forced_tx,
        };
        tokio::spawn(actor.run());

        (SessionHandle { sender: tx }, forced_rx)
    }
}

impl Default for SessionRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running session actor.
///
/// Cheap to clone: it is just an `mpsc::Sender` wrapper. Every method
/// fails with [`TollgateError::RuntimeClosed`] once the actor has
/// stopped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Registers an account and starts the grace period.
    pub async fn register(&self, payload: RegisterPayload) -> Result<Registration, TollgateError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Register { payload, reply }, rx)
            .await?
            .map_err(TollgateError::from)
    }

    /// Logs in. The error, if any, displays "Invalid username or password".
    pub async fn login(&self, payload: LoginPayload) -> Result<Credential, TollgateError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Login { payload, reply }, rx)
            .await?
            .map_err(TollgateError::from)
    }

    pub async fn logout(&self) -> Result<(), TollgateError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Logout { reply }, rx).await
    }

    /// Re-reads persisted state and classifies it.
    pub async fn restore(&self) -> Result<TrustState, TollgateError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Restore { reply }, rx).await
    }

    /// Asks whether the router may move from `from` to `to`.
    pub async fn navigate(&self, to: &str, from: &str) -> Result<Navigation, TollgateError> {
        let (reply, rx) = oneshot::channel();
        let cmd = Command::Navigate {
            to: to.to_string(),
            from: from.to_string(),
            reply,
        };
        self.request(cmd, rx).await
    }

    /// A copy of the current in-memory session record.
    pub async fn snapshot(&self) -> Result<SessionRecord, TollgateError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Snapshot { reply }, rx).await
    }

    /// Stops the actor. Commands already queued are dropped.
    pub async fn shutdown(&self) -> Result<(), TollgateError> {
        self.sender
            .send(Command::Shutdown)
            .await
            .map_err(|_| TollgateError::RuntimeClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request<T>(
        &self,
        cmd: Command,
        reply: oneshot::Receiver<T>,
    ) -> Result<T, TollgateError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| TollgateError::RuntimeClosed)?;
        reply.await.map_err(|_| TollgateError::RuntimeClosed)
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct SessionActor<I, R, C> {
    store: SessionStore<I, R, C>,
    guard: NavigationGuard,
    timer: GraceTimer,
    receiver: mpsc::Receiver<Command>,
    forced: mpsc::UnboundedSender<ForcedNavigation>,
}

impl<I, R, C> SessionActor<I, R, C>
where
    I: Issuer,
    R: Repository,
    C: Clock,
{
    async fn run(mut self) {
        let trust = self.store.restore();
        info!(trust = %trust, "session runtime started");
        self.sync_timer(&trust);

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle(cmd).await {
                        break;
                    }
                }
                () = self.timer.wait_for_expiry() => {
                    self.on_grace_expired();
                }
            }
        }

        info!("session runtime stopped");
    }

    /// Returns `false` when the actor should stop.
    async fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Register { payload, reply } => {
                let result = self.store.register(payload).await;
                if result.is_ok() {
                    let trust = self.store.restore();
                    self.sync_timer(&trust);
                }
                let _ = reply.send(result);
            }
            Command::Login { payload, reply } => {
                let result = self.store.login(payload).await;
                if result.is_ok() {
                    self.timer.cancel();
                }
                let _ = reply.send(result);
            }
            Command::Logout { reply } => {
                self.store.logout();
                self.timer.cancel();
                let _ = reply.send(());
            }
            Command::Restore { reply } => {
                let trust = self.store.restore();
                self.sync_timer(&trust);
                let _ = reply.send(trust);
            }
            Command::Navigate { to, from, reply } => {
                let (trust, navigation) = self.guard.evaluate_with_trust(&mut self.store, &to, &from);
                self.sync_timer(&trust);
                let _ = reply.send(navigation);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.store.record().clone());
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn on_grace_expired(&mut self) {
        let trust = self.store.restore();
        self.store.clear_grace();
        if trust.is_authenticated() {
            debug!("grace timer fired for a logged-in session, not forcing login");
            return;
        }
        let to = self.guard.config().login_path.clone();
        info!(to = %to, "grace period ended, forcing login");
        if self.forced.send(ForcedNavigation { to }).is_err() {
            debug!("nobody is listening for forced navigations");
        }
    }

    /// Keeps the timer armed exactly while a grace period is live.
    fn sync_timer(&mut self, trust: &TrustState) {
        match trust {
            TrustState::Grace { deadline_ms, .. } => self.arm_until(*deadline_ms),
            TrustState::Anonymous | TrustState::Authenticated { .. } | TrustState::Expired => {
                self.timer.cancel();
            }
        }
    }

    fn arm_until(&mut self, deadline_ms: i64) {
        let left = deadline_ms.saturating_sub(self.store.clock().now_millis());
        let remaining = Duration::from_millis(u64::try_from(left).unwrap_or(0));
        self.timer.arm(remaining);
    }
}
