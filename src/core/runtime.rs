use std::{
    pin::pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::{
    sync::{Notify, broadcast, mpsc, watch},
    task::JoinHandle,
};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::core::{
    action::{Action, Phase},
    effects::{Effects, WriteKey},
    reducer::AppState,
    resource::ResourceKind,
    service::{Backend, LatencyProfile, ServiceError, SimulatedBackend, StateReader},
};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Buffered notifications per subscriber before the oldest are dropped.
    pub notification_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            notification_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NotificationLevel,
    pub kind: ResourceKind,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

impl Notification {
    fn new(level: NotificationLevel, kind: ResourceKind, message: String) -> Self {
        Self {
            level,
            kind,
            message,
            at: OffsetDateTime::now_utc(),
        }
    }

    fn from_error(kind: ResourceKind, err: &ServiceError) -> Self {
        let level = if err.is_transport() {
            NotificationLevel::Error
        } else {
            NotificationLevel::Warning
        };
        Self::new(level, kind, err.to_string())
    }

    // Also covers failures only the reducer sees, like an update for a
    // record deleted in the meantime.
    fn for_action(action: &Action, next: &AppState) -> Option<Self> {
        if let Some(err) = action.error() {
            return Some(Self::from_error(action.kind(), err));
        }
        if action.phase() != Phase::Succeeded {
            return None;
        }
        let message = next.error(action.kind())?;
        Some(Self::new(NotificationLevel::Warning, action.kind(), message.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Pending(Arc<PendingInner>);

#[derive(Debug, Default)]
struct PendingInner {
    count: AtomicUsize,
    idle: Notify,
}

impl Pending {
    fn guard(&self) -> PendingGuard {
        self.0.count.fetch_add(1, Ordering::SeqCst);
        PendingGuard(self.clone())
    }

    async fn idle(&self) {
        loop {
            let mut notified = pin!(self.0.idle.notified());
            notified.as_mut().enable();
            if self.0.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

#[derive(Debug)]
pub(crate) struct PendingGuard(Pending);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.0.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.0.idle.notify_waiters();
        }
    }
}

pub(crate) enum Origin {
    External,
    /// Settlement of a load; dropped if the token was cancelled meanwhile.
    Load(CancellationToken),
    /// Settlement of an update or delete holding the record's write slot.
    Write(WriteKey),
    Effect,
}

struct Envelope {
    action: Action,
    origin: Origin,
    _pending: PendingGuard,
}

#[derive(Clone)]
pub(crate) struct Dispatcher {
    tx: mpsc::UnboundedSender<Envelope>,
    pending: Pending,
}

impl Dispatcher {
    pub(crate) fn send(&self, action: Action, origin: Origin) {
        let envelope = Envelope {
            action,
            origin,
            _pending: self.pending.guard(),
        };
        if let Err(mpsc::error::SendError(envelope)) = self.tx.send(envelope) {
            tracing::debug!(action = %envelope.action.name(), "store closed, dropping action");
        }
    }

    pub(crate) fn guard(&self) -> PendingGuard {
        self.pending.guard()
    }
}

/// Owns the dispatch loop. Dropping the store without [`Store::shutdown`]
/// leaves the loop running until the runtime stops.
pub struct Store {
    handle: StoreHandle,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl Store {
    /// `make_backend` receives a read-only view of the canonical state.
    pub fn new<B, F>(initial: AppState, config: StoreConfig, make_backend: F) -> Self
    where
        B: Backend,
        F: FnOnce(StateReader) -> B,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(Arc::new(initial));
        let (notify_tx, _) = broadcast::channel(config.notification_capacity.max(1));
        let dispatcher = Dispatcher {
            tx,
            pending: Pending::default(),
        };

        let backend = make_backend(StateReader::new(state_rx.clone()));
        let effects = Effects::new(backend, dispatcher.clone());
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run(rx, state_tx, notify_tx.clone(), effects, shutdown.clone()));

        tracing::debug!(?config, "store started");
        Self {
            handle: StoreHandle {
                dispatcher,
                state: state_rx,
                notifications: notify_tx,
            },
            shutdown,
            task,
        }
    }

    pub fn simulated(config: StoreConfig, latency: LatencyProfile) -> Self {
        Self::new(AppState::default(), config, |state| {
            SimulatedBackend::new(state, latency)
        })
    }

    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Stops the loop. Actions still queued and effects still in flight are
    /// discarded.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(err) = self.task.await {
            tracing::error!(%err, "dispatch loop ended abnormally");
        }
    }
}

async fn run<B: Backend>(
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    state_tx: watch::Sender<Arc<AppState>>,
    notify_tx: broadcast::Sender<Notification>,
    mut effects: Effects<B>,
    shutdown: CancellationToken,
) {
    let mut state = state_tx.borrow().clone();
    loop {
        let envelope = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            envelope = rx.recv() => match envelope {
                Some(envelope) => envelope,
                None => break,
            },
        };
        let Envelope {
            action,
            origin,
            _pending,
        } = envelope;

        if let Origin::Load(token) = &origin
            && token.is_cancelled()
        {
            tracing::debug!(action = %action.name(), "dropping result of superseded load");
            continue;
        }

        tracing::trace!(action = %action.name(), "reduce");
        let prev = Arc::clone(&state);
        state = Arc::new(prev.reduce(&action));
        state_tx.send_replace(Arc::clone(&state));

        if let Some(notice) = Notification::for_action(&action, &state) {
            tracing::warn!(action = %action.name(), message = %notice.message, "request failed");
            // No receivers is fine.
            let _ = notify_tx.send(notice);
        }

        effects.handle(&action, &prev, &state);
        if let Origin::Write(key) = &origin {
            effects.release(key);
        }
    }
    tracing::debug!("dispatch loop stopped");
}

#[derive(Clone)]
pub struct StoreHandle {
    dispatcher: Dispatcher,
    state: watch::Receiver<Arc<AppState>>,
    notifications: broadcast::Sender<Notification>,
}

impl StoreHandle {
    pub fn dispatch(&self, action: impl Into<Action>) {
        self.dispatcher.send(action.into(), Origin::External);
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.borrow().clone()
    }

    pub fn select<T>(&self, selector: impl FnOnce(&AppState) -> T) -> T {
        selector(&self.state.borrow())
    }

    pub fn watch(&self) -> watch::Receiver<Arc<AppState>> {
        self.state.clone()
    }

    /// Calls `callback` with the current projection and again whenever it
    /// changes. Stops when the returned [`Subscription`] is dropped.
    pub fn subscribe<T, S, F>(&self, selector: S, mut callback: F) -> Subscription
    where
        T: PartialEq + Send + 'static,
        S: Fn(&AppState) -> T + Send + 'static,
        F: FnMut(&T) + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let mut rx = self.state.clone();
        tokio::spawn(async move {
            let state = rx.borrow_and_update().clone();
            let mut last = selector(&state);
            callback(&last);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    changed = rx.changed() => if changed.is_err() { break },
                }
                let state = rx.borrow_and_update().clone();
                let value = selector(&state);
                if value != last {
                    callback(&value);
                    last = value;
                }
            }
        });
        Subscription {
            _guard: token.drop_guard(),
        }
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Waits until every dispatched action and every effect it started has settled.
    pub async fn settled(&self) {
        self.dispatcher.pending.idle().await;
    }
}

#[must_use = "the subscription ends when this is dropped"]
pub struct Subscription {
    _guard: DropGuard,
}
