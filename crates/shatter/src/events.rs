//! # SHATTER Event Bus
//!
//! Synchronous publish/subscribe between gameplay subsystems.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐                    ┌─────────────┐
//! │   Spawner   │──EntitySpawned────>│             │──> ScoreKeeper
//! │             │──EntityDestroyed──>│  EventBus   │──> EffectsDirector
//! │             │──EntityHit────────>│             │──> host (audio, UI)
//! └─────────────┘                    └─────────────┘
//!       ^                                   │
//!       └──────GameStarted / GameOver───────┘
//! ```
//!
//! A bus is an explicit value owned by the session. Clones share the same
//! subscriber table, so collaborators hold a clone instead of a global.
//!
//! Delivery rules:
//! - `publish` snapshots the channel's subscribers before invoking anyone
//! - subscribers run in subscription order, each at most once per publish
//! - a failing or panicking subscriber is recorded, the rest still run
//! - subscribe/unsubscribe/publish are all legal from inside a callback

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use shatter_core::EntityId;
use shatter_shared::Vec2;
use tracing::warn;

use crate::error::{DeliveryError, HandlerError};
use crate::gameplay::EntityRef;
use crate::session::GameState;

/// Events published on the bus.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    // =========================================================================
    // Entity Events (Spawner → score, effects, host)
    // =========================================================================
    /// A tracked entity was created (perimeter spawn or fragment).
    EntitySpawned(EntityRef),

    /// A tracked entity was destroyed. Fires exactly once per entity.
    EntityDestroyed(EntityRef),

    /// A tracked entity took damage and survived.
    EntityHit {
        /// Entity that was hit.
        id: EntityId,
        /// Where it was when hit.
        position: Vec2,
    },

    // =========================================================================
    // Session Events (Session → everyone)
    // =========================================================================
    /// Running score total.
    ScoreChanged(u64),

    /// The session entered a new state.
    GameStateChanged(GameState),

    /// A new game began.
    GameStarted,

    /// Play was paused.
    GamePaused,

    /// Play resumed after a pause.
    GameResumed,

    /// The game ended.
    GameOver,
}

impl GameEvent {
    /// Channel this event is delivered on.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        match self {
            Self::EntitySpawned(_) => Channel::EntitySpawned,
            Self::EntityDestroyed(_) => Channel::EntityDestroyed,
            Self::EntityHit { .. } => Channel::EntityHit,
            Self::ScoreChanged(_) => Channel::ScoreChanged,
            Self::GameStateChanged(_) => Channel::GameStateChanged,
            Self::GameStarted => Channel::GameStarted,
            Self::GamePaused => Channel::GamePaused,
            Self::GameResumed => Channel::GameResumed,
            Self::GameOver => Channel::GameOver,
        }
    }
}

/// Event category subscribers register for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// [`GameEvent::EntitySpawned`]
    EntitySpawned,
    /// [`GameEvent::EntityDestroyed`]
    EntityDestroyed,
    /// [`GameEvent::EntityHit`]
    EntityHit,
    /// [`GameEvent::ScoreChanged`]
    ScoreChanged,
    /// [`GameEvent::GameStateChanged`]
    GameStateChanged,
    /// [`GameEvent::GameStarted`]
    GameStarted,
    /// [`GameEvent::GamePaused`]
    GamePaused,
    /// [`GameEvent::GameResumed`]
    GameResumed,
    /// [`GameEvent::GameOver`]
    GameOver,
}

/// Identifies one subscription so it can be removed later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    channel: Channel,
    id: u64,
}

impl SubscriptionHandle {
    /// Channel the subscription listens on.
    #[inline]
    #[must_use]
    pub const fn channel(self) -> Channel {
        self.channel
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.channel, self.id)
    }
}

/// What one `publish` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Channel the event went out on.
    pub channel: Channel,
    /// Subscribers that ran to completion without error.
    pub delivered: usize,
    /// Subscribers that failed or were skipped.
    pub failures: Vec<(SubscriptionHandle, DeliveryError)>,
}

impl DeliveryReport {
    /// Whether every subscriber in the snapshot succeeded.
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

type Callback = Box<dyn FnMut(&GameEvent) -> Result<(), HandlerError> + Send>;

/// Shared so a snapshot can outlive an unsubscribe.
type SharedCallback = Arc<Mutex<Callback>>;

thread_local! {
    /// Callbacks currently running on this thread, keyed by address.
    static DELIVERING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

fn callback_key(callback: &SharedCallback) -> usize {
    Arc::as_ptr(callback) as usize
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Runs one callback, isolating its error or panic.
///
/// Re-entry is tracked per thread: a callback already running further up
/// this thread's stack is skipped, while one busy on another thread is
/// waited for.
fn invoke(callback: &SharedCallback, event: &GameEvent) -> Result<(), DeliveryError> {
    let key = callback_key(callback);
    if DELIVERING.with(|active| active.borrow().contains(&key)) {
        return Err(DeliveryError::Reentrant);
    }

    DELIVERING.with(|active| active.borrow_mut().push(key));
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut callback = callback.lock();
        (*callback)(event)
    }));
    DELIVERING.with(|active| active.borrow_mut().retain(|running| *running != key));

    match result {
        Ok(outcome) => outcome.map_err(DeliveryError::from),
        Err(payload) => Err(DeliveryError::Panicked(panic_reason(payload.as_ref()))),
    }
}

struct Subscriber {
    handle: SubscriptionHandle,
    callback: SharedCallback,
}

#[derive(Default)]
struct BusState {
    /// All subscribers, in subscription order.
    subscribers: Vec<Subscriber>,
    next_id: u64,
    published: u64,
    failures: u64,
}

/// Synchronous, in-process event bus.
///
/// # Thread Safety
///
/// The bus is `Send + Sync` so a session can move between threads, but
/// delivery is synchronous on the publishing thread. Publishing from two
/// threads at once serializes on each shared callback.
#[derive(Clone, Default)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for every event on `channel`.
    pub fn subscribe<F>(&self, channel: Channel, callback: F) -> SubscriptionHandle
    where
        F: FnMut(&GameEvent) -> Result<(), HandlerError> + Send + 'static,
    {
        let mut state = self.state.lock();
        let handle = SubscriptionHandle {
            channel,
            id: state.next_id,
        };
        state.next_id += 1;
        state.subscribers.push(Subscriber {
            handle,
            callback: Arc::new(Mutex::new(Box::new(callback))),
        });
        handle
    }

    /// Removes a subscription.
    ///
    /// Returns `false` if it was already gone. A publish that is already in
    /// flight still delivers to it once.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut state = self.state.lock();
        let before = state.subscribers.len();
        state.subscribers.retain(|sub| sub.handle != handle);
        state.subscribers.len() != before
    }

    /// Delivers `event` to every subscriber of its channel.
    ///
    /// Failures and panics are isolated per subscriber, logged and reported;
    /// they never stop delivery to the remaining subscribers.
    pub fn publish(&self, event: GameEvent) -> DeliveryReport {
        let channel = event.channel();

        // Snapshot under the lock, deliver without it.
        let recipients: Vec<(SubscriptionHandle, SharedCallback)> = {
            let mut state = self.state.lock();
            state.published += 1;
            state
                .subscribers
                .iter()
                .filter(|sub| sub.handle.channel == channel)
                .map(|sub| (sub.handle, Arc::clone(&sub.callback)))
                .collect()
        };

        let mut report = DeliveryReport {
            channel,
            delivered: 0,
            failures: Vec::new(),
        };

        for (handle, callback) in recipients {
            match invoke(&callback, &event) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(subscription = %handle, error = %err, "event handler failed");
                    report.failures.push((handle, err));
                }
            }
        }

        if !report.failures.is_empty() {
            self.state.lock().failures += report.failures.len() as u64;
        }

        report
    }

    /// Drops every subscriber on every channel.
    pub fn reset(&self) {
        self.state.lock().subscribers.clear();
    }

    /// Number of live subscriptions on `channel`.
    #[must_use]
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.state
            .lock()
            .subscribers
            .iter()
            .filter(|sub| sub.handle.channel == channel)
            .count()
    }

    /// Events published since the bus was created.
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.state.lock().published
    }

    /// Handler failures recorded since the bus was created.
    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.state.lock().failures
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EventBus")
            .field("subscribers", &state.subscribers.len())
            .field("published", &state.published)
            .finish_non_exhaustive()
    }
}

/// Subscriptions owned by one component, removed when it is dropped.
#[derive(Debug)]
pub struct Subscriptions {
    bus: EventBus,
    handles: Vec<SubscriptionHandle>,
}

impl Subscriptions {
    /// Creates an empty set bound to `bus`.
    #[must_use]
    pub fn new(bus: &EventBus) -> Self {
        Self {
            bus: bus.clone(),
            handles: Vec::new(),
        }
    }

    /// Subscribes and remembers the handle.
    pub fn add<F>(&mut self, channel: Channel, callback: F) -> SubscriptionHandle
    where
        F: FnMut(&GameEvent) -> Result<(), HandlerError> + Send + 'static,
    {
        let handle = self.bus.subscribe(channel, callback);
        self.handles.push(handle);
        handle
    }

    /// Handles held, in subscription order.
    #[must_use]
    pub fn handles(&self) -> &[SubscriptionHandle] {
        &self.handles
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        for handle in self.handles.drain(..) {
            self.bus.unsubscribe(handle);
        }
    }
}
