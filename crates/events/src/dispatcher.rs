//! Process-wide notification dispatcher.
//!
//! [`NotificationDispatcher`] owns the notification list (newest first) and
//! a set of listeners. Every mutation pushes the **full** current list to
//! every listener; there is no incremental diff. Construct one instance at
//! startup and share it via `Arc<NotificationDispatcher>`; tests build their
//! own isolated instances.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use sensorhub_events::{AudioCue, NotificationDispatcher, NotificationEvent, NotificationType, TerminalBell};
//!
//! let dispatcher = NotificationDispatcher::new(AudioCue::new(Arc::new(TerminalBell)), false);
//! let token = dispatcher.subscribe(|list| println!("{} notifications", list.len()));
//!
//! dispatcher.notify(NotificationEvent::new(NotificationType::SystemStatus, "Started"));
//! dispatcher.unsubscribe(token);
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::notification::{Notification, NotificationEvent, NotificationId, Priority};
use crate::sound::{AudioCue, CueOutcome};

/// Callback receiving the full notification list after every mutation.
pub type Listener = Arc<dyn Fn(&[Notification]) + Send + Sync>;

/// Handle returned by [`NotificationDispatcher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

struct State {
    /// Newest first.
    notifications: Vec<Notification>,
    listeners: BTreeMap<u64, Listener>,
    next_listener: u64,
    sound_enabled: bool,
}

/// The notification list, its listeners, and the sound policy.
///
/// Listeners run while the internal lock is held so that every listener
/// observes snapshots in mutation order. A listener must therefore not call
/// back into the dispatcher.
pub struct NotificationDispatcher {
    state: Mutex<State>,
    next_id: AtomicU64,
    cue: AudioCue,
}

impl NotificationDispatcher {
    /// Create a dispatcher driving `cue`, with the given sound-enabled flag.
    pub fn new(cue: AudioCue, sound_enabled: bool) -> Self {
        Self {
            state: Mutex::new(State {
                notifications: Vec::new(),
                listeners: BTreeMap::new(),
                next_listener: 1,
                sound_enabled,
            }),
            next_id: AtomicU64::new(1),
            cue,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener. It is not called until the next mutation.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionToken
    where
        F: Fn(&[Notification]) + Send + Sync + 'static,
    {
        let mut state = self.lock();
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.insert(id, Arc::new(listener));
        SubscriptionToken(id)
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.lock().listeners.remove(&token.0).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Record a new notification at the head of the list.
    ///
    /// Plays the audio cue iff the event is high priority, not silent, and
    /// sound is enabled; the cue itself drops requests while one is sounding.
    pub fn notify(&self, event: NotificationEvent) -> Notification {
        let id: NotificationId = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification::from_event(id, event);

        let sound_enabled = {
            let mut state = self.lock();
            state.notifications.insert(0, notification.clone());
            Self::publish(&state);
            state.sound_enabled
        };

        tracing::info!(
            id,
            kind = ?notification.kind,
            priority = ?notification.priority,
            message = %notification.message,
            "Notification created"
        );

        let wants_cue =
            notification.priority == Priority::High && !notification.silent && sound_enabled;
        if wants_cue && self.cue.play() == CueOutcome::Played {
            tracing::debug!(id, "Alert cue played");
        }

        notification
    }

    /// Mark one notification as read. Listeners are notified either way;
    /// returns whether the id was found.
    pub fn mark_as_read(&self, id: NotificationId) -> bool {
        let mut state = self.lock();
        let found = match state.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        };
        Self::publish(&state);
        found
    }

    pub fn mark_all_as_read(&self) {
        let mut state = self.lock();
        for n in state.notifications.iter_mut() {
            n.read = true;
        }
        Self::publish(&state);
    }

    pub fn clear_all(&self) {
        let mut state = self.lock();
        state.notifications.clear();
        Self::publish(&state);
    }

    /// Takes effect on the next [`notify`](Self::notify).
    pub fn set_sound_enabled(&self, enabled: bool) {
        self.lock().sound_enabled = enabled;
    }

    pub fn sound_enabled(&self) -> bool {
        self.lock().sound_enabled
    }

    /// Copy of the current list, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    pub fn unread_count(&self) -> usize {
        self.lock().notifications.iter().filter(|n| !n.read).count()
    }

    fn publish(state: &State) {
        for listener in state.listeners.values() {
            listener(&state.notifications);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
