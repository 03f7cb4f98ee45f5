//! Transport connectivity transitions and the monitor that reports them.
//!
//! [`ConnectivitySignal`] is fed the current [`LinkState`] by whoever owns the
//! transport and fires handlers only on an actual change. The
//! [`ConnectivityMonitor`] registers exactly one handler per [`Transition`]
//! and keeps the returned [`HandlerHandle`]s, so teardown removes precisely
//! the handlers it installed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::dispatcher::NotificationDispatcher;
use crate::notification::NotificationEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down,
}

/// A change of [`LinkState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Down to up.
    Restored,
    /// Up to down.
    Lost,
}

/// Callback fired on one kind of transition.
pub type TransitionHandler = Arc<dyn Fn(Transition) + Send + Sync>;

/// Identity of one registration, returned by [`ConnectivitySignal::on`].
#[derive(Debug, PartialEq, Eq)]
pub struct HandlerHandle {
    id: u64,
    transition: Transition,
}

struct SignalState {
    link: LinkState,
    handlers: Vec<(u64, Transition, TransitionHandler)>,
    next_id: u64,
}

/// Current link state plus the handlers interested in its transitions.
pub struct ConnectivitySignal {
    state: Mutex<SignalState>,
}

impl ConnectivitySignal {
    pub fn new(initial: LinkState) -> Self {
        Self {
            state: Mutex::new(SignalState {
                link: initial,
                handlers: Vec::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> LinkState {
        self.lock().link
    }

    /// Register `handler` for `transition`.
    pub fn on(&self, transition: Transition, handler: TransitionHandler) -> HandlerHandle {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.handlers.push((id, transition, handler));
        HandlerHandle { id, transition }
    }

    /// Remove the registration identified by `handle`.
    ///
    /// Returns `false` if that registration is no longer present.
    pub fn off(&self, handle: &HandlerHandle) -> bool {
        let mut state = self.lock();
        let before = state.handlers.len();
        state
            .handlers
            .retain(|(id, t, _)| !(*id == handle.id && *t == handle.transition));
        state.handlers.len() != before
    }

    /// Number of handlers currently registered for `transition`.
    pub fn handler_count(&self, transition: Transition) -> usize {
        self.lock()
            .handlers
            .iter()
            .filter(|(_, t, _)| *t == transition)
            .count()
    }

    /// Record the current link state, firing handlers if it changed.
    ///
    /// Handlers run after the internal lock is released.
    pub fn set_state(&self, link: LinkState) -> Option<Transition> {
        let (transition, handlers) = {
            let mut state = self.lock();
            if state.link == link {
                return None;
            }
            state.link = link;
            let transition = match link {
                LinkState::Up => Transition::Restored,
                LinkState::Down => Transition::Lost,
            };
            let handlers: Vec<TransitionHandler> = state
                .handlers
                .iter()
                .filter(|(_, t, _)| *t == transition)
                .map(|(_, _, h)| Arc::clone(h))
                .collect();
            (transition, handlers)
        };

        tracing::info!(?transition, "Connectivity changed");
        for handler in handlers {
            handler(transition);
        }
        Some(transition)
    }
}

/// Feeds connectivity transitions into the notification dispatcher.
///
/// Detaches on [`detach`](Self::detach) or on drop, whichever comes first.
pub struct ConnectivityMonitor {
    signal: Arc<ConnectivitySignal>,
    handles: Option<(HandlerHandle, HandlerHandle)>,
}

impl ConnectivityMonitor {
    /// Register one handler per transition kind on `signal`.
    pub fn attach(signal: Arc<ConnectivitySignal>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        let handler: TransitionHandler = Arc::new(move |transition| {
            let connected = transition == Transition::Restored;
            dispatcher.notify(NotificationEvent::connection_status(connected));
        });

        let restored = signal.on(Transition::Restored, Arc::clone(&handler));
        let lost = signal.on(Transition::Lost, handler);

        Self {
            signal,
            handles: Some((restored, lost)),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.handles.is_some()
    }

    /// Remove the exact handlers installed by [`attach`](Self::attach).
    pub fn detach(&mut self) {
        if let Some((restored, lost)) = self.handles.take() {
            self.signal.off(&restored);
            self.signal.off(&lost);
            tracing::debug!("Connectivity monitor detached");
        }
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.detach();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::notification::{NotificationType, Priority};
    use crate::sound::testing::RecordingSink;
    use crate::sound::AudioCue;

    fn dispatcher() -> Arc<NotificationDispatcher> {
        let cue = AudioCue::new(Arc::new(RecordingSink::default()));
        Arc::new(NotificationDispatcher::new(cue, true))
    }

    #[test]
    fn set_state_fires_only_on_change() {
        let signal = ConnectivitySignal::new(LinkState::Down);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        signal.on(
            Transition::Restored,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(signal.set_state(LinkState::Up), Some(Transition::Restored));
        assert_eq!(signal.set_state(LinkState::Up), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn off_removes_only_the_given_registration() {
        let signal = ConnectivitySignal::new(LinkState::Up);
        let noop: TransitionHandler = Arc::new(|_| {});
        let a = signal.on(Transition::Lost, noop.clone());
        let _b = signal.on(Transition::Lost, noop);

        assert!(signal.off(&a));
        assert!(!signal.off(&a));
        assert_eq!(signal.handler_count(Transition::Lost), 1);
    }

    #[test]
    fn monitor_registers_one_handler_per_transition() {
        let signal = Arc::new(ConnectivitySignal::new(LinkState::Up));
        let _monitor = ConnectivityMonitor::attach(signal.clone(), dispatcher());

        assert_eq!(signal.handler_count(Transition::Restored), 1);
        assert_eq!(signal.handler_count(Transition::Lost), 1);
    }

    #[test]
    fn transitions_become_normal_priority_notifications() {
        let signal = Arc::new(ConnectivitySignal::new(LinkState::Up));
        let d = dispatcher();
        let _monitor = ConnectivityMonitor::attach(signal.clone(), d.clone());

        signal.set_state(LinkState::Down);
        signal.set_state(LinkState::Up);

        let list = d.notifications();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].message, "Connection restored");
        assert_eq!(list[1].message, "Connection lost");
        assert!(list.iter().all(|n| n.kind == NotificationType::ConnectionStatus));
        assert!(list.iter().all(|n| n.priority == Priority::Normal));
    }

    #[test]
    fn detach_removes_the_registered_handlers() {
        let signal = Arc::new(ConnectivitySignal::new(LinkState::Up));
        let d = dispatcher();
        let mut monitor = ConnectivityMonitor::attach(signal.clone(), d.clone());

        monitor.detach();
        monitor.detach();
        assert!(!monitor.is_attached());
        assert_eq!(signal.handler_count(Transition::Restored), 0);
        assert_eq!(signal.handler_count(Transition::Lost), 0);

        signal.set_state(LinkState::Down);
        assert!(d.notifications().is_empty());
    }

    #[test]
    fn drop_detaches() {
        let signal = Arc::new(ConnectivitySignal::new(LinkState::Up));
        {
            let _monitor = ConnectivityMonitor::attach(signal.clone(), dispatcher());
        }
        assert_eq!(signal.handler_count(Transition::Lost), 0);
    }
}
