//! Notification and connectivity infrastructure.
//!
//! This crate provides the user-facing alerting building blocks:
//!
//! - [`NotificationDispatcher`] - the process-wide notification list with
//!   full-snapshot listeners and the high-priority sound policy.
//! - [`AudioCue`] - a single cue resource guarded by a first-wins
//!   "is playing" flag, driving a pluggable [`CueSink`].
//! - [`ConnectivitySignal`] / [`ConnectivityMonitor`] - transport up/down
//!   transitions turned into connection-status notifications.
//!
//! Everything here is synchronous and runtime-agnostic; the relay server and
//! the consumer-side monitor each construct their own dispatcher once and
//! pass it by `Arc` to the components that need it.

pub mod connectivity;
pub mod dispatcher;
pub mod notification;
pub mod sound;

pub use connectivity::{ConnectivityMonitor, ConnectivitySignal, LinkState, Transition};
pub use dispatcher::{NotificationDispatcher, SubscriptionToken};
pub use notification::{Notification, NotificationEvent, NotificationId, NotificationType, Priority};
pub use sound::{AudioCue, AudioError, CueOutcome, CueSink, TerminalBell};
