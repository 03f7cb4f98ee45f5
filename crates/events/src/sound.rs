//! Audible alert cue with first-wins overlap suppression.
//!
//! [`AudioCue`] guards a single [`CueSink`] with an "is playing" flag. A play
//! request that arrives while a cue is still sounding is dropped, not queued,
//! so a burst of alerts produces one cue instead of an overlapping storm.
//! The flag is held as a deadline (`playing_until`) and expires on its own,
//! so no timer task is needed to clear it.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How long a single cue sounds.
pub const DEFAULT_CUE_DURATION: Duration = Duration::from_millis(200);

/// Errors raised by a cue sink. Always logged, never surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Audio I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio output unavailable: {0}")]
    Unavailable(String),
}

/// Something that can start an audible cue.
///
/// `start` must return promptly; the cue is considered to be sounding for
/// `duration` after a successful start.
pub trait CueSink: Send + Sync {
    fn start(&self, duration: Duration) -> Result<(), AudioError>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl CueSink for TerminalBell {
    fn start(&self, _duration: Duration) -> Result<(), AudioError> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

/// What happened to a play request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueOutcome {
    /// The cue started.
    Played,
    /// Another cue was still sounding; this request was discarded.
    Dropped,
    /// The sink failed; the flag was left clear.
    Failed,
}

/// A single cue resource with at most one cue in flight.
pub struct AudioCue {
    sink: Arc<dyn CueSink>,
    duration: Duration,
    playing_until: Mutex<Option<Instant>>,
}

impl AudioCue {
    pub fn new(sink: Arc<dyn CueSink>) -> Self {
        Self {
            sink,
            duration: DEFAULT_CUE_DURATION,
            playing_until: Mutex::new(None),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether a previously started cue is still sounding.
    pub fn is_playing(&self) -> bool {
        let until = self
            .playing_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        until.is_some_and(|t| Instant::now() < t)
    }

    /// Start the cue unless one is already sounding.
    pub fn play(&self) -> CueOutcome {
        let mut until = self
            .playing_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        if until.is_some_and(|t| now < t) {
            tracing::debug!("Alert cue already playing, request dropped");
            return CueOutcome::Dropped;
        }

        match self.sink.start(self.duration) {
            Ok(()) => {
                *until = Some(now + self.duration);
                CueOutcome::Played
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to play notification sound");
                *until = None;
                CueOutcome::Failed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------
