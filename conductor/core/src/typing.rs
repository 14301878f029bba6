//! Typing Animator
//!
//! Reveals a finished answer one character per tick, the way the chat widget
//! "types" its replies, and lets the user stop it midway.
//!
//! # State machine
//!
//! ```text
//!            start(full_text)
//!   Idle ───────────────────────▶ Running ──┐ tick: reveal one char
//!    ▲                              │  ▲    │
//!    │                              │  └────┘
//!    │        cancel flag seen      │        revealed == full_text
//!    │     ┌────────────────────────┴──────────────────┐
//!    │     ▼                                           ▼
//!    └── Cancelling                                Completing
//!        revealed + INTERRUPTION_MARKER            full_text
//! ```
//!
//! Each tick checks, in order: the cancel flag, then completion, then reveals
//! exactly one more `char`. `Completing` and `Cancelling` last for the tick
//! that produces the [`FinishedTyping`]; the animator is `Idle` again when
//! [`TypingAnimator::tick`] returns.
//!
//! # Cancellation
//!
//! [`CancelHandle::request`] only sets an atomic flag. The flag is read once,
//! at the start of the next tick, so a request made between ticks `k` and
//! `k + 1` stops with exactly `k` characters revealed. A request made from
//! another thread while tick `k + 1` is already past its flag check lets that
//! one character through: the stored prefix holds `k` or `k + 1` characters,
//! never more.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Appended to whatever was revealed when a reveal is cancelled
pub const INTERRUPTION_MARKER: &str = " \n\n_Resposta interrompida._";

/// Default time between reveal ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(3);

/// Animator states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorState {
    /// No active session
    Idle,
    /// Revealing one character per tick
    Running,
    /// Handing the full text over
    Completing,
    /// Handing the interrupted prefix over
    Cancelling,
}

/// Shared cancellation flag for the active typing session
///
/// Cloning shares the flag; it can be handed to another task or thread.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Ask the active session to stop at the next tick boundary
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The in-flight reveal of one answer
#[derive(Clone, Debug)]
pub struct TypingSession {
    full_text: String,
    /// Byte length of the revealed prefix, always on a char boundary
    revealed_len: usize,
    cancel: CancelHandle,
}

impl TypingSession {
    fn new(full_text: String, cancel: CancelHandle) -> Self {
        Self {
            full_text,
            revealed_len: 0,
            cancel,
        }
    }

    /// The complete answer
    #[must_use]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// The prefix revealed so far
    #[must_use]
    pub fn revealed(&self) -> &str {
        &self.full_text[..self.revealed_len]
    }

    /// Number of characters revealed so far
    #[must_use]
    pub fn revealed_chars(&self) -> usize {
        self.revealed().chars().count()
    }

    /// Whether cancellation has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_requested()
    }

    fn is_complete(&self) -> bool {
        self.revealed_len == self.full_text.len()
    }

    fn reveal_next(&mut self) {
        if let Some(ch) = self.full_text[self.revealed_len..].chars().next() {
            self.revealed_len += ch.len_utf8();
        }
    }

    fn into_interrupted_text(mut self) -> String {
        self.full_text.truncate(self.revealed_len);
        self.full_text.push_str(INTERRUPTION_MARKER);
        self.full_text
    }
}

/// A typing session that reached a terminal transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishedTyping {
    /// Text to store: the full answer, or the revealed prefix plus the marker
    pub text: String,
    /// Whether the session was cancelled
    pub interrupted: bool,
    /// Characters revealed when the session ended
    pub revealed_chars: usize,
}

/// Result of one tick
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    /// No session is running
    Idle,
    /// One more character was revealed
    Revealed,
    /// The session ended and the animator is Idle again
    Finished(FinishedTyping),
}

/// Owns the single active [`TypingSession`] and advances it
#[derive(Debug)]
pub struct TypingAnimator {
    state: AnimatorState,
    session: Option<TypingSession>,
    cancel: CancelHandle,
    tick_interval: Duration,
    next_tick_at: Option<Instant>,
}

impl Default for TypingAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl TypingAnimator {
    /// Create an idle animator with the given cadence
    #[must_use]
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            state: AnimatorState::Idle,
            session: None,
            cancel: CancelHandle::default(),
            tick_interval,
            next_tick_at: None,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> AnimatorState {
        self.state
    }

    /// Whether a session is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == AnimatorState::Running
    }

    /// The active session, if any
    #[must_use]
    pub fn session(&self) -> Option<&TypingSession> {
        self.session.as_ref()
    }

    /// Time between ticks
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// A handle that can cancel the active session from anywhere
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Begin revealing `full_text`
    ///
    /// Returns `false`, leaving the running session untouched, if a session
    /// is already active.
    pub fn start(&mut self, full_text: impl Into<String>) -> bool {
        if self.state != AnimatorState::Idle {
            tracing::warn!(state = ?self.state, "Typing session already active, refusing to start another");
            return false;
        }

        let full_text = full_text.into();
        tracing::debug!(chars = full_text.chars().count(), "Typing session started");

        self.cancel.reset();
        self.session = Some(TypingSession::new(full_text, self.cancel.clone()));
        self.state = AnimatorState::Running;
        self.next_tick_at = Some(Instant::now() + self.tick_interval);
        true
    }

    /// Request cancellation of the active session
    ///
    /// Returns `false` when nothing is running.
    pub fn request_cancel(&self) -> bool {
        if self.state != AnimatorState::Running {
            return false;
        }
        self.cancel.request();
        true
    }

    /// Advance the active session by one tick
    pub fn tick(&mut self) -> Tick {
        if self.state != AnimatorState::Running {
            return Tick::Idle;
        }
        let Some(mut session) = self.session.take() else {
            self.state = AnimatorState::Idle;
            return Tick::Idle;
        };

        if session.is_cancelled() {
            self.state = AnimatorState::Cancelling;
            return self.finish(session, true);
        }

        if session.is_complete() {
            self.state = AnimatorState::Completing;
            return self.finish(session, false);
        }

        session.reveal_next();
        self.session = Some(session);
        Tick::Revealed
    }

    /// Number of ticks whose deadline has passed at `now`, at most `max`
    ///
    /// Consumes those deadlines. When more than `max` are overdue the backlog
    /// is dropped and the cadence restarts from `now`.
    pub fn due_ticks(&mut self, now: Instant, max: u32) -> u32 {
        if self.state != AnimatorState::Running {
            return 0;
        }
        let Some(next) = self.next_tick_at else {
            return 0;
        };
        if now < next {
            return 0;
        }

        let max = max.max(1);
        if self.tick_interval.is_zero() {
            return max;
        }

        let behind = (now - next).as_nanos() / self.tick_interval.as_nanos();
        let due = u32::try_from(behind)
            .unwrap_or(u32::MAX)
            .saturating_add(1);

        if due > max {
            self.next_tick_at = Some(now + self.tick_interval);
            max
        } else {
            self.next_tick_at = Some(next + self.tick_interval * due);
            due
        }
    }

    fn finish(&mut self, session: TypingSession, interrupted: bool) -> Tick {
        let revealed_chars = session.revealed_chars();
        tracing::debug!(state = ?self.state, revealed_chars, "Typing session finished");

        let text = if interrupted {
            session.into_interrupted_text()
        } else {
            session.full_text
        };

        self.cancel.reset();
        self.next_tick_at = None;
        self.state = AnimatorState::Idle;

        Tick::Finished(FinishedTyping {
            text,
            interrupted,
            revealed_chars,
        })
    }
}
