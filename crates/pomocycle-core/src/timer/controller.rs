//! Session cycle controller.
//!
//! The controller is a tick-driven state machine. It does not use internal
//! threads - the caller (usually [`super::TimerDriver`]) calls `tick()` once
//! per elapsed second while the timer runs.
//!
//! ## State Transitions
//!
//! ```text
//! (Work, Paused) -start-> (Work, Running) -expiry-> (ShortBreak|LongBreak, Running)
//!                                          -skip---> (ShortBreak|LongBreak, Paused)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut controller = SessionController::new(TimerConfig::default());
//! controller.start();
//! // Once per second:
//! if let Some(event) = controller.tick() {
//!     // session completed, play a notification
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::cycle::{self, TimerState};
use super::session::{SessionType, TimerConfig};
use crate::display::TimerSnapshot;
use crate::error::Result;
use crate::events::Event;

/// Owns the [`TimerState`] and [`TimerConfig`] pair.
///
/// The operations below are the only way to mutate either. Each returns the
/// [`Event`] describing the change, or `None` when the call was a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionController {
    config: TimerConfig,
    state: TimerState,
}

impl SessionController {
    /// Create a paused controller at the start of the first work session.
    ///
    /// `config` must already be validated, either built with
    /// [`TimerConfig::new`] or checked with [`TimerConfig::validate`].
    /// Use [`SessionController::try_new`] for values straight from the user.
    /// Debug builds panic on a zero field.
    pub fn new(config: TimerConfig) -> Self {
        debug_assert!(
            config.validate().is_ok(),
            "SessionController::new given an unvalidated config: {config:?}"
        );
        Self {
            state: TimerState::new(&config),
            config,
        }
    }

    /// Like [`SessionController::new`], but rejects a config with a zero field.
    pub fn try_new(config: TimerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn session_type(&self) -> SessionType {
        self.state.session_type
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.state.seconds_remaining
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.state.completed_work_sessions
    }

    pub fn total_secs(&self) -> u64 {
        self.config.duration_secs(self.state.session_type)
    }

    /// 0.0 .. 1.0 progress within the current session.
    pub fn session_progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.state.seconds_remaining as f64 / total as f64)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from(&self.state)
    }

    /// Build a full state snapshot event.
    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            snapshot: self.snapshot(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_running {
            tracing::debug!("start ignored: already running");
            return None;
        }
        self.state.is_running = true;
        tracing::debug!(
            session = %self.state.session_type,
            seconds_remaining = self.state.seconds_remaining,
            "session started"
        );
        Some(Event::SessionStarted {
            session_type: self.state.session_type,
            seconds_remaining: self.state.seconds_remaining,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running {
            tracing::debug!("pause ignored: not running");
            return None;
        }
        self.state.is_running = false;
        tracing::debug!(seconds_remaining = self.state.seconds_remaining, "session paused");
        Some(Event::SessionPaused {
            session_type: self.state.session_type,
            seconds_remaining: self.state.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Start if paused, pause if running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.state.is_running {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.state = cycle::reset(self.state, &self.config);
        tracing::debug!(session = %self.state.session_type, "session reset");
        Some(Event::SessionReset {
            session_type: self.state.session_type,
            seconds_remaining: self.state.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Move to the next session now. No completion notification.
    pub fn skip(&mut self) -> Option<Event> {
        let (state, transition) = cycle::skip(self.state, &self.config);
        self.state = state;
        tracing::debug!(
            from = %transition.from,
            to = %transition.to,
            completed_work_sessions = transition.completed_work_sessions,
            "session skipped"
        );
        Some(Event::SessionSkipped {
            from: transition.from,
            to: transition.to,
            completed_work_sessions: transition.completed_work_sessions,
            at: Utc::now(),
        })
    }

    /// Call once per elapsed second. Returns `Some(Event::SessionCompleted)`
    /// when the countdown ran out and the next session began.
    pub fn tick(&mut self) -> Option<Event> {
        let (state, transition) = cycle::tick(self.state, &self.config);
        self.state = state;
        let transition = transition?;
        tracing::info!(
            from = %transition.from,
            to = %transition.to,
            completed_work_sessions = transition.completed_work_sessions,
            "session completed"
        );
        Some(Event::SessionCompleted {
            from: transition.from,
            to: transition.to,
            completed_work_sessions: transition.completed_work_sessions,
            at: Utc::now(),
        })
    }

    /// Replace the config.
    ///
    /// An untouched session (paused, full duration remaining) picks up the new
    /// duration at once; a session with progress keeps its countdown until
    /// the next transition.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidConfiguration`] if any field is zero.
    /// Neither the config nor the state changes in that case.
    pub fn update_config(&mut self, config: TimerConfig) -> Result<Event> {
        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "rejected timer configuration");
            return Err(err);
        }
        let recompute = self.state.is_untouched(&self.config);
        self.config = config;
        if recompute {
            self.state.seconds_remaining = self.config.duration_secs(self.state.session_type);
        }
        tracing::debug!(countdown_recomputed = recompute, "timer configuration updated");
        Ok(Event::ConfigUpdated {
            config,
            countdown_recomputed: recompute,
            at: Utc::now(),
        })
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_pause_toggle() {
        let mut c = SessionController::default();
        assert!(!c.is_running());

        assert!(c.start().is_some());
        assert!(c.is_running());

        assert!(c.pause().is_some());
        assert!(!c.is_running());

        assert!(matches!(c.toggle(), Some(Event::SessionStarted { .. })));
        assert!(matches!(c.toggle(), Some(Event::SessionPaused { .. })));
    }

    #[test]
    fn second_start_and_pause_are_noops() {
        let mut c = SessionController::default();
        c.start();
        let before = c.clone();
        assert!(c.start().is_none());
        assert_eq!(c, before);

        c.pause();
        let before = c.clone();
        assert!(c.pause().is_none());
        assert_eq!(c, before);
    }

    #[test]
    fn pause_keeps_remaining_time() {
        let mut c = SessionController::default();
        c.start();
        c.tick();
        c.pause();
        assert_eq!(c.snapshot().remaining, "24:59");
        c.tick();
        assert_eq!(c.snapshot().remaining, "24:59");
    }

    #[test]
    fn reset_after_progress() {
        let mut c = SessionController::default();
        c.start();
        for _ in 0..3 {
            c.tick();
        }
        assert_eq!(c.snapshot().remaining, "24:57");
        c.reset();
        assert_eq!(c.snapshot().remaining, "25:00");
        assert!(!c.is_running());
    }

    #[test]
    fn skip_from_fresh_controller() {
        let mut c = SessionController::default();
        let event = c.skip().unwrap();
        assert!(!event.is_completion());
        assert_eq!(c.session_type(), SessionType::ShortBreak);
        assert_eq!(c.snapshot().remaining, "05:00");
        assert_eq!(c.completed_work_sessions(), 1);
    }

    #[test]
    fn update_config_recomputes_untouched_session() {
        let mut c = SessionController::default();
        let event = c
            .update_config(TimerConfig::new(30, 10, 20, 3).unwrap())
            .unwrap();
        assert!(matches!(
            event,
            Event::ConfigUpdated {
                countdown_recomputed: true,
                ..
            }
        ));
        assert_eq!(c.seconds_remaining(), 30 * 60);
    }

    #[test]
    fn update_config_leaves_running_countdown() {
        let mut c = SessionController::default();
        c.start();
        c.tick();
        c.update_config(TimerConfig::new(30, 10, 20, 3).unwrap())
            .unwrap();
        assert_eq!(c.seconds_remaining(), 25 * 60 - 1);
        assert_eq!(c.config().work_duration, 30);
    }

    #[test]
    fn update_config_leaves_paused_partial_countdown() {
        let mut c = SessionController::default();
        c.start();
        c.tick();
        c.pause();
        c.update_config(TimerConfig::new(30, 10, 20, 3).unwrap())
            .unwrap();
        assert_eq!(c.seconds_remaining(), 25 * 60 - 1);
    }

    #[test]
    fn new_config_applies_at_next_transition() {
        let mut c = SessionController::default();
        c.start();
        c.tick();
        c.update_config(TimerConfig::new(30, 10, 20, 3).unwrap())
            .unwrap();
        c.skip();
        assert_eq!(c.session_type(), SessionType::ShortBreak);
        assert_eq!(c.seconds_remaining(), 10 * 60);
    }

    #[test]
    fn invalid_config_changes_nothing() {
        let mut c = SessionController::default();
        c.start();
        c.tick();
        let before = c.clone();
        let bad = TimerConfig {
            long_break_duration: 0,
            ..TimerConfig::default()
        };
        let err = c.update_config(bad).unwrap_err();
        assert!(err.is_invalid_configuration());
        assert_eq!(c, before);
    }

    #[test]
    fn try_new_rejects_zero() {
        let bad = TimerConfig {
            sessions_before_long_break: 0,
            ..TimerConfig::default()
        };
        assert!(SessionController::try_new(bad).is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unvalidated config")]
    fn new_with_zero_field_panics_in_debug() {
        let bad = TimerConfig {
            work_duration: 0,
            ..TimerConfig::default()
        };
        let _ = SessionController::new(bad);
    }

    #[test]
    fn snapshot_event_reports_state() {
        let c = SessionController::default();
        match c.snapshot_event() {
            Event::StateSnapshot { snapshot, .. } => {
                assert_eq!(snapshot.session_type, SessionType::Work);
                assert_eq!(snapshot.seconds_remaining, 1500);
                assert_eq!(snapshot.remaining, "25:00");
                assert!(!snapshot.is_running);
                assert_eq!(snapshot.completed_work_sessions, 0);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn progress_within_session() {
        let mut c = SessionController::new(TimerConfig::new(1, 1, 1, 4).unwrap());
        assert_eq!(c.session_progress(), 0.0);
        c.start();
        for _ in 0..30 {
            c.tick();
        }
        assert!((c.session_progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn controller_roundtrips_through_json() {
        let mut c = SessionController::default();
        c.start();
        c.tick();
        let json = serde_json::to_string(&c).unwrap();
        let restored: SessionController = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, c);
    }
}
