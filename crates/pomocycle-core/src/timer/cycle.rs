//! Pure session-cycle functions.
//!
//! Every function here maps `(TimerState, &TimerConfig)` to a new state, so the
//! transition logic can be tested without a clock or a controller.
//!
//! ```text
//! Work --(n-th completion, n % k != 0)--> ShortBreak --> Work
//! Work --(n-th completion, n % k == 0)--> LongBreak  --> Work
//! ```

use serde::{Deserialize, Serialize};

use super::session::{SessionType, TimerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub session_type: SessionType,
    pub seconds_remaining: u64,
    pub is_running: bool,
    pub completed_work_sessions: u32,
}

impl TimerState {
    /// Paused at the start of the first work session.
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            session_type: SessionType::Work,
            seconds_remaining: config.duration_secs(SessionType::Work),
            is_running: false,
            completed_work_sessions: 0,
        }
    }

    /// True when the current session has not counted down at all.
    pub fn is_untouched(&self, config: &TimerConfig) -> bool {
        !self.is_running && self.seconds_remaining == config.duration_secs(self.session_type)
    }
}

/// A session boundary crossed by [`tick`] or [`skip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: SessionType,
    pub to: SessionType,
    pub completed_work_sessions: u32,
}

/// Session that follows `current`, and the updated work-session count.
///
/// Total over any config: a zero `sessions_before_long_break` counts as 1.
pub fn next_session(
    current: SessionType,
    completed_work_sessions: u32,
    config: &TimerConfig,
) -> (SessionType, u32) {
    match current {
        SessionType::Work => {
            let completed = completed_work_sessions.saturating_add(1);
            let every = config.sessions_before_long_break.max(1);
            if completed % every == 0 {
                (SessionType::LongBreak, completed)
            } else {
                (SessionType::ShortBreak, completed)
            }
        }
        SessionType::ShortBreak | SessionType::LongBreak => {
            (SessionType::Work, completed_work_sessions)
        }
    }
}

/// Advance into the next session. Leaves `is_running` as it was.
fn complete(state: TimerState, config: &TimerConfig) -> (TimerState, Transition) {
    let (next, completed) = next_session(state.session_type, state.completed_work_sessions, config);
    let transition = Transition {
        from: state.session_type,
        to: next,
        completed_work_sessions: completed,
    };
    let state = TimerState {
        session_type: next,
        seconds_remaining: config.duration_secs(next),
        completed_work_sessions: completed,
        ..state
    };
    (state, transition)
}

/// One elapsed second.
///
/// A paused state is returned unchanged. When the countdown runs out the
/// next session begins in the same tick and keeps running.
pub fn tick(state: TimerState, config: &TimerConfig) -> (TimerState, Option<Transition>) {
    if !state.is_running {
        return (state, None);
    }
    if state.seconds_remaining <= 1 {
        let (state, transition) = complete(state, config);
        return (state, Some(transition));
    }
    let state = TimerState {
        seconds_remaining: state.seconds_remaining - 1,
        ..state
    };
    (state, None)
}

/// Jump to the next session without waiting for the countdown. The next
/// session starts paused.
pub fn skip(state: TimerState, config: &TimerConfig) -> (TimerState, Transition) {
    let (state, transition) = complete(state, config);
    (
        TimerState {
            is_running: false,
            ..state
        },
        transition,
    )
}

/// Stop and rewind the current session.
pub fn reset(state: TimerState, config: &TimerConfig) -> TimerState {
    TimerState {
        seconds_remaining: config.duration_secs(state.session_type),
        is_running: false,
        ..state
    }
}
