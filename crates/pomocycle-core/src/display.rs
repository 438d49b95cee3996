//! Read-only view of the controller for whatever renders it.
//!
//! The controller never plays sounds or draws anything. A [`DisplaySurface`]
//! receives [`TimerSnapshot`]s and the event stream and decides how to present
//! them.

use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::timer::{SessionType, TimerState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub session_type: SessionType,
    pub session_label: String,
    pub seconds_remaining: u64,
    /// `MM:SS`
    pub remaining: String,
    pub is_running: bool,
    pub completed_work_sessions: u32,
}

impl From<&TimerState> for TimerSnapshot {
    fn from(state: &TimerState) -> Self {
        Self {
            session_type: state.session_type,
            session_label: state.session_type.label().to_string(),
            seconds_remaining: state.seconds_remaining,
            remaining: format_remaining(state.seconds_remaining),
            is_running: state.is_running,
            completed_work_sessions: state.completed_work_sessions,
        }
    }
}

/// Zero-padded `MM:SS`. Minutes are not wrapped into hours.
pub fn format_remaining(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub trait DisplaySurface {
    fn render(&mut self, snapshot: &TimerSnapshot);

    /// Audible or visual cue for a session that ran out on its own.
    fn notify_completion(&mut self, from: SessionType, to: SessionType);

    /// Route an event to the surface. Only natural completions notify.
    fn handle_event(&mut self, event: &Event) {
        if let Event::SessionCompleted { from, to, .. } = event {
            self.notify_completion(*from, *to);
        }
    }
}
