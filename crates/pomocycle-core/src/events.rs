use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::display::TimerSnapshot;
use crate::timer::{SessionType, TimerConfig};

/// Every state change in the controller produces an Event.
/// The display surface consumes them; `SessionCompleted` is the cue for the
/// completion notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_type: SessionType,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        session_type: SessionType,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        session_type: SessionType,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    /// Manual jump to the next session. Never accompanied by a notification.
    SessionSkipped {
        from: SessionType,
        to: SessionType,
        completed_work_sessions: u32,
        at: DateTime<Utc>,
    },
    /// The countdown ran out and the next session started on its own.
    SessionCompleted {
        from: SessionType,
        to: SessionType,
        completed_work_sessions: u32,
        at: DateTime<Utc>,
    },
    ConfigUpdated {
        config: TimerConfig,
        /// Whether the untouched current session picked up the new duration.
        countdown_recomputed: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        snapshot: TimerSnapshot,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::SessionCompleted { .. })
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SessionStarted { at, .. }
            | Event::SessionPaused { at, .. }
            | Event::SessionReset { at, .. }
            | Event::SessionSkipped { at, .. }
            | Event::SessionCompleted { at, .. }
            | Event::ConfigUpdated { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}
