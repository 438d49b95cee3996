//! Terminal rendering of the countdown.

use std::io::{IsTerminal, Write};

use chrono::Local;
use pomocycle_core::{DisplaySurface, SessionType, TimerSnapshot};

pub struct TerminalDisplay {
    bell: bool,
    inline: bool,
}

impl TerminalDisplay {
    pub fn new(notifications_enabled: bool, bell: bool) -> Self {
        Self {
            bell: notifications_enabled && bell,
            inline: std::io::stdout().is_terminal(),
        }
    }

    pub fn line(snapshot: &TimerSnapshot) -> String {
        let state = if snapshot.is_running { "running" } else { "paused" };
        format!(
            "{:<11} {}  [{}]  sessions: {}",
            snapshot.session_label, snapshot.remaining, state, snapshot.completed_work_sessions
        )
    }
}

impl DisplaySurface for TerminalDisplay {
    fn render(&mut self, snapshot: &TimerSnapshot) {
        let mut out = std::io::stdout().lock();
        let line = Self::line(snapshot);
        // Overwrite in place on a tty, one line per frame otherwise.
        let _ = if self.inline {
            write!(out, "\r{line}")
        } else {
            writeln!(out, "{line}")
        };
        let _ = out.flush();
    }

    fn notify_completion(&mut self, from: SessionType, to: SessionType) {
        let bell = if self.bell { "\x07" } else { "" };
        let lead = if self.inline { "\n" } else { "" };
        println!(
            "{lead}[{}] {from} complete, starting {to}{bell}",
            Local::now().format("%H:%M:%S")
        );
    }
}
