use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Work => "Work",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionType::Work)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// User-editable durations for the session cycle.
///
/// Durations are in minutes. Every field must be positive; use
/// [`TimerConfig::new`] or [`TimerConfig::validate`] before handing a value
/// to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    /// Work sessions between long breaks.
    pub sessions_before_long_break: u32,
}

impl TimerConfig {
    pub const FIELDS: [&'static str; 4] = [
        "work_duration",
        "short_break_duration",
        "long_break_duration",
        "sessions_before_long_break",
    ];

    pub fn new(
        work_duration: u32,
        short_break_duration: u32,
        long_break_duration: u32,
        sessions_before_long_break: u32,
    ) -> Result<Self> {
        let config = Self {
            work_duration,
            short_break_duration,
            long_break_duration,
            sessions_before_long_break,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject any field that is zero.
    pub fn validate(&self) -> Result<()> {
        for field in Self::FIELDS {
            let value = self.field(field).unwrap_or(0);
            if value == 0 {
                return Err(CoreError::invalid_configuration(field, value));
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<u32> {
        match name {
            "work_duration" => Some(self.work_duration),
            "short_break_duration" => Some(self.short_break_duration),
            "long_break_duration" => Some(self.long_break_duration),
            "sessions_before_long_break" => Some(self.sessions_before_long_break),
            _ => None,
        }
    }

    /// Return a copy with `name` set from raw user input.
    ///
    /// Input that is not an integer, or is zero or negative, is reported as
    /// [`CoreError::InvalidConfiguration`].
    pub fn with_field(&self, name: &str, raw: &str) -> Result<Self> {
        let value = parse_positive(name, raw)?;
        let mut next = *self;
        match name {
            "work_duration" => next.work_duration = value,
            "short_break_duration" => next.short_break_duration = value,
            "long_break_duration" => next.long_break_duration = value,
            "sessions_before_long_break" => next.sessions_before_long_break = value,
            _ => return Err(CoreError::invalid_configuration(name, raw)),
        }
        Ok(next)
    }

    pub fn duration_min(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Work => self.work_duration,
            SessionType::ShortBreak => self.short_break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }

    /// Configured length of `session` in seconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn duration_secs(&self, session: SessionType) -> u64 {
        u64::from(self.duration_min(session)).saturating_mul(60)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            sessions_before_long_break: 4,
        }
    }
}

fn parse_positive(field: &str, raw: &str) -> Result<u32> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => u32::try_from(n).map_err(|_| CoreError::invalid_configuration(field, raw)),
        _ => Err(CoreError::invalid_configuration(field, raw)),
    }
}
