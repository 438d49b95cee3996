//! JSON snapshot of the controller between one-shot CLI invocations.
//!
//! A running controller has no tick source while it sits on disk, so the
//! file records the wall-clock instant the countdown was exact at. Loading
//! applies one tick per whole second elapsed since then; the leftover
//! fraction carries over to the next save.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::events::Event;
use crate::timer::{SessionController, TimerConfig};

#[derive(Debug, Serialize, Deserialize)]
struct SavedTimer {
    controller: SessionController,
    /// Epoch milliseconds the countdown in `controller` was exact at.
    saved_at_ms: u64,
}

pub struct StateStore {
    path: PathBuf,
    /// Exact-at instant of a controller loaded while running.
    anchor_ms: Cell<Option<u64>>,
}

impl StateStore {
    pub fn open() -> Result<Self> {
        Ok(Self::in_dir(&data_dir()?))
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join("timer.json"),
            anchor_ms: Cell::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved controller caught up to now, or a fresh one built from
    /// `config` if nothing has been saved yet. Completions that happened
    /// while nobody was watching are returned alongside.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_new(&self, config: TimerConfig) -> Result<(SessionController, Vec<Event>)> {
        self.load_at(config, now_ms())
    }

    pub fn load_at(&self, config: TimerConfig, now_ms: u64) -> Result<(SessionController, Vec<Event>)> {
        self.anchor_ms.set(None);
        let saved = match std::fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str::<SavedTimer>(&json)
                .map_err(|e| ConfigError::ParseFailed(format!("{}: {e}", self.path.display())))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no saved timer, starting fresh");
                return Ok((SessionController::new(config), Vec::new()));
            }
            Err(err) => return Err(err.into()),
        };
        saved.controller.config().validate()?;

        let mut controller = saved.controller;
        let mut completed = Vec::new();
        if controller.is_running() {
            let elapsed_secs = now_ms.saturating_sub(saved.saved_at_ms) / 1000;
            for _ in 0..elapsed_secs {
                completed.extend(controller.tick());
            }
            if elapsed_secs > 0 {
                tracing::debug!(elapsed_secs, "caught up saved timer");
            }
            self.anchor_ms
                .set(Some(saved.saved_at_ms.saturating_add(elapsed_secs.saturating_mul(1000))));
        }
        Ok((controller, completed))
    }

    pub fn save(&self, controller: &SessionController) -> Result<()> {
        self.save_at(controller, now_ms())
    }

    /// Keeps the sub-second remainder for a controller that was loaded
    /// running and is still running.
    pub fn save_at(&self, controller: &SessionController, now_ms: u64) -> Result<()> {
        let saved_at_ms = match self.anchor_ms.get() {
            Some(anchor) if controller.is_running() => anchor,
            _ => now_ms,
        };
        let saved = SavedTimer {
            controller: controller.clone(),
            saved_at_ms,
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&saved)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::timer::SessionType;

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn missing_file_yields_fresh_controller() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::in_dir(dir.path());
        let config = TimerConfig::new(50, 10, 30, 2).unwrap();
        let (c, completed) = store.load_or_new(config).unwrap();
        assert_eq!(c.seconds_remaining(), 50 * 60);
        assert_eq!(c.config(), &config);
        assert!(completed.is_empty());
    }

    #[test]
    fn paused_timer_ignores_wall_clock() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::in_dir(dir.path());
        let mut c = SessionController::default();
        c.skip();
        store.save_at(&c, T0).unwrap();

        let (loaded, _) = store.load_at(TimerConfig::default(), T0 + 3_600_000).unwrap();
        assert_eq!(loaded.session_type(), SessionType::ShortBreak);
        assert_eq!(loaded.seconds_remaining(), 300);
    }

    #[test]
    fn running_timer_catches_up_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::in_dir(dir.path());
        let mut c = SessionController::default();
        c.start();
        store.save_at(&c, T0).unwrap();

        let (loaded, completed) = store.load_at(TimerConfig::default(), T0 + 7_400).unwrap();
        assert_eq!(loaded.seconds_remaining(), 1493);
        assert!(loaded.is_running());
        assert!(completed.is_empty());
    }

    #[test]
    fn catch_up_reports_missed_completion() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::in_dir(dir.path());
        let mut c = SessionController::default();
        c.start();
        store.save_at(&c, T0).unwrap();

        let (loaded, completed) = store
            .load_at(TimerConfig::default(), T0 + 1_510_000)
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert!(completed[0].is_completion());
        assert_eq!(loaded.session_type(), SessionType::ShortBreak);
        assert_eq!(loaded.seconds_remaining(), 290);
    }

    #[test]
    fn sub_second_remainder_survives_quick_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::in_dir(dir.path());
        let mut c = SessionController::default();
        c.start();
        store.save_at(&c, T0).unwrap();

        // Three status checks 600 ms apart add up to one second.
        for step in 1..=3u64 {
            let now = T0 + step * 600;
            let (loaded, _) = store.load_at(TimerConfig::default(), now).unwrap();
            store.save_at(&loaded, now).unwrap();
        }
        let (loaded, _) = store.load_at(TimerConfig::default(), T0 + 1_800).unwrap();
        assert_eq!(loaded.seconds_remaining(), 1499);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::in_dir(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(
            store.load_or_new(TimerConfig::default()),
            Err(CoreError::Config(ConfigError::ParseFailed(_)))
        ));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::in_dir(dir.path());
        store.save(&SessionController::default()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
    }
}
