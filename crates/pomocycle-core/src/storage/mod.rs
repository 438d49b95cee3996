mod config;
mod state;

pub use config::{Config, DriverConfig, NotificationsConfig, TimerSection};
pub use state::StateStore;

use std::path::PathBuf;

use crate::error::Result;

/// Returns the directory holding `config.toml` and `timer.json`.
///
/// `POMOCYCLE_HOME` wins when set. Otherwise `~/.config/pomocycle`, or
/// `~/.config/pomocycle-dev` when `POMOCYCLE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOCYCLE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOCYCLE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomocycle-dev")
            } else {
                base_dir.join("pomocycle")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
