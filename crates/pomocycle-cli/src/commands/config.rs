use clap::Subcommand;
use pomocycle_core::storage::StateStore;
use pomocycle_core::{Config, TimerConfig};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.work_duration", "notifications.bell")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

/// Hand new timer settings to the saved controller.
fn apply_to_saved_timer(timer: TimerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateStore::open()?;
    let (mut controller, _) = store.load_or_new(timer)?;
    controller.update_config(timer)?;
    store.save(&controller)?;
    Ok(())
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if key.starts_with("timer.") {
                // A hand-edited file may still hold other zero fields.
                match config.timer_config() {
                    Ok(timer) => apply_to_saved_timer(timer)?,
                    Err(e) => eprintln!("warning: timer left unchanged: {e}"),
                }
            }
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            apply_to_saved_timer(config.timer_config()?)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
