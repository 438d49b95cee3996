use std::time::Duration;

use clap::Subcommand;
use pomocycle_core::storage::StateStore;
use pomocycle_core::timer::TimerDriver;
use pomocycle_core::{Config, DisplaySurface, Event, SessionController};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::display::TerminalDisplay;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Start the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Start if paused, pause if running
    Toggle,
    /// Rewind the current session
    Reset,
    /// Jump to the next session
    Skip,
    /// Advance the countdown by whole seconds
    Tick {
        /// Number of one-second ticks to apply
        #[arg(long, default_value = "1")]
        count: u64,
    },
    /// Run a live countdown in the foreground
    ///
    /// Commands on stdin: `p` start/pause, `r` reset, `s` skip, `q` quit.
    Run {
        /// Override the tick period in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Quit after this many sessions ran out on their own
        #[arg(long)]
        max_completions: Option<u32>,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the event, or the unchanged state when the call was a no-op.
fn print_outcome(
    event: Option<Event>,
    controller: &SessionController,
) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => print_json(&event),
        None => print_json(&controller.snapshot_event()),
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = StateStore::open()?;
    let (mut controller, missed) = store.load_or_new(config.timer_config()?)?;
    for event in &missed {
        tracing::info!(?event, "session completed while no countdown was attached");
    }

    match action {
        TimerAction::Status => print_json(&controller.snapshot_event())?,
        TimerAction::Start => {
            let event = controller.start();
            print_outcome(event, &controller)?;
        }
        TimerAction::Pause => {
            let event = controller.pause();
            print_outcome(event, &controller)?;
        }
        TimerAction::Toggle => {
            let event = controller.toggle();
            print_outcome(event, &controller)?;
        }
        TimerAction::Reset => {
            let event = controller.reset();
            print_outcome(event, &controller)?;
        }
        TimerAction::Skip => {
            let event = controller.skip();
            print_outcome(event, &controller)?;
        }
        TimerAction::Tick { count } => {
            let mut completed = missed;
            completed.extend((0..count).filter_map(|_| controller.tick()));
            print_json(&json!({
                "snapshot": controller.snapshot(),
                "completed": completed,
            }))?;
        }
        TimerAction::Run {
            interval_ms,
            max_completions,
        } => {
            let period = interval_ms
                .map(|ms| Duration::from_millis(ms.max(1)))
                .unwrap_or_else(|| config.tick_period());
            let display = TerminalDisplay::new(config.notifications.enabled, config.notifications.bell);
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(run_live(controller, period, display, max_completions));
            // A pending stdin read would otherwise hold up shutdown.
            runtime.shutdown_background();
            controller = result?;
        }
    }

    store.save(&controller)?;
    Ok(())
}

async fn run_live(
    controller: SessionController,
    period: Duration,
    mut display: TerminalDisplay,
    max_completions: Option<u32>,
) -> Result<SessionController, Box<dyn std::error::Error>> {
    let (mut driver, mut events) = TimerDriver::new(controller, period);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut completions = 0u32;

    display.render(&driver.snapshot());
    driver.start();
    tracing::debug!(?period, "live countdown started");

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if let Event::StateSnapshot { snapshot, .. } = &event {
                    display.render(snapshot);
                }
                display.handle_event(&event);
                if event.is_completion() {
                    completions += 1;
                    if max_completions.is_some_and(|max| completions >= max) {
                        break;
                    }
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    // Keep counting down without input.
                    stdin_open = false;
                    continue;
                };
                match line.trim() {
                    "p" | "" => { driver.toggle(); }
                    "r" => { driver.reset(); }
                    "s" => { driver.skip(); }
                    "q" => break,
                    other => {
                        eprintln!("unknown command '{other}' (p: start/pause, r: reset, s: skip, q: quit)");
                        continue;
                    }
                }
                display.render(&driver.snapshot());
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    driver.shutdown();
    println!();
    Ok(driver.controller())
}
