//! Periodic tick delivery for a [`SessionController`].
//!
//! The driver is the only tick source for the controller it owns. Each
//! `start()` on a running controller with no live task spawns one tokio task
//! tagged with a fresh generation number;
//! every other operation that stops the countdown bumps the generation and
//! aborts the task. A tick is applied only if, under the lock, the controller
//! is still running and the generation still matches, so nothing lands after
//! a `pause()` that came first.
//!
//! All events, including one [`Event::StateSnapshot`] per applied tick, are
//! published on an unbounded channel for the display surface.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use super::controller::SessionController;
use super::session::TimerConfig;
use crate::display::TimerSnapshot;
use crate::error::Result;
use crate::events::Event;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

#[derive(Debug)]
struct Shared {
    controller: SessionController,
    generation: u64,
}

pub struct TimerDriver {
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<Event>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl TimerDriver {
    /// Wrap `controller`. Returns the driver and the receiving end of its
    /// event stream.
    pub fn new(controller: SessionController, period: Duration) -> (Self, EventReceiver) {
        let (events, rx) = mpsc::unbounded_channel();
        let driver = Self {
            shared: Arc::new(Mutex::new(Shared {
                controller,
                generation: 0,
            })),
            events,
            period,
            task: None,
        };
        (driver, rx)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.lock().controller.snapshot()
    }

    /// Copy of the controller, e.g. for persisting between runs.
    pub fn controller(&self) -> SessionController {
        self.lock().controller.clone()
    }

    pub fn is_running(&self) -> bool {
        self.lock().controller.is_running()
    }

    /// Start ticking. The controller call is a no-op if it is already
    /// running, but a running controller without a live tick task (one
    /// handed to [`TimerDriver::new`] mid-session) gets one here.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Option<Event> {
        let event = self.lock().controller.start();
        if self.is_running() && !self.is_ticking() {
            self.spawn_ticks();
        }
        event.and_then(|e| self.publish(e))
    }

    /// True while a tick task is alive.
    pub fn is_ticking(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.stop_with(SessionController::pause);
        event.and_then(|e| self.publish(e))
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        let event = self.stop_with(SessionController::reset);
        event.and_then(|e| self.publish(e))
    }

    pub fn skip(&mut self) -> Option<Event> {
        let event = self.stop_with(SessionController::skip);
        event.and_then(|e| self.publish(e))
    }

    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidConfiguration`] without touching the
    /// controller if any field is zero.
    pub fn update_config(&mut self, config: TimerConfig) -> Result<Event> {
        let event = self.lock().controller.update_config(config)?;
        send_event(&self.events, event.clone());
        Ok(event)
    }

    /// Stop tick delivery for good. The controller keeps its last state.
    pub fn shutdown(&mut self) {
        self.lock().generation += 1;
        self.abort_task();
    }

    fn stop_with(&mut self, op: impl FnOnce(&mut SessionController) -> Option<Event>) -> Option<Event> {
        let event = {
            let mut shared = self.lock();
            shared.generation += 1;
            op(&mut shared.controller)
        };
        self.abort_task();
        event
    }

    fn spawn_ticks(&mut self) {
        let generation = {
            let mut shared = self.lock();
            shared.generation += 1;
            shared.generation
        };
        self.abort_task();
        self.task = Some(tokio::spawn(run_ticks(
            Arc::clone(&self.shared),
            self.events.clone(),
            self.period,
            generation,
        )));
    }

    fn publish(&self, event: Event) -> Option<Event> {
        send_event(&self.events, event.clone());
        Some(event)
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_ticks(
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<Event>,
    period: Duration,
    generation: u64,
) {
    let mut interval = interval_at(Instant::now() + period, period);
    loop {
        interval.tick().await;
        let (completed, snapshot) = {
            let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if shared.generation != generation || !shared.controller.is_running() {
                tracing::debug!(generation, "tick source retired");
                return;
            }
            let completed = shared.controller.tick();
            (completed, shared.controller.snapshot_event())
        };
        let delivered = completed.map_or(true, |event| send_event(&events, event));
        if !delivered || !send_event(&events, snapshot) {
            tracing::debug!(generation, "no event receiver, tick source retired");
            return;
        }
    }
}

/// Returns false once the receiving side is gone.
fn send_event(events: &mpsc::UnboundedSender<Event>, event: Event) -> bool {
    if events.send(event).is_err() {
        tracing::debug!("event receiver dropped");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SessionType;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::sleep;

    fn driver() -> (TimerDriver, EventReceiver) {
        TimerDriver::new(SessionController::default(), DEFAULT_TICK_PERIOD)
    }

    fn drain(rx: &mut EventReceiver) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let (mut driver, _rx) = driver();
        assert!(driver.start().is_some());
        sleep(Duration::from_millis(3500)).await;
        assert_eq!(driver.snapshot().seconds_remaining, 1497);
        assert_eq!(driver.snapshot().remaining, "24:57");
    }

    #[tokio::test(start_paused = true)]
    async fn wraps_controller_that_is_already_running() {
        let mut controller = SessionController::default();
        controller.start();
        let (mut driver, mut rx) = TimerDriver::new(controller, DEFAULT_TICK_PERIOD);
        assert!(driver.is_running());
        assert!(!driver.is_ticking());

        assert!(driver.start().is_none());
        assert!(driver.is_ticking());
        sleep(Duration::from_millis(5500)).await;
        assert_eq!(driver.snapshot().seconds_remaining, 1495);

        // No SessionStarted, only per-tick snapshots.
        let events = drain(&mut rx);
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| matches!(e, Event::StateSnapshot { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn tick_task_exits_when_receiver_dropped() {
        let (mut driver, rx) = driver();
        driver.start();
        drop(rx);
        sleep(Duration::from_millis(1500)).await;
        assert!(!driver.is_ticking());
        // The tick before the failed send was still applied.
        assert_eq!(driver.snapshot().seconds_remaining, 1499);
    }

    #[tokio::test(start_paused = true)]
    async fn no_ticks_after_pause() {
        let (mut driver, _rx) = driver();
        driver.start();
        sleep(Duration::from_millis(2500)).await;
        assert!(driver.pause().is_some());
        sleep(Duration::from_secs(10)).await;
        assert_eq!(driver.snapshot().seconds_remaining, 1498);
        assert!(!driver.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_does_not_double_tick() {
        let (mut driver, _rx) = driver();
        assert!(driver.start().is_some());
        assert!(driver.start().is_none());
        sleep(Duration::from_millis(3500)).await;
        assert_eq!(driver.snapshot().seconds_remaining, 1497);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_after_pause_continues_countdown() {
        let (mut driver, _rx) = driver();
        driver.start();
        sleep(Duration::from_millis(1500)).await;
        driver.pause();
        sleep(Duration::from_secs(5)).await;
        driver.toggle();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(driver.snapshot().seconds_remaining, 1497);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_auto_starts_next_session() {
        let config = TimerConfig::new(1, 1, 1, 4).unwrap();
        let (mut driver, mut rx) = TimerDriver::new(SessionController::new(config), DEFAULT_TICK_PERIOD);
        driver.start();
        sleep(Duration::from_millis(60_500)).await;

        let snap = driver.snapshot();
        assert_eq!(snap.session_type, SessionType::ShortBreak);
        assert_eq!(snap.seconds_remaining, 60);
        assert!(snap.is_running);
        assert_eq!(snap.completed_work_sessions, 1);

        let events = drain(&mut rx);
        assert_eq!(events.iter().filter(|e| e.is_completion()).count(), 1);
        assert!(matches!(events.first(), Some(Event::SessionStarted { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn skip_stops_tick_delivery() {
        let (mut driver, mut rx) = driver();
        driver.start();
        sleep(Duration::from_millis(1500)).await;
        driver.skip();
        sleep(Duration::from_secs(5)).await;

        let snap = driver.snapshot();
        assert_eq!(snap.session_type, SessionType::ShortBreak);
        assert_eq!(snap.seconds_remaining, 300);
        assert!(!snap.is_running);
        assert!(drain(&mut rx).iter().all(|e| !e.is_completion()));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_tick_task() {
        let (mut driver, mut rx) = driver();
        driver.start();
        drop(driver);
        sleep(Duration::from_secs(5)).await;

        assert!(matches!(rx.try_recv(), Ok(Event::SessionStarted { .. })));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_config_is_rejected_while_running() {
        let (mut driver, _rx) = driver();
        driver.start();
        sleep(Duration::from_millis(1500)).await;
        let bad = TimerConfig {
            work_duration: 0,
            ..TimerConfig::default()
        };
        assert!(driver.update_config(bad).is_err());
        assert_eq!(driver.controller().config(), &TimerConfig::default());
        assert!(driver.is_running());
    }
}
