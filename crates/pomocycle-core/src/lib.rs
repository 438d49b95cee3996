//! # pomocycle Core Library
//!
//! This library provides the core logic for the pomocycle Pomodoro timer.
//! All operations are available through the standalone CLI binary, which is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session cycle**: pure functions that advance a [`TimerState`] by one
//!   tick or skip to the next session (`timer::cycle`)
//! - **Controller**: [`SessionController`] owns the state and the
//!   [`TimerConfig`] and turns every operation into an [`Event`]
//! - **Driver**: [`TimerDriver`] is the single periodic tick source for a
//!   controller, built on a tokio interval
//! - **Display**: [`DisplaySurface`] is the seam the UI implements to render
//!   snapshots and play completion notifications
//! - **Storage**: TOML configuration and a JSON snapshot of the controller
//!
//! ## Key Components
//!
//! - [`SessionController`]: work / short break / long break state machine
//! - [`TimerDriver`]: tick delivery with deterministic cancellation
//! - [`Config`]: application configuration management
//! - [`CoreError`]: error hierarchy

pub mod display;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use display::{format_remaining, DisplaySurface, TimerSnapshot};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use storage::{Config, StateStore};
pub use timer::{SessionController, SessionType, TimerConfig, TimerDriver, TimerState};
