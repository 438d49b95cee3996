mod controller;
pub mod cycle;
mod driver;
mod session;

pub use controller::SessionController;
pub use cycle::{TimerState, Transition};
pub use driver::{EventReceiver, TimerDriver, DEFAULT_TICK_PERIOD};
pub use session::{SessionType, TimerConfig};
