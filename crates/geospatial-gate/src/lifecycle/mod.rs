//! Top-level lifecycle state machine.

pub mod controller;
pub mod types;

pub use controller::LifecycleController;
pub use types::{LifecycleState, TickReport, UiEffect};
