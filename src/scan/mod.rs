//! Scan loop: pause, submit, render, resume

pub mod controller;
pub mod error;
pub mod state;
pub mod stats;

pub use controller::ScanLoopController;
pub use error::ScanError;
pub use state::{
    transition, CycleId, Effect, ScanEvent, ScanLoopState, ScanTiming, Transition,
    DEFAULT_ERROR_DELAY, DEFAULT_RESULT_DELAY,
};
pub use stats::ScanStatistics;
