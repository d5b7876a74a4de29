//! Time sources

pub mod tsc;

pub use tsc::{CycleTimer, Tsc};
