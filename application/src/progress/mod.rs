//! Simulated progress display support.

pub mod simulator;

pub use simulator::{ProgressSimulator, ProgressTicker};
