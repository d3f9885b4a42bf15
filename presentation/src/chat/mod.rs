//! Interactive chat module
//!
//! Provides a reedline-based chat about the currently analyzed image.

mod repl;

pub use repl::{ChatRepl, ReplInput};
