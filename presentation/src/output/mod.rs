//! Terminal output: session formatting and markdown rendering.

pub mod console;
pub mod formatter;
pub mod markdown;
