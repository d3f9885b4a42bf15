//! Progress display for in-flight analysis calls.

pub mod reporter;
