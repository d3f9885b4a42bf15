//! Use cases (application services)
//!
//! Use cases orchestrate the domain logic and coordinate with
//! infrastructure through ports.

pub mod analysis_workflow;
pub mod health_monitor;
