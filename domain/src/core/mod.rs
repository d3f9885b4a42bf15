//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`output_format::OutputFormat`]: how results are printed
//! - [`text`]: preview helpers for log lines and labels

pub mod error;
pub mod output_format;
pub mod text;
