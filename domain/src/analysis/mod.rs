//! Analysis results domain.
//!
//! - [`outcome::AnalysisOutcome`]: the session verdict
//! - [`report::AnalysisReport`]: the deep-analysis payload with display fallbacks

pub mod outcome;
pub mod report;
