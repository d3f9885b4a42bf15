//! HTTP adapter for the analysis service.

pub mod gateway;
pub mod protocol;

pub use gateway::HttpAnalysisGateway;
