//! Port for structured conversation logging.
//!
//! Records what each remote call produced (detections, identifications,
//! analysis reports, chat answers, failures) as machine-readable events.
//! `tracing` keeps handling the human-readable diagnostics.

use serde_json::{Value, json};
use shoplens_domain::{AnalysisReport, DetectedObject, Identification};

/// A structured conversation event for logging.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "detections", "chat_response").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn detections(objects: &[DetectedObject]) -> Self {
        Self::new(
            "detections",
            json!({
                "count": objects.len(),
                "objects": objects,
            }),
        )
    }

    pub fn identification(index: usize, identification: &Identification, cached: bool) -> Self {
        Self::new(
            "identification",
            json!({
                "index": index,
                "cached": cached,
                "product_name": identification.product_name,
                "confidence": identification.confidence,
                "link": identification.link,
            }),
        )
    }

    pub fn deep_analysis(product_name: &str, report: &AnalysisReport) -> Self {
        Self::new(
            "deep_analysis",
            json!({
                "product_name": product_name,
                "outcome": report.outcome,
                "summary": report.summary,
                "alternatives": report.alternatives.len(),
            }),
        )
    }

    pub fn chat_response(followup: bool, thread_id: Option<&str>, text: &str) -> Self {
        Self::new(
            "chat_response",
            json!({
                "followup": followup,
                "thread_id": thread_id,
                "bytes": text.len(),
                "text": text,
            }),
        )
    }

    pub fn workflow_error(context: &str, error: &str) -> Self {
        Self::new(
            "workflow_error",
            json!({
                "context": context,
                "error": error,
            }),
        )
    }
}

/// Port for logging conversation events to a structured log.
///
/// `log` is synchronous and infallible; a failed write must never disturb
/// the workflow.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
