//! Analysis gateway port
//!
//! Defines the interface for talking to the remote analysis service. The
//! adapter lives in the infrastructure layer; every response is resolved into
//! domain types before it crosses this boundary.

use async_trait::async_trait;
use shoplens_domain::{
    AnalysisReport, BoundingBox, ChatTarget, ConversationTurn, Detections, Identification,
    ImageAsset, SessionState, ThreadId,
};
use thiserror::Error;

/// Generic text used when the service gives no reason for a failure.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Errors that can occur during gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Server returned {status}: {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
    ServerError { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Identification failed: {0}")]
    IdentificationFailed(String),

    #[error("Timeout")]
    Timeout,
}

impl GatewayError {
    /// Message suitable for showing to the user: whatever the server said,
    /// or a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::ServerError { message, .. } => message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            GatewayError::IdentificationFailed(message) => message.clone(),
            GatewayError::ConnectionError(message) => message.clone(),
            GatewayError::InvalidResponse(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
            GatewayError::Timeout => "The request timed out".to_string(),
        }
    }
}

/// Identify the product inside one detected region.
#[derive(Debug, Clone, Copy)]
pub struct IdentifyRequest<'a> {
    pub image: &'a ImageAsset,
    pub region: BoundingBox,
    pub object_index: usize,
}

/// Second-stage analysis for a resolved product.
///
/// Without an image the service is told to skip re-detection.
#[derive(Debug, Clone, Copy)]
pub struct DeepAnalysisRequest<'a> {
    pub image: Option<&'a ImageAsset>,
    pub product_name: &'a str,
}

impl<'a> DeepAnalysisRequest<'a> {
    pub fn skip_vision(product_name: &'a str) -> Self {
        Self {
            image: None,
            product_name,
        }
    }

    pub fn skips_vision(&self) -> bool {
        self.image.is_none()
    }
}

/// First turn of a conversation about an image.
#[derive(Debug, Clone, Copy)]
pub struct ChatAnalyzeRequest<'a> {
    pub image: &'a ImageAsset,
    pub query: &'a str,
    pub history: &'a [ConversationTurn],
}

/// Later turn of an existing conversation thread.
#[derive(Debug, Clone, Copy)]
pub struct ChatFollowupRequest<'a> {
    pub thread_id: &'a ThreadId,
    pub session_state: &'a SessionState,
    pub query: &'a str,
    pub history: &'a [ConversationTurn],
}

/// Answer to a conversational call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    pub chat_response: Option<String>,
    pub target: ChatTarget,
    pub thread_id: Option<ThreadId>,
    pub session_state: Option<SessionState>,
    pub analysis: Option<AnalysisReport>,
}

/// Gateway to the analysis service
///
/// Each method issues exactly one request; retries are not this port's job.
/// The bearer token is passed per call and attached as-is.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// Detect-only call: localize objects, skip downstream analysis
    async fn detect(&self, token: &str, image: &ImageAsset) -> Result<Detections, GatewayError>;

    /// Identify the product in one region
    async fn identify(
        &self,
        token: &str,
        request: IdentifyRequest<'_>,
    ) -> Result<Identification, GatewayError>;

    /// Deep analysis of an identified product
    async fn deep_analyze(
        &self,
        token: &str,
        request: DeepAnalysisRequest<'_>,
    ) -> Result<AnalysisReport, GatewayError>;

    /// Start a conversation about the image
    async fn chat_analyze(
        &self,
        token: &str,
        request: ChatAnalyzeRequest<'_>,
    ) -> Result<ChatReply, GatewayError>;

    /// Continue an existing conversation thread
    async fn chat_followup(
        &self,
        token: &str,
        request: ChatFollowupRequest<'_>,
    ) -> Result<ChatReply, GatewayError>;

    /// Liveness probe
    async fn health(&self) -> Result<(), GatewayError>;
}
