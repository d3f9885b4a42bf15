//! Application layer for shoplens
//!
//! This crate contains the analysis workflow, port definitions, the progress
//! simulator and workflow parameters. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod progress;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ProgressProfile, WorkflowParams};
pub use ports::{
    analysis_gateway::{
        AnalysisGateway, ChatAnalyzeRequest, ChatFollowupRequest, ChatReply, DeepAnalysisRequest,
        GatewayError, IdentifyRequest,
    },
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    credentials::{CredentialError, StaticTokenProvider, TokenProvider},
    progress::{NoProgress, WorkflowProgressNotifier},
};
pub use progress::{ProgressSimulator, ProgressTicker};
pub use use_cases::analysis_workflow::{
    AnalysisWorkflow, ChatOutcome, EMPTY_CHAT_REPLY, SelectionOutcome, WorkflowError,
};
pub use use_cases::health_monitor::{HealthHandle, HealthMonitor, ReadinessGate};
