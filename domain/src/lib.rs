//! Domain layer for shoplens
//!
//! This crate contains the analysis-session entities, value objects and the
//! merge rules that keep partial remote results consistent. It has no
//! dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Analysis Session
//!
//! One session per ingested image. It owns the detected objects, the chat
//! thread and the latest analysis report, and is discarded when a new image
//! arrives.
//!
//! ## Two-stage analysis
//!
//! - **Detection**: fast localization of the objects in the picture
//! - **Deep analysis**: pricing, sentiment and alternatives for one identified product

pub mod analysis;
pub mod core;
pub mod detection;
pub mod image;
pub mod session;

// Re-export commonly used types
pub use analysis::{
    outcome::AnalysisOutcome,
    report::{
        ActiveProduct, AlternativeProduct, AnalysisReport, CommunitySentiment, PriceAnalysis,
    },
};
pub use core::{error::DomainError, output_format::OutputFormat, text::preview};
pub use detection::{
    cache::{DetectionKey, IdentificationCache},
    entities::{DetectedObject, Detections, Identification, IdentificationStatus},
    region::{BoundingBox, OverlayRect},
};
pub use image::{ImageAsset, ImageSource};
pub use session::{
    conversation::{ConversationTurn, Role},
    entities::{AnalysisSession, ChatTarget},
    phase::WorkflowPhase,
    state::{SessionState, ThreadId},
};
