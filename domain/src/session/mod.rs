//! Analysis session domain.
//!
//! - [`entities::AnalysisSession`]: the view model remote results merge into
//! - [`conversation::ConversationTurn`]: a single turn of the chat thread
//! - [`state`]: opaque thread identifiers issued by the service
//! - [`phase::WorkflowPhase`]: where the two-call workflow currently is

pub mod conversation;
pub mod entities;
pub mod phase;
pub mod state;
