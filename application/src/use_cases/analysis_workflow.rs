//! Analysis workflow use case.
//!
//! Drives one analysis session through its remote calls:
//!
//! 1. **Detect**: fast detect-only call on a freshly ingested image
//! 2. **Identify**: product identification for a selected region (cached per region)
//! 3. **Deep analysis**: pricing, sentiment and alternatives for the identified product
//!
//! or, conversationally, an initial chat call followed by follow-up calls that
//! carry the server's thread identifiers.
//!
//! Every call is attempted once. Whatever was merged before a failure stays
//! merged. Operations take `&mut self`, so a second call cannot start on the
//! same workflow while one is in flight.

use crate::config::{ProgressProfile, WorkflowParams};
use crate::ports::analysis_gateway::{
    AnalysisGateway, ChatAnalyzeRequest, ChatFollowupRequest, DeepAnalysisRequest, GatewayError,
    IdentifyRequest,
};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::credentials::{CredentialError, TokenProvider};
use crate::ports::progress::{NoProgress, WorkflowProgressNotifier};
use crate::progress::{ProgressSimulator, ProgressTicker};
use crate::use_cases::health_monitor::ReadinessGate;
use shoplens_domain::{
    AnalysisSession, DetectionKey, DomainError, IdentificationCache, ImageAsset, WorkflowPhase,
    preview,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Assistant text used when a chat reply carries neither an answer nor a summary.
pub const EMPTY_CHAT_REPLY: &str = "I processed your request.";

/// Errors that can occur while driving the workflow
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Backend is not ready")]
    BackendUnavailable,

    #[error("No image has been loaded")]
    NoSession,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Detection {0} has no region to identify")]
    MissingRegion(usize),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("{context} ({source})")]
    Remote {
        context: String,
        #[source]
        source: GatewayError,
    },
}

impl WorkflowError {
    fn remote(context: impl Into<String>, source: GatewayError) -> Self {
        WorkflowError::Remote {
            context: context.into(),
            source,
        }
    }

    /// Configuration and credential problems stop the program; everything
    /// else leaves the session usable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WorkflowError::Credential(_))
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::BackendUnavailable => {
                "Backend is not ready. Please wait and try again.".to_string()
            }
            WorkflowError::Remote { context, source } => {
                format!("{} ({})", context, source.user_message())
            }
            other => other.to_string(),
        }
    }
}

/// Result of a region selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub index: usize,
    /// The identification came from the cache; no network call was made.
    pub from_cache: bool,
}

/// Result of a chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub reply: String,
    /// The turn continued an existing server thread.
    pub followup: bool,
    /// Detection the answer pointed at, if any.
    pub targeted_index: Option<usize>,
}

/// Use case driving one analysis session at a time.
pub struct AnalysisWorkflow {
    gateway: Arc<dyn AnalysisGateway>,
    tokens: Arc<dyn TokenProvider>,
    progress: Arc<dyn WorkflowProgressNotifier>,
    conversation_logger: Arc<dyn ConversationLogger>,
    readiness: ReadinessGate,
    params: WorkflowParams,
    session: Option<AnalysisSession>,
    cache: IdentificationCache,
    phase: WorkflowPhase,
}

impl AnalysisWorkflow {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            gateway,
            tokens,
            progress: Arc::new(NoProgress),
            conversation_logger: Arc::new(NoConversationLogger),
            readiness: ReadinessGate::always_ready(),
            params: WorkflowParams::default(),
            session: None,
            cache: IdentificationCache::new(),
            phase: WorkflowPhase::Idle,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_progress(mut self, progress: Arc<dyn WorkflowProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn with_readiness(mut self, readiness: ReadinessGate) -> Self {
        self.readiness = readiness;
        self
    }

    pub fn with_params(mut self, params: WorkflowParams) -> Self {
        self.params = params;
        self
    }

    // ==================== Accessors ====================

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&AnalysisSession> {
        self.session.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_in_flight()
    }

    pub fn params(&self) -> &WorkflowParams {
        &self.params
    }

    // ==================== Operations ====================

    /// Start a new session for `image` and run detection on it.
    ///
    /// The previous session, its cache and its conversation are discarded.
    /// If detection fails the new session is kept (empty) so the user can
    /// chat about the image or retry.
    pub async fn ingest_image(&mut self, image: ImageAsset) -> Result<&AnalysisSession, WorkflowError> {
        if !self.readiness.is_ready() {
            return Err(WorkflowError::BackendUnavailable);
        }
        let token = self.bearer_token().await?;

        info!("Ingesting image ({} bytes encoded)", image.encoded_len());
        self.session = Some(AnalysisSession::new(image));
        self.cache.clear();
        self.set_phase(WorkflowPhase::Detecting);

        let ticker = self.start_progress(self.params.detection_progress);
        let result = {
            let session = self.session.as_ref().ok_or(WorkflowError::NoSession)?;
            self.gateway.detect(&token, session.image()).await
        };
        ticker.finish(result.is_ok());

        match result {
            Ok(detections) => {
                info!("Detection returned {} object(s)", detections.len());
                let session = self.session_mut()?;
                session.apply_detections(detections);
                let event = ConversationEvent::detections(session.detected_objects());
                self.conversation_logger.log(event);
                self.set_phase(WorkflowPhase::AwaitingSelection);
            }
            Err(e) => {
                warn!("Detection failed: {}", e);
                self.fail(WorkflowPhase::Idle, "detect", &e);
                return Err(WorkflowError::remote("Object detection failed", e));
            }
        }

        self.session.as_ref().ok_or(WorkflowError::NoSession)
    }

    /// Identify and analyze the detection at `index`.
    ///
    /// A region identified earlier in this session is served from the cache
    /// without any network call. Its analysis report is restored with it; if
    /// the earlier deep analysis never completed, the current report is left
    /// as it is.
    pub async fn select_region(&mut self, index: usize) -> Result<SelectionOutcome, WorkflowError> {
        let object = self
            .session
            .as_ref()
            .ok_or(WorkflowError::NoSession)?
            .detection(index)?
            .clone();
        let key = DetectionKey::for_object(index, &object);

        if let Some(cached) = self.cache.get(&key).cloned() {
            debug!("Region {} served from identification cache", index);
            let cached_report = self.cache.report(&key).cloned();
            let session = self.session_mut()?;
            let merged_name = session.merge_identification(index, &cached)?.name.clone();
            match cached_report {
                Some(report) => {
                    session.set_identified_product(merged_name);
                    session.merge_report(report);
                }
                None => debug!("Region {} has no cached analysis", index),
            }
            self.conversation_logger
                .log(ConversationEvent::identification(index, &cached, true));
            self.set_phase(WorkflowPhase::Complete);
            return Ok(SelectionOutcome {
                index,
                from_cache: true,
            });
        }

        let region = object
            .bounding_box
            .ok_or(WorkflowError::MissingRegion(index))?;
        let token = self.bearer_token().await?;

        info!("Identifying region {} ({})", index, region);
        self.set_phase(WorkflowPhase::Identifying);
        let ticker = self.start_progress(self.params.analysis_progress);

        let identified = {
            let session = self.session.as_ref().ok_or(WorkflowError::NoSession)?;
            self.gateway
                .identify(
                    &token,
                    IdentifyRequest {
                        image: session.image(),
                        region,
                        object_index: index,
                    },
                )
                .await
        };
        let identification = match identified {
            Ok(identification) => identification,
            Err(e) => {
                ticker.finish(false);
                warn!("Identification of region {} failed: {}", index, e);
                self.fail(WorkflowPhase::AwaitingSelection, "identify", &e);
                let context = self.params.selection_fallback_message.clone();
                return Err(WorkflowError::remote(context, e));
            }
        };

        let product_name = {
            let session = self.session_mut()?;
            let name = session.merge_identification(index, &identification)?.name.clone();
            session.set_identified_product(name.clone());
            name
        };
        self.conversation_logger
            .log(ConversationEvent::identification(index, &identification, false));
        self.cache.put(key.clone(), identification);

        let token = match self.bearer_token().await {
            Ok(token) => token,
            Err(e) => {
                ticker.finish(false);
                self.set_phase(WorkflowPhase::AwaitingSelection);
                return Err(e);
            }
        };

        info!("Deep analysis for '{}'", preview(&product_name, 80));
        self.set_phase(WorkflowPhase::DeepAnalyzing);
        let analyzed = self
            .gateway
            .deep_analyze(&token, DeepAnalysisRequest::skip_vision(&product_name))
            .await;
        ticker.finish(analyzed.is_ok());

        match analyzed {
            Ok(report) => {
                self.conversation_logger
                    .log(ConversationEvent::deep_analysis(&product_name, &report));
                self.cache.attach_report(&key, report.clone());
                self.session_mut()?.merge_report(report);
                self.set_phase(WorkflowPhase::Complete);
                Ok(SelectionOutcome {
                    index,
                    from_cache: false,
                })
            }
            Err(e) => {
                warn!("Deep analysis of '{}' failed: {}", product_name, e);
                self.fail(WorkflowPhase::AwaitingSelection, "deep_analyze", &e);
                let context = self.params.selection_fallback_message.clone();
                Err(WorkflowError::remote(context, e))
            }
        }
    }

    /// Ask a question about the current image.
    ///
    /// The first turn starts a server thread; once the service has handed
    /// back a thread id and session state, later turns continue that thread.
    /// On failure the pending assistant turn is replaced with the fallback
    /// message and the error is returned.
    pub async fn submit_chat(&mut self, query: &str) -> Result<ChatOutcome, WorkflowError> {
        if self.session.is_none() {
            return Err(WorkflowError::NoSession);
        }
        let token = self.bearer_token().await?;

        let (pending, followup, outbound_state) = {
            let session = self.session_mut()?;
            let outbound_state = session.outbound_session_state()?;
            let pending = session.begin_turn(query)?;
            (pending, session.has_thread(), outbound_state)
        };
        let query = query.trim();

        info!(
            "Chat turn ({}): {}",
            if followup { "follow-up" } else { "initial" },
            preview(query, 100)
        );
        self.set_phase(WorkflowPhase::Chatting);
        let ticker = self.start_progress(self.params.analysis_progress);

        let result = {
            let session = self.session.as_ref().ok_or(WorkflowError::NoSession)?;
            let history = session.history();
            let history = &history[..history.len().saturating_sub(1)];
            match (session.thread_id(), outbound_state.as_ref()) {
                (Some(thread_id), Some(session_state)) if followup => {
                    self.gateway
                        .chat_followup(
                            &token,
                            ChatFollowupRequest {
                                thread_id,
                                session_state,
                                query,
                                history,
                            },
                        )
                        .await
                }
                _ => {
                    self.gateway
                        .chat_analyze(
                            &token,
                            ChatAnalyzeRequest {
                                image: session.image(),
                                query,
                                history,
                            },
                        )
                        .await
                }
            }
        };
        ticker.finish(result.is_ok());

        match result {
            Ok(reply) => {
                let text = reply
                    .chat_response
                    .clone()
                    .filter(|text| !text.trim().is_empty())
                    .or_else(|| reply.analysis.as_ref().and_then(|r| r.summary.clone()))
                    .unwrap_or_else(|| EMPTY_CHAT_REPLY.to_string());

                let session = self.session_mut()?;
                session.resolve_turn(pending, text.clone())?;
                session.record_thread(reply.thread_id, reply.session_state);
                if let Some(report) = reply.analysis {
                    session.merge_report(report);
                }
                session.apply_target(reply.target);
                let targeted_index = session.targeted_object().map(|(index, _)| index);
                let event = ConversationEvent::chat_response(
                    followup,
                    session.thread_id().map(|id| id.as_str()),
                    &text,
                );
                self.conversation_logger.log(event);
                self.set_phase(WorkflowPhase::Complete);

                Ok(ChatOutcome {
                    reply: text,
                    followup,
                    targeted_index,
                })
            }
            Err(e) => {
                warn!("Chat request failed: {}", e);
                let fallback = self.params.chat_fallback_message.clone();
                let session = self.session_mut()?;
                session.resolve_turn(pending, fallback)?;
                let can_select = !session.detected_objects().is_empty();
                self.fail(WorkflowPhase::recovery(can_select), "chat", &e);
                Err(WorkflowError::remote("Chat request failed", e))
            }
        }
    }

    /// Discard the session and return to `Idle`.
    pub fn reset(&mut self) {
        self.session = None;
        self.cache.clear();
        self.set_phase(WorkflowPhase::Idle);
    }

    // ==================== Internals ====================

    async fn bearer_token(&self) -> Result<String, WorkflowError> {
        Ok(self.tokens.bearer_token().await?)
    }

    fn session_mut(&mut self) -> Result<&mut AnalysisSession, WorkflowError> {
        self.session.as_mut().ok_or(WorkflowError::NoSession)
    }

    fn set_phase(&mut self, phase: WorkflowPhase) {
        if self.phase != phase {
            debug!("Workflow phase: {} -> {}", self.phase, phase);
        }
        self.phase = phase;
        self.progress.on_phase_change(phase);
    }

    fn start_progress(&self, profile: ProgressProfile) -> ProgressTicker {
        ProgressSimulator::new(profile).start(Arc::clone(&self.progress))
    }

    fn fail(&mut self, recovery: WorkflowPhase, context: &str, error: &GatewayError) {
        self.conversation_logger.log(ConversationEvent::workflow_error(
            context,
            &error.user_message(),
        ));
        self.set_phase(recovery);
    }
}
