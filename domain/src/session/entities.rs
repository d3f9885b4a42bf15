//! Analysis session entity and its merge rules.
//!
//! The session is the view model every remote call merges into. The rules
//! that matter:
//!
//! - `detected_objects` keeps its order and length across identification and
//!   analysis merges; entries are updated by index, never reordered or dropped.
//! - An analysis report overlays the top-level fields (summary, outcome,
//!   pricing, alternatives) and never touches the detections.
//! - A pending assistant turn is replaced in place, never appended after.

use super::conversation::ConversationTurn;
use super::state::{SessionState, ThreadId};
use crate::analysis::outcome::AnalysisOutcome;
use crate::analysis::report::AnalysisReport;
use crate::core::error::DomainError;
use crate::detection::entities::{DetectedObject, Detections, Identification};
use crate::detection::region::BoundingBox;
use crate::image::ImageAsset;
use serde::Serialize;

/// Summary shown while the user has not picked an object yet.
pub const PENDING_SELECTION_SUMMARY: &str =
    "Objects detected. Select an object to analyze details.";

/// Region the assistant pointed at in a chat answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatTarget {
    pub bounding_box: Option<BoundingBox>,
    pub object_name: Option<String>,
    pub confidence: Option<f64>,
}

/// One analysis session, scoped to a single ingested image (Entity)
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSession {
    #[serde(skip)]
    image: ImageAsset,
    detected_objects: Vec<DetectedObject>,
    thread_id: Option<ThreadId>,
    session_state: Option<SessionState>,
    conversation: Vec<ConversationTurn>,
    outcome: AnalysisOutcome,
    summary: Option<String>,
    report: Option<AnalysisReport>,
    identified_product: Option<String>,
    targeted_index: Option<usize>,
}

impl AnalysisSession {
    pub fn new(image: ImageAsset) -> Self {
        Self {
            image,
            detected_objects: Vec::new(),
            thread_id: None,
            session_state: None,
            conversation: Vec::new(),
            outcome: AnalysisOutcome::PendingSelection,
            summary: None,
            report: None,
            identified_product: None,
            targeted_index: None,
        }
    }

    pub fn image(&self) -> &ImageAsset {
        &self.image
    }

    pub fn detected_objects(&self) -> &[DetectedObject] {
        &self.detected_objects
    }

    pub fn thread_id(&self) -> Option<&ThreadId> {
        self.thread_id.as_ref()
    }

    pub fn session_state(&self) -> Option<&SessionState> {
        self.session_state.as_ref()
    }

    pub fn conversation(&self) -> &[ConversationTurn] {
        &self.conversation
    }

    pub fn outcome(&self) -> AnalysisOutcome {
        self.outcome
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn identified_product(&self) -> Option<&str> {
        self.identified_product.as_deref()
    }

    pub fn targeted_object(&self) -> Option<(usize, &DetectedObject)> {
        let index = self.targeted_index?;
        self.detected_objects.get(index).map(|obj| (index, obj))
    }

    /// Store first-stage detections.
    pub fn apply_detections(&mut self, detections: Detections) {
        self.detected_objects = detections.into_objects();
        self.targeted_index = None;
        self.outcome = AnalysisOutcome::PendingSelection;
        self.summary = Some(PENDING_SELECTION_SUMMARY.to_string());
    }

    pub fn detection(&self, index: usize) -> Result<&DetectedObject, DomainError> {
        self.detected_objects
            .get(index)
            .ok_or(DomainError::NoSuchRegion {
                index,
                len: self.detected_objects.len(),
            })
    }

    /// Fold an identification into `detected_objects[index]`, leaving every
    /// other entry untouched.
    pub fn merge_identification(
        &mut self,
        index: usize,
        identification: &Identification,
    ) -> Result<&DetectedObject, DomainError> {
        let len = self.detected_objects.len();
        let object = self
            .detected_objects
            .get_mut(index)
            .ok_or(DomainError::NoSuchRegion { index, len })?;
        object.apply_identification(identification);
        Ok(object)
    }

    /// Overlay an analysis report onto the top-level fields.
    ///
    /// The detections are kept from this session's own state; a report has no
    /// way to carry them.
    pub fn merge_report(&mut self, report: AnalysisReport) {
        self.outcome = report.outcome;
        self.summary = report.summary.clone();
        if let Some(name) = report.product_name() {
            self.identified_product = Some(name.to_string());
        }
        self.report = Some(report);
    }

    pub fn set_identified_product(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.trim().is_empty() {
            self.identified_product = Some(name);
        }
    }

    /// Completed turns, in order, suitable to send as history.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.conversation
            .iter()
            .filter(|turn| !turn.is_pending)
            .cloned()
            .collect()
    }

    /// Append the user's turn and a pending assistant placeholder.
    ///
    /// Returns the index of the placeholder.
    pub fn begin_turn(&mut self, query: &str) -> Result<usize, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::EmptyQuery);
        }
        self.conversation.push(ConversationTurn::user(query));
        self.conversation.push(ConversationTurn::pending_assistant());
        Ok(self.conversation.len() - 1)
    }

    /// Replace the pending placeholder at `index` with the final content.
    pub fn resolve_turn(&mut self, index: usize, content: impl Into<String>) -> Result<(), DomainError> {
        match self.conversation.get_mut(index) {
            Some(turn) if turn.is_pending => {
                *turn = ConversationTurn::assistant(content);
                Ok(())
            }
            _ => Err(DomainError::TurnNotPending(index)),
        }
    }

    /// Whether the next chat turn continues an existing server thread.
    pub fn has_thread(&self) -> bool {
        self.thread_id.is_some() && self.session_state.is_some()
    }

    /// Remember thread identifiers the service handed back.
    pub fn record_thread(&mut self, thread_id: Option<ThreadId>, session_state: Option<SessionState>) {
        if let Some(id) = thread_id {
            self.thread_id = Some(id);
        }
        if let Some(state) = session_state {
            self.session_state = Some(state);
        }
    }

    /// Session blob to send with a follow-up: the stored blob with only
    /// `analysis_object` replaced by the latest merged report.
    pub fn outbound_session_state(&self) -> Result<Option<SessionState>, DomainError> {
        let Some(state) = self.session_state.as_ref() else {
            return Ok(None);
        };
        let Some(report) = &self.report else {
            return Ok(Some(state.clone()));
        };
        state
            .with_analysis_object(report)
            .map(Some)
            .map_err(|e| DomainError::SessionState(e.to_string()))
    }

    /// Point at the region a chat answer referred to.
    ///
    /// A box that matches an existing detection targets it; an unknown box is
    /// appended at the end so existing indices stay valid.
    pub fn apply_target(&mut self, target: ChatTarget) {
        if let Some(bbox) = target.bounding_box {
            let existing = self
                .detected_objects
                .iter()
                .position(|obj| obj.bounding_box == Some(bbox));
            let index = match existing {
                Some(index) => index,
                None => {
                    let name = target.object_name.clone().unwrap_or_else(|| "Object".to_string());
                    self.detected_objects.push(DetectedObject::new(
                        name,
                        Some(bbox),
                        target.confidence.unwrap_or(0.0),
                    ));
                    self.detected_objects.len() - 1
                }
            };
            self.targeted_index = Some(index);
        } else if let Some(name) = target.object_name.as_deref() {
            if let Some(index) = self
                .detected_objects
                .iter()
                .position(|obj| obj.name.eq_ignore_ascii_case(name.trim()))
            {
                self.targeted_index = Some(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::report::AlternativeProduct;
    use serde_json::json;

    fn session_with_two_objects() -> AnalysisSession {
        let mut session =
            AnalysisSession::new(ImageAsset::new("data:image/jpeg;base64,AAAA").unwrap());
        session.apply_detections(Detections::MultiRegion(vec![
            DetectedObject::new("Mug", Some(BoundingBox::new(0.0, 0.0, 500.0, 500.0)), 0.9),
            DetectedObject::new(
                "Plate",
                Some(BoundingBox::new(500.0, 500.0, 1000.0, 1000.0)),
                0.8,
            ),
        ]));
        session
    }

    #[test]
    fn test_apply_detections_sets_pending_selection() {
        let session = session_with_two_objects();
        assert_eq!(session.detected_objects().len(), 2);
        assert_eq!(session.outcome(), AnalysisOutcome::PendingSelection);
        assert_eq!(session.summary(), Some(PENDING_SELECTION_SUMMARY));
    }

    #[test]
    fn test_merge_identification_touches_only_index() {
        let mut session = session_with_two_objects();
        let before_plate = session.detected_objects()[1].clone();
        session
            .merge_identification(0, &Identification::new("Ceramic Mug XL", Some(0.95)))
            .unwrap();
        assert_eq!(session.detected_objects()[0].name, "Ceramic Mug XL");
        assert_eq!(session.detected_objects()[1], before_plate);
    }

    #[test]
    fn test_merge_identification_out_of_range() {
        let mut session = session_with_two_objects();
        let err = session
            .merge_identification(5, &Identification::new("x", None))
            .unwrap_err();
        assert_eq!(err, DomainError::NoSuchRegion { index: 5, len: 2 });
    }

    #[test]
    fn test_merge_report_preserves_detections() {
        let mut session = session_with_two_objects();
        let before = session.detected_objects().to_vec();
        session.merge_report(AnalysisReport {
            summary: Some("Great mug".to_string()),
            outcome: AnalysisOutcome::Recommended,
            alternatives: vec![AlternativeProduct {
                name: "Travel Mug".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        });
        assert_eq!(session.detected_objects(), before.as_slice());
        assert_eq!(session.outcome(), AnalysisOutcome::Recommended);
        assert_eq!(session.summary(), Some("Great mug"));
        assert_eq!(session.report().unwrap().alternatives.len(), 1);
    }

    #[test]
    fn test_begin_and_resolve_turn() {
        let mut session = session_with_two_objects();
        let pending = session.begin_turn("  is it worth it? ").unwrap();
        assert_eq!(session.conversation().len(), 2);
        assert!(session.conversation()[pending].is_pending);
        assert!(session.history().len() == 1);

        session.resolve_turn(pending, "Yes.").unwrap();
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(session.conversation()[pending].text(), "Yes.");
        assert_eq!(
            session.resolve_turn(pending, "again"),
            Err(DomainError::TurnNotPending(pending))
        );
    }

    #[test]
    fn test_begin_turn_rejects_empty_query() {
        let mut session = session_with_two_objects();
        assert_eq!(session.begin_turn("   "), Err(DomainError::EmptyQuery));
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn test_outbound_session_state_replaces_analysis_object() {
        let mut session = session_with_two_objects();
        assert_eq!(session.outbound_session_state(), Ok(None));

        let blob = r#"{"turns":2,"analysis_object":{"stale":true},"user":"u-1","ratio":2.50}"#;
        session.record_thread(
            Some(ThreadId::new("t-1")),
            Some(SessionState::parse(blob).unwrap()),
        );
        assert!(session.has_thread());
        assert_eq!(session.outbound_session_state().unwrap().unwrap().as_str(), blob);

        session.merge_report(AnalysisReport {
            summary: Some("Great mug".to_string()),
            ..Default::default()
        });
        let outbound = session.outbound_session_state().unwrap().unwrap();
        assert!(outbound.as_str().starts_with(r#"{"turns":2,"analysis_object":{"#));
        assert!(outbound.as_str().ends_with(r#","user":"u-1","ratio":2.50}"#));
        let value = outbound.to_value().unwrap();
        assert_eq!(value["analysis_object"]["summary"], json!("Great mug"));
    }

    #[test]
    fn test_apply_target_matches_existing_box() {
        let mut session = session_with_two_objects();
        session.apply_target(ChatTarget {
            bounding_box: Some(BoundingBox::new(500.0, 500.0, 1000.0, 1000.0)),
            ..Default::default()
        });
        assert_eq!(session.targeted_object().unwrap().0, 1);
        assert_eq!(session.detected_objects().len(), 2);
    }

    #[test]
    fn test_apply_target_appends_unknown_box() {
        let mut session = session_with_two_objects();
        session.apply_target(ChatTarget {
            bounding_box: Some(BoundingBox::new(10.0, 10.0, 20.0, 20.0)),
            object_name: Some("Spoon".to_string()),
            confidence: Some(0.7),
        });
        let (index, object) = session.targeted_object().unwrap();
        assert_eq!(index, 2);
        assert_eq!(object.name, "Spoon");
        assert_eq!(session.detected_objects()[0].name, "Mug");
    }

    #[test]
    fn test_apply_target_by_name() {
        let mut session = session_with_two_objects();
        session.apply_target(ChatTarget {
            object_name: Some("plate".to_string()),
            ..Default::default()
        });
        assert_eq!(session.targeted_object().unwrap().0, 1);
    }
}
