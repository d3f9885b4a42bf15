//! Wire types for the analysis service's JSON API.
//!
//! Request bodies borrow from the caller. Response bodies accept every field
//! as optional and are resolved into domain types here, once, so nothing
//! past this module has to guess at the payload's shape.
//!
//! # Endpoints
//!
//! - `POST /analyze`: detect-only and deep analysis
//! - `POST /api/v1/agent/identify`: product identification for one region
//! - `POST /api/v1/agent/chat`, `POST /api/v1/agent/chat/followup`: conversation
//! - `GET /health`: liveness

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use shoplens_application::ports::analysis_gateway::{
    ChatAnalyzeRequest, ChatFollowupRequest, ChatReply, DeepAnalysisRequest, GatewayError,
    IdentifyRequest,
};
use shoplens_domain::{
    ActiveProduct, AlternativeProduct, AnalysisOutcome, AnalysisReport, BoundingBox, ChatTarget,
    CommunitySentiment, ConversationTurn, DetectedObject, Detections, Identification,
    ImageAsset, PriceAnalysis, Role, SessionState, ThreadId,
};
use tracing::warn;

pub const ANALYZE_PATH: &str = "/analyze";
pub const IDENTIFY_PATH: &str = "/api/v1/agent/identify";
pub const CHAT_PATH: &str = "/api/v1/agent/chat";
pub const CHAT_FOLLOWUP_PATH: &str = "/api/v1/agent/chat/followup";
pub const HEALTH_PATH: &str = "/health";

/// Query text the analyze endpoint expects alongside an image.
pub const DEFAULT_USER_QUERY: &str = "What is this item?";

/// Deserialize a field, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            warn!("Ignoring malformed field in service response: {}", e);
            Ok(None)
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn region(values: Option<Vec<f64>>) -> Option<BoundingBox> {
    values.as_deref().and_then(BoundingBox::from_slice)
}

// ==================== Requests ====================

/// Body of `POST /analyze`.
#[derive(Debug, Serialize)]
pub struct AnalyzeBody<'a> {
    pub image: &'a str,
    pub user_query: &'a str,
    pub user_preferences: Map<String, Value>,
    pub detect_only: bool,
    pub skip_vision: bool,
    pub product_name: &'a str,
}

impl<'a> AnalyzeBody<'a> {
    pub fn detect(image: &'a ImageAsset) -> Self {
        Self {
            image: image.encoded(),
            user_query: DEFAULT_USER_QUERY,
            user_preferences: Map::new(),
            detect_only: true,
            skip_vision: false,
            product_name: "",
        }
    }

    pub fn deep(request: &DeepAnalysisRequest<'a>) -> Self {
        Self {
            image: request.image.map(ImageAsset::encoded).unwrap_or(""),
            user_query: DEFAULT_USER_QUERY,
            user_preferences: Map::new(),
            detect_only: false,
            skip_vision: request.skips_vision(),
            product_name: request.product_name,
        }
    }
}

/// Body of `POST /api/v1/agent/identify`.
#[derive(Debug, Serialize)]
pub struct IdentifyBody<'a> {
    pub image_base64: &'a str,
    /// `[ymin, xmin, ymax, xmax]` rounded to integers on the 0-1000 scale
    pub bounding_box: [i64; 4],
    pub object_index: usize,
}

impl<'a> From<&IdentifyRequest<'a>> for IdentifyBody<'a> {
    fn from(request: &IdentifyRequest<'a>) -> Self {
        Self {
            image_base64: request.image.encoded(),
            bounding_box: request.region.to_int_array(),
            object_index: request.object_index,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireTurn<'a> {
    pub role: Role,
    pub content: &'a str,
}

fn wire_history(history: &[ConversationTurn]) -> Vec<WireTurn<'_>> {
    history
        .iter()
        .filter(|turn| !turn.is_pending)
        .map(|turn| WireTurn {
            role: turn.role,
            content: turn.text(),
        })
        .collect()
}

/// Body of the chat endpoints.
#[derive(Debug, Serialize)]
pub struct ChatBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<&'a str>,
    pub query: &'a str,
    pub history: Vec<WireTurn<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_state: Option<&'a SessionState>,
}

impl<'a> From<&ChatAnalyzeRequest<'a>> for ChatBody<'a> {
    fn from(request: &ChatAnalyzeRequest<'a>) -> Self {
        Self {
            image: Some(request.image.encoded()),
            query: request.query,
            history: wire_history(request.history),
            thread_id: None,
            session_state: None,
        }
    }
}

impl<'a> From<&ChatFollowupRequest<'a>> for ChatBody<'a> {
    fn from(request: &ChatFollowupRequest<'a>) -> Self {
        Self {
            image: None,
            query: request.query,
            history: wire_history(request.history),
            thread_id: Some(request.thread_id.as_str()),
            session_state: Some(request.session_state),
        }
    }
}

// ==================== Responses ====================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireDetection {
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub bounding_box: Option<Vec<f64>>,
    #[serde(deserialize_with = "lenient")]
    pub confidence: Option<f64>,
}

impl From<WireDetection> for DetectedObject {
    fn from(wire: WireDetection) -> Self {
        DetectedObject::new(
            wire.name.unwrap_or_default(),
            region(wire.bounding_box),
            wire.confidence.unwrap_or(0.0),
        )
    }
}

/// Response of a detect-only call.
///
/// Detections arrive as a list, as a single box for the whole product, or
/// nested under `product_query` / `active_product`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DetectResponse {
    #[serde(deserialize_with = "lenient")]
    pub detected_objects: Option<Vec<WireDetection>>,
    #[serde(deserialize_with = "lenient")]
    pub bounding_box: Option<Vec<f64>>,
    pub name: Option<String>,
    pub identified_product: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub confidence: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub product_query: Option<Box<DetectResponse>>,
    #[serde(deserialize_with = "lenient")]
    pub active_product: Option<Box<DetectResponse>>,
}

impl DetectResponse {
    pub fn into_detections(self) -> Detections {
        if let Some(objects) = self.detected_objects
            && !objects.is_empty()
        {
            return Detections::MultiRegion(objects.into_iter().map(DetectedObject::from).collect());
        }
        if let Some(bbox) = region(self.bounding_box) {
            let name = non_blank(self.name)
                .or(non_blank(self.identified_product))
                .unwrap_or_default();
            return Detections::SingleRegion(DetectedObject::new(
                name,
                Some(bbox),
                self.confidence.unwrap_or(0.0),
            ));
        }
        for nested in [self.product_query, self.active_product].into_iter().flatten() {
            let detections = nested.into_detections();
            if !detections.is_empty() {
                return detections;
            }
        }
        Detections::NoDetections
    }
}

/// Response of the identify endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdentifyResponse {
    pub product_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub confidence: Option<f64>,
    pub link: Option<String>,
    pub error: Option<String>,
}

impl IdentifyResponse {
    pub fn into_identification(self) -> Result<Identification, GatewayError> {
        if let Some(error) = non_blank(self.error) {
            return Err(GatewayError::IdentificationFailed(error));
        }
        let identification =
            Identification::new(self.product_name.unwrap_or_default(), self.confidence);
        Ok(match non_blank(self.link) {
            Some(link) => identification.with_link(link),
            None => identification,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireAlternative {
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub score: Option<f64>,
    pub reason: Option<String>,
    #[serde(alias = "price", deserialize_with = "lenient")]
    pub price_text: Option<Value>,
    #[serde(alias = "url")]
    pub link: Option<String>,
}

fn price_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => non_blank(Some(text)),
        Value::Number(number) => number.as_f64().map(|price| format!("${:.2}", price)),
        _ => None,
    }
}

impl From<WireAlternative> for AlternativeProduct {
    fn from(wire: WireAlternative) -> Self {
        AlternativeProduct {
            name: wire.name.unwrap_or_default(),
            score: wire.score,
            reason: non_blank(wire.reason),
            price_text: price_text(wire.price_text),
            link: non_blank(wire.link),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireActiveProduct {
    pub name: Option<String>,
    #[serde(alias = "price", deserialize_with = "lenient")]
    pub price_text: Option<Value>,
    #[serde(alias = "link", alias = "url")]
    pub purchase_link: Option<String>,
    #[serde(alias = "image")]
    pub image_url: Option<String>,
}

impl From<WireActiveProduct> for ActiveProduct {
    fn from(wire: WireActiveProduct) -> Self {
        ActiveProduct {
            name: non_blank(wire.name),
            price_text: price_text(wire.price_text),
            purchase_link: non_blank(wire.purchase_link),
            image_url: non_blank(wire.image_url),
        }
    }
}

/// Response of a deep-analysis call (also embedded in chat replies).
///
/// Any `detected_objects` the service echoes back are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisResponse {
    pub summary: Option<String>,
    pub outcome: Option<String>,
    pub identified_product: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub price_analysis: Option<PriceAnalysis>,
    #[serde(deserialize_with = "lenient")]
    pub community_sentiment: Option<CommunitySentiment>,
    #[serde(deserialize_with = "lenient")]
    pub alternatives: Option<Vec<WireAlternative>>,
    #[serde(deserialize_with = "lenient")]
    pub active_product: Option<WireActiveProduct>,
}

impl From<AnalysisResponse> for AnalysisReport {
    fn from(wire: AnalysisResponse) -> Self {
        AnalysisReport {
            summary: non_blank(wire.summary),
            outcome: AnalysisOutcome::from_report_value(wire.outcome.as_deref()),
            identified_product: non_blank(wire.identified_product),
            price_analysis: wire.price_analysis,
            community_sentiment: wire.community_sentiment,
            alternatives: wire
                .alternatives
                .unwrap_or_default()
                .into_iter()
                .map(AlternativeProduct::from)
                .collect(),
            active_product: wire.active_product.map(ActiveProduct::from),
        }
    }
}

/// Response of the chat endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatResponse {
    pub chat_response: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub targeted_bounding_box: Option<Vec<f64>>,
    pub targeted_object_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub confidence: Option<f64>,
    pub thread_id: Option<String>,
    /// Kept as raw text; only the chat endpoints read it, and always from bytes.
    pub session_state: Option<SessionState>,
    #[serde(deserialize_with = "lenient")]
    pub analysis: Option<AnalysisResponse>,
}

impl From<ChatResponse> for ChatReply {
    fn from(wire: ChatResponse) -> Self {
        ChatReply {
            chat_response: non_blank(wire.chat_response),
            target: ChatTarget {
                bounding_box: region(wire.targeted_bounding_box),
                object_name: non_blank(wire.targeted_object_name),
                confidence: wire.confidence,
            },
            thread_id: non_blank(wire.thread_id).map(ThreadId::new),
            session_state: wire.session_state,
            analysis: wire.analysis.map(AnalysisReport::from),
        }
    }
}

/// Pull a human-readable reason out of an error body.
///
/// Looks at `detail`, then `error`, then `message`. A `detail` list (as
/// produced by request validation) yields its first entry's `msg`.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["detail", "error", "message"]
        .into_iter()
        .filter_map(|key| value.get(key))
        .find_map(|field| match field {
            Value::String(text) => non_blank(Some(text.clone())),
            Value::Array(items) => items
                .first()
                .and_then(|item| item.get("msg").or(Some(item)))
                .and_then(Value::as_str)
                .map(str::to_string),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shoplens_domain::IdentificationStatus;

    fn parse<T: DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_detect_body_shape() {
        let image = ImageAsset::new("data:image/jpeg;base64,AAAA").unwrap();
        let body = serde_json::to_value(AnalyzeBody::detect(&image)).unwrap();
        assert_eq!(
            body,
            json!({
                "image": "data:image/jpeg;base64,AAAA",
                "user_query": "What is this item?",
                "user_preferences": {},
                "detect_only": true,
                "skip_vision": false,
                "product_name": ""
            })
        );
    }

    #[test]
    fn test_deep_body_skips_vision() {
        let body =
            serde_json::to_value(AnalyzeBody::deep(&DeepAnalysisRequest::skip_vision("Mug")))
                .unwrap();
        assert_eq!(body["image"], "");
        assert_eq!(body["skip_vision"], true);
        assert_eq!(body["detect_only"], false);
        assert_eq!(body["product_name"], "Mug");
    }

    #[test]
    fn test_identify_body_rounds_region() {
        let image = ImageAsset::new("data:image/jpeg;base64,AAAA").unwrap();
        let request = IdentifyRequest {
            image: &image,
            region: BoundingBox::new(10.4, 20.6, 500.0, 999.5),
            object_index: 1,
        };
        let body = serde_json::to_value(IdentifyBody::from(&request)).unwrap();
        assert_eq!(body["bounding_box"], json!([10, 21, 500, 1000]));
        assert_eq!(body["object_index"], 1);
        assert_eq!(body["image_base64"], "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_followup_body_carries_state_verbatim() {
        let state = SessionState::parse(r#"{"b":1,"a":{"x":[1,2]}}"#).unwrap();
        let thread = ThreadId::new("t-9");
        let history = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello"),
            ConversationTurn::pending_assistant(),
        ];
        let request = ChatFollowupRequest {
            thread_id: &thread,
            session_state: &state,
            query: "price?",
            history: &history,
        };
        let body = serde_json::to_string(&ChatBody::from(&request)).unwrap();
        assert!(body.contains(r#""session_state":{"b":1,"a":{"x":[1,2]}}"#));
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["thread_id"], "t-9");
        assert!(value.get("image").is_none());
        assert_eq!(
            value["history"],
            json!([
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ])
        );
    }

    #[test]
    fn test_multi_region_detections() {
        let response: DetectResponse = parse(json!({
            "detected_objects": [
                {"name": "Mug", "bounding_box": [0, 0, 500, 500], "confidence": 0.9},
                {"name": "Plate", "bounding_box": [500, 500, 1000, 1000], "confidence": 0.8}
            ]
        }));
        let objects = response.into_detections().into_objects();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1].name, "Plate");
        assert_eq!(
            objects[1].bounding_box,
            Some(BoundingBox::new(500.0, 500.0, 1000.0, 1000.0))
        );
        assert_eq!(objects[0].identification_status, IdentificationStatus::Unidentified);
    }

    #[test]
    fn test_single_region_and_nested_detections() {
        let single: DetectResponse = parse(json!({
            "bounding_box": [100, 100, 900, 900],
            "identified_product": "Desk Lamp"
        }));
        match single.into_detections() {
            Detections::SingleRegion(object) => assert_eq!(object.name, "Desk Lamp"),
            other => panic!("expected single region, got {:?}", other),
        }

        let nested: DetectResponse = parse(json!({
            "product_query": {"detected_objects": [{"name": "Chair", "bounding_box": [1, 2, 3, 4]}]}
        }));
        assert_eq!(nested.into_detections().len(), 1);

        let empty: DetectResponse = parse(json!({"detected_objects": [], "bounding_box": null}));
        assert_eq!(empty.into_detections(), Detections::NoDetections);
    }

    #[test]
    fn test_malformed_detection_fields_tolerated() {
        let response: DetectResponse = parse(json!({
            "detected_objects": [{"name": "Mug", "bounding_box": [1, 2], "confidence": "high"}]
        }));
        let objects = response.into_detections().into_objects();
        assert_eq!(objects[0].bounding_box, None);
        assert_eq!(objects[0].confidence, 0.0);
    }

    #[test]
    fn test_identify_response() {
        let ok: IdentifyResponse = parse(json!({
            "product_name": "Ceramic Mug XL",
            "confidence": 0.95,
            "link": "https://shop.example/mug"
        }));
        let identification = ok.into_identification().unwrap();
        assert_eq!(identification.product_name, "Ceramic Mug XL");
        assert_eq!(identification.link.as_deref(), Some("https://shop.example/mug"));

        let failed: IdentifyResponse = parse(json!({"error": "No visual matches"}));
        assert_eq!(
            failed.into_identification(),
            Err(GatewayError::IdentificationFailed("No visual matches".to_string()))
        );
    }

    #[test]
    fn test_analysis_response_maps_to_report() {
        let response: AnalysisResponse = parse(json!({
            "summary": "Great mug",
            "outcome": "consider_alternatives",
            "identified_product": "Ceramic Mug XL",
            "price_analysis": {"price_score": 0.7, "verdict": "Good Deal", "details": "Below average"},
            "community_sentiment": {"trust_score": 8.5, "summary": "Loved", "red_flags": ["chips"]},
            "alternatives": [{"name": "Travel Mug", "score": 81.0, "reason": "Lid", "price": 14.5}],
            "active_product": {"name": "Ceramic Mug XL", "bounding_box": [0, 0, 1, 1], "detected_objects": []}
        }));
        let report = AnalysisReport::from(response);
        assert_eq!(report.outcome, AnalysisOutcome::NeedsAlternatives);
        assert_eq!(report.verdict(), "Good Deal");
        assert_eq!(report.alternatives[0].price_label(), "$14.50");
        assert_eq!(report.community_sentiment.unwrap().red_flags, vec!["chips"]);
        assert_eq!(
            report.active_product.unwrap().name.as_deref(),
            Some("Ceramic Mug XL")
        );
    }

    #[test]
    fn test_partial_analysis_response_uses_fallbacks() {
        let response: AnalysisResponse = parse(json!({
            "summary": "",
            "price_analysis": "not an object",
            "alternatives": [{"name": "Cheaper Mug"}]
        }));
        let report = AnalysisReport::from(response);
        assert_eq!(report.summary_text(), "No summary available.");
        assert_eq!(report.verdict(), "N/A");
        assert_eq!(report.price_text(), "Check Price");
        assert_eq!(report.alternatives[0].price_label(), "Price N/A");
        assert_eq!(report.outcome, AnalysisOutcome::NeedsAlternatives);
    }

    #[test]
    fn test_chat_response_maps_to_reply() {
        let response: ChatResponse = serde_json::from_str(
            r#"{
                "chat_response": "That's the plate.",
                "targeted_bounding_box": [500, 500, 1000, 1000],
                "targeted_object_name": "Plate",
                "confidence": 0.8,
                "thread_id": "t-1",
                "session_state": {"analysis_object": null, "step": 3},
                "analysis": {"summary": "Plain plate", "outcome": "recommended"}
            }"#,
        )
        .unwrap();
        let reply = ChatReply::from(response);
        assert_eq!(reply.thread_id, Some(ThreadId::new("t-1")));
        assert_eq!(
            reply.target.bounding_box,
            Some(BoundingBox::new(500.0, 500.0, 1000.0, 1000.0))
        );
        assert_eq!(reply.session_state.unwrap().to_value().unwrap()["step"], 3);
        assert_eq!(reply.analysis.unwrap().outcome, AnalysisOutcome::Recommended);

        let bare: ChatResponse = serde_json::from_str(r#"{"session_state": null}"#).unwrap();
        let bare = ChatReply::from(bare);
        assert!(bare.session_state.is_none());
        assert!(bare.chat_response.is_none());
    }

    #[test]
    fn test_session_state_is_republished_verbatim() {
        let response: ChatResponse = serde_json::from_slice(
            br#"{"thread_id":"t-2","session_state":{"eps":1e-05,"big":123456789012345678901234567890,"analysis_object":null}}"#,
        )
        .unwrap();
        let reply = ChatReply::from(response);
        let thread = reply.thread_id.unwrap();
        let state = reply
            .session_state
            .unwrap()
            .with_analysis_object(&json!({"summary": "Mug"}))
            .unwrap();
        let request = ChatFollowupRequest {
            thread_id: &thread,
            session_state: &state,
            query: "cheaper?",
            history: &[],
        };

        let body = serde_json::to_string(&ChatBody::from(&request)).unwrap();
        assert!(body.contains(
            r#""session_state":{"eps":1e-05,"big":123456789012345678901234567890,"analysis_object":{"summary":"Mug"}}"#
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(br#"{"detail": "Image too large"}"#).as_deref(),
            Some("Image too large")
        );
        assert_eq!(
            error_message(br#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#)
                .as_deref(),
            Some("field required")
        );
        assert_eq!(
            error_message(br#"{"error": {"message": "quota exceeded"}}"#).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(
            error_message(br#"{"message": "down"}"#).as_deref(),
            Some("down")
        );
        assert_eq!(error_message(b"<html>502</html>"), None);
        assert_eq!(error_message(br#"{"detail": ""}"#), None);
    }
}
