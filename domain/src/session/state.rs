//! Server-issued conversation identifiers.
//!
//! Both types are black boxes to the client: [`ThreadId`] is echoed back as-is
//! and [`SessionState`] is republished unchanged except for its
//! `analysis_object` field.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::value::{RawValue, to_raw_value};

/// Field of the session blob the client is allowed to replace.
pub const ANALYSIS_OBJECT_FIELD: &str = "analysis_object";

/// Opaque thread token correlating a multi-turn conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque session blob managed by the service.
///
/// Held as the raw JSON text the service sent, so numbers and strings are
/// echoed back exactly as issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(Box<RawValue>);

impl PartialEq for SessionState {
    fn eq(&self, other: &Self) -> bool {
        self.0.get() == other.0.get()
    }
}

impl SessionState {
    pub fn from_raw(raw: Box<RawValue>) -> Self {
        Self(raw)
    }

    /// Wrap JSON text. Fails if the text is not valid JSON.
    pub fn parse(json: impl Into<String>) -> Result<Self, serde_json::Error> {
        RawValue::from_string(json.into()).map(Self)
    }

    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        to_raw_value(value).map(Self)
    }

    /// The blob exactly as it will be sent.
    pub fn as_str(&self) -> &str {
        self.0.get()
    }

    /// Parsed copy, for inspection only.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(self.0.get())
    }

    /// Copy of the blob with `analysis_object` replaced.
    ///
    /// Key order and the text of every other field are preserved. A blob that
    /// is not a JSON object has no field to replace and is returned unchanged.
    pub fn with_analysis_object<T>(&self, analysis: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        let Ok(mut fields) = serde_json::from_str::<IndexMap<String, Box<RawValue>>>(self.0.get())
        else {
            return Ok(self.clone());
        };
        fields.insert(ANALYSIS_OBJECT_FIELD.to_string(), to_raw_value(analysis)?);
        to_raw_value(&fields).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: Value) -> SessionState {
        SessionState::from_value(&value).unwrap()
    }

    #[test]
    fn test_with_analysis_object_replaces_only_that_field() {
        let state = state(json!({
            "zeta": 1,
            "analysis_object": {"old": true},
            "alpha": {"nested": [1, 2, 3]}
        }));
        let updated = state.with_analysis_object(&json!({"summary": "Great mug"})).unwrap();

        let mut expected = state.to_value().unwrap();
        expected["analysis_object"] = json!({"summary": "Great mug"});
        assert_eq!(updated.to_value().unwrap(), expected);

        let value = updated.to_value().unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "analysis_object", "alpha"]);
    }

    #[test]
    fn test_with_analysis_object_adds_missing_field() {
        let state = state(json!({"messages": []}));
        let updated = state.with_analysis_object(&json!(null)).unwrap();
        assert_eq!(updated.as_str(), r#"{"messages":[],"analysis_object":null}"#);
    }

    #[test]
    fn test_field_text_survives_replacement() {
        let state = SessionState::parse(
            r#"{"eps":1e-05,"big":123456789012345678901234567890,"name":"caf\u00e9","analysis_object":null}"#,
        )
        .unwrap();
        let updated = state.with_analysis_object(&json!({"summary": "Mug"})).unwrap();
        assert_eq!(
            updated.as_str(),
            r#"{"eps":1e-05,"big":123456789012345678901234567890,"name":"caf\u00e9","analysis_object":{"summary":"Mug"}}"#
        );
    }

    #[test]
    fn test_non_object_blob_is_untouched() {
        let state = state(json!("opaque-token"));
        assert_eq!(state.with_analysis_object(&json!({})).unwrap(), state);
    }

    #[test]
    fn test_thread_id_is_transparent() {
        let id: ThreadId = serde_json::from_value(json!("t-123")).unwrap();
        assert_eq!(id.as_str(), "t-123");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("t-123"));
    }
}
