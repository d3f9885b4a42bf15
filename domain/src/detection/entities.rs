//! Detection entities

use super::region::BoundingBox;
use serde::{Deserialize, Serialize};

/// Whether a detection has been resolved to a concrete product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentificationStatus {
    #[default]
    Unidentified,
    Identified,
}

/// One object located in the image (Entity)
///
/// Produced by the detection call, then updated in place (by index) when an
/// identification for it resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub name: String,
    pub bounding_box: Option<BoundingBox>,
    pub confidence: f64,
    #[serde(default)]
    pub identification_status: IdentificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl DetectedObject {
    pub fn new(name: impl Into<String>, bounding_box: Option<BoundingBox>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            bounding_box,
            confidence: clamp_confidence(confidence),
            identification_status: IdentificationStatus::Unidentified,
            link: None,
        }
    }

    pub fn is_identified(&self) -> bool {
        self.identification_status == IdentificationStatus::Identified
    }

    /// Fold an identification result into this detection.
    ///
    /// An empty product name or a missing/zero confidence keeps what the
    /// detection already had.
    pub fn apply_identification(&mut self, identification: &Identification) {
        let product_name = identification.product_name.trim();
        if !product_name.is_empty() {
            self.name = product_name.to_string();
        }
        if let Some(confidence) = identification.confidence
            && confidence > 0.0
        {
            self.confidence = clamp_confidence(confidence);
        }
        self.identification_status = IdentificationStatus::Identified;
        self.link = identification.link.clone();
    }

    /// Overlay label such as `Mug ✓ (90%)`.
    pub fn label(&self) -> String {
        let name = if self.name.trim().is_empty() {
            "Object"
        } else {
            self.name.as_str()
        };
        let mark = if self.is_identified() { " ✓" } else { "" };
        format!("{}{} ({}%)", name, mark, (self.confidence * 100.0).round() as i64)
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Outcome of the on-demand identification call (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    pub product_name: String,
    pub confidence: Option<f64>,
    pub link: Option<String>,
}

impl Identification {
    pub fn new(product_name: impl Into<String>, confidence: Option<f64>) -> Self {
        Self {
            product_name: product_name.into(),
            confidence,
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Detections as returned by the service, resolved once at the boundary.
///
/// The service sometimes sends a list of objects, sometimes a single box for
/// the whole product, and sometimes nothing at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Detections {
    NoDetections,
    SingleRegion(DetectedObject),
    MultiRegion(Vec<DetectedObject>),
}

impl Detections {
    pub fn into_objects(self) -> Vec<DetectedObject> {
        match self {
            Detections::NoDetections => Vec::new(),
            Detections::SingleRegion(object) => vec![object],
            Detections::MultiRegion(objects) => objects,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Detections::NoDetections => 0,
            Detections::SingleRegion(_) => 1,
            Detections::MultiRegion(objects) => objects.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
