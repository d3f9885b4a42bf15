//! Deep-analysis report
//!
//! Every field the service sends is optional; display helpers supply the
//! fallbacks instead of failing on a partial payload.

use super::outcome::AnalysisOutcome;
use serde::{Deserialize, Serialize};

pub const PRICE_FALLBACK: &str = "Check Price";
pub const VERDICT_FALLBACK: &str = "N/A";
pub const SUMMARY_FALLBACK: &str = "No summary available.";
pub const ALTERNATIVE_PRICE_FALLBACK: &str = "Price N/A";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceAnalysis {
    pub price_score: Option<f64>,
    pub verdict: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunitySentiment {
    pub trust_score: Option<f64>,
    pub summary: Option<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
}

/// A competing product suggested by the analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlternativeProduct {
    pub name: String,
    pub score: Option<f64>,
    pub reason: Option<String>,
    pub price_text: Option<String>,
    pub link: Option<String>,
}

impl AlternativeProduct {
    pub fn price_label(&self) -> &str {
        non_empty(self.price_text.as_deref()).unwrap_or(ALTERNATIVE_PRICE_FALLBACK)
    }
}

/// The product the analysis is about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveProduct {
    pub name: Option<String>,
    pub price_text: Option<String>,
    pub purchase_link: Option<String>,
    pub image_url: Option<String>,
}

/// Result of the deep-analysis stage (Value Object)
///
/// Carries no detections: bounding boxes are owned by the session and are
/// never taken from an analysis payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: Option<String>,
    pub outcome: AnalysisOutcome,
    pub identified_product: Option<String>,
    pub price_analysis: Option<PriceAnalysis>,
    pub community_sentiment: Option<CommunitySentiment>,
    #[serde(default)]
    pub alternatives: Vec<AlternativeProduct>,
    pub active_product: Option<ActiveProduct>,
}

impl AnalysisReport {
    pub fn summary_text(&self) -> &str {
        non_empty(self.summary.as_deref()).unwrap_or(SUMMARY_FALLBACK)
    }

    pub fn price_text(&self) -> &str {
        non_empty(
            self.active_product
                .as_ref()
                .and_then(|p| p.price_text.as_deref()),
        )
        .unwrap_or(PRICE_FALLBACK)
    }

    pub fn verdict(&self) -> &str {
        non_empty(
            self.price_analysis
                .as_ref()
                .and_then(|p| p.verdict.as_deref()),
        )
        .unwrap_or(VERDICT_FALLBACK)
    }

    pub fn purchase_link(&self) -> Option<&str> {
        non_empty(
            self.active_product
                .as_ref()
                .and_then(|p| p.purchase_link.as_deref()),
        )
    }

    /// Product name the report is about, preferring the explicit field.
    pub fn product_name(&self) -> Option<&str> {
        non_empty(self.identified_product.as_deref()).or_else(|| {
            non_empty(self.active_product.as_ref().and_then(|p| p.name.as_deref()))
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_for_empty_report() {
        let report = AnalysisReport::default();
        assert_eq!(report.summary_text(), "No summary available.");
        assert_eq!(report.price_text(), "Check Price");
        assert_eq!(report.verdict(), "N/A");
        assert_eq!(report.purchase_link(), None);
        assert_eq!(report.product_name(), None);
    }

    #[test]
    fn test_present_fields_win() {
        let report = AnalysisReport {
            summary: Some("Great mug".to_string()),
            price_analysis: Some(PriceAnalysis {
                verdict: Some("Good Deal".to_string()),
                ..Default::default()
            }),
            active_product: Some(ActiveProduct {
                name: Some("Ceramic Mug XL".to_string()),
                price_text: Some("$12.99".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(report.summary_text(), "Great mug");
        assert_eq!(report.verdict(), "Good Deal");
        assert_eq!(report.price_text(), "$12.99");
        assert_eq!(report.product_name(), Some("Ceramic Mug XL"));
    }

    #[test]
    fn test_blank_strings_use_fallbacks() {
        let alt = AlternativeProduct {
            name: "Plain Mug".to_string(),
            price_text: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(alt.price_label(), "Price N/A");
    }
}
