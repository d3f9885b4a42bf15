//! Region descriptors.

use serde::{Deserialize, Serialize};

/// Coordinate scale every bounding box is normalized to.
pub const REGION_SCALE: f64 = 1000.0;

/// A rectangular area of interest: `[ymin, xmin, ymax, xmax]` on a 0..1000 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", from = "[f64; 4]")]
pub struct BoundingBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

/// Percentage rectangle used to position an overlay on top of the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(ymin: f64, xmin: f64, ymax: f64, xmax: f64) -> Self {
        Self {
            ymin,
            xmin,
            ymax,
            xmax,
        }
    }

    /// Build from a wire array. Anything but exactly four entries is rejected.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [ymin, xmin, ymax, xmax] => Some(Self::new(*ymin, *xmin, *ymax, *xmax)),
            _ => None,
        }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.ymin, self.xmin, self.ymax, self.xmax]
    }

    /// Integer coordinates, as the identification endpoint expects them.
    pub fn to_int_array(self) -> [i64; 4] {
        self.to_array().map(|v| v.round() as i64)
    }

    pub fn to_overlay(self) -> OverlayRect {
        let pct = |v: f64| v / REGION_SCALE * 100.0;
        OverlayRect {
            top: pct(self.ymin),
            left: pct(self.xmin),
            width: pct(self.xmax - self.xmin),
            height: pct(self.ymax - self.ymin),
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        b.to_array()
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.ymin, self.xmin, self.ymax, self.xmax
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_requires_four_values() {
        assert!(BoundingBox::from_slice(&[0.0, 0.0, 500.0]).is_none());
        assert!(BoundingBox::from_slice(&[0.0, 0.0, 500.0, 500.0, 1.0]).is_none());
        assert_eq!(
            BoundingBox::from_slice(&[10.0, 20.0, 30.0, 40.0]),
            Some(BoundingBox::new(10.0, 20.0, 30.0, 40.0))
        );
    }

    #[test]
    fn test_overlay_percentages() {
        let rect = BoundingBox::new(100.0, 250.0, 600.0, 750.0).to_overlay();
        assert_eq!(rect.top, 10.0);
        assert_eq!(rect.left, 25.0);
        assert_eq!(rect.height, 50.0);
        assert_eq!(rect.width, 50.0);
    }

    #[test]
    fn test_serializes_as_array() {
        let b = BoundingBox::new(0.0, 0.0, 500.0, 500.0);
        let json = serde_json::to_value(b).unwrap();
        assert_eq!(json, serde_json::json!([0.0, 0.0, 500.0, 500.0]));
        let back: BoundingBox = serde_json::from_value(json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn test_int_array_rounds() {
        let b = BoundingBox::new(0.4, 10.6, 499.5, 1000.0);
        assert_eq!(b.to_int_array(), [0, 11, 500, 1000]);
    }
}
