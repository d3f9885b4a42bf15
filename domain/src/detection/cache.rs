//! Identification cache.
//!
//! Remembers the identification result for each selected region, and the
//! analysis report produced for it, so that re-selecting it within the same
//! image session costs no network call.
//!
//! Entries are keyed by [`DetectionKey`]: the position of the detection in the
//! session *and* the region it covered when it was identified. Position alone
//! would silently return another object's result if the detections were ever
//! replaced without clearing the cache; requiring the region to match turns
//! that case into a miss.

use super::entities::{DetectedObject, Identification};
use crate::analysis::report::AnalysisReport;
use super::region::BoundingBox;
use std::collections::HashMap;

/// Cache key for one detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionKey {
    pub index: usize,
    pub region: Option<BoundingBox>,
}

impl DetectionKey {
    pub fn new(index: usize, region: Option<BoundingBox>) -> Self {
        Self { index, region }
    }

    pub fn for_object(index: usize, object: &DetectedObject) -> Self {
        Self::new(index, object.bounding_box)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    region: Option<BoundingBox>,
    identification: Identification,
    report: Option<AnalysisReport>,
}

/// Per-image cache of identification results.
#[derive(Debug, Clone, Default)]
pub struct IdentificationCache {
    entries: HashMap<usize, CacheEntry>,
}

impl IdentificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a result. A stored entry whose region differs from the key is a miss.
    pub fn get(&self, key: &DetectionKey) -> Option<&Identification> {
        self.entries
            .get(&key.index)
            .filter(|entry| entry.region == key.region)
            .map(|entry| &entry.identification)
    }

    /// Analysis report stored for the region, if its deep analysis completed.
    pub fn report(&self, key: &DetectionKey) -> Option<&AnalysisReport> {
        self.entries
            .get(&key.index)
            .filter(|entry| entry.region == key.region)
            .and_then(|entry| entry.report.as_ref())
    }

    /// Attach a report to an existing entry. Returns `false` when no entry
    /// matches the key.
    pub fn attach_report(&mut self, key: &DetectionKey, report: AnalysisReport) -> bool {
        match self
            .entries
            .get_mut(&key.index)
            .filter(|entry| entry.region == key.region)
        {
            Some(entry) => {
                entry.report = Some(report);
                true
            }
            None => false,
        }
    }

    /// Store a result, overwriting whatever the index held before (including
    /// its report).
    pub fn put(&mut self, key: DetectionKey, identification: Identification) {
        self.entries.insert(
            key.index,
            CacheEntry {
                region: key.region,
                identification,
                report: None,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(v: f64) -> Option<BoundingBox> {
        Some(BoundingBox::new(v, v, v + 100.0, v + 100.0))
    }

    #[test]
    fn test_put_then_get() {
        let mut cache = IdentificationCache::new();
        cache.put(
            DetectionKey::new(0, region(0.0)),
            Identification::new("Ceramic Mug XL", Some(0.95)),
        );
        let hit = cache.get(&DetectionKey::new(0, region(0.0))).unwrap();
        assert_eq!(hit.product_name, "Ceramic Mug XL");
        assert!(cache.get(&DetectionKey::new(1, region(0.0))).is_none());
    }

    #[test]
    fn test_region_mismatch_is_a_miss() {
        let mut cache = IdentificationCache::new();
        cache.put(
            DetectionKey::new(0, region(0.0)),
            Identification::new("Ceramic Mug XL", None),
        );
        assert!(cache.get(&DetectionKey::new(0, region(500.0))).is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let mut cache = IdentificationCache::new();
        let key = DetectionKey::new(2, None);
        cache.put(key.clone(), Identification::new("First", None));
        cache.put(key.clone(), Identification::new("Second", None));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).unwrap().product_name, "Second");
    }

    #[test]
    fn test_report_follows_its_entry() {
        let mut cache = IdentificationCache::new();
        let key = DetectionKey::new(0, region(0.0));

        assert!(!cache.attach_report(&key, AnalysisReport::default()));
        cache.put(key.clone(), Identification::new("Ceramic Mug XL", None));
        assert!(cache.report(&key).is_none());

        let report = AnalysisReport {
            summary: Some("Great mug".to_string()),
            ..Default::default()
        };
        assert!(cache.attach_report(&key, report));
        assert_eq!(cache.report(&key).unwrap().summary.as_deref(), Some("Great mug"));
        assert!(cache.report(&DetectionKey::new(0, region(500.0))).is_none());

        cache.put(key.clone(), Identification::new("Ceramic Mug XL", None));
        assert!(cache.report(&key).is_none());
    }

    #[test]
    fn test_clear() {
        let mut cache = IdentificationCache::new();
        cache.put(DetectionKey::new(0, None), Identification::new("Plate", None));
        cache.clear();
        assert!(cache.is_empty());
    }
}
