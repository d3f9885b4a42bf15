//! Object detection domain.
//!
//! - [`region::BoundingBox`]: normalized region descriptor and overlay math
//! - [`entities::DetectedObject`]: a located object, optionally identified
//! - [`entities::Detections`]: the polymorphic detection payload, resolved
//! - [`cache::IdentificationCache`]: per-image identification results

pub mod cache;
pub mod entities;
pub mod region;
