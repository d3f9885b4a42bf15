//! Image normalization.

mod loader;

pub use loader::{DEFAULT_JPEG_QUALITY, ImageLoadError, ImageLoader};
