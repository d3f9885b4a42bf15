//! Turns a user-supplied picture into an [`ImageAsset`].
//!
//! Whatever the input format, the service receives a JPEG data URL.
//! Transparent pixels are flattened onto white before encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use shoplens_domain::{DomainError, ImageAsset, ImageSource};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// Errors that can occur while loading an image
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} is not a supported image: {source}")]
    NotAnImage {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Decodes images and re-encodes them as JPEG data URLs.
#[derive(Debug, Clone, Copy)]
pub struct ImageLoader {
    quality: u8,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Read and normalize the image at `path`.
    pub fn load_path(&self, path: &Path) -> Result<ImageAsset, ImageLoadError> {
        let bytes = std::fs::read(path).map_err(|source| ImageLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.normalize_bytes(&bytes, &name)
    }

    /// Normalize an in-memory image.
    pub fn normalize_bytes(&self, bytes: &[u8], name: &str) -> Result<ImageAsset, ImageLoadError> {
        let decoded = image::load_from_memory(bytes).map_err(|source| ImageLoadError::NotAnImage {
            name: name.to_string(),
            source,
        })?;
        let jpeg = self.encode_jpeg(&decoded)?;
        debug!(
            "Normalized {} ({}x{}, {} -> {} bytes)",
            name,
            decoded.width(),
            decoded.height(),
            bytes.len(),
            jpeg.len()
        );

        let data_url = format!("data:{};base64,{}", JPEG_MEDIA_TYPE, BASE64.encode(&jpeg));
        Ok(ImageAsset::new(data_url)?.with_source(ImageSource {
            file_name: name.to_string(),
            media_type: JPEG_MEDIA_TYPE.to_string(),
            byte_len: bytes.len() as u64,
        }))
    }

    fn encode_jpeg(&self, image: &DynamicImage) -> Result<Vec<u8>, ImageLoadError> {
        let flattened = flatten_on_white(image);
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .encode_image(&flattened)
            .map_err(ImageLoadError::Encode)?;
        Ok(out)
    }
}

fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |channel: u8| -> u8 {
            ((u16::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}
