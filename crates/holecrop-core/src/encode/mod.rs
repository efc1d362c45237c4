//! Encoding of the cropped result.
//!
//! The renderer produces a raw RGB buffer sized to the hole. Hosts that
//! need a file or upload body encode it here, either through the
//! format-specific functions or through [`encode_image`] with an
//! [`OutputFormat`] taken from configuration.
//!
//! # Examples
//!
//! ```ignore
//! use holecrop_core::encode::{encode_image, OutputFormat};
//!
//! let outcome = session.save()?;
//! if let Some(image) = &outcome.image {
//!     let body = encode_image(image, OutputFormat::Jpeg { quality: 85 })?;
//!     upload(OutputFormat::Jpeg { quality: 85 }.mime_type(), body);
//! }
//! ```

mod jpeg;
mod png;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodedImage;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    #[error("Cannot encode a {width}x{height} image")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec itself reported a failure.
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Container format for a saved crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy, `quality` in 1..=100 (out-of-range values are clamped).
    Jpeg { quality: u8 },
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Jpeg { quality: 90 }
    }
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg { .. } => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg { .. } => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Encode an image in the given format.
pub fn encode_image(image: &DecodedImage, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Jpeg { quality } => {
            encode_jpeg(&image.pixels, image.width, image.height, quality)
        }
        OutputFormat::Png => encode_png(&image.pixels, image.width, image.height),
    }
}

fn validate_rgb(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
