//! Rendering the hole's contents into a pixel buffer.
//!
//! # Algorithm
//!
//! Inverse mapping, like a rotation pass: for each output pixel centre,
//!
//! ```text
//! container = hole_origin + (out + 0.5) / pixel_ratio
//! source    = image_to_container⁻¹(container)
//! ```
//!
//! Points that land outside the source rectangle get the background colour;
//! everything else is sampled with the chosen filter.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sample::{sample, InterpolationFilter};
use crate::decode::DecodedImage;
use crate::geometry::{HoleGeometry, ImageFrame};
use crate::transform::AffineTransform;

/// Errors that can occur while rendering the crop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// The source image has no pixels.
    #[error("Source image is empty")]
    EmptyImage,

    /// The source buffer does not match its dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Hole size times pixel ratio rounds to zero.
    #[error("Output size {width}x{height} is empty")]
    EmptyOutput { width: u32, height: u32 },

    #[error("Invalid pixel ratio {0}: must be positive and finite")]
    InvalidPixelRatio(f64),

    /// The transform cannot be inverted.
    #[error("Transform is singular or not finite")]
    SingularTransform,

    #[error("Failed to allocate {bytes} bytes for the output buffer")]
    AllocationFailed { bytes: usize },
}

/// Output settings for [`crop`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Colour for output pixels the image does not cover.
    pub background: [u8; 3],
    pub filter: InterpolationFilter,
    /// Output pixels per container point.
    pub pixel_ratio: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: [0, 0, 0],
            filter: InterpolationFilter::default(),
            pixel_ratio: 1.0,
        }
    }
}

impl RenderOptions {
    /// Output dimensions for `geometry`'s hole.
    pub fn output_size(&self, geometry: &HoleGeometry) -> Result<(u32, u32), RenderError> {
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            return Err(RenderError::InvalidPixelRatio(self.pixel_ratio));
        }
        let hole = geometry.hole_size() * self.pixel_ratio;
        let width = hole.width.round().min(u32::MAX as f64) as u32;
        let height = hole.height.round().min(u32::MAX as f64) as u32;
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyOutput { width, height });
        }
        Ok((width, height))
    }
}

/// Render what is visible through the hole.
///
/// The output is `hole size × pixel_ratio` pixels. Pure function of its
/// inputs.
///
/// # Example
///
/// ```ignore
/// use holecrop_core::render::{crop, RenderOptions};
///
/// let cropped = crop(&image, &session.transform(), &geometry, &RenderOptions::default())?;
/// ```
pub fn crop(
    image: &DecodedImage,
    transform: &AffineTransform,
    geometry: &HoleGeometry,
    options: &RenderOptions,
) -> Result<DecodedImage, RenderError> {
    if image.is_empty() {
        return Err(RenderError::EmptyImage);
    }
    if !image.has_valid_buffer() {
        return Err(RenderError::InvalidPixelData {
            expected: image.expected_len(),
            actual: image.pixels.len(),
        });
    }

    let (out_w, out_h) = options.output_size(geometry)?;

    if transform.inverse().is_none() {
        return Err(RenderError::SingularTransform);
    }
    let frame = ImageFrame::from_image(image).map_err(|_| RenderError::EmptyImage)?;
    let to_source = frame.image_to_container(transform, geometry).inverse();

    let len = (out_w as usize)
        .checked_mul(out_h as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or(RenderError::AllocationFailed { bytes: usize::MAX })?;
    let mut output = Vec::new();
    output
        .try_reserve_exact(len)
        .map_err(|_| RenderError::AllocationFailed { bytes: len })?;

    let origin = geometry.hole_origin().to_vec2();
    let (src_w, src_h) = (image.width as f64, image.height as f64);
    let step = 1.0 / options.pixel_ratio;

    for oy in 0..out_h {
        for ox in 0..out_w {
            let container =
                Point::new((ox as f64 + 0.5) * step, (oy as f64 + 0.5) * step) + origin;
            let src = to_source * container;

            let pixel = if src.x < 0.0 || src.y < 0.0 || src.x > src_w || src.y > src_h {
                options.background
            } else {
                let centre = src - Vec2::new(0.5, 0.5);
                sample(image, centre.x, centre.y, options.filter)
            };
            output.extend_from_slice(&pixel);
        }
    }

    Ok(DecodedImage::new(out_w, out_h, output))
}
