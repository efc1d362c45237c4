//! WASM-compatible wrapper types.
//!
//! JavaScript-friendly views of the core image, correction, and save
//! outcome types. Transforms cross the boundary as six-element
//! `Float64Array`s in `[a, b, c, d, tx, ty]` order.

use holecrop_core::persistence::RECORD_FIELDS;
use holecrop_core::render::InterpolationFilter;
use holecrop_core::{Correction, DecodedImage, OutputFormat, SaveOutcome};
use wasm_bindgen::prelude::*;

use crate::to_js;

/// A decoded image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create a new JsDecodedImage from dimensions and RGB pixel data
    /// (3 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 3)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Convert back to a core DecodedImage. Clones the pixel data.
    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// Convert a u8 filter value to the core InterpolationFilter.
///
/// Values:
/// - 0 = Nearest
/// - 1 = Bilinear
/// - 2 = Lanczos3
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> InterpolationFilter {
    match value {
        0 => InterpolationFilter::Nearest,
        2 => InterpolationFilter::Lanczos3,
        _ => InterpolationFilter::Bilinear,
    }
}

/// A bounds correction for the host to animate.
///
/// ```typescript
/// const correction = editor.pan(0, 0, "ended");
/// if (correction && !correction.is_noop) {
///   const start = performance.now();
///   const step = (now: number) => {
///     const elapsed = (now - start) / 1000;
///     applyMatrix(correction.sample(elapsed));
///     if (elapsed < correction.duration) requestAnimationFrame(step);
///   };
///   requestAnimationFrame(step);
/// }
/// ```
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsCorrection {
    inner: Correction,
}

#[wasm_bindgen]
impl JsCorrection {
    /// Transform at gesture end, `[a, b, c, d, tx, ty]`
    #[wasm_bindgen(getter)]
    pub fn start(&self) -> Vec<f64> {
        self.inner.from.as_coeffs().to_vec()
    }

    /// Corrected transform, `[a, b, c, d, tx, ty]`
    #[wasm_bindgen(getter)]
    pub fn target(&self) -> Vec<f64> {
        self.inner.to.as_coeffs().to_vec()
    }

    /// Animation length in seconds
    #[wasm_bindgen(getter)]
    pub fn duration(&self) -> f64 {
        self.inner.duration
    }

    #[wasm_bindgen(getter)]
    pub fn is_noop(&self) -> bool {
        self.inner.is_noop()
    }

    /// Transform to display `elapsed` seconds into the animation
    pub fn sample(&self, elapsed: f64) -> Vec<f64> {
        self.inner.sample(elapsed).as_coeffs().to_vec()
    }
}

impl From<Correction> for JsCorrection {
    fn from(inner: Correction) -> Self {
        Self { inner }
    }
}

/// The result of `ImageEditor.save()`.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsSaveResult {
    inner: SaveOutcome,
}

#[wasm_bindgen]
impl JsSaveResult {
    /// Saved transform, `[a, b, c, d, tx, ty]`
    #[wasm_bindgen(getter)]
    pub fn transform(&self) -> Vec<f64> {
        let map = self.inner.transform_map();
        RECORD_FIELDS
            .iter()
            .filter_map(|name| map.get(*name).copied())
            .collect()
    }

    /// Whether the transform reached storage
    #[wasm_bindgen(getter)]
    pub fn persisted(&self) -> bool {
        self.inner.persisted
    }

    /// The cropped image, or undefined if rendering failed
    pub fn image(&self) -> Option<JsDecodedImage> {
        self.inner.image.clone().map(JsDecodedImage::from_decoded)
    }

    /// Encode the cropped image with a `{ format, quality? }` descriptor
    pub fn encode(&self, format: JsValue) -> Result<Vec<u8>, JsValue> {
        let format: OutputFormat = serde_wasm_bindgen::from_value(format).map_err(to_js)?;
        self.inner.encode(format).map_err(to_js)
    }

    /// Encode the cropped image as JPEG
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, JsValue> {
        self.inner
            .encode_jpeg(quality)
            .map_err(to_js)
    }

    /// The transform as a `{ a, b, c, d, tx, ty }` object
    pub fn transform_map(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.transform)
            .map_err(to_js)
    }
}

impl From<SaveOutcome> for JsSaveResult {
    fn from(inner: SaveOutcome) -> Self {
        Self { inner }
    }
}
