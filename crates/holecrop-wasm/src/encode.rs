//! Encoding of rendered crops for upload or download.
//!
//! ```typescript
//! const cropped = editor.render();
//! const body = encode_image(cropped, { format: 'jpeg', quality: 85 });
//! await upload(new Blob([body], { type: output_mime_type({ format: 'jpeg', quality: 85 }) }));
//! ```

use holecrop_core::encode::{self, OutputFormat};
use wasm_bindgen::prelude::*;

use crate::to_js;
use crate::types::JsDecodedImage;

/// Encode a raw RGB buffer as JPEG. `quality` is clamped to 1..=100.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(to_js)
}

/// Encode an image with a `{ format: 'jpeg', quality }` or
/// `{ format: 'png' }` descriptor.
#[wasm_bindgen]
pub fn encode_image(image: &JsDecodedImage, format: JsValue) -> Result<Vec<u8>, JsValue> {
    let format: OutputFormat = serde_wasm_bindgen::from_value(format).map_err(to_js)?;
    encode_as(image, format).map_err(to_js)
}

#[wasm_bindgen]
pub fn encode_jpeg_from_image(image: &JsDecodedImage, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode_as(image, OutputFormat::Jpeg { quality }).map_err(to_js)
}

#[wasm_bindgen]
pub fn encode_png_from_image(image: &JsDecodedImage) -> Result<Vec<u8>, JsValue> {
    encode_as(image, OutputFormat::Png).map_err(to_js)
}

/// MIME type for an output format descriptor.
#[wasm_bindgen]
pub fn output_mime_type(format: JsValue) -> Result<String, JsValue> {
    let format: OutputFormat = serde_wasm_bindgen::from_value(format).map_err(to_js)?;
    Ok(format.mime_type().to_string())
}

fn encode_as(image: &JsDecodedImage, format: OutputFormat) -> Result<Vec<u8>, encode::EncodeError> {
    encode::encode_image(&image.to_decoded(), format)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_jpeg_invalid_length() {
        assert!(encode_jpeg(&[0u8; 5], 8, 8, 90).is_err());
    }

    #[wasm_bindgen_test]
    fn test_encode_image_descriptor() {
        let img = JsDecodedImage::new(3, 2, vec![7u8; 3 * 2 * 3]);
        let format = serde_wasm_bindgen::to_value(&OutputFormat::Png).unwrap();
        let png = encode_image(&img, format.clone()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(output_mime_type(format).unwrap(), "image/png");
    }

    #[wasm_bindgen_test]
    fn test_encode_image_bad_descriptor() {
        let img = JsDecodedImage::new(1, 1, vec![0u8; 3]);
        assert!(encode_image(&img, JsValue::from_str("gif")).is_err());
    }
}
