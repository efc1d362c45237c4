//! Decoding of the user's photo before it is handed to the editor.
//!
//! ```typescript
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! editor.set_image(decode_image(bytes));
//! ```

use holecrop_core::decode;
use wasm_bindgen::prelude::*;

use crate::to_js;
use crate::types::JsDecodedImage;

/// Decode JPEG or PNG bytes to RGB. The format is sniffed from the data.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(to_js)
}
