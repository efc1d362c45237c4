//! Holecrop WASM - WebAssembly bindings for the Holecrop crop engine
//!
//! This crate exposes holecrop-core to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `editor` - The `ImageEditor` session: gestures, corrections, save
//! - `storage` - `localStorage` persistence for saved transforms
//! - `types` - WASM-compatible wrapper types for images and results
//! - `decode` - Image decoding bindings (JPEG, PNG)
//! - `encode` - Image encoding bindings (JPEG, PNG)
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, ImageEditor } from '@holecrop/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const editor = new ImageEditor(300, 300, window.innerWidth, window.innerHeight);
//! editor.set_image(decode_image(bytes));
//! ```

use std::fmt::Display;

use wasm_bindgen::prelude::*;

mod decode;
mod editor;
mod encode;
mod storage;
mod types;

// Re-export public types
pub use decode::decode_image;
pub use editor::ImageEditor;
pub use encode::{
    encode_image, encode_jpeg, encode_jpeg_from_image, encode_png_from_image, output_mime_type,
};
pub use storage::LocalStorageStore;
pub use types::{JsCorrection, JsDecodedImage, JsSaveResult};

/// Errors cross into JavaScript as their display string.
pub(crate) fn to_js(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Initialize the WASM module (called automatically on load): panics and
/// `log` records go to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::debug!("holecrop-wasm {} initialized", version());
    }
}

/// Set the console log level: `off`, `error`, `warn`, `info`, `debug` or
/// `trace`. Unknown names are ignored.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => log::set_max_level(filter),
        Err(_) => log::warn!("unknown log level '{}'", level),
    }
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_init_is_repeatable() {
        init();
        init();
        log::info!("console logger installed");
        assert!(log::max_level() >= log::LevelFilter::Info);
    }
}
