//! The crop editor exposed to JavaScript.
//!
//! # Usage
//!
//! ```typescript
//! const editor = new ImageEditor(300, 300, 390, 844);
//! editor.set_image(decode_image(bytes));
//!
//! // Wire recogniser callbacks; every value is a delta since the last event.
//! pinch.onChange = (e) => editor.pinch(e.scale, e.phase);
//! pan.onChange = (e) => editor.pan(e.dx, e.dy, e.phase);
//!
//! const result = editor.save();
//! const jpeg = result.encode_jpeg(90);
//! ```

use holecrop_core::{
    EditSession, EditorConfig, Dimensions, GestureEvent, GesturePhase, RenderOptions,
    SessionKey, TransformRecord,
};
use wasm_bindgen::prelude::*;

use crate::storage::LocalStorageStore;
use crate::to_js;
use crate::types::{filter_from_u8, JsCorrection, JsDecodedImage, JsSaveResult};

fn parse_phase(phase: &str) -> Result<GesturePhase, JsValue> {
    phase.parse().map_err(to_js)
}

/// An edit session backed by `localStorage`.
#[wasm_bindgen]
pub struct ImageEditor {
    session: EditSession<LocalStorageStore>,
}

#[wasm_bindgen]
impl ImageEditor {
    /// Create an editor for a hole of the given size centred in a container.
    #[wasm_bindgen(constructor)]
    pub fn new(
        hole_width: f64,
        hole_height: f64,
        container_width: f64,
        container_height: f64,
    ) -> Result<ImageEditor, JsValue> {
        let config = EditorConfig {
            hole: Dimensions::new(hole_width, hole_height),
            container: Dimensions::new(container_width, container_height),
            ..EditorConfig::default()
        };
        Self::with_config(&config).map_err(to_js)
    }

    /// Create an editor from a configuration object. Missing fields take
    /// their defaults.
    pub fn from_config(config: JsValue) -> Result<ImageEditor, JsValue> {
        let config: EditorConfig = serde_wasm_bindgen::from_value(config).map_err(to_js)?;
        Self::with_config(&config).map_err(to_js)
    }

    /// Create an editor from a JSON configuration string.
    pub fn from_config_json(json: &str) -> Result<ImageEditor, JsValue> {
        let config = EditorConfig::from_json(json).map_err(to_js)?;
        Self::with_config(&config).map_err(to_js)
    }

    // ===== Image =====

    /// Assign the image, cover-fitting it or restoring the saved transform.
    pub fn set_image(&mut self, image: &JsDecodedImage) -> Result<(), JsValue> {
        self.session.set_image(image.to_decoded()).map_err(to_js)
    }

    /// Assign the image with an explicit `{ a, b, c, d, tx, ty }` transform.
    pub fn set_image_with_transform(
        &mut self,
        image: &JsDecodedImage,
        transform: JsValue,
    ) -> Result<(), JsValue> {
        let record: TransformRecord = serde_wasm_bindgen::from_value(transform).map_err(to_js)?;
        self.session
            .set_image_with_transform(image.to_decoded(), &record)
            .map_err(to_js)
    }

    pub fn clear_image(&mut self) {
        self.session.clear_image();
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.session.has_image()
    }

    // ===== Gestures =====

    /// Pan by a container-space delta. `phase` is one of `began`, `changed`,
    /// `ended`, `cancelled`.
    pub fn pan(&mut self, dx: f64, dy: f64, phase: &str) -> Result<Option<JsCorrection>, JsValue> {
        let phase = parse_phase(phase)?;
        self.session
            .pan(dx, dy, phase)
            .map(|c| c.map(JsCorrection::from))
            .map_err(to_js)
    }

    /// Scale by a multiplicative delta.
    pub fn pinch(&mut self, scale_factor: f64, phase: &str) -> Result<Option<JsCorrection>, JsValue> {
        let phase = parse_phase(phase)?;
        self.session
            .pinch(scale_factor, phase)
            .map(|c| c.map(JsCorrection::from))
            .map_err(to_js)
    }

    /// Rotate by a delta in radians. Ignored unless rotation gestures are
    /// enabled.
    pub fn rotate(&mut self, delta_angle: f64, phase: &str) -> Result<Option<JsCorrection>, JsValue> {
        let phase = parse_phase(phase)?;
        self.session
            .rotate(delta_angle, phase)
            .map(|c| c.map(JsCorrection::from))
            .map_err(to_js)
    }

    /// Handle a `{ type, phase, ... }` gesture object, e.g.
    /// `{ type: "pinch", scaleFactor: 1.1, phase: "changed" }`.
    pub fn handle_gesture(&mut self, event: JsValue) -> Result<Option<JsCorrection>, JsValue> {
        let event: GestureEvent = serde_wasm_bindgen::from_value(event).map_err(to_js)?;
        self.session
            .handle_gesture(event)
            .map(|c| c.map(JsCorrection::from))
            .map_err(to_js)
    }

    /// Rotate a quarter turn clockwise and restore coverage.
    pub fn rotate_quarter_turn(&mut self) -> Result<JsCorrection, JsValue> {
        self.session
            .rotate_quarter_turn()
            .map(JsCorrection::from)
            .map_err(to_js)
    }

    pub fn reset_to_cover_fit(&mut self) -> Result<(), JsValue> {
        self.session.reset_to_cover_fit().map_err(to_js)
    }

    /// `[min, max]` uniform scale at the current rotation.
    pub fn scale_limits(&self) -> Result<Vec<f64>, JsValue> {
        let limits = self.session.scale_limits().map_err(to_js)?;
        Ok(vec![limits.min, limits.max])
    }

    // ===== Transform =====

    /// Current transform as `[a, b, c, d, tx, ty]`.
    pub fn transform_array(&self) -> Vec<f64> {
        self.session.transform().as_coeffs().to_vec()
    }

    /// Current transform as a `{ a, b, c, d, tx, ty }` object.
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        let record = TransformRecord::from_transform(&self.session.transform());
        serde_wasm_bindgen::to_value(&record).map_err(to_js)
    }

    /// Re-apply the transform saved in storage. Returns whether one was found.
    pub fn load_transform(&mut self) -> Result<bool, JsValue> {
        self.session.load_transform().map_err(to_js)
    }

    // ===== Output =====

    /// Render the hole's contents.
    pub fn render(&self) -> Result<JsDecodedImage, JsValue> {
        self.session
            .render()
            .map(JsDecodedImage::from_decoded)
            .map_err(to_js)
    }

    /// Render the crop and persist the transform.
    pub fn save(&mut self) -> Result<JsSaveResult, JsValue> {
        self.session.save().map(JsSaveResult::from).map_err(to_js)
    }

    // ===== Settings =====

    #[wasm_bindgen(getter)]
    pub fn gestures_enabled(&self) -> bool {
        self.session.gestures_enabled()
    }

    #[wasm_bindgen(setter)]
    pub fn set_gestures_enabled(&mut self, enabled: bool) {
        self.session.set_gestures_enabled(enabled);
    }

    #[wasm_bindgen(getter)]
    pub fn rotation_gesture_enabled(&self) -> bool {
        self.session.rotation_gesture_enabled()
    }

    #[wasm_bindgen(setter)]
    pub fn set_rotation_gesture_enabled(&mut self, enabled: bool) {
        self.session.set_rotation_gesture_enabled(enabled);
    }

    /// Storage key for this editor's transform.
    pub fn set_session_key(&mut self, key: &str) {
        self.session.set_session_key(SessionKey::new(key));
    }

    /// Render filter: 0 = nearest, 1 = bilinear, 2 = lanczos3.
    pub fn set_filter(&mut self, filter: u8) {
        let options = RenderOptions {
            filter: filter_from_u8(filter),
            ..*self.session.render_options()
        };
        self.session.set_render_options(options);
    }

    /// Output pixels per container point, e.g. `window.devicePixelRatio`.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        let options = RenderOptions {
            pixel_ratio,
            ..*self.session.render_options()
        };
        self.session.set_render_options(options);
    }
}

impl ImageEditor {
    fn with_config(config: &EditorConfig) -> Result<Self, holecrop_core::SessionError> {
        Ok(Self {
            session: EditSession::with_store(config, LocalStorageStore::new())?,
        })
    }
}

/// Native tests stick to the success paths; errors become `JsValue`s, which
/// only exist on wasm32.
#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> ImageEditor {
        let mut editor = ImageEditor::new(300.0, 200.0, 400.0, 600.0).unwrap();
        let image = JsDecodedImage::new(600, 300, vec![50u8; 600 * 300 * 3]);
        editor.set_image(&image).unwrap();
        editor
    }

    #[test]
    fn test_new_editor_cover_fits() {
        let editor = editor();
        assert!(editor.has_image());
        let t = editor.transform_array();
        assert!((t[0] - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(&t[4..], &[0.0, 0.0]);
    }

    #[test]
    fn test_pan_and_end() {
        let mut editor = editor();
        assert!(editor.pan(900.0, 0.0, "began").unwrap().is_none());
        let correction = editor.pan(0.0, 0.0, "ended").unwrap().unwrap();
        assert!(!correction.is_noop());
        assert_eq!(correction.target(), editor.transform_array());
        assert_eq!(correction.duration(), 0.25);
    }

    #[test]
    fn test_pinch_clamps_on_end() {
        let mut editor = editor();
        let limits = editor.scale_limits().unwrap();
        editor.pinch(0.2, "changed").unwrap();
        editor.pinch(1.0, "ended").unwrap();
        assert!((editor.transform_array()[0] - limits[0]).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_flag() {
        let mut editor = editor();
        assert!(!editor.rotation_gesture_enabled());
        assert!(editor.rotate(0.4, "ended").unwrap().is_none());

        editor.set_rotation_gesture_enabled(true);
        assert!(editor.rotate(0.4, "ended").unwrap().is_some());
    }

    #[test]
    fn test_quarter_turn() {
        let mut editor = editor();
        let correction = editor.rotate_quarter_turn().unwrap();
        let t = correction.target();
        assert!(t[0].abs() < 1e-9);
        assert!((t[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_save_and_reload() {
        let mut editor = editor();
        editor.set_session_key("avatar");
        editor.set_filter(2);
        editor.pan(-30.0, 0.0, "ended").unwrap();
        let saved = editor.transform_array();

        let result = editor.save().unwrap();
        assert!(result.persisted());
        assert_eq!(result.transform(), saved);
        let image = result.image().unwrap();
        assert_eq!((image.width(), image.height()), (300, 200));

        editor.reset_to_cover_fit().unwrap();
        assert!(editor.load_transform().unwrap());
        assert_eq!(editor.transform_array(), saved);
    }

    #[test]
    fn test_pixel_ratio_changes_render_size() {
        let mut editor = editor();
        editor.set_pixel_ratio(2.0);
        let out = editor.render().unwrap();
        assert_eq!((out.width(), out.height()), (600, 400));
    }

    #[test]
    fn test_from_config_json() {
        let editor = ImageEditor::from_config_json(
            r#"{"hole": {"width": 100, "height": 100}, "rotation_gesture_enabled": true}"#,
        )
        .unwrap();
        assert!(editor.rotation_gesture_enabled());
        assert!(editor.gestures_enabled());
        assert!(!editor.has_image());
    }
}
