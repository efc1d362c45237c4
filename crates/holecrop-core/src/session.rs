//! The edit session: one image, one hole, one transform.
//!
//! [`EditSession`] is the only writer of the transform. Gestures, the
//! discrete rotate action, and image assignment all go through `&mut self`;
//! rendering and persistence receive snapshots.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::config::{ConfigError, EditorConfig};
use crate::decode::DecodedImage;
use crate::encode::{encode_image, EncodeError, OutputFormat};
use crate::geometry::{GeometryError, HoleGeometry, ImageFrame};
use crate::persistence::{
    KeyValueStore, MemoryStore, PersistenceError, SessionKey, TransformPersistence,
    TransformRecord,
};
use crate::render::{crop, RenderError, RenderOptions};
use crate::transform::{
    AffineTransform, BoundsEnforcer, Correction, GestureAccumulator, GestureError, GestureEvent,
    GesturePhase, ScaleLimits, TransformState,
};

/// Errors surfaced by [`EditSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation needs the image size but no image is assigned.
    #[error("No image is assigned to the editor")]
    NoImage,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Gesture(#[from] GestureError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// What an explicit save hands back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// The transform that was saved.
    pub transform: TransformRecord,
    /// The cropped image, or `None` if rendering failed.
    pub image: Option<DecodedImage>,
    /// Whether the store accepted the record.
    pub persisted: bool,
}

impl SaveOutcome {
    /// The saved transform as a flat `a, b, c, d, tx, ty` map.
    pub fn transform_map(&self) -> BTreeMap<String, f64> {
        self.transform.to_map()
    }

    /// Encode the cropped image.
    pub fn encode(&self, format: OutputFormat) -> Result<Vec<u8>, SessionError> {
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        Ok(encode_image(image, format)?)
    }

    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, SessionError> {
        self.encode(OutputFormat::Jpeg { quality })
    }
}

/// Owns the transform, the hole geometry, and the source image.
#[derive(Debug)]
pub struct EditSession<S: KeyValueStore = MemoryStore> {
    geometry: HoleGeometry,
    state: TransformState,
    image: Option<DecodedImage>,
    frame: Option<ImageFrame>,
    gestures: GestureAccumulator,
    persistence: TransformPersistence<S>,
    key: SessionKey,
    correction_duration: f64,
    render_options: RenderOptions,
}

impl EditSession<MemoryStore> {
    /// A session that keeps saved transforms in memory.
    pub fn new(config: &EditorConfig) -> Result<Self, SessionError> {
        Self::with_store(config, MemoryStore::new())
    }
}

impl<S: KeyValueStore> EditSession<S> {
    pub fn with_store(config: &EditorConfig, store: S) -> Result<Self, SessionError> {
        let geometry = config.validate()?;
        Ok(Self {
            geometry,
            state: TransformState::default(),
            image: None,
            frame: None,
            gestures: GestureAccumulator::new(
                config.gestures_enabled,
                config.rotation_gesture_enabled,
            ),
            persistence: TransformPersistence::with_policy(store, config.partial_record_policy),
            key: config.session_key(),
            correction_duration: config.correction_duration,
            render_options: config.render,
        })
    }

    // ===== Image assignment =====

    /// Assign an image: reset to cover-fit, then restore the stored
    /// transform if there is one.
    ///
    /// A failing store is logged and ignored; the image still shows at
    /// cover-fit.
    pub fn set_image(&mut self, image: DecodedImage) -> Result<(), SessionError> {
        self.set_image_with_transform(image, &TransformRecord::default())
    }

    /// Assign an image with an explicit starting transform.
    ///
    /// A record that resolves to a usable transform wins over the store;
    /// otherwise this behaves like [`set_image`](Self::set_image).
    pub fn set_image_with_transform(
        &mut self,
        image: DecodedImage,
        initial: &TransformRecord,
    ) -> Result<(), SessionError> {
        let frame = ImageFrame::from_image(&image)?;
        let cover = frame.cover_fit(&self.geometry);

        let start = match initial.resolve(self.persistence.policy()) {
            Some(t) => Some(t),
            None => self.load_stored(),
        };
        self.state.reset(start.unwrap_or(cover));

        log::info!(
            "assigned {}x{} image (cover-fit scale {:.4}, {})",
            image.width,
            image.height,
            cover.scale_x(),
            if start.is_some() { "restored transform" } else { "cover-fit" }
        );
        self.image = Some(image);
        self.frame = Some(frame);
        Ok(())
    }

    /// Drop the image and return to the identity transform.
    pub fn clear_image(&mut self) {
        self.image = None;
        self.frame = None;
        self.state.reset(AffineTransform::IDENTITY);
    }

    fn load_stored(&self) -> Option<AffineTransform> {
        match self.persistence.load(&self.key) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("failed to read stored transform for '{}': {}", self.key, e);
                None
            }
        }
    }

    /// Re-read the stored transform and apply it. Returns whether one was
    /// found.
    pub fn load_transform(&mut self) -> Result<bool, SessionError> {
        if self.image.is_none() {
            return Err(SessionError::NoImage);
        }
        match self.persistence.load(&self.key)? {
            Some(t) => {
                self.state.reset(t);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn enforcer(&self) -> Result<BoundsEnforcer, SessionError> {
        let frame = self.frame.ok_or(SessionError::NoImage)?;
        Ok(BoundsEnforcer::new(frame, self.geometry))
    }

    // ===== Gestures =====

    /// Feed one gesture event. Returns the correction to animate when the
    /// gesture ends.
    pub fn handle_gesture(&mut self, event: GestureEvent) -> Result<Option<Correction>, SessionError> {
        let enforcer = self.enforcer()?;
        let correction =
            self.gestures
                .handle(&mut self.state, &enforcer, event, self.correction_duration)?;
        if let Some(c) = &correction {
            if !c.is_noop() {
                log::debug!("{:?} gesture ended, correcting to {:?}", event.kind, c.to);
            }
        }
        Ok(correction)
    }

    pub fn pan(&mut self, dx: f64, dy: f64, phase: GesturePhase) -> Result<Option<Correction>, SessionError> {
        self.handle_gesture(GestureEvent::pan(dx, dy, phase))
    }

    pub fn pinch(&mut self, scale_factor: f64, phase: GesturePhase) -> Result<Option<Correction>, SessionError> {
        self.handle_gesture(GestureEvent::pinch(scale_factor, phase))
    }

    pub fn rotate(&mut self, delta_angle: f64, phase: GesturePhase) -> Result<Option<Correction>, SessionError> {
        self.handle_gesture(GestureEvent::rotate(delta_angle, phase))
    }

    /// The discrete rotate action: a quarter turn, then scale clamp and
    /// coverage correction.
    ///
    /// The returned correction starts at the unrotated transform.
    pub fn rotate_quarter_turn(&mut self) -> Result<Correction, SessionError> {
        let enforcer = self.enforcer()?;
        let before = self.state.snapshot();
        GestureAccumulator::rotate_quarter_turn(&mut self.state);
        enforcer.settle(&mut self.state);
        Ok(Correction::new(
            before,
            self.state.snapshot(),
            self.correction_duration,
        ))
    }

    pub fn scale_limits(&self) -> Result<ScaleLimits, SessionError> {
        Ok(self.enforcer()?.scale_limits(&self.state.snapshot()))
    }

    pub fn reset_to_cover_fit(&mut self) -> Result<(), SessionError> {
        let frame = self.frame.ok_or(SessionError::NoImage)?;
        self.state.reset(frame.cover_fit(&self.geometry));
        Ok(())
    }

    // ===== Output =====

    /// Render the hole's contents with the configured options.
    pub fn render(&self) -> Result<DecodedImage, SessionError> {
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        Ok(crop(
            image,
            &self.state.snapshot(),
            &self.geometry,
            &self.render_options,
        )?)
    }

    /// Render the crop and persist the transform.
    ///
    /// Render and store failures are logged and reported in the outcome
    /// rather than returned as errors.
    pub fn save(&mut self) -> Result<SaveOutcome, SessionError> {
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        let snapshot = self.state.snapshot();

        let rendered = match crop(image, &snapshot, &self.geometry, &self.render_options) {
            Ok(out) => Some(out),
            Err(e) => {
                log::warn!("render failed during save: {}", e);
                None
            }
        };

        let persisted = match self.persistence.save(&self.key, &snapshot) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("failed to persist transform for '{}': {}", self.key, e);
                false
            }
        };

        log::info!(
            "saved transform for '{}' (rendered: {}, persisted: {})",
            self.key,
            rendered.is_some(),
            persisted
        );
        Ok(SaveOutcome {
            transform: TransformRecord::from_transform(&snapshot),
            image: rendered,
            persisted,
        })
    }

    // ===== Accessors =====

    pub fn transform(&self) -> AffineTransform {
        self.state.snapshot()
    }

    pub fn geometry(&self) -> &HoleGeometry {
        &self.geometry
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn session_key(&self) -> &SessionKey {
        &self.key
    }

    pub fn set_session_key(&mut self, key: SessionKey) {
        self.key = key;
    }

    pub fn gestures_enabled(&self) -> bool {
        self.gestures.is_enabled()
    }

    pub fn set_gestures_enabled(&mut self, enabled: bool) {
        self.gestures.set_enabled(enabled);
    }

    pub fn rotation_gesture_enabled(&self) -> bool {
        self.gestures.is_rotation_enabled()
    }

    pub fn set_rotation_gesture_enabled(&mut self, enabled: bool) {
        self.gestures.set_rotation_enabled(enabled);
    }

    pub fn correction_duration(&self) -> f64 {
        self.correction_duration
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    pub fn set_render_options(&mut self, options: RenderOptions) {
        self.render_options = options;
    }

    pub fn persistence(&self) -> &TransformPersistence<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut TransformPersistence<S> {
        &mut self.persistence
    }
}
