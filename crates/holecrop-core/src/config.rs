//! Editor configuration.
//!
//! Every field has a default, so a host can pass `{}` or only the fields it
//! cares about:
//!
//! ```json
//! {
//!   "hole": { "width": 300, "height": 300 },
//!   "container": { "width": 390, "height": 844 },
//!   "render": { "filter": "lanczos3", "pixel_ratio": 3.0 }
//! }
//! ```

use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{GeometryError, HoleGeometry};
use crate::persistence::{PartialRecordPolicy, SessionKey};
use crate::render::RenderOptions;
use crate::transform::DEFAULT_CORRECTION_DURATION;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Invalid correction duration {0}: must be finite and non-negative")]
    InvalidDuration(f64),

    #[error("Invalid pixel ratio {0}: must be positive and finite")]
    InvalidPixelRatio(f64),
}

/// Width and height in container points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<Dimensions> for Size {
    fn from(d: Dimensions) -> Self {
        Size::new(d.width, d.height)
    }
}

/// Settings for one editor instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub hole: Dimensions,
    pub container: Dimensions,
    /// Seconds over which hosts should animate a bounds correction.
    pub correction_duration: f64,
    pub partial_record_policy: PartialRecordPolicy,
    pub render: RenderOptions,
    pub gestures_enabled: bool,
    pub rotation_gesture_enabled: bool,
    /// Storage key for the persisted transform.
    pub session_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hole: Dimensions::new(200.0, 200.0),
            container: Dimensions::new(375.0, 667.0),
            correction_duration: DEFAULT_CORRECTION_DURATION,
            partial_record_policy: PartialRecordPolicy::default(),
            render: RenderOptions::default(),
            gestures_enabled: true,
            rotation_gesture_enabled: false,
            session_key: SessionKey::DEFAULT.to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field, returning the hole geometry on success.
    pub fn validate(&self) -> Result<HoleGeometry, ConfigError> {
        let geometry = self.geometry()?;
        if !(self.correction_duration.is_finite() && self.correction_duration >= 0.0) {
            return Err(ConfigError::InvalidDuration(self.correction_duration));
        }
        let ratio = self.render.pixel_ratio;
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(ConfigError::InvalidPixelRatio(ratio));
        }
        Ok(geometry)
    }

    pub fn geometry(&self) -> Result<HoleGeometry, GeometryError> {
        HoleGeometry::new(self.hole.into(), self.container.into())
    }

    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(self.session_key.clone())
    }
}
