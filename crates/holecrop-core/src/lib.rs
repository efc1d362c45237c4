//! Holecrop Core - constrained crop engine
//!
//! This crate lets a user position an image behind a fixed-size hole with
//! pan, pinch, and rotation gestures. All gestures accumulate into one
//! affine transform, and every completed gesture is followed by a
//! correction that keeps the hole fully covered and the zoom within range.
//! On save, the visible region is rendered into a hole-sized buffer and the
//! transform is persisted.
//!
//! # Example
//!
//! ```ignore
//! use holecrop_core::{EditSession, EditorConfig, GesturePhase};
//!
//! let mut session = EditSession::new(&EditorConfig::default())?;
//! session.set_image(holecrop_core::decode::decode_image(&bytes)?)?;
//! session.pan(40.0, 0.0, GesturePhase::Changed)?;
//! if let Some(correction) = session.pan(0.0, 0.0, GesturePhase::Ended)? {
//!     animate(correction);
//! }
//! let outcome = session.save()?;
//! ```

pub mod config;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod persistence;
pub mod render;
pub mod session;
pub mod transform;

pub use config::{ConfigError, Dimensions, EditorConfig};
pub use decode::{DecodeError, DecodedImage};
pub use encode::{encode_image, EncodeError, OutputFormat};
pub use geometry::{GeometryError, HoleGeometry, ImageFrame};
pub use persistence::{
    JsonFileStore, KeyValueStore, MemoryStore, PartialRecordPolicy, PersistenceError, SessionKey,
    TransformPersistence, TransformRecord,
};
pub use render::{crop, InterpolationFilter, RenderError, RenderOptions};
pub use session::{EditSession, SaveOutcome, SessionError};
pub use transform::{
    AffineTransform, BoundsEnforcer, Correction, GestureAccumulator, GestureError, GestureEvent,
    GestureKind, GesturePhase, ScaleLimits, TransformState,
};
