//! The edit transform and everything that mutates it.
//!
//! # Pipeline
//!
//! 1. Gesture events arrive as deltas and are composed into the
//!    [`TransformState`] by the [`GestureAccumulator`].
//! 2. When a gesture ends, the [`BoundsEnforcer`] clamps the scale and
//!    slides the image back over the hole.
//! 3. The jump is reported as a [`Correction`] the host may animate.
//!
//! # Coordinate System
//!
//! - Transforms map image-local points (origin at the image centre) to
//!   offsets from the hole centre.
//! - Rotation angles are in radians, positive = clockwise on screen.
//! - Gesture deltas are in container coordinates.

mod affine;
mod animation;
mod bounds;
mod gesture;

pub use affine::{AffineTransform, TransformState};
pub use animation::{Correction, DEFAULT_CORRECTION_DURATION};
pub use bounds::{coverage_offset, BoundsEnforcer, ScaleLimits, COVERAGE_TOLERANCE};
pub use gesture::{GestureAccumulator, GestureError, GestureEvent, GestureKind, GesturePhase};
