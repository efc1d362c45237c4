//! Keeping the image over the hole.
//!
//! Two corrections run when a gesture ends:
//!
//! 1. **Scale clamp**: the uniform scale is pulled back into
//!    [`ScaleLimits`], so the image can always cover the hole and never
//!    zooms past the container.
//! 2. **Coverage**: the image's axis-aligned bounding rectangle is slid back
//!    over the hole if a gap opened on any side. Rotation and scale are left
//!    alone.
//!
//! # Algorithm
//!
//! For each axis, with `F` the transformed bounding rectangle and `H` the
//! hole:
//!
//! ```text
//! if F.len < H.len      -> centre F on H
//! else if F.min > H.min -> move F.min to H.min
//! else if F.max < H.max -> move F.max to H.max
//! else                  -> no change
//! ```
//!
//! The container-space offset is divided by the current scale and rotated
//! by the inverse rotation so it can be applied as a local translation.

use kurbo::{Rect, Vec2};

use super::affine::{AffineTransform, TransformState};
use crate::geometry::{HoleGeometry, ImageFrame};

/// Offsets and length differences at or below this are treated as zero, so
/// a second correction pass is an exact no-op.
pub const COVERAGE_TOLERANCE: f64 = 1e-9;

/// The valid range for the transform's uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    /// Smallest scale at which the bounding box still covers the hole.
    pub min: f64,
    /// Largest scale, where the image's larger relative side spans the container.
    pub max: f64,
}

impl ScaleLimits {
    /// The factor that brings `(scale_x, scale_y)` back into range, if any.
    ///
    /// When `min > max` the range collapses to `min`.
    pub fn correction_factor(&self, scale_x: f64, scale_y: f64) -> Option<f64> {
        if scale_x <= 0.0 || !scale_x.is_finite() {
            return None;
        }
        let upper = self.upper();
        if scale_x < self.min || scale_y < self.min {
            Some(self.min / scale_x)
        } else if scale_x > upper || scale_y > upper {
            Some(upper / scale_x)
        } else {
            None
        }
    }

    /// The effective maximum, never below `min`.
    pub fn upper(&self) -> f64 {
        self.max.max(self.min)
    }

    pub fn contains(&self, scale: f64, tolerance: f64) -> bool {
        scale >= self.min * (1.0 - tolerance) && scale <= self.upper() * (1.0 + tolerance)
    }
}

/// Computes and applies corrections for one image in one hole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsEnforcer {
    frame: ImageFrame,
    geometry: HoleGeometry,
}

impl BoundsEnforcer {
    pub fn new(frame: ImageFrame, geometry: HoleGeometry) -> Self {
        Self { frame, geometry }
    }

    pub fn frame(&self) -> &ImageFrame {
        &self.frame
    }

    pub fn geometry(&self) -> &HoleGeometry {
        &self.geometry
    }

    /// Scale limits at the transform's current rotation.
    ///
    /// `min` uses the bounding box of the unit-scale image rotated like
    /// `transform`, which is the intrinsic size when unrotated. `max` is
    /// `max(container.w / image.w, container.h / image.h)`.
    pub fn scale_limits(&self, transform: &AffineTransform) -> ScaleLimits {
        let rotation = transform.rotation();
        let (sin, cos) = (rotation.sin().abs(), rotation.cos().abs());
        let (w, h) = (self.frame.width(), self.frame.height());
        let bound_w = w * cos + h * sin;
        let bound_h = w * sin + h * cos;

        let hole = self.geometry.hole_size();
        let container = self.geometry.container_size();
        ScaleLimits {
            min: (hole.width / bound_w).max(hole.height / bound_h),
            max: (container.width / w).max(container.height / h),
        }
    }

    /// Pull the scale back into range. Returns the factor applied, if any.
    pub fn clamp_scale(&self, state: &mut TransformState) -> Option<f64> {
        let current = state.snapshot();
        let limits = self.scale_limits(&current);
        let factor = limits.correction_factor(current.scale_x(), current.scale_y())?;
        log::debug!(
            "clamping scale {:.4} into [{:.4}, {:.4}] (factor {:.4})",
            current.scale_x(),
            limits.min,
            limits.max,
            factor
        );
        state.apply(AffineTransform::scale(factor));
        Some(factor)
    }

    /// The container-space offset that slides the image back over the hole.
    pub fn coverage_offset(&self, transform: &AffineTransform) -> Vec2 {
        let bounds = self.frame.bounding_rect(transform, &self.geometry);
        coverage_offset(bounds, self.geometry.hole_rect())
    }

    /// The local-frame translation that realises [`coverage_offset`](Self::coverage_offset),
    /// or `None` when the image already covers the hole.
    pub fn correction(&self, transform: &AffineTransform) -> Option<AffineTransform> {
        let offset = self.coverage_offset(transform);
        if offset == Vec2::ZERO {
            return None;
        }
        let local = container_to_local(transform, offset)?;
        Some(AffineTransform::translate(local.x, local.y))
    }

    /// Apply the coverage correction. Returns the container-space offset
    /// that was applied (zero if none was needed).
    pub fn enforce(&self, state: &mut TransformState) -> Vec2 {
        let current = state.snapshot();
        match self.correction(&current) {
            Some(delta) => {
                let offset = self.coverage_offset(&current);
                log::debug!("sliding image by ({:.3}, {:.3})", offset.x, offset.y);
                state.apply(delta);
                offset
            }
            None => Vec2::ZERO,
        }
    }

    /// Scale clamp followed by coverage correction.
    pub fn settle(&self, state: &mut TransformState) {
        self.clamp_scale(state);
        self.enforce(state);
    }

    /// Whether the transformed bounding rectangle contains the hole.
    pub fn covers_hole(&self, transform: &AffineTransform) -> bool {
        let bounds = self.frame.bounding_rect(transform, &self.geometry);
        let hole = self.geometry.hole_rect();
        bounds.x0 <= hole.x0 + COVERAGE_TOLERANCE
            && bounds.y0 <= hole.y0 + COVERAGE_TOLERANCE
            && bounds.x1 >= hole.x1 - COVERAGE_TOLERANCE
            && bounds.y1 >= hole.y1 - COVERAGE_TOLERANCE
    }
}

/// Per-axis offset moving `bounds` over `hole`.
pub fn coverage_offset(bounds: Rect, hole: Rect) -> Vec2 {
    Vec2::new(
        axis_offset(bounds.x0, bounds.x1, hole.x0, hole.x1),
        axis_offset(bounds.y0, bounds.y1, hole.y0, hole.y1),
    )
}

fn axis_offset(bound_min: f64, bound_max: f64, hole_min: f64, hole_max: f64) -> f64 {
    let offset = if (bound_max - bound_min) + COVERAGE_TOLERANCE < hole_max - hole_min {
        (hole_min + hole_max) / 2.0 - (bound_min + bound_max) / 2.0
    } else if bound_min > hole_min {
        hole_min - bound_min
    } else if bound_max < hole_max {
        hole_max - bound_max
    } else {
        0.0
    };

    if offset.abs() <= COVERAGE_TOLERANCE {
        0.0
    } else {
        offset
    }
}

/// Convert a container-space offset into the transform's local frame:
/// divide by the current scale, then undo the rotation.
fn container_to_local(transform: &AffineTransform, offset: Vec2) -> Option<Vec2> {
    let (sx, sy) = (transform.scale_x(), transform.scale_y());
    if sx <= 0.0 || sy <= 0.0 {
        return None;
    }
    let unscaled = Vec2::new(offset.x / sx, offset.y / sy);
    Some(transform.inverse_rotation().transform_vector(unscaled))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use kurbo::Size;
    use proptest::prelude::*;

    fn enforcer_strategy() -> impl Strategy<Value = BoundsEnforcer> {
        (
            (50.0f64..=400.0, 50.0f64..=400.0),
            (0.0f64..=300.0, 0.0f64..=300.0),
            (10.0f64..=2000.0, 10.0f64..=2000.0),
        )
            .prop_map(|((hw, hh), (extra_w, extra_h), (iw, ih))| {
                let geometry =
                    HoleGeometry::new(Size::new(hw, hh), Size::new(hw + extra_w, hh + extra_h))
                        .unwrap();
                let frame = ImageFrame::new(Size::new(iw, ih)).unwrap();
                BoundsEnforcer::new(frame, geometry)
            })
    }

    fn transform_strategy() -> impl Strategy<Value = AffineTransform> {
        (
            0.01f64..=10.0,
            -std::f64::consts::PI..=std::f64::consts::PI,
            -3000.0f64..=3000.0,
            -3000.0f64..=3000.0,
        )
            .prop_map(|(scale, angle, tx, ty)| {
                AffineTransform::translate(tx, ty)
                    .then_local(&AffineTransform::rotate(angle))
                    .then_local(&AffineTransform::scale(scale))
            })
    }

    proptest! {
        /// Property: after settling, the bounding box covers the hole.
        #[test]
        fn prop_settle_covers_hole(e in enforcer_strategy(), t in transform_strategy()) {
            let mut state = TransformState::new(t);
            e.settle(&mut state);

            let bounds = e.frame().bounding_rect(&state.snapshot(), e.geometry());
            let hole = e.geometry().hole_rect();
            prop_assert!(bounds.x0 <= hole.x0 + 1e-6, "left gap: {:?} vs {:?}", bounds, hole);
            prop_assert!(bounds.y0 <= hole.y0 + 1e-6, "top gap: {:?} vs {:?}", bounds, hole);
            prop_assert!(bounds.x1 >= hole.x1 - 1e-6, "right gap: {:?} vs {:?}", bounds, hole);
            prop_assert!(bounds.y1 >= hole.y1 - 1e-6, "bottom gap: {:?} vs {:?}", bounds, hole);
        }

        /// Property: a second enforcement pass changes nothing.
        #[test]
        fn prop_enforce_idempotent(e in enforcer_strategy(), t in transform_strategy()) {
            let mut state = TransformState::new(t);
            e.clamp_scale(&mut state);
            e.enforce(&mut state);
            let once = state.snapshot();

            let offset = e.enforce(&mut state);
            prop_assert_eq!(offset, Vec2::ZERO);
            prop_assert_eq!(state.snapshot(), once);
        }

        /// Property: enforcement never changes rotation or scale.
        #[test]
        fn prop_enforce_preserves_rotation_and_scale(e in enforcer_strategy(), t in transform_strategy()) {
            let mut state = TransformState::new(t);
            e.enforce(&mut state);
            let after = state.snapshot();
            prop_assert!((after.scale_x() - t.scale_x()).abs() < 1e-9);
            prop_assert!((after.a - t.a).abs() < 1e-12 && (after.d - t.d).abs() < 1e-12);
        }

        /// Property: clamped scale lies within the limits.
        #[test]
        fn prop_clamp_within_limits(e in enforcer_strategy(), t in transform_strategy()) {
            let mut state = TransformState::new(t);
            e.clamp_scale(&mut state);
            let after = state.snapshot();
            let limits = e.scale_limits(&after);
            if limits.min <= limits.max {
                prop_assert!(limits.contains(after.scale_x(), 1e-9));
            } else {
                prop_assert!((after.scale_x() - limits.min).abs() <= limits.min * 1e-9);
            }
        }
    }
}
