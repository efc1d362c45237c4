//! Turning raw gesture deltas into transform updates.
//!
//! Gesture recognisers report deltas in the container's stationary frame,
//! while the transform accumulates in the image's own, possibly rotated,
//! frame. Pan deltas are therefore rotated by the inverse of the current
//! rotation before they are composed, so dragging right always moves the
//! image right on screen.
//!
//! Every event carries a delta, never a cumulative value: hosts reset their
//! recogniser (pinch scale to 1, rotation to 0, pan translation to zero)
//! after each event.
//!
//! When a gesture ends, the accumulator runs the bounds enforcer and
//! returns the resulting [`Correction`] for the host to animate.

use std::f64::consts::FRAC_PI_2;
use std::str::FromStr;

use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::affine::{AffineTransform, TransformState};
use super::animation::Correction;
use super::bounds::BoundsEnforcer;

/// Errors for malformed gesture input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    /// A pinch factor of zero, a negative factor, or a non-finite factor.
    #[error("Invalid pinch scale factor {0}: must be positive and finite")]
    InvalidScaleFactor(f64),

    #[error("Invalid pan translation ({dx}, {dy}): components must be finite")]
    InvalidTranslation { dx: f64, dy: f64 },

    #[error("Invalid rotation delta {0}: must be finite")]
    InvalidRotation(f64),

    #[error("Unknown gesture phase '{0}'")]
    UnknownPhase(String),
}

/// Lifecycle phase of a gesture event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    /// The recogniser gave up. The delta is dropped, but the end-of-gesture
    /// correction still runs so the image never stays off the hole.
    Cancelled,
}

impl GesturePhase {
    /// Whether this phase finishes the gesture.
    pub fn is_terminal(self) -> bool {
        matches!(self, GesturePhase::Ended | GesturePhase::Cancelled)
    }
}

impl FromStr for GesturePhase {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "began" | "begin" => Ok(GesturePhase::Began),
            "changed" | "change" => Ok(GesturePhase::Changed),
            "ended" | "end" => Ok(GesturePhase::Ended),
            "cancelled" | "canceled" => Ok(GesturePhase::Cancelled),
            _ => Err(GestureError::UnknownPhase(s.to_string())),
        }
    }
}

/// The delta carried by a gesture event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GestureKind {
    /// Translation in container coordinates.
    Pan { dx: f64, dy: f64 },
    /// Multiplicative scale delta.
    Pinch {
        #[serde(rename = "scaleFactor")]
        scale_factor: f64,
    },
    /// Rotation delta in radians.
    Rotate {
        #[serde(rename = "deltaAngle")]
        delta_angle: f64,
    },
}

impl GestureKind {
    fn validate(&self) -> Result<(), GestureError> {
        match *self {
            GestureKind::Pan { dx, dy } if !(dx.is_finite() && dy.is_finite()) => {
                Err(GestureError::InvalidTranslation { dx, dy })
            }
            GestureKind::Pinch { scale_factor } if !(scale_factor.is_finite() && scale_factor > 0.0) => {
                Err(GestureError::InvalidScaleFactor(scale_factor))
            }
            GestureKind::Rotate { delta_angle } if !delta_angle.is_finite() => {
                Err(GestureError::InvalidRotation(delta_angle))
            }
            _ => Ok(()),
        }
    }
}

/// One gesture callback from the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    #[serde(flatten)]
    pub kind: GestureKind,
    pub phase: GesturePhase,
}

impl GestureEvent {
    pub fn pan(dx: f64, dy: f64, phase: GesturePhase) -> Self {
        Self {
            kind: GestureKind::Pan { dx, dy },
            phase,
        }
    }

    pub fn pinch(scale_factor: f64, phase: GesturePhase) -> Self {
        Self {
            kind: GestureKind::Pinch { scale_factor },
            phase,
        }
    }

    pub fn rotate(delta_angle: f64, phase: GesturePhase) -> Self {
        Self {
            kind: GestureKind::Rotate { delta_angle },
            phase,
        }
    }
}

/// Routes gesture events into a [`TransformState`].
///
/// Holds only the enablement switches; the transform itself belongs to the
/// session. Rotation gestures are off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureAccumulator {
    enabled: bool,
    rotation_enabled: bool,
}

impl Default for GestureAccumulator {
    fn default() -> Self {
        Self {
            enabled: true,
            rotation_enabled: false,
        }
    }
}

impl GestureAccumulator {
    pub fn new(enabled: bool, rotation_enabled: bool) -> Self {
        Self {
            enabled,
            rotation_enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    pub fn set_rotation_enabled(&mut self, enabled: bool) {
        self.rotation_enabled = enabled;
    }

    /// Whether events of this kind are currently processed.
    pub fn accepts(&self, kind: &GestureKind) -> bool {
        match kind {
            GestureKind::Rotate { .. } => self.enabled && self.rotation_enabled,
            _ => self.enabled,
        }
    }

    /// Translate by a container-space delta, corrected into the local frame.
    ///
    /// Only the rotation is undone; the current scale still multiplies the
    /// on-screen movement.
    pub fn apply_pan(state: &mut TransformState, dx: f64, dy: f64) -> Result<(), GestureError> {
        GestureKind::Pan { dx, dy }.validate()?;
        let local = state
            .snapshot()
            .inverse_rotation()
            .transform_vector(Vec2::new(dx, dy));
        state.apply(AffineTransform::translate(local.x, local.y));
        Ok(())
    }

    /// Multiply the scale by `factor`.
    pub fn apply_pinch(state: &mut TransformState, factor: f64) -> Result<(), GestureError> {
        GestureKind::Pinch {
            scale_factor: factor,
        }
        .validate()?;
        state.apply(AffineTransform::scale(factor));
        Ok(())
    }

    /// Rotate by `delta` radians about the image centre.
    pub fn apply_rotation(state: &mut TransformState, delta: f64) -> Result<(), GestureError> {
        GestureKind::Rotate { delta_angle: delta }.validate()?;
        state.apply(AffineTransform::rotate(delta));
        Ok(())
    }

    /// The discrete rotate action: exactly one quarter turn.
    pub fn rotate_quarter_turn(state: &mut TransformState) {
        state.apply(AffineTransform::rotate(FRAC_PI_2));
    }

    /// Process one gesture event.
    ///
    /// Returns `Ok(None)` while a gesture is in progress or when the gesture
    /// kind is disabled, and `Ok(Some(correction))` when it ends. Invalid
    /// deltas are rejected before anything is applied.
    pub fn handle(
        &self,
        state: &mut TransformState,
        enforcer: &BoundsEnforcer,
        event: GestureEvent,
        correction_duration: f64,
    ) -> Result<Option<Correction>, GestureError> {
        if !self.accepts(&event.kind) {
            return Ok(None);
        }
        event.kind.validate()?;

        if event.phase != GesturePhase::Cancelled {
            match event.kind {
                GestureKind::Pan { dx, dy } => Self::apply_pan(state, dx, dy)?,
                GestureKind::Pinch { scale_factor } => Self::apply_pinch(state, scale_factor)?,
                GestureKind::Rotate { delta_angle } => Self::apply_rotation(state, delta_angle)?,
            }
        }

        if !event.phase.is_terminal() {
            return Ok(None);
        }

        let before = state.snapshot();
        match event.kind {
            GestureKind::Pan { .. } => {
                enforcer.enforce(state);
            }
            GestureKind::Pinch { .. } | GestureKind::Rotate { .. } => enforcer.settle(state),
        }
        Ok(Some(Correction::new(
            before,
            state.snapshot(),
            correction_duration,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{HoleGeometry, ImageFrame};
    use crate::transform::DEFAULT_CORRECTION_DURATION;
    use kurbo::Size;
    use std::f64::consts::{FRAC_PI_4, PI};

    const EPS: f64 = 1e-9;

    /// Hole 300x200 in a 400x600 container with a 600x300 image.
    fn enforcer() -> BoundsEnforcer {
        let geometry =
            HoleGeometry::new(Size::new(300.0, 200.0), Size::new(400.0, 600.0)).unwrap();
        let frame = ImageFrame::new(Size::new(600.0, 300.0)).unwrap();
        BoundsEnforcer::new(frame, geometry)
    }

    fn cover_state(e: &BoundsEnforcer) -> TransformState {
        TransformState::new(e.frame().cover_fit(e.geometry()))
    }

    fn send(
        acc: &GestureAccumulator,
        state: &mut TransformState,
        e: &BoundsEnforcer,
        event: GestureEvent,
    ) -> Option<Correction> {
        acc.handle(state, e, event, DEFAULT_CORRECTION_DURATION)
            .unwrap()
    }

    #[test]
    fn test_pan_unrotated_moves_by_scaled_delta() {
        let mut state = TransformState::new(AffineTransform::scale(2.0));
        GestureAccumulator::apply_pan(&mut state, 10.0, 5.0).unwrap();

        let t = state.snapshot();
        assert!((t.tx - 20.0).abs() < EPS);
        assert!((t.ty - 10.0).abs() < EPS);
    }

    #[test]
    fn test_pan_after_quarter_turn_uses_local_frame() {
        let mut state = TransformState::new(AffineTransform::rotate(FRAC_PI_2));
        GestureAccumulator::apply_pan(&mut state, 10.0, 0.0).unwrap();

        // The delta was composed as a local translation along -y ...
        let expected =
            AffineTransform::rotate(FRAC_PI_2).then_local(&AffineTransform::translate(0.0, -10.0));
        assert!(state.snapshot().approx_eq(&expected, EPS));

        // ... which shows up as a purely horizontal move in the container.
        let t = state.snapshot();
        assert!((t.tx - 10.0).abs() < EPS);
        assert!(t.ty.abs() < EPS);
    }

    #[test]
    fn test_pan_after_diagonal_rotation_stays_horizontal() {
        let mut state = TransformState::new(AffineTransform::rotate(FRAC_PI_4));
        GestureAccumulator::apply_pan(&mut state, 25.0, 0.0).unwrap();

        let t = state.snapshot();
        assert!((t.tx - 25.0).abs() < EPS);
        assert!(t.ty.abs() < EPS);
        assert!((t.rotation() - FRAC_PI_4).abs() < EPS);
    }

    #[test]
    fn test_pinch_rejects_non_positive_factor() {
        let mut state = TransformState::new(AffineTransform::scale(1.5));
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = GestureAccumulator::apply_pinch(&mut state, factor);
            assert!(matches!(result, Err(GestureError::InvalidScaleFactor(_))));
        }
        assert_eq!(state.snapshot(), AffineTransform::scale(1.5));
    }

    #[test]
    fn test_handle_rejects_invalid_without_applying() {
        let e = enforcer();
        let acc = GestureAccumulator::default();
        let mut state = cover_state(&e);
        let before = state.snapshot();

        let result = acc.handle(
            &mut state,
            &e,
            GestureEvent::pan(f64::NAN, 0.0, GesturePhase::Ended),
            DEFAULT_CORRECTION_DURATION,
        );
        assert!(matches!(result, Err(GestureError::InvalidTranslation { .. })));
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_pinch_accumulates_deltas() {
        let e = enforcer();
        let acc = GestureAccumulator::default();
        let mut state = TransformState::new(AffineTransform::IDENTITY);

        assert!(send(&acc, &mut state, &e, GestureEvent::pinch(1.2, GesturePhase::Began)).is_none());
        assert!(send(&acc, &mut state, &e, GestureEvent::pinch(1.25, GesturePhase::Changed)).is_none());
        assert!((state.snapshot().scale_x() - 1.5).abs() < EPS);
    }

    #[test]
    fn test_pinch_below_min_clamps_back() {
        let e = enforcer();
        let acc = GestureAccumulator::default();
        let mut state = cover_state(&e);
        let min = e.scale_limits(&state.snapshot()).min;

        send(&acc, &mut state, &e, GestureEvent::pinch(0.1, GesturePhase::Changed));
        assert!((state.snapshot().scale_x() - min * 0.1).abs() < EPS);

        let correction = send(&acc, &mut state, &e, GestureEvent::pinch(1.0, GesturePhase::Ended))
            .expect("end of gesture yields a correction");
        assert!((state.snapshot().scale_x() - min).abs() < EPS);
        assert_eq!(correction.to, state.snapshot());
        assert!((correction.from.scale_x() - min * 0.1).abs() < EPS);
        assert!(e.covers_hole(&state.snapshot()));
    }

    #[test]
    fn test_pinch_above_max_clamps_back() {
        let e = enforcer();
        let acc = GestureAccumulator::default();
        let mut state = cover_state(&e);
        let max = e.scale_limits(&state.snapshot()).max;

        send(&acc, &mut state, &e, GestureEvent::pinch(50.0, GesturePhase::Changed));
        send(&acc, &mut state, &e, GestureEvent::pinch(1.0, GesturePhase::Ended));
        assert!((state.snapshot().scale_x() - max).abs() < EPS);
    }

    #[test]
    fn test_far_pan_then_end_covers_hole() {
        let e = enforcer();
        let acc = GestureAccumulator::default();
        let mut state = cover_state(&e);

        send(&acc, &mut state, &e, GestureEvent::pan(1000.0, 0.0, GesturePhase::Changed));
        let correction = send(&acc, &mut state, &e, GestureEvent::pan(0.0, 0.0, GesturePhase::Ended));
        assert!(correction.is_some());

        let bounds = e.frame().bounding_rect(&state.snapshot(), e.geometry());
        let hole = e.geometry().hole_rect();
        assert!((bounds.x0 - hole.x0).abs() < 1e-6);
        assert!(e.covers_hole(&state.snapshot()));
    }

    #[test]
    fn test_pan_in_progress_is_not_corrected() {
        let e = enforcer();
        let acc = GestureAccumulator::default();
        let mut state = cover_state(&e);

        send(&acc, &mut state, &e, GestureEvent::pan(500.0, 0.0, GesturePhase::Began));
        assert!(!e.covers_hole(&state.snapshot()));
    }

    #[test]
    fn test_cancel_drops_delta_but_corrects() {
        let e = enforcer();
        let acc = GestureAccumulator::default();
        let mut state = cover_state(&e);

        send(&acc, &mut state, &e, GestureEvent::pan(500.0, 0.0, GesturePhase::Changed));
        let moved = state.snapshot();
        let correction = send(&acc, &mut state, &e, GestureEvent::pan(999.0, 0.0, GesturePhase::Cancelled))
            .unwrap();
        assert_eq!(correction.from, moved);
        assert!(e.covers_hole(&state.snapshot()));
    }

    #[test]
    fn test_rotation_disabled_by_default() {
        let e = enforcer();
        let acc = GestureAccumulator::default();
        let mut state = cover_state(&e);
        let before = state.snapshot();

        let result = send(&acc, &mut state, &e, GestureEvent::rotate(0.3, GesturePhase::Ended));
        assert!(result.is_none());
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_rotation_gesture_when_enabled() {
        let e = enforcer();
        let mut acc = GestureAccumulator::default();
        acc.set_rotation_enabled(true);
        let mut state = cover_state(&e);

        send(&acc, &mut state, &e, GestureEvent::rotate(0.2, GesturePhase::Began));
        send(&acc, &mut state, &e, GestureEvent::rotate(0.3, GesturePhase::Changed));
        assert!((state.snapshot().rotation() - 0.5).abs() < EPS);

        send(&acc, &mut state, &e, GestureEvent::rotate(0.0, GesturePhase::Ended));
        assert!((state.snapshot().rotation() - 0.5).abs() < EPS);
        assert!(e.covers_hole(&state.snapshot()));
    }

    #[test]
    fn test_disabled_ignores_everything() {
        let e = enforcer();
        let acc = GestureAccumulator::new(false, true);
        let mut state = cover_state(&e);
        let before = state.snapshot();

        send(&acc, &mut state, &e, GestureEvent::pan(10.0, 10.0, GesturePhase::Ended));
        send(&acc, &mut state, &e, GestureEvent::pinch(2.0, GesturePhase::Ended));
        send(&acc, &mut state, &e, GestureEvent::rotate(1.0, GesturePhase::Ended));
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_quarter_turns() {
        let mut state = TransformState::default();
        GestureAccumulator::rotate_quarter_turn(&mut state);
        assert!((state.snapshot().rotation() - FRAC_PI_2).abs() < EPS);

        GestureAccumulator::rotate_quarter_turn(&mut state);
        assert!((state.snapshot().rotation().abs() - PI).abs() < EPS);
    }

    #[test]
    fn test_phase_from_str() {
        assert_eq!("began".parse::<GesturePhase>(), Ok(GesturePhase::Began));
        assert_eq!("Changed".parse::<GesturePhase>(), Ok(GesturePhase::Changed));
        assert_eq!("ended".parse::<GesturePhase>(), Ok(GesturePhase::Ended));
        assert_eq!("canceled".parse::<GesturePhase>(), Ok(GesturePhase::Cancelled));
        assert!(matches!(
            "sideways".parse::<GesturePhase>(),
            Err(GestureError::UnknownPhase(_))
        ));
    }

    #[test]
    fn test_event_json_shape() {
        let event: GestureEvent =
            serde_json::from_str(r#"{"type":"pinch","scaleFactor":1.5,"phase":"changed"}"#)
                .unwrap();
        assert_eq!(event, GestureEvent::pinch(1.5, GesturePhase::Changed));

        let event: GestureEvent =
            serde_json::from_str(r#"{"type":"pan","dx":3.0,"dy":-4.0,"phase":"ended"}"#).unwrap();
        assert_eq!(event, GestureEvent::pan(3.0, -4.0, GesturePhase::Ended));

        let json = serde_json::to_value(GestureEvent::rotate(0.5, GesturePhase::Began)).unwrap();
        assert_eq!(json["type"], "rotate");
        assert_eq!(json["deltaAngle"], 0.5);
        assert_eq!(json["phase"], "began");
    }
}
