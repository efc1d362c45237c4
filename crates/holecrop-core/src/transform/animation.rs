//! Corrections as start/target pairs the host can animate.
//!
//! The engine applies a correction to its state immediately and hands the
//! host a [`Correction`] describing the jump. Hosts that animate call
//! [`Correction::sample`] with the elapsed time on every frame. The value
//! is a pure function of its inputs, so no timer lives in the engine.

use serde::{Deserialize, Serialize};

use super::affine::AffineTransform;

/// Default animation length for a bounds correction, in seconds.
pub const DEFAULT_CORRECTION_DURATION: f64 = 0.25;

/// A transition from the transform at gesture end to the corrected one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub from: AffineTransform,
    pub to: AffineTransform,
    /// Seconds. Zero or negative means "jump".
    pub duration: f64,
}

impl Correction {
    pub fn new(from: AffineTransform, to: AffineTransform, duration: f64) -> Self {
        Self { from, to, duration }
    }

    /// True when the correction did not move anything.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    /// Linear progress in `[0, 1]` after `elapsed` seconds.
    pub fn progress(&self, elapsed: f64) -> f64 {
        if self.duration <= 0.0 || !self.duration.is_finite() {
            return 1.0;
        }
        (elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, elapsed: f64) -> bool {
        self.progress(elapsed) >= 1.0
    }

    /// The transform to display `elapsed` seconds into the animation.
    pub fn sample(&self, elapsed: f64) -> AffineTransform {
        match self.progress(elapsed) {
            p if p >= 1.0 => self.to,
            p if p <= 0.0 => self.from,
            p => self.from.lerp(&self.to, p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correction() -> Correction {
        Correction::new(
            AffineTransform::translate(0.0, 0.0),
            AffineTransform::translate(100.0, -40.0),
            DEFAULT_CORRECTION_DURATION,
        )
    }

    #[test]
    fn test_sample_endpoints() {
        let c = correction();
        assert_eq!(c.sample(0.0), c.from);
        assert_eq!(c.sample(-1.0), c.from);
        assert_eq!(c.sample(0.25), c.to);
        assert_eq!(c.sample(10.0), c.to);
    }

    #[test]
    fn test_sample_midpoint() {
        let c = correction();
        let mid = c.sample(0.125);
        assert!((mid.tx - 50.0).abs() < 1e-9);
        assert!((mid.ty + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let mut c = correction();
        c.duration = 0.0;
        assert_eq!(c.sample(0.0), c.to);
        assert!(c.is_finished(0.0));
    }

    #[test]
    fn test_progress_and_finished() {
        let c = correction();
        assert!((c.progress(0.05) - 0.2).abs() < 1e-9);
        assert!(!c.is_finished(0.2));
        assert!(c.is_finished(0.25));
    }

    #[test]
    fn test_noop() {
        let t = AffineTransform::scale(2.0);
        assert!(Correction::new(t, t, 0.25).is_noop());
        assert!(!correction().is_noop());
    }
}
