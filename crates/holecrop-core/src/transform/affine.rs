//! The six-scalar affine transform and the single-writer state holding it.
//!
//! # Matrix Layout
//!
//! ```text
//! x' = a * x + c * y + tx
//! y' = b * x + d * y + ty
//! ```
//!
//! This is the same coefficient order as [`kurbo::Affine`], so conversions
//! in both directions are lossless.
//!
//! # Composition
//!
//! [`TransformState::apply`] composes a delta in the transform's *local*
//! frame: the delta acts on a point first and the existing transform acts
//! on the result. Translating by `(10, 0)` after a 90° rotation therefore
//! moves along the rotated x axis.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Determinants with a smaller magnitude are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A 2D affine transform stored as `(a, b, c, d, tx, ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    /// The identity transform `(1, 0, 0, 1, 0, 0)`.
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self {
            a,
            b,
            c,
            d,
            tx,
            ty,
        }
    }

    /// A pure translation.
    pub fn translate(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// A uniform scale about the origin.
    pub fn scale(factor: f64) -> Self {
        Self::new(factor, 0.0, 0.0, factor, 0.0, 0.0)
    }

    /// A rotation about the origin, in radians.
    ///
    /// Positive angles rotate from the x axis towards the y axis, which is
    /// clockwise on screen in a y-down coordinate system.
    pub fn rotate(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation angle in radians, `atan2(b, a)`.
    pub fn rotation(&self) -> f64 {
        self.b.atan2(self.a)
    }

    /// Horizontal scale factor, `sqrt(a² + c²)`.
    pub fn scale_x(&self) -> f64 {
        self.a.hypot(self.c)
    }

    /// Vertical scale factor, `sqrt(b² + d²)`.
    pub fn scale_y(&self) -> f64 {
        self.b.hypot(self.d)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    pub fn is_finite(&self) -> bool {
        self.as_coeffs().iter().all(|v| v.is_finite())
    }

    /// Returns the inverse transform, or `None` if the matrix is singular
    /// or contains non-finite values.
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_finite() || self.determinant().abs() < SINGULAR_EPSILON {
            return None;
        }
        Some(Affine::from(*self).inverse().into())
    }

    /// The rotation component alone, with scale and translation dropped.
    pub fn rotation_only(&self) -> Self {
        Self::rotate(self.rotation())
    }

    /// Inverse of [`rotation_only`](Self::rotation_only).
    ///
    /// Maps container-space directions into the transform's local frame,
    /// ignoring scale.
    pub fn inverse_rotation(&self) -> Self {
        Self::rotate(-self.rotation())
    }

    /// `self ∘ delta`: applies `delta` first, then `self`.
    pub fn then_local(&self, delta: &AffineTransform) -> Self {
        (Affine::from(*self) * Affine::from(*delta)).into()
    }

    /// Maps a point through the full transform.
    pub fn transform_point(&self, point: Point) -> Point {
        Affine::from(*self) * point
    }

    /// Maps a vector through the linear part only (translation ignored).
    pub fn transform_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    /// The translation component.
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.tx, self.ty)
    }

    pub fn as_coeffs(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }

    pub fn from_coeffs(coeffs: [f64; 6]) -> Self {
        let [a, b, c, d, tx, ty] = coeffs;
        Self::new(a, b, c, d, tx, ty)
    }

    /// Component-wise linear interpolation between `self` and `other`.
    pub fn lerp(&self, other: &AffineTransform, t: f64) -> Self {
        let from = self.as_coeffs();
        let to = other.as_coeffs();
        Self::from_coeffs(std::array::from_fn(|i| from[i] + (to[i] - from[i]) * t))
    }

    /// Whether all six scalars are within `tolerance` of `other`'s.
    pub fn approx_eq(&self, other: &AffineTransform, tolerance: f64) -> bool {
        self.as_coeffs()
            .iter()
            .zip(other.as_coeffs().iter())
            .all(|(x, y)| (x - y).abs() <= tolerance)
    }
}

impl From<Affine> for AffineTransform {
    fn from(affine: Affine) -> Self {
        Self::from_coeffs(affine.as_coeffs())
    }
}

impl From<AffineTransform> for Affine {
    fn from(t: AffineTransform) -> Self {
        Affine::new(t.as_coeffs())
    }
}

/// The live transform of an edit session.
///
/// No validation happens here; coverage and scale limits are restored by
/// the bounds enforcer once a gesture ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformState {
    current: AffineTransform,
}

impl TransformState {
    pub fn new(initial: AffineTransform) -> Self {
        Self { current: initial }
    }

    /// Compose `delta` in the current local frame.
    pub fn apply(&mut self, delta: AffineTransform) {
        self.current = self.current.then_local(&delta);
    }

    /// The current transform, by value.
    pub fn snapshot(&self) -> AffineTransform {
        self.current
    }

    /// Replace the transform wholesale.
    pub fn reset(&mut self, to: AffineTransform) {
        self.current = to;
    }
}
