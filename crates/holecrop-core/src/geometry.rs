//! Hole, container, and image placement geometry.
//!
//! # Coordinate System
//!
//! - Container space: origin at the container's top-left corner, y down.
//! - The hole is centred in the container.
//! - Image-local space: origin at the image centre. The edit transform maps
//!   image-local points to offsets from the hole centre, so a source pixel
//!   `p` lands at `hole_center + T(p - image_center)`.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use thiserror::Error;

use crate::decode::DecodedImage;
use crate::transform::AffineTransform;

/// Errors produced while validating sizes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A size was zero, negative, or not finite.
    #[error("Invalid {what} size {width}x{height}: dimensions must be positive and finite")]
    InvalidSize {
        what: &'static str,
        width: f64,
        height: f64,
    },

    /// The hole is larger than the container in at least one dimension.
    #[error("Hole {hole_width}x{hole_height} does not fit in container {container_width}x{container_height}")]
    HoleExceedsContainer {
        hole_width: f64,
        hole_height: f64,
        container_width: f64,
        container_height: f64,
    },
}

fn validate_size(what: &'static str, size: Size) -> Result<Size, GeometryError> {
    let valid = size.width.is_finite()
        && size.height.is_finite()
        && size.width > 0.0
        && size.height > 0.0;
    if valid {
        Ok(size)
    } else {
        Err(GeometryError::InvalidSize {
            what,
            width: size.width,
            height: size.height,
        })
    }
}

/// A hole of fixed size centred in a fixed-size container.
///
/// Immutable for the lifetime of an edit session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoleGeometry {
    hole: Size,
    container: Size,
}

impl HoleGeometry {
    pub fn new(hole: Size, container: Size) -> Result<Self, GeometryError> {
        let hole = validate_size("hole", hole)?;
        let container = validate_size("container", container)?;
        if hole.width > container.width || hole.height > container.height {
            return Err(GeometryError::HoleExceedsContainer {
                hole_width: hole.width,
                hole_height: hole.height,
                container_width: container.width,
                container_height: container.height,
            });
        }
        Ok(Self { hole, container })
    }

    pub fn hole_size(&self) -> Size {
        self.hole
    }

    pub fn container_size(&self) -> Size {
        self.container
    }

    pub fn container_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.container)
    }

    /// Top-left corner of the hole in container space.
    pub fn hole_origin(&self) -> Point {
        Point::new(
            (self.container.width - self.hole.width) / 2.0,
            (self.container.height - self.hole.height) / 2.0,
        )
    }

    pub fn hole_rect(&self) -> Rect {
        Rect::from_origin_size(self.hole_origin(), self.hole)
    }

    /// Centre of the hole, which is also the centre of the container.
    pub fn center(&self) -> Point {
        self.hole_rect().center()
    }
}

/// The source image's natural size and its placement under a transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFrame {
    size: Size,
}

impl ImageFrame {
    pub fn new(size: Size) -> Result<Self, GeometryError> {
        Ok(Self {
            size: validate_size("image", size)?,
        })
    }

    pub fn from_image(image: &DecodedImage) -> Result<Self, GeometryError> {
        Self::new(image.size())
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// The untransformed image rectangle in image-local space.
    pub fn local_rect(&self) -> Rect {
        Rect::from_center_size(Point::ORIGIN, self.size)
    }

    /// Maps image-local points into container space.
    pub fn placement(&self, transform: &AffineTransform, geometry: &HoleGeometry) -> Affine {
        Affine::translate(geometry.center().to_vec2()) * Affine::from(*transform)
    }

    /// Maps source pixel coordinates (origin top-left) into container space.
    pub fn image_to_container(&self, transform: &AffineTransform, geometry: &HoleGeometry) -> Affine {
        let to_local = Vec2::new(-self.size.width / 2.0, -self.size.height / 2.0);
        self.placement(transform, geometry) * Affine::translate(to_local)
    }

    /// Axis-aligned bounding rectangle of the transformed image, in
    /// container space.
    pub fn bounding_rect(&self, transform: &AffineTransform, geometry: &HoleGeometry) -> Rect {
        self.placement(transform, geometry)
            .transform_rect_bbox(self.local_rect())
    }

    /// The smallest uniform scale at which the unrotated image covers the hole.
    pub fn cover_fit_scale(&self, geometry: &HoleGeometry) -> f64 {
        let hole = geometry.hole_size();
        (hole.width / self.size.width).max(hole.height / self.size.height)
    }

    /// Baseline transform for a freshly assigned image: cover-fit scale,
    /// centred on the hole.
    pub fn cover_fit(&self, geometry: &HoleGeometry) -> AffineTransform {
        AffineTransform::scale(self.cover_fit_scale(geometry))
    }
}
