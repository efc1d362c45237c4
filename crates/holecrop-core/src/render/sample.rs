//! Pixel sampling with nearest, bilinear, and Lanczos3 interpolation.
//!
//! Sample coordinates use the pixel-centre convention: pixel `(i, j)` is
//! centred at `(i, j)`. Neighbours outside the image are clamped to the
//! nearest edge pixel, so samples up to half a pixel past the border
//! still get the edge colour instead of bleeding in black.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// Interpolation filter used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Nearest neighbour - cheapest, blocky when zoomed in.
    Nearest,
    /// Bilinear - good for interactive previews.
    #[default]
    Bilinear,
    /// Lanczos3 - sharper, for the final export.
    Lanczos3,
}

/// Sample `image` at `(x, y)` with `filter`.
pub(crate) fn sample(image: &DecodedImage, x: f64, y: f64, filter: InterpolationFilter) -> [u8; 3] {
    match filter {
        InterpolationFilter::Nearest => sample_nearest(image, x, y),
        InterpolationFilter::Bilinear => sample_bilinear(image, x, y),
        InterpolationFilter::Lanczos3 => sample_lanczos3(image, x, y),
    }
}

/// Get a pixel as [f64; 3], clamping the coordinates to the image.
#[inline]
fn texel(image: &DecodedImage, x: i64, y: i64) -> [f64; 3] {
    let px = x.clamp(0, image.width as i64 - 1) as usize;
    let py = y.clamp(0, image.height as i64 - 1) as usize;
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

#[inline]
fn to_rgb(v: [f64; 3]) -> [u8; 3] {
    v.map(|c| c.clamp(0.0, 255.0).round() as u8)
}

fn sample_nearest(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    to_rgb(texel(image, x.round() as i64, y.round() as i64))
}

/// Weighted average of the 4 nearest pixels.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = texel(image, x0, y0);
    let p10 = texel(image, x0 + 1, y0);
    let p01 = texel(image, x0, y0 + 1);
    let p11 = texel(image, x0 + 1, y0 + 1);

    to_rgb(std::array::from_fn(|i| {
        p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy
    }))
}

/// Lanczos3 over a 6x6 neighbourhood, normalised by the weight sum.
fn sample_lanczos3(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        let py = y0 + ky;
        let wy = lanczos_weight(y - py as f64, 3.0);
        for kx in -2..=3 {
            let px = x0 + kx;
            let weight = lanczos_weight(x - px as f64, 3.0) * wy;

            let pixel = texel(image, px, py);
            for (acc, channel) in sum.iter_mut().zip(pixel) {
                *acc += channel * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum.abs() < f64::EPSILON {
        return sample_bilinear(image, x, y);
    }
    to_rgb(sum.map(|s| s / weight_sum))
}

/// Lanczos kernel:
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}
