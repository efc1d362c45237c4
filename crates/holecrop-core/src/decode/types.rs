//! RGB buffers for the source image and the rendered crop.

use kurbo::Size;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Content sniffing found no supported format.
    #[error("Unrecognised image format")]
    UnknownFormat,

    #[error("Malformed image data: {0}")]
    Malformed(String),

    #[error("Image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// An 8-bit RGB image, row-major, three bytes per pixel.
///
/// The editor's source image and the hole-sized render output share this
/// type. Fields are public so hosts can hand over buffers without a copy;
/// [`DecodedImage::has_valid_buffer`] reports whether they agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A single-colour image.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(Self::buffer_len(width, height))
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    fn buffer_len(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * 3
    }

    /// Byte length the buffer must have for the stated dimensions.
    pub fn expected_len(&self) -> usize {
        Self::buffer_len(self.width, self.height)
    }

    pub fn has_valid_buffer(&self) -> bool {
        self.pixels.len() == self.expected_len()
    }

    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Pixel size as a kurbo size, the unit the geometry code works in.
    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// `None` outside the image or past the end of a short buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 3;
        match self.pixels.get(idx..idx + 3)? {
            &[r, g, b] => Some([r, g, b]),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_buffer_matches_dimensions() {
        let img = DecodedImage::filled(4, 3, [10, 20, 30]);
        assert!(img.has_valid_buffer());
        assert_eq!(img.expected_len(), 36);
        assert_eq!(img.pixel_count(), 12);
        assert_eq!(img.pixel(3, 2), Some([10, 20, 30]));
        assert_eq!(img.size(), Size::new(4.0, 3.0));
    }

    #[test]
    fn test_short_buffer() {
        let img = DecodedImage::new(2, 2, vec![1, 2, 3, 4, 5, 6]);
        assert!(!img.has_valid_buffer());
        assert_eq!(img.pixel(1, 0), Some([4, 5, 6]));
        assert_eq!(img.pixel(0, 1), None);
    }

    #[test]
    fn test_pixel_out_of_range() {
        let img = DecodedImage::filled(2, 2, [1, 2, 3]);
        assert_eq!(img.pixel(2, 0), None);
        assert_eq!(img.pixel(0, 2), None);
    }

    #[test]
    fn test_empty() {
        assert!(DecodedImage::new(0, 0, vec![]).is_empty());
        assert!(DecodedImage::new(5, 5, vec![]).is_empty());
        assert!(!DecodedImage::filled(1, 1, [0, 0, 0]).is_empty());
    }

    #[test]
    fn test_from_rgb_image() {
        let rgb = image::RgbImage::from_pixel(5, 7, image::Rgb([200, 100, 50]));
        assert_eq!(
            DecodedImage::from_rgb_image(rgb),
            DecodedImage::filled(5, 7, [200, 100, 50])
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DecodeError::Empty { width: 0, height: 3 }.to_string(),
            "Image has no pixels (0x3)"
        );
        assert_eq!(DecodeError::UnknownFormat.to_string(), "Unrecognised image format");
    }
}
