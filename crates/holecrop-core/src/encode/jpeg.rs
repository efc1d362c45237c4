//! JPEG encoding for saved crops.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate_rgb, EncodeError};

/// Encode an RGB buffer as baseline JPEG.
///
/// `quality` is clamped to 1..=100.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate_rgb(pixels, width, height)?;

    let mut out = Vec::with_capacity(pixels.len() / 8);
    JpegEncoder::new_with_quality(Cursor::new(&mut out), quality.clamp(1, 100))
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(out)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const SOI_BYTES: [u8; 2] = [0xFF, 0xD8];
    const EOI_BYTES: [u8; 2] = [0xFF, 0xD9];

    proptest! {
        #[test]
        fn prop_any_crop_size_encodes(
            (width, height) in (1u32..=40, 1u32..=40),
            quality in 1u8..=100,
        ) {
            let pixels = vec![90u8; (width as usize) * (height as usize) * 3];
            let jpeg = encode_jpeg(&pixels, width, height, quality).unwrap();
            prop_assert_eq!(&jpeg[..2], &SOI_BYTES);
            prop_assert_eq!(&jpeg[jpeg.len() - 2..], &EOI_BYTES);
        }

        #[test]
        fn prop_oversized_buffer_rejected(
            (width, height) in (1u32..=40, 1u32..=40),
            extra in 1usize..=10,
        ) {
            let pixels = vec![0u8; (width as usize) * (height as usize) * 3 + extra];
            let rejected = matches!(
                encode_jpeg(&pixels, width, height, 90),
                Err(EncodeError::InvalidPixelData { .. })
            );
            prop_assert!(rejected);
        }
    }
}
