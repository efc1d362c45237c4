//! Decoding of encoded image bytes into RGB buffers.

use std::io::Cursor;

use image::ImageReader;

use super::{DecodeError, DecodedImage};

/// Decode an image from bytes, sniffing the format from its contents.
///
/// Any format enabled on the `image` dependency (JPEG and PNG) is accepted.
/// The result is always converted to 8-bit RGB.
///
/// # Errors
///
/// Returns `DecodeError::UnknownFormat` if the bytes are not a recognized
/// image format, `DecodeError::Malformed` if decoding fails part way,
/// and `DecodeError::Empty` if the decoded image has no pixels.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::UnknownFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let decoded = DecodedImage::from_rgb_image(img.into_rgb8());
    if decoded.is_empty() {
        return Err(DecodeError::Empty {
            width: decoded.width,
            height: decoded.height,
        });
    }
    Ok(decoded)
}
