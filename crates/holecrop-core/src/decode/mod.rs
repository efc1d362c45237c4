//! Image decoding for the editor's source image.
//!
//! The editor works on plain RGB buffers. Hosts either hand over pixels
//! they already have or pass encoded bytes through [`decode_image`].
//!
//! # Examples
//!
//! ```ignore
//! use holecrop_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod load;
mod types;

pub use load::decode_image;
pub use types::{DecodeError, DecodedImage};
