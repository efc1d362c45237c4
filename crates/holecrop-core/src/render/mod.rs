//! Producing the final cropped image.
//!
//! The renderer consumes a transform snapshot and never touches session
//! state, so a host may run it off the interaction thread.

mod crop;
mod sample;

pub use crop::{crop, RenderError, RenderOptions};
pub use sample::InterpolationFilter;
