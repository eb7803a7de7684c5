//! # Output Transforms
//!
//! Functions from a reconstructed array to pixels or file bytes.
//!
//! - [`plot`]: `Image`, `PPI`, `Plot` drawn into a [`Figure`] with `plotters`
//! - [`export`]: `Numpy`, `Raw`, `Text` written to a file
//!
//! Transforms never touch shared state. The registry hands each call its
//! own figure or output file.

pub mod colormap;
pub mod export;
pub mod figure;
pub mod fonts;
pub mod plot;

pub use figure::{Figure, Frame, PixelRect, Rgba, RAW_IMAGE_FORMAT};
