//! Vector glyph rasterization
//!
//! Glyphs are stored as polylines ([`glyph`]), transformed and drawn into
//! a [`Mask`] by distance-to-segment evaluation ([`stroke`]).

pub mod glyph;
pub mod mask;
pub mod stroke;

pub use glyph::{decode, LineMemory, Segment};
pub use mask::{Mask, LEDS_X, LEDS_Y};
pub use stroke::{rasterize, Transform};
