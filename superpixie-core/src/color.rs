//! Linear floating-point colour

use smart_leds::RGB8;

use crate::math::{add_clipped, clip_unit, lerp};

/// RGB colour with 0.0..=1.0 channels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorF {
    pub const BLACK: ColorF = ColorF::new(0.0, 0.0, 0.0);
    pub const WHITE: ColorF = ColorF::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn from_array(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }

    pub fn lerp(self, other: ColorF, blend: f32) -> ColorF {
        ColorF::new(
            lerp(self.r, other.r, blend),
            lerp(self.g, other.g, blend),
            lerp(self.b, other.b, blend),
        )
    }

    pub fn scale(self, factor: f32) -> ColorF {
        ColorF::new(self.r * factor, self.g * factor, self.b * factor)
    }

    /// Channel-wise sum, each channel saturating at 1.0
    pub fn add_clipped(self, other: ColorF) -> ColorF {
        ColorF::new(
            add_clipped(self.r, other.r),
            add_clipped(self.g, other.g),
            add_clipped(self.b, other.b),
        )
    }

    /// Mean of the three channels
    pub fn luma(self) -> f32 {
        (self.r + self.g + self.b) / 3.0
    }

    pub fn clipped(self) -> ColorF {
        ColorF::new(clip_unit(self.r), clip_unit(self.g), clip_unit(self.b))
    }

    /// Quantize to 8 bits per channel
    pub fn to_rgb8(self) -> RGB8 {
        let c = self.clipped();
        RGB8::new(
            (c.r * 255.0 + 0.5) as u8,
            (c.g * 255.0 + 0.5) as u8,
            (c.b * 255.0 + 0.5) as u8,
        )
    }
}
