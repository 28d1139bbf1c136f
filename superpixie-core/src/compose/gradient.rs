//! Two-color gradients over the matrix

use crate::color::ColorF;
use crate::math::saw_to_tri;
use crate::raster::{LEDS_X, LEDS_Y};
use crate::state::GradientType;

/// Blend weight of color B at a pixel
///
/// `brightness` is the pixel's mask value and only matters for
/// [`GradientType::Brightness`], where dim pixels lean towards color B.
pub fn mix(kind: GradientType, x: usize, y: usize, brightness: f32) -> f32 {
    let horizontal = x as f32 / (LEDS_X - 1) as f32;
    let vertical = y as f32 / (LEDS_Y - 1) as f32;
    match kind {
        GradientType::None => 0.0,
        GradientType::Horizontal => horizontal,
        GradientType::HorizontalMirrored => saw_to_tri(horizontal),
        GradientType::Vertical => vertical,
        GradientType::VerticalMirrored => saw_to_tri(vertical),
        GradientType::Brightness => 1.0 - brightness,
    }
}

/// Gradient color at a pixel
pub fn color_at(kind: GradientType, a: ColorF, b: ColorF, x: usize, y: usize, brightness: f32) -> ColorF {
    a.lerp(b, mix(kind, x, y, brightness))
}
