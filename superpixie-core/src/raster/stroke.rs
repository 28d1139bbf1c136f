//! Segment rasterizer
//!
//! Strokes are evaluated by distance to the segment, only inside the
//! segment's bounding box padded by the stroke width. The whole matrix is
//! re-rasterized every frame, so the box limit matters.

use crate::math::{segment_projection, wrap_degrees};
use crate::state::CharacterState;

use super::glyph::{LineMemory, Segment};
use super::mask::{Mask, LEDS_X, LEDS_Y};

/// Stroke width in pixels
pub const STROKE_WIDTH: f32 = 1.0;

/// Pixel the glyph origin maps to (matrix centre)
pub const MATRIX_CENTER: (f32, f32) = (3.0, 7.0);

/// Placement of a glyph on the matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Offset in glyph units, y pointing up
    pub offset: (f32, f32),
    pub scale: (f32, f32),
    /// Degrees, positive is counter-clockwise
    pub rotation: f32,
    pub opacity: f32,
    /// Pixel the glyph origin maps to
    pub anchor: (f32, f32),
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            offset: (0.0, 0.0),
            scale: (1.0, 1.0),
            rotation: 0.0,
            opacity: 1.0,
            anchor: MATRIX_CENTER,
        }
    }
}

impl Transform {
    /// Transform for a character, with an extra scale and opacity factor
    pub fn for_character(character: &CharacterState, scale: f32, opacity: f32) -> Self {
        Self {
            offset: character.position,
            scale: (character.scale.0 * scale, character.scale.1 * scale),
            rotation: character.rotation,
            opacity: character.opacity * opacity,
            anchor: MATRIX_CENTER,
        }
    }

    /// Map a glyph-local point to pixel space (row 0 at the top)
    fn apply(&self, x: f32, y: f32, sin: f32, cos: f32) -> (f32, f32) {
        let sx = x * self.scale.0;
        let sy = y * self.scale.1;
        let rx = sx * cos - sy * sin;
        let ry = sx * sin + sy * cos;
        (
            self.anchor.0 + rx + self.offset.0,
            self.anchor.1 - (ry + self.offset.1),
        )
    }
}

/// Rasterize line memory into `out`
///
/// `out` is cleared first; `scratch` is working space so the output keeps
/// its saturation semantics when opacity is below 1.
pub fn rasterize(lines: &LineMemory, transform: &Transform, scratch: &mut Mask, out: &mut Mask) {
    out.clear();
    scratch.clear();

    if transform.opacity <= 0.0 || lines.is_empty() {
        return;
    }

    let angle = wrap_degrees(transform.rotation).to_radians();
    let (sin, cos) = if angle == 0.0 {
        (0.0, 1.0)
    } else {
        (libm::sinf(angle), libm::cosf(angle))
    };

    for segment in lines {
        draw_segment(segment, transform, sin, cos, scratch);
    }

    for (x, y, value) in scratch.iter() {
        if value > 0.0 {
            out.set(x, y, (value * transform.opacity).min(1.0));
        }
    }
}

fn draw_segment(segment: &Segment, transform: &Transform, sin: f32, cos: f32, mask: &mut Mask) {
    let (x1, y1) = transform.apply(segment.x1, segment.y1, sin, cos);
    let (x2, y2) = transform.apply(segment.x2, segment.y2, sin, cos);

    let length = libm::sqrtf((x2 - x1) * (x2 - x1) + (y2 - y1) * (y2 - y1));
    let short_factor = if length < STROKE_WIDTH {
        length / STROKE_WIDTH
    } else {
        1.0
    };
    if short_factor <= 0.0 {
        return;
    }

    let Some((min_x, max_x)) = pixel_span(x1.min(x2), x1.max(x2), LEDS_X) else {
        return;
    };
    let Some((min_y, max_y)) = pixel_span(y1.min(y2), y1.max(y2), LEDS_Y) else {
        return;
    };

    let width_sq = STROKE_WIDTH * STROKE_WIDTH;
    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let (d2, t) = segment_projection(px as f32, py as f32, x1, y1, x2, y2);
            if d2 >= width_sq {
                continue;
            }

            let linear = 1.0 - libm::sqrtf(d2) / STROKE_WIDTH;
            let mut brightness = 0.5 * linear + 0.5 * linear * linear;
            if (segment.joint_start && t <= 0.0) || (segment.joint_end && t >= 1.0) {
                brightness *= 0.5;
            }
            brightness *= short_factor;

            mask.accumulate(px, py, brightness);
        }
    }
}

/// Integer pixel range covering `lo..=hi` padded by the stroke width,
/// clipped to the matrix
fn pixel_span(lo: f32, hi: f32, len: usize) -> Option<(usize, usize)> {
    let lo = libm::floorf(lo - STROKE_WIDTH);
    let hi = libm::ceilf(hi + STROKE_WIDTH);
    let max = (len - 1) as f32;
    if hi < 0.0 || lo > max || lo.is_nan() || hi.is_nan() {
        return None;
    }
    Some((lo.max(0.0) as usize, hi.min(max) as usize))
}
