//! Stroke font
//!
//! Each glyph is a list of polylines on a 5×13 design grid. A vertex byte
//! packs the grid column in the high nibble (1-5, left to right) and the
//! row in the low nibble (1-13, top to bottom); [`PEN_UP`] ends the current
//! polyline. Decoding centres the grid on the origin with y pointing up,
//! so column 3 / row 7 lands on (0, 0).

use heapless::Vec;

/// Break between polylines
pub const PEN_UP: u8 = 0xFF;

/// Segments a single glyph may decode to
pub const MAX_SEGMENTS: usize = 128;

/// One stroke of a decoded glyph, in glyph-local units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Start point is shared with the previous segment of the polyline
    pub joint_start: bool,
    /// End point is shared with the next segment of the polyline
    pub joint_end: bool,
}

/// Decoded strokes of one glyph
pub type LineMemory = Vec<Segment, MAX_SEGMENTS>;

const SPACE: &[u8] = &[];
const DIGIT_0: &[u8] = &[0x11, 0x51, 0x5D, 0x1D, 0x11, PEN_UP, 0x1D, 0x51];
const DIGIT_1: &[u8] = &[0x23, 0x31, 0x3D, PEN_UP, 0x2D, 0x4D];
const DIGIT_2: &[u8] = &[0x11, 0x51, 0x57, 0x17, 0x1D, 0x5D];
const DIGIT_3: &[u8] = &[0x11, 0x51, 0x5D, 0x1D, PEN_UP, 0x17, 0x57];
const DIGIT_4: &[u8] = &[0x11, 0x17, 0x57, PEN_UP, 0x51, 0x5D];
const DIGIT_5: &[u8] = &[0x51, 0x11, 0x17, 0x57, 0x5D, 0x1D];
const DIGIT_6: &[u8] = &[0x51, 0x11, 0x1D, 0x5D, 0x57, 0x17];
const DIGIT_7: &[u8] = &[0x11, 0x51, 0x2D];
const DIGIT_8: &[u8] = &[0x11, 0x51, 0x5D, 0x1D, 0x11, PEN_UP, 0x17, 0x57];
const DIGIT_9: &[u8] = &[0x57, 0x17, 0x11, 0x51, 0x5D, 0x1D];

const LETTERS: [&[u8]; 26] = [
    // A
    &[0x1D, 0x11, 0x51, 0x5D, PEN_UP, 0x17, 0x57],
    // B
    &[0x1D, 0x11, 0x41, 0x54, 0x47, 0x17, PEN_UP, 0x47, 0x5A, 0x4D, 0x1D],
    // C
    &[0x51, 0x11, 0x1D, 0x5D],
    // D
    &[0x11, 0x41, 0x53, 0x5B, 0x4D, 0x1D, 0x11],
    // E
    &[0x51, 0x11, 0x1D, 0x5D, PEN_UP, 0x17, 0x47],
    // F
    &[0x51, 0x11, 0x1D, PEN_UP, 0x17, 0x47],
    // G
    &[0x51, 0x11, 0x1D, 0x5D, 0x57, 0x37],
    // H
    &[0x11, 0x1D, PEN_UP, 0x51, 0x5D, PEN_UP, 0x17, 0x57],
    // I
    &[0x21, 0x41, PEN_UP, 0x31, 0x3D, PEN_UP, 0x2D, 0x4D],
    // J
    &[0x51, 0x5D, 0x1D, 0x1A],
    // K
    &[0x11, 0x1D, PEN_UP, 0x51, 0x17, 0x5D],
    // L
    &[0x11, 0x1D, 0x5D],
    // M
    &[0x1D, 0x11, 0x37, 0x51, 0x5D],
    // N
    &[0x1D, 0x11, 0x5D, 0x51],
    // O
    &[0x11, 0x51, 0x5D, 0x1D, 0x11],
    // P
    &[0x1D, 0x11, 0x51, 0x57, 0x17],
    // Q
    &[0x11, 0x51, 0x5D, 0x1D, 0x11, PEN_UP, 0x3A, 0x5D],
    // R
    &[0x1D, 0x11, 0x51, 0x57, 0x17, 0x5D],
    // S
    &[0x51, 0x11, 0x17, 0x57, 0x5D, 0x1D],
    // T
    &[0x11, 0x51, PEN_UP, 0x31, 0x3D],
    // U
    &[0x11, 0x1D, 0x5D, 0x51],
    // V
    &[0x11, 0x3D, 0x51],
    // W
    &[0x11, 0x1D, 0x37, 0x5D, 0x51],
    // X
    &[0x11, 0x5D, PEN_UP, 0x51, 0x1D],
    // Y
    &[0x11, 0x37, 0x51, PEN_UP, 0x37, 0x3D],
    // Z
    &[0x11, 0x51, 0x1D, 0x5D],
];

/// Vertex bytes for an ASCII code
///
/// Lowercase letters use the uppercase glyph; anything without a glyph
/// draws as a blank.
pub fn strokes(code: u8) -> &'static [u8] {
    match code.to_ascii_uppercase() {
        b'0' => DIGIT_0,
        b'1' => DIGIT_1,
        b'2' => DIGIT_2,
        b'3' => DIGIT_3,
        b'4' => DIGIT_4,
        b'5' => DIGIT_5,
        b'6' => DIGIT_6,
        b'7' => DIGIT_7,
        b'8' => DIGIT_8,
        b'9' => DIGIT_9,
        c @ b'A'..=b'Z' => LETTERS[(c - b'A') as usize],
        b'?' => &[0x13, 0x11, 0x51, 0x57, 0x37, 0x3A, PEN_UP, 0x3C, 0x3D],
        b'-' => &[0x17, 0x57],
        b'.' => &[0x3C, 0x3D],
        b':' => &[0x34, 0x35, PEN_UP, 0x3A, 0x3B],
        b'!' => &[0x31, 0x39, PEN_UP, 0x3C, 0x3D],
        b'+' => &[0x17, 0x57, PEN_UP, 0x34, 0x3A],
        b'=' => &[0x15, 0x55, PEN_UP, 0x19, 0x59],
        b'/' => &[0x1D, 0x51],
        b'\'' => &[0x31, 0x33],
        _ => SPACE,
    }
}

#[inline]
fn vertex(byte: u8) -> (f32, f32) {
    let col = (byte >> 4) as f32;
    let row = (byte & 0x0F) as f32;
    (col - 3.0, 7.0 - row)
}

/// Decode a glyph into line memory
///
/// Interior joints of each polyline are flagged so the rasterizer can
/// halve the overlapping ends.
pub fn decode(code: u8) -> LineMemory {
    let mut lines = LineMemory::new();
    for polyline in strokes(code).split(|&b| b == PEN_UP) {
        let count = polyline.len().saturating_sub(1);
        for (i, pair) in polyline.windows(2).enumerate() {
            let (x1, y1) = vertex(pair[0]);
            let (x2, y2) = vertex(pair[1]);
            let segment = Segment {
                x1,
                y1,
                x2,
                y2,
                joint_start: i > 0,
                joint_end: i + 1 < count,
            };
            if lines.push(segment).is_err() {
                return lines;
            }
        }
    }
    lines
}
