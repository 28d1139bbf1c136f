//! Command payload access
//!
//! Receivers read arguments by offset. Bytes past the end of a short
//! payload read as zero, the same as the zero-filled receive buffers of
//! deployed nodes, so a truncated argument never aborts a command.

/// Zero-filling reader over a command payload
#[derive(Debug, Clone, Copy)]
pub struct PayloadReader<'a> {
    data: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Byte at `index`, zero past the end
    pub fn u8(&self, index: usize) -> u8 {
        self.data.get(index).copied().unwrap_or(0)
    }

    /// Nonzero byte at `index`
    pub fn flag(&self, index: usize) -> bool {
        self.u8(index) != 0
    }

    /// Big-endian u16 starting at `index`
    pub fn u16_be(&self, index: usize) -> u16 {
        u16::from_be_bytes([self.u8(index), self.u8(index + 1)])
    }

    /// Big-endian u32 starting at `index`
    pub fn u32_be(&self, index: usize) -> u32 {
        u32::from_be_bytes([
            self.u8(index),
            self.u8(index + 1),
            self.u8(index + 2),
            self.u8(index + 3),
        ])
    }

    /// Byte at `index` scaled to 0.0..=1.0
    pub fn unit(&self, index: usize) -> f32 {
        self.u8(index) as f32 / 255.0
    }

    /// Three bytes starting at `index` as a unit RGB triple
    pub fn rgb_unit(&self, index: usize) -> [f32; 3] {
        [self.unit(index), self.unit(index + 1), self.unit(index + 2)]
    }
}

/// Scale a unit value to a payload byte, clamping out-of-range input
pub fn unit_to_byte(value: f32) -> u8 {
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    (clamped * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_past_end_are_zero() {
        let reader = PayloadReader::new(&[0x12]);
        assert_eq!(reader.u8(0), 0x12);
        assert_eq!(reader.u8(1), 0);
        assert_eq!(reader.u16_be(0), 0x1200);
    }

    #[test]
    fn test_big_endian_fields() {
        let reader = PayloadReader::new(&[0x00, 0x00, 0x25, 0x80]);
        assert_eq!(reader.u16_be(2), 0x2580);
        assert_eq!(reader.u32_be(0), 9600);
    }

    #[test]
    fn test_unit_scaling() {
        let reader = PayloadReader::new(&[0, 255, 51]);
        assert_eq!(reader.unit(0), 0.0);
        assert_eq!(reader.unit(1), 1.0);
        assert!((reader.unit(2) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_unit_to_byte_clamps() {
        assert_eq!(unit_to_byte(-1.0), 0);
        assert_eq!(unit_to_byte(0.5), 128);
        assert_eq!(unit_to_byte(2.0), 255);
        assert_eq!(unit_to_byte(f32::NAN), 0);
    }
}
