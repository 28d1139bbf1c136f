//! Brightness mask covering the LED matrix

/// Matrix columns
pub const LEDS_X: usize = 7;

/// Matrix rows
pub const LEDS_Y: usize = 15;

/// Row-major brightness values in 0.0..=1.0, row 0 at the top
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mask {
    cells: [[f32; LEDS_X]; LEDS_Y],
}

impl Default for Mask {
    fn default() -> Self {
        Self::new()
    }
}

impl Mask {
    pub const fn new() -> Self {
        Self {
            cells: [[0.0; LEDS_X]; LEDS_Y],
        }
    }

    pub fn clear(&mut self) {
        self.cells = [[0.0; LEDS_X]; LEDS_Y];
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.cells[y][x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.cells[y][x] = value;
    }

    /// Add to a cell, saturating at 1.0
    #[inline]
    pub fn accumulate(&mut self, x: usize, y: usize, value: f32) {
        let cell = &mut self.cells[y][x];
        *cell = crate::math::add_clipped(*cell, value);
    }

    /// Combine with another mask, keeping the brighter value per cell
    pub fn max_merge(&mut self, other: &Mask) {
        for (row, other_row) in self.cells.iter_mut().zip(other.cells.iter()) {
            for (cell, &value) in row.iter_mut().zip(other_row.iter()) {
                if value > *cell {
                    *cell = value;
                }
            }
        }
    }

    pub fn scale(&mut self, factor: f32) {
        for cell in self.cells.iter_mut().flatten() {
            *cell *= factor;
        }
    }

    /// Box blur with edge clamping
    ///
    /// `size` is the kernel width in cells; sizes below 2 leave the mask
    /// unchanged.
    pub fn blur(&mut self, size: u8) {
        if size < 2 {
            return;
        }
        let half = (size / 2) as isize;
        let area = ((2 * half + 1) * (2 * half + 1)) as f32;
        let source = self.cells;

        for y in 0..LEDS_Y {
            for x in 0..LEDS_X {
                let mut sum = 0.0;
                for dy in -half..=half {
                    for dx in -half..=half {
                        let sx = (x as isize + dx).clamp(0, LEDS_X as isize - 1) as usize;
                        let sy = (y as isize + dy).clamp(0, LEDS_Y as isize - 1) as usize;
                        sum += source[sy][sx];
                    }
                }
                self.cells[y][x] = (sum / area).min(1.0);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, &v)| (x, y, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_saturates() {
        let mut mask = Mask::new();
        mask.accumulate(1, 2, 0.7);
        mask.accumulate(1, 2, 0.7);
        assert_eq!(mask.get(1, 2), 1.0);
    }

    #[test]
    fn test_max_merge() {
        let mut a = Mask::new();
        let mut b = Mask::new();
        a.set(0, 0, 0.3);
        b.set(0, 0, 0.6);
        b.set(6, 14, 0.2);
        a.max_merge(&b);
        assert_eq!(a.get(0, 0), 0.6);
        assert_eq!(a.get(6, 14), 0.2);
    }

    #[test]
    fn test_blur_spreads_and_preserves_flat_field() {
        let mut mask = Mask::new();
        mask.set(3, 7, 1.0);
        mask.blur(3);
        assert!((mask.get(3, 7) - 1.0 / 9.0).abs() < 1e-6);
        assert!((mask.get(2, 6) - 1.0 / 9.0).abs() < 1e-6);
        assert_eq!(mask.get(0, 0), 0.0);

        let mut flat = Mask::new();
        for y in 0..LEDS_Y {
            for x in 0..LEDS_X {
                flat.set(x, y, 0.5);
            }
        }
        flat.blur(5);
        assert!((flat.get(0, 0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_small_blur_is_noop() {
        let mut mask = Mask::new();
        mask.set(3, 7, 1.0);
        mask.blur(1);
        assert_eq!(mask.get(3, 7), 1.0);
    }
}
