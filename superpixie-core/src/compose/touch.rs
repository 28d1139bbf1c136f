//! Touch pad filtering and the touch-reactive look
//!
//! Raw readings are normalized between the calibrated low (untouched) and
//! high (touched) levels, then smoothed by two cascaded one-pole low-pass
//! filters. The second filter's output drives both the active flag and the
//! strength of the visual effect.

use crate::color::ColorF;
use crate::math::clip_unit;
use crate::raster::{LEDS_X, LEDS_Y};
use crate::state::GlowPosition;

/// Readings are ignored this long after boot while the pad settles
pub const TOUCH_GRACE_MS: u64 = 1000;

/// Weight of the previous filter output per sample
pub const FILTER_KEEP: f32 = 0.95;

/// Weight of the new input per sample
pub const FILTER_TAKE: f32 = 0.05;

/// Radius of the glow spot in pixels
pub const GLOW_RADIUS: f32 = 4.0;

/// Calibrated pad levels and trigger threshold
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchCalibration {
    /// Filtered level above which the pad counts as touched, 0.0..=1.0
    pub threshold: f32,
    /// Raw reading when touched
    pub high: f32,
    /// Raw reading when untouched
    pub low: f32,
}

impl Default for TouchCalibration {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            high: 0.01,
            low: 0.01,
        }
    }
}

impl TouchCalibration {
    /// Map a raw reading to 0.0..=1.0 between the calibrated levels
    pub fn normalize(&self, raw: u16) -> f32 {
        let span = self.high - self.low;
        if libm::fabsf(span) < 1e-3 {
            return 0.0;
        }
        clip_unit((raw as f32 - self.low) / span)
    }
}

#[derive(Debug, Clone)]
pub struct TouchFilter {
    calibration: TouchCalibration,
    fast: f32,
    slow: f32,
    active: bool,
    last_raw: u16,
}

impl TouchFilter {
    pub fn new(calibration: TouchCalibration) -> Self {
        Self {
            calibration,
            fast: 0.0,
            slow: 0.0,
            active: false,
            last_raw: 0,
        }
    }

    pub fn calibration(&self) -> &TouchCalibration {
        &self.calibration
    }

    pub fn calibration_mut(&mut self) -> &mut TouchCalibration {
        &mut self.calibration
    }

    /// Feed a raw reading
    ///
    /// Returns `Some(active)` when the touched state changes.
    pub fn update(&mut self, raw: u16, now_ms: u64) -> Option<bool> {
        self.last_raw = raw;
        if now_ms < TOUCH_GRACE_MS {
            return None;
        }

        let normalized = self.calibration.normalize(raw);
        self.fast = FILTER_KEEP * self.fast + FILTER_TAKE * normalized;
        self.slow = FILTER_KEEP * self.slow + FILTER_TAKE * self.fast;

        let active = self.slow > self.calibration.threshold;
        if active != self.active {
            self.active = active;
            Some(active)
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Latest unfiltered reading
    pub fn raw(&self) -> u16 {
        self.last_raw
    }

    /// Effect strength, 0.0..=1.0
    pub fn strength(&self) -> f32 {
        clip_unit(self.slow)
    }
}

/// Pixel the glow is centred on
pub fn glow_point(position: GlowPosition) -> (f32, f32) {
    let right = (LEDS_X - 1) as f32;
    let bottom = (LEDS_Y - 1) as f32;
    let cx = right / 2.0;
    let cy = bottom / 2.0;
    match position {
        GlowPosition::Top => (cx, 0.0),
        GlowPosition::Bottom => (cx, bottom),
        GlowPosition::Left => (0.0, cy),
        GlowPosition::Right => (right, cy),
        GlowPosition::Center => (cx, cy),
    }
}

/// Apply the touch look to one pixel
///
/// The pixel is desaturated and dimmed in proportion to `strength`, then
/// the glow color is added around the glow point.
pub fn apply(
    color: ColorF,
    x: usize,
    y: usize,
    strength: f32,
    glow_position: GlowPosition,
    glow_color: ColorF,
) -> ColorF {
    if strength <= 0.0 {
        return color;
    }

    let gray = color.luma();
    let muted = color
        .lerp(ColorF::new(gray, gray, gray), 0.5 * strength)
        .scale(1.0 - 0.5 * strength);

    let (gx, gy) = glow_point(glow_position);
    let dx = x as f32 - gx;
    let dy = y as f32 - gy;
    let falloff = (1.0 - libm::sqrtf(dx * dx + dy * dy) / GLOW_RADIUS).max(0.0);

    muted.add_clipped(glow_color.scale(strength * falloff))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrated() -> TouchCalibration {
        TouchCalibration {
            threshold: 0.5,
            high: 200.0,
            low: 100.0,
        }
    }

    #[test]
    fn test_normalize() {
        let cal = calibrated();
        assert_eq!(cal.normalize(100), 0.0);
        assert_eq!(cal.normalize(150), 0.5);
        assert_eq!(cal.normalize(400), 1.0);
        assert_eq!(cal.normalize(0), 0.0);
        assert_eq!(TouchCalibration::default().normalize(500), 0.0);
    }

    #[test]
    fn test_grace_period_ignores_readings() {
        let mut filter = TouchFilter::new(calibrated());
        for _ in 0..500 {
            assert_eq!(filter.update(200, 10), None);
        }
        assert_eq!(filter.strength(), 0.0);
        assert_eq!(filter.raw(), 200);
    }

    #[test]
    fn test_touch_edges() {
        let mut filter = TouchFilter::new(calibrated());
        let mut edges = 0;
        let mut now = TOUCH_GRACE_MS;
        while !filter.is_active() {
            if filter.update(200, now) == Some(true) {
                edges += 1;
            }
            now += 10;
            assert!(now < TOUCH_GRACE_MS + 10_000);
        }
        assert_eq!(edges, 1);

        while filter.is_active() {
            filter.update(100, now);
            now += 10;
            assert!(now < TOUCH_GRACE_MS + 20_000);
        }
        assert!(filter.strength() <= 0.5);
    }

    #[test]
    fn test_apply_glows_near_point() {
        let red = ColorF::new(1.0, 0.0, 0.0);
        let glow = ColorF::new(0.0, 1.0, 0.0);
        let untouched = apply(red, 3, 0, 0.0, GlowPosition::Top, glow);
        assert_eq!(untouched, red);

        let near = apply(red, 3, 0, 1.0, GlowPosition::Top, glow);
        let far = apply(red, 3, 14, 1.0, GlowPosition::Top, glow);
        assert!(near.g > 0.9);
        // Half-desaturated towards gray 1/3, then dimmed by half
        assert!((far.g - 1.0 / 12.0).abs() < 1e-6);
        assert!(far.r < red.r);
    }

    #[test]
    fn test_glow_points() {
        assert_eq!(glow_point(GlowPosition::Top), (3.0, 0.0));
        assert_eq!(glow_point(GlowPosition::Bottom), (3.0, 14.0));
        assert_eq!(glow_point(GlowPosition::Left), (0.0, 7.0));
        assert_eq!(glow_point(GlowPosition::Right), (6.0, 7.0));
        assert_eq!(glow_point(GlowPosition::Center), (3.0, 7.0));
    }
}
