//! Expanding ring effect
//!
//! One ripple at a time; spawning replaces whatever was running.

use crate::color::ColorF;
use crate::easing::Interpolation;
use crate::math::clip_unit;

/// Radius a ripple reaches at the end of its life, in pixels
pub const RIPPLE_MAX_RADIUS: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ripple {
    pub start_color: ColorF,
    pub dest_color: ColorF,
    /// Centre in pixel coordinates
    pub position: (f32, f32),
    /// Half-thickness of the ring in pixels
    pub width: f32,
    pub opacity: f32,
    pub curve: Interpolation,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Ripple {
    /// Shaped progress at `now_ms`, `None` outside the ripple's lifetime
    fn progress(&self, now_ms: u64) -> Option<f32> {
        if now_ms < self.start_ms || now_ms >= self.end_ms {
            return None;
        }
        let span = (self.end_ms - self.start_ms) as f32;
        let raw = clip_unit((now_ms - self.start_ms) as f32 / span);
        Some(self.curve.apply(raw))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RippleLayer {
    active: Option<Ripple>,
}

impl RippleLayer {
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Start a ripple, discarding any in flight
    pub fn spawn(&mut self, ripple: Ripple) {
        self.active = (ripple.end_ms > ripple.start_ms).then_some(ripple);
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Drop the ripple once its time is up
    pub fn update(&mut self, now_ms: u64) {
        if let Some(ripple) = &self.active {
            if now_ms >= ripple.end_ms {
                self.active = None;
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Color the ripple adds at a pixel
    pub fn sample(&self, x: usize, y: usize, now_ms: u64) -> ColorF {
        let Some(ripple) = &self.active else {
            return ColorF::BLACK;
        };
        let Some(p) = ripple.progress(now_ms) else {
            return ColorF::BLACK;
        };

        let dx = x as f32 - ripple.position.0;
        let dy = y as f32 - ripple.position.1;
        let distance = libm::sqrtf(dx * dx + dy * dy);
        let radius = p * RIPPLE_MAX_RADIUS;

        let width = if ripple.width > 0.0 { ripple.width } else { 1.0 };
        let band = (1.0 - libm::fabsf(distance - radius) / width).max(0.0);
        let intensity = band * ripple.opacity * (1.0 - p);

        ripple.start_color.lerp(ripple.dest_color, p).scale(intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ripple() -> Ripple {
        Ripple {
            start_color: ColorF::WHITE,
            dest_color: ColorF::WHITE,
            position: (3.0, 7.0),
            width: 1.0,
            opacity: 1.0,
            curve: Interpolation::Linear,
            start_ms: 1000,
            end_ms: 2000,
        }
    }

    #[test]
    fn test_ring_travels_outwards() {
        let mut layer = RippleLayer::new();
        layer.spawn(ripple());

        // At the start the ring sits on the centre pixel
        assert_eq!(layer.sample(3, 7, 1000), ColorF::WHITE);
        assert_eq!(layer.sample(3, 11, 1000), ColorF::BLACK);

        // Halfway: radius 4, intensity halved by the fade
        let ring = layer.sample(3, 11, 1500);
        assert!((ring.r - 0.5).abs() < 1e-6);
        assert_eq!(layer.sample(3, 7, 1500), ColorF::BLACK);
    }

    #[test]
    fn test_expires() {
        let mut layer = RippleLayer::new();
        layer.spawn(ripple());
        assert_eq!(layer.sample(3, 7, 2000), ColorF::BLACK);
        layer.update(1999);
        assert!(layer.is_active());
        layer.update(2000);
        assert!(!layer.is_active());
    }

    #[test]
    fn test_spawn_replaces() {
        let mut layer = RippleLayer::new();
        layer.spawn(ripple());
        layer.spawn(Ripple {
            position: (0.0, 0.0),
            ..ripple()
        });
        assert_eq!(layer.sample(0, 0, 1000), ColorF::WHITE);
        assert_eq!(layer.sample(3, 7, 1000), ColorF::BLACK);
    }

    #[test]
    fn test_zero_length_ripple_is_ignored() {
        let mut layer = RippleLayer::new();
        layer.spawn(Ripple {
            end_ms: 1000,
            ..ripple()
        });
        assert!(!layer.is_active());
    }
}
