//! Scalar helpers shared by the render pipeline
//!
//! Everything here is `f32` and `no_std`; transcendental functions come
//! from `libm`.

/// Clamp a value to 0.0..=1.0, mapping NaN to 0.0
#[inline]
pub fn clip_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Linear interpolation, `blend` = 0 gives `a`, 1 gives `b`
#[inline]
pub fn lerp(a: f32, b: f32, blend: f32) -> f32 {
    a * (1.0 - blend) + b * blend
}

/// Add, saturating at 1.0
#[inline]
pub fn add_clipped(a: f32, b: f32) -> f32 {
    let sum = a + b;
    if sum > 1.0 {
        1.0
    } else {
        sum
    }
}

/// Fold a 0..1 ramp into a 0..1..0 triangle
#[inline]
pub fn saw_to_tri(sample: f32) -> f32 {
    if sample < 0.5 {
        sample * 2.0
    } else {
        2.0 * (1.0 - sample)
    }
}

/// Wrap an angle in degrees into (-360, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    libm::fmodf(angle, 360.0)
}

/// Squared distance from a point to a segment, with the clamped projection
/// parameter `t` of the nearest point
///
/// A zero-length segment degrades to point distance with `t = 0`.
pub fn segment_projection(px: f32, py: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let dpx = px - x1;
    let dpy = py - y1;

    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return (dpx * dpx + dpy * dpy, 0.0);
    }

    let t = ((dpx * dx + dpy * dy) / length_sq).clamp(0.0, 1.0);
    let nx = x1 + t * dx - px;
    let ny = y1 + t * dy - py;

    (nx * nx + ny * ny, t)
}

/// Squared shortest distance from a point to a segment
#[inline]
pub fn shortest_distance_to_segment(px: f32, py: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    segment_projection(px, py, x1, y1, x2, y2).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_unit() {
        assert_eq!(clip_unit(-0.5), 0.0);
        assert_eq!(clip_unit(0.25), 0.25);
        assert_eq!(clip_unit(3.0), 1.0);
        assert_eq!(clip_unit(f32::NAN), 0.0);
    }

    #[test]
    fn test_saw_to_tri() {
        assert_eq!(saw_to_tri(0.0), 0.0);
        assert_eq!(saw_to_tri(0.25), 0.5);
        assert_eq!(saw_to_tri(0.5), 1.0);
        assert_eq!(saw_to_tri(1.0), 0.0);
    }

    #[test]
    fn test_distance_perpendicular() {
        let d2 = shortest_distance_to_segment(3.0, 2.0, 0.0, 0.0, 6.0, 0.0);
        assert!((d2 - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance_past_endpoint() {
        let (d2, t) = segment_projection(9.0, 4.0, 0.0, 0.0, 6.0, 0.0);
        assert!((d2 - 25.0).abs() < 1e-6);
        assert_eq!(t, 1.0);
    }

    #[test]
    fn test_degenerate_segment() {
        let (d2, t) = segment_projection(1.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        assert!((d2 - 2.0).abs() < 1e-6);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert!((wrap_degrees(450.0) - 90.0).abs() < 1e-4);
        assert!((wrap_degrees(-720.0)).abs() < 1e-4);
    }
}
