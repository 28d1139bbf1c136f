//! Easing curves for transitions and ripples

use crate::math::clip_unit;

/// Shape applied to linear transition progress
///
/// Wire values are the discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Interpolation {
    #[default]
    Linear = 0,
    /// Quadratic
    EaseIn = 1,
    /// Square root
    EaseOut = 2,
    /// Cubic
    EaseInSoft = 3,
    /// Fourth root
    EaseOutSoft = 4,
    /// Quadratic blended into square root, weighted by progress
    SCurve = 5,
    /// Cubic blended into fourth root, weighted by progress
    SCurveSoft = 6,
}

impl Interpolation {
    pub const ALL: [Interpolation; 7] = [
        Interpolation::Linear,
        Interpolation::EaseIn,
        Interpolation::EaseOut,
        Interpolation::EaseInSoft,
        Interpolation::EaseOutSoft,
        Interpolation::SCurve,
        Interpolation::SCurveSoft,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Map linear progress to shaped progress
    ///
    /// Input is clipped to 0..=1 first; every curve fixes both endpoints.
    pub fn apply(self, progress: f32) -> f32 {
        let p = clip_unit(progress);
        match self {
            Interpolation::Linear => p,
            Interpolation::EaseIn => p * p,
            Interpolation::EaseOut => libm::sqrtf(p),
            Interpolation::EaseInSoft => p * p * p,
            Interpolation::EaseOutSoft => libm::sqrtf(libm::sqrtf(p)),
            Interpolation::SCurve => {
                let a = p * p;
                let b = libm::sqrtf(p);
                a * (1.0 - p) + b * p
            }
            Interpolation::SCurveSoft => {
                let a = p * p * p;
                let b = libm::sqrtf(libm::sqrtf(p));
                a * (1.0 - p) + b * p
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_endpoints() {
        for curve in Interpolation::ALL {
            assert_eq!(curve.apply(0.0), 0.0, "{:?}", curve);
            assert!((curve.apply(1.0) - 1.0).abs() < 1e-6, "{:?}", curve);
        }
    }

    #[test]
    fn test_input_is_clipped() {
        assert_eq!(Interpolation::EaseIn.apply(-2.0), 0.0);
        assert_eq!(Interpolation::EaseOut.apply(4.0), 1.0);
    }

    #[test]
    fn test_from_u8() {
        assert_eq!(Interpolation::from_u8(5), Some(Interpolation::SCurve));
        assert_eq!(Interpolation::from_u8(7), None);
    }

    proptest! {
        #[test]
        fn test_curves_are_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for curve in Interpolation::ALL {
                prop_assert!(curve.apply(lo) <= curve.apply(hi) + 1e-6);
            }
        }
    }
}
