//! Display-wide state that can be transitioned

use crate::color::ColorF;
use crate::easing::Interpolation;

/// Character transition shapes
///
/// Wire values are the discriminants and shared by both protocol
/// generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TransitionType {
    #[default]
    Instant = 0,
    Fade = 1,
    FadeOut = 2,
    FlipHorizontal = 3,
    FlipVertical = 4,
    SpinLeft = 5,
    SpinRight = 6,
    SpinLeftHalf = 7,
    SpinRightHalf = 8,
    Shrink = 9,
    PushUp = 10,
    PushDown = 11,
    PushLeft = 12,
    PushRight = 13,
}

impl TransitionType {
    pub const ALL: [TransitionType; 14] = [
        TransitionType::Instant,
        TransitionType::Fade,
        TransitionType::FadeOut,
        TransitionType::FlipHorizontal,
        TransitionType::FlipVertical,
        TransitionType::SpinLeft,
        TransitionType::SpinRight,
        TransitionType::SpinLeftHalf,
        TransitionType::SpinRightHalf,
        TransitionType::Shrink,
        TransitionType::PushUp,
        TransitionType::PushDown,
        TransitionType::PushLeft,
        TransitionType::PushRight,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

/// How a colour pair is spread across the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GradientType {
    /// Colour A everywhere
    #[default]
    None = 0,
    Horizontal = 1,
    HorizontalMirrored = 2,
    Vertical = 3,
    VerticalMirrored = 4,
    /// Bright pixels take colour A, dim pixels fade towards colour B
    Brightness = 5,
}

impl GradientType {
    pub const ALL: [GradientType; 6] = [
        GradientType::None,
        GradientType::Horizontal,
        GradientType::HorizontalMirrored,
        GradientType::Vertical,
        GradientType::VerticalMirrored,
        GradientType::Brightness,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Decode the older four-entry table (none, horizontal, vertical, brightness)
    pub fn from_full_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(GradientType::None),
            1 => Some(GradientType::Horizontal),
            2 => Some(GradientType::Vertical),
            3 => Some(GradientType::Brightness),
            _ => None,
        }
    }

    /// Code in the older table; the mirrored variants have none
    pub fn to_full_byte(self) -> Option<u8> {
        match self {
            GradientType::None => Some(0),
            GradientType::Horizontal => Some(1),
            GradientType::Vertical => Some(2),
            GradientType::Brightness => Some(3),
            GradientType::HorizontalMirrored | GradientType::VerticalMirrored => None,
        }
    }
}

/// Where the touch glow is anchored on the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GlowPosition {
    #[default]
    Top = 0,
    Bottom = 1,
    Left = 2,
    Right = 3,
    Center = 4,
}

impl GlowPosition {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(GlowPosition::Top),
            1 => Some(GlowPosition::Bottom),
            2 => Some(GlowPosition::Left),
            3 => Some(GlowPosition::Right),
            4 => Some(GlowPosition::Center),
            _ => None,
        }
    }
}

/// Boot colour of the character
pub const BOOT_COLOR: ColorF = ColorF::new(1.0, 0.0, 0.25);

/// Default colour of the touch glow
pub const TOUCH_GLOW_COLOR: ColorF = ColorF::new(1.0, 0.4453, 0.1562);

/// Everything about the display that is not the character itself
///
/// Continuous fields are interpolated while a transition runs. Discrete
/// fields (types, positions, durations) switch when the transition is
/// triggered.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemState {
    /// Global brightness (0.0-1.0)
    pub brightness: f32,
    pub transition_type: TransitionType,
    pub transition_duration_ms: u32,
    pub transition_interpolation: Interpolation,
    pub backlight_color: ColorF,
    pub backlight_brightness: f32,
    pub display_color_a: ColorF,
    pub display_color_b: ColorF,
    pub background_color_a: ColorF,
    pub background_color_b: ColorF,
    pub gradient_type: GradientType,
    pub background_gradient_type: GradientType,
    /// Latest touch state, not interpolated
    pub touch_active: bool,
    /// Latest raw touch reading, not interpolated
    pub touch_value: u16,
    pub touch_color: ColorF,
    pub touch_glow_position: GlowPosition,
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemState {
    pub const fn new() -> Self {
        Self {
            brightness: 0.5,
            transition_type: TransitionType::Instant,
            transition_duration_ms: 250,
            transition_interpolation: Interpolation::Linear,
            backlight_color: ColorF::BLACK,
            backlight_brightness: 1.0,
            display_color_a: BOOT_COLOR,
            display_color_b: BOOT_COLOR,
            background_color_a: ColorF::BLACK,
            background_color_b: ColorF::BLACK,
            gradient_type: GradientType::None,
            background_gradient_type: GradientType::None,
            touch_active: false,
            touch_value: 0,
            touch_color: TOUCH_GLOW_COLOR,
            touch_glow_position: GlowPosition::Top,
        }
    }

    /// Blend towards `target` by `blend`
    ///
    /// Continuous fields are interpolated. Discrete fields and touch
    /// readings are taken from `target`.
    pub fn interpolate(&self, target: &SystemState, blend: f32) -> SystemState {
        let lerp = crate::math::lerp;
        SystemState {
            brightness: lerp(self.brightness, target.brightness, blend),
            backlight_color: self.backlight_color.lerp(target.backlight_color, blend),
            backlight_brightness: lerp(self.backlight_brightness, target.backlight_brightness, blend),
            display_color_a: self.display_color_a.lerp(target.display_color_a, blend),
            display_color_b: self.display_color_b.lerp(target.display_color_b, blend),
            background_color_a: self.background_color_a.lerp(target.background_color_a, blend),
            background_color_b: self.background_color_b.lerp(target.background_color_b, blend),
            touch_color: self.touch_color.lerp(target.touch_color, blend),
            ..*target
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = SystemState::default();
        assert_eq!(state.brightness, 0.5);
        assert_eq!(state.transition_duration_ms, 250);
        assert_eq!(state.display_color_a, BOOT_COLOR);
        assert_eq!(state.touch_glow_position, GlowPosition::Top);
    }

    #[test]
    fn test_interpolate_midpoint() {
        let a = SystemState::new();
        let mut b = SystemState::new();
        b.brightness = 1.0;
        b.display_color_a = ColorF::new(0.0, 0.0, 0.25);
        b.gradient_type = GradientType::Vertical;

        let mid = a.interpolate(&b, 0.5);
        assert!((mid.brightness - 0.75).abs() < 1e-6);
        assert!((mid.display_color_a.r - 0.5).abs() < 1e-6);
        assert_eq!(mid.gradient_type, GradientType::Vertical);
    }

    #[test]
    fn test_enum_tables() {
        assert_eq!(TransitionType::from_u8(12), Some(TransitionType::PushLeft));
        assert_eq!(TransitionType::from_u8(14), None);
        assert_eq!(GradientType::from_u8(2), Some(GradientType::HorizontalMirrored));
        assert_eq!(GradientType::from_full_byte(2), Some(GradientType::Vertical));
        assert_eq!(GlowPosition::from_u8(4), Some(GlowPosition::Center));
    }

    #[test]
    fn test_full_byte_gradient_roundtrip() {
        for value in 0..4 {
            let gradient = GradientType::from_full_byte(value).unwrap();
            assert_eq!(gradient.to_full_byte(), Some(value));
        }
        assert_eq!(GradientType::VerticalMirrored.to_full_byte(), None);
    }
}
