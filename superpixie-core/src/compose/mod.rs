//! Per-frame composition of masks and effects into LED colors

pub mod compositor;
pub mod gradient;
pub mod overlay;
pub mod ripple;
pub mod touch;

pub use compositor::{led_index, Compositor, Frame, FrameInputs, RenderSettings, BACKLIGHT_INDEX, NUM_LEDS};
pub use ripple::{Ripple, RippleLayer};
pub use touch::{TouchCalibration, TouchFilter};
