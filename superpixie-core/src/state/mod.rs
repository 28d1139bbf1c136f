//! Render state records
//!
//! System and character state each live in a current/pending pair. The
//! render state machine interpolates between the two and publishes a live
//! copy for rasterization.

pub mod character;
pub mod slots;
pub mod system;

pub use character::{CharacterState, Pose};
pub use slots::DoubleSlot;
pub use system::{GlowPosition, GradientType, SystemState, TransitionType};
