//! Render state machine, transition shapes and marquee scheduling

pub mod machine;
pub mod scroll;
pub mod transitions;

pub use machine::RenderMachine;
pub use scroll::{ScrollQueue, ScrollStep};
pub use transitions::TransitionFrame;
