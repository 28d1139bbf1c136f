//! Board-agnostic node logic for SuperPixie displays
//!
//! A SuperPixie node is a small LED matrix on a daisy chain. This crate
//! holds everything a node does that does not touch hardware:
//!
//! - Chain engines for both protocol generations ([`chain`])
//! - Render state with current/pending slots and transitions ([`render`])
//! - Vector glyph rasterization into brightness masks ([`raster`])
//! - Per-frame composition with gradients, ripples and touch glow ([`compose`])
//! - Link watchdog alarms ([`safety`])
//! - The persistent calibration record ([`config`])
//!
//! [`node::Node`] ties them together for the firmware.

#![no_std]
#![deny(unsafe_code)]

pub mod chain;
pub mod color;
pub mod compose;
pub mod config;
pub mod display;
pub mod easing;
pub mod math;
pub mod node;
pub mod raster;
pub mod render;
pub mod safety;
pub mod state;

pub use display::{Display, NodeEvent};
pub use node::Node;
