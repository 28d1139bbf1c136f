//! SuperPixie Hardware Abstraction Layer
//!
//! This crate defines the hardware traits a SuperPixie node needs, so the
//! firmware's glue code does not depend on one chip.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  superpixie-firmware                    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  superpixie-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌────────────────┐
//!             │ superpixie-hal-│
//!             │     rp2040     │
//!             └────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::FlashStorage`] - Persistent key/blob storage
//! - [`led::LedSink`] - Addressable LED output
//! - [`touch::TouchSensor`] - Raw touch pad readings
//!
//! [`uart::UartConfig`] describes the two chain ports.

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod led;
pub mod touch;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use led::LedSink;
pub use touch::TouchSensor;
pub use uart::{UartConfig, CHAIN_BAUD};
