//! RP2040-specific HAL for SuperPixie nodes
//!
//! This crate provides RP2040 implementations of the shared
//! `superpixie-hal` traits:
//!
//! - Flash storage driver (implements `superpixie_hal::FlashStorage`)
//! - PIO-based WS2812 output (implements `superpixie_hal::LedSink`)
//! - RC-timing touch pad (implements `superpixie_hal::TouchSensor`)
//! - Chain UART configuration

#![no_std]

pub mod flash;
pub mod touch;
pub mod uart;
pub mod ws2812;

// Re-export shared traits from superpixie-hal for convenience
pub use superpixie_hal::{FlashStorage as FlashStorageTrait, LedSink, StorageKey, TouchSensor};
