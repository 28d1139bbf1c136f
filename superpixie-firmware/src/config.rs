//! Compile-time node configuration
//!
//! Board layout (Raspberry Pi Pico footprint):
//!
//! | function              | pin   | peripheral   |
//! |-----------------------|-------|--------------|
//! | upstream TX / RX      | 0 / 1 | UART0        |
//! | LED data              | 2     | PIO0 SM0     |
//! | touch pad             | 3     | GPIO (Flex)  |
//! | downstream TX / RX    | 4 / 5 | UART1        |
//! | status LED            | 25    | GPIO         |

use superpixie_hal::uart::{UartConfig, CHAIN_BAUD};
use superpixie_protocol::WireProfile;

/// Everything that is fixed when the firmware is built
#[derive(Debug, Clone, Copy)]
pub struct NodeConfig {
    pub profile: WireProfile,
    pub chain_uart: UartConfig,
    pub frame_rate_hz: u64,
    /// Chain engine and animation tick
    pub tick_ms: u64,
    pub touch_sample_ms: u64,
}

#[cfg(feature = "full-byte-profile")]
const PROFILE: WireProfile = WireProfile::FullByte;

#[cfg(not(feature = "full-byte-profile"))]
const PROFILE: WireProfile = WireProfile::NibblePadded;

pub const NODE_CONFIG: NodeConfig = NodeConfig {
    profile: PROFILE,
    chain_uart: UartConfig::new(CHAIN_BAUD),
    frame_rate_hz: 120,
    tick_ms: 2,
    touch_sample_ms: 10,
};

/// Bytes buffered per UART direction
pub const UART_BUFFER_SIZE: usize = 256;
