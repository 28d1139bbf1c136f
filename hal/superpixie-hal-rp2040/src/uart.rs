//! Chain UART setup
//!
//! RP2040 has two UART peripherals; UART0 is the upstream port and UART1
//! the downstream port.

use embassy_rp::uart::{Config, DataBits, Parity, StopBits};
use superpixie_hal::uart::{self, UartConfig};

/// Translate the board-agnostic settings into embassy's UART config
pub fn config(settings: &UartConfig) -> Config {
    let mut config = Config::default();
    config.baudrate = settings.baudrate;
    config.data_bits = match settings.data_bits {
        uart::DataBits::Seven => DataBits::DataBits7,
        uart::DataBits::Eight => DataBits::DataBits8,
    };
    config.parity = match settings.parity {
        uart::Parity::None => Parity::ParityNone,
        uart::Parity::Even => Parity::ParityEven,
        uart::Parity::Odd => Parity::ParityOdd,
    };
    config.stop_bits = match settings.stop_bits {
        uart::StopBits::One => StopBits::STOP1,
        uart::StopBits::Two => StopBits::STOP2,
    };
    config
}
