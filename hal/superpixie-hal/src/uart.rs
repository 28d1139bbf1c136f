//! Chain port settings
//!
//! Every node has two UARTs: the upstream port towards the commander and
//! the downstream port towards the end of the chain. Both run the same
//! framing. The commander may ask for another baud rate.

/// Default chain baud rate
pub const CHAIN_BAUD: u32 = 9600;

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new(CHAIN_BAUD)
    }
}

impl UartConfig {
    /// 8N1 at `baudrate`
    pub const fn new(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    /// Same framing at another baud rate
    ///
    /// A zero rate is not a usable setting and keeps the current one.
    pub fn with_baudrate(self, baudrate: u32) -> Self {
        if baudrate == 0 {
            return self;
        }
        Self { baudrate, ..self }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_chain_baud() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
    }

    #[test]
    fn test_with_baudrate() {
        let config = UartConfig::default().with_baudrate(115_200);
        assert_eq!(config.baudrate, 115_200);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.with_baudrate(0).baudrate, 115_200);
    }
}
