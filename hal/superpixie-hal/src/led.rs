//! Addressable LED output

use smart_leds::RGB8;

/// Sink for one full frame of LED colours
///
/// Colours arrive already quantized to 8 bits per channel. The sink owns
/// wire order (GRB for WS2812) and latching.
pub trait LedSink {
    /// Error type for write operations
    type Error;

    /// Push a complete frame out to the LEDs
    fn write(&mut self, frame: &[RGB8]) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}
