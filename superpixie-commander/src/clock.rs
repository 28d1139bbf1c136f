//! Time source for timeouts

/// Monotonic millisecond clock
///
/// The commander also needs [`embedded_hal::delay::DelayNs`] for `hold`;
/// most platforms implement both on one type.
pub trait Clock {
    fn now_ms(&mut self) -> u64;
}
