//! Touch pad sampling

/// Source of raw touch readings
///
/// Larger values mean more capacitance on the pad. Scale and offset are
/// board specific; the node calibrates high and low levels at runtime.
pub trait TouchSensor {
    /// Take one reading
    fn read(&mut self) -> impl core::future::Future<Output = u16>;
}
