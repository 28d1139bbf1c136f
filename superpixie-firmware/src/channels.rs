//! Shared state and inter-task communication
//!
//! The node itself sits behind an async mutex; every task that touches it
//! holds the lock only for one call. Bytes the node emits are queued in
//! one pipe per port and drained by that port's TX task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::pipe::Pipe;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU32, Ordering};

use superpixie_core::chain::{ChainIo, Direction};
use superpixie_core::config::StorageRecord;
use superpixie_core::Node;

use crate::config::UART_BUFFER_SIZE;

/// The node, set once by `main` before any task runs
pub static NODE: Mutex<CriticalSectionRawMutex, Option<Node>> = Mutex::new(None);

/// Bytes waiting for the upstream UART
pub static UPSTREAM_OUT: Pipe<CriticalSectionRawMutex, UART_BUFFER_SIZE> = Pipe::new();

/// Bytes waiting for the downstream UART
pub static DOWNSTREAM_OUT: Pipe<CriticalSectionRawMutex, UART_BUFFER_SIZE> = Pipe::new();

/// Bytes lost because a TX pipe was full
pub static TX_OVERFLOW: AtomicU32 = AtomicU32::new(0);

/// Record to persist (latest wins)
pub static SAVE_REQUEST: Signal<CriticalSectionRawMutex, StorageRecord> = Signal::new();

/// Status LED requests
pub static STATUS_LED: Signal<CriticalSectionRawMutex, StatusLed> = Signal::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusLed {
    /// Steady level set by the commander
    Level(bool),
    /// Short identification blink
    Blink,
}

pub fn outbound(direction: Direction) -> &'static Pipe<CriticalSectionRawMutex, UART_BUFFER_SIZE> {
    match direction {
        Direction::Upstream => &UPSTREAM_OUT,
        Direction::Downstream => &DOWNSTREAM_OUT,
    }
}

/// [`ChainIo`] over the TX pipes
///
/// Never waits: whatever does not fit is counted in [`TX_OVERFLOW`] and
/// dropped.
pub struct PipeIo;

impl ChainIo for PipeIo {
    fn write(&mut self, direction: Direction, bytes: &[u8]) {
        let pipe = outbound(direction);
        let mut rest = bytes;
        while !rest.is_empty() {
            match pipe.try_write(rest) {
                Ok(n) => rest = &rest[n..],
                Err(_) => {
                    TX_OVERFLOW.fetch_add(rest.len() as u32, Ordering::Relaxed);
                    break;
                }
            }
        }
    }
}
