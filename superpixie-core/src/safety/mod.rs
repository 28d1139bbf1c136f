//! Fault reporting without a logging channel
//!
//! Nodes have no display of their own besides the matrix, so link
//! failures are drawn on it.

pub mod watchdog;

pub use watchdog::{LinkFault, LinkWatchdog};
