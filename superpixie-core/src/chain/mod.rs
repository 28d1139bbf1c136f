//! Chain protocol engines
//!
//! Every node has two ports. The upstream port faces the commander, the
//! downstream port faces the end of the chain. An engine consumes bytes
//! from both ports one at a time, forwards what must be relayed, and
//! executes packets addressed to this node through the [`Display`].
//!
//! Two engines exist, one per protocol generation:
//! - [`FullByteEngine`]: commander-driven discovery with ACKs.
//! - [`NibbleEngine`]: node-driven discovery with probes.
//!
//! [`Display`]: crate::display::Display

pub mod full_byte;
pub mod nibble;

pub use full_byte::FullByteEngine;
pub use nibble::{Discovery, NibbleEngine};

use superpixie_protocol::{Packet, WireProfile, ADDRESS_NULL};

/// Which port a byte travels on, named by where it is heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Towards the commander
    Upstream,
    /// Towards the end of the chain
    Downstream,
}

impl Direction {
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Upstream => Direction::Downstream,
            Direction::Downstream => Direction::Upstream,
        }
    }
}

/// Output side of the two chain ports
///
/// Writes must not block for long; the firmware backs this with buffered
/// UART transmitters.
pub trait ChainIo {
    fn write(&mut self, direction: Direction, bytes: &[u8]);
}

/// The node's view of the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChainConfig {
    /// Own address, [`ADDRESS_NULL`] until assigned
    pub local_address: u8,
    /// Number of nodes, 0 while unknown
    pub chain_length: u8,
    /// Bytes arriving from upstream are forwarded downstream
    pub propagation: bool,
    /// Both ports forward unconditionally
    pub bus_mode: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            local_address: ADDRESS_NULL,
            chain_length: 0,
            propagation: false,
            bus_mode: false,
        }
    }
}

impl ChainConfig {
    pub fn is_assigned(&self) -> bool {
        self.local_address != ADDRESS_NULL
    }
}

/// Encode a packet and write it to one port
///
/// Packets that cannot be encoded are dropped; the payloads built by the
/// engines always fit.
pub(crate) fn send(io: &mut impl ChainIo, profile: WireProfile, direction: Direction, packet: &Packet) {
    if let Ok(bytes) = profile.encode_to_vec(packet) {
        io.write(direction, &bytes);
    }
}
