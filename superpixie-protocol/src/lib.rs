//! SuperPixie chain protocol
//!
//! This crate defines the serial protocol spoken between SuperPixie nodes
//! and the commander that drives them. Nodes sit on a single linear chain;
//! every node has an upstream port (towards the commander) and a downstream
//! port (towards the end of the chain).
//!
//! # Wire profiles
//!
//! Two generations of the protocol are deployed and both are supported
//! bit-exact. They share a conceptual shape but are distinct protocols.
//!
//! Full-byte profile (length driven):
//! ```text
//! ┌──────┬────────┬────────┬──────┬───────────┬───────┬─────────┬─────┬──────────┐
//! │ SYNC │ ID     │ ORIGIN │ DEST │ FIRST_HOP │ FLAGS │ COMMAND │ LEN │ DATA     │
//! │ 4B   │ 2B BE  │ 1B     │ 1B   │ 1B        │ 1B    │ 2B BE   │ 1B  │ 0–255B   │
//! └──────┴────────┴────────┴──────┴───────────┴───────┴─────────┴─────┴──────────┘
//! ```
//!
//! Nibble-padded profile (marker terminated), every logical byte is sent as
//! `[high nibble][low nibble]`:
//! ```text
//! ┌──────────┬──────┬────────┬────┬─────────┬─────┬──────────┬────────────┐
//! │ PREAMBLE │ DEST │ ORIGIN │ ID │ COMMAND │ LEN │ DATA     │ END MARKER │
//! │ 4B       │ 2B   │ 2B     │ 4B │ 2B      │ 2B  │ 2×LEN B  │ 4B         │
//! └──────────┴──────┴────────┴────┴─────────┴─────┴──────────┴────────────┘
//! ```
//!
//! The end marker is the preamble reversed. Nothing is escaped in either
//! profile.

#![no_std]
#![deny(unsafe_code)]

pub mod address;
pub mod commands;
pub mod framer;
pub mod full_byte;
pub mod nibble;
pub mod packet;
pub mod payload;

pub use address::{ADDRESS_BROADCAST, ADDRESS_CHAIN_HEAD, ADDRESS_COMMANDER, ADDRESS_NULL};
pub use commands::Command;
pub use framer::{Framer, LengthFramer, MarkerFramer, ProfileFramer, RawFrame};
pub use packet::{CodecError, Packet, PacketIds, WireBuffer, WireProfile, MAX_PAYLOAD_SIZE};
pub use payload::PayloadReader;
