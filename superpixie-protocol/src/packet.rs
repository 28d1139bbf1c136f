//! Logical packets and wire-profile selection
//!
//! A [`Packet`] holds the decoded fields of one chain packet regardless of
//! how it travels on the wire. [`WireProfile`] picks the codec used to turn
//! it into bytes and back.

use heapless::Vec;

use crate::address::ADDRESS_NULL;
use crate::framer::{LengthFramer, MarkerFramer, ProfileFramer};
use crate::{full_byte, nibble};

/// Largest payload any profile can carry (full-byte length field is one byte)
pub const MAX_PAYLOAD_SIZE: usize = 255;

/// Largest encoded packet of either profile
pub const MAX_WIRE_SIZE: usize = full_byte::MAX_WIRE_SIZE;

/// Encoded packet ready to be written to a port
pub type WireBuffer = Vec<u8, MAX_WIRE_SIZE>;

/// Errors that can occur while encoding or decoding packets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Captured frame is shorter than the profile's header
    TooShort,
    /// Header announces more payload than the frame holds
    Truncated,
    /// Payload exceeds what the profile can carry
    PayloadTooLarge,
    /// Command code does not fit the profile's command field
    CommandOutOfRange,
    /// Output buffer too small for encoding
    BufferTooSmall,
}

/// Which of the two deployed wire formats a port speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WireProfile {
    /// One wire byte per field, 4-byte sync, header-driven length, ack flag
    FullByte,
    /// Two wire bytes per logical byte, preamble/end-marker framing, no ack flag
    NibblePadded,
}

impl WireProfile {
    /// Minimum captured length (after the start pattern) of a decodable frame
    pub const fn header_len(self) -> usize {
        match self {
            WireProfile::FullByte => full_byte::HEADER_LEN,
            WireProfile::NibblePadded => nibble::HEADER_LEN,
        }
    }

    /// Largest payload this profile can carry
    pub const fn max_payload(self) -> usize {
        match self {
            WireProfile::FullByte => full_byte::MAX_PAYLOAD,
            WireProfile::NibblePadded => nibble::MAX_PAYLOAD,
        }
    }

    /// Encode a packet into `buffer`
    ///
    /// Returns the number of bytes written.
    pub fn encode(self, packet: &Packet, buffer: &mut [u8]) -> Result<usize, CodecError> {
        match self {
            WireProfile::FullByte => full_byte::encode(packet, buffer),
            WireProfile::NibblePadded => nibble::encode(packet, buffer),
        }
    }

    /// Encode a packet into a heapless Vec
    pub fn encode_to_vec(self, packet: &Packet) -> Result<WireBuffer, CodecError> {
        let mut buffer = [0u8; MAX_WIRE_SIZE];
        let len = self.encode(packet, &mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| CodecError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Decode a frame captured by this profile's framer
    pub fn decode(self, frame: &[u8]) -> Result<Packet, CodecError> {
        match self {
            WireProfile::FullByte => full_byte::decode(frame),
            WireProfile::NibblePadded => nibble::decode(frame),
        }
    }

    /// Create the framer that delimits this profile's packets
    pub fn framer(self) -> ProfileFramer {
        match self {
            WireProfile::FullByte => ProfileFramer::FullByte(LengthFramer::new()),
            WireProfile::NibblePadded => ProfileFramer::Nibble(MarkerFramer::new()),
        }
    }

    /// Create the packet-id source this profile uses
    ///
    /// Full-byte senders count up; nibble senders draw a random id per packet.
    pub fn packet_ids(self, seed: u64) -> PacketIds {
        match self {
            WireProfile::FullByte => PacketIds::sequential(),
            WireProfile::NibblePadded => PacketIds::random(seed),
        }
    }
}

/// A decoded chain packet
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// Id used to correlate acknowledgements
    pub packet_id: u16,
    /// Address of the sender
    pub origin: u8,
    /// Address the packet is meant for
    pub destination: u8,
    /// First node that relayed the packet upstream ([`ADDRESS_NULL`] if none)
    pub first_hop: u8,
    /// Sender wants an ACK back (full-byte profile only)
    pub ack_requested: bool,
    /// Raw command code of the active generation
    pub command: u16,
    /// Command arguments
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Packet {
    /// Create a new packet with the given command and payload
    pub fn new(
        packet_id: u16,
        origin: u8,
        destination: u8,
        command: u16,
        payload: &[u8],
    ) -> Result<Self, CodecError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| CodecError::PayloadTooLarge)?;

        Ok(Self {
            packet_id,
            origin,
            destination,
            first_hop: ADDRESS_NULL,
            ack_requested: false,
            command,
            payload: payload_vec,
        })
    }

    /// Create a packet with no payload
    pub fn empty(packet_id: u16, origin: u8, destination: u8, command: u16) -> Self {
        Self {
            packet_id,
            origin,
            destination,
            first_hop: ADDRESS_NULL,
            ack_requested: false,
            command,
            payload: Vec::new(),
        }
    }

    /// Builder-style setter for the ack-requested flag
    pub fn with_ack(mut self, ack_requested: bool) -> Self {
        self.ack_requested = ack_requested;
        self
    }
}

/// Source of packet ids for outgoing packets
#[derive(Debug, Clone)]
pub enum PacketIds {
    /// Monotonic counter; the first id handed out is 1
    Sequential { last: u16 },
    /// Uniform random id per packet
    Random(fastrand::Rng),
}

impl PacketIds {
    /// Counter starting at zero
    pub fn sequential() -> Self {
        PacketIds::Sequential { last: 0 }
    }

    /// Random ids from a seeded generator
    pub fn random(seed: u64) -> Self {
        PacketIds::Random(fastrand::Rng::with_seed(seed))
    }

    /// Produce the id for the next outgoing packet
    pub fn next_id(&mut self) -> u16 {
        match self {
            PacketIds::Sequential { last } => {
                *last = last.wrapping_add(1);
                *last
            }
            PacketIds::Random(rng) => rng.u16(..),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_increment() {
        let mut ids = WireProfile::FullByte.packet_ids(0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn test_sequential_ids_wrap() {
        let mut ids = PacketIds::Sequential { last: u16::MAX };
        assert_eq!(ids.next_id(), 0);
    }

    #[test]
    fn test_random_ids_are_seeded() {
        let mut a = WireProfile::NibblePadded.packet_ids(42);
        let mut b = WireProfile::NibblePadded.packet_ids(42);
        for _ in 0..8 {
            assert_eq!(a.next_id(), b.next_id());
        }
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        let result = Packet::new(1, 0, 0, 0, &large_payload);
        assert_eq!(result, Err(CodecError::PayloadTooLarge));
    }
}
