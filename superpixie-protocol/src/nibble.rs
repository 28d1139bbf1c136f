//! Nibble-padded wire profile
//!
//! Every logical byte travels as two wire bytes, high nibble first, each
//! zero-extended. Header and payload bytes are therefore always below 0x10
//! and cannot spell the preamble or the end marker.

use heapless::Vec;

use crate::address::ADDRESS_NULL;
use crate::packet::{CodecError, Packet};

/// Start-of-frame pattern
pub const PREAMBLE: [u8; 4] = [0xB8, 0x87, 0xAA, 0x95];

/// End-of-frame pattern (the preamble reversed)
pub const END_MARKER: [u8; 4] = [0x95, 0xAA, 0x87, 0xB8];

/// Wire bytes of the doubled header: dest, origin, id (2), command, length
pub const HEADER_LEN: usize = 12;

/// Capacity of a node's capture buffer
pub const MAX_FRAME_SIZE: usize = 128;

/// Largest decoded payload
pub const MAX_DECODED_PAYLOAD: usize = 64;

/// Largest payload that still fits a capture buffer once encoded
pub const MAX_PAYLOAD: usize = (MAX_FRAME_SIZE - PREAMBLE.len() - HEADER_LEN - END_MARKER.len()) / 2;

/// Largest encoded frame including preamble and end marker
pub const MAX_WIRE_SIZE: usize = PREAMBLE.len() + HEADER_LEN + 2 * MAX_PAYLOAD + END_MARKER.len();

/// Split a byte into its two padded wire bytes
#[inline]
pub const fn pad(byte: u8) -> [u8; 2] {
    [byte >> 4, byte & 0x0F]
}

/// Join two padded wire bytes back into one logical byte
#[inline]
pub const fn unpad(high: u8, low: u8) -> u8 {
    (high << 4).wrapping_add(low)
}

/// Encode a packet, preamble and end marker included
///
/// The command field is a single logical byte; codes above 255 are
/// rejected.
pub fn encode(packet: &Packet, buffer: &mut [u8]) -> Result<usize, CodecError> {
    let len = packet.payload.len();
    if len > MAX_PAYLOAD {
        return Err(CodecError::PayloadTooLarge);
    }
    let command = u8::try_from(packet.command).map_err(|_| CodecError::CommandOutOfRange)?;

    let frame_len = PREAMBLE.len() + HEADER_LEN + 2 * len + END_MARKER.len();
    if buffer.len() < frame_len {
        return Err(CodecError::BufferTooSmall);
    }

    // The id goes out low byte first
    let [id_lo, id_hi] = packet.packet_id.to_le_bytes();
    let header = [packet.destination, packet.origin, id_lo, id_hi, command, len as u8];

    buffer[..4].copy_from_slice(&PREAMBLE);
    let mut pos = 4;
    for byte in header.iter().chain(packet.payload.iter()) {
        buffer[pos..pos + 2].copy_from_slice(&pad(*byte));
        pos += 2;
    }
    buffer[pos..pos + 4].copy_from_slice(&END_MARKER);

    Ok(frame_len)
}

/// Decode a frame captured by [`MarkerFramer`](crate::MarkerFramer)
///
/// The profile has no first-hop field or ack flag; those decode as
/// [`ADDRESS_NULL`] and `false`.
pub fn decode(frame: &[u8]) -> Result<Packet, CodecError> {
    if frame.len() < HEADER_LEN {
        return Err(CodecError::TooShort);
    }

    let byte_at = |i: usize| unpad(frame[2 * i], frame[2 * i + 1]);

    let len = byte_at(5) as usize;
    if len > MAX_DECODED_PAYLOAD {
        return Err(CodecError::PayloadTooLarge);
    }
    if frame.len() < HEADER_LEN + 2 * len {
        return Err(CodecError::Truncated);
    }

    let mut payload = Vec::new();
    for i in 0..len {
        payload
            .push(byte_at(6 + i))
            .map_err(|_| CodecError::PayloadTooLarge)?;
    }

    Ok(Packet {
        packet_id: u16::from_le_bytes([byte_at(2), byte_at(3)]),
        origin: byte_at(1),
        destination: byte_at(0),
        first_hop: ADDRESS_NULL,
        ack_requested: false,
        command: byte_at(4) as u16,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framer::{Framer, MarkerFramer};
    use proptest::prelude::*;

    #[test]
    fn test_encoded_frame_fits_capture_buffer() {
        assert_eq!(MAX_PAYLOAD, 54);
        assert!(MAX_WIRE_SIZE <= MAX_FRAME_SIZE);
    }

    #[test]
    fn test_encode_layout() {
        let packet = Packet::new(0xABCD, 0x12, 0xFF, 0x0E, &[0x7F]).unwrap();
        let mut buffer = [0u8; 32];
        let len = encode(&packet, &mut buffer).unwrap();

        assert_eq!(len, 4 + 12 + 2 + 4);
        assert_eq!(
            &buffer[..len],
            &[
                0xB8, 0x87, 0xAA, 0x95, // preamble
                0x0F, 0x0F, // dest
                0x01, 0x02, // origin
                0x0C, 0x0D, 0x0A, 0x0B, // id, low byte first
                0x00, 0x0E, // command
                0x00, 0x01, // len
                0x07, 0x0F, // data
                0x95, 0xAA, 0x87, 0xB8, // end marker
            ]
        );
    }

    #[test]
    fn test_packet_id_low_byte_first() {
        let mut frame = [0u8; HEADER_LEN];
        frame[4..8].copy_from_slice(&[0x03, 0x04, 0x01, 0x02]);
        assert_eq!(decode(&frame).unwrap().packet_id, 0x0102);
    }

    #[test]
    fn test_encode_rejects_wide_command() {
        let packet = Packet::empty(1, 0, 0, 0x100);
        let mut buffer = [0u8; MAX_WIRE_SIZE];
        assert_eq!(encode(&packet, &mut buffer), Err(CodecError::CommandOutOfRange));
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let packet = Packet::new(1, 0, 0, 0, &[0u8; MAX_PAYLOAD + 1]).unwrap();
        let mut buffer = [0u8; 256];
        assert_eq!(encode(&packet, &mut buffer), Err(CodecError::PayloadTooLarge));
    }

    #[test]
    fn test_decode_too_short() {
        assert_eq!(decode(&[0; HEADER_LEN - 1]), Err(CodecError::TooShort));
    }

    #[test]
    fn test_decode_rejects_large_length() {
        let mut frame = [0u8; HEADER_LEN];
        // len = 0x41 = 65
        frame[10] = 0x04;
        frame[11] = 0x01;
        assert_eq!(decode(&frame), Err(CodecError::PayloadTooLarge));
    }

    #[test]
    fn test_decode_truncated() {
        let mut frame = [0u8; HEADER_LEN + 2];
        frame[11] = 0x02;
        assert_eq!(decode(&frame), Err(CodecError::Truncated));
    }

    proptest! {
        #[test]
        fn test_roundtrip_through_framer(
            id in any::<u16>(),
            origin in any::<u8>(),
            dest in any::<u8>(),
            command in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD),
        ) {
            let packet = Packet::new(id, origin, dest, command as u16, &payload).unwrap();

            let mut buffer = [0u8; MAX_WIRE_SIZE];
            let len = encode(&packet, &mut buffer).unwrap();

            let mut framer = MarkerFramer::new();
            let frame = framer.feed_bytes(&buffer[..len]).unwrap();
            prop_assert_eq!(decode(&frame).unwrap(), packet);
        }
    }
}
