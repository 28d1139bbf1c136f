//! Full-byte wire profile
//!
//! Every field is sent as-is, 16-bit fields big-endian. The frame length
//! comes from the header's length byte, so payload bytes are never scanned
//! for an end marker.

use heapless::Vec;

use crate::packet::{CodecError, Packet};

/// Start-of-frame pattern
pub const SYNC_PATTERN: [u8; 4] = [0xCC, 0x33, 0xAA, 0x55];

/// Bytes between the sync pattern and the payload
pub const HEADER_LEN: usize = 9;

/// Largest payload (one-byte length field)
pub const MAX_PAYLOAD: usize = 255;

/// Largest encoded frame including the sync pattern
pub const MAX_WIRE_SIZE: usize = SYNC_PATTERN.len() + HEADER_LEN + MAX_PAYLOAD;

/// Position of the first-hop byte within a captured frame
pub const FIRST_HOP_INDEX: usize = 4;

/// Bit of the flags byte that asks the receiver for an ACK
pub const FLAG_ACK_REQUESTED: u8 = 1 << 7;

/// Encode a packet, sync pattern included
pub fn encode(packet: &Packet, buffer: &mut [u8]) -> Result<usize, CodecError> {
    let len = packet.payload.len();
    if len > MAX_PAYLOAD {
        return Err(CodecError::PayloadTooLarge);
    }
    let frame_len = SYNC_PATTERN.len() + HEADER_LEN + len;
    if buffer.len() < frame_len {
        return Err(CodecError::BufferTooSmall);
    }

    let flags = if packet.ack_requested {
        FLAG_ACK_REQUESTED
    } else {
        0
    };
    let [id_hi, id_lo] = packet.packet_id.to_be_bytes();
    let [cmd_hi, cmd_lo] = packet.command.to_be_bytes();

    buffer[..4].copy_from_slice(&SYNC_PATTERN);
    buffer[4..4 + HEADER_LEN].copy_from_slice(&[
        id_hi,
        id_lo,
        packet.origin,
        packet.destination,
        packet.first_hop,
        flags,
        cmd_hi,
        cmd_lo,
        len as u8,
    ]);
    buffer[4 + HEADER_LEN..frame_len].copy_from_slice(&packet.payload);

    Ok(frame_len)
}

/// Decode a frame captured by [`LengthFramer`](crate::LengthFramer)
pub fn decode(frame: &[u8]) -> Result<Packet, CodecError> {
    if frame.len() < HEADER_LEN {
        return Err(CodecError::TooShort);
    }

    let len = frame[8] as usize;
    let data = frame
        .get(HEADER_LEN..HEADER_LEN + len)
        .ok_or(CodecError::Truncated)?;

    let mut payload = Vec::new();
    payload
        .extend_from_slice(data)
        .map_err(|_| CodecError::PayloadTooLarge)?;

    Ok(Packet {
        packet_id: u16::from_be_bytes([frame[0], frame[1]]),
        origin: frame[2],
        destination: frame[3],
        first_hop: frame[FIRST_HOP_INDEX],
        ack_requested: frame[5] & FLAG_ACK_REQUESTED != 0,
        command: u16::from_be_bytes([frame[6], frame[7]]),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{ADDRESS_BROADCAST, ADDRESS_COMMANDER, ADDRESS_NULL};
    use crate::framer::{Framer, LengthFramer};
    use proptest::prelude::*;

    #[test]
    fn test_encode_layout() {
        let packet = Packet::new(0x0102, ADDRESS_COMMANDER, ADDRESS_BROADCAST, 11, &[1, 2, 3])
            .unwrap()
            .with_ack(true);
        let mut buffer = [0u8; 32];
        let len = encode(&packet, &mut buffer).unwrap();

        assert_eq!(len, 16);
        assert_eq!(
            &buffer[..len],
            &[
                0xCC, 0x33, 0xAA, 0x55, // sync
                0x01, 0x02, // id
                253,  // origin
                255,  // dest
                254,  // first hop
                0x80, // flags
                0x00, 11, // command
                3,  // len
                1, 2, 3,
            ]
        );
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let packet = Packet::new(1, 0, 0, 0, &[1, 2, 3]).unwrap();
        let mut buffer = [0u8; 15];
        assert_eq!(encode(&packet, &mut buffer), Err(CodecError::BufferTooSmall));
    }

    #[test]
    fn test_decode_too_short() {
        assert_eq!(decode(&[0; 8]), Err(CodecError::TooShort));
    }

    #[test]
    fn test_decode_truncated() {
        // Header announces 4 payload bytes, only 2 present
        let frame = [0, 1, 2, 3, ADDRESS_NULL, 0, 0, 5, 4, 9, 9];
        assert_eq!(decode(&frame), Err(CodecError::Truncated));
    }

    proptest! {
        #[test]
        fn test_roundtrip_through_framer(
            id in any::<u16>(),
            origin in any::<u8>(),
            dest in any::<u8>(),
            first_hop in any::<u8>(),
            ack in any::<bool>(),
            command in 0u16..64,
            payload in proptest::collection::vec(any::<u8>(), 0..=32),
        ) {
            let mut packet = Packet::new(id, origin, dest, command, &payload).unwrap().with_ack(ack);
            packet.first_hop = first_hop;

            let mut buffer = [0u8; MAX_WIRE_SIZE];
            let len = encode(&packet, &mut buffer).unwrap();

            let mut framer = LengthFramer::new();
            let frame = framer.feed_bytes(&buffer[..len]);
            // Header fields may spell the sync pattern and restart the capture
            prop_assume!(frame.is_some());
            prop_assert_eq!(decode(&frame.unwrap()).unwrap(), packet);
        }
    }
}
