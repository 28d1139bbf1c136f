//! Byte-at-a-time frame extraction
//!
//! Both profiles watch a 4-byte sliding window for a start pattern. A new
//! start pattern always discards whatever capture was in progress, so a
//! framer resynchronizes on its own after noise or a truncated frame.
//!
//! The two profiles differ in how a frame ends:
//! - [`LengthFramer`] counts header bytes and then the payload length the
//!   header announces.
//! - [`MarkerFramer`] captures until the end marker (the reversed preamble)
//!   and trims it off.

use heapless::Vec;

use crate::{full_byte, nibble};

/// Capacity of a captured frame (full-byte header plus the largest payload)
pub const MAX_CAPTURE_SIZE: usize = full_byte::HEADER_LEN + full_byte::MAX_PAYLOAD;

/// Bytes captured between the start pattern and the end of a frame
pub type RawFrame = Vec<u8, MAX_CAPTURE_SIZE>;

/// A byte-stream framer
pub trait Framer {
    /// Feed a single byte
    ///
    /// Returns `Some(frame)` when the byte completes a frame.
    fn feed(&mut self, byte: u8) -> Option<RawFrame>;

    /// Drop any capture in progress
    fn reset(&mut self);

    /// Number of frames dropped because they overran the capture buffer
    fn dropped(&self) -> u32;

    /// Feed multiple bytes
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    fn feed_bytes(&mut self, bytes: &[u8]) -> Option<RawFrame> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte) {
                return Some(frame);
            }
        }
        None
    }
}

/// Sliding window over the last four bytes seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncWindow {
    bytes: [u8; 4],
}

impl SyncWindow {
    /// Shift the window left and append the newest byte
    pub fn push(&mut self, byte: u8) {
        self.bytes.copy_within(1.., 0);
        self.bytes[3] = byte;
    }

    /// Exact match against a 4-byte pattern
    pub fn matches(&self, pattern: &[u8; 4]) -> bool {
        self.bytes == *pattern
    }

    /// Forget everything seen so far
    pub fn clear(&mut self) {
        self.bytes = [0; 4];
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthState {
    /// Waiting for the sync pattern
    Idle,
    /// Counting down the fixed header
    Header { remaining: u8 },
    /// Counting down the payload announced by the header
    Payload { remaining: u8 },
}

/// Framer for the full-byte profile
///
/// After the sync pattern it captures the 9 header bytes, reads the payload
/// length from the last of them, then captures exactly that many bytes.
/// Payload bytes that happen to spell the sync pattern still restart the
/// capture; the sender never escapes them.
#[derive(Debug, Clone)]
pub struct LengthFramer {
    window: SyncWindow,
    state: LengthState,
    buffer: RawFrame,
    dropped: u32,
}

impl Default for LengthFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LengthFramer {
    /// Create a new framer
    pub fn new() -> Self {
        Self {
            window: SyncWindow::default(),
            state: LengthState::Idle,
            buffer: Vec::new(),
            dropped: 0,
        }
    }

    /// Whether a frame is currently being captured
    pub fn is_capturing(&self) -> bool {
        self.state != LengthState::Idle
    }

    /// Index (within the captured frame) the next fed byte will land at
    ///
    /// Returns `None` while idle. A relay uses this to find the first-hop
    /// field of a frame it is forwarding.
    pub fn next_index(&self) -> Option<usize> {
        match self.state {
            LengthState::Idle => None,
            _ => Some(self.buffer.len()),
        }
    }

    fn start(&mut self) {
        self.buffer.clear();
        self.state = LengthState::Header {
            remaining: full_byte::HEADER_LEN as u8,
        };
    }

    fn finish(&mut self) -> Option<RawFrame> {
        self.state = LengthState::Idle;
        Some(core::mem::take(&mut self.buffer))
    }
}

impl Framer for LengthFramer {
    fn feed(&mut self, byte: u8) -> Option<RawFrame> {
        self.window.push(byte);

        if self.window.matches(&full_byte::SYNC_PATTERN) {
            self.start();
            return None;
        }

        match self.state {
            LengthState::Idle => None,
            LengthState::Header { remaining } => {
                if self.buffer.push(byte).is_err() {
                    self.dropped = self.dropped.saturating_add(1);
                    self.reset();
                    return None;
                }
                let remaining = remaining - 1;
                if remaining > 0 {
                    self.state = LengthState::Header { remaining };
                    return None;
                }
                // Last header byte is the payload length
                if byte == 0 {
                    self.finish()
                } else {
                    self.state = LengthState::Payload { remaining: byte };
                    None
                }
            }
            LengthState::Payload { remaining } => {
                if self.buffer.push(byte).is_err() {
                    self.dropped = self.dropped.saturating_add(1);
                    self.reset();
                    return None;
                }
                let remaining = remaining - 1;
                if remaining == 0 {
                    self.finish()
                } else {
                    self.state = LengthState::Payload { remaining };
                    None
                }
            }
        }
    }

    fn reset(&mut self) {
        self.state = LengthState::Idle;
        self.buffer.clear();
    }

    fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Framer for the nibble-padded profile
///
/// Captures everything after the preamble until the end marker shows up in
/// the window, then trims the marker. A capture longer than
/// [`nibble::MAX_FRAME_SIZE`] is dropped and the framer waits for the next
/// preamble.
#[derive(Debug, Clone)]
pub struct MarkerFramer {
    window: SyncWindow,
    capturing: bool,
    buffer: Vec<u8, { nibble::MAX_FRAME_SIZE }>,
    dropped: u32,
}

impl Default for MarkerFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerFramer {
    /// Create a new framer
    pub fn new() -> Self {
        Self {
            window: SyncWindow::default(),
            capturing: false,
            buffer: Vec::new(),
            dropped: 0,
        }
    }

    /// Whether a frame is currently being captured
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }
}

impl Framer for MarkerFramer {
    fn feed(&mut self, byte: u8) -> Option<RawFrame> {
        // The byte is captured before the window is checked, so the end
        // marker lands in the buffer and has to be trimmed.
        if self.capturing && self.buffer.push(byte).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            self.reset();
        }

        self.window.push(byte);

        if self.window.matches(&nibble::PREAMBLE) {
            self.buffer.clear();
            self.capturing = true;
            return None;
        }

        if self.capturing && self.window.matches(&nibble::END_MARKER) {
            let len = self.buffer.len().saturating_sub(nibble::END_MARKER.len());
            let mut frame = RawFrame::new();
            // Capacity of RawFrame exceeds the marker framer's buffer
            let _ = frame.extend_from_slice(&self.buffer[..len]);
            self.reset();
            return Some(frame);
        }

        None
    }

    fn reset(&mut self) {
        self.capturing = false;
        self.buffer.clear();
    }

    fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Framer for whichever profile a port speaks
#[derive(Debug, Clone)]
pub enum ProfileFramer {
    FullByte(LengthFramer),
    Nibble(MarkerFramer),
}

impl ProfileFramer {
    /// Index the next fed byte will occupy, for full-byte captures only
    pub fn next_index(&self) -> Option<usize> {
        match self {
            ProfileFramer::FullByte(framer) => framer.next_index(),
            ProfileFramer::Nibble(_) => None,
        }
    }
}

impl Framer for ProfileFramer {
    fn feed(&mut self, byte: u8) -> Option<RawFrame> {
        match self {
            ProfileFramer::FullByte(framer) => framer.feed(byte),
            ProfileFramer::Nibble(framer) => framer.feed(byte),
        }
    }

    fn reset(&mut self) {
        match self {
            ProfileFramer::FullByte(framer) => framer.reset(),
            ProfileFramer::Nibble(framer) => framer.reset(),
        }
    }

    fn dropped(&self) -> u32 {
        match self {
            ProfileFramer::FullByte(framer) => framer.dropped(),
            ProfileFramer::Nibble(framer) => framer.dropped(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Packet, WireProfile};
    use proptest::prelude::*;

    fn frame_of(profile: WireProfile, payload: &[u8]) -> crate::WireBuffer {
        let packet = Packet::new(7, 1, 2, 3, payload).unwrap();
        profile.encode_to_vec(&packet).unwrap()
    }

    #[test]
    fn test_sync_window_matches_last_four() {
        let mut window = SyncWindow::default();
        for byte in [0x00, 0xCC, 0x33, 0xAA, 0x55] {
            window.push(byte);
        }
        assert!(window.matches(&full_byte::SYNC_PATTERN));
        window.push(0x00);
        assert!(!window.matches(&full_byte::SYNC_PATTERN));
    }

    #[test]
    fn test_length_framer_zero_payload() {
        let encoded = frame_of(WireProfile::FullByte, &[]);
        let mut framer = LengthFramer::new();
        let frame = framer.feed_bytes(&encoded).unwrap();
        assert_eq!(frame.len(), full_byte::HEADER_LEN);
        assert!(!framer.is_capturing());
    }

    #[test]
    fn test_length_framer_payload_containing_marker_bytes() {
        let payload = [0xCC, 0x33, 0xAA, 0x01, 0x55];
        let encoded = frame_of(WireProfile::FullByte, &payload);
        let mut framer = LengthFramer::new();
        let frame = framer.feed_bytes(&encoded).unwrap();
        assert_eq!(&frame[full_byte::HEADER_LEN..], &payload);
    }

    #[test]
    fn test_length_framer_new_sync_restarts_capture() {
        let first = frame_of(WireProfile::FullByte, &[1, 2, 3, 4]);
        let second = frame_of(WireProfile::FullByte, &[9]);

        let mut framer = LengthFramer::new();
        // Cut the first frame short, then send a complete second one
        assert!(framer.feed_bytes(&first[..8]).is_none());
        let frame = framer.feed_bytes(&second).unwrap();
        assert_eq!(frame.last(), Some(&9));
    }

    #[test]
    fn test_length_framer_next_index_tracks_capture() {
        let encoded = frame_of(WireProfile::FullByte, &[]);
        let mut framer = LengthFramer::new();
        assert_eq!(framer.next_index(), None);
        framer.feed_bytes(&encoded[..4]);
        assert_eq!(framer.next_index(), Some(0));
        framer.feed_bytes(&encoded[4..8]);
        assert_eq!(framer.next_index(), Some(full_byte::FIRST_HOP_INDEX));
    }

    #[test]
    fn test_marker_framer_trims_end_marker() {
        let encoded = frame_of(WireProfile::NibblePadded, &[0x12]);
        let mut framer = MarkerFramer::new();
        let frame = framer.feed_bytes(&encoded).unwrap();
        assert_eq!(frame.len(), nibble::HEADER_LEN + 2);
        assert_eq!(&frame[frame.len() - 2..], &[0x01, 0x02]);
    }

    #[test]
    fn test_marker_framer_ignores_end_marker_when_idle() {
        let mut framer = MarkerFramer::new();
        assert!(framer.feed_bytes(&nibble::END_MARKER).is_none());
        assert!(!framer.is_capturing());
    }

    #[test]
    fn test_marker_framer_overflow_is_dropped() {
        let mut framer = MarkerFramer::new();
        framer.feed_bytes(&nibble::PREAMBLE);
        for _ in 0..nibble::MAX_FRAME_SIZE + 1 {
            assert!(framer.feed(0x00).is_none());
        }
        assert_eq!(framer.dropped(), 1);
        assert!(!framer.is_capturing());

        // Recovers on the next good frame
        let encoded = frame_of(WireProfile::NibblePadded, &[3]);
        assert!(framer.feed_bytes(&encoded).is_some());
    }

    proptest! {
        #[test]
        fn test_framers_resync_after_noise(
            noise in proptest::collection::vec(any::<u8>(), 0..64),
            payload in proptest::collection::vec(any::<u8>(), 0..40),
        ) {
            for profile in [WireProfile::FullByte, WireProfile::NibblePadded] {
                let encoded = frame_of(profile, &payload);
                let mut framer = profile.framer();
                for &byte in &noise {
                    framer.feed(byte);
                }
                // The frame's own start pattern always restarts the capture
                let frame = framer.feed_bytes(&encoded);
                prop_assert!(frame.is_some());
                let packet = profile.decode(&frame.unwrap()).unwrap();
                prop_assert_eq!(&packet.payload[..], &payload[..]);
            }
        }
    }
}
