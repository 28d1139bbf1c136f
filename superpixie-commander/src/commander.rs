//! Blocking chain driver

use embedded_hal::delay::DelayNs;
use embedded_io::{Read, ReadReady, Write};
use heapless::Deque;
use smart_leds::RGB8;
use superpixie_core::chain::nibble::PROBE_FLAG_ASSIGNED;
use superpixie_core::easing::Interpolation;
use superpixie_core::state::{GlowPosition, GradientType, TransitionType};
use superpixie_protocol::address::MAX_NODE_ADDRESS;
use superpixie_protocol::payload::unit_to_byte;
use superpixie_protocol::{
    Command, Framer, Packet, PacketIds, PayloadReader, ProfileFramer, WireProfile, ADDRESS_BROADCAST,
    ADDRESS_CHAIN_HEAD, ADDRESS_COMMANDER, ADDRESS_NULL,
};

use crate::acks::PendingAcks;
use crate::clock::Clock;
use crate::error::CommanderError;

/// How long a packet sent with an ACK request waits for its ACK
pub const ACK_TIMEOUT_MS: u64 = 100;

/// Interval between ready queries while waiting
pub const READY_POLL_MS: u64 = 20;

/// Nibble discovery: how long to wait for the chain to form
pub const DISCOVERY_TIMEOUT_MS: u64 = 5_000;

/// Nibble discovery: retry interval of the length inquiry
pub const LENGTH_INQUIRY_MS: u64 = 100;

/// Pause between link polls while waiting for a reply
pub const POLL_INTERVAL_US: u32 = 500;

/// `PROBE_RESPONSE` flag: the responder is the commander
pub const PROBE_FLAG_COMMANDER: u8 = 1 << 1;

/// Touch events kept until the caller takes them
pub const TOUCH_QUEUE: usize = 16;

/// A node reported a touch edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchEvent {
    pub address: u8,
    pub active: bool,
}

type Result<T, E> = core::result::Result<T, CommanderError<E>>;

pub struct Commander<L, C> {
    link: L,
    clock: C,
    profile: WireProfile,
    ids: PacketIds,
    framer: ProfileFramer,
    acks: PendingAcks,
    chain_length: u8,
    /// Set by READY_STATUS (full-byte) or TRANSITION_COMPLETE (nibble)
    ready: bool,
    /// First hop of an ANNOUNCE waiting for recovery
    announce: Option<u8>,
    /// Discovery or recovery in progress; announcements are not acted on
    busy: bool,
    /// Nibble: the propagation wave from the last node arrived
    chain_formed: bool,
    length_response: Option<u8>,
    touch_value: Option<(u8, u16)>,
    touches: Deque<TouchEvent, TOUCH_QUEUE>,
}

impl<L, C> Commander<L, C>
where
    L: Read + Write + ReadReady,
    C: Clock + DelayNs,
{
    /// `seed` feeds the random packet ids of the nibble profile and is
    /// unused by the full-byte profile, which counts up
    pub fn new(link: L, clock: C, profile: WireProfile, seed: u64) -> Self {
        Self {
            link,
            clock,
            profile,
            ids: profile.packet_ids(seed),
            framer: profile.framer(),
            acks: PendingAcks::new(),
            chain_length: 0,
            ready: false,
            announce: None,
            busy: false,
            chain_formed: false,
            length_response: None,
            touch_value: None,
            touches: Deque::new(),
        }
    }

    pub fn profile(&self) -> WireProfile {
        self.profile
    }

    /// Number of nodes found by the last discovery
    pub fn chain_length(&self) -> u8 {
        self.chain_length
    }

    /// Give back the link and clock
    pub fn release(self) -> (L, C) {
        (self.link, self.clock)
    }

    // ------------------------------------------------------------------
    // Discovery
    // ------------------------------------------------------------------

    /// Discover the chain and return its length
    ///
    /// Full-byte: reset every node, then assign addresses one at a time
    /// until an assignment goes unacknowledged. Nibble: answer node 0's
    /// probes, wait for the propagation wave from the last node, then ask
    /// it for the length.
    pub fn begin(&mut self) -> Result<u8, L::Error> {
        self.busy = true;
        let result = match self.profile {
            WireProfile::FullByte => self.discover_full_byte(),
            WireProfile::NibblePadded => self.discover_nibble(),
        };
        self.busy = false;
        self.announce = None;
        result
    }

    fn discover_full_byte(&mut self) -> Result<u8, L::Error> {
        self.send(ADDRESS_BROADCAST, Command::ResetChain, &[], false)?;

        let mut address = ADDRESS_CHAIN_HEAD;
        loop {
            match self.assign(address) {
                Ok(()) => {}
                Err(CommanderError::AckTimeout { .. }) => break,
                Err(err) => return Err(err),
            }
            if address == MAX_NODE_ADDRESS {
                address += 1;
                break;
            }
            address += 1;
        }

        self.announce_chain_length(address)?;
        Ok(address)
    }

    /// Give the first unassigned node `address` and let traffic pass it
    ///
    /// Both steps are acknowledged.
    fn assign(&mut self, address: u8) -> Result<(), L::Error> {
        self.send_and_await_ack(ADDRESS_NULL, Command::AssignAddress, &[address])?;
        self.send_and_await_ack(address, Command::EnablePropagation, &[])
    }

    fn discover_nibble(&mut self) -> Result<u8, L::Error> {
        self.chain_formed = false;
        self.length_response = None;
        let deadline = self.clock.now_ms() + DISCOVERY_TIMEOUT_MS;

        while !self.chain_formed {
            let received = self.pump()?;
            if self.clock.now_ms() >= deadline {
                return Err(CommanderError::Timeout);
            }
            self.idle(received);
        }

        let mut next_inquiry = 0;
        let length = loop {
            let now = self.clock.now_ms();
            if let Some(length) = self.length_response.take() {
                break length;
            }
            if now >= deadline {
                return Err(CommanderError::Timeout);
            }
            if now >= next_inquiry {
                next_inquiry = now + LENGTH_INQUIRY_MS;
                self.send(ADDRESS_BROADCAST, Command::LengthInquiry, &[], false)?;
            }
            let received = self.pump()?;
            self.idle(received);
        };

        self.announce_chain_length(length)?;
        Ok(length)
    }

    fn announce_chain_length(&mut self, length: u8) -> Result<(), L::Error> {
        self.chain_length = length;
        self.send(ADDRESS_BROADCAST, Command::SetChainLength, &[length], false)?;
        Ok(())
    }

    /// Re-address a node that announced itself after discovery
    ///
    /// `first_hop` is the nearest healthy node upstream of it, or
    /// [`ADDRESS_NULL`] if it sits right after the commander. The chain is
    /// re-measured afterwards.
    fn recover(&mut self, first_hop: u8) -> Result<(), L::Error> {
        let address = if first_hop == ADDRESS_NULL {
            ADDRESS_CHAIN_HEAD
        } else {
            first_hop.saturating_add(1)
        };
        if address > MAX_NODE_ADDRESS {
            return Ok(());
        }

        self.busy = true;
        let result = match self.assign(address) {
            Ok(()) => self
                .measure_chain_length()
                .and_then(|length| self.announce_chain_length(length)),
            // Someone else answered first, or the node went away again
            Err(CommanderError::AckTimeout { .. }) => Ok(()),
            Err(err) => Err(err),
        };
        self.busy = false;
        result
    }

    /// Check that a node answers
    pub fn probe(&mut self, address: u8) -> Result<bool, L::Error> {
        match self.send_and_await_ack(address, Command::Probe, &[]) {
            Ok(()) => Ok(true),
            Err(CommanderError::AckTimeout { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Probe addresses from 0 upwards; the first silent one is the length
    pub fn measure_chain_length(&mut self) -> Result<u8, L::Error> {
        let mut address = ADDRESS_CHAIN_HEAD;
        while address <= MAX_NODE_ADDRESS && self.probe(address)? {
            address += 1;
        }
        Ok(address)
    }

    // ------------------------------------------------------------------
    // Receiving
    // ------------------------------------------------------------------

    /// Process everything the chain sent back
    ///
    /// Resolves ACKs, records touch events and ready status, and
    /// re-addresses nodes that announce themselves.
    pub fn poll(&mut self) -> Result<(), L::Error> {
        self.pump()?;
        if let Some(first_hop) = self.announce.take() {
            self.recover(first_hop)?;
        }
        Ok(())
    }

    /// Drain the link without acting on announcements
    ///
    /// Returns whether anything was read.
    fn pump(&mut self) -> Result<bool, L::Error> {
        let mut buf = [0u8; 64];
        let mut received = false;
        while self.link.read_ready().map_err(CommanderError::Link)? {
            let n = self.link.read(&mut buf).map_err(CommanderError::Link)?;
            if n == 0 {
                break;
            }
            received = true;
            for &byte in &buf[..n] {
                if let Some(frame) = self.framer.feed(byte) {
                    if let Ok(packet) = self.profile.decode(&frame) {
                        self.handle(&packet)?;
                    }
                }
            }
        }
        Ok(received)
    }

    /// Give the link time to deliver when the last poll came back empty
    fn idle(&mut self, received: bool) {
        if !received {
            self.clock.delay_us(POLL_INTERVAL_US);
        }
    }

    fn handle(&mut self, packet: &Packet) -> Result<(), L::Error> {
        let for_us = packet.destination == ADDRESS_COMMANDER
            || (self.profile == WireProfile::NibblePadded && packet.destination == ADDRESS_BROADCAST);
        if !for_us {
            return Ok(());
        }
        let Some(command) = Command::from_code(self.profile, packet.command) else {
            return Ok(());
        };

        let data = PayloadReader::new(&packet.payload);
        match command {
            Command::Ack => {
                self.acks.resolve(packet.packet_id);
            }
            Command::Announce => {
                if !self.busy {
                    self.announce = Some(packet.first_hop);
                }
            }
            Command::TouchEvent => {
                if self.touches.is_full() {
                    self.touches.pop_front();
                }
                let _ = self.touches.push_back(TouchEvent {
                    address: packet.origin,
                    active: data.flag(0),
                });
            }
            Command::ReadyStatus => self.ready = data.flag(0),
            Command::TransitionComplete => self.ready = true,
            Command::Probe => {
                let flags = PROBE_FLAG_COMMANDER | PROBE_FLAG_ASSIGNED;
                self.send(packet.origin, Command::ProbeResponse, &[flags], false)?;
            }
            Command::EnablePropagation | Command::StartBusMode => self.chain_formed = true,
            Command::LengthResponse => self.length_response = Some(data.u8(0)),
            Command::ReadTouchResponse => self.touch_value = Some((packet.origin, data.u16_be(0))),
            _ => {}
        }
        Ok(())
    }

    /// Oldest touch event not yet taken
    pub fn take_touch_event(&mut self) -> Option<TouchEvent> {
        self.touches.pop_front()
    }

    // ------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------

    /// Build, encode and write one packet; returns its id
    fn send(&mut self, destination: u8, command: Command, payload: &[u8], ack: bool) -> Result<u16, L::Error> {
        let code = command
            .code(self.profile)
            .ok_or(CommanderError::Unsupported(command))?;
        let packet_id = self.ids.next_id();
        let packet = Packet::new(packet_id, ADDRESS_COMMANDER, destination, code, payload)?.with_ack(ack);
        let bytes = self.profile.encode_to_vec(&packet)?;

        self.link.write_all(&bytes).map_err(CommanderError::Link)?;
        self.link.flush().map_err(CommanderError::Link)?;
        Ok(packet_id)
    }

    /// Send with an ACK request and block until the ACK or the timeout
    fn send_and_await_ack(&mut self, destination: u8, command: Command, payload: &[u8]) -> Result<(), L::Error> {
        if self.profile != WireProfile::FullByte {
            return Err(CommanderError::Unsupported(command));
        }
        let packet_id = self.send(destination, command, payload, true)?;
        self.acks.track(packet_id);

        let deadline = self.clock.now_ms() + ACK_TIMEOUT_MS;
        loop {
            let received = self.pump()?;
            if self.acks.is_acked(packet_id) {
                return Ok(());
            }
            if self.clock.now_ms() >= deadline {
                return Err(CommanderError::AckTimeout { packet_id });
            }
            self.idle(received);
        }
    }

    fn broadcast(&mut self, command: Command, payload: &[u8]) -> Result<(), L::Error> {
        self.send(ADDRESS_BROADCAST, command, payload, false).map(|_| ())
    }

    // ------------------------------------------------------------------
    // Render settings (broadcast)
    // ------------------------------------------------------------------

    pub fn set_brightness(&mut self, brightness: f32) -> Result<(), L::Error> {
        self.broadcast(Command::SetBrightness, &[unit_to_byte(brightness)])
    }

    /// One colour for the whole character
    pub fn set_color(&mut self, color: RGB8) -> Result<(), L::Error> {
        self.set_colors(color, color)
    }

    /// Colour pair spread by the gradient
    pub fn set_colors(&mut self, a: RGB8, b: RGB8) -> Result<(), L::Error> {
        self.broadcast(Command::SetDisplayColors, &[a.r, a.g, a.b, b.r, b.g, b.b])
    }

    pub fn set_gradient(&mut self, gradient: GradientType) -> Result<(), L::Error> {
        let code = self.gradient_code(gradient, Command::SetGradientType)?;
        self.broadcast(Command::SetGradientType, &[code])
    }

    pub fn set_background_colors(&mut self, a: RGB8, b: RGB8) -> Result<(), L::Error> {
        self.broadcast(Command::SetBackgroundColors, &[a.r, a.g, a.b, b.r, b.g, b.b])
    }

    pub fn set_background_gradient(&mut self, gradient: GradientType) -> Result<(), L::Error> {
        let code = self.gradient_code(gradient, Command::SetBackgroundGradientType)?;
        self.broadcast(Command::SetBackgroundGradientType, &[code])
    }

    fn gradient_code(&self, gradient: GradientType, command: Command) -> Result<u8, L::Error> {
        match self.profile {
            WireProfile::FullByte => gradient.to_full_byte().ok_or(CommanderError::Unsupported(command)),
            WireProfile::NibblePadded => Ok(gradient as u8),
        }
    }

    pub fn set_transition_type(&mut self, kind: TransitionType) -> Result<(), L::Error> {
        self.broadcast(Command::SetTransitionType, &[kind as u8])
    }

    pub fn set_transition_duration(&mut self, duration_ms: u16) -> Result<(), L::Error> {
        self.broadcast(Command::SetTransitionDurationMs, &duration_ms.to_be_bytes())
    }

    pub fn set_transition_interpolation(&mut self, curve: Interpolation) -> Result<(), L::Error> {
        self.broadcast(Command::SetTransitionInterpolation, &[curve as u8])
    }

    pub fn set_frame_blending(&mut self, amount: f32) -> Result<(), L::Error> {
        self.broadcast(Command::SetFrameBlending, &[unit_to_byte(amount)])
    }

    pub fn set_fx_color(&mut self, color: RGB8) -> Result<(), L::Error> {
        self.broadcast(Command::SetFxColor, &[color.r, color.g, color.b])
    }

    pub fn set_fx_opacity(&mut self, opacity: f32) -> Result<(), L::Error> {
        self.broadcast(Command::SetFxOpacity, &[unit_to_byte(opacity)])
    }

    /// Blur radius in pixels, 0.0..=10.0
    pub fn set_fx_blur(&mut self, radius: f32) -> Result<(), L::Error> {
        self.broadcast(Command::SetFxBlur, &[unit_to_byte(radius / 10.0)])
    }

    /// Push-left time and hold time of each marquee step
    pub fn set_scroll_speed(&mut self, scroll_ms: u16, hold_ms: u16) -> Result<(), L::Error> {
        let [s0, s1] = scroll_ms.to_be_bytes();
        let [h0, h1] = hold_ms.to_be_bytes();
        self.broadcast(Command::SetScrollSpeed, &[s0, s1, h0, h1])
    }

    /// Re-run transitions even when the character does not change
    pub fn set_force_transition(&mut self, force: bool) -> Result<(), L::Error> {
        self.broadcast(Command::ForceTransition, &[force as u8])
    }

    pub fn set_backlight_color(&mut self, color: RGB8) -> Result<(), L::Error> {
        self.broadcast(Command::SetBacklightColor, &[color.r, color.g, color.b])
    }

    pub fn set_backlight_brightness(&mut self, brightness: f32) -> Result<(), L::Error> {
        self.broadcast(Command::SetBacklightBrightness, &[unit_to_byte(brightness)])
    }

    pub fn set_debug_overlay(&mut self, opacity: f32) -> Result<(), L::Error> {
        self.broadcast(Command::SetDebugOverlayOpacity, &[unit_to_byte(opacity)])
    }

    pub fn set_touch_glow_position(&mut self, position: GlowPosition) -> Result<(), L::Error> {
        self.broadcast(Command::SetTouchGlowPosition, &[position as u8])
    }

    pub fn set_touch_glow_color(&mut self, color: RGB8) -> Result<(), L::Error> {
        self.broadcast(Command::SetTouchGlowColor, &[color.r, color.g, color.b])
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// One character per node, node `n` shows `text[n]`
    pub fn set_string(&mut self, text: &str) -> Result<(), L::Error> {
        self.broadcast(Command::SetString, text.as_bytes())
    }

    /// Marquee `text` across the whole chain
    pub fn scroll_string(&mut self, text: &str) -> Result<(), L::Error> {
        self.broadcast(Command::ScrollString, text.as_bytes())
    }

    pub fn set_character(&mut self, address: u8, character: u8) -> Result<(), L::Error> {
        self.send(address, Command::SetCharacter, &[character], false).map(|_| ())
    }

    pub fn blink(&mut self, address: u8) -> Result<(), L::Error> {
        self.send(address, Command::Blink, &[], false).map(|_| ())
    }

    /// Start the transition to everything set since the last show
    pub fn show(&mut self) -> Result<(), L::Error> {
        self.ready = false;
        self.broadcast(Command::Show, &[])
    }

    /// Block until the chain is idle or `timeout_ms` passes
    ///
    /// Full-byte asks node 0 for its ready status every
    /// [`READY_POLL_MS`]; node 0 scrolls longest, so it is the last to
    /// finish. Nibble waits for node 0's `TRANSITION_COMPLETE`.
    pub fn wait(&mut self, timeout_ms: u64) -> Result<(), L::Error> {
        if self.chain_length == 0 {
            return Ok(());
        }
        let start = self.clock.now_ms();
        let deadline = start + timeout_ms;
        let mut next_query = start;
        if self.profile == WireProfile::FullByte {
            self.ready = false;
        }

        loop {
            let received = self.pump()?;
            if let Some(first_hop) = self.announce.take() {
                self.recover(first_hop)?;
            }
            if self.ready {
                return Ok(());
            }
            let now = self.clock.now_ms();
            if now >= deadline {
                return Err(CommanderError::Timeout);
            }
            if self.profile == WireProfile::FullByte && now >= next_query {
                next_query = now + READY_POLL_MS;
                self.send(ADDRESS_CHAIN_HEAD, Command::GetReadyStatus, &[], false)?;
            }
            self.idle(received);
        }
    }

    /// Wait for the chain, then keep the result on screen for `hold_ms`
    pub fn hold(&mut self, hold_ms: u32, timeout_ms: u64) -> Result<(), L::Error> {
        self.wait(timeout_ms)?;
        self.clock.delay_ms(hold_ms);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bus mode and touch
    // ------------------------------------------------------------------

    pub fn start_bus_mode(&mut self) -> Result<(), L::Error> {
        self.broadcast(Command::StartBusMode, &[])
    }

    pub fn end_bus_mode(&mut self) -> Result<(), L::Error> {
        self.broadcast(Command::EndBusMode, &[])
    }

    /// Raw touch reading of one node
    pub fn read_touch(&mut self, address: u8, timeout_ms: u64) -> Result<u16, L::Error> {
        self.touch_value = None;
        self.send(address, Command::ReadTouch, &[], false)?;

        let deadline = self.clock.now_ms() + timeout_ms;
        loop {
            let received = self.pump()?;
            if let Some((origin, value)) = self.touch_value.take() {
                if origin == address {
                    return Ok(value);
                }
            }
            if self.clock.now_ms() >= deadline {
                return Err(CommanderError::Timeout);
            }
            self.idle(received);
        }
    }

    /// Store the current reading as the touched (`high`) or untouched level
    pub fn calibrate_touch(&mut self, address: u8, high: bool) -> Result<(), L::Error> {
        self.send(address, Command::CalibrateTouch, &[high as u8], false).map(|_| ())
    }

    pub fn set_touch_threshold(&mut self, threshold: f32) -> Result<(), L::Error> {
        self.broadcast(Command::SetTouchThreshold, &[unit_to_byte(threshold)])
    }

    /// Persist touch calibration on one node or, with the broadcast
    /// address, on every node
    pub fn save_storage(&mut self, address: u8) -> Result<(), L::Error> {
        self.send(address, Command::SaveStorage, &[], false).map(|_| ())
    }
}
