//! Full-byte chain engine
//!
//! Discovery is driven by the commander: it resets the chain, then assigns
//! addresses one node at a time. A node only forwards commander traffic
//! once it has been told to propagate, so an `ASSIGN_ADDRESS` sent to
//! [`ADDRESS_NULL`] stops at the first unassigned node.
//!
//! Return traffic (towards the commander) is always forwarded. While
//! forwarding it, a node writes its own address into a `first_hop` field
//! that is still [`ADDRESS_NULL`]; that is how the commander locates a
//! node that lost its address and is announcing again.

use superpixie_protocol::full_byte::FIRST_HOP_INDEX;
use superpixie_protocol::{
    Command, Framer, LengthFramer, Packet, PayloadReader, WireProfile, ADDRESS_BROADCAST, ADDRESS_COMMANDER,
    ADDRESS_NULL,
};

use super::{send, ChainConfig, ChainIo, Direction};
use crate::display::{Display, ExecContext, NodeEvent, Reply};

/// Period of `ANNOUNCE` while unassigned
pub const ANNOUNCE_INTERVAL_MS: u64 = 500;

/// Packet id carried by announcements
pub const ANNOUNCE_PACKET_ID: u16 = 0xFFFF;

/// Packet id carried by touch events
pub const TOUCH_EVENT_PACKET_ID: u16 = 0;

const PROFILE: WireProfile = WireProfile::FullByte;

#[derive(Debug, Clone)]
pub struct FullByteEngine {
    chain: ChainConfig,
    /// Commander traffic arriving on the upstream port
    inbound: LengthFramer,
    /// Return traffic arriving on the downstream port
    returning: LengthFramer,
    next_announce_ms: u64,
}

impl Default for FullByteEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FullByteEngine {
    pub fn new() -> Self {
        Self {
            chain: ChainConfig::default(),
            inbound: LengthFramer::new(),
            returning: LengthFramer::new(),
            next_announce_ms: 0,
        }
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Frames dropped by either framer
    pub fn dropped(&self) -> u32 {
        self.inbound.dropped() + self.returning.dropped()
    }

    /// Periodic work: announce while unassigned
    pub fn tick(&mut self, now_ms: u64, io: &mut impl ChainIo) {
        if self.chain.is_assigned() || now_ms < self.next_announce_ms {
            return;
        }
        self.next_announce_ms = now_ms + ANNOUNCE_INTERVAL_MS;
        self.send(io, ANNOUNCE_PACKET_ID, Command::Announce, &[]);
    }

    /// Handle one received byte
    ///
    /// `direction` is the way the byte travels: [`Direction::Downstream`]
    /// for bytes arriving on the upstream port.
    pub fn on_byte(
        &mut self,
        direction: Direction,
        byte: u8,
        now_ms: u64,
        display: &mut Display,
        io: &mut impl ChainIo,
    ) {
        match direction {
            Direction::Downstream => {
                if self.chain.propagation || self.chain.bus_mode {
                    io.write(Direction::Downstream, &[byte]);
                }
                if let Some(frame) = self.inbound.feed(byte) {
                    if let Ok(packet) = PROFILE.decode(&frame) {
                        self.handle(&packet, now_ms, display, io);
                    }
                }
            }
            Direction::Upstream => {
                let stamped = if self.returning.next_index() == Some(FIRST_HOP_INDEX) && byte == ADDRESS_NULL {
                    self.chain.local_address
                } else {
                    byte
                };
                io.write(Direction::Upstream, &[stamped]);
                // Only tracked for the first-hop position
                let _ = self.returning.feed(stamped);
            }
        }
    }

    fn handle(&mut self, packet: &Packet, now_ms: u64, display: &mut Display, io: &mut impl ChainIo) {
        if packet.destination != ADDRESS_BROADCAST && packet.destination != self.chain.local_address {
            return;
        }
        let Some(command) = Command::from_code(PROFILE, packet.command) else {
            return;
        };

        display.feed_watchdog();

        // Sent before executing so an ASSIGN_ADDRESS ack still carries the old origin
        let always_ack = matches!(command, Command::Probe | Command::AssignAddress);
        if always_ack || packet.ack_requested {
            self.send(io, packet.packet_id, Command::Ack, &[]);
        }

        let data = PayloadReader::new(&packet.payload);
        match command {
            Command::Probe | Command::Ack | Command::Announce => {}
            Command::AssignAddress => {
                self.chain.local_address = data.u8(0);
                display.push_event(NodeEvent::Assigned(self.chain.local_address));
            }
            Command::ResetChain => {
                self.chain = ChainConfig::default();
                self.next_announce_ms = now_ms;
                display.reset();
                display.push_event(NodeEvent::Reset);
            }
            Command::EnablePropagation => {
                self.chain.propagation = true;
                display.push_event(NodeEvent::Propagation(true));
            }
            Command::SetChainLength => {
                self.chain.chain_length = data.u8(0);
                display.push_event(NodeEvent::ChainLength(self.chain.chain_length));
            }
            other => {
                let ctx = ExecContext {
                    local_address: self.chain.local_address,
                    chain_length: self.chain.chain_length,
                    now_ms,
                };
                if let Reply::ReadyStatus(ready) = display.execute(other, &packet.payload, &ctx) {
                    self.send(io, packet.packet_id, Command::ReadyStatus, &[ready as u8]);
                }
            }
        }
    }

    /// Report a touch edge to the commander
    pub fn send_touch_event(&mut self, active: bool, io: &mut impl ChainIo) {
        self.send(io, TOUCH_EVENT_PACKET_ID, Command::TouchEvent, &[active as u8]);
    }

    /// Everything a node originates goes to the commander
    fn send(&mut self, io: &mut impl ChainIo, packet_id: u16, command: Command, payload: &[u8]) {
        let Some(code) = command.code(PROFILE) else {
            return;
        };
        if let Ok(packet) = Packet::new(packet_id, self.chain.local_address, ADDRESS_COMMANDER, code, payload) {
            send(io, PROFILE, Direction::Upstream, &packet);
        }
    }
}
