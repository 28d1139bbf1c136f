//! Nibble-padded chain engine
//!
//! Nodes find their own addresses. An unassigned node probes upstream every
//! [`PROBE_INTERVAL_MS`]; its upstream neighbour (or the commander) answers
//! with a `PROBE_RESPONSE` and the node takes the responder's address plus
//! one. A freshly assigned node then waits for a probe from downstream. If
//! none arrives within [`PROBE_TIMEOUT_MS`] it is the end of the chain: it
//! switches on propagation and bus mode, and tells every node upstream to
//! do the same.

use superpixie_protocol::address::is_node_address;
use superpixie_protocol::{
    Command, Framer, MarkerFramer, Packet, PacketIds, PayloadReader, WireProfile, ADDRESS_BROADCAST,
    ADDRESS_CHAIN_HEAD, ADDRESS_COMMANDER, ADDRESS_NULL,
};

use super::{send, ChainConfig, ChainIo, Direction};
use crate::display::{Display, ExecContext, NodeEvent, Reply};

/// Period of upstream probes while unassigned
pub const PROBE_INTERVAL_MS: u64 = 20;

/// Silence from downstream after which a node is the last one
pub const PROBE_TIMEOUT_MS: u64 = PROBE_INTERVAL_MS * 10;

/// `PROBE_RESPONSE` flag: the responder already has an address
pub const PROBE_FLAG_ASSIGNED: u8 = 1 << 0;

const PROFILE: WireProfile = WireProfile::NibblePadded;

/// Where a node is in self-discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Discovery {
    /// Nothing sent yet
    Unassigned,
    /// Probing upstream
    Discovering,
    /// Address known, listening for a downstream neighbour
    Assigned { deadline_ms: u64 },
    /// A downstream neighbour exists
    Relay,
    /// Last node of the chain
    Terminating,
}

impl Discovery {
    pub fn is_assigned(&self) -> bool {
        !matches!(self, Discovery::Unassigned | Discovery::Discovering)
    }
}

#[derive(Debug, Clone)]
pub struct NibbleEngine {
    chain: ChainConfig,
    discovery: Discovery,
    /// Frames arriving on the upstream port
    from_upstream: MarkerFramer,
    /// Frames arriving on the downstream port
    from_downstream: MarkerFramer,
    ids: PacketIds,
    next_probe_ms: u64,
}

impl NibbleEngine {
    /// `seed` drives the random packet ids; use something unique per node
    pub fn new(seed: u64) -> Self {
        Self {
            chain: ChainConfig::default(),
            discovery: Discovery::Unassigned,
            from_upstream: MarkerFramer::new(),
            from_downstream: MarkerFramer::new(),
            ids: PROFILE.packet_ids(seed),
            next_probe_ms: 0,
        }
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn discovery(&self) -> Discovery {
        self.discovery
    }

    pub fn is_terminating(&self) -> bool {
        self.discovery == Discovery::Terminating
    }

    pub fn dropped(&self) -> u32 {
        self.from_upstream.dropped() + self.from_downstream.dropped()
    }

    /// Drive discovery
    pub fn tick(&mut self, now_ms: u64, display: &mut Display, io: &mut impl ChainIo) {
        match self.discovery {
            Discovery::Unassigned | Discovery::Discovering => {
                if now_ms >= self.next_probe_ms {
                    self.next_probe_ms = now_ms + PROBE_INTERVAL_MS;
                    self.discovery = Discovery::Discovering;
                    self.send(io, Direction::Upstream, ADDRESS_BROADCAST, Command::Probe, &[]);
                }
            }
            Discovery::Assigned { deadline_ms } if now_ms >= deadline_ms => {
                self.discovery = Discovery::Terminating;
                self.chain.propagation = true;
                self.chain.bus_mode = true;
                self.send(io, Direction::Upstream, ADDRESS_BROADCAST, Command::EnablePropagation, &[]);
                self.send(io, Direction::Upstream, ADDRESS_BROADCAST, Command::StartBusMode, &[]);
                display.push_event(NodeEvent::Terminating);
                display.push_event(NodeEvent::Propagation(true));
                display.push_event(NodeEvent::BusMode(true));
            }
            _ => {}
        }
    }

    /// Handle one received byte travelling in `direction`
    pub fn on_byte(
        &mut self,
        direction: Direction,
        byte: u8,
        now_ms: u64,
        display: &mut Display,
        io: &mut impl ChainIo,
    ) {
        let relayed = self.chain.propagation || self.chain.bus_mode;
        if relayed {
            io.write(direction, &[byte]);
        }

        let framer = match direction {
            Direction::Downstream => &mut self.from_upstream,
            Direction::Upstream => &mut self.from_downstream,
        };
        if let Some(frame) = framer.feed(byte) {
            if let Ok(packet) = PROFILE.decode(&frame) {
                self.handle(direction, relayed, &packet, now_ms, display, io);
            }
        }
    }

    fn handle(
        &mut self,
        direction: Direction,
        relayed: bool,
        packet: &Packet,
        now_ms: u64,
        display: &mut Display,
        io: &mut impl ChainIo,
    ) {
        let Some(command) = Command::from_code(PROFILE, packet.command) else {
            return;
        };
        let addressed =
            packet.destination == ADDRESS_BROADCAST || packet.destination == self.chain.local_address;
        if !addressed && command != Command::Probe {
            return;
        }

        let data = PayloadReader::new(&packet.payload);
        match command {
            Command::Probe => {
                // Probes travel upstream; answer back down towards the prober
                if direction != Direction::Upstream {
                    return;
                }
                let flags = if self.discovery.is_assigned() { PROBE_FLAG_ASSIGNED } else { 0 };
                self.send(io, Direction::Downstream, packet.origin, Command::ProbeResponse, &[flags]);
                if let Discovery::Assigned { .. } = self.discovery {
                    self.discovery = Discovery::Relay;
                }
            }
            Command::ProbeResponse => {
                if self.discovery.is_assigned() {
                    return;
                }
                let address = match packet.origin {
                    ADDRESS_COMMANDER => Some(ADDRESS_CHAIN_HEAD),
                    ADDRESS_NULL => None,
                    origin => origin.checked_add(1).filter(|&a| is_node_address(a)),
                };
                if let Some(address) = address {
                    self.chain.local_address = address;
                    self.discovery = Discovery::Assigned {
                        deadline_ms: now_ms + PROBE_TIMEOUT_MS,
                    };
                    display.push_event(NodeEvent::Assigned(address));
                }
            }
            Command::EnablePropagation => {
                self.chain.propagation = true;
                if !relayed {
                    self.send(io, direction, ADDRESS_BROADCAST, Command::EnablePropagation, &[]);
                }
                display.push_event(NodeEvent::Propagation(true));
            }
            Command::StartBusMode => {
                if !self.chain.propagation {
                    return;
                }
                self.chain.bus_mode = true;
                if !relayed {
                    self.send(io, direction, ADDRESS_BROADCAST, Command::StartBusMode, &[]);
                }
                display.push_event(NodeEvent::BusMode(true));
            }
            Command::EndBusMode => {
                self.chain.bus_mode = false;
                display.push_event(NodeEvent::BusMode(false));
            }
            Command::LengthInquiry => {
                if self.is_terminating() {
                    let length = self.chain.local_address.saturating_add(1);
                    self.send(io, Direction::Upstream, ADDRESS_COMMANDER, Command::LengthResponse, &[length]);
                }
            }
            Command::SetChainLength => {
                self.chain.chain_length = data.u8(0);
                display.push_event(NodeEvent::ChainLength(self.chain.chain_length));
            }
            Command::ProbeResponse | Command::LengthResponse | Command::Ack => {}
            other => {
                let ctx = ExecContext {
                    local_address: self.chain.local_address,
                    chain_length: self.chain.chain_length,
                    now_ms,
                };
                if let Reply::TouchValue(value) = display.execute(other, &packet.payload, &ctx) {
                    let bytes = value.to_be_bytes();
                    self.send(io, Direction::Upstream, ADDRESS_COMMANDER, Command::ReadTouchResponse, &bytes);
                }
            }
        }
    }

    /// Tell the commander a transition finished; only the chain head speaks
    pub fn on_transition_complete(&mut self, io: &mut impl ChainIo) {
        if self.chain.local_address == ADDRESS_CHAIN_HEAD {
            self.send(io, Direction::Upstream, ADDRESS_COMMANDER, Command::TransitionComplete, &[]);
        }
    }

    pub fn send_touch_event(&mut self, active: bool, io: &mut impl ChainIo) {
        self.send(io, Direction::Upstream, ADDRESS_COMMANDER, Command::TouchEvent, &[active as u8]);
    }

    fn send(&mut self, io: &mut impl ChainIo, direction: Direction, destination: u8, command: Command, payload: &[u8]) {
        let Some(code) = command.code(PROFILE) else {
            return;
        };
        let id = self.ids.next_id();
        if let Ok(packet) = Packet::new(id, self.chain.local_address, destination, code, payload) {
            send(io, PROFILE, direction, &packet);
        }
    }
}
