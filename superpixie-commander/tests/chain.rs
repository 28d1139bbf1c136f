//! Commander against a simulated chain of nodes
//!
//! Every node is a real `superpixie_core::Node`. Bytes move between
//! neighbours instantly; time advances one millisecond each time the
//! commander reads the clock or sleeps. Everything the commander writes is
//! kept for inspection.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_io::{ErrorType, Read, ReadReady, Write};
use superpixie_commander::{Clock, Commander, CommanderError, TouchEvent};
use superpixie_core::chain::{ChainIo, Direction};
use superpixie_core::config::StorageRecord;
use superpixie_core::state::GradientType;
use superpixie_core::Node;
use superpixie_protocol::{Command, Framer, Packet, WireProfile, ADDRESS_NULL};

struct Outbox {
    bytes: Vec<(Direction, u8)>,
}

impl ChainIo for Outbox {
    fn write(&mut self, direction: Direction, bytes: &[u8]) {
        self.bytes.extend(bytes.iter().map(|&b| (direction, b)));
    }
}

struct Sim {
    profile: WireProfile,
    nodes: Vec<Node>,
    now: u64,
    /// (receiving node, travel direction, byte)
    wire: VecDeque<(usize, Direction, u8)>,
    to_commander: VecDeque<u8>,
    /// Every byte the commander wrote
    sent: Vec<u8>,
    /// Number of times the commander slept
    delays: usize,
}

impl Sim {
    fn new(profile: WireProfile, length: usize) -> Rc<RefCell<Self>> {
        let nodes = (0..length).map(|i| fresh_node(profile, i as u64)).collect();
        Rc::new(RefCell::new(Self {
            profile,
            nodes,
            now: 0,
            wire: VecDeque::new(),
            to_commander: VecDeque::new(),
            sent: Vec::new(),
            delays: 0,
        }))
    }

    fn route(&mut self, from: usize, out: Outbox) {
        for (direction, byte) in out.bytes {
            match direction {
                Direction::Downstream if from + 1 < self.nodes.len() => {
                    self.wire.push_back((from + 1, direction, byte))
                }
                Direction::Downstream => {}
                Direction::Upstream if from == 0 => self.to_commander.push_back(byte),
                Direction::Upstream => self.wire.push_back((from - 1, direction, byte)),
            }
        }
    }

    fn deliver(&mut self) {
        while let Some((index, direction, byte)) = self.wire.pop_front() {
            let mut out = Outbox { bytes: Vec::new() };
            let now = self.now;
            self.nodes[index].on_byte(direction, byte, now, &mut out);
            self.route(index, out);
        }
    }

    fn step(&mut self) {
        self.now += 1;
        for index in 0..self.nodes.len() {
            let mut out = Outbox { bytes: Vec::new() };
            let now = self.now;
            self.nodes[index].tick(now, &mut out);
            self.route(index, out);
        }
        self.deliver();
    }

    fn replace(&mut self, index: usize) {
        self.nodes[index] = fresh_node(self.profile, 100 + index as u64);
    }
}

fn fresh_node(profile: WireProfile, seed: u64) -> Node {
    Node::new(profile, &StorageRecord::new(), seed + 1)
}

struct SimLink(Rc<RefCell<Sim>>);

impl ErrorType for SimLink {
    type Error = Infallible;
}

impl Read for SimLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut sim = self.0.borrow_mut();
        let mut n = 0;
        while n < buf.len() {
            match sim.to_commander.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl ReadReady for SimLink {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.borrow().to_commander.is_empty())
    }
}

impl Write for SimLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut sim = self.0.borrow_mut();
        sim.sent.extend_from_slice(buf);
        if !sim.nodes.is_empty() {
            sim.wire.extend(buf.iter().map(|&b| (0, Direction::Downstream, b)));
            sim.deliver();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

struct SimClock(Rc<RefCell<Sim>>);

impl Clock for SimClock {
    fn now_ms(&mut self) -> u64 {
        let mut sim = self.0.borrow_mut();
        sim.step();
        sim.now
    }
}

impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().delays += 1;
        for _ in 0..ns.div_ceil(1_000_000) {
            self.0.borrow_mut().step();
        }
    }
}

fn commander(sim: &Rc<RefCell<Sim>>) -> Commander<SimLink, SimClock> {
    let profile = sim.borrow().profile;
    Commander::new(SimLink(sim.clone()), SimClock(sim.clone()), profile, 0x5EED)
}

/// Decode everything the commander has written so far
fn sent_packets(sim: &Rc<RefCell<Sim>>) -> Vec<Packet> {
    let sim = sim.borrow();
    let mut framer = sim.profile.framer();
    sim.sent
        .iter()
        .filter_map(|&byte| framer.feed(byte))
        .filter_map(|frame| sim.profile.decode(&frame).ok())
        .collect()
}

fn sent_commands(sim: &Rc<RefCell<Sim>>, command: Command) -> Vec<Packet> {
    let profile = sim.borrow().profile;
    let code = command.code(profile).unwrap();
    sent_packets(sim).into_iter().filter(|p| p.command == code).collect()
}

fn addresses(sim: &Rc<RefCell<Sim>>) -> Vec<u8> {
    sim.borrow().nodes.iter().map(|n| n.chain().local_address).collect()
}

#[test]
fn test_full_byte_discovery() {
    let sim = Sim::new(WireProfile::FullByte, 3);
    let mut commander = commander(&sim);

    assert_eq!(commander.begin().unwrap(), 3);
    assert_eq!(commander.chain_length(), 3);
    assert_eq!(addresses(&sim), vec![0, 1, 2]);
    assert!(sim.borrow().nodes.iter().all(|n| n.chain().chain_length == 3));
    assert!(sim.borrow().nodes.iter().all(|n| n.chain().propagation));

    // Every propagation enable asks for an ACK
    let enables: Vec<(u8, bool)> = sent_commands(&sim, Command::EnablePropagation)
        .iter()
        .map(|p| (p.destination, p.ack_requested))
        .collect();
    assert_eq!(enables, vec![(0, true), (1, true), (2, true)]);

    // The fourth assignment went unanswered
    let assigned: Vec<u8> = sent_commands(&sim, Command::AssignAddress)
        .iter()
        .map(|p| {
            assert_eq!(p.destination, ADDRESS_NULL);
            p.payload[0]
        })
        .collect();
    assert_eq!(assigned, vec![0, 1, 2, 3]);

    let lengths = sent_commands(&sim, Command::SetChainLength);
    assert_eq!(lengths.last().map(|p| p.payload[0]), Some(3));
}

#[test]
fn test_full_byte_ids_count_up() {
    let sim = Sim::new(WireProfile::FullByte, 1);
    let mut commander = commander(&sim);
    for _ in 0..4 {
        commander.set_character(0, b'A').unwrap();
    }
    let ids: Vec<u16> = sent_packets(&sim).iter().map(|p| p.packet_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_nibble_ids_are_random() {
    let sim = Sim::new(WireProfile::NibblePadded, 1);
    let mut commander = commander(&sim);
    for _ in 0..4 {
        commander.set_character(0, b'A').unwrap();
    }
    let ids: Vec<u16> = sent_packets(&sim).iter().map(|p| p.packet_id).collect();
    assert_eq!(ids.len(), 4);
    assert!(ids.windows(2).any(|w| w[1] != w[0].wrapping_add(1)));
}

#[test]
fn test_ack_wait_sleeps_between_polls() {
    let sim = Sim::new(WireProfile::FullByte, 2);
    let mut commander = commander(&sim);
    commander.begin().unwrap();

    sim.borrow_mut().delays = 0;
    assert!(!commander.probe(2).unwrap());
    assert!(sim.borrow().delays > 0);

    // An answered probe returns without sleeping
    sim.borrow_mut().delays = 0;
    assert!(commander.probe(1).unwrap());
    assert_eq!(sim.borrow().delays, 0);
}

#[test]
fn test_full_byte_empty_chain() {
    let sim = Sim::new(WireProfile::FullByte, 0);
    let mut commander = commander(&sim);

    assert_eq!(commander.begin().unwrap(), 0);
    assert!(!commander.probe(0).unwrap());
    // Nothing to wait for
    commander.wait(10).unwrap();
}

/// Swap in a factory-fresh node at `index` and let `poll` heal the chain
fn recover_after_replacing(index: usize) {
    let sim = Sim::new(WireProfile::FullByte, 3);
    let mut commander = commander(&sim);
    commander.begin().unwrap();

    sim.borrow_mut().replace(index);
    assert_eq!(sim.borrow().nodes[index].chain().local_address, 254);

    for _ in 0..2_000 {
        commander.poll().unwrap();
        if sim.borrow().nodes[index].chain().is_assigned() {
            break;
        }
        let mut clock = SimClock(sim.clone());
        clock.now_ms();
    }
    commander.poll().unwrap();

    assert_eq!(addresses(&sim), vec![0, 1, 2]);
    assert_eq!(commander.chain_length(), 3);
    assert_eq!(sim.borrow().nodes[index].chain().chain_length, 3);
    assert!(sim.borrow().nodes[index].chain().propagation);
}

#[test]
fn test_full_byte_recovers_middle_node() {
    recover_after_replacing(1);
}

#[test]
fn test_full_byte_recovers_last_node() {
    recover_after_replacing(2);
}

#[test]
fn test_full_byte_probe() {
    let sim = Sim::new(WireProfile::FullByte, 2);
    let mut commander = commander(&sim);
    commander.begin().unwrap();

    assert!(commander.probe(1).unwrap());
    assert!(!commander.probe(2).unwrap());
    assert_eq!(commander.measure_chain_length().unwrap(), 2);
}

#[test]
fn test_full_byte_scroll_and_wait() {
    let sim = Sim::new(WireProfile::FullByte, 3);
    let mut commander = commander(&sim);
    commander.begin().unwrap();

    commander.set_scroll_speed(10, 10).unwrap();
    commander.scroll_string("HI").unwrap();
    assert!(!sim.borrow().nodes[0].display().is_ready());

    commander.wait(5_000).unwrap();
    assert!(sim.borrow().nodes.iter().all(|n| n.display().is_ready()));
}

#[test]
fn test_full_byte_refuses_nibble_only_commands() {
    let sim = Sim::new(WireProfile::FullByte, 1);
    let mut commander = commander(&sim);
    commander.begin().unwrap();

    assert_eq!(
        commander.start_bus_mode(),
        Err(CommanderError::Unsupported(Command::StartBusMode))
    );
    assert_eq!(
        commander.set_gradient(GradientType::HorizontalMirrored),
        Err(CommanderError::Unsupported(Command::SetGradientType))
    );
    commander.set_gradient(GradientType::Vertical).unwrap();
}

#[test]
fn test_nibble_discovery() {
    let sim = Sim::new(WireProfile::NibblePadded, 3);
    let mut commander = commander(&sim);

    assert_eq!(commander.begin().unwrap(), 3);
    assert_eq!(addresses(&sim), vec![0, 1, 2]);
    let sim = sim.borrow();
    assert!(sim.nodes[2].is_terminating());
    assert!(sim.nodes.iter().all(|n| n.chain().bus_mode));
    assert!(sim.nodes.iter().all(|n| n.chain().chain_length == 3));
}

#[test]
fn test_nibble_discovery_times_out_without_nodes() {
    let sim = Sim::new(WireProfile::NibblePadded, 0);
    let mut commander = commander(&sim);
    assert_eq!(commander.begin(), Err(CommanderError::Timeout));
}

#[test]
fn test_nibble_show_and_wait() {
    let sim = Sim::new(WireProfile::NibblePadded, 3);
    let mut commander = commander(&sim);
    commander.begin().unwrap();

    commander.set_transition_duration(50).unwrap();
    commander.set_string("ABC").unwrap();
    commander.show().unwrap();
    commander.wait(2_000).unwrap();

    let sim = sim.borrow();
    let glyphs: Vec<u8> = sim
        .nodes
        .iter()
        .map(|n| n.display().machine().current_character().glyph)
        .collect();
    assert_eq!(glyphs, b"ABC".to_vec());
}

#[test]
fn test_nibble_read_touch() {
    let sim = Sim::new(WireProfile::NibblePadded, 2);
    let mut commander = commander(&sim);
    commander.begin().unwrap();

    assert_eq!(commander.read_touch(1, 200).unwrap(), 0);
    assert_eq!(commander.read_touch(5, 50), Err(CommanderError::Timeout));
    assert_eq!(commander.take_touch_event(), None::<TouchEvent>);
}
