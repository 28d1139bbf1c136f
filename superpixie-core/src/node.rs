//! A complete node: one chain engine plus its display
//!
//! The firmware owns a single [`Node`] and drives it from three places:
//! received bytes, a periodic tick and the frame timer. Output bytes go
//! through a [`ChainIo`], everything else the firmware must act on comes
//! out of [`Node::take_event`].

use superpixie_protocol::WireProfile;

use crate::chain::{ChainConfig, ChainIo, Direction, FullByteEngine, NibbleEngine};
use crate::compose::Frame;
use crate::config::StorageRecord;
use crate::display::{Display, NodeEvent};

#[derive(Debug, Clone)]
enum Engine {
    FullByte(FullByteEngine),
    Nibble(NibbleEngine),
}

pub struct Node {
    engine: Engine,
    display: Display,
}

impl Node {
    /// Boot a node speaking `profile`
    ///
    /// `seed` only matters for the nibble profile, where node packet ids
    /// are random.
    pub fn new(profile: WireProfile, record: &StorageRecord, seed: u64) -> Self {
        let engine = match profile {
            WireProfile::FullByte => Engine::FullByte(FullByteEngine::new()),
            WireProfile::NibblePadded => Engine::Nibble(NibbleEngine::new(seed)),
        };
        Self {
            engine,
            display: Display::new(profile, record),
        }
    }

    pub fn profile(&self) -> WireProfile {
        self.display.profile()
    }

    pub fn chain(&self) -> &ChainConfig {
        match &self.engine {
            Engine::FullByte(engine) => engine.chain(),
            Engine::Nibble(engine) => engine.chain(),
        }
    }

    /// Last node of the chain; the full-byte profile never knows
    pub fn is_terminating(&self) -> bool {
        match &self.engine {
            Engine::FullByte(_) => false,
            Engine::Nibble(engine) => engine.is_terminating(),
        }
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Frames lost to overrun on either port
    pub fn dropped_frames(&self) -> u32 {
        match &self.engine {
            Engine::FullByte(engine) => engine.dropped(),
            Engine::Nibble(engine) => engine.dropped(),
        }
    }

    /// Feed one received byte travelling in `direction`
    pub fn on_byte(&mut self, direction: Direction, byte: u8, now_ms: u64, io: &mut impl ChainIo) {
        match &mut self.engine {
            Engine::FullByte(engine) => engine.on_byte(direction, byte, now_ms, &mut self.display, io),
            Engine::Nibble(engine) => engine.on_byte(direction, byte, now_ms, &mut self.display, io),
        }
    }

    /// Periodic work: discovery, animation and the link watchdog
    pub fn tick(&mut self, now_ms: u64, io: &mut impl ChainIo) {
        match &mut self.engine {
            Engine::FullByte(engine) => engine.tick(now_ms, io),
            Engine::Nibble(engine) => engine.tick(now_ms, &mut self.display, io),
        }

        let assigned = self.chain().is_assigned();
        if self.display.tick(now_ms, assigned) {
            if let Engine::Nibble(engine) = &mut self.engine {
                engine.on_transition_complete(io);
            }
        }
    }

    pub fn render(&mut self, now_ms: u64, out: &mut Frame) {
        let chain = *self.chain();
        let terminating = self.is_terminating();
        self.display.render(now_ms, &chain, terminating, out);
    }

    /// Feed a touch reading; edges are reported to the commander
    pub fn set_touch_reading(&mut self, raw: u16, now_ms: u64, io: &mut impl ChainIo) {
        let Some(active) = self.display.set_touch_reading(raw, now_ms) else {
            return;
        };
        match &mut self.engine {
            Engine::FullByte(engine) => engine.send_touch_event(active, io),
            Engine::Nibble(engine) => engine.send_touch_event(active, io),
        }
    }

    pub fn take_event(&mut self) -> Option<NodeEvent> {
        self.display.take_event()
    }
}
