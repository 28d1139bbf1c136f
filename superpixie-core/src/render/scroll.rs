//! Marquee scrolling across the chain
//!
//! Every node receives the same string. A node offsets it by its distance
//! from the end of the chain with leading blanks, so the text enters at
//! the far end and travels towards the chain head. Trailing blanks push
//! the last character off the head node before the queue drains.
//!
//! The queue only schedules; the owner turns each [`ScrollStep::Glyph`]
//! into a push-left transition.

use heapless::Deque;

/// Leading blanks, string and trailing blanks for the longest chain
pub const SCROLL_CAPACITY: usize = 768;

/// What the owner should do on this poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollStep {
    /// Nothing queued
    Idle,
    /// Current step still animating or holding
    Wait,
    /// Show this glyph now
    Glyph(u8),
    /// Last step finished; the queue is empty again
    Finished,
}

#[derive(Debug, Clone)]
pub struct ScrollQueue {
    glyphs: Deque<u8, SCROLL_CAPACITY>,
    /// Time the next step is due, `None` when idle
    next_step_ms: Option<u64>,
    step_ms: u32,
}

impl Default for ScrollQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollQueue {
    pub const fn new() -> Self {
        Self {
            glyphs: Deque::new(),
            next_step_ms: None,
            step_ms: 0,
        }
    }

    /// Queue `text` for a node at `address` in a chain of `chain_length`
    ///
    /// `step_ms` is the scroll time plus the hold time of one character.
    /// Replaces anything already queued. Characters that do not fit are
    /// dropped from the end; returns `false` in that case.
    pub fn load(&mut self, text: &[u8], address: u8, chain_length: u8, step_ms: u32, now_ms: u64) -> bool {
        self.glyphs.clear();
        let leading = (chain_length as i16 - 1 - address as i16).max(0) as usize;

        let blanks_before = core::iter::repeat(b' ').take(leading);
        let blanks_after = core::iter::repeat(b' ').take(chain_length as usize);
        let mut complete = true;
        for glyph in blanks_before.chain(text.iter().copied()).chain(blanks_after) {
            if self.glyphs.push_back(glyph).is_err() {
                complete = false;
                break;
            }
        }

        self.step_ms = step_ms;
        self.next_step_ms = if self.glyphs.is_empty() { None } else { Some(now_ms) };
        complete
    }

    pub fn is_active(&self) -> bool {
        self.next_step_ms.is_some()
    }

    /// Glyphs still waiting to be shown
    pub fn remaining(&self) -> usize {
        self.glyphs.len()
    }

    pub fn clear(&mut self) {
        self.glyphs.clear();
        self.next_step_ms = None;
    }

    pub fn poll(&mut self, now_ms: u64) -> ScrollStep {
        let Some(due) = self.next_step_ms else {
            return ScrollStep::Idle;
        };
        if now_ms < due {
            return ScrollStep::Wait;
        }

        match self.glyphs.pop_front() {
            Some(glyph) => {
                self.next_step_ms = Some(now_ms + self.step_ms as u64);
                ScrollStep::Glyph(glyph)
            }
            None => {
                self.next_step_ms = None;
                ScrollStep::Finished
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut ScrollQueue, step_ms: u64) -> heapless::Vec<u8, 64> {
        let mut shown = heapless::Vec::new();
        let mut now = 0;
        loop {
            match queue.poll(now) {
                ScrollStep::Glyph(g) => shown.push(g).unwrap(),
                ScrollStep::Finished => return shown,
                ScrollStep::Idle => return shown,
                ScrollStep::Wait => {}
            }
            now += step_ms;
        }
    }

    #[test]
    fn test_padding_depends_on_position() {
        // Head of a three-node chain waits for the two nodes behind it
        let mut queue = ScrollQueue::new();
        assert!(queue.load(b"HI", 0, 3, 400, 0));
        assert_eq!(drain(&mut queue, 400).as_slice(), b"  HI   ");

        // Last node starts right away
        let mut queue = ScrollQueue::new();
        queue.load(b"HI", 2, 3, 400, 0);
        assert_eq!(drain(&mut queue, 400).as_slice(), b"HI   ");
    }

    #[test]
    fn test_steps_are_spaced() {
        let mut queue = ScrollQueue::new();
        queue.load(b"A", 0, 1, 400, 100);
        assert_eq!(queue.poll(100), ScrollStep::Glyph(b'A'));
        assert_eq!(queue.poll(499), ScrollStep::Wait);
        assert_eq!(queue.poll(500), ScrollStep::Glyph(b' '));
        assert!(queue.is_active());
        assert_eq!(queue.poll(900), ScrollStep::Finished);
        assert!(!queue.is_active());
        assert_eq!(queue.poll(2000), ScrollStep::Idle);
    }

    #[test]
    fn test_empty_load_is_idle() {
        let mut queue = ScrollQueue::new();
        queue.load(b"", 0, 0, 400, 0);
        assert!(!queue.is_active());
    }

    #[test]
    fn test_longest_chain_fits() {
        let text = [b'X'; 255];
        let mut queue = ScrollQueue::new();
        assert!(queue.load(&text, 0, 255, 10, 0));
        assert_eq!(queue.remaining(), 254 + 255 + 255);
    }

    #[test]
    fn test_reload_replaces_queue() {
        let mut queue = ScrollQueue::new();
        queue.load(b"ABC", 0, 1, 10, 0);
        queue.load(b"Z", 0, 1, 10, 0);
        assert_eq!(queue.poll(0), ScrollStep::Glyph(b'Z'));
    }
}
