//! Link watchdog
//!
//! A node that boots and is never told to show anything has no other way
//! to report trouble. After a grace period without link activity it draws
//! a '?' whose color tells the two failure modes apart.

use crate::color::ColorF;

/// Grace period after boot before the alarm fires
pub const LINK_TIMEOUT_MS: u64 = 3000;

/// Fade used to bring up the alarm glyph
pub const ALARM_FADE_MS: u32 = 250;

/// Glyph shown on alarm
pub const ALARM_GLYPH: u8 = b'?';

/// Never reached by discovery
pub const UNASSIGNED_COLOR: ColorF = ColorF::new(1.0, 0.4, 0.0);

/// Addressed but never commanded
pub const SILENT_COLOR: ColorF = ColorF::new(1.0, 0.0, 0.5);

/// Why the alarm fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkFault {
    /// No address was ever assigned
    Unassigned,
    /// Assigned, but no update arrived
    Silent,
}

impl LinkFault {
    pub fn color(self) -> ColorF {
        match self {
            LinkFault::Unassigned => UNASSIGNED_COLOR,
            LinkFault::Silent => SILENT_COLOR,
        }
    }
}

/// One-shot boot watchdog
///
/// Fires at most once per boot; any activity before the deadline disarms
/// it for good.
#[derive(Debug, Clone, Default)]
pub struct LinkWatchdog {
    /// Activity seen or alarm already raised
    settled: bool,
}

impl LinkWatchdog {
    pub const fn new() -> Self {
        Self { settled: false }
    }

    /// Record that the commander is driving this node
    pub fn feed(&mut self) {
        self.settled = true;
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Check the deadline
    ///
    /// Returns the fault to display the first time the deadline passes
    /// without activity.
    pub fn check(&mut self, now_ms: u64, assigned: bool) -> Option<LinkFault> {
        if self.settled || now_ms < LINK_TIMEOUT_MS {
            return None;
        }
        self.settled = true;
        Some(if assigned {
            LinkFault::Silent
        } else {
            LinkFault::Unassigned
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_before_deadline() {
        let mut watchdog = LinkWatchdog::new();
        assert_eq!(watchdog.check(0, false), None);
        assert_eq!(watchdog.check(LINK_TIMEOUT_MS - 1, false), None);
    }

    #[test]
    fn test_fires_once() {
        let mut watchdog = LinkWatchdog::new();
        assert_eq!(watchdog.check(LINK_TIMEOUT_MS, false), Some(LinkFault::Unassigned));
        assert_eq!(watchdog.check(LINK_TIMEOUT_MS + 10, false), None);
    }

    #[test]
    fn test_assigned_node_reports_silence() {
        let mut watchdog = LinkWatchdog::new();
        let fault = watchdog.check(5000, true);
        assert_eq!(fault, Some(LinkFault::Silent));
        assert_eq!(fault.map(LinkFault::color), Some(SILENT_COLOR));
    }

    #[test]
    fn test_feed_disarms() {
        let mut watchdog = LinkWatchdog::new();
        watchdog.feed();
        assert_eq!(watchdog.check(10_000, true), None);
    }
}
