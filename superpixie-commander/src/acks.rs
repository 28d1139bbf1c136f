//! Outstanding acknowledgements

/// Slots in the ACK ring
pub const ACK_SLOTS: usize = 8;

/// Ring of the last few packets sent with an ACK request
///
/// Slots are reused oldest first, so an ACK for a packet older than the
/// last [`ACK_SLOTS`] tracked packets is ignored.
#[derive(Debug, Clone, Default)]
pub struct PendingAcks {
    slots: [Option<(u16, bool)>; ACK_SLOTS],
    next: usize,
}

impl PendingAcks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start waiting for `packet_id`
    pub fn track(&mut self, packet_id: u16) {
        self.slots[self.next] = Some((packet_id, false));
        self.next = (self.next + 1) % ACK_SLOTS;
    }

    /// Record an ACK; returns false if the id is not tracked
    pub fn resolve(&mut self, packet_id: u16) -> bool {
        for slot in self.slots.iter_mut().flatten() {
            if slot.0 == packet_id {
                slot.1 = true;
                return true;
            }
        }
        false
    }

    pub fn is_acked(&self, packet_id: u16) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|&(id, acked)| id == packet_id && acked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_and_resolve() {
        let mut acks = PendingAcks::new();
        acks.track(5);
        assert!(!acks.is_acked(5));
        assert!(acks.resolve(5));
        assert!(acks.is_acked(5));
        assert!(!acks.resolve(6));
    }

    #[test]
    fn test_oldest_slot_reused() {
        let mut acks = PendingAcks::new();
        for id in 0..ACK_SLOTS as u16 + 1 {
            acks.track(id);
        }
        // Slot of id 0 now holds id 8
        assert!(!acks.resolve(0));
        assert!(acks.resolve(8));
        assert!(acks.resolve(1));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_last_slots_resolvable(start in any::<u16>(), count in ACK_SLOTS..64usize) {
                let mut acks = PendingAcks::new();
                let ids: heapless::Vec<u16, 64> = (0..count as u16).map(|i| start.wrapping_add(i)).collect();
                for &id in &ids {
                    acks.track(id);
                }
                for &id in &ids[count - ACK_SLOTS..] {
                    prop_assert!(acks.resolve(id));
                    prop_assert!(acks.is_acked(id));
                }
                prop_assert!(!acks.is_acked(ids[0]) || count == ACK_SLOTS);
            }
        }
    }
}
