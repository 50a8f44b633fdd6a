//! Positional slot allocation for open pull requests

use notifier_domain::{Event, Pull, Slot};
use tracing::warn;

/// Result of one allocation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// `PullUpdate` events in slot order, then `PullCleared` for stale slots.
    pub events: Vec<Event>,
    /// Slots in use after this cycle.
    pub used: Slot,
    /// Open pulls that did not fit.
    pub dropped: usize,
}

/// Assigns open pulls to the lowest free slots every poll cycle.
///
/// Slots are positional: a pull keeps its slot only while the upstream
/// ordering is stable. The only state carried between cycles is the number
/// of slots the previous cycle used, so stale slots can be cleared.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    capacity: Slot,
    previous_used: Slot,
}

impl SlotAllocator {
    pub fn new(capacity: Slot) -> Self {
        Self { capacity, previous_used: 0 }
    }

    /// Slots used by the last committed cycle.
    pub fn previous_used(&self) -> Slot {
        self.previous_used
    }

    /// Allocates slots for a fresh pull snapshot and commits the new usage.
    ///
    /// Call only with a successfully fetched snapshot; a failed fetch must
    /// leave the allocator untouched.
    pub fn allocate(&mut self, pulls: &[Pull]) -> Allocation {
        let open: Vec<&Pull> = pulls.iter().filter(|pull| !pull.is_done()).collect();
        let fitting = open.len().min(usize::from(self.capacity));
        let dropped = open.len() - fitting;
        if dropped > 0 {
            warn!(dropped, capacity = self.capacity, "More open pulls than slots, dropping the rest");
        }

        let mut events: Vec<Event> = Vec::with_capacity(fitting + usize::from(self.previous_used));
        let mut used: Slot = 0;
        for pull in open.into_iter().take(fitting) {
            events.push(Event::PullUpdate(pull.clone(), used));
            used += 1;
        }
        events.extend((used..self.previous_used).map(Event::PullCleared));

        self.previous_used = used;
        Allocation { events, used, dropped }
    }
}

#[cfg(test)]
mod tests {
    use notifier_domain::PullState;

    use super::*;

    fn pull(n: u32, state: PullState) -> Pull {
        Pull::new(format!("https://github.com/acme/widgets/pull/{n}"), state)
    }

    fn cleared(events: &[Event]) -> Vec<Slot> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::PullCleared(slot) => Some(*slot),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn assigns_lowest_slots_in_order_skipping_done() {
        let mut allocator = SlotAllocator::new(8);
        let pulls = [pull(1, PullState::Pending), pull(2, PullState::Done), pull(3, PullState::Merge)];

        let allocation = allocator.allocate(&pulls);

        assert_eq!(
            allocation.events,
            vec![
                Event::PullUpdate(pulls[0].clone(), 0),
                Event::PullUpdate(pulls[2].clone(), 1),
            ]
        );
        assert_eq!(allocation.used, 2);
        assert_eq!(allocator.previous_used(), 2);
    }

    #[test]
    fn shrinking_usage_clears_stale_slots() {
        let mut allocator = SlotAllocator::new(8);
        let four: Vec<_> = (1..=4).map(|n| pull(n, PullState::Pending)).collect();
        allocator.allocate(&four);

        let allocation = allocator.allocate(&four[..1]);
        assert_eq!(cleared(&allocation.events), vec![1, 2, 3]);

        // Only one cycle back is remembered.
        let allocation = allocator.allocate(&four[..1]);
        assert!(cleared(&allocation.events).is_empty());
    }

    #[test]
    fn cleared_count_is_previous_minus_current() {
        let mut allocator = SlotAllocator::new(8);
        let pulls: Vec<_> = (1..=8).map(|n| pull(n, PullState::Failed)).collect();
        let mut previous = 0usize;
        for len in [3usize, 7, 2, 2, 0, 5, 8, 1] {
            let allocation = allocator.allocate(&pulls[..len]);
            assert_eq!(cleared(&allocation.events).len(), previous.saturating_sub(len));
            previous = len;
        }
    }

    #[test]
    fn overflow_is_dropped() {
        let mut allocator = SlotAllocator::new(2);
        let pulls: Vec<_> = (1..=5).map(|n| pull(n, PullState::Pending)).collect();

        let allocation = allocator.allocate(&pulls);

        assert_eq!(allocation.used, 2);
        assert_eq!(allocation.dropped, 3);
        assert_eq!(allocation.events.len(), 2);
    }
}
