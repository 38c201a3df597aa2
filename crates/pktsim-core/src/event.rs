//! Simulation events.

use std::cmp::Ordering;

/// Sequence number assigned to an event when it is pushed into the queue.
pub type EventId = u64;

/// An event scheduled for some moment of simulation time.
///
/// Events are ordered by time and then by id, so that events scheduled for the same time are processed
/// in the order they were created. The ordering is inverted to be used with
/// [`BinaryHeap`](std::collections::BinaryHeap).
#[derive(Clone, Debug)]
pub struct Event<T> {
    /// Insertion sequence number.
    pub id: EventId,
    /// Scheduled simulation time.
    pub time: f64,
    /// Event payload.
    pub data: T,
}

impl<T> Eq for Event<T> {}

impl<T> PartialEq for Event<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Ord for Event<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.total_cmp(&self.time).then_with(|| other.id.cmp(&self.id))
    }
}

impl<T> PartialOrd for Event<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_event_is_greater() {
        let early = Event { id: 5, time: 1.0, data: () };
        let late = Event { id: 1, time: 2.0, data: () };
        assert!(early > late);
    }

    #[test]
    fn same_time_is_ordered_by_id() {
        let first = Event { id: 1, time: 1.0, data: () };
        let second = Event { id: 2, time: 1.0, data: () };
        assert!(first > second);
    }
}
