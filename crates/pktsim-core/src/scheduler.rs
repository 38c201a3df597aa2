//! Time-ordered event queue.

use std::collections::BinaryHeap;

use crate::error::SchedulerError;
use crate::event::{Event, EventId};
use crate::log::log_incorrect_event;
use crate::EPSILON;

/// Priority queue of pending events together with the simulation clock.
///
/// Events are popped in order of increasing time, events with equal time are popped in the order they were
/// pushed. Popping an event advances the clock to the event time, so the clock never goes backwards.
///
/// # Examples
///
/// ```rust
/// use pktsim_core::EventQueue;
///
/// let mut queue = EventQueue::new();
/// queue.push(2.0, "second").unwrap();
/// queue.push(1.0, "first").unwrap();
/// queue.push(2.0, "third").unwrap();
///
/// assert_eq!(queue.pop().unwrap().data, "first");
/// assert_eq!(queue.time(), 1.0);
/// assert_eq!(queue.pop().unwrap().data, "second");
/// assert_eq!(queue.pop().unwrap().data, "third");
/// assert!(queue.pop().is_err());
/// ```
#[derive(Clone)]
pub struct EventQueue<T> {
    clock: f64,
    events: BinaryHeap<Event<T>>,
    event_count: u64,
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventQueue<T> {
    /// Creates an empty queue with the clock set to zero.
    pub fn new() -> Self {
        Self {
            clock: 0.0,
            events: BinaryHeap::new(),
            event_count: 0,
        }
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.clock
    }

    /// Schedules an event at the specified absolute time and returns its id.
    ///
    /// Fails if the time is before the current simulation time. Times that are behind the clock by less than
    /// [`EPSILON`] are clamped to the clock value.
    ///
    /// ```rust
    /// use pktsim_core::{EventQueue, SchedulerError};
    ///
    /// let mut queue = EventQueue::new();
    /// queue.push(1.0, ()).unwrap();
    /// queue.pop().unwrap();
    /// assert!(matches!(queue.push(0.5, ()), Err(SchedulerError::EventInPast { .. })));
    /// ```
    pub fn push(&mut self, time: f64, data: T) -> Result<EventId, SchedulerError> {
        let event_id = self.event_count;
        if time.is_nan() || time < self.clock - EPSILON {
            log_incorrect_event(event_id, time, self.clock, "event from the past");
            return Err(SchedulerError::EventInPast {
                time,
                clock: self.clock,
            });
        }
        self.events.push(Event {
            id: event_id,
            time: time.max(self.clock),
            data,
        });
        self.event_count += 1;
        Ok(event_id)
    }

    /// Schedules an event after the specified delay relative to the current simulation time.
    pub fn push_after(&mut self, delay: f64, data: T) -> Result<EventId, SchedulerError> {
        self.push(self.clock + delay, data)
    }

    /// Removes the next event from the queue and advances the clock to its time.
    pub fn pop(&mut self) -> Result<Event<T>, SchedulerError> {
        let event = self.events.pop().ok_or(SchedulerError::EmptyQueue)?;
        self.clock = event.time;
        Ok(event)
    }

    /// Returns the next event without removing it.
    pub fn peek(&self) -> Option<&Event<T>> {
        self.events.peek()
    }

    /// Returns the number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if there are no pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the total number of pushed events.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Returns pending events in the order they will be popped.
    pub fn dump_events(&self) -> Vec<&Event<T>> {
        let mut output: Vec<&Event<T>> = self.events.iter().collect();
        output.sort();
        // Because the sorting order of events is inverted to be used with BinaryHeap
        output.reverse();
        output
    }

    /// Drops all pending events, resets the clock and the sequence counter.
    pub fn clear(&mut self) {
        self.events.clear();
        self.clock = 0.0;
        self.event_count = 0;
    }
}
