//! Scheduler errors.

use thiserror::Error;

/// Errors reported by [`EventQueue`](crate::EventQueue).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    /// `pop` was called on a queue without pending events.
    #[error("event queue is empty")]
    EmptyQueue,
    /// An event was scheduled before the current simulation time.
    #[error("event time {time} is before the current simulation time {clock}")]
    EventInPast {
        /// Requested event time.
        time: f64,
        /// Simulation time at the moment of scheduling.
        clock: f64,
    },
}
