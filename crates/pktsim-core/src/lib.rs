#![warn(missing_docs)]
//! Building blocks of a discrete-event packet simulation.
//!
//! The crate provides a time-ordered [`EventQueue`] with deterministic tie-breaking, a seeded random source
//! and logging macros that prefix every record with the simulation time and the emitting component.
//! It does not know anything about networks: event payloads are supplied by the user of the queue.

pub mod error;
pub mod event;
pub mod log;
pub mod random;
pub mod scheduler;

pub use colored;
pub use error::SchedulerError;
pub use event::{Event, EventId};
pub use random::SimRng;
pub use scheduler::EventQueue;

/// Epsilon to compare floating point values for equality.
pub const EPSILON: f64 = 1e-12;
