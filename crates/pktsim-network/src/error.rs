//! Simulation errors.

use thiserror::Error;

use pktsim_core::SchedulerError;

/// Errors reported by the network simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// The requested network or run configuration is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The event queue was popped while empty.
    #[error("event queue is empty")]
    EmptyQueue,
    /// The routing table names a next hop that has no link from the current node.
    #[error("routing inconsistency: no link from {node} to next hop {next_hop}")]
    RoutingInconsistency {
        /// Node holding the packet.
        node: String,
        /// Next hop named by the routing table.
        next_hop: String,
    },
    /// The operation is not allowed while a run is being processed.
    #[error("simulation is busy: a run is in progress")]
    Busy,
}

impl SimulationError {
    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        SimulationError::Configuration(msg.into())
    }
}

impl From<SchedulerError> for SimulationError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::EmptyQueue => SimulationError::EmptyQueue,
            // network events are always scheduled at or after the current time,
            // so this can only be caused by a non-finite link parameter or interval
            SchedulerError::EventInPast { time, clock } => {
                SimulationError::Configuration(format!("event scheduled at {} before current time {}", time, clock))
            }
        }
    }
}
