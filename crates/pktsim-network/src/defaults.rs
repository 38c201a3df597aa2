//! Default values of configuration parameters.

/// Queue capacity of nodes without explicit `queue_size`.
pub const DEFAULT_QUEUE_SIZE: usize = 50;

/// Link bandwidth, in size units per second.
pub const DEFAULT_BANDWIDTH: f64 = 100.0;

/// Link latency, in seconds.
pub const DEFAULT_LATENCY: f64 = 0.01;

/// Size of generated packets.
pub const DEFAULT_PACKET_SIZE: f64 = 100.0;

/// Packets generated per second by each node.
pub const DEFAULT_PACKET_RATE: f64 = 10.0;

/// Number of nodes in a generated topology.
pub const DEFAULT_NODE_COUNT: usize = 5;

/// Duration of a scenario run, in seconds of simulation time.
pub const DEFAULT_DURATION: f64 = 10.0;

/// Seed of the simulation random number generator.
pub const DEFAULT_SEED: u64 = 123;

pub(crate) fn queue_size() -> usize {
    DEFAULT_QUEUE_SIZE
}

pub(crate) fn bandwidth() -> f64 {
    DEFAULT_BANDWIDTH
}

pub(crate) fn latency() -> f64 {
    DEFAULT_LATENCY
}

pub(crate) fn packet_rate() -> f64 {
    DEFAULT_PACKET_RATE
}

pub(crate) fn node_count() -> usize {
    DEFAULT_NODE_COUNT
}

pub(crate) fn duration() -> f64 {
    DEFAULT_DURATION
}

pub(crate) fn seed() -> u64 {
    DEFAULT_SEED
}
