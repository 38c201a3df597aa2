//! Network link.

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::node::NodeId;

/// Link description used in network configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Name of the node where the link starts.
    pub source: String,
    /// Name of the node where the link ends.
    pub destination: String,
    /// Link bandwidth, in size units per second.
    #[serde(default = "defaults::bandwidth")]
    pub bandwidth: f64,
    /// Link latency, in seconds.
    #[serde(default = "defaults::latency")]
    pub latency: f64,
}

impl LinkConfig {
    /// Creates a link description.
    pub fn new<S: Into<String>, D: Into<String>>(source: S, destination: D, bandwidth: f64, latency: f64) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            bandwidth,
            latency,
        }
    }
}

/// A directed link between two nodes in the network.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Link {
    /// Node where the link starts.
    pub source: NodeId,
    /// Node where the link ends.
    pub destination: NodeId,
    /// Link bandwidth.
    pub bandwidth: f64,
    /// Link latency.
    pub latency: f64,
}

impl Link {
    /// Returns the cost of the link used by routing.
    ///
    /// Combines latency with the serialization delay of a unit of data, so that among links with equal
    /// latency the one with higher bandwidth is cheaper.
    pub fn routing_weight(&self) -> f64 {
        self.latency + 1. / self.bandwidth
    }

    /// Returns the time needed to deliver data of specified size over the link.
    pub fn travel_time(&self, size: f64) -> f64 {
        self.latency + size / self.bandwidth
    }
}
