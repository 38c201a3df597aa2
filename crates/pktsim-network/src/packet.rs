//! Network packet.

use serde::Serialize;

use crate::node::NodeId;

/// A packet travelling from its source node to its destination node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Packet {
    /// Unique packet id, increasing in creation order.
    pub id: u64,
    /// Node where the packet was generated.
    pub source: NodeId,
    /// Node where the packet must be delivered.
    pub destination: NodeId,
    /// Simulation time of packet creation.
    pub timestamp: f64,
    /// Packet size.
    pub size: f64,
}
