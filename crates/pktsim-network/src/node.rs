//! Network node.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::packet::Packet;

/// Node id, equal to the position of the node in the network configuration.
pub type NodeId = usize;

/// Node description used in network configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Unique node name.
    pub name: String,
    /// Queue capacity, the network default is used if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_size: Option<usize>,
}

impl NodeConfig {
    /// Creates a node description using the default queue capacity.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            queue_size: None,
        }
    }

    /// Sets the queue capacity of the node.
    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = Some(queue_size);
        self
    }
}

/// Node as reported in the network topology.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeInfo {
    /// Node name.
    pub name: String,
    /// Queue capacity.
    pub queue_size: usize,
}

/// Current state of a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeStatus {
    /// Node name.
    pub name: String,
    /// Number of packets waiting in the queue.
    pub queue_length: usize,
    /// Number of packets forwarded or delivered by the node.
    pub packets_processed: u64,
    /// Number of packets dropped by the node.
    pub packets_dropped: u64,
}

/// A node with a bounded FIFO queue of packets awaiting forwarding.
#[derive(Clone, Debug)]
pub struct Node {
    name: String,
    queue: VecDeque<Packet>,
    queue_size: usize,
    packets_processed: u64,
    packets_dropped: u64,
}

impl Node {
    /// Creates a node with an empty queue of specified capacity.
    pub fn new<S: Into<String>>(name: S, queue_size: usize) -> Self {
        Self {
            name: name.into(),
            queue: VecDeque::with_capacity(queue_size.min(1024)),
            queue_size,
            packets_processed: 0,
            packets_dropped: 0,
        }
    }

    /// Returns the node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the queue capacity.
    pub fn queue_size(&self) -> usize {
        self.queue_size
    }

    /// Returns the number of queued packets.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if the queue has no spare capacity.
    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.queue_size
    }

    /// Appends the packet to the queue.
    ///
    /// If the queue is full, the packet is returned back.
    pub fn enqueue(&mut self, packet: Packet) -> Result<(), Packet> {
        if self.is_full() {
            return Err(packet);
        }
        self.queue.push_back(packet);
        Ok(())
    }

    /// Returns the packet at the head of the queue.
    pub fn head(&self) -> Option<&Packet> {
        self.queue.front()
    }

    /// Removes the packet at the head of the queue.
    pub fn dequeue(&mut self) -> Option<Packet> {
        self.queue.pop_front()
    }

    /// Returns the number of packets forwarded or delivered by the node.
    pub fn packets_processed(&self) -> u64 {
        self.packets_processed
    }

    /// Returns the number of packets dropped by the node.
    pub fn packets_dropped(&self) -> u64 {
        self.packets_dropped
    }

    pub(crate) fn record_processed(&mut self) {
        self.packets_processed += 1;
    }

    pub(crate) fn record_dropped(&mut self) {
        self.packets_dropped += 1;
    }

    /// Empties the queue and resets the counters.
    pub(crate) fn reset(&mut self) {
        self.queue.clear();
        self.packets_processed = 0;
        self.packets_dropped = 0;
    }

    /// Returns the current node state.
    pub fn status(&self) -> NodeStatus {
        NodeStatus {
            name: self.name.clone(),
            queue_length: self.queue.len(),
            packets_processed: self.packets_processed,
            packets_dropped: self.packets_dropped,
        }
    }

    /// Returns the node description.
    pub fn info(&self) -> NodeInfo {
        NodeInfo {
            name: self.name.clone(),
            queue_size: self.queue_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(id: u64) -> Packet {
        Packet {
            id,
            source: 0,
            destination: 1,
            timestamp: 0.,
            size: 100.,
        }
    }

    #[test]
    fn queue_rejects_packets_above_capacity() {
        let mut node = Node::new("A", 2);
        assert!(node.enqueue(packet(0)).is_ok());
        assert!(node.enqueue(packet(1)).is_ok());
        let rejected = node.enqueue(packet(2)).unwrap_err();
        assert_eq!(rejected.id, 2);
        assert_eq!(node.queue_len(), 2);
        assert_eq!(node.dequeue().map(|p| p.id), Some(0));
    }

    #[test]
    fn zero_capacity_queue_is_always_full() {
        let mut node = Node::new("A", 0);
        assert!(node.is_full());
        assert!(node.enqueue(packet(0)).is_err());
    }

    #[test]
    fn reset_clears_queue_and_counters() {
        let mut node = Node::new("A", 5);
        node.enqueue(packet(0)).unwrap();
        node.record_processed();
        node.record_dropped();
        node.reset();
        assert_eq!(
            node.status(),
            NodeStatus {
                name: "A".to_string(),
                queue_length: 0,
                packets_processed: 0,
                packets_dropped: 0,
            }
        );
    }
}
