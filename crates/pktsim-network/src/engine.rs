//! Packet generation, queueing and forwarding.

use serde_json::json;

use pktsim_core::{log_debug, log_error, log_trace, EventQueue, SimRng};

use crate::defaults::DEFAULT_PACKET_SIZE;
use crate::error::SimulationError;
use crate::metrics::Metrics;
use crate::node::NodeId;
use crate::packet::Packet;
use crate::routing::RoutingTable;
use crate::topology::Topology;
use crate::traffic::TrafficConfig;

/// Events of the network simulation.
#[derive(Clone, Debug)]
pub enum NetworkEvent {
    /// The node generates a new packet.
    PacketGeneration {
        /// Generating node.
        node: NodeId,
    },
    /// The packet arrives at the node.
    PacketArrival {
        /// Receiving node.
        node: NodeId,
        /// Arriving packet.
        packet: Packet,
    },
    /// The run reaches its duration.
    SimulationEnd,
}

/// Reason of a packet drop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The queue of the node was full when the packet arrived.
    QueueFull,
    /// The routing table has no next hop for the packet destination.
    NoRoute,
}

/// Forwarding of the queue head after a packet was enqueued.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Forwarding {
    /// Forwarded packet.
    pub packet: u64,
    /// Next hop of the packet.
    pub next_hop: NodeId,
    /// Arrival time at the next hop.
    pub arrival_time: f64,
}

enum Head {
    Forwarded(Forwarding),
    Unroutable(u64),
}

/// Result of processing a single event.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// The node generated a packet (`None` if no destination is reachable from the node).
    Generated {
        /// Generating node.
        node: NodeId,
        /// Id of the generated packet.
        packet: Option<u64>,
    },
    /// The packet reached its destination.
    Delivered {
        /// Destination node.
        node: NodeId,
        /// Delivered packet.
        packet: Packet,
        /// End-to-end latency.
        latency: f64,
    },
    /// The packet was put into the node queue, after which the queue head was sent to its next hop.
    Enqueued {
        /// Node which queued the packet.
        node: NodeId,
        /// Queued packet.
        packet: u64,
        /// Sending of the queue head.
        forwarded: Forwarding,
    },
    /// The node dropped a packet, either on arrival or when it reached the queue head.
    Dropped {
        /// Node which dropped the packet.
        node: NodeId,
        /// Dropped packet.
        packet: u64,
        /// Drop reason.
        reason: DropReason,
    },
    /// The run has reached its duration.
    Ended,
}

/// Handles generation and arrival events over borrowed simulation state.
pub(crate) struct Engine<'a> {
    pub topology: &'a mut Topology,
    pub routing: &'a RoutingTable,
    pub events: &'a mut EventQueue<NetworkEvent>,
    pub metrics: &'a mut Metrics,
    pub rng: &'a mut SimRng,
    pub next_packet_id: &'a mut u64,
    pub traffic: &'a TrafficConfig,
}

impl Engine<'_> {
    /// Schedules the next packet generation of the node.
    pub fn schedule_generation(&mut self, node: NodeId) -> Result<(), SimulationError> {
        let interval = self.traffic.next_interval(self.rng);
        self.events
            .push_after(interval, NetworkEvent::PacketGeneration { node })?;
        Ok(())
    }

    pub fn on_generation(&mut self, node: NodeId) -> Result<StepOutcome, SimulationError> {
        let time = self.events.time();
        let destination = self.rng.choose(self.routing.destinations(node)).copied();
        let packet_id = match destination {
            Some(destination) => {
                let packet = Packet {
                    id: *self.next_packet_id,
                    source: node,
                    destination,
                    timestamp: time,
                    size: DEFAULT_PACKET_SIZE,
                };
                *self.next_packet_id += 1;
                log_trace!(
                    time,
                    self.topology.node_name(node),
                    "generated packet {}",
                    json!({"id": packet.id, "dst": self.topology.node_name(destination)})
                );
                let id = packet.id;
                // the packet enters the outbound queue of its source node right now
                self.events.push(time, NetworkEvent::PacketArrival { node, packet })?;
                Some(id)
            }
            None => None,
        };
        self.schedule_generation(node)?;
        Ok(StepOutcome::Generated {
            node,
            packet: packet_id,
        })
    }

    pub fn on_arrival(&mut self, node: NodeId, packet: Packet) -> Result<StepOutcome, SimulationError> {
        let time = self.events.time();
        if packet.destination == node {
            let latency = time - packet.timestamp;
            self.metrics.record_delivery(latency);
            self.topology.node_mut(node).record_processed();
            log_trace!(
                time,
                self.topology.node_name(node),
                "delivered packet {}",
                json!({"id": packet.id, "src": self.topology.node_name(packet.source), "latency": latency})
            );
            return Ok(StepOutcome::Delivered { node, packet, latency });
        }

        let packet_id = packet.id;
        match self.topology.node_mut(node).enqueue(packet) {
            Ok(()) => match self.process_head(node)? {
                Head::Forwarded(forwarded) => Ok(StepOutcome::Enqueued {
                    node,
                    packet: packet_id,
                    forwarded,
                }),
                Head::Unroutable(packet) => Ok(StepOutcome::Dropped {
                    node,
                    packet,
                    reason: DropReason::NoRoute,
                }),
            },
            Err(packet) => {
                self.topology.node_mut(node).record_dropped();
                self.metrics.record_drop();
                log_debug!(
                    time,
                    self.topology.node_name(node),
                    "dropped packet {}: queue is full",
                    packet.id
                );
                Ok(StepOutcome::Dropped {
                    node,
                    packet: packet.id,
                    reason: DropReason::QueueFull,
                })
            }
        }
    }

    /// Sends the packet at the head of the node queue to its next hop.
    ///
    /// Only one packet leaves the queue per call.
    fn process_head(&mut self, node: NodeId) -> Result<Head, SimulationError> {
        let time = self.events.time();
        let destination = match self.topology.node(node).head() {
            Some(head) => head.destination,
            None => return Err(SimulationError::EmptyQueue),
        };

        let Some(next_hop) = self.routing.next_hop(node, destination) else {
            let target = self.topology.node_mut(node);
            let packet = target.dequeue().ok_or(SimulationError::EmptyQueue)?;
            target.record_dropped();
            self.metrics.record_drop();
            log_debug!(
                time,
                self.topology.node_name(node),
                "dropped packet {}: no route to {}",
                packet.id,
                self.topology.node_name(destination)
            );
            return Ok(Head::Unroutable(packet.id));
        };

        let Some(link) = self.topology.link_between(node, next_hop).copied() else {
            let err = SimulationError::RoutingInconsistency {
                node: self.topology.node_name(node).to_string(),
                next_hop: self.topology.node_name(next_hop).to_string(),
            };
            log_error!(time, self.topology.node_name(node), "{}", err);
            return Err(err);
        };

        let target = self.topology.node_mut(node);
        let packet = target.dequeue().ok_or(SimulationError::EmptyQueue)?;
        target.record_processed();
        let arrival_time = time + link.travel_time(packet.size);
        let packet_id = packet.id;
        log_trace!(
            time,
            self.topology.node_name(node),
            "forwarded packet {}",
            json!({"id": packet_id, "next_hop": self.topology.node_name(next_hop), "arrival": arrival_time})
        );
        self.events.push(
            arrival_time,
            NetworkEvent::PacketArrival {
                node: next_hop,
                packet,
            },
        )?;
        Ok(Head::Forwarded(Forwarding {
            packet: packet_id,
            next_hop,
            arrival_time,
        }))
    }
}
