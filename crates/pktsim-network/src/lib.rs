#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod control;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod handle;
pub mod link;
pub mod metrics;
pub mod node;
pub mod packet;
pub mod routing;
pub mod simulation;
pub mod topology;
pub mod traffic;

pub use config::{ScenarioConfig, TopologyConfig};
pub use control::RunControl;
pub use engine::{DropReason, Forwarding, NetworkEvent, StepOutcome};
pub use error::SimulationError;
pub use handle::SimulationHandle;
pub use link::{Link, LinkConfig};
pub use metrics::{Metrics, MetricsSnapshot};
pub use node::{Node, NodeConfig, NodeId, NodeInfo, NodeStatus};
pub use packet::Packet;
pub use routing::{Route, RoutingAlgorithm, RoutingTable, ShortestPathDijkstra, ShortestPathFloydWarshall};
pub use simulation::{NetworkSimulation, SimulationState};
pub use topology::{NetworkConfig, Topology, TopologyInfo, TopologyKind};
pub use traffic::{TrafficConfig, TrafficPattern};
