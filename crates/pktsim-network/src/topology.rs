//! Network topology.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::link::{Link, LinkConfig};
use crate::node::{Node, NodeConfig, NodeId, NodeInfo, NodeStatus};

/// Full description of a network: nodes, links and the default queue capacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network nodes.
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
    /// Directed links between the nodes.
    #[serde(default)]
    pub links: Vec<LinkConfig>,
    /// Queue capacity of nodes without explicit `queue_size`.
    #[serde(default = "crate::defaults::queue_size")]
    pub queue_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            queue_size: crate::defaults::DEFAULT_QUEUE_SIZE,
        }
    }
}

/// Topology as reported to the user.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopologyInfo {
    /// Nodes in configuration order.
    pub nodes: Vec<NodeInfo>,
    /// Links grouped by source node, sources ordered by their first configured link.
    pub links: Vec<LinkConfig>,
}

/// Stores network nodes and directed links between them.
///
/// Nodes are identified by their position in configuration order. Outgoing links of each node are kept
/// in configuration order as well.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    nodes: IndexMap<String, Node>,
    links: Vec<Vec<Link>>,
    // sources in order of their first configured link
    sources: Vec<NodeId>,
}

impl Topology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a topology from node and link descriptions.
    ///
    /// Fails on duplicate node names, links between unknown nodes, non-positive bandwidth and negative latency.
    pub fn build(
        nodes: &[NodeConfig],
        links: &[LinkConfig],
        default_queue_size: usize,
    ) -> Result<Self, SimulationError> {
        let mut topology = Self::new();
        for node in nodes {
            if topology.nodes.contains_key(&node.name) {
                return Err(SimulationError::config(format!("duplicate node name '{}'", node.name)));
            }
            let queue_size = node.queue_size.unwrap_or(default_queue_size);
            topology
                .nodes
                .insert(node.name.clone(), Node::new(node.name.clone(), queue_size));
        }
        topology.links = vec![Vec::new(); topology.nodes.len()];
        for link in links {
            let source = topology.lookup(&link.source)?;
            let destination = topology.lookup(&link.destination)?;
            if !(link.bandwidth > 0.) || !link.bandwidth.is_finite() {
                return Err(SimulationError::config(format!(
                    "link {} -> {} has invalid bandwidth {}, must be > 0",
                    link.source, link.destination, link.bandwidth
                )));
            }
            if !(link.latency >= 0.) || !link.latency.is_finite() {
                return Err(SimulationError::config(format!(
                    "link {} -> {} has invalid latency {}, must be >= 0",
                    link.source, link.destination, link.latency
                )));
            }
            if topology.links[source].is_empty() {
                topology.sources.push(source);
            }
            topology.links[source].push(Link {
                source,
                destination,
                bandwidth: link.bandwidth,
                latency: link.latency,
            });
        }
        Ok(topology)
    }

    fn lookup(&self, name: &str) -> Result<NodeId, SimulationError> {
        self.node_id(name)
            .ok_or_else(|| SimulationError::config(format!("link references unknown node '{}'", name)))
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the id of node with specified name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.nodes.get_index_of(name)
    }

    /// Returns the node by its id.
    ///
    /// Panics if there is no such node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Returns the name of node with specified id.
    pub fn node_name(&self, id: NodeId) -> &str {
        self.nodes[id].name()
    }

    /// Iterates over nodes in configuration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns outgoing links of the node.
    pub fn links_from(&self, id: NodeId) -> &[Link] {
        self.links.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the first configured link from `source` to `destination`.
    pub fn link_between(&self, source: NodeId, destination: NodeId) -> Option<&Link> {
        self.links_from(source).iter().find(|link| link.destination == destination)
    }

    /// Iterates over all links grouped by source node.
    ///
    /// Sources follow the order of their first configured link.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.sources.iter().flat_map(|&source| self.links[source].iter())
    }

    /// Returns the number of links.
    pub fn link_count(&self) -> usize {
        self.links.iter().map(Vec::len).sum()
    }

    /// Empties all queues and resets node counters.
    pub(crate) fn reset_nodes(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset();
        }
    }

    /// Returns the current state of all nodes.
    pub fn status(&self) -> Vec<NodeStatus> {
        self.nodes.values().map(Node::status).collect()
    }

    /// Returns the description of nodes and links.
    pub fn info(&self) -> TopologyInfo {
        TopologyInfo {
            nodes: self.nodes.values().map(Node::info).collect(),
            links: self
                .links()
                .map(|link| LinkConfig {
                    source: self.node_name(link.source).to_string(),
                    destination: self.node_name(link.destination).to_string(),
                    bandwidth: link.bandwidth,
                    latency: link.latency,
                })
                .collect(),
        }
    }
}

// Canonical topologies ------------------------------------------------------------------------------------------------

/// Kind of generated topology.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyKind {
    /// Each node is linked to its successor, the last one to the first. Links are unidirectional.
    #[default]
    Ring,
    /// Every ordered pair of distinct nodes is linked.
    Mesh,
    /// Node `Node0` is linked in both directions with every other node.
    Star,
    /// Consecutive nodes are linked in both directions.
    Line,
}

impl TopologyKind {
    /// All supported kinds.
    pub const ALL: [TopologyKind; 4] = [
        TopologyKind::Ring,
        TopologyKind::Mesh,
        TopologyKind::Star,
        TopologyKind::Line,
    ];

    /// Returns the name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyKind::Ring => "ring",
            TopologyKind::Mesh => "mesh",
            TopologyKind::Star => "star",
            TopologyKind::Line => "line",
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopologyKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ring" => Ok(TopologyKind::Ring),
            "mesh" => Ok(TopologyKind::Mesh),
            "star" => Ok(TopologyKind::Star),
            "line" => Ok(TopologyKind::Line),
            _ => Err(SimulationError::config(format!("unknown topology type '{}'", s))),
        }
    }
}

/// Returns the name of i-th node of a generated topology.
pub fn node_name(i: usize) -> String {
    format!("Node{}", i)
}

/// Generates the nodes and links of a canonical topology.
///
/// Nodes are named `Node0`, `Node1`, ... and all links share the same bandwidth and latency.
/// A ring of a single node has no links.
pub fn generate(
    kind: TopologyKind,
    node_count: usize,
    queue_size: usize,
    bandwidth: f64,
    latency: f64,
) -> NetworkConfig {
    let nodes = (0..node_count)
        .map(|i| NodeConfig::new(node_name(i)).with_queue_size(queue_size))
        .collect();
    let link = |from: usize, to: usize| LinkConfig::new(node_name(from), node_name(to), bandwidth, latency);
    let mut links = Vec::new();
    match kind {
        TopologyKind::Ring => {
            if node_count > 1 {
                for i in 0..node_count {
                    links.push(link(i, (i + 1) % node_count));
                }
            }
        }
        TopologyKind::Mesh => {
            for i in 0..node_count {
                for j in 0..node_count {
                    if i != j {
                        links.push(link(i, j));
                    }
                }
            }
        }
        TopologyKind::Star => {
            for i in 1..node_count {
                links.push(link(0, i));
                links.push(link(i, 0));
            }
        }
        TopologyKind::Line => {
            for i in 1..node_count {
                links.push(link(i - 1, i));
                links.push(link(i, i - 1));
            }
        }
    }
    NetworkConfig {
        nodes,
        links,
        queue_size,
    }
}
