//! Scenario configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::SimulationError;
use crate::simulation::NetworkSimulation;
use crate::topology::{generate, NetworkConfig, TopologyKind};
use crate::traffic::TrafficConfig;

/// Parameters of a generated topology.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Topology kind.
    #[serde(rename = "type", default)]
    pub kind: TopologyKind,
    /// Number of nodes.
    #[serde(default = "defaults::node_count")]
    pub nodes: usize,
    /// Queue capacity of every node.
    #[serde(default = "defaults::queue_size")]
    pub queue_size: usize,
    /// Bandwidth of every link.
    #[serde(default = "defaults::bandwidth")]
    pub bandwidth: f64,
    /// Latency of every link.
    #[serde(default = "defaults::latency")]
    pub latency: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            kind: TopologyKind::default(),
            nodes: defaults::DEFAULT_NODE_COUNT,
            queue_size: defaults::DEFAULT_QUEUE_SIZE,
            bandwidth: defaults::DEFAULT_BANDWIDTH,
            latency: defaults::DEFAULT_LATENCY,
        }
    }
}

impl TopologyConfig {
    /// Generates the described network.
    pub fn generate(&self) -> NetworkConfig {
        generate(self.kind, self.nodes, self.queue_size, self.bandwidth, self.latency)
    }
}

/// Description of a simulation run: the network, the traffic and the run parameters.
///
/// The network is either listed explicitly in `network` or generated from `topology`.
/// If neither is given, the default ring topology is used.
///
/// # Examples
///
/// ```rust
/// use pktsim_network::{ScenarioConfig, TopologyKind, TrafficPattern};
///
/// let yaml = "duration: 2.5\ntraffic: {pattern: bursty}\ntopology: {type: star, nodes: 4}";
/// let config = ScenarioConfig::from_yaml_str(yaml).unwrap();
/// assert_eq!(config.traffic.pattern, TrafficPattern::Bursty);
/// assert_eq!(config.traffic.packet_rate, 10.);
/// assert_eq!(config.topology.as_ref().unwrap().kind, TopologyKind::Star);
/// assert_eq!(config.network().unwrap().links.len(), 6);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Random seed.
    #[serde(default = "defaults::seed")]
    pub seed: u64,
    /// Run duration in simulation time.
    #[serde(default = "defaults::duration")]
    pub duration: f64,
    /// Pace the run by wall-clock time.
    #[serde(default)]
    pub realtime: bool,
    /// Traffic parameters.
    #[serde(default)]
    pub traffic: TrafficConfig,
    /// Explicit network description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkConfig>,
    /// Generated network description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<TopologyConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: defaults::DEFAULT_SEED,
            duration: defaults::DEFAULT_DURATION,
            realtime: false,
            traffic: TrafficConfig::default(),
            network: None,
            topology: None,
        }
    }
}

impl ScenarioConfig {
    /// Parses the scenario from YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SimulationError> {
        serde_yaml::from_str(yaml).map_err(|e| SimulationError::config(format!("can't parse scenario: {}", e)))
    }

    /// Reads the scenario from YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| SimulationError::config(format!("can't read file {}: {}", path.display(), e)))?;
        serde_yaml::from_str(&yaml)
            .map_err(|e| SimulationError::config(format!("can't parse YAML from file {}: {}", path.display(), e)))
    }

    /// Returns the network of the scenario.
    pub fn network(&self) -> Result<NetworkConfig, SimulationError> {
        match (&self.network, &self.topology) {
            (Some(_), Some(_)) => Err(SimulationError::config(
                "scenario must contain either network or topology, not both",
            )),
            (Some(network), None) => Ok(network.clone()),
            (None, Some(topology)) => Ok(topology.generate()),
            (None, None) => Ok(TopologyConfig::default().generate()),
        }
    }

    /// Creates a simulation with the scenario seed and network.
    pub fn build(&self) -> Result<NetworkSimulation, SimulationError> {
        let network = self.network()?;
        self.traffic.validate()?;
        let mut sim = NetworkSimulation::new(self.seed);
        sim.configure(&network)?;
        Ok(sim)
    }

    /// Creates a simulation and runs the scenario to its end.
    pub fn run(&self) -> Result<NetworkSimulation, SimulationError> {
        let mut sim = self.build()?;
        sim.start(self.traffic.clone(), self.duration, self.realtime)?;
        Ok(sim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scenario_uses_default_ring() {
        let config = ScenarioConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ScenarioConfig::default());
        let network = config.network().unwrap();
        assert_eq!(network.nodes.len(), 5);
        assert_eq!(network.links.len(), 5);
        assert_eq!(network.queue_size, 50);
        assert_eq!(network.links[4].destination, "Node0");
    }

    #[test]
    fn both_network_and_topology_are_rejected() {
        let config = ScenarioConfig::from_yaml_str("network: {nodes: [{name: A}]}\ntopology: {type: mesh}").unwrap();
        assert!(matches!(config.network(), Err(SimulationError::Configuration(_))));
        assert!(config.build().is_err());
    }

    #[test]
    fn unknown_pattern_is_a_configuration_error() {
        let err = ScenarioConfig::from_yaml_str("traffic: {pattern: fractal}").unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = ScenarioConfig::from_file("no/such/scenario.yaml").unwrap_err();
        match err {
            SimulationError::Configuration(msg) => assert!(msg.contains("no/such/scenario.yaml")),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
