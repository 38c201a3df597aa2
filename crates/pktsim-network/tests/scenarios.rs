use std::path::PathBuf;

use rstest::rstest;

use pktsim_network::{ScenarioConfig, SimulationState, TopologyKind, TrafficPattern};

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/topology-run/scenarios")
        .join(name)
}

#[rstest]
#[case("ring.yaml", 5, 5)]
#[case("triangle.yaml", 3, 4)]
#[case("star-bursty.yaml", 8, 14)]
#[case("realtime-line.yaml", 4, 6)]
fn bundled_scenarios_are_valid(#[case] name: &str, #[case] nodes: usize, #[case] links: usize) {
    let config = ScenarioConfig::from_file(scenario_path(name)).unwrap();
    let sim = config.build().unwrap();
    assert_eq!(sim.topology().node_count(), nodes);
    assert_eq!(sim.topology().link_count(), links);
    assert_eq!(sim.state(), SimulationState::Configured);
    assert!(config.duration > 0.);
}

#[test]
fn triangle_scenario_runs() {
    let config = ScenarioConfig::from_file(scenario_path("triangle.yaml")).unwrap();
    assert_eq!(config.traffic.pattern, TrafficPattern::Poisson);
    assert!(!config.realtime);
    let sim = config.run().unwrap();
    assert_eq!(sim.state(), SimulationState::Stopped);
    assert_eq!(sim.time(), config.duration);
    assert_eq!(sim.next_hop("A", "C"), Some("B"));
    let metrics = sim.metrics();
    assert!(metrics.delivered > 0);
    assert!(metrics.packet_loss >= 0. && metrics.packet_loss <= 1.);
}

#[test]
fn scenario_defaults() {
    let config = ScenarioConfig::from_file(scenario_path("realtime-line.yaml")).unwrap();
    assert!(config.realtime);
    assert_eq!(config.seed, 123);
    assert_eq!(config.traffic.pattern, TrafficPattern::Constant);
    let topology = config.topology.unwrap();
    assert_eq!(topology.kind, TopologyKind::Line);
    assert_eq!(topology.queue_size, 50);
    assert_eq!(topology.bandwidth, 100.);
}

#[test]
fn explicit_network_with_per_node_queues() {
    let config = ScenarioConfig::from_yaml_str(
        concat!(
            "network:\n",
            "  queue_size: 7\n",
            "  nodes: [{name: X}, {name: Y, queue_size: 2}]\n",
            "  links: [{source: X, destination: Y}]\n",
        ),
    )
    .unwrap();
    let sim = config.build().unwrap();
    let info = sim.topology_info();
    assert_eq!(info.nodes[0].queue_size, 7);
    assert_eq!(info.nodes[1].queue_size, 2);
    assert_eq!(info.links[0].bandwidth, 100.);
    assert_eq!(info.links[0].latency, 0.01);
}

#[test]
fn invalid_scenarios() {
    for yaml in [
        "network: {nodes: [{name: A}], links: [{source: A, destination: B}]}",
        "topology: {type: mesh, bandwidth: 0}",
        "traffic: {packet_rate: -2}",
    ] {
        let config = ScenarioConfig::from_yaml_str(yaml).unwrap();
        assert!(config.build().is_err(), "{}", yaml);
    }
    assert!(ScenarioConfig::from_yaml_str("topology: {type: torus}").is_err());
    assert!(ScenarioConfig::from_yaml_str("duration: [1, 2]").is_err());
}
