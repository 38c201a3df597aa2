use rstest::rstest;

use pktsim_network::topology::generate;
use pktsim_network::{
    LinkConfig, NodeConfig, RoutingAlgorithm, RoutingTable, ShortestPathDijkstra, ShortestPathFloydWarshall,
    Topology, TopologyKind,
};

#[derive(Clone, Copy)]
enum RoutingImpl {
    Dijkstra,
    FloydWarshall,
}

fn make_routing(routing: RoutingImpl) -> Box<dyn RoutingAlgorithm> {
    match routing {
        RoutingImpl::Dijkstra => Box::new(ShortestPathDijkstra),
        RoutingImpl::FloydWarshall => Box::new(ShortestPathFloydWarshall),
    }
}

fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!(
        (x - y).abs() < eps || (x.max(y) - x.min(y)) / x.min(y) < eps,
        "Values do not match: {:.15} vs {:.15}",
        x,
        y
    );
}

fn nodes(names: &[&str]) -> Vec<NodeConfig> {
    names.iter().map(|name| NodeConfig::new(*name)).collect()
}

fn build(config: &pktsim_network::NetworkConfig) -> Topology {
    Topology::build(&config.nodes, &config.links, config.queue_size).unwrap()
}

// A->C is direct but slow, A->B->C is faster
fn triangle() -> Topology {
    let links = vec![
        LinkConfig::new("A", "C", 10., 0.01),
        LinkConfig::new("A", "B", 100., 0.01),
        LinkConfig::new("B", "C", 100., 0.01),
    ];
    Topology::build(&nodes(&["A", "B", "C"]), &links, 10).unwrap()
}

// links with different weights, parallel links and an unreachable node
fn irregular() -> Topology {
    let links = vec![
        LinkConfig::new("A", "B", 50., 0.2),
        LinkConfig::new("A", "B", 500., 0.05),
        LinkConfig::new("B", "C", 20., 0.),
        LinkConfig::new("A", "D", 1., 0.),
        LinkConfig::new("D", "C", 1000., 0.01),
        LinkConfig::new("C", "E", 100., 0.3),
        LinkConfig::new("D", "E", 5., 0.1),
        LinkConfig::new("E", "A", 100., 0.01),
        LinkConfig::new("F", "A", 100., 0.01),
    ];
    Topology::build(&nodes(&["A", "B", "C", "D", "E", "F"]), &links, 10).unwrap()
}

fn check_table(topology: &Topology, table: &RoutingTable) {
    let node_count = topology.node_count();
    for (src, dst, route) in table.iter() {
        assert_ne!(src, dst);
        assert!(src < node_count && dst < node_count);
        assert!(route.next_hop < node_count);
        assert!(
            topology.link_between(src, route.next_hop).is_some(),
            "no link from {} to next hop {}",
            topology.node_name(src),
            topology.node_name(route.next_hop)
        );
        // the rest of the path is a shortest path from the next hop
        let first_hop = topology
            .links_from(src)
            .iter()
            .filter(|link| link.destination == route.next_hop)
            .map(|link| link.routing_weight())
            .fold(f64::INFINITY, f64::min);
        let rest = if route.next_hop == dst {
            0.
        } else {
            table.get(route.next_hop, dst).unwrap().cost
        };
        assert_float_eq(route.cost, first_hop + rest, 1e-9);
    }
}

#[rstest]
fn canonical_triangle(#[values(RoutingImpl::Dijkstra, RoutingImpl::FloydWarshall)] routing: RoutingImpl) {
    let topology = triangle();
    let table = make_routing(routing).compute(&topology);
    let (a, b, c) = (0, 1, 2);
    assert_eq!(table.next_hop(a, c), Some(b));
    assert_eq!(table.next_hop(a, b), Some(b));
    assert_float_eq(table.get(a, c).unwrap().cost, 0.04, 1e-9);
    assert!(table.get(c, a).is_none());
    assert!(table.get(a, a).is_none());
    assert_eq!(table.len(), 3);
    assert_eq!(table.destinations(a), &[b, c]);
    assert!(table.destinations(c).is_empty());
}

#[rstest]
fn canonical_topologies_are_fully_routed(
    #[values(TopologyKind::Ring, TopologyKind::Mesh, TopologyKind::Star, TopologyKind::Line)] kind: TopologyKind,
    #[values(2, 5, 8)] node_count: usize,
    #[values(RoutingImpl::Dijkstra, RoutingImpl::FloydWarshall)] routing: RoutingImpl,
) {
    let topology = build(&generate(kind, node_count, 10, 100., 0.01));
    let table = make_routing(routing).compute(&topology);
    assert_eq!(table.len(), node_count * (node_count - 1));
    check_table(&topology, &table);
}

#[rstest]
#[case(TopologyKind::Ring, 4, 2, 3)]
#[case(TopologyKind::Line, 4, 0, 1)]
#[case(TopologyKind::Line, 4, 3, 2)]
#[case(TopologyKind::Star, 4, 2, 0)]
#[case(TopologyKind::Star, 4, 0, 3)]
#[case(TopologyKind::Mesh, 4, 1, 3)]
fn unique_shortest_paths(
    #[case] kind: TopologyKind,
    #[case] node_count: usize,
    #[case] src: usize,
    #[case] hop: usize,
) {
    let topology = build(&generate(kind, node_count, 10, 100., 0.01));
    let table = ShortestPathDijkstra.compute(&topology);
    let dst = match kind {
        TopologyKind::Ring => 0,
        TopologyKind::Line if src == 0 => 3,
        TopologyKind::Line => 0,
        TopologyKind::Star if src == 0 => 3,
        TopologyKind::Star => 1,
        TopologyKind::Mesh => 3,
    };
    assert_eq!(table.next_hop(src, dst), Some(hop));
}

#[test]
fn irregular_network() {
    let topology = irregular();
    let table = ShortestPathDijkstra.compute(&topology);
    check_table(&topology, &table);
    let id = |name| topology.node_id(name).unwrap();
    // the faster of the parallel links is used
    assert_float_eq(table.get(id("A"), id("B")).unwrap().cost, 0.052, 1e-9);
    // A->B->C costs 0.052 + 0.05, A->D->C costs 1 + 0.011
    assert_eq!(table.next_hop(id("A"), id("C")), Some(id("B")));
    assert_float_eq(table.get(id("A"), id("C")).unwrap().cost, 0.102, 1e-9);
    // nothing leads to F
    for src in ["A", "B", "C", "D", "E"] {
        assert!(table.get(id(src), id("F")).is_none());
    }
    assert_eq!(table.destinations(id("F")).len(), 5);
}

#[rstest]
#[case::ring(build(&generate(TopologyKind::Ring, 7, 10, 100., 0.01)))]
#[case::mesh(build(&generate(TopologyKind::Mesh, 6, 10, 30., 0.2)))]
#[case::star(build(&generate(TopologyKind::Star, 6, 10, 100., 0.)))]
#[case::line(build(&generate(TopologyKind::Line, 6, 10, 1., 0.5)))]
#[case::triangle(triangle())]
#[case::irregular(irregular())]
fn dijkstra_and_floyd_warshall_agree(#[case] topology: Topology) {
    let dijkstra = ShortestPathDijkstra.compute(&topology);
    let floyd_warshall = ShortestPathFloydWarshall.compute(&topology);
    assert_eq!(dijkstra.len(), floyd_warshall.len());
    for (src, dst, route) in dijkstra.iter() {
        let other = floyd_warshall
            .get(src, dst)
            .unwrap_or_else(|| panic!("no route from {} to {}", src, dst));
        assert_float_eq(route.cost, other.cost, 1e-9);
    }
}

#[test]
fn empty_topology_has_no_routes() {
    let topology = Topology::new();
    assert!(ShortestPathDijkstra.compute(&topology).is_empty());
    assert!(ShortestPathFloydWarshall.compute(&topology).is_empty());
}
