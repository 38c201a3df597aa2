//! Routing algorithms.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use crate::node::NodeId;
use crate::topology::Topology;

const INVALID_NODE_ID: usize = usize::MAX;

/// Routing table entry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Route {
    /// First node after the source on a minimum-cost path.
    pub next_hop: NodeId,
    /// Total cost of the path.
    pub cost: f64,
}

/// Next hops for all pairs of nodes connected by a path.
///
/// There are no entries for unreachable destinations and for a node to itself.
#[derive(Clone, Debug, Default)]
pub struct RoutingTable {
    routes: FxHashMap<(NodeId, NodeId), Route>,
    // reachable destinations of each source in increasing id order
    reachable: Vec<Vec<NodeId>>,
}

impl RoutingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the route from `src` to `dst`, replacing the previous one.
    pub fn insert(&mut self, src: NodeId, dst: NodeId, route: Route) {
        if self.reachable.len() <= src {
            self.reachable.resize_with(src + 1, Vec::new);
        }
        if self.routes.insert((src, dst), route).is_none() {
            let pos = self.reachable[src].partition_point(|&n| n < dst);
            self.reachable[src].insert(pos, dst);
        }
    }

    /// Returns the route from `src` to `dst`.
    pub fn get(&self, src: NodeId, dst: NodeId) -> Option<&Route> {
        self.routes.get(&(src, dst))
    }

    /// Returns the next hop on the way from `src` to `dst`.
    pub fn next_hop(&self, src: NodeId, dst: NodeId) -> Option<NodeId> {
        self.get(src, dst).map(|route| route.next_hop)
    }

    /// Returns destinations reachable from `src`, in increasing id order.
    pub fn destinations(&self, src: NodeId) -> &[NodeId] {
        self.reachable.get(src).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over `(src, dst, route)` entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId, &Route)> {
        self.routes.iter().map(|(&(src, dst), route)| (src, dst, route))
    }
}

/// Calculates the routing table of a network.
pub trait RoutingAlgorithm: Send {
    /// Builds next hops for all reachable pairs of nodes.
    ///
    /// Link cost is [`Link::routing_weight`](crate::Link::routing_weight).
    fn compute(&self, topology: &Topology) -> RoutingTable;
}

// Shortest Path (Dijkstra) --------------------------------------------------------------------------------------------

/// Static routing over shortest paths computed by Dijkstra's algorithm with a binary heap.
///
/// When several paths have equal cost, the chosen one depends on the heap pop order.
#[derive(Default)]
pub struct ShortestPathDijkstra;

#[derive(Copy, Clone)]
struct QueueItem {
    distance: f64,
    node: NodeId,
}

impl Eq for QueueItem {}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

// inverted to get a min-heap from BinaryHeap
impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ShortestPathDijkstra {
    fn dijkstra_for_node(&self, src: NodeId, topology: &Topology, table: &mut RoutingTable) {
        let node_count = topology.node_count();
        let mut distance = vec![f64::INFINITY; node_count];
        let mut parent = vec![INVALID_NODE_ID; node_count];
        distance[src] = 0.;

        let mut heap = BinaryHeap::new();
        heap.push(QueueItem { distance: 0., node: src });
        while let Some(QueueItem { distance: dist, node }) = heap.pop() {
            // stale entry, the node was already reached by a shorter path
            if dist > distance[node] {
                continue;
            }
            for link in topology.links_from(node) {
                let candidate = dist + link.routing_weight();
                if candidate < distance[link.destination] {
                    distance[link.destination] = candidate;
                    parent[link.destination] = node;
                    heap.push(QueueItem {
                        distance: candidate,
                        node: link.destination,
                    });
                }
            }
        }

        for dst in 0..node_count {
            if dst == src || parent[dst] == INVALID_NODE_ID {
                continue;
            }
            let mut hop = dst;
            while parent[hop] != src {
                hop = parent[hop];
            }
            table.insert(
                src,
                dst,
                Route {
                    next_hop: hop,
                    cost: distance[dst],
                },
            );
        }
    }
}

impl RoutingAlgorithm for ShortestPathDijkstra {
    fn compute(&self, topology: &Topology) -> RoutingTable {
        let mut table = RoutingTable::new();
        for src in 0..topology.node_count() {
            self.dijkstra_for_node(src, topology, &mut table);
        }
        table
    }
}

// Shortest Path (Floyd–Warshall) --------------------------------------------------------------------------------------

/// Static routing over shortest paths computed by the Floyd–Warshall algorithm.
///
/// Runs in cubic time of the node count, mostly useful to cross-check [`ShortestPathDijkstra`].
#[derive(Default)]
pub struct ShortestPathFloydWarshall;

impl RoutingAlgorithm for ShortestPathFloydWarshall {
    fn compute(&self, topology: &Topology) -> RoutingTable {
        let node_count = topology.node_count();
        let mut parent_path = vec![vec![INVALID_NODE_ID; node_count]; node_count];
        let mut current_paths = vec![vec![f64::INFINITY; node_count]; node_count];
        #[allow(clippy::needless_range_loop)]
        for node in 0..node_count {
            current_paths[node][node] = 0.0;
            parent_path[node][node] = node;
        }

        for link in topology.links() {
            let weight = link.routing_weight();
            if weight < current_paths[link.source][link.destination] {
                current_paths[link.source][link.destination] = weight;
                parent_path[link.source][link.destination] = link.source;
            }
        }

        for k in 0..node_count {
            for i in 0..node_count {
                for j in 0..node_count {
                    if current_paths[i][k] < f64::INFINITY
                        && current_paths[k][j] < f64::INFINITY
                        && current_paths[i][k] + current_paths[k][j] < current_paths[i][j]
                    {
                        current_paths[i][j] = current_paths[i][k] + current_paths[k][j];
                        parent_path[i][j] = parent_path[k][j];
                    }
                }
            }
        }

        let mut table = RoutingTable::new();
        for src in 0..node_count {
            for dst in 0..node_count {
                if src == dst || parent_path[src][dst] == INVALID_NODE_ID {
                    continue;
                }
                let mut hop = dst;
                while parent_path[src][hop] != src {
                    hop = parent_path[src][hop];
                }
                table.insert(
                    src,
                    dst,
                    Route {
                        next_hop: hop,
                        cost: current_paths[src][dst],
                    },
                );
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_keeps_destinations_sorted() {
        let mut table = RoutingTable::new();
        let route = Route { next_hop: 1, cost: 1. };
        table.insert(0, 3, route);
        table.insert(0, 1, route);
        table.insert(0, 2, route);
        table.insert(0, 2, route);
        assert_eq!(table.destinations(0), &[1, 2, 3]);
        assert_eq!(table.len(), 3);
        assert!(table.destinations(5).is_empty());
    }

    #[test]
    fn queue_item_is_min_ordered() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueItem { distance: 2., node: 0 });
        heap.push(QueueItem { distance: 0.5, node: 1 });
        heap.push(QueueItem { distance: 1., node: 2 });
        let order: Vec<NodeId> = std::iter::from_fn(|| heap.pop()).map(|item| item.node).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }
}
