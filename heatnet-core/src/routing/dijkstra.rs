use std::{cmp::Ordering, collections::BinaryHeap};

use hashbrown::HashMap;
use petgraph::{stable_graph::NodeIndex, visit::EdgeRef};

use crate::model::StreetGraph;

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeIndex,
}

impl Eq for State {}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap),
        // lower node index first on equal cost to keep paths deterministic
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path by cumulative edge length between two nodes.
/// Returns the node sequence from `start` to `target` and its total length,
/// `None` if `target` is unreachable.
pub(crate) fn shortest_path(
    graph: &StreetGraph,
    start: NodeIndex,
    target: NodeIndex,
) -> Option<(Vec<NodeIndex>, f64)> {
    let mut distances: HashMap<NodeIndex, f64> = HashMap::new();
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut heap = BinaryHeap::new();

    // Start node has distance 0
    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        // Check if we've reached the target
        if node == target {
            break;
        }

        // Skip if we've found a better path
        if let Some(&best) = distances.get(&node)
            && cost > best
        {
            continue;
        }

        // Examine neighbors
        for edge in graph.graph.edges(node) {
            let next = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            let next_cost = cost + edge.weight().weight;

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, node);
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, node);
                    }
                }
            }
        }
    }

    let total = *distances.get(&target)?;

    // Follow predecessors backward from target to start
    let mut path = vec![target];
    let mut current = target;
    while current != start {
        current = *predecessors.get(&current)?;
        path.push(current);
    }
    path.reverse();

    Some((path, total))
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use super::*;
    use crate::loading::build_raw_street_graph;
    use crate::model::{NodeKey, Street};

    fn street(id: &str, geometry: geo::LineString<f64>) -> Street {
        Street {
            id: id.to_string(),
            name: None,
            highway: None,
            geometry,
        }
    }

    fn square_with_shortcut() -> StreetGraph {
        build_raw_street_graph(&[
            street("bottom", line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0), (x: 100.0, y: 100.0)]),
            street("top", line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 100.0), (x: 100.0, y: 100.0)]),
            street("diagonal", line_string![(x: 0.0, y: 0.0), (x: 50.0, y: 60.0), (x: 100.0, y: 100.0)]),
        ])
    }

    #[test]
    fn picks_shortest_alternative() {
        let graph = square_with_shortcut();
        let start = graph.node_index(NodeKey::new(0.0, 0.0)).unwrap();
        let target = graph.node_index(NodeKey::new(100.0, 100.0)).unwrap();

        let (path, total) = shortest_path(&graph, start, target).unwrap();

        assert_eq!(path.len(), 3);
        assert_eq!(graph.key_of(path[1]), Some(NodeKey::new(50.0, 60.0)));
        let expected = 50.0_f64.hypot(60.0) + 50.0_f64.hypot(40.0);
        assert!((total - expected).abs() < 1e-9);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let graph = square_with_shortcut();
        let start = graph.node_index(NodeKey::new(0.0, 0.0)).unwrap();
        let target = graph.node_index(NodeKey::new(100.0, 100.0)).unwrap();

        let first = shortest_path(&graph, start, target).unwrap();
        for _ in 0..10 {
            assert_eq!(shortest_path(&graph, start, target).unwrap(), first);
        }
    }

    #[test]
    fn disconnected_target_has_no_path() {
        let graph = build_raw_street_graph(&[
            street("a", line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]),
            street("b", line_string![(x: 50.0, y: 0.0), (x: 60.0, y: 0.0)]),
        ]);
        let start = graph.node_index(NodeKey::new(0.0, 0.0)).unwrap();
        let target = graph.node_index(NodeKey::new(60.0, 0.0)).unwrap();

        assert!(shortest_path(&graph, start, target).is_none());
    }

    #[test]
    fn start_equals_target() {
        let graph = square_with_shortcut();
        let start = graph.node_index(NodeKey::new(0.0, 0.0)).unwrap();
        let (path, total) = shortest_path(&graph, start, start).unwrap();
        assert_eq!(path, vec![start]);
        assert!(total.abs() < f64::EPSILON);
    }
}
