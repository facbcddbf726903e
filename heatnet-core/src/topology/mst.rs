//! Minimum spanning tree fallback topology.
//!
//! Connects the plant and buildings with straight, distance-minimal links.
//! It ignores streets entirely and is only a stand-in for layouts where no
//! street geometry is available; it is never street-based routing.

use geo::{Line, Point};
use hashbrown::HashMap;
use itertools::Itertools;
use petgraph::{
    algo::min_spanning_tree,
    data::FromElements,
    graph::{NodeIndex, UnGraph},
    visit::EdgeRef,
};

use crate::model::geometry::distance;

/// Builds a minimum spanning tree over `points` (Kruskal over the complete
/// Euclidean graph). Node weights are indices into `points`; the returned map
/// resolves them back to coordinates.
pub fn build_mst_topology(points: &[Point<f64>]) -> (UnGraph<usize, f64>, HashMap<usize, Point<f64>>) {
    let mut complete = UnGraph::<usize, f64>::with_capacity(
        points.len(),
        points.len() * points.len().saturating_sub(1) / 2,
    );
    let nodes: Vec<NodeIndex> = (0..points.len()).map(|idx| complete.add_node(idx)).collect();

    for (i, j) in (0..points.len()).tuple_combinations() {
        complete.add_edge(nodes[i], nodes[j], distance(points[i].0, points[j].0));
    }

    let tree = UnGraph::<usize, f64>::from_elements(min_spanning_tree(&complete));
    let positions = points.iter().copied().enumerate().collect();

    (tree, positions)
}

/// Tree edges as straight lines with their lengths
pub fn tree_segments(
    tree: &UnGraph<usize, f64>,
    positions: &HashMap<usize, Point<f64>>,
) -> Vec<(usize, usize, Line<f64>, f64)> {
    tree.edge_references()
        .filter_map(|edge| {
            let a = *tree.node_weight(edge.source())?;
            let b = *tree.node_weight(edge.target())?;
            let line = Line::new(positions.get(&a)?.0, positions.get(&b)?.0);
            Some((a, b, line, *edge.weight()))
        })
        .collect()
}

/// Sum of tree edge lengths
pub fn tree_length(tree: &UnGraph<usize, f64>) -> f64 {
    tree.edge_weights().sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::point;

    use super::*;

    #[test]
    fn tree_spans_all_points_without_cycles() {
        let points = vec![
            point!(x: 0.0, y: 0.0),
            point!(x: 10.0, y: 0.0),
            point!(x: 10.0, y: 10.0),
            point!(x: 0.0, y: 10.0),
            point!(x: 5.0, y: 5.0),
        ];
        let (tree, positions) = build_mst_topology(&points);

        assert_eq!(tree.node_count(), points.len());
        assert_eq!(tree.edge_count(), points.len() - 1);
        assert_eq!(positions.len(), points.len());
        assert_eq!(petgraph::algo::connected_components(&tree), 1);
        // every corner links to the center
        assert_relative_eq!(tree_length(&tree), 4.0 * 50.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn collinear_points_form_a_chain() {
        let points = vec![point!(x: 0.0, y: 0.0), point!(x: 30.0, y: 0.0), point!(x: 10.0, y: 0.0)];
        let (tree, positions) = build_mst_topology(&points);
        let segments = tree_segments(&tree, &positions);

        assert_eq!(segments.len(), 2);
        assert_relative_eq!(tree_length(&tree), 30.0);
        assert!(segments.iter().all(|(a, b, _, _)| *a == 2 || *b == 2));
    }

    #[test]
    fn degenerate_inputs() {
        let (empty, _) = build_mst_topology(&[]);
        assert_eq!(empty.node_count(), 0);

        let (single, _) = build_mst_topology(&[point!(x: 1.0, y: 1.0)]);
        assert_eq!(single.node_count(), 1);
        assert_eq!(single.edge_count(), 0);
    }
}
