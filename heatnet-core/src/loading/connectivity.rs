use geo::{LineString, Point};
use log::debug;
use petgraph::graph::NodeIndex;
use rstar::{RTree, primitives::GeomWithData};

use crate::model::{
    StreetGraph,
    geometry::distance,
    streets::{EdgeMetadata, NodeType},
};

type IndexedNode = GeomWithData<Point<f64>, NodeIndex>;

/// Joins every connected component to the first one with a straight
/// `connectivity_fix` edge between the closest node pair. Both bridge
/// endpoints are tagged [`NodeType::ConnectivityFix`] unless they already
/// carry a more specific role.
///
/// Components are merged one at a time in iteration order, so a later
/// component may attach to nodes of an earlier, already merged one. Returns
/// the number of edges added; a connected or empty graph is left untouched.
pub fn ensure_connected(graph: &mut StreetGraph) -> usize {
    let mut components = graph.components().into_iter();
    let Some(main) = components.next() else {
        return 0;
    };

    let mut main_tree: RTree<IndexedNode> = RTree::bulk_load(
        main.iter()
            .filter_map(|&idx| Some(IndexedNode::new(graph.key_of(idx)?.point(), idx)))
            .collect(),
    );

    let mut added = 0;
    for component in components {
        let Some((anchor, member, gap)) = closest_pair(graph, &main_tree, &component) else {
            continue;
        };
        let (Some(a), Some(b)) = (graph.key_of(anchor), graph.key_of(member)) else {
            continue;
        };

        debug!(
            "Bridging component of {} nodes with a {gap:.2} m connectivity edge",
            component.len()
        );
        graph.add_edge(
            a,
            b,
            LineString::new(vec![a.coord(), b.coord()]),
            EdgeMetadata::connectivity_fix(),
        );
        for key in [a, b] {
            if let Some(node) = graph.node_mut(key)
                && node.node_type == NodeType::Street
            {
                node.node_type = NodeType::ConnectivityFix;
            }
        }
        added += 1;

        for idx in component {
            if let Some(key) = graph.key_of(idx) {
                main_tree.insert(IndexedNode::new(key.point(), idx));
            }
        }
    }

    added
}

/// Closest `(main node, component node, distance)` pair. Ties keep the first
/// component node in iteration order.
fn closest_pair(
    graph: &StreetGraph,
    main_tree: &RTree<IndexedNode>,
    component: &[NodeIndex],
) -> Option<(NodeIndex, NodeIndex, f64)> {
    let mut best: Option<(NodeIndex, NodeIndex, f64)> = None;

    for &member in component {
        let Some(key) = graph.key_of(member) else {
            continue;
        };
        let Some(nearest) = main_tree.nearest_neighbor(&key.point()) else {
            continue;
        };
        let gap = distance(key.coord(), nearest.geom().0);
        if best.is_none_or(|(_, _, d)| gap < d) {
            best = Some((nearest.data, member, gap));
        }
    }

    best
}

/// True when the graph has at most one connected component
pub fn is_connected(graph: &StreetGraph) -> bool {
    graph.component_count() <= 1
}
