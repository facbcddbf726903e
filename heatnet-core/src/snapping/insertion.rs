use geo::Point;
use log::trace;
use petgraph::stable_graph::EdgeIndex;

use crate::{
    Error,
    model::{
        NodeKey, StreetGraph,
        geometry::{self, Projection, SNAP_TOLERANCE, project_onto},
        streets::{EdgeMetadata, NodeAttributes, StreetNode},
    },
};

/// Outcome of inserting a point into the street graph
#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    /// Canonical node for the inserted point
    pub key: NodeKey,
    /// Street the point was snapped onto, `None` for an exact node match
    pub edge: Option<EdgeMetadata>,
    /// Whether an edge was split to create the node
    pub split: bool,
}

/// Inserts `point` into the graph with [`SNAP_TOLERANCE`].
///
/// See [`insert_point_with_tolerance`].
///
/// # Errors
///
/// Returns [`Error::NoEdges`] if the point is not an existing node and the
/// graph has no edge to snap onto.
pub fn insert_point(
    graph: &mut StreetGraph,
    point: Point<f64>,
    attrs: NodeAttributes,
) -> Result<Insertion, Error> {
    insert_point_with_tolerance(graph, point, attrs, SNAP_TOLERANCE)
}

/// Registers `point` as a graph node carrying `attrs`.
///
/// - An existing node at the rounded coordinate absorbs `attrs`.
/// - Otherwise the nearest edge is located. A point within `tolerance` of one
///   of its endpoints, or a degenerate edge shorter than `tolerance`, reuses
///   that endpoint.
/// - Otherwise the edge is replaced by two edges meeting at the new node,
///   both keeping the street attributes of the original.
///
/// Later insertions see the edges produced by earlier splits, so insertion
/// order matters.
///
/// # Errors
///
/// Returns [`Error::NoEdges`] if the point is not an existing node and the
/// graph has no edge to snap onto.
pub fn insert_point_with_tolerance(
    graph: &mut StreetGraph,
    point: Point<f64>,
    attrs: NodeAttributes,
    tolerance: f64,
) -> Result<Insertion, Error> {
    let key = NodeKey::from(point);

    if let Some(node) = graph.node_mut(key) {
        node.merge(attrs);
        return Ok(Insertion {
            key,
            edge: None,
            split: false,
        });
    }

    let (edge, projection) = nearest_edge(graph, key).ok_or(Error::NoEdges)?;
    let (start, end) = graph.graph.edge_endpoints(edge).ok_or(Error::InvalidNodeKey)?;
    let start_key = graph.key_of(start).ok_or(Error::InvalidNodeKey)?;
    let end_key = graph.key_of(end).ok_or(Error::InvalidNodeKey)?;
    let street_edge = graph.graph.edge_weight(edge).ok_or(Error::NoEdges)?;
    let meta = street_edge.meta.clone();

    let reuse = if projection.distance < tolerance {
        [start_key, end_key]
            .into_iter()
            .find(|endpoint| geometry::distance(endpoint.coord(), key.coord()) < tolerance)
    } else {
        None
    };
    let reuse = reuse.or_else(|| (street_edge.weight < tolerance).then_some(start_key));

    if let Some(endpoint) = reuse {
        trace!("Point {key:?} attached to existing node {endpoint:?}");
        if let Some(node) = graph.node_mut(endpoint) {
            node.merge(attrs);
        }
        return Ok(Insertion {
            key: endpoint,
            edge: Some(meta),
            split: false,
        });
    }

    let original = graph.remove_edge(edge).ok_or(Error::NoEdges)?;
    let (head, tail) = geometry::split_line(&original.geometry, projection.segment, key.coord());

    let mut node = StreetNode::street(key);
    node.merge(attrs);
    graph.add_node(node);
    graph.add_edge(start_key, key, head, original.meta.clone());
    graph.add_edge(key, end_key, tail, original.meta);

    trace!(
        "Split edge {start_key:?} - {end_key:?} of street {} at {key:?}",
        meta.street_id
    );

    Ok(Insertion {
        key,
        edge: Some(meta),
        split: true,
    })
}

/// Linear scan for the edge whose geometry lies closest to `key`. Ties keep
/// the edge seen first.
fn nearest_edge(graph: &StreetGraph, key: NodeKey) -> Option<(EdgeIndex, Projection)> {
    let query = key.coord();
    let mut best: Option<(EdgeIndex, Projection)> = None;

    for edge in graph.graph.edge_indices() {
        let Some(weight) = graph.graph.edge_weight(edge) else {
            continue;
        };
        let Some(projection) = project_onto(&weight.geometry, query) else {
            continue;
        };
        if best.is_none_or(|(_, b)| projection.distance < b.distance) {
            best = Some((edge, projection));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::{line_string, point};

    use super::*;
    use crate::{
        loading::build_street_graph,
        model::{Street, streets::NodeType},
    };

    fn straight_street() -> StreetGraph {
        build_street_graph(&[Street {
            id: "main".to_string(),
            name: Some("Main".to_string()),
            highway: Some("residential".to_string()),
            geometry: line_string![(x: 0.0, y: 0.0), (x: 300.0, y: 0.0)],
        }])
    }

    #[test]
    fn interior_point_splits_edge() {
        let mut graph = straight_street();
        let original = graph
            .edge_between(NodeKey::new(0.0, 0.0), NodeKey::new(300.0, 0.0))
            .unwrap()
            .clone();

        let insertion =
            insert_point(&mut graph, point!(x: 120.0, y: 0.0), NodeAttributes::service("b1")).unwrap();

        assert!(insertion.split);
        assert_eq!(insertion.edge.as_ref().unwrap().street_id, "main");
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node_count(), 3);

        let head = graph.edge_between(NodeKey::new(0.0, 0.0), insertion.key).unwrap();
        let tail = graph.edge_between(insertion.key, NodeKey::new(300.0, 0.0)).unwrap();
        assert_relative_eq!(head.weight + tail.weight, original.weight, epsilon = 1e-9);
        assert_eq!(head.meta, original.meta);
        assert_eq!(tail.meta, original.meta);

        let node = graph.node(insertion.key).unwrap();
        assert_eq!(node.node_type, NodeType::Service);
        assert_eq!(node.building_id.as_deref(), Some("b1"));
    }

    #[test]
    fn inserting_same_point_twice_is_idempotent() {
        let mut graph = straight_street();
        let first =
            insert_point(&mut graph, point!(x: 75.0, y: 0.0), NodeAttributes::service("b1")).unwrap();
        let nodes = graph.node_count();
        let edges = graph.edge_count();

        let second =
            insert_point(&mut graph, point!(x: 75.0, y: 0.0), NodeAttributes::service("b1")).unwrap();

        assert_eq!(first.key, second.key);
        assert!(!second.split);
        assert!(second.edge.is_none());
        assert_eq!(graph.node_count(), nodes);
        assert_eq!(graph.edge_count(), edges);
    }

    #[test]
    fn existing_node_merges_attributes() {
        let mut graph = straight_street();
        let insertion =
            insert_point(&mut graph, point!(x: 300.0, y: 0.0), NodeAttributes::plant()).unwrap();

        assert_eq!(insertion.key, NodeKey::new(300.0, 0.0));
        assert!(insertion.edge.is_none());
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node(insertion.key).unwrap().node_type, NodeType::Plant);
    }

    #[test]
    fn near_endpoint_within_tolerance_reuses_it() {
        let mut graph = straight_street();
        let insertion = insert_point_with_tolerance(
            &mut graph,
            point!(x: 0.0, y: 0.000_05),
            NodeAttributes::service("b2"),
            1e-3,
        )
        .unwrap();

        assert_eq!(insertion.key, NodeKey::new(0.0, 0.0));
        assert!(!insertion.split);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn off_street_point_becomes_split_node() {
        let mut graph = straight_street();
        let insertion =
            insert_point(&mut graph, point!(x: 100.0, y: 20.0), NodeAttributes::plant()).unwrap();

        assert!(insertion.split);
        assert_eq!(insertion.key, NodeKey::new(100.0, 20.0));
        let head = graph.edge_between(NodeKey::new(0.0, 0.0), insertion.key).unwrap();
        assert_eq!(head.geometry.0.last().copied(), Some(insertion.key.coord()));
    }

    #[test]
    fn later_insertions_snap_onto_split_edges() {
        let mut graph = straight_street();
        insert_point(&mut graph, point!(x: 100.0, y: 0.0), NodeAttributes::service("a")).unwrap();
        let second =
            insert_point(&mut graph, point!(x: 200.0, y: 0.0), NodeAttributes::service("b")).unwrap();

        assert!(second.split);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.edge_between(NodeKey::new(100.0, 0.0), second.key).is_some());
    }

    #[test]
    fn empty_graph_rejects_insertion() {
        let mut graph = StreetGraph::new();
        let result = insert_point(&mut graph, point!(x: 1.0, y: 1.0), NodeAttributes::plant());
        assert!(matches!(result, Err(Error::NoEdges)));
    }
}
