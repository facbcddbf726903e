//! Street graph: an undirected, length-weighted graph keyed by rounded
//! coordinates.

use std::ops::Deref;

use geo::LineString;
use hashbrown::HashMap;
use petgraph::{
    stable_graph::{EdgeIndex, NodeIndex, StableUnGraph},
    unionfind::UnionFind,
    visit::{EdgeRef, IntoEdgeReferences, NodeIndexable},
};

use super::components::{EdgeMetadata, StreetEdge, StreetNode};
use crate::model::geometry::{self, NodeKey};

/// Mutable street network used during construction and point insertion.
///
/// Edges may be removed (splitting), nodes never are, so node indices stay
/// valid for the lifetime of the graph.
#[derive(Debug, Clone, Default)]
pub struct StreetGraph {
    pub(crate) graph: StableUnGraph<StreetNode, StreetEdge>,
    node_index: HashMap<NodeKey, NodeIndex>,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_index(&self, key: NodeKey) -> Option<NodeIndex> {
        self.node_index.get(&key).copied()
    }

    pub fn node(&self, key: NodeKey) -> Option<&StreetNode> {
        self.node_index(key)
            .and_then(|idx| self.graph.node_weight(idx))
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Option<&mut StreetNode> {
        let idx = self.node_index(key)?;
        self.graph.node_weight_mut(idx)
    }

    pub(crate) fn key_of(&self, idx: NodeIndex) -> Option<NodeKey> {
        self.graph.node_weight(idx).map(|node| node.key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StreetNode> {
        self.graph.node_weights()
    }

    /// All edges as `(first endpoint, second endpoint, edge)`, geometry
    /// oriented from the first endpoint to the second
    pub fn edges(&self) -> impl Iterator<Item = (NodeKey, NodeKey, &StreetEdge)> {
        self.graph.edge_references().filter_map(|edge| {
            Some((
                self.key_of(edge.source())?,
                self.key_of(edge.target())?,
                edge.weight(),
            ))
        })
    }

    pub fn edge_between(&self, a: NodeKey, b: NodeKey) -> Option<&StreetEdge> {
        let edge = self.graph.find_edge(self.node_index(a)?, self.node_index(b)?)?;
        self.graph.edge_weight(edge)
    }

    /// Returns the node for `key`, creating a plain street node if missing
    pub fn get_or_add_node(&mut self, key: NodeKey) -> NodeIndex {
        if let Some(idx) = self.node_index(key) {
            return idx;
        }
        self.add_node(StreetNode::street(key))
    }

    pub(crate) fn add_node(&mut self, node: StreetNode) -> NodeIndex {
        let key = node.key;
        let idx = self.graph.add_node(node);
        self.node_index.insert(key, idx);
        idx
    }

    /// Adds an edge whose geometry runs from `a` to `b`, weighted by the
    /// geometry's Euclidean length.
    ///
    /// Self loops are dropped. If the node pair is already connected the
    /// lighter of the two edges is kept. Returns the index of the edge that
    /// connects `a` and `b` afterwards, `None` if nothing was added.
    pub fn add_edge(
        &mut self,
        a: NodeKey,
        b: NodeKey,
        geometry: LineString<f64>,
        meta: EdgeMetadata,
    ) -> Option<EdgeIndex> {
        if a == b {
            return None;
        }

        let weight = geometry::length(&geometry);
        let ia = self.get_or_add_node(a);
        let ib = self.get_or_add_node(b);

        if let Some(existing) = self.graph.find_edge(ia, ib) {
            let (first, _) = self.graph.edge_endpoints(existing)?;
            let current = self.graph.edge_weight_mut(existing)?;
            if weight < current.weight {
                current.weight = weight;
                current.geometry = if first == ia {
                    geometry
                } else {
                    geometry::reversed(&geometry)
                };
                current.meta = meta;
            }
            return Some(existing);
        }

        Some(self.graph.add_edge(
            ia,
            ib,
            StreetEdge {
                weight,
                geometry,
                meta,
            },
        ))
    }

    pub(crate) fn remove_edge(&mut self, edge: EdgeIndex) -> Option<StreetEdge> {
        self.graph.remove_edge(edge)
    }

    /// Geometry of `edge` oriented so that it starts at node `from`
    pub(crate) fn oriented_geometry(&self, edge: EdgeIndex, from: NodeIndex) -> Option<LineString<f64>> {
        let (first, _) = self.graph.edge_endpoints(edge)?;
        let weight = self.graph.edge_weight(edge)?;
        if first == from {
            Some(weight.geometry.clone())
        } else {
            Some(geometry::reversed(&weight.geometry))
        }
    }

    /// Connected components in node iteration order. The first component is
    /// the one holding the first node.
    pub fn components(&self) -> Vec<Vec<NodeIndex>> {
        let mut sets = UnionFind::<usize>::new(self.graph.node_bound());
        for edge in self.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut order: HashMap<usize, usize> = HashMap::new();
        let mut components: Vec<Vec<NodeIndex>> = Vec::new();
        for idx in self.graph.node_indices() {
            let root = sets.find(idx.index());
            let slot = *order.entry(root).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(idx);
        }

        components
    }

    pub fn component_count(&self) -> usize {
        self.components().len()
    }

    /// Ends the mutation phase; routing only accepts a frozen graph
    pub fn freeze(self) -> FrozenStreetGraph {
        FrozenStreetGraph { inner: self }
    }
}

/// Read-only street graph handed to routing once all points are inserted.
///
/// Dereferences to [`StreetGraph`] but exposes no way back to `&mut`, so
/// concurrent shortest path queries cannot observe a split in progress.
#[derive(Debug, Clone)]
pub struct FrozenStreetGraph {
    inner: StreetGraph,
}

impl Deref for FrozenStreetGraph {
    type Target = StreetGraph;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use super::*;

    fn meta(id: &str) -> EdgeMetadata {
        EdgeMetadata {
            street_id: id.to_string(),
            street_name: None,
            highway_type: None,
        }
    }

    #[test]
    fn duplicate_edge_keeps_lighter_copy() {
        let mut graph = StreetGraph::new();
        let a = NodeKey::new(0.0, 0.0);
        let b = NodeKey::new(10.0, 0.0);

        graph.add_edge(a, b, line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 5.0), (x: 10.0, y: 0.0)], meta("long"));
        graph.add_edge(b, a, line_string![(x: 10.0, y: 0.0), (x: 0.0, y: 0.0)], meta("short"));

        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edge_between(a, b).unwrap();
        assert_eq!(edge.meta.street_id, "short");
        assert!((edge.weight - 10.0).abs() < 1e-9);
        // stored orientation follows the first insertion (a -> b)
        assert_eq!(NodeKey::from(edge.geometry.0[0]), a);
    }

    #[test]
    fn self_loops_are_dropped() {
        let mut graph = StreetGraph::new();
        let a = NodeKey::new(1.0, 1.0);
        assert!(graph.add_edge(a, a, line_string![(x: 1.0, y: 1.0), (x: 1.0, y: 1.0)], meta("s")).is_none());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn components_are_reported_in_node_order() {
        let mut graph = StreetGraph::new();
        graph.add_edge(NodeKey::new(0.0, 0.0), NodeKey::new(1.0, 0.0), line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)], meta("a"));
        graph.add_edge(NodeKey::new(5.0, 0.0), NodeKey::new(6.0, 0.0), line_string![(x: 5.0, y: 0.0), (x: 6.0, y: 0.0)], meta("b"));

        let components = graph.components();
        assert_eq!(components.len(), 2);
        assert_eq!(graph.key_of(components[0][0]), Some(NodeKey::new(0.0, 0.0)));
    }
}
