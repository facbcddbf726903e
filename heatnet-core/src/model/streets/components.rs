//! Street network components - nodes, edges and their attributes

use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::model::geometry::NodeKey;

/// `street_id` carried by edges added to bridge disconnected components
pub const CONNECTIVITY_FIX_ID: &str = "connectivity_fix";

/// Role of a node in the heating network
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Plain street vertex
    #[default]
    Street,
    /// Heat source
    Plant,
    /// Tap point of a building service connection
    Service,
    /// Street vertex that anchors a bridge between disconnected components
    ConnectivityFix,
}

/// Street graph node
#[derive(Debug, Clone, Serialize)]
pub struct StreetNode {
    pub key: NodeKey,
    pub node_type: NodeType,
    /// Building served through this node, for service nodes
    pub building_id: Option<String>,
    pub name: Option<String>,
}

impl StreetNode {
    pub fn street(key: NodeKey) -> Self {
        Self {
            key,
            node_type: NodeType::Street,
            building_id: None,
            name: None,
        }
    }

    /// Overwrites every attribute that `attrs` sets
    pub fn merge(&mut self, attrs: NodeAttributes) {
        if let Some(node_type) = attrs.node_type {
            self.node_type = node_type;
        }
        if attrs.building_id.is_some() {
            self.building_id = attrs.building_id;
        }
        if attrs.name.is_some() {
            self.name = attrs.name;
        }
    }
}

/// Caller-supplied attributes for a node created or matched by point insertion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAttributes {
    pub node_type: Option<NodeType>,
    pub building_id: Option<String>,
    pub name: Option<String>,
}

impl NodeAttributes {
    pub fn plant() -> Self {
        Self {
            node_type: Some(NodeType::Plant),
            building_id: None,
            name: Some("plant".to_string()),
        }
    }

    pub fn service(building_id: impl Into<String>) -> Self {
        Self {
            node_type: Some(NodeType::Service),
            building_id: Some(building_id.into()),
            name: None,
        }
    }
}

/// Descriptive attributes of the street a graph edge belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    pub street_id: String,
    pub street_name: Option<String>,
    pub highway_type: Option<String>,
}

impl EdgeMetadata {
    pub fn connectivity_fix() -> Self {
        Self {
            street_id: CONNECTIVITY_FIX_ID.to_string(),
            street_name: None,
            highway_type: Some("service".to_string()),
        }
    }

    pub fn is_connectivity_fix(&self) -> bool {
        self.street_id == CONNECTIVITY_FIX_ID
    }
}

/// Street graph edge (street segment)
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Euclidean length of `geometry` in meters
    pub weight: f64,
    /// Vertices ordered from the edge's first endpoint to its second
    pub geometry: LineString<f64>,
    pub meta: EdgeMetadata,
}
