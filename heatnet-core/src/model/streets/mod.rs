//! Street network model

pub mod components;
pub mod network;

pub use components::{
    CONNECTIVITY_FIX_ID, EdgeMetadata, NodeAttributes, NodeType, StreetEdge, StreetNode,
};
pub use network::{FrozenStreetGraph, StreetGraph};
