//! Street-constrained dual-pipe district heating network synthesis.
//!
//! Street polylines become a connected, length-weighted graph; the plant and
//! every building connection point are inserted into it (splitting edges
//! where needed); each building is then routed from the plant along the
//! streets to produce paired supply and return pipes.

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod snapping;
pub mod topology;

pub use error::Error;
pub use loading::build_street_graph;
pub use model::{
    Building, ConnectionRecord, DualPipeTopology, FrozenStreetGraph, NodeKey, Street, StreetGraph,
};
pub use topology::{NetworkParameters, TopologyConfig, build_dual_pipe_topology};
