pub use crate::Error;

// Pipeline entry points
pub use crate::loading::geojson::{read_buildings, read_streets};
pub use crate::loading::{build_street_graph, ensure_connected};
pub use crate::model::crs::{CoordinateSystem, LocalTangentPlane, normalize_layers};
pub use crate::snapping::{compute_connection_records, insert_point};
pub use crate::routing::{RoutingError, route};
pub use crate::topology::mst::{build_mst_topology, tree_length, tree_segments};
pub use crate::topology::{NetworkParameters, TopologyConfig, build_dual_pipe_topology};

// Core types for the street network
pub use crate::model::NodeKey;
pub use crate::model::streets::{NodeAttributes, NodeType};
pub use crate::model::{FrozenStreetGraph, StreetGraph};

// Input layers and the resulting topology
pub use crate::model::{
    Building, ConnectionRecord, Consumer, DualPipeTopology, FlowDirection, Junction,
    JunctionType, NetworkStats, Pipe, PipeSizing, PipeType, ServiceConnection, ServiceType,
    Street,
};
