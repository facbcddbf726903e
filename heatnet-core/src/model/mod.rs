//! Data model for street-routed district heating networks
//!
//! Contains the input layers, the street graph and the dual-pipe topology
//! produced from them.

pub mod buildings;
pub mod crs;
pub mod geometry;
pub mod streets;
pub mod topology;

pub use buildings::{Building, ConnectionRecord, Street};
pub use geometry::NodeKey;
pub use streets::{FrozenStreetGraph, StreetGraph};
pub use topology::{
    Consumer, DualPipeTopology, FlowDirection, Junction, JunctionType, NetworkStats, Pipe,
    PipeSizing, PipeType, ServiceConnection, ServiceType,
};
