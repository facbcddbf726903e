//! Assembly of the dual-pipe network topology and its MST fallback

mod config;
pub mod dual_pipe;
pub mod mst;
pub mod stats;
mod to_geojson;

pub use config::{NetworkParameters, TopologyConfig};
pub use dual_pipe::build_dual_pipe_topology;
pub use mst::build_mst_topology;
pub use stats::compute_stats;
