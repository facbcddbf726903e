//! This module is responsible for loading input layers (GeoJSON) and
//! turning street polylines into a connected, routable street graph.

mod builder;
pub mod connectivity;
pub mod geojson;

pub use builder::build_street_graph;
#[cfg(test)]
pub(crate) use builder::build_raw_street_graph;
pub use connectivity::{ensure_connected, is_connected};
