//! Snapping of buildings and the plant onto the street network

pub mod connections;
pub mod insertion;

pub use connections::{StreetIndex, compute_connection_records};
pub use insertion::{Insertion, insert_point, insert_point_with_tolerance};
