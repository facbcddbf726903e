//! Street routing from the plant to every building

mod dijkstra;
pub mod pipes;

pub use pipes::{RouteEdge, RoutingError, pipes_for_route, route};
