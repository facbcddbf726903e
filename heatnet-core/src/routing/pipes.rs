use geo::LineString;
use thiserror::Error;

use super::dijkstra::shortest_path;
use crate::{
    model::{
        FlowDirection, FrozenStreetGraph, NodeKey, Pipe, PipeType, geometry,
        streets::EdgeMetadata,
    },
    topology::{NetworkParameters, TopologyConfig},
};

#[derive(Error, Debug, PartialEq)]
pub enum RoutingError {
    #[error("Node {0:?} is not part of the street graph")]
    UnknownNode(NodeKey),
    #[error("No path from {from:?} to {to:?}")]
    NoPath { from: NodeKey, to: NodeKey },
    #[error("Building {0} has no connection point on the street network")]
    NoConnection(String),
}

/// One street edge along a route, oriented in supply direction
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub geometry: LineString<f64>,
    pub length_m: f64,
    pub meta: EdgeMetadata,
}

/// Shortest route from the plant node to a target node as an ordered edge
/// sequence. A target equal to the plant yields an empty route.
///
/// # Errors
///
/// Returns [`RoutingError`] if either node is missing or no path exists
pub fn route(
    graph: &FrozenStreetGraph,
    plant: NodeKey,
    target: NodeKey,
) -> Result<Vec<RouteEdge>, RoutingError> {
    let start = graph
        .node_index(plant)
        .ok_or(RoutingError::UnknownNode(plant))?;
    let end = graph
        .node_index(target)
        .ok_or(RoutingError::UnknownNode(target))?;

    let (path, _) = shortest_path(graph, start, end).ok_or(RoutingError::NoPath {
        from: plant,
        to: target,
    })?;

    let no_path = || RoutingError::NoPath {
        from: plant,
        to: target,
    };

    path.windows(2)
        .map(|pair| {
            let edge = graph.graph.find_edge(pair[0], pair[1]).ok_or_else(no_path)?;
            let weight = graph.graph.edge_weight(edge).ok_or_else(no_path)?;
            Ok(RouteEdge {
                from: graph.key_of(pair[0]).ok_or_else(no_path)?,
                to: graph.key_of(pair[1]).ok_or_else(no_path)?,
                geometry: graph
                    .oriented_geometry(edge, pair[0])
                    .ok_or_else(no_path)?,
                length_m: weight.weight,
                meta: weight.meta.clone(),
            })
        })
        .collect()
}

/// Supply pipes in path order followed by return pipes in reverse order,
/// one per route edge each.
pub fn pipes_for_route(
    route: &[RouteEdge],
    building_id: &str,
    params: &NetworkParameters,
    config: &TopologyConfig,
) -> (Vec<Pipe>, Vec<Pipe>) {
    let return_pressure = config.return_pressure_bar(params.supply_pressure_bar);

    let supply = route
        .iter()
        .map(|edge| Pipe {
            pipe_type: PipeType::Supply,
            from_node: edge.from,
            to_node: edge.to,
            coords: edge.geometry.clone(),
            length_m: edge.length_m,
            building_id: building_id.to_string(),
            street_id: edge.meta.street_id.clone(),
            street_name: edge.meta.street_name.clone(),
            highway_type: edge.meta.highway_type.clone(),
            temperature_c: params.supply_temp_c,
            pressure_bar: params.supply_pressure_bar,
            flow_direction: FlowDirection::PlantToBuilding,
            sizing: None,
        })
        .collect();

    let ret = route
        .iter()
        .rev()
        .map(|edge| Pipe {
            pipe_type: PipeType::Return,
            from_node: edge.to,
            to_node: edge.from,
            coords: geometry::reversed(&edge.geometry),
            length_m: edge.length_m,
            building_id: building_id.to_string(),
            street_id: edge.meta.street_id.clone(),
            street_name: edge.meta.street_name.clone(),
            highway_type: edge.meta.highway_type.clone(),
            temperature_c: params.return_temp_c,
            pressure_bar: return_pressure,
            flow_direction: FlowDirection::BuildingToPlant,
            sizing: None,
        })
        .collect();

    (supply, ret)
}
