use geo::{LineString, Point};
use hashbrown::{HashMap, HashSet};
use log::{debug, info, warn};
use rayon::prelude::*;

use super::{NetworkParameters, TopologyConfig, stats::compute_stats};
use crate::{
    Error,
    loading::build_street_graph,
    model::{
        Building, ConnectionRecord, Consumer, DualPipeTopology, Junction, JunctionType, NodeKey,
        Pipe, ServiceConnection, ServiceType, Street,
        streets::{EdgeMetadata, NodeAttributes},
    },
    routing::{RoutingError, pipes_for_route, route},
    snapping::{StreetIndex, insert_point_with_tolerance},
};

/// A building's tap point after insertion into the street graph
struct SnappedBuilding<'a> {
    record: &'a ConnectionRecord,
    key: NodeKey,
    edge: Option<EdgeMetadata>,
}

/// Builds the street-routed dual-pipe network for a set of buildings.
///
/// The street graph is built and repaired, the plant is moved to the closest
/// point on any street and inserted, then every connection point follows in
/// order, and each building is routed from the plant over the frozen graph.
/// Junction 0 keeps the plant's given location. Buildings that cannot be
/// routed (or have no connection record) end up in `unreachable_buildings`
/// instead of failing the whole run.
///
/// # Errors
///
/// Returns [`Error::NoBuildings`] or [`Error::NoStreets`] for empty inputs,
/// [`Error::InvalidData`] for a non-finite plant location and
/// [`Error::NoEdges`] if the streets yield no usable edge.
pub fn build_dual_pipe_topology(
    buildings: &[Building],
    streets: &[Street],
    plant: Point<f64>,
    params: &NetworkParameters,
    connections: &[ConnectionRecord],
    config: &TopologyConfig,
) -> Result<DualPipeTopology, Error> {
    if buildings.is_empty() {
        return Err(Error::NoBuildings);
    }
    if streets.is_empty() {
        return Err(Error::NoStreets);
    }

    if !(plant.x().is_finite() && plant.y().is_finite()) {
        return Err(Error::InvalidData(format!(
            "plant location ({}, {}) is not a finite coordinate",
            plant.x(),
            plant.y()
        )));
    }

    let mut graph = build_street_graph(streets);

    let (plant_tap, plant_gap, plant_street) =
        StreetIndex::new(streets).nearest(plant).ok_or(Error::NoEdges)?;
    let plant_key = insert_point_with_tolerance(
        &mut graph,
        plant_tap,
        NodeAttributes::plant(),
        config.snap_tolerance,
    )?
    .key;
    info!(
        "Plant attached to street {} at {plant_key:?}, {plant_gap:.1} m from its location",
        plant_street.id
    );

    let building_ids: HashSet<&str> = buildings.iter().map(|b| b.id.as_str()).collect();
    let mut snapped: HashMap<&str, SnappedBuilding<'_>> = HashMap::with_capacity(connections.len());
    for record in connections {
        if !building_ids.contains(record.building_id.as_str()) {
            warn!(
                "Connection record for unknown building {} - skipping",
                record.building_id
            );
            continue;
        }
        let insertion = insert_point_with_tolerance(
            &mut graph,
            record.connection_point,
            NodeAttributes::service(record.building_id.clone()),
            config.snap_tolerance,
        )?;
        snapped.insert(
            record.building_id.as_str(),
            SnappedBuilding {
                record,
                key: insertion.key,
                edge: insertion.edge,
            },
        );
    }
    info!(
        "Inserted {} building connections, graph now has {} nodes and {} edges",
        snapped.len(),
        graph.node_count(),
        graph.edge_count()
    );

    let graph = graph.freeze();

    let routes: Vec<Result<Vec<_>, RoutingError>> = buildings
        .par_iter()
        .map(|building| match snapped.get(building.id.as_str()) {
            Some(s) => route(&graph, plant_key, s.key),
            None => Err(RoutingError::NoConnection(building.id.clone())),
        })
        .collect();

    let mut pipes: Vec<Pipe> = Vec::new();
    let mut return_pipes: Vec<Pipe> = Vec::new();
    let mut unreachable: Vec<String> = Vec::new();
    for (building, result) in buildings.iter().zip(routes) {
        match result {
            Ok(edges) => {
                let (supply, ret) = pipes_for_route(&edges, &building.id, params, config);
                pipes.extend(supply);
                return_pipes.extend(ret);
            }
            Err(e) => {
                debug!("Building {} not routed: {e}", building.id);
                unreachable.push(building.id.clone());
            }
        }
    }
    pipes.extend(return_pipes);

    if unreachable.is_empty() {
        info!("Routed all {} buildings", buildings.len());
    } else {
        warn!(
            "Routed {} buildings, {} unreachable: {:?}",
            buildings.len() - unreachable.len(),
            unreachable.len(),
            unreachable
        );
    }

    let served: Vec<&SnappedBuilding<'_>> = buildings
        .iter()
        .filter_map(|b| snapped.get(b.id.as_str()))
        .collect();

    let service_connections = served
        .iter()
        .flat_map(|s| service_pair(s, params))
        .collect();

    let (junctions, consumers) = junctions_and_consumers(buildings, plant, &snapped, params);

    let served_records: Vec<&ConnectionRecord> = served.iter().map(|s| s.record).collect();
    let stats = compute_stats(buildings, &pipes, &served_records, &unreachable, config);

    Ok(DualPipeTopology {
        junctions,
        pipes,
        service_connections,
        consumers,
        stats,
        unreachable_buildings: unreachable,
    })
}

/// Supply (street -> building) and return (building -> street) service stubs.
/// Street attributes come from the insertion, falling back to the record.
fn service_pair(snapped: &SnappedBuilding<'_>, params: &NetworkParameters) -> [ServiceConnection; 2] {
    let record = snapped.record;
    let (street_id, street_name, highway_type) = match &snapped.edge {
        Some(meta) => (
            Some(meta.street_id.clone()),
            meta.street_name.clone(),
            meta.highway_type.clone(),
        ),
        None => (
            record.street_id.clone(),
            record.street_name.clone(),
            record.highway_type.clone(),
        ),
    };

    let stub = |service_type: ServiceType, coords: LineString<f64>, temperature_c: f64| {
        ServiceConnection {
            building_id: record.building_id.clone(),
            service_type,
            coords,
            length_m: record.service_distance_m,
            street_id: street_id.clone(),
            street_name: street_name.clone(),
            highway_type: highway_type.clone(),
            heating_load_kw: record.heating_load_kw,
            temperature_c,
            follows_street: true,
            connected_to_supply_pipe: true,
            connected_to_return_pipe: true,
            sizing: None,
        }
    };

    let street_side = record.connection_point.0;
    let building_side = record.centroid.0;
    [
        stub(
            ServiceType::SupplyService,
            LineString::new(vec![street_side, building_side]),
            params.supply_temp_c,
        ),
        stub(
            ServiceType::ReturnService,
            LineString::new(vec![building_side, street_side]),
            params.return_temp_c,
        ),
    ]
}

/// Junction 0 is the plant, followed by one consumer junction per building.
/// A building without footprint centroid is placed at its connection
/// record's centroid; with neither it gets no junction or consumer.
fn junctions_and_consumers(
    buildings: &[Building],
    plant: Point<f64>,
    snapped: &HashMap<&str, SnappedBuilding<'_>>,
    params: &NetworkParameters,
) -> (Vec<Junction>, Vec<Consumer>) {
    let mut junctions = Vec::with_capacity(buildings.len() + 1);
    junctions.push(Junction {
        index: 0,
        id: "plant".to_string(),
        junction_type: JunctionType::Plant,
        x: plant.x(),
        y: plant.y(),
        heating_load_kw: 0.0,
        temperature_c: params.supply_temp_c,
        pressure_bar: params.supply_pressure_bar,
    });

    let mut consumers = Vec::with_capacity(buildings.len());
    for building in buildings {
        let centroid = building
            .centroid()
            .or_else(|| snapped.get(building.id.as_str()).map(|s| s.record.centroid));
        let Some(centroid) = centroid else {
            warn!("Building {} has no location - no junction created", building.id);
            continue;
        };
        let index = junctions.len();
        junctions.push(Junction {
            index,
            id: building.id.clone(),
            junction_type: JunctionType::Consumer,
            x: centroid.x(),
            y: centroid.y(),
            heating_load_kw: building.heating_load_kw,
            temperature_c: params.supply_temp_c,
            pressure_bar: params.supply_pressure_bar,
        });
        consumers.push(Consumer {
            junction: index,
            building_id: building.id.clone(),
            heating_load_kw: building.heating_load_kw,
            annual_heat_demand_kwh: building.annual_heat_demand_kwh,
        });
    }

    (junctions, consumers)
}
