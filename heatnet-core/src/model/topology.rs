//! Dual-pipe network topology: the artifact handed to hydraulic sizing,
//! cost aggregation and visualization.

use geo::LineString;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::geometry::NodeKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipeType {
    Supply,
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    PlantToBuilding,
    BuildingToPlant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JunctionType {
    Plant,
    Consumer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    SupplyService,
    ReturnService,
}

/// Junction of the hydraulic network. Index 0 is always the plant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Junction {
    pub index: usize,
    pub id: String,
    pub junction_type: JunctionType,
    pub x: f64,
    pub y: f64,
    pub heating_load_kw: f64,
    pub temperature_c: f64,
    pub pressure_bar: f64,
}

/// Hydraulic annotations written back by the external sizing step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeSizing {
    pub diameter_m: f64,
    pub velocity_ms: f64,
    pub pressure_drop_pa_per_m: f64,
    pub compliant: bool,
}

/// One directed main pipe segment along a street edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipe {
    pub pipe_type: PipeType,
    pub from_node: NodeKey,
    pub to_node: NodeKey,
    /// Vertices in flow order
    pub coords: LineString<f64>,
    pub length_m: f64,
    /// Building whose route produced this segment
    pub building_id: String,
    pub street_id: String,
    pub street_name: Option<String>,
    pub highway_type: Option<String>,
    pub temperature_c: f64,
    pub pressure_bar: f64,
    pub flow_direction: FlowDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<PipeSizing>,
}

impl Pipe {
    /// Identity of the underlying street edge, independent of direction
    pub fn segment_key(&self) -> (NodeKey, NodeKey) {
        NodeKey::unordered_pair(self.from_node, self.to_node)
    }
}

/// Service stub between a building and its tap point on the street main
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConnection {
    pub building_id: String,
    pub service_type: ServiceType,
    /// Supply runs street -> building, return runs building -> street
    pub coords: LineString<f64>,
    pub length_m: f64,
    pub street_id: Option<String>,
    pub street_name: Option<String>,
    pub highway_type: Option<String>,
    pub heating_load_kw: f64,
    pub temperature_c: f64,
    pub follows_street: bool,
    pub connected_to_supply_pipe: bool,
    pub connected_to_return_pipe: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<PipeSizing>,
}

/// Heat sink attached to a consumer junction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumer {
    pub junction: usize,
    pub building_id: String,
    pub heating_load_kw: f64,
    pub annual_heat_demand_kwh: Option<f64>,
}

/// Aggregate network statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_supply_length_m: f64,
    pub total_return_length_m: f64,
    pub total_supply_length_km: f64,
    pub total_return_length_km: f64,
    /// Supply plus return mains
    pub total_main_length_km: f64,
    /// Both service stubs of every connected building
    pub total_service_length_m: f64,
    pub total_service_length_km: f64,
    pub average_service_length_m: f64,
    pub max_service_length_m: f64,
    pub unique_supply_segments: usize,
    pub unique_return_segments: usize,
    pub num_buildings: usize,
    /// Buildings with a path from the plant, including ones tapped at the
    /// plant node itself whose route has no main pipes
    pub num_routed_buildings: usize,
    pub num_unreachable_buildings: usize,
    pub total_heat_demand_kw: f64,
    pub total_heat_demand_mwh_a: f64,
    pub network_density_km_per_building: f64,
    pub total_pipe_length_km: f64,
    pub dual_pipe_system: bool,
    pub street_based_routing: bool,
    pub all_connections_follow_streets: bool,
    pub no_direct_connections: bool,
}

/// Complete street-routed dual-pipe network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualPipeTopology {
    pub junctions: Vec<Junction>,
    /// Supply and return segments, one set per routed building. A street
    /// edge shared by several routes appears once per route.
    pub pipes: Vec<Pipe>,
    pub service_connections: Vec<ServiceConnection>,
    pub consumers: Vec<Consumer>,
    pub stats: NetworkStats,
    pub unreachable_buildings: Vec<String>,
}

impl DualPipeTopology {
    pub fn plant(&self) -> Option<&Junction> {
        self.junctions.first()
    }

    pub fn pipes_of_type(&self, pipe_type: PipeType) -> impl Iterator<Item = &Pipe> {
        self.pipes.iter().filter(move |p| p.pipe_type == pipe_type)
    }

    pub fn pipes_for_building<'a>(&'a self, building_id: &'a str) -> impl Iterator<Item = &'a Pipe> {
        self.pipes.iter().filter(move |p| p.building_id == building_id)
    }

    /// Pipes of one type with shared street edges collapsed, first occurrence
    /// wins. Solver construction uses this to avoid duplicate elements.
    pub fn unique_pipes(&self, pipe_type: PipeType) -> Vec<&Pipe> {
        self.pipes_of_type(pipe_type)
            .unique_by(|p| p.segment_key())
            .collect()
    }

    pub fn is_fully_connected(&self) -> bool {
        self.unreachable_buildings.is_empty()
    }
}
