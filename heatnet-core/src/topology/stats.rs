use itertools::Itertools;

use super::TopologyConfig;
use crate::model::{Building, ConnectionRecord, NetworkStats, Pipe, PipeType};

/// Aggregates lengths, segment counts and demand over a finished network.
///
/// `connections` are the records of buildings that received a service
/// connection; each contributes a supply and a return stub. Every building
/// not listed in `unreachable` counts as routed, even when its route is
/// empty because it taps the street at the plant node.
#[allow(clippy::cast_precision_loss)]
pub fn compute_stats(
    buildings: &[Building],
    pipes: &[Pipe],
    connections: &[&ConnectionRecord],
    unreachable: &[String],
    config: &TopologyConfig,
) -> NetworkStats {
    let length_of = |pipe_type: PipeType| -> f64 {
        pipes
            .iter()
            .filter(|p| p.pipe_type == pipe_type)
            .map(|p| p.length_m)
            .sum()
    };
    let unique_segments = |pipe_type: PipeType| -> usize {
        pipes
            .iter()
            .filter(|p| p.pipe_type == pipe_type)
            .map(Pipe::segment_key)
            .unique()
            .count()
    };

    let total_supply_length_m = length_of(PipeType::Supply);
    let total_return_length_m = length_of(PipeType::Return);
    let main_length_m = total_supply_length_m + total_return_length_m;

    let service_sum: f64 = connections.iter().map(|c| c.service_distance_m).sum();
    let total_service_length_m = 2.0 * service_sum;
    let average_service_length_m = if connections.is_empty() {
        0.0
    } else {
        service_sum / connections.len() as f64
    };
    let max_service_length_m = connections
        .iter()
        .map(|c| c.service_distance_m)
        .fold(0.0, f64::max);

    let num_buildings = buildings.len();
    let total_heat_demand_kw: f64 = buildings.iter().map(|b| b.heating_load_kw).sum();
    let network_density_km_per_building = if num_buildings == 0 {
        0.0
    } else {
        main_length_m / 1000.0 / num_buildings as f64
    };

    NetworkStats {
        total_supply_length_m,
        total_return_length_m,
        total_supply_length_km: total_supply_length_m / 1000.0,
        total_return_length_km: total_return_length_m / 1000.0,
        total_main_length_km: main_length_m / 1000.0,
        total_service_length_m,
        total_service_length_km: total_service_length_m / 1000.0,
        average_service_length_m,
        max_service_length_m,
        unique_supply_segments: unique_segments(PipeType::Supply),
        unique_return_segments: unique_segments(PipeType::Return),
        num_buildings,
        num_routed_buildings: num_buildings.saturating_sub(unreachable.len()),
        num_unreachable_buildings: unreachable.len(),
        total_heat_demand_kw,
        total_heat_demand_mwh_a: total_heat_demand_kw * config.hours_per_year / 1000.0,
        network_density_km_per_building,
        total_pipe_length_km: (main_length_m + total_service_length_m) / 1000.0,
        dual_pipe_system: true,
        street_based_routing: true,
        all_connections_follow_streets: true,
        no_direct_connections: true,
    }
}
