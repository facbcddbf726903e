use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use geo::{LineString, MapCoordsInPlace, Point};
use heatnet_core::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::RunConfig;

/// One straight link of the fallback tree
#[derive(Debug, Serialize)]
struct MstLink {
    from_id: String,
    to_id: String,
    coords: LineString<f64>,
    length_m: f64,
}

/// Fallback output, explicitly flagged as not following streets
#[derive(Debug, Serialize)]
struct MstOutput {
    street_based_routing: bool,
    total_length_m: f64,
    links: Vec<MstLink>,
}

pub fn run(config: &RunConfig) -> anyhow::Result<()> {
    let mut buildings = read_buildings(&config.buildings)
        .with_context(|| format!("loading buildings from {}", config.buildings.display()))?;
    let mut streets = read_streets(&config.streets)
        .with_context(|| format!("loading streets from {}", config.streets.display()))?;
    let mut plant = config.plant;

    let plane = normalize_layers(&mut buildings, &mut streets, &mut plant);

    if config.mst {
        let mut output = mst_output(&buildings, plant);
        if let Some(plane) = plane {
            for link in &mut output.links {
                link.coords.map_coords_in_place(|c| plane.unproject(c));
            }
        }
        warn!(
            "MST mode: {} straight links, {:.1} m total, ignoring streets",
            output.links.len(),
            output.total_length_m
        );
        return write_json(&config.output, &output);
    }

    let connections = compute_connection_records(&buildings, &streets);
    let mut topology = build_dual_pipe_topology(
        &buildings,
        &streets,
        plant,
        &config.network,
        &connections,
        &config.constants,
    )
    .context("building dual-pipe topology")?;

    log_summary(&topology.stats);

    if let Some(plane) = plane {
        info!("Mapping output geometry back to lon/lat");
        plane.unproject_topology(&mut topology);
    }

    write_json(&config.output, &topology)?;
    if let Some(path) = &config.geojson {
        let geojson = topology.to_geojson_string()?;
        std::fs::write(path, geojson)
            .with_context(|| format!("writing GeoJSON to {}", path.display()))?;
        info!("GeoJSON written to {}", path.display());
    }

    Ok(())
}

fn mst_output(buildings: &[Building], plant: Point<f64>) -> MstOutput {
    let mut ids = vec!["plant".to_string()];
    let mut points = vec![plant];
    for building in buildings {
        if let Some(centroid) = building.centroid() {
            ids.push(building.id.clone());
            points.push(centroid);
        }
    }

    let (tree, positions) = build_mst_topology(&points);
    let links = tree_segments(&tree, &positions)
        .into_iter()
        .map(|(a, b, line, length_m)| MstLink {
            from_id: ids[a].clone(),
            to_id: ids[b].clone(),
            coords: LineString::from(line),
            length_m,
        })
        .collect();

    MstOutput {
        street_based_routing: false,
        total_length_m: tree_length(&tree),
        links,
    }
}

fn log_summary(stats: &NetworkStats) {
    info!(
        "Network: {} of {} buildings routed, supply {:.3} km, return {:.3} km, service {:.3} km",
        stats.num_routed_buildings,
        stats.num_buildings,
        stats.total_supply_length_km,
        stats.total_return_length_km,
        stats.total_service_length_km
    );
    info!(
        "{} unique supply segments, {:.1} kW total load, {:.3} km/building",
        stats.unique_supply_segments,
        stats.total_heat_demand_kw,
        stats.network_density_km_per_building
    );
    if stats.num_unreachable_buildings > 0 {
        warn!("{} buildings could not be connected", stats.num_unreachable_buildings);
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    info!("Topology written to {}", path.display());
    Ok(())
}
