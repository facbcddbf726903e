use std::path::PathBuf;

use clap::Parser;

/// Street-routed dual-pipe district heating network synthesis
#[derive(Parser, Default, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(long, short, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "GeoJSON layer with building footprints")]
    pub buildings: Option<PathBuf>,
    #[arg(long, help = "GeoJSON layer with street centerlines")]
    pub streets: Option<PathBuf>,
    #[arg(long, short, help = "Where to write the topology as JSON")]
    pub output: Option<PathBuf>,
    #[arg(long, help = "Also write the topology as a GeoJSON FeatureCollection")]
    pub geojson: Option<PathBuf>,
    #[arg(long, allow_hyphen_values = true, help = "Plant x coordinate (or longitude)")]
    pub plant_x: Option<f64>,
    #[arg(long, allow_hyphen_values = true, help = "Plant y coordinate (or latitude)")]
    pub plant_y: Option<f64>,
    #[arg(long, help = "Supply temperature in °C")]
    pub supply_temp: Option<f64>,
    #[arg(long, help = "Return temperature in °C")]
    pub return_temp: Option<f64>,
    #[arg(long, help = "Supply pressure at the plant in bar")]
    pub supply_pressure: Option<f64>,
    #[arg(
        long,
        default_value_t = false,
        help = "Only build the straight-line MST over plant and buildings (not street-based)"
    )]
    pub mst: bool,
}
