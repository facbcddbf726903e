use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use geo::{Point, point};
use heatnet_core::{NetworkParameters, TopologyConfig};
use serde::Deserialize;

use crate::cli::Args;

const DEFAULT_OUTPUT: &str = "topology.json";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub plant: Option<PlantConfig>,
    pub network: NetworkParameters,
    pub constants: TopologyConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub buildings: Option<PathBuf>,
    pub streets: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub topology: Option<PathBuf>,
    pub geojson: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantConfig {
    pub x: f64,
    pub y: f64,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Fully resolved settings of one run
#[derive(Debug)]
pub struct RunConfig {
    pub buildings: PathBuf,
    pub streets: PathBuf,
    pub output: PathBuf,
    pub geojson: Option<PathBuf>,
    pub plant: Point<f64>,
    pub network: NetworkParameters,
    pub constants: TopologyConfig,
    pub mst: bool,
}

impl RunConfig {
    /// Merges command line arguments over the file configuration
    pub fn resolve(args: Args, file: FileConfig) -> anyhow::Result<Self> {
        let Some(buildings) = args.buildings.or(file.input.buildings) else {
            bail!("no building layer given: use --buildings or [input] buildings");
        };
        let Some(streets) = args.streets.or(file.input.streets) else {
            bail!("no street layer given: use --streets or [input] streets");
        };

        let plant_x = args.plant_x.or(file.plant.map(|p| p.x));
        let plant_y = args.plant_y.or(file.plant.map(|p| p.y));
        let (Some(x), Some(y)) = (plant_x, plant_y) else {
            bail!("plant location missing: use --plant-x/--plant-y or a [plant] section");
        };

        let mut network = file.network;
        if let Some(t) = args.supply_temp {
            network.supply_temp_c = t;
        }
        if let Some(t) = args.return_temp {
            network.return_temp_c = t;
        }
        if let Some(p) = args.supply_pressure {
            network.supply_pressure_bar = p;
        }
        if network.return_temp_c >= network.supply_temp_c {
            bail!(
                "return temperature ({} °C) must be below supply temperature ({} °C)",
                network.return_temp_c,
                network.supply_temp_c
            );
        }

        Ok(Self {
            buildings,
            streets,
            output: args
                .output
                .or(file.output.topology)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            geojson: args.geojson.or(file.output.geojson),
            plant: point!(x: x, y: y),
            network,
            constants: file.constants,
            mst: args.mst,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const SAMPLE: &str = r#"
[input]
buildings = "data/buildings.geojson"
streets = "data/streets.geojson"

[output]
geojson = "out/network.geojson"

[plant]
x = 480219.0
y = 5711614.0

[network]
supply_temp_c = 85.0

[constants]
hours_per_year = 2000.0
"#;

    #[test]
    fn parses_all_sections() {
        let file = FileConfig::parse(SAMPLE).unwrap();

        assert_eq!(file.input.buildings, Some(PathBuf::from("data/buildings.geojson")));
        assert_relative_eq!(file.network.supply_temp_c, 85.0);
        assert_relative_eq!(file.network.return_temp_c, 40.0);
        assert_relative_eq!(file.constants.hours_per_year, 2000.0);
        assert_relative_eq!(file.constants.return_pressure_drop_bar, 0.3);
        assert!(file.plant.is_some());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("[routing]\nmode = \"fast\"\n").is_err());
    }

    #[test]
    fn command_line_overrides_file() {
        let file = FileConfig::parse(SAMPLE).unwrap();
        let args = Args {
            streets: Some(PathBuf::from("other.geojson")),
            plant_x: Some(1.0),
            supply_temp: Some(90.0),
            ..Args::default()
        };

        let config = RunConfig::resolve(args, file).unwrap();

        assert_eq!(config.streets, PathBuf::from("other.geojson"));
        assert_eq!(config.buildings, PathBuf::from("data/buildings.geojson"));
        assert_relative_eq!(config.plant.x(), 1.0);
        assert_relative_eq!(config.plant.y(), 5_711_614.0);
        assert_relative_eq!(config.network.supply_temp_c, 90.0);
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.geojson, Some(PathBuf::from("out/network.geojson")));
    }

    #[test]
    fn missing_plant_is_an_error() {
        let args = Args {
            buildings: Some(PathBuf::from("b.geojson")),
            streets: Some(PathBuf::from("s.geojson")),
            ..Args::default()
        };
        let err = RunConfig::resolve(args, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("plant location missing"));
    }

    #[test]
    fn return_must_be_colder_than_supply() {
        let args = Args {
            buildings: Some(PathBuf::from("b.geojson")),
            streets: Some(PathBuf::from("s.geojson")),
            plant_x: Some(0.0),
            plant_y: Some(0.0),
            return_temp: Some(75.0),
            ..Args::default()
        };
        assert!(RunConfig::resolve(args, FileConfig::default()).is_err());
    }
}
