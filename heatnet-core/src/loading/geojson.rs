//! GeoJSON input of building footprints and street centerlines

use std::path::Path;

use geo::{Geometry, LineString, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson};
use log::{info, warn};
use serde_json::Value as JsonValue;

use crate::{
    Error,
    model::{Building, Street},
};

/// Property names holding the building id, in lookup order
const BUILDING_ID_PROPERTIES: [&str; 2] = ["GebaeudeID", "building_id"];
const STREET_ID_PROPERTIES: [&str; 3] = ["id", "osm_id", "street_id"];

/// Reads building footprints from a GeoJSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a `FeatureCollection`
pub fn read_buildings(path: &Path) -> Result<Vec<Building>, Error> {
    let buildings = buildings_from_collection(read_collection(path)?);
    info!("Loaded {} buildings from {}", buildings.len(), path.display());
    Ok(buildings)
}

/// Reads street centerlines from a GeoJSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a `FeatureCollection`
pub fn read_streets(path: &Path) -> Result<Vec<Street>, Error> {
    let streets = streets_from_collection(read_collection(path)?);
    info!("Loaded {} street polylines from {}", streets.len(), path.display());
    Ok(streets)
}

/// Parses a `FeatureCollection` from GeoJSON text
///
/// # Errors
///
/// Returns an error if the text is not valid GeoJSON or not a collection
pub fn parse_collection(text: &str) -> Result<FeatureCollection, Error> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| Error::GeoJsonError(e.to_string()))?;
    FeatureCollection::try_from(geojson).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn read_collection(path: &Path) -> Result<FeatureCollection, Error> {
    let text = std::fs::read_to_string(path)?;
    parse_collection(&text)
}

/// Converts polygon features into buildings. Features without an areal
/// geometry are skipped with a warning.
pub fn buildings_from_collection(collection: FeatureCollection) -> Vec<Building> {
    collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(idx, feature)| {
            let id = first_string_property(&feature, &BUILDING_ID_PROPERTIES)
                .unwrap_or_else(|| format!("building_{idx}"));
            let heating_load_kw = number_property(&feature, "heating_load_kw").unwrap_or(0.0);
            let annual_heat_demand_kwh = number_property(&feature, "annual_heat_demand_kwh");

            let geometry = match feature_geometry(feature) {
                Some(Geometry::Polygon(polygon)) => MultiPolygon::new(vec![polygon]),
                Some(Geometry::MultiPolygon(multi)) => multi,
                _ => {
                    warn!("Building {id} has no polygon geometry - skipping");
                    return None;
                }
            };

            Some(Building {
                id,
                geometry,
                heating_load_kw,
                annual_heat_demand_kwh,
            })
        })
        .collect()
}

/// Converts line features into streets. Each part of a `MultiLineString`
/// becomes its own street sharing the feature's attributes.
pub fn streets_from_collection(collection: FeatureCollection) -> Vec<Street> {
    let mut streets = Vec::with_capacity(collection.features.len());

    for (idx, feature) in collection.features.into_iter().enumerate() {
        let id = first_string_property(&feature, &STREET_ID_PROPERTIES)
            .unwrap_or_else(|| format!("street_{idx}"));
        let name = string_property(&feature, "name");
        let highway = string_property(&feature, "highway");

        let parts: Vec<LineString<f64>> = match feature_geometry(feature) {
            Some(Geometry::LineString(line)) => vec![line],
            Some(Geometry::MultiLineString(multi)) => multi.0,
            _ => {
                warn!("Street {id} has no line geometry - skipping");
                continue;
            }
        };

        for line in parts.into_iter().filter(|line| line.0.len() >= 2) {
            streets.push(Street {
                id: id.clone(),
                name: name.clone(),
                highway: highway.clone(),
                geometry: line,
            });
        }
    }

    streets
}

fn feature_geometry(feature: Feature) -> Option<Geometry<f64>> {
    let geometry = feature.geometry?;
    Geometry::<f64>::try_from(geometry)
        .inspect_err(|e| warn!("Unsupported feature geometry: {e}"))
        .ok()
}

fn string_property(feature: &Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_string_property(feature: &Feature, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| string_property(feature, name))
}

fn number_property(feature: &Feature, name: &str) -> Option<f64> {
    match feature.property(name)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}
