//! Input layers consumed by network synthesis: buildings, streets and the
//! per-building connection records derived from them.

use geo::{Centroid, LineString, MultiPolygon, Point};
use serde::{Deserialize, Serialize};

/// A heated building (consumer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    /// Resolved building id (`GebaeudeID` if present, else `building_id`)
    pub id: String,
    pub geometry: MultiPolygon<f64>,
    /// Design heating load
    pub heating_load_kw: f64,
    pub annual_heat_demand_kwh: Option<f64>,
}

impl Building {
    /// Polygon centroid, `None` for an empty footprint
    pub fn centroid(&self) -> Option<Point<f64>> {
        self.geometry.centroid()
    }
}

/// A street polyline with its descriptive attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Street {
    pub id: String,
    pub name: Option<String>,
    /// OSM `highway` class
    pub highway: Option<String>,
    pub geometry: LineString<f64>,
}

/// Where and how a building attaches to the street network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub building_id: String,
    pub centroid: Point<f64>,
    /// Nearest point on the street network
    pub connection_point: Point<f64>,
    /// Length of the service stub from centroid to connection point
    pub service_distance_m: f64,
    pub street_id: Option<String>,
    pub street_name: Option<String>,
    pub highway_type: Option<String>,
    pub heating_load_kw: f64,
}
