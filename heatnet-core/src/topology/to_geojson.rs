use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, GeometryValue};
use serde_json::json;

use crate::{
    Error,
    model::{DualPipeTopology, Junction, Pipe, ServiceConnection},
};

impl DualPipeTopology {
    /// Converts the network to a `GeoJSON` `FeatureCollection`: main pipes
    /// and service stubs as lines, junctions as points.
    ///
    /// # Errors
    ///
    /// Returns an error if a feature cannot be assembled
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features =
            Vec::with_capacity(self.pipes.len() + self.service_connections.len() + self.junctions.len());

        for pipe in &self.pipes {
            features.push(pipe_feature(pipe)?);
        }
        for service in &self.service_connections {
            features.push(service_feature(service)?);
        }
        for junction in &self.junctions {
            features.push(junction_feature(junction)?);
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn pipe_feature(pipe: &Pipe) -> Result<Feature, Error> {
    let value = json!({
        "type": "Feature",
        "geometry": Geometry::new(GeometryValue::from(&pipe.coords)),
        "properties": {
            "feature_type": "main_pipe",
            "pipe_type": pipe.pipe_type,
            "flow_direction": pipe.flow_direction,
            "building_id": pipe.building_id,
            "street_id": pipe.street_id,
            "street_name": pipe.street_name,
            "highway_type": pipe.highway_type,
            "length_m": pipe.length_m,
            "temperature_c": pipe.temperature_c,
            "pressure_bar": pipe.pressure_bar,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn service_feature(service: &ServiceConnection) -> Result<Feature, Error> {
    let value = json!({
        "type": "Feature",
        "geometry": Geometry::new(GeometryValue::from(&service.coords)),
        "properties": {
            "feature_type": "service_connection",
            "service_type": service.service_type,
            "building_id": service.building_id,
            "street_id": service.street_id,
            "length_m": service.length_m,
            "heating_load_kw": service.heating_load_kw,
            "temperature_c": service.temperature_c,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn junction_feature(junction: &Junction) -> Result<Feature, Error> {
    let point = Point::new(junction.x, junction.y);
    let value = json!({
        "type": "Feature",
        "geometry": Geometry::new(GeometryValue::from(&point)),
        "properties": {
            "feature_type": "junction",
            "junction_type": junction.junction_type,
            "index": junction.index,
            "id": junction.id,
            "heating_load_kw": junction.heating_load_kw,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
