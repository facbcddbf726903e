//! Coordinate system normalization.
//!
//! Every distance computed by the graph code assumes planar coordinates in
//! meters. Layers delivered in geographic lon/lat degrees are moved onto a
//! local tangent plane before anything else touches them.

use geo::{Coord, CoordsIter, MapCoordsInPlace, Point};
use log::{info, warn};

use super::{Building, DualPipeTopology, Street};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// Planar coordinates in meters
    Projected,
    /// Longitude/latitude in degrees
    Geographic,
}

/// Local tangent plane centered at `(lon0, lat0)`.
///
/// Equirectangular approximation: `x = R * cos(lat0) * dlon`, `y = R * dlat`.
/// Distortion stays well below pipe sizing accuracy at district scale.
#[derive(Debug, Clone, Copy)]
pub struct LocalTangentPlane {
    origin_lon_rad: f64,
    origin_lat_rad: f64,
    cos_lat0: f64,
}

impl LocalTangentPlane {
    const EARTH_RADIUS: f64 = 6_371_007.2;

    pub fn new(lon0: f64, lat0: f64) -> Self {
        let origin_lat_rad = lat0.to_radians();
        Self {
            origin_lon_rad: lon0.to_radians(),
            origin_lat_rad,
            cos_lat0: origin_lat_rad.cos(),
        }
    }

    /// Project `(lon, lat)` to `(x, y)` meters
    pub fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        let dlon = coord.x.to_radians() - self.origin_lon_rad;
        let dlat = coord.y.to_radians() - self.origin_lat_rad;
        Coord {
            x: Self::EARTH_RADIUS * self.cos_lat0 * dlon,
            y: Self::EARTH_RADIUS * dlat,
        }
    }

    /// Unproject `(x, y)` meters back to `(lon, lat)`
    pub fn unproject(&self, coord: Coord<f64>) -> Coord<f64> {
        let dlon = coord.x / (Self::EARTH_RADIUS * self.cos_lat0);
        let dlat = coord.y / Self::EARTH_RADIUS;
        Coord {
            x: (self.origin_lon_rad + dlon).to_degrees(),
            y: (self.origin_lat_rad + dlat).to_degrees(),
        }
    }

    /// Maps pipe, service and junction geometry of a topology built on this
    /// plane back to lon/lat. Node keys keep their planar identity.
    pub fn unproject_topology(&self, topology: &mut DualPipeTopology) {
        for pipe in &mut topology.pipes {
            pipe.coords.map_coords_in_place(|c| self.unproject(c));
        }
        for service in &mut topology.service_connections {
            service.coords.map_coords_in_place(|c| self.unproject(c));
        }
        for junction in &mut topology.junctions {
            let Coord { x, y } = self.unproject(Coord {
                x: junction.x,
                y: junction.y,
            });
            junction.x = x;
            junction.y = y;
        }
    }
}

/// Guesses the coordinate system from the value range. Any coordinate
/// outside the lon/lat domain means the data is already projected.
pub fn detect<I>(coords: I) -> CoordinateSystem
where
    I: IntoIterator<Item = Coord<f64>>,
{
    let mut seen = false;
    for coord in coords {
        seen = true;
        if !(-180.0..=180.0).contains(&coord.x) || !(-90.0..=90.0).contains(&coord.y) {
            return CoordinateSystem::Projected;
        }
    }

    if seen {
        CoordinateSystem::Geographic
    } else {
        CoordinateSystem::Projected
    }
}

/// Brings buildings, streets and the plant location into one planar system.
///
/// Projected input is left untouched. Geographic input is projected onto a
/// [`LocalTangentPlane`] centered on the mean coordinate of all layers, and
/// the plane is returned so results can be mapped back for display.
pub fn normalize_layers(
    buildings: &mut [Building],
    streets: &mut [Street],
    plant: &mut Point<f64>,
) -> Option<LocalTangentPlane> {
    let all_coords = || {
        buildings
            .iter()
            .flat_map(|b| b.geometry.coords_iter())
            .chain(streets.iter().flat_map(|s| s.geometry.coords_iter()))
            .chain(std::iter::once(plant.0))
    };

    if detect(all_coords()) == CoordinateSystem::Projected {
        info!("Input layers already use a projected coordinate system");
        return None;
    }

    let (sum_x, sum_y, count) = all_coords().fold((0.0, 0.0, 0_usize), |(sx, sy, n), c| {
        (sx + c.x, sy + c.y, n + 1)
    });
    #[allow(clippy::cast_precision_loss)]
    let plane = LocalTangentPlane::new(sum_x / count as f64, sum_y / count as f64);

    warn!(
        "Input layers look geographic (lon/lat); projecting {} buildings and {} streets onto a local tangent plane",
        buildings.len(),
        streets.len()
    );

    for building in buildings.iter_mut() {
        building
            .geometry
            .map_coords_in_place(|c| plane.project(c));
    }
    for street in streets.iter_mut() {
        street.geometry.map_coords_in_place(|c| plane.project(c));
    }
    plant.map_coords_in_place(|c| plane.project(c));

    Some(plane)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::{coord, line_string, point};

    use super::*;

    #[test]
    fn detects_projected_coordinates() {
        let coords = [coord! { x: 13.4, y: 52.5 }, coord! { x: 390_000.0, y: 5_800_000.0 }];
        assert_eq!(detect(coords), CoordinateSystem::Projected);
        assert_eq!(detect([coord! { x: 13.4, y: 52.5 }]), CoordinateSystem::Geographic);
        assert_eq!(detect(Vec::new()), CoordinateSystem::Projected);
    }

    #[test]
    fn tangent_plane_round_trips_near_origin() {
        let plane = LocalTangentPlane::new(14.33, 51.76);
        let original = coord! { x: 14.335, y: 51.762 };
        let back = plane.unproject(plane.project(original));

        assert_relative_eq!(back.x, original.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, original.y, epsilon = 1e-9);
    }

    #[test]
    fn one_millidegree_of_latitude_is_about_111_meters() {
        let plane = LocalTangentPlane::new(14.0, 51.0);
        let projected = plane.project(coord! { x: 14.0, y: 51.001 });
        assert_relative_eq!(projected.y, 111.19, epsilon = 0.01);
        assert_relative_eq!(projected.x, 0.0);
    }

    #[test]
    fn geographic_layers_are_projected_in_place() {
        let mut streets = vec![Street {
            id: "s0".to_string(),
            name: None,
            highway: None,
            geometry: line_string![(x: 14.0, y: 51.0), (x: 14.001, y: 51.0)],
        }];
        let mut plant = point!(x: 14.0, y: 51.0);

        let plane = normalize_layers(&mut [], &mut streets, &mut plant);

        assert!(plane.is_some());
        let length = crate::model::geometry::length(&streets[0].geometry);
        assert!(length > 60.0 && length < 80.0, "unexpected length {length}");
    }
}
