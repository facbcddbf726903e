use geo::{Line, Point};
use log::{info, warn};
use rstar::{RTree, primitives::GeomWithData};

use crate::model::{
    Building, ConnectionRecord, NodeKey, Street,
    geometry::{distance, project_onto},
};

/// A street segment tagged with the index of its street
type IndexedSegment = GeomWithData<Line<f64>, usize>;

/// Spatial index of all street segments for nearest-street queries.
/// Segments whose endpoints round to the same node key never become graph
/// edges and are left out.
pub struct StreetIndex<'a> {
    streets: &'a [Street],
    tree: RTree<IndexedSegment>,
}

impl<'a> StreetIndex<'a> {
    pub fn new(streets: &'a [Street]) -> Self {
        let segments = streets
            .iter()
            .enumerate()
            .flat_map(|(idx, street)| {
                street
                    .geometry
                    .lines()
                    .filter(|line| NodeKey::from(line.start) != NodeKey::from(line.end))
                    .map(move |line| IndexedSegment::new(line, idx))
            })
            .collect();

        Self {
            streets,
            tree: RTree::bulk_load(segments),
        }
    }

    /// Closest point on any street to `point`, with the owning street
    pub fn nearest(&self, point: Point<f64>) -> Option<(Point<f64>, f64, &'a Street)> {
        let segment = self.tree.nearest_neighbor(&point)?;
        let street = self.streets.get(segment.data)?;
        let line = geo::LineString::new(vec![segment.geom().start, segment.geom().end]);
        let projection = project_onto(&line, point.0)?;
        Some((
            Point::from(projection.point),
            distance(projection.point, point.0),
            street,
        ))
    }
}

/// Finds, for each building, the nearest point on the street network to its
/// centroid. Buildings with an empty footprint get no record.
pub fn compute_connection_records(
    buildings: &[Building],
    streets: &[Street],
) -> Vec<ConnectionRecord> {
    let index = StreetIndex::new(streets);

    let records: Vec<ConnectionRecord> = buildings
        .iter()
        .filter_map(|building| {
            let Some(centroid) = building.centroid() else {
                warn!("Building {} has an empty footprint - no connection", building.id);
                return None;
            };
            let (connection_point, service_distance_m, street) = index.nearest(centroid)?;

            Some(ConnectionRecord {
                building_id: building.id.clone(),
                centroid,
                connection_point,
                service_distance_m,
                street_id: Some(street.id.clone()),
                street_name: street.name.clone(),
                highway_type: street.highway.clone(),
                heating_load_kw: building.heating_load_kw,
            })
        })
        .collect();

    info!(
        "Computed street connections for {} of {} buildings",
        records.len(),
        buildings.len()
    );

    records
}
