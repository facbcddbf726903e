use geo::LineString;
use log::{debug, info};

use super::connectivity::ensure_connected;
use crate::model::{
    NodeKey, Street, StreetGraph,
    streets::EdgeMetadata,
};

/// Builds a connected street graph from street polylines.
///
/// Every consecutive vertex pair becomes one edge between rounded node keys;
/// zero-length pairs are skipped and overlapping duplicates keep the shorter
/// copy. Disconnected parts are bridged by [`ensure_connected`] before the
/// graph is returned. Empty input yields an empty graph.
pub fn build_street_graph(streets: &[Street]) -> StreetGraph {
    let mut graph = build_raw_street_graph(streets);

    info!(
        "Street graph built: {} nodes, {} edges from {} streets",
        graph.node_count(),
        graph.edge_count(),
        streets.len()
    );

    let bridges = ensure_connected(&mut graph);
    if bridges > 0 {
        info!("Connectivity repaired with {bridges} synthetic edges");
    }

    graph
}

/// Street graph as digitized, without connectivity repair
pub(crate) fn build_raw_street_graph(streets: &[Street]) -> StreetGraph {
    let mut graph = StreetGraph::new();
    let mut skipped = 0_usize;

    for street in streets {
        let meta = EdgeMetadata {
            street_id: street.id.clone(),
            street_name: street.name.clone(),
            highway_type: street.highway.clone(),
        };

        for pair in street.geometry.0.windows(2) {
            let a = NodeKey::from(pair[0]);
            let b = NodeKey::from(pair[1]);
            if a == b {
                skipped += 1;
                continue;
            }

            let geometry = LineString::new(vec![a.coord(), b.coord()]);
            graph.add_edge(a, b, geometry, meta.clone());
        }
    }

    if skipped > 0 {
        debug!("Skipped {skipped} zero-length street segments");
    }

    graph
}
