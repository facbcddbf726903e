//! Planar geometry primitives shared by graph construction, snapping and routing.
//!
//! All coordinates are expected in a projected CRS with meter units, see
//! [`crate::model::crs`] for the normalization step.

use geo::{Closest, ClosestPoint, Coord, Distance, Euclidean, Length, LineString, Point};
use serde::{Deserialize, Serialize};

/// Number of decimal digits kept when a coordinate becomes a graph node key
pub const COORD_PRECISION: u32 = 6;

/// `10^COORD_PRECISION`
const COORD_SCALE: f64 = 1_000_000.0;

/// Distance below which two locations are treated as coincident
pub const SNAP_TOLERANCE: f64 = 1e-6;

/// Identity of a street graph node: a coordinate rounded to
/// [`COORD_PRECISION`] decimal places, stored as scaled integers so it can be
/// hashed and compared exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", from = "[f64; 2]")]
pub struct NodeKey {
    x: i64,
    y: i64,
}

impl NodeKey {
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: (x * COORD_SCALE).round() as i64,
            y: (y * COORD_SCALE).round() as i64,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn x(&self) -> f64 {
        self.x as f64 / COORD_SCALE
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn y(&self) -> f64 {
        self.y as f64 / COORD_SCALE
    }

    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.x(),
            y: self.y(),
        }
    }

    pub fn point(&self) -> Point<f64> {
        Point::from(self.coord())
    }

    /// Orientation-independent identity of the segment between two nodes
    pub fn unordered_pair(a: NodeKey, b: NodeKey) -> (NodeKey, NodeKey) {
        if a <= b { (a, b) } else { (b, a) }
    }
}

impl From<Coord<f64>> for NodeKey {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

impl From<Point<f64>> for NodeKey {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

impl From<[f64; 2]> for NodeKey {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<NodeKey> for [f64; 2] {
    fn from(key: NodeKey) -> Self {
        [key.x(), key.y()]
    }
}

/// Euclidean distance between two coordinates
pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Euclidean.distance(Point::from(a), Point::from(b))
}

/// Euclidean length of a polyline
pub fn length(line: &LineString<f64>) -> f64 {
    Euclidean.length(line)
}

/// Closest location on a polyline to a query coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub point: Coord<f64>,
    pub distance: f64,
    /// Index `i` of the segment `coords[i]..coords[i + 1]` holding `point`
    pub segment: usize,
}

/// Projects `query` onto `line`, returning the closest point over all of its
/// segments. Ties keep the earliest segment. Returns `None` for an empty line.
pub fn project_onto(line: &LineString<f64>, query: Coord<f64>) -> Option<Projection> {
    let query_point = Point::from(query);

    if line.0.len() == 1 {
        let only = line.0[0];
        return Some(Projection {
            point: only,
            distance: distance(only, query),
            segment: 0,
        });
    }

    let mut best: Option<Projection> = None;
    for (segment, line_segment) in line.lines().enumerate() {
        let point = match line_segment.closest_point(&query_point) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => p.into(),
            Closest::Indeterminate => line_segment.start,
        };
        let candidate_distance = distance(point, query);
        if best.is_none_or(|b| candidate_distance < b.distance) {
            best = Some(Projection {
                point,
                distance: candidate_distance,
                segment,
            });
        }
    }

    best
}

/// Splits `line` at `at`, which must lie on (or be projected onto) the
/// segment with index `segment`. The first part runs from the line start to
/// `at`, the second from `at` to the line end; consecutive duplicate
/// vertices are dropped.
pub fn split_line(
    line: &LineString<f64>,
    segment: usize,
    at: Coord<f64>,
) -> (LineString<f64>, LineString<f64>) {
    let coords = &line.0;
    let pivot = segment.min(coords.len().saturating_sub(1));

    let mut head: Vec<Coord<f64>> = coords[..=pivot].to_vec();
    push_distinct(&mut head, at);

    let mut tail = vec![at];
    for &coord in &coords[pivot + 1..] {
        push_distinct(&mut tail, coord);
    }

    (LineString::new(head), LineString::new(tail))
}

fn push_distinct(coords: &mut Vec<Coord<f64>>, coord: Coord<f64>) {
    if coords
        .last()
        .is_none_or(|last| distance(*last, coord) >= SNAP_TOLERANCE)
    {
        coords.push(coord);
    }
}

/// Reverses the vertex order of a polyline
pub fn reversed(line: &LineString<f64>) -> LineString<f64> {
    LineString::new(line.0.iter().rev().copied().collect())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::{coord, line_string};

    use super::*;

    #[test]
    fn node_key_rounds_to_six_decimals() {
        let a = NodeKey::new(10.123_456_4, 20.0);
        let b = NodeKey::new(10.123_456_1, 20.000_000_3);
        assert_eq!(a, b);
        assert_relative_eq!(a.x(), 10.123_456);
        assert_ne!(NodeKey::new(10.123_456, 0.0), NodeKey::new(10.123_457, 0.0));
    }

    #[test]
    fn unordered_pair_ignores_direction() {
        let a = NodeKey::new(0.0, 0.0);
        let b = NodeKey::new(5.0, 1.0);
        assert_eq!(NodeKey::unordered_pair(a, b), NodeKey::unordered_pair(b, a));
    }

    #[test]
    fn projection_picks_closest_segment() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0)];
        let projection = project_onto(&line, coord! { x: 12.0, y: 6.0 }).unwrap();

        assert_eq!(projection.segment, 1);
        assert_relative_eq!(projection.point.x, 10.0);
        assert_relative_eq!(projection.point.y, 6.0);
        assert_relative_eq!(projection.distance, 2.0);
    }

    #[test]
    fn split_reconstructs_original_polyline() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0)];
        let (head, tail) = split_line(&line, 1, coord! { x: 10.0, y: 4.0 });

        assert_eq!(head.0.len(), 3);
        assert_eq!(tail.0.len(), 2);
        assert_relative_eq!(length(&head) + length(&tail), length(&line));
        assert_eq!(head.0.last(), tail.0.first());
    }

    #[test]
    fn split_on_interior_vertex_does_not_duplicate_it() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 20.0, y: 0.0)];
        let (head, tail) = split_line(&line, 0, coord! { x: 10.0, y: 0.0 });

        assert_eq!(head.0, vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }]);
        assert_eq!(tail.0, vec![coord! { x: 10.0, y: 0.0 }, coord! { x: 20.0, y: 0.0 }]);
    }
}
