//! Point-in-polygon containment.
//!
//! Boundary points count as contained; points inside a hole do not.
//! Longitudes are compared as given, with no dateline wrapping.

use geo::{Coord, Intersects, Polygon};

use crate::layer::Layer;
use crate::models::{Feature, Geometry};

pub fn point_in_polygon(point: Coord<f64>, polygon: &Polygon<f64>) -> bool {
    polygon.intersects(&point)
}

/// Containment against any polygonal geometry. Points and lines contain nothing.
pub fn geometry_contains(point: Coord<f64>, geometry: &Geometry) -> bool {
    geometry
        .polygons()
        .iter()
        .any(|polygon| point_in_polygon(point, polygon))
}

/// First feature in layer order whose polygon contains the point.
///
/// Overlapping polygons are allowed; the earliest one wins.
pub fn first_containing(point: Coord<f64>, layer: &Layer) -> Option<&Feature> {
    layer
        .candidates_at(point)
        .find(|feature| geometry_contains(point, &feature.geometry))
}

/// Every feature containing the point, in layer order
pub fn all_containing(point: Coord<f64>, layer: &Layer) -> Vec<&Feature> {
    layer
        .candidates_at(point)
        .filter(|feature| geometry_contains(point, &feature.geometry))
        .collect()
}
