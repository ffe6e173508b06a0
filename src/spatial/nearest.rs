//! Nearest-feature searches by great-circle distance.
//!
//! Every search is a full scan in layer order; on equal distances the
//! earlier feature is kept.

use geo::Coord;

use super::distance::{compass_label, haversine_miles, initial_bearing, path_miles};
use crate::layer::Layer;
use crate::models::{Feature, Geometry};

/// A matched feature and its distance from the query point
#[derive(Debug, Clone, Copy)]
pub struct NearestHit<'a> {
    pub feature: &'a Feature,
    pub distance_miles: f64,
}

/// A polygon ranked by the distance to its centroid
#[derive(Debug, Clone, Copy)]
pub struct CentroidHit<'a> {
    pub feature: &'a Feature,
    pub distance_miles: f64,
    /// Initial bearing from the query point to the centroid, degrees
    pub bearing: f64,
    pub compass: &'static str,
}

fn nearest_by<'a, F>(layer: &'a Layer, mut distance: F) -> Option<NearestHit<'a>>
where
    F: FnMut(&Feature) -> Option<f64>,
{
    let mut best: Option<NearestHit<'a>> = None;
    for feature in layer.features() {
        let Some(d) = distance(feature).filter(|d| d.is_finite()) else {
            continue;
        };
        if best.map_or(true, |b| d < b.distance_miles) {
            best = Some(NearestHit {
                feature,
                distance_miles: d,
            });
        }
    }
    best
}

/// Nearest point feature
pub fn nearest_point(point: Coord<f64>, layer: &Layer) -> Option<NearestHit<'_>> {
    nearest_by(layer, |feature| match &feature.geometry {
        Geometry::Point(p) => Some(haversine_miles(point, p.0)),
        _ => None,
    })
}

/// Nearest line feature, by distance to its closest segment
pub fn nearest_line(point: Coord<f64>, layer: &Layer) -> Option<NearestHit<'_>> {
    nearest_by(layer, |feature| match &feature.geometry {
        Geometry::LineString(_) => path_miles(point, &feature.geometry),
        _ => None,
    })
}

/// Nearest polygon by distance to its boundary (outer and hole rings)
pub fn nearest_polygon_edge(point: Coord<f64>, layer: &Layer) -> Option<NearestHit<'_>> {
    nearest_by(layer, |feature| match &feature.geometry {
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => path_miles(point, &feature.geometry),
        _ => None,
    })
}

/// Up to `k` polygons closest to the point by centroid distance.
///
/// Ties keep layer order.
pub fn nearest_by_centroid(point: Coord<f64>, layer: &Layer, k: usize) -> Vec<CentroidHit<'_>> {
    let mut scored: Vec<CentroidHit<'_>> = layer
        .features()
        .iter()
        .filter_map(|feature| {
            let centroid = feature.geometry.centroid()?;
            let bearing = initial_bearing(point, centroid);
            Some(CentroidHit {
                feature,
                distance_miles: haversine_miles(point, centroid),
                bearing,
                compass: compass_label(bearing),
            })
        })
        .collect();
    scored.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    scored.truncate(k);
    scored
}
