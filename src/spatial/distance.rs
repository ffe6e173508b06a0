//! Great-circle distance primitives in statute miles.

use geo::{Coord, Line};

use crate::models::Geometry;

/// Mean Earth radius (6 371 008.8 m) in statute miles
pub const EARTH_RADIUS_MILES: f64 = 3_958.761_315_801_475;

/// Haversine great-circle distance in miles.
pub fn haversine_miles(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();

    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();

    let h = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

    2.0 * EARTH_RADIUS_MILES * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Closest point on a segment to `p`.
///
/// The projection runs in a local equirectangular frame centred on `p`
/// (longitude scaled by cos(lat)), which is accurate to well under a
/// hundredth of a mile at grid/feeder scale.
pub fn closest_on_segment(p: Coord<f64>, segment: Line<f64>) -> Coord<f64> {
    let k = p.y.to_radians().cos();
    let (a, b) = (segment.start, segment.end);

    let ax = (a.x - p.x) * k;
    let ay = a.y - p.y;
    let dx = (b.x - a.x) * k;
    let dy = b.y - a.y;

    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return a;
    }

    let t = (-(ax * dx + ay * dy) / len2).clamp(0.0, 1.0);
    Coord {
        x: a.x + t * (b.x - a.x),
        y: a.y + t * (b.y - a.y),
    }
}

/// Distance from `p` to the closest point of a segment, in miles
pub fn segment_miles(p: Coord<f64>, segment: Line<f64>) -> f64 {
    haversine_miles(p, closest_on_segment(p, segment))
}

/// Minimum distance from `p` to any segment of the geometry's paths.
///
/// For polygons this is the distance to the boundary (outer and hole rings).
/// Points have no paths and yield `None`.
pub fn path_miles(p: Coord<f64>, geometry: &Geometry) -> Option<f64> {
    geometry
        .segments()
        .map(|segment| segment_miles(p, segment))
        .min_by(f64::total_cmp)
}

/// Initial great-circle bearing from `from` to `to`, degrees in (-180, 180]
pub fn initial_bearing(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let lat1 = from.y.to_radians();
    let lat2 = to.y.to_radians();
    let d_lon = (to.x - from.x).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    y.atan2(x).to_degrees()
}

/// Eight-point compass label for a bearing in degrees
pub fn compass_label(bearing: f64) -> &'static str {
    const LABELS: [&str; 9] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW", "N"];
    let normalized = bearing.rem_euclid(360.0);
    LABELS[(normalized / 45.0).round() as usize]
}
