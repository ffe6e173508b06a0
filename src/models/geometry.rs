//! Geometry types for layer features.

use geo::{BoundingRect, Centroid, Coord, Line, LineString, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

/// Geometry family shared by every feature of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryFamily {
    Point,
    Line,
    Polygon,
}

impl std::fmt::Display for GeometryFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryFamily::Point => write!(f, "point"),
            GeometryFamily::Line => write!(f, "line"),
            GeometryFamily::Polygon => write!(f, "polygon"),
        }
    }
}

/// Supported feature geometries.
///
/// Rings inside polygons are closed; the first ring of a polygon is the
/// outer boundary and the rest are holes.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point<f64>),
    LineString(LineString<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Geometry {
    pub fn family(&self) -> GeometryFamily {
        match self {
            Geometry::Point(_) => GeometryFamily::Point,
            Geometry::LineString(_) => GeometryFamily::Line,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => GeometryFamily::Polygon,
        }
    }

    /// GeoJSON type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Get the bounding box as (min_lon, min_lat, max_lon, max_lat)
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let rect = match self {
            Geometry::Point(p) => Some(p.bounding_rect()),
            Geometry::LineString(ls) => ls.bounding_rect(),
            Geometry::Polygon(p) => p.bounding_rect(),
            Geometry::MultiPolygon(mp) => mp.bounding_rect(),
        }?;
        Some((rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    /// Polygons making up this geometry (empty for points and lines)
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            Geometry::Polygon(p) => std::slice::from_ref(p),
            Geometry::MultiPolygon(mp) => &mp.0,
            Geometry::Point(_) | Geometry::LineString(_) => &[],
        }
    }

    /// Every linear path of the geometry: the line itself, or all polygon
    /// rings (outer and holes).
    pub fn paths(&self) -> impl Iterator<Item = &LineString<f64>> + '_ {
        let line = match self {
            Geometry::LineString(ls) => Some(ls),
            _ => None,
        };
        line.into_iter().chain(
            self.polygons()
                .iter()
                .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors().iter())),
        )
    }

    /// Segments of every path
    pub fn segments(&self) -> impl Iterator<Item = Line<f64>> + '_ {
        self.paths().flat_map(|path| path.lines())
    }

    /// Area centroid for polygonal geometries
    pub fn centroid(&self) -> Option<Coord<f64>> {
        match self {
            Geometry::Polygon(p) => p.centroid().map(|c| c.0),
            Geometry::MultiPolygon(mp) => mp.centroid().map(|c| c.0),
            Geometry::Point(_) | Geometry::LineString(_) => None,
        }
    }
}

/// Build a WGS84 position, rejecting non-finite or out-of-range values.
pub fn checked_position(lon: f64, lat: f64) -> Result<Coord<f64>, String> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(format!("non-finite coordinate [{}, {}]", lon, lat));
    }
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("coordinate [{}, {}] outside WGS84 range", lon, lat));
    }
    Ok(Coord { x: lon, y: lat })
}
