//! Directional (N/S/E/W) neighbor discovery.
//!
//! Each direction casts a ray from the query point and takes the polygon
//! whose boundary it crosses closest to the point. Directions whose ray
//! crosses nothing fall back to the polygons whose centroid lies in that
//! half-plane, ranked by boundary distance. Polygons containing the query
//! point are never reported.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};
use hashbrown::HashSet;
use tracing::debug;

use super::containment::all_containing;
use super::distance::{haversine_miles, path_miles};
use super::nearest::NearestHit;
use crate::layer::Layer;
use crate::models::{Feature, FeatureId};

/// Offset of the ray origin from the query point, degrees
pub const RAY_EPSILON_DEG: f64 = 1e-6;

/// Ray length, degrees (roughly 200 miles)
pub const RAY_LENGTH_DEG: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::South => "S",
            Direction::East => "E",
            Direction::West => "W",
        }
    }

    fn unit(&self) -> (f64, f64) {
        match self {
            Direction::North => (0.0, 1.0),
            Direction::South => (0.0, -1.0),
            Direction::East => (1.0, 0.0),
            Direction::West => (-1.0, 0.0),
        }
    }

    /// Ray from just beside the point out to [`RAY_LENGTH_DEG`]
    pub fn ray(&self, point: Coord<f64>) -> Line<f64> {
        let (dx, dy) = self.unit();
        Line::new(
            Coord {
                x: point.x + dx * RAY_EPSILON_DEG,
                y: point.y + dy * RAY_EPSILON_DEG,
            },
            Coord {
                x: point.x + dx * RAY_LENGTH_DEG,
                y: point.y + dy * RAY_LENGTH_DEG,
            },
        )
    }

    /// Whether `centroid` lies strictly beyond the point in this direction
    pub fn in_half_plane(&self, point: Coord<f64>, centroid: Coord<f64>) -> bool {
        match self {
            Direction::North => centroid.y > point.y + RAY_EPSILON_DEG,
            Direction::South => centroid.y < point.y - RAY_EPSILON_DEG,
            Direction::East => centroid.x > point.x + RAY_EPSILON_DEG,
            Direction::West => centroid.x < point.x - RAY_EPSILON_DEG,
        }
    }
}

/// Closest polygon in each cardinal direction
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionalNeighbors<'a> {
    pub north: Option<NearestHit<'a>>,
    pub south: Option<NearestHit<'a>>,
    pub east: Option<NearestHit<'a>>,
    pub west: Option<NearestHit<'a>>,
}

impl<'a> DirectionalNeighbors<'a> {
    pub fn get(&self, direction: Direction) -> Option<NearestHit<'a>> {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    fn slot(&mut self, direction: Direction) -> &mut Option<NearestHit<'a>> {
        match direction {
            Direction::North => &mut self.north,
            Direction::South => &mut self.south,
            Direction::East => &mut self.east,
            Direction::West => &mut self.west,
        }
    }
}

/// Find the N/S/E/W neighbors of a point among a polygon layer.
pub fn directional_neighbors(point: Coord<f64>, layer: &Layer) -> DirectionalNeighbors<'_> {
    let containing: HashSet<FeatureId> = all_containing(point, layer)
        .into_iter()
        .map(|feature| feature.id)
        .collect();

    let mut result = DirectionalNeighbors::default();

    for direction in Direction::ALL {
        *result.slot(direction) = first_ray_hit(point, direction, layer, &containing);
    }

    for direction in Direction::ALL {
        if result.get(direction).is_some() {
            continue;
        }
        let fallback = half_plane_fallback(point, direction, layer, &containing);
        debug!(
            "No ray hit {} of ({}, {}); fallback found {:?}",
            direction.label(),
            point.x,
            point.y,
            fallback.map(|hit| hit.feature.id)
        );
        *result.slot(direction) = fallback;
    }

    result
}

/// Closest boundary crossing of the ray, over every polygon not containing the point
fn first_ray_hit<'a>(
    point: Coord<f64>,
    direction: Direction,
    layer: &'a Layer,
    containing: &HashSet<FeatureId>,
) -> Option<NearestHit<'a>> {
    let ray = direction.ray(point);
    let mut best: Option<NearestHit<'a>> = None;

    for feature in layer.candidates_in(ray.start, ray.end) {
        if containing.contains(&feature.id) {
            continue;
        }
        let Some(d) = ray_crossing_miles(point, ray, feature) else {
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

/// Distance from the point to the nearest place the ray crosses the feature's boundary
fn ray_crossing_miles(point: Coord<f64>, ray: Line<f64>, feature: &Feature) -> Option<f64> {
    feature
        .geometry
        .segments()
        .filter_map(|segment| match line_intersection(ray, segment)? {
            LineIntersection::SinglePoint { intersection, .. } => {
                Some(haversine_miles(point, intersection))
            }
            LineIntersection::Collinear { intersection } => Some(
                haversine_miles(point, intersection.start)
                    .min(haversine_miles(point, intersection.end)),
            ),
        })
        .filter(|d| d.is_finite())
        .min_by(f64::total_cmp)
}

/// Nearest boundary among polygons whose centroid lies in the direction's half-plane
fn half_plane_fallback<'a>(
    point: Coord<f64>,
    direction: Direction,
    layer: &'a Layer,
    containing: &HashSet<FeatureId>,
) -> Option<NearestHit<'a>> {
    let mut best: Option<NearestHit<'a>> = None;

    for feature in layer.features() {
        if containing.contains(&feature.id) {
            continue;
        }
        let Some(centroid) = feature.geometry.centroid() else {
            continue;
        };
        if !direction.in_half_plane(point, centroid) {
            continue;
        }
        let Some(d) = path_miles(point, &feature.geometry).filter(|d| d.is_finite()) else {
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
