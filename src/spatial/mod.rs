//! Geometric predicates and searches over loaded layers.
//!
//! All functions are total over validated layers: a miss is `None`, never an error.

pub mod containment;
pub mod distance;
pub mod nearest;
pub mod neighbors;

pub use containment::{all_containing, first_containing, geometry_contains, point_in_polygon};
pub use distance::{haversine_miles, initial_bearing, segment_miles, EARTH_RADIUS_MILES};
pub use nearest::{
    nearest_by_centroid, nearest_line, nearest_point, nearest_polygon_edge, CentroidHit,
    NearestHit,
};
pub use neighbors::{directional_neighbors, Direction, DirectionalNeighbors};
