//! Per-point assignment resolution.
//!
//! Combines containment, nearest-feature and directional-neighbor searches
//! over a [`LayerSet`](crate::layer::LayerSet) into one
//! [`AssignmentResult`](crate::models::AssignmentResult).

mod service;

#[cfg(test)]
mod tests;

pub use service::{
    AssignmentResolver, ResolverOptions, DEFAULT_FEEDER_TOLERANCE_MILES,
    DEFAULT_NEARBY_GRID_COUNT,
};
