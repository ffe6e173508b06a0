//! Core data models for the territory lookup engine.

pub mod assignment;
pub mod feature;
pub mod geometry;

pub use assignment::{
    AssignmentResult, FeederAssignment, GridAssignment, HutAssignment, NearbyGrid, NeighborHit,
    Neighbors, ASSIGNED, OOT, OUT_OF_TERRITORY,
};
pub use feature::{CanonicalFields, Feature, FeatureId, LayerRole, PropertyValue};
pub use geometry::{checked_position, Geometry, GeometryFamily};
