//! Gridfinder - service territory lookup for utility grid layers
//!
//! Given a point, determines the containing (or nearest) substation zone,
//! feeder, service hut and grid, plus the neighboring grid in each cardinal
//! direction. This library is shared by the query and lookup binaries.

pub mod config;
pub mod layer;
pub mod models;
pub mod resolver;
pub mod spatial;

pub use layer::{Layer, LayerError, LayerSet};
pub use models::{AssignmentResult, Feature, FeatureId, Geometry, GeometryFamily, LayerRole};
pub use resolver::{AssignmentResolver, ResolverOptions};
