//! Validated, indexed feature layers.
//!
//! Layers are loaded from GeoJSON feature collections and indexed with an
//! R-tree over feature envelopes for containment prefiltering.

mod error;
mod index;
mod load;
mod set;

pub use error::{LayerError, LayerResult};
pub use index::Layer;
pub use load::{load, load_file, load_str, FieldAliases, LayerSchema};
pub use set::LayerSet;
