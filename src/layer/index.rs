//! Indexed, read-only layer of features.

use geo::Coord;
use hashbrown::HashMap;
use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use super::error::{LayerError, LayerResult};
use crate::models::{Feature, FeatureId, GeometryFamily, LayerRole};

/// Wrapper for R-tree indexing of feature envelopes
#[derive(Debug, Clone)]
struct IndexedFeature {
    /// Position of the feature in layer order
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedFeature {
    fn new(position: usize, feature: &Feature) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = feature.geometry.bbox()?;
        Some(Self {
            position,
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// One loaded feature collection with a fixed role and geometry family.
///
/// Layers are immutable; reloading a layer means building a new one.
#[derive(Debug, Clone)]
pub struct Layer {
    role: LayerRole,
    family: Option<GeometryFamily>,
    features: Vec<Feature>,
    by_id: HashMap<FeatureId, usize>,
    tree: RTree<IndexedFeature>,
}

impl Layer {
    /// Build the layer and its envelope index. Feature order is preserved.
    pub fn build(
        role: LayerRole,
        family: Option<GeometryFamily>,
        features: Vec<Feature>,
    ) -> LayerResult<Self> {
        let mut by_id = HashMap::with_capacity(features.len());
        for (position, feature) in features.iter().enumerate() {
            if by_id.insert(feature.id, position).is_some() {
                return Err(LayerError::DuplicateFeatureId(feature.id));
            }
        }

        let indexed: Vec<IndexedFeature> = features
            .iter()
            .enumerate()
            .filter_map(|(position, feature)| IndexedFeature::new(position, feature))
            .collect();
        let tree = RTree::bulk_load(indexed);

        info!(
            "Indexed {} layer: {} features ({})",
            role,
            tree.size(),
            family.map(|f| f.to_string()).unwrap_or_else(|| "empty".into())
        );

        Ok(Self {
            role,
            family,
            features,
            by_id,
            tree,
        })
    }

    pub fn role(&self) -> LayerRole {
        self.role
    }

    /// Geometry family; `None` only for an empty layer with no declared family
    pub fn family(&self) -> Option<GeometryFamily> {
        self.family
    }

    /// Features in layer order
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.by_id.get(&id).map(|&position| &self.features[position])
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features whose envelope covers the coordinate, in layer order
    pub fn candidates_at(&self, coord: Coord<f64>) -> impl Iterator<Item = &Feature> + '_ {
        self.candidates_in(coord, coord)
    }

    /// Features whose envelope intersects the box spanned by two corners, in layer order
    pub fn candidates_in(
        &self,
        a: Coord<f64>,
        b: Coord<f64>,
    ) -> impl Iterator<Item = &Feature> + '_ {
        let query = AABB::from_corners([a.x, a.y], [b.x, b.y]);
        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|indexed| indexed.position)
            .collect();
        positions.sort_unstable();
        positions.into_iter().map(move |p| &self.features[p])
    }
}
