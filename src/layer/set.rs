use crate::models::LayerRole;

use super::Layer;

/// The layers one resolution consults.
///
/// Any layer may be absent; dependent result fields then come back empty.
#[derive(Debug, Clone, Default)]
pub struct LayerSet {
    pub grids: Option<Layer>,
    pub grid_oot: Option<Layer>,
    pub substations: Option<Layer>,
    pub feeders: Option<Layer>,
    pub huts: Option<Layer>,
}

impl LayerSet {
    pub fn get(&self, role: LayerRole) -> Option<&Layer> {
        match role {
            LayerRole::Grid => self.grids.as_ref(),
            LayerRole::GridOot => self.grid_oot.as_ref(),
            LayerRole::Substation => self.substations.as_ref(),
            LayerRole::Feeder => self.feeders.as_ref(),
            LayerRole::Hut => self.huts.as_ref(),
        }
    }

    /// Feature count of every loaded layer
    pub fn counts(&self) -> Vec<(LayerRole, usize)> {
        [
            &self.grids,
            &self.grid_oot,
            &self.substations,
            &self.feeders,
            &self.huts,
        ]
        .into_iter()
        .flatten()
        .map(|layer| (layer.role(), layer.len()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeometryFamily;

    #[test]
    fn test_counts_skip_absent_layers() {
        let set = LayerSet {
            grids: Some(Layer::build(LayerRole::Grid, Some(GeometryFamily::Polygon), vec![]).unwrap()),
            huts: Some(Layer::build(LayerRole::Hut, Some(GeometryFamily::Point), vec![]).unwrap()),
            ..Default::default()
        };
        assert_eq!(set.counts(), vec![(LayerRole::Grid, 0), (LayerRole::Hut, 0)]);
        assert!(set.get(LayerRole::Feeder).is_none());
    }
}
