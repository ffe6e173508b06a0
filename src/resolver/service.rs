//! Assignment resolution for a single query point.

use geo::Coord;
use tracing::debug;

use crate::layer::{Layer, LayerSet};
use crate::models::{
    assignment::distance_text, AssignmentResult, Feature, FeatureId, FeederAssignment,
    GeometryFamily, GridAssignment, HutAssignment, NearbyGrid, NeighborHit, Neighbors, ASSIGNED,
    OOT, OUT_OF_TERRITORY,
};
use crate::spatial::{
    directional_neighbors, first_containing, nearest_by_centroid, nearest_line, nearest_point,
    nearest_polygon_edge, NearestHit,
};

/// Default feeder assignment tolerance, miles
pub const DEFAULT_FEEDER_TOLERANCE_MILES: f64 = 0.25;

/// Default length of the nearby-grid hint list
pub const DEFAULT_NEARBY_GRID_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverOptions {
    /// A line feeder within this distance counts as assigned
    pub feeder_tolerance_miles: f64,
    /// Nearby grids by centroid to report; 0 disables the list
    pub nearby_grid_count: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            feeder_tolerance_miles: DEFAULT_FEEDER_TOLERANCE_MILES,
            nearby_grid_count: DEFAULT_NEARBY_GRID_COUNT,
        }
    }
}

/// Resolves which zone, hut, feeder and grid a point belongs to.
///
/// Resolution is a pure function of the point and the layers.
#[derive(Debug, Clone, Default)]
pub struct AssignmentResolver {
    options: ResolverOptions,
}

/// Substation lookup outcome
#[derive(Default)]
struct ZoneMatch {
    name: Option<String>,
    feature: Option<FeatureId>,
    contained: bool,
    polygonal: bool,
}

impl AssignmentResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn resolve(&self, point: Coord<f64>, layers: &LayerSet) -> AssignmentResult {
        let zone = self.resolve_zone(point, layers.substations.as_ref());
        let hut = self.resolve_hut(point, layers.huts.as_ref());
        let (mut feeder, feeder_polygonal) = self.resolve_feeder(point, layers.feeders.as_ref());

        // Out of territory only when some polygon layer could have contained the point
        let feeder_contained = feeder_polygonal && feeder.assigned;
        let out_of_territory =
            (zone.polygonal || feeder_polygonal) && !zone.contained && !feeder_contained;

        let mut substation_name = zone.name;
        let mut substation_id = zone.feature;
        if out_of_territory {
            debug!("({}, {}) is out of territory", point.x, point.y);
            substation_name = Some(OUT_OF_TERRITORY.to_string());
            substation_id = None;
            feeder = FeederAssignment {
                code: Some(OUT_OF_TERRITORY.to_string()),
                substation_name: Some(OUT_OF_TERRITORY.to_string()),
                ..Default::default()
            };
        }

        let grid = self.resolve_grid(point, layers.grids.as_ref(), layers.grid_oot.as_ref());
        let neighbors = self.neighbors(point, layers);
        let nearby_grids = layers
            .grids
            .as_ref()
            .map(|grids| self.resolve_nearby(point, grids))
            .unwrap_or_default();

        AssignmentResult {
            substation_name,
            substation_id,
            hut,
            feeder,
            grid,
            neighbors,
            nearby_grids,
            out_of_territory,
        }
    }

    /// Directional neighbors alone; empty when no grid layer is loaded
    pub fn neighbors(&self, point: Coord<f64>, layers: &LayerSet) -> Neighbors {
        layers
            .grids
            .as_ref()
            .map(|grids| self.resolve_neighbors(point, grids))
            .unwrap_or_default()
    }

    fn resolve_zone(&self, point: Coord<f64>, zones: Option<&Layer>) -> ZoneMatch {
        let Some(zones) = zones else {
            return ZoneMatch::default();
        };

        match zones.family() {
            Some(GeometryFamily::Point) => {
                let hit = nearest_point(point, zones);
                debug!("Nearest substation point: {:?}", hit.map(|h| h.feature.id));
                ZoneMatch {
                    name: hit.and_then(|h| h.feature.name().map(str::to_string)),
                    feature: hit.map(|h| h.feature.id),
                    contained: false,
                    polygonal: false,
                }
            }
            Some(GeometryFamily::Polygon) => {
                let hit = first_containing(point, zones);
                debug!("Containing substation zone: {:?}", hit.map(|f| f.id));
                ZoneMatch {
                    name: hit.and_then(|f| f.name().map(str::to_string)),
                    feature: hit.map(|f| f.id),
                    contained: hit.is_some(),
                    polygonal: true,
                }
            }
            // Untyped (empty) or line layers cannot place a point in a zone
            Some(GeometryFamily::Line) | None => ZoneMatch::default(),
        }
    }

    fn resolve_hut(&self, point: Coord<f64>, huts: Option<&Layer>) -> Option<HutAssignment> {
        let hit = nearest_point(point, huts?)?;
        Some(HutAssignment {
            name: hit.feature.name().map(str::to_string),
            feature_id: hit.feature.id,
            distance_miles: hit.distance_miles,
            distance_text: distance_text(hit.distance_miles),
        })
    }

    /// Feeder assignment and whether the feeder layer is polygonal
    fn resolve_feeder(
        &self,
        point: Coord<f64>,
        feeders: Option<&Layer>,
    ) -> (FeederAssignment, bool) {
        let Some(feeders) = feeders else {
            return (FeederAssignment::default(), false);
        };

        match feeders.family() {
            Some(GeometryFamily::Line) => {
                (self.feeder_by_distance(nearest_line(point, feeders)), false)
            }
            Some(GeometryFamily::Point) => {
                (self.feeder_by_distance(nearest_point(point, feeders)), false)
            }
            Some(GeometryFamily::Polygon) => {
                let hit = first_containing(point, feeders);
                debug!("Containing feeder area: {:?}", hit.map(|f| f.id));
                (feeder_by_containment(hit), true)
            }
            None => (FeederAssignment::default(), false),
        }
    }

    fn feeder_by_distance(&self, hit: Option<NearestHit<'_>>) -> FeederAssignment {
        let Some(hit) = hit else {
            return FeederAssignment::default();
        };
        let assigned = hit.distance_miles <= self.options.feeder_tolerance_miles;
        debug!(
            "Nearest feeder {} at {:.3} mi (assigned: {})",
            hit.feature.id, hit.distance_miles, assigned
        );
        FeederAssignment {
            code: hit.feature.code().map(str::to_string),
            substation_name: hit.feature.substation().map(str::to_string),
            distance_text: Some(if assigned {
                ASSIGNED.to_string()
            } else {
                distance_text(hit.distance_miles)
            }),
            distance_miles: Some(hit.distance_miles),
            assigned,
            feature_id: Some(hit.feature.id),
        }
    }

    fn resolve_grid(
        &self,
        point: Coord<f64>,
        grids: Option<&Layer>,
        grid_oot: Option<&Layer>,
    ) -> GridAssignment {
        if let Some(hit) = grids.and_then(|grids| first_containing(point, grids)) {
            debug!("Containing grid: {}", hit.id);
            return GridAssignment {
                code: hit.code().map(str::to_string),
                feature_id: Some(hit.id),
                neighbor_fallback_code: None,
            };
        }

        let neighbor_fallback_code = grid_oot
            .and_then(|oot| nearest_polygon_edge(point, oot))
            .and_then(|hit| hit.feature.code().map(str::to_string));
        debug!("No containing grid; OOT grid code {:?}", neighbor_fallback_code);

        GridAssignment {
            code: Some(OOT.to_string()),
            feature_id: None,
            neighbor_fallback_code,
        }
    }

    fn resolve_neighbors(&self, point: Coord<f64>, grids: &Layer) -> Neighbors {
        let found = directional_neighbors(point, grids);
        Neighbors {
            north: found.north.map(neighbor_hit),
            south: found.south.map(neighbor_hit),
            east: found.east.map(neighbor_hit),
            west: found.west.map(neighbor_hit),
        }
    }

    fn resolve_nearby(&self, point: Coord<f64>, grids: &Layer) -> Vec<NearbyGrid> {
        if self.options.nearby_grid_count == 0 {
            return Vec::new();
        }
        nearest_by_centroid(point, grids, self.options.nearby_grid_count)
            .into_iter()
            .map(|hit| NearbyGrid {
                feature_id: hit.feature.id,
                code: hit.feature.code().map(str::to_string),
                distance_miles: hit.distance_miles,
                bearing: hit.bearing,
                compass: hit.compass,
            })
            .collect()
    }
}

fn feeder_by_containment(hit: Option<&Feature>) -> FeederAssignment {
    match hit {
        Some(feature) => FeederAssignment {
            code: feature.code().map(str::to_string),
            substation_name: feature.substation().map(str::to_string),
            distance_text: Some(ASSIGNED.to_string()),
            distance_miles: None,
            assigned: true,
            feature_id: Some(feature.id),
        },
        None => FeederAssignment::default(),
    }
}

fn neighbor_hit(hit: NearestHit<'_>) -> NeighborHit {
    NeighborHit {
        feature_id: hit.feature.id,
        code: hit.feature.code().map(str::to_string),
        distance_miles: hit.distance_miles,
    }
}
