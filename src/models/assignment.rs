//! Assignment result returned to callers.
//!
//! Field names and marker strings are displayed verbatim by callers.

use serde::Serialize;

use super::FeatureId;

/// Substation/feeder marker for points outside the service territory
pub const OUT_OF_TERRITORY: &str = "out of territory";

/// Grid code marker for points outside every grid polygon
pub const OOT: &str = "OOT";

/// Feeder distance text when the point counts as assigned
pub const ASSIGNED: &str = "inside / assigned";

/// Format a distance the way callers display it: `~0.42 mi`
pub fn distance_text(miles: f64) -> String {
    format!("~{:.2} mi", miles)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    /// Containing (or nearest, for point zones) substation name
    pub substation_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substation_id: Option<FeatureId>,
    pub hut: Option<HutAssignment>,
    pub feeder: FeederAssignment,
    pub grid: GridAssignment,
    pub neighbors: Neighbors,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nearby_grids: Vec<NearbyGrid>,
    pub out_of_territory: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HutAssignment {
    pub name: Option<String>,
    pub feature_id: FeatureId,
    pub distance_miles: f64,
    pub distance_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeederAssignment {
    pub code: Option<String>,
    pub substation_name: Option<String>,
    pub distance_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    pub assigned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<FeatureId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridAssignment {
    /// Grid code, or [`OOT`] when no grid contains the point
    pub code: Option<String>,
    /// Matched grid polygon, for the caller to highlight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<FeatureId>,
    /// Best-effort code from the out-of-territory grid layer
    pub neighbor_fallback_code: Option<String>,
}

/// Closest grid in one cardinal direction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborHit {
    pub feature_id: FeatureId,
    pub code: Option<String>,
    pub distance_miles: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Neighbors {
    #[serde(rename = "N")]
    pub north: Option<NeighborHit>,
    #[serde(rename = "S")]
    pub south: Option<NeighborHit>,
    #[serde(rename = "E")]
    pub east: Option<NeighborHit>,
    #[serde(rename = "W")]
    pub west: Option<NeighborHit>,
}

/// Grid ranked by centroid distance, with a compass hint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyGrid {
    pub feature_id: FeatureId,
    pub code: Option<String>,
    pub distance_miles: f64,
    pub bearing: f64,
    pub compass: &'static str,
}
