//! Layer feature types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Geometry;

/// Stable per-layer feature identifier.
///
/// External callers key their selection/highlight state on this id; it never
/// changes for the lifetime of the layer that owns the feature.
pub type FeatureId = u64;

/// Semantic role of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerRole {
    /// In-territory grid polygons
    Grid,
    /// Secondary out-of-territory grid polygons
    GridOot,
    /// Substation zones (polygons or points)
    Substation,
    /// Feeder areas (polygons) or feeder lines
    Feeder,
    /// Service huts (points)
    Hut,
}

impl std::fmt::Display for LayerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerRole::Grid => write!(f, "grid"),
            LayerRole::GridOot => write!(f, "grid_oot"),
            LayerRole::Substation => write!(f, "substation"),
            LayerRole::Feeder => write!(f, "feeder"),
            LayerRole::Hut => write!(f, "hut"),
        }
    }
}

/// A property value as found in the source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Null,
}

impl PropertyValue {
    /// Render as display text. Whole numbers print without a fractional part.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PropertyValue::Text(s) => Some(s.clone()),
            PropertyValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            PropertyValue::Number(n) => Some(n.to_string()),
            PropertyValue::Null => None,
        }
    }
}

/// Canonical fields resolved from aliased property keys at load time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substation: Option<String>,
}

/// A validated feature belonging to a layer
#[derive(Debug, Clone)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    pub properties: BTreeMap<String, PropertyValue>,
    pub fields: CanonicalFields,
}

impl Feature {
    /// Look up a raw property by its source key
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn code(&self) -> Option<&str> {
        self.fields.code.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.name.as_deref()
    }

    pub fn substation(&self) -> Option<&str> {
        self.fields.substation.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_as_text() {
        assert_eq!(PropertyValue::Number(1204.0).as_text().as_deref(), Some("1204"));
        assert_eq!(PropertyValue::Number(12.5).as_text().as_deref(), Some("12.5"));
        assert_eq!(PropertyValue::Null.as_text(), None);
    }
}
