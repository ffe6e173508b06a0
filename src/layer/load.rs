//! GeoJSON feature collection validation and loading.

use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use geojson::{feature::Id, GeoJson};
use hashbrown::HashSet;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::error::{LayerError, LayerResult};
use super::Layer;
use crate::models::{
    checked_position, CanonicalFields, Feature, FeatureId, Geometry, GeometryFamily, LayerRole,
    PropertyValue,
};

/// Ordered candidate property keys for each canonical field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAliases {
    pub code: Vec<String>,
    pub name: Vec<String>,
    pub substation: Vec<String>,
}

/// How to interpret a raw feature collection
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSchema {
    pub role: LayerRole,
    /// Declared geometry family; every feature must match it when set
    pub family: Option<GeometryFamily>,
    pub aliases: FieldAliases,
}

impl LayerSchema {
    pub fn new(role: LayerRole, family: Option<GeometryFamily>) -> Self {
        Self {
            role,
            family,
            aliases: FieldAliases::default(),
        }
    }

    pub fn with_aliases(mut self, aliases: FieldAliases) -> Self {
        self.aliases = aliases;
        self
    }
}

/// Parse and load a layer from GeoJSON text
pub fn load_str(text: &str, schema: &LayerSchema) -> LayerResult<Layer> {
    let value: Value = serde_json::from_str(text)?;
    load(value, schema)
}

/// Read a GeoJSON file and build an indexed layer.
pub fn load_file(path: &Path, schema: &LayerSchema) -> LayerResult<Layer> {
    let text = fs::read_to_string(path).map_err(|source| LayerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str(&text, schema)
}

/// Validate a raw feature collection and build an indexed layer.
///
/// Features keep their source `id` when one is present; the rest receive
/// their zero-based input position. Colliding ids fail the load.
pub fn load(raw: Value, schema: &LayerSchema) -> LayerResult<Layer> {
    let collection = match GeoJson::from_json_value(raw) {
        Ok(GeoJson::FeatureCollection(collection)) => collection,
        Ok(GeoJson::Feature(_)) => {
            return Err(LayerError::malformed(None, "expected FeatureCollection, found Feature"))
        }
        Ok(GeoJson::Geometry(_)) => {
            return Err(LayerError::malformed(None, "expected FeatureCollection, found geometry"))
        }
        Err(e) => return Err(LayerError::malformed(None, e.to_string())),
    };

    let mut family = schema.family;
    let mut features = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.into_iter().enumerate() {
        let raw_geometry = feature
            .geometry
            .ok_or_else(|| LayerError::malformed(Some(index), "feature has no geometry"))?;
        let geometry = convert_geometry(&raw_geometry.value)
            .map_err(|reason| LayerError::malformed(Some(index), reason))?;

        match family {
            Some(expected) if expected != geometry.family() => {
                return Err(LayerError::malformed(
                    Some(index),
                    format!(
                        "{} geometry in a {} layer",
                        geometry.type_name(),
                        expected
                    ),
                ));
            }
            Some(_) => {}
            None => family = Some(geometry.family()),
        }

        let id = match &feature.id {
            None => index as FeatureId,
            Some(id) => {
                parse_id(id).map_err(|reason| LayerError::malformed(Some(index), reason))?
            }
        };

        let properties = feature
            .properties
            .map(convert_properties)
            .unwrap_or_default();
        let fields = CanonicalFields {
            code: resolve_alias(&properties, &schema.aliases.code),
            name: resolve_alias(&properties, &schema.aliases.name),
            substation: resolve_alias(&properties, &schema.aliases.substation),
        };

        features.push(Feature {
            id,
            geometry,
            properties,
            fields,
        });
    }

    debug!("Validated {} {} features", features.len(), schema.role);
    let layer = Layer::build(schema.role, family, features)?;
    info!("Loaded {} layer with {} features", schema.role, layer.len());
    Ok(layer)
}

fn parse_id(id: &Id) -> Result<FeatureId, String> {
    match id {
        Id::Number(n) => n
            .as_u64()
            .ok_or_else(|| format!("feature id {} is not a non-negative integer", n)),
        Id::String(s) => s
            .trim()
            .parse()
            .map_err(|_| format!("feature id {:?} is not a non-negative integer", s)),
    }
}

fn convert_geometry(value: &geojson::Value) -> Result<Geometry, String> {
    match value {
        geojson::Value::Point(position) => Ok(Geometry::Point(Point(convert_position(position)?))),
        geojson::Value::LineString(positions) => {
            let coords = convert_positions(positions)?;
            if coords.len() < 2 {
                return Err(format!(
                    "line string needs at least 2 positions, found {}",
                    coords.len()
                ));
            }
            Ok(Geometry::LineString(LineString::new(coords)))
        }
        geojson::Value::Polygon(rings) => Ok(Geometry::Polygon(convert_polygon(rings)?)),
        geojson::Value::MultiPolygon(parts) => {
            if parts.is_empty() {
                return Err("multipolygon has no polygons".into());
            }
            let polygons = parts
                .iter()
                .map(|rings| convert_polygon(rings))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
        }
        geojson::Value::MultiPoint(_) => Err("unsupported geometry type MultiPoint".into()),
        geojson::Value::MultiLineString(_) => {
            Err("unsupported geometry type MultiLineString".into())
        }
        geojson::Value::GeometryCollection(_) => {
            Err("unsupported geometry type GeometryCollection".into())
        }
    }
}

fn convert_position(position: &[f64]) -> Result<Coord<f64>, String> {
    match position {
        [lon, lat, ..] => checked_position(*lon, *lat),
        _ => Err("position needs longitude and latitude".into()),
    }
}

fn convert_positions(positions: &[Vec<f64>]) -> Result<Vec<Coord<f64>>, String> {
    positions.iter().map(|p| convert_position(p)).collect()
}

fn convert_ring(positions: &[Vec<f64>]) -> Result<LineString<f64>, String> {
    let coords = convert_positions(positions)?;
    if coords.len() < 4 {
        return Err(format!(
            "ring needs at least 4 positions, found {}",
            coords.len()
        ));
    }
    if coords.first() != coords.last() {
        return Err("ring is not closed".into());
    }
    let distinct: HashSet<(u64, u64)> = coords
        .iter()
        .map(|c| (c.x.to_bits(), c.y.to_bits()))
        .collect();
    if distinct.len() < 3 {
        return Err(format!(
            "ring needs at least 3 distinct vertices, found {}",
            distinct.len()
        ));
    }
    Ok(LineString::new(coords))
}

fn convert_polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, String> {
    let mut rings = rings.iter().map(|ring| convert_ring(ring));
    let exterior = rings.next().ok_or("polygon has no rings")??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn convert_properties(raw: Map<String, Value>) -> BTreeMap<String, PropertyValue> {
    raw.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Null => PropertyValue::Null,
                Value::String(s) => PropertyValue::Text(s),
                Value::Number(n) => n
                    .as_f64()
                    .map(PropertyValue::Number)
                    .unwrap_or_else(|| PropertyValue::Text(n.to_string())),
                Value::Bool(b) => PropertyValue::Text(b.to_string()),
                nested => PropertyValue::Text(nested.to_string()),
            };
            (key, value)
        })
        .collect()
}

/// First candidate key present on the feature: exact match first, then
/// case-insensitive.
fn resolve_alias(
    properties: &BTreeMap<String, PropertyValue>,
    candidates: &[String],
) -> Option<String> {
    if let Some(value) = candidates.iter().find_map(|key| properties.get(key)) {
        return value.as_text();
    }
    candidates.iter().find_map(|key| {
        properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| v.as_text())
    })
}
