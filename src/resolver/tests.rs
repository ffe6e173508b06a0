//! End-to-end resolution tests over small hand-built layers.

use geo::Coord;
use serde_json::{json, Value};

use super::{AssignmentResolver, ResolverOptions};
use crate::layer::{load, FieldAliases, Layer, LayerSchema, LayerSet};
use crate::models::{GeometryFamily, LayerRole, ASSIGNED, OOT, OUT_OF_TERRITORY};

fn c(x: f64, y: f64) -> Coord<f64> {
    Coord { x, y }
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Value {
    json!([[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]])
}

fn polygon_feature(props: Value, rings: Value) -> Value {
    json!({"type": "Feature", "geometry": {"type": "Polygon", "coordinates": rings}, "properties": props})
}

fn point_feature(props: Value, x: f64, y: f64) -> Value {
    json!({"type": "Feature", "geometry": {"type": "Point", "coordinates": [x, y]}, "properties": props})
}

fn line_feature(props: Value, coords: Value) -> Value {
    json!({"type": "Feature", "geometry": {"type": "LineString", "coordinates": coords}, "properties": props})
}

fn build(role: LayerRole, family: GeometryFamily, features: Value) -> Layer {
    let aliases = FieldAliases {
        code: vec!["Number_".into(), "Feeder_Code".into()],
        name: vec!["Substation".into(), "stationID".into()],
        substation: vec!["Substation".into()],
    };
    let schema = LayerSchema::new(role, Some(family)).with_aliases(aliases);
    load(json!({"type": "FeatureCollection", "features": features}), &schema).unwrap()
}

/// Zone-A around the query point, G1 containing it and G2 directly north
fn territory() -> LayerSet {
    LayerSet {
        substations: Some(build(
            LayerRole::Substation,
            GeometryFamily::Polygon,
            json!([polygon_feature(json!({"Substation": "Zone-A"}), rect(-94.5, 35.5, -93.9, 36.5))]),
        )),
        grids: Some(build(
            LayerRole::Grid,
            GeometryFamily::Polygon,
            json!([
                polygon_feature(json!({"Number_": "G1"}), rect(-94.25, 35.95, -94.15, 36.05)),
                polygon_feature(json!({"Number_": "G2"}), rect(-94.25, 36.05, -94.15, 36.15)),
            ]),
        )),
        huts: Some(build(
            LayerRole::Hut,
            GeometryFamily::Point,
            json!([
                point_feature(json!({"stationID": "HUT-7"}), -94.21, 36.0),
                point_feature(json!({"stationID": "HUT-9"}), -94.0, 36.3),
            ]),
        )),
        ..Default::default()
    }
}

#[test]
fn test_point_inside_zone_and_grid() {
    let resolver = AssignmentResolver::default();
    let result = resolver.resolve(c(-94.20, 36.00), &territory());

    assert_eq!(result.substation_name.as_deref(), Some("Zone-A"));
    assert!(!result.out_of_territory);
    assert_eq!(result.grid.code.as_deref(), Some("G1"));
    assert_eq!(result.grid.feature_id, Some(0));

    let north = result.neighbors.north.expect("north neighbor");
    assert_eq!(north.code.as_deref(), Some("G2"));
    assert!(north.distance_miles > 0.0);

    let hut = result.hut.expect("hut");
    assert_eq!(hut.name.as_deref(), Some("HUT-7"));
    assert!(hut.distance_text.starts_with('~') && hut.distance_text.ends_with(" mi"));
}

#[test]
fn test_neighbors_exclude_containing_grid() {
    let resolver = AssignmentResolver::default();
    let result = resolver.resolve(c(-94.20, 36.00), &territory());

    // Only G2 exists besides the containing grid, and its centroid is north
    assert!(result.neighbors.south.is_none());
    assert!(result.neighbors.east.is_none());
    assert!(result.neighbors.west.is_none());
    for hit in [
        &result.neighbors.north,
        &result.neighbors.south,
        &result.neighbors.east,
        &result.neighbors.west,
    ]
    .into_iter()
    .flatten()
    {
        assert_ne!(hit.code.as_deref(), Some("G1"));
    }
}

#[test]
fn test_point_outside_every_polygon() {
    let resolver = AssignmentResolver::default();
    let mut layers = territory();
    layers.feeders = Some(build(
        LayerRole::Feeder,
        GeometryFamily::Polygon,
        json!([polygon_feature(json!({"Feeder_Code": "F-1", "Substation": "Zone-A"}), rect(-94.5, 35.5, -93.9, 36.5))]),
    ));

    // Well south of everything
    let result = resolver.resolve(c(-94.20, 35.00), &layers);

    assert!(result.out_of_territory);
    assert_eq!(result.substation_name.as_deref(), Some(OUT_OF_TERRITORY));
    assert_eq!(result.feeder.code.as_deref(), Some(OUT_OF_TERRITORY));
    assert!(result.feeder.distance_text.is_none());
    assert_eq!(result.grid.code.as_deref(), Some(OOT));
    assert!(result.grid.neighbor_fallback_code.is_none());

    // The north ray reaches G1 first; no other direction has a candidate
    assert_eq!(
        result.neighbors.north.as_ref().and_then(|n| n.code.as_deref()),
        Some("G1")
    );
    assert!(result.neighbors.south.is_none());
    assert!(result.neighbors.east.is_none());
    assert!(result.neighbors.west.is_none());
}

#[test]
fn test_oot_grid_layer_supplies_fallback_code() {
    let resolver = AssignmentResolver::default();
    let mut layers = territory();
    layers.grid_oot = Some(build(
        LayerRole::GridOot,
        GeometryFamily::Polygon,
        json!([
            polygon_feature(json!({"Number_": "X-9"}), rect(-95.5, 34.5, -95.4, 34.6)),
            polygon_feature(json!({"Number_": "X-1"}), rect(-94.25, 34.9, -94.15, 34.95)),
        ]),
    ));

    let result = resolver.resolve(c(-94.20, 35.00), &layers);
    assert_eq!(result.grid.code.as_deref(), Some(OOT));
    assert_eq!(result.grid.neighbor_fallback_code.as_deref(), Some("X-1"));
}

#[test]
fn test_oot_overrides_nearest_point_substation() {
    let resolver = AssignmentResolver::default();
    let layers = LayerSet {
        substations: Some(build(
            LayerRole::Substation,
            GeometryFamily::Point,
            json!([point_feature(json!({"Substation": "Closest"}), -94.2, 35.01)]),
        )),
        feeders: Some(build(
            LayerRole::Feeder,
            GeometryFamily::Polygon,
            json!([polygon_feature(json!({"Feeder_Code": "F-1"}), rect(-94.5, 35.5, -93.9, 36.5))]),
        )),
        ..Default::default()
    };

    let result = resolver.resolve(c(-94.20, 35.00), &layers);
    assert!(result.out_of_territory);
    assert_eq!(result.substation_name.as_deref(), Some(OUT_OF_TERRITORY));
    assert_eq!(result.substation_id, None);
    assert_eq!(result.feeder.code.as_deref(), Some(OUT_OF_TERRITORY));
    assert!(!result.feeder.assigned);
    assert_eq!(result.feeder.feature_id, None);

    // Inside the feeder area the nearest substation point is reported
    let result = resolver.resolve(c(-94.20, 36.00), &layers);
    assert!(!result.out_of_territory);
    assert_eq!(result.substation_name.as_deref(), Some("Closest"));
    assert_eq!(result.feeder.code.as_deref(), Some("F-1"));
    assert_eq!(result.feeder.distance_text.as_deref(), Some(ASSIGNED));
}

#[test]
fn test_line_feeder_tolerance() {
    let resolver = AssignmentResolver::new(ResolverOptions {
        feeder_tolerance_miles: 0.25,
        nearby_grid_count: 0,
    });
    let mut layers = territory();
    layers.feeders = Some(build(
        LayerRole::Feeder,
        GeometryFamily::Line,
        json!([line_feature(
            json!({"Feeder_Code": "F-22", "Substation": "Zone-A"}),
            json!([[-94.3, 36.001], [-94.1, 36.001]])
        )]),
    ));

    // ~0.07 mi from the line
    let near = resolver.resolve(c(-94.20, 36.00), &layers);
    assert!(near.feeder.assigned);
    assert_eq!(near.feeder.code.as_deref(), Some("F-22"));
    assert_eq!(near.feeder.substation_name.as_deref(), Some("Zone-A"));
    assert_eq!(near.feeder.distance_text.as_deref(), Some(ASSIGNED));
    assert!(near.nearby_grids.is_empty());

    // ~0.69 mi from the line, still inside Zone-A
    let far = resolver.resolve(c(-94.20, 36.011), &layers);
    assert!(!far.feeder.assigned);
    assert!(!far.out_of_territory);
    assert_eq!(far.feeder.distance_text.as_deref(), Some("~0.69 mi"));
}

#[test]
fn test_line_feeder_does_not_rescue_point_outside_zone() {
    let resolver = AssignmentResolver::default();
    let mut layers = territory();
    layers.feeders = Some(build(
        LayerRole::Feeder,
        GeometryFamily::Line,
        json!([line_feature(json!({"Feeder_Code": "F-22"}), json!([[-94.3, 35.0], [-94.1, 35.0]]))]),
    ));

    let result = resolver.resolve(c(-94.20, 35.00), &layers);
    assert!(result.out_of_territory);
    assert_eq!(result.feeder.code.as_deref(), Some(OUT_OF_TERRITORY));
    assert_eq!(result.feeder.substation_name.as_deref(), Some(OUT_OF_TERRITORY));
    assert!(!result.feeder.assigned);
    assert_eq!(result.feeder.distance_miles, None);
    assert_eq!(result.feeder.distance_text, None);
    assert_eq!(result.feeder.feature_id, None);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["feeder"]["assigned"], false);
    assert!(json["feeder"].get("distanceMiles").is_none());
}

#[test]
fn test_untyped_empty_layers_do_not_force_out_of_territory() {
    let resolver = AssignmentResolver::default();
    let empty = |role| {
        load(
            json!({"type": "FeatureCollection", "features": []}),
            &LayerSchema::new(role, None),
        )
        .unwrap()
    };
    let layers = LayerSet {
        substations: Some(empty(LayerRole::Substation)),
        feeders: Some(empty(LayerRole::Feeder)),
        ..Default::default()
    };

    let result = resolver.resolve(c(-94.20, 36.00), &layers);
    assert!(!result.out_of_territory);
    assert_eq!(result.substation_name, None);
    assert_eq!(result.feeder.code, None);
    assert!(!result.feeder.assigned);
}

#[test]
fn test_point_in_zone_hole_is_not_contained() {
    let resolver = AssignmentResolver::default();
    let rings = json!([
        [[-94.5, 35.5], [-93.9, 35.5], [-93.9, 36.5], [-94.5, 36.5], [-94.5, 35.5]],
        [[-94.3, 35.9], [-94.1, 35.9], [-94.1, 36.1], [-94.3, 36.1], [-94.3, 35.9]]
    ]);
    let layers = LayerSet {
        substations: Some(build(
            LayerRole::Substation,
            GeometryFamily::Polygon,
            json!([polygon_feature(json!({"Substation": "Donut"}), rings)]),
        )),
        ..Default::default()
    };

    let inside_hole = resolver.resolve(c(-94.20, 36.00), &layers);
    assert!(inside_hole.out_of_territory);

    let inside_ring = resolver.resolve(c(-94.40, 36.00), &layers);
    assert_eq!(inside_ring.substation_name.as_deref(), Some("Donut"));
}

#[test]
fn test_no_layers() {
    let resolver = AssignmentResolver::default();
    let result = resolver.resolve(c(-94.20, 36.00), &LayerSet::default());

    assert!(!result.out_of_territory);
    assert!(result.substation_name.is_none());
    assert!(result.hut.is_none());
    assert!(result.feeder.code.is_none());
    assert_eq!(result.grid.code.as_deref(), Some(OOT));
    assert!(result.grid.neighbor_fallback_code.is_none());
    assert!(result.neighbors.north.is_none());
}

#[test]
fn test_nearby_grids() {
    let resolver = AssignmentResolver::default();
    let result = resolver.resolve(c(-94.20, 36.00), &territory());

    assert_eq!(result.nearby_grids.len(), 2);
    assert_eq!(result.nearby_grids[0].code.as_deref(), Some("G1"));
    assert_eq!(result.nearby_grids[1].code.as_deref(), Some("G2"));
    assert_eq!(result.nearby_grids[1].compass, "N");
}

#[test]
fn test_resolve_is_idempotent() {
    let resolver = AssignmentResolver::default();
    let layers = territory();

    for point in [c(-94.20, 36.00), c(-94.20, 35.00), c(-94.16, 36.14)] {
        let first = serde_json::to_string(&resolver.resolve(point, &layers)).unwrap();
        let second = serde_json::to_string(&resolver.resolve(point, &layers)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_result_serializes_contract_field_names() {
    let resolver = AssignmentResolver::default();
    let result = resolver.resolve(c(-94.20, 36.00), &territory());
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["substationName"], "Zone-A");
    assert_eq!(value["grid"]["code"], "G1");
    assert!(value["grid"]["neighborFallbackCode"].is_null());
    assert_eq!(value["neighbors"]["N"]["code"], "G2");
    assert!(value["neighbors"]["S"].is_null());
    assert!(value["hut"]["distanceMiles"].as_f64().unwrap() > 0.0);
}
