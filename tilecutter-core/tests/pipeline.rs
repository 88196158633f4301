use tilecutter_core::pipeline::{self, PipelineConfig};
use tilecutter_core::property::PropertyFilter;

fn config(maxzoom: u8) -> PipelineConfig {
    PipelineConfig {
        name: "test".to_string(),
        layer_name: "layer".to_string(),
        maxzoom,
        minzoom: 0,
        full_detail: PipelineConfig::default_full_detail(maxzoom),
        low_detail: 10,
        droprate: 2.5,
        buffer_pixels: 5,
        property_filter: PropertyFilter::default(),
        tmp_dir: std::env::temp_dir(),
    }
}

#[test]
fn single_point_reaches_every_zoom() {
    let geojson = r#"{
        "type": "Feature",
        "properties": {"name": "airport"},
        "geometry": {"type": "Point", "coordinates": [8.55, 47.37]}
    }"#;
    let (_archive, meta) = pipeline::run(geojson.as_bytes(), &config(4)).unwrap();
    assert_eq!(meta.minzoom, 0);
    assert_eq!(meta.maxzoom, 4);
    assert!((meta.center_lon - 8.55).abs() < 1.0);
    assert!((meta.center_lat - 47.37).abs() < 1.0);
    assert_eq!(meta.attribute_keys, vec!["name".to_string()]);
}

#[test]
fn polygon_covering_whole_world_is_visible_at_root() {
    let geojson = r#"{
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[-179.0, -80.0], [179.0, -80.0], [179.0, 80.0], [-179.0, 80.0], [-179.0, -80.0]]]
        }
    }"#;
    let (_archive, meta) = pipeline::run(geojson.as_bytes(), &config(2)).unwrap();
    assert_eq!(meta.maxzoom, 2);
}

#[test]
fn feature_collection_with_mixed_geometry() {
    let geojson = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"kind": "city"}, "geometry": {"type": "Point", "coordinates": [2.35, 48.85]}},
            {"type": "Feature", "properties": {"kind": "river"}, "geometry": {"type": "LineString", "coordinates": [[2.3, 48.8], [2.4, 48.9]]}}
        ]
    }"#;
    let (_archive, meta) = pipeline::run(geojson.as_bytes(), &config(6)).unwrap();
    assert!(meta.attribute_keys.contains(&"kind".to_string()));
}

#[test]
fn empty_feature_collection_is_an_error() {
    let geojson = r#"{"type": "FeatureCollection", "features": []}"#;
    let err = pipeline::run(geojson.as_bytes(), &config(4)).unwrap_err();
    assert!(matches!(err, tilecutter_core::TcError::EmptyInput));
}

#[test]
fn property_exclusion_is_applied_end_to_end() {
    let geojson = r#"{
        "type": "Feature",
        "properties": {"public": "yes", "secret": "no"},
        "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}
    }"#;
    let mut filter = PropertyFilter::new();
    filter.exclude.insert("secret".to_string());
    let mut cfg = config(3);
    cfg.property_filter = filter;
    let (_archive, meta) = pipeline::run(geojson.as_bytes(), &cfg).unwrap();
    assert!(meta.attribute_keys.contains(&"public".to_string()));
    assert!(!meta.attribute_keys.contains(&"secret".to_string()));
}
