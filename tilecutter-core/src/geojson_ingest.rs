//! GeoJSON ingestion: drives a [`FeatureProcessor`] from a streamed sequence
//! of `Feature` objects — either a top-level `FeatureCollection` or a bare
//! stream of `Feature` values. The whole document is never buffered in
//! memory; features are dispatched to the processor as the reader yields
//! them.
use crate::error::Result;
use crate::property_processor::PropertyValue;
use crate::{FeatureProcessor, GeomProcessor, PropertyProcessor};
use geojson::{Feature, FeatureReader, Geometry, Value};
use serde_json::map::Map;
use serde_json::value::Value as JsonValue;
use std::io::Read;

/// Read a stream of `Feature` objects — a `FeatureCollection`'s `features`
/// array or a bare sequence of `Feature` values, as produced by many GeoJSON
/// exporters for large datasets — and drive `processor` with it.
pub fn read_geojson_features<R: Read, P: FeatureProcessor>(
    reader: R,
    processor: &mut P,
) -> Result<()> {
    processor.dataset_begin(None)?;
    for (idx, feature) in FeatureReader::from_reader(reader).features().enumerate() {
        process_feature(&feature?, idx as u64, processor)?;
    }
    processor.dataset_end()
}

fn process_feature<P: FeatureProcessor>(
    feature: &Feature,
    idx: u64,
    processor: &mut P,
) -> Result<()> {
    processor.feature_begin(idx)?;
    if let Some(ref properties) = feature.properties {
        processor.properties_begin()?;
        process_properties(properties, processor)?;
        processor.properties_end()?;
    }
    match feature.geometry {
        Some(ref geometry) => {
            processor.geometry_begin()?;
            process_geometry(geometry, idx as usize, processor)?;
            processor.geometry_end()?;
        }
        None => log::warn!("feature {idx} has null geometry, skipping"),
    }
    processor.feature_end(idx)
}

fn process_geometry<P: GeomProcessor>(geom: &Geometry, idx: usize, processor: &mut P) -> Result<()> {
    match geom.value {
        Value::Point(ref coords) => {
            processor.point_begin(idx)?;
            process_coord(coords, 0, processor)?;
            processor.point_end(idx)
        }
        Value::MultiPoint(ref coords) => {
            processor.multipoint_begin(coords.len(), idx)?;
            for (i, c) in coords.iter().enumerate() {
                process_coord(c, i, processor)?;
            }
            processor.multipoint_end(idx)
        }
        Value::LineString(ref coords) => process_linestring(coords, true, idx, processor),
        Value::MultiLineString(ref lines) => {
            processor.multilinestring_begin(lines.len(), idx)?;
            for (i, line) in lines.iter().enumerate() {
                process_linestring(line, false, i, processor)?;
            }
            processor.multilinestring_end(idx)
        }
        Value::Polygon(ref rings) => process_polygon(rings, true, idx, processor),
        Value::MultiPolygon(ref polygons) => {
            processor.multipolygon_begin(polygons.len(), idx)?;
            for (i, rings) in polygons.iter().enumerate() {
                process_polygon(rings, false, i, processor)?;
            }
            processor.multipolygon_end(idx)
        }
        Value::GeometryCollection(_) => {
            log::warn!("unsupported GeometryCollection, skipping feature {idx}");
            Ok(())
        }
    }
}

fn process_properties<P: PropertyProcessor>(
    properties: &Map<String, JsonValue>,
    processor: &mut P,
) -> Result<()> {
    for (i, (key, value)) in properties.iter().enumerate() {
        match value {
            JsonValue::String(v) => processor.property(i, key, &PropertyValue::String(v.clone()))?,
            JsonValue::Number(v) => processor.property(i, key, &PropertyValue::Number(v.to_string()))?,
            JsonValue::Bool(v) => processor.property(i, key, &PropertyValue::Boolean(*v))?,
            JsonValue::Null => false,
            other => {
                log::warn!("unsupported property type for `{key}`, skipping: {other}");
                false
            }
        };
    }
    Ok(())
}

type Position = Vec<f64>;

fn process_coord<P: GeomProcessor>(coord: &Position, idx: usize, processor: &mut P) -> Result<()> {
    if coord.len() < 2 {
        log::warn!("position has fewer than 2 coordinates, skipping");
        return Ok(());
    }
    if coord.len() > 2 {
        processor.warn_extra_dimensions()?;
    }
    processor.xy(coord[0], coord[1], idx)
}

fn process_linestring<P: GeomProcessor>(
    line: &[Position],
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> Result<()> {
    processor.linestring_begin(tagged, line.len(), idx)?;
    for (i, coord) in line.iter().enumerate() {
        process_coord(coord, i, processor)?;
    }
    processor.linestring_end(tagged, idx)
}

fn process_polygon<P: GeomProcessor>(
    rings: &[Vec<Position>],
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> Result<()> {
    processor.polygon_begin(tagged, rings.len(), idx)?;
    for (i, ring) in rings.iter().enumerate() {
        process_linestring(ring, false, i, processor)?;
    }
    processor.polygon_end(tagged, idx)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::TcError;

    struct CountingSink {
        features: u64,
        points: usize,
        extra_dims_warnings: u32,
    }

    impl GeomProcessor for CountingSink {
        fn xy(&mut self, _x: f64, _y: f64, _idx: usize) -> Result<()> {
            self.points += 1;
            Ok(())
        }

        fn warn_extra_dimensions(&mut self) -> Result<()> {
            self.extra_dims_warnings += 1;
            Ok(())
        }
    }
    impl PropertyProcessor for CountingSink {}
    impl FeatureProcessor for CountingSink {
        fn feature_begin(&mut self, _idx: u64) -> Result<()> {
            self.features += 1;
            Ok(())
        }
    }

    fn sink() -> CountingSink {
        CountingSink { features: 0, points: 0, extra_dims_warnings: 0 }
    }

    #[test]
    fn feature_collection() -> Result<()> {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "a"}, "geometry": {"type": "Point", "coordinates": [1,2]}},
                {"type": "Feature", "properties": {"name": "b"}, "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1],[2,2]]}}
            ]
        }"#;
        let mut sink = sink();
        read_geojson_features(geojson.as_bytes(), &mut sink)?;
        assert_eq!(sink.features, 2);
        assert_eq!(sink.points, 4);
        Ok(())
    }

    #[test]
    fn bare_feature() -> Result<()> {
        let geojson = r#"{"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1,2]}}"#;
        let mut sink = sink();
        read_geojson_features(geojson.as_bytes(), &mut sink)?;
        assert_eq!(sink.features, 1);
        assert_eq!(sink.points, 1);
        Ok(())
    }

    #[test]
    fn malformed_input_is_fatal() {
        let mut sink = sink();
        let err = read_geojson_features("not json".as_bytes(), &mut sink).unwrap_err();
        assert!(matches!(err, TcError::GeoJson(_)));
    }

    #[test]
    fn short_position_is_skipped_not_fatal() -> Result<()> {
        let geojson = r#"{"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1]}}"#;
        let mut sink = sink();
        read_geojson_features(geojson.as_bytes(), &mut sink)?;
        assert_eq!(sink.features, 1);
        assert_eq!(sink.points, 0);
        Ok(())
    }

    #[test]
    fn extra_dimensions_warn_once_and_still_ingest_xy() -> Result<()> {
        let geojson = r#"{"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1,2,3,4]}}"#;
        let mut sink = sink();
        read_geojson_features(geojson.as_bytes(), &mut sink)?;
        assert_eq!(sink.points, 1);
        assert_eq!(sink.extra_dims_warnings, 1);
        Ok(())
    }

    #[test]
    fn null_geometry_feature_still_runs_lifecycle() -> Result<()> {
        let geojson = r#"{"type": "Feature", "properties": {"name": "a"}, "geometry": null}"#;
        let mut sink = sink();
        read_geojson_features(geojson.as_bytes(), &mut sink)?;
        assert_eq!(sink.features, 1);
        assert_eq!(sink.points, 0);
        Ok(())
    }
}
