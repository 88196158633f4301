//! Feature Ingestor: for every feature, projects geometry, serializes it
//! into the geom file, filters and serializes its properties into the meta
//! file, and computes its minzoom (spec §4.3).
use crate::context::Context;
use crate::coord::{self, WorldBBox, WorldCoord};
use crate::error::Result;
use crate::feature_processor::FeatureProcessor;
use crate::geometry_processor::GeomProcessor;
use crate::ops::{DrawOp, GeomKind};
use crate::property::{PropType, PropertyFilter};
use crate::property_processor::{PropertyProcessor, PropertyValue};
use crate::tempstream::{GeomWriter, MetaWriter};
use dup_indexer::DupIndexer;
use std::path::Path;

/// Ingest-pass configuration, the part of the CLI surface that shapes what
/// gets written rather than how the archive is addressed.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub maxzoom: u8,
    pub droprate: f64,
    pub property_filter: PropertyFilter,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            maxzoom: 14,
            droprate: 2.5,
            property_filter: PropertyFilter::default(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CoordMode {
    /// Every coordinate gets its own `MoveTo` (Point, each MultiPoint member).
    Standalone,
    /// First coordinate in the path is `MoveTo`, the rest are `LineTo`.
    Path,
}

/// Drives geometry and property serialization for one dataset into a pair
/// of level-0 temp files.
pub struct FeatureIngestor {
    geom: GeomWriter,
    meta: MetaWriter,
    config: IngestConfig,
    context: Context,

    file_bbox: WorldBBox,
    feature_count: u64,
    skipped_count: u64,
    /// Deduplicated dictionary of property keys seen across all features,
    /// surfaced to the metadata emitter's `vector_layers[].fields`.
    attribute_keys: DupIndexer<String>,

    // Per-feature scratch state, reset in geometry_begin/feature_begin.
    ops: Vec<DrawOp>,
    bbox: WorldBBox,
    kind: Option<GeomKind>,
    coord_mode: CoordMode,
    in_ring: bool,
    ring_start_len: usize,
    props: Vec<(PropType, String, String)>,
}

impl FeatureIngestor {
    pub fn new(tmp_dir: &Path, config: IngestConfig) -> Result<Self> {
        let mut geom = GeomWriter::new(tmp_dir)?;
        // The whole dataset is tile (0, 0, 0) at level 0; the recursor's
        // state machine only starts buffering once it has seen a header.
        geom.write_tile_header(0, 0, 0)?;
        Ok(FeatureIngestor {
            geom,
            meta: MetaWriter::new(tmp_dir)?,
            config,
            context: Context::new(),
            file_bbox: WorldBBox::default(),
            feature_count: 0,
            skipped_count: 0,
            attribute_keys: DupIndexer::new(),
            ops: Vec::new(),
            bbox: WorldBBox::default(),
            kind: None,
            coord_mode: CoordMode::Standalone,
            in_ring: false,
            ring_start_len: 0,
            props: Vec::new(),
        })
    }

    pub fn file_bbox(&self) -> WorldBBox {
        self.file_bbox
    }

    pub fn feature_count(&self) -> u64 {
        self.feature_count
    }

    pub fn skipped_count(&self) -> u64 {
        self.skipped_count
    }

    /// Finish ingest, returning the rewound geom and meta files ready for
    /// the recursor plus the deduplicated property-key dictionary.
    pub fn finish(self) -> Result<(std::fs::File, std::fs::File, Vec<String>)> {
        let geom = self.geom.finish()?;
        let meta = self.meta.finish()?;
        Ok((geom, meta, self.attribute_keys.into_vec()))
    }

    fn minzoom(&self) -> i8 {
        match self.kind {
            Some(GeomKind::Point) => self.point_minzoom(),
            _ => self.bbox.spanning_zoom() as i8,
        }
    }

    /// §4.3 POINT case: geometric thinning via a per-feature uniform draw.
    fn point_minzoom(&self) -> i8 {
        let r = self.context.sample_unit_interval();
        let dropped_levels = (r.ln() / -self.config.droprate.ln()).floor();
        let mz = self.config.maxzoom as f64 - dropped_levels;
        mz.max(0.0) as i8
    }
}

impl GeomProcessor for FeatureIngestor {
    fn xy(&mut self, x: f64, y: f64, idx: usize) -> Result<()> {
        let c = coord::project(x, y);
        self.bbox.expand(c);
        match self.coord_mode {
            CoordMode::Standalone => self.ops.push(DrawOp::MoveTo(c)),
            CoordMode::Path => {
                if idx == 0 {
                    self.ops.push(DrawOp::MoveTo(c));
                } else {
                    self.ops.push(DrawOp::LineTo(c));
                }
            }
        }
        Ok(())
    }

    fn point_begin(&mut self, _idx: usize) -> Result<()> {
        self.kind = Some(GeomKind::Point);
        self.coord_mode = CoordMode::Standalone;
        Ok(())
    }

    fn multipoint_begin(&mut self, _size: usize, _idx: usize) -> Result<()> {
        self.kind = Some(GeomKind::Point);
        self.coord_mode = CoordMode::Standalone;
        Ok(())
    }

    fn linestring_begin(&mut self, _tagged: bool, _size: usize, _idx: usize) -> Result<()> {
        if self.kind.is_none() {
            self.kind = Some(GeomKind::Line);
        }
        self.coord_mode = CoordMode::Path;
        self.ring_start_len = self.ops.len();
        Ok(())
    }

    fn linestring_end(&mut self, _tagged: bool, _idx: usize) -> Result<()> {
        if self.in_ring && self.ops.len() > self.ring_start_len {
            self.ops.push(DrawOp::ClosePath);
        }
        Ok(())
    }

    fn multilinestring_begin(&mut self, _size: usize, _idx: usize) -> Result<()> {
        self.kind = Some(GeomKind::Line);
        Ok(())
    }

    fn polygon_begin(&mut self, _tagged: bool, _size: usize, _idx: usize) -> Result<()> {
        self.kind = Some(GeomKind::Polygon);
        self.in_ring = true;
        Ok(())
    }

    fn polygon_end(&mut self, _tagged: bool, _idx: usize) -> Result<()> {
        self.in_ring = false;
        Ok(())
    }

    fn multipolygon_begin(&mut self, _size: usize, _idx: usize) -> Result<()> {
        self.kind = Some(GeomKind::Polygon);
        Ok(())
    }

    fn warn_extra_dimensions(&mut self) -> Result<()> {
        self.context.warn_extra_dimensions_once();
        Ok(())
    }
}

impl PropertyProcessor for FeatureIngestor {
    fn property(&mut self, _idx: usize, name: &str, value: &PropertyValue) -> Result<bool> {
        if !self.config.property_filter.passes(name) {
            return Ok(false);
        }
        self.attribute_keys.insert(name.to_string());
        // Indices from insert() aren't used directly; the meta record
        // stores keys inline, so this call only deduplicates for the
        // archive-level attribute dictionary.
        let (ty, text) = match value {
            PropertyValue::String(s) => (PropType::String, s.clone()),
            PropertyValue::Number(s) => (PropType::Number, s.clone()),
            PropertyValue::Boolean(b) => (PropType::Boolean, b.to_string()),
        };
        self.props.push((ty, name.to_string(), text));
        Ok(false)
    }
}

impl FeatureProcessor for FeatureIngestor {
    fn feature_begin(&mut self, _idx: u64) -> Result<()> {
        self.ops.clear();
        self.props.clear();
        self.bbox = WorldBBox::default();
        self.kind = None;
        self.coord_mode = CoordMode::Standalone;
        self.in_ring = false;
        Ok(())
    }

    fn feature_end(&mut self, _idx: u64) -> Result<()> {
        let Some(kind) = self.kind else {
            // Null/absent geometry: warned in geojson_ingest::process_feature.
            self.skipped_count += 1;
            return Ok(());
        };
        if self.ops.is_empty() {
            self.skipped_count += 1;
            return Ok(());
        }
        let metastart = self.meta.write_record(&self.props)?;
        let minzoom = self.minzoom();
        self.geom.write_feature(kind, metastart, &self.ops, minzoom)?;
        self.file_bbox.union(&self.bbox);
        self.feature_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geojson_ingest::read_geojson_features;

    #[test]
    fn point_feature_minzoom_zero_maxzoom_zero() -> Result<()> {
        let dir = std::env::temp_dir();
        let config = IngestConfig {
            maxzoom: 0,
            ..IngestConfig::default()
        };
        let mut ingestor = FeatureIngestor::new(&dir, config)?;
        let geojson = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{}}"#;
        read_geojson_features(geojson.as_bytes(), &mut ingestor)?;
        assert_eq!(ingestor.feature_count(), 1);
        assert_eq!(ingestor.file_bbox().min_x, 1u32 << 31);
        Ok(())
    }

    #[test]
    fn triangle_polygon_closes_ring() -> Result<()> {
        let dir = std::env::temp_dir();
        let mut ingestor = FeatureIngestor::new(&dir, IngestConfig::default())?;
        let geojson = r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[0,1],[0,0]]]}}"#;
        read_geojson_features(geojson.as_bytes(), &mut ingestor)?;
        assert_eq!(ingestor.ops.last(), Some(&DrawOp::ClosePath));
        assert_eq!(ingestor.feature_count(), 1);
        Ok(())
    }

    #[test]
    fn property_filter_drops_excluded_keys() -> Result<()> {
        let dir = std::env::temp_dir();
        let mut filter = PropertyFilter::new();
        filter.exclude_all = true;
        filter.include.insert("name".to_string());
        let config = IngestConfig {
            property_filter: filter,
            ..IngestConfig::default()
        };
        let mut ingestor = FeatureIngestor::new(&dir, config)?;
        let geojson = r#"{"type":"Feature","properties":{"name":"a","other":"b"},"geometry":{"type":"Point","coordinates":[0,0]}}"#;
        read_geojson_features(geojson.as_bytes(), &mut ingestor)?;
        assert_eq!(ingestor.props.len(), 1);
        assert_eq!(ingestor.props[0].1, "name");
        Ok(())
    }

    #[test]
    fn empty_geometry_is_skipped_not_fatal() -> Result<()> {
        let dir = std::env::temp_dir();
        let mut ingestor = FeatureIngestor::new(&dir, IngestConfig::default())?;
        let geojson = r#"{"type":"Feature","properties":{},"geometry":null}"#;
        read_geojson_features(geojson.as_bytes(), &mut ingestor)?;
        assert_eq!(ingestor.feature_count(), 0);
        assert_eq!(ingestor.skipped_count(), 1);
        Ok(())
    }

    #[test]
    fn extra_coordinate_dimensions_are_dropped_not_fatal() -> Result<()> {
        let dir = std::env::temp_dir();
        let mut ingestor = FeatureIngestor::new(&dir, IngestConfig::default())?;
        let geojson = r#"{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1,2,3,4]}}"#;
        read_geojson_features(geojson.as_bytes(), &mut ingestor)?;
        assert_eq!(ingestor.feature_count(), 1);
        Ok(())
    }

    #[test]
    fn short_position_is_skipped_leaving_rest_of_feature_intact() -> Result<()> {
        let dir = std::env::temp_dir();
        let mut ingestor = FeatureIngestor::new(&dir, IngestConfig::default())?;
        let geojson = r#"{"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[0,0],[1],[1,1]]}}"#;
        read_geojson_features(geojson.as_bytes(), &mut ingestor)?;
        assert_eq!(ingestor.feature_count(), 1);
        Ok(())
    }
}
