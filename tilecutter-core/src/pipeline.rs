//! Wires the Feature Ingestor, Zoom Recursor, Metadata Emitter and archive
//! writer into the single two-pass run the CLI drives. Analogous to the
//! teacher's CLI `driver.rs`, but over this crate's own pipeline.
use crate::archive::TileArchive;
use crate::error::{Result, TcError};
use crate::geojson_ingest::read_geojson_features;
use crate::ingest::{FeatureIngestor, IngestConfig};
use crate::metadata::{self, ArchiveMetadata};
use crate::property::PropertyFilter;
use crate::recursor::{self, RecursorConfig};
use crate::tempstream::MetaReader;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub name: String,
    pub layer_name: String,
    pub maxzoom: u8,
    pub minzoom: u8,
    pub full_detail: u8,
    pub low_detail: u8,
    pub droprate: f64,
    pub buffer_pixels: i64,
    pub property_filter: PropertyFilter,
    pub tmp_dir: std::path::PathBuf,
}

impl PipelineConfig {
    /// `full_detail` defaults to `26 - maxzoom` when not overridden (spec §6/§8).
    pub fn default_full_detail(maxzoom: u8) -> u8 {
        26u8.saturating_sub(maxzoom)
    }
}

/// Run the whole ingest -> recurse -> write pipeline over `input`, producing
/// the archive's metadata alongside the populated [`TileArchive`].
pub fn run<R: Read>(mut input: R, config: &PipelineConfig) -> Result<(TileArchive, ArchiveMetadata)> {
    let ingest_config = IngestConfig {
        maxzoom: config.maxzoom,
        droprate: config.droprate,
        property_filter: config.property_filter.clone(),
    };
    let mut ingestor = FeatureIngestor::new(&config.tmp_dir, ingest_config)?;
    read_geojson_features(&mut input, &mut ingestor)?;

    let file_bbox = ingestor.file_bbox();
    let (geom_file, meta_file, attribute_keys) = ingestor.finish()?;

    if file_bbox.empty {
        return Err(TcError::EmptyInput);
    }

    let meta = MetaReader::new(meta_file)?;
    let mut archive = TileArchive::new();
    let recursor_config = RecursorConfig {
        minzoom: config.minzoom,
        maxzoom: config.maxzoom,
        full_detail: config.full_detail,
        low_detail: config.low_detail,
        buffer_pixels: config.buffer_pixels,
        layer_name: config.layer_name.clone(),
    };
    let center = recursor::run(&config.tmp_dir, geom_file, &meta, &mut archive, &recursor_config)?;

    let archive_meta = metadata::build(
        config.name.clone(),
        config.layer_name.clone(),
        config.minzoom,
        config.maxzoom,
        &file_bbox,
        center,
        attribute_keys,
    );
    archive.set_metadata(&archive_meta)?;

    Ok((archive, archive_meta))
}

/// Write the finished archive to `output_path`.
pub fn write_archive(archive: TileArchive, output_path: &Path, force: bool) -> Result<()> {
    archive.write(output_path, force)
}
