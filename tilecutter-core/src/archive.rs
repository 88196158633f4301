//! Wraps the external `pmtiles2` crate (the out-of-scope "tile archive
//! writer" collaborator): a row-oriented `(z,x,y) -> blob` store plus
//! JSON-ish archive metadata, persisted as a single PMTiles file.
use crate::error::{Result, TcError};
use crate::metadata::ArchiveMetadata;
use pmtiles2::util::tile_id;
use pmtiles2::{Compression, PMTiles, TileType};
use std::path::Path;

pub struct TileArchive {
    pmtiles: PMTiles,
}

impl TileArchive {
    pub fn new() -> Self {
        TileArchive {
            pmtiles: PMTiles::new(TileType::Mvt, Compression::Gzip),
        }
    }

    /// Store an already-encoded MVT blob under `(z, x, y)`.
    pub fn put_tile(&mut self, z: u8, x: u32, y: u32, bytes: Vec<u8>) -> Result<()> {
        self.pmtiles
            .add_tile(tile_id(z, x, y), bytes.into())
            .map_err(|e| TcError::Archive(e.to_string()))
    }

    pub fn set_metadata(&mut self, meta: &ArchiveMetadata) -> Result<()> {
        self.pmtiles.min_zoom = meta.minzoom;
        self.pmtiles.max_zoom = meta.maxzoom;
        self.pmtiles.min_longitude = meta.bbox.min_lon;
        self.pmtiles.min_latitude = meta.bbox.min_lat;
        self.pmtiles.max_longitude = meta.bbox.max_lon;
        self.pmtiles.max_latitude = meta.bbox.max_lat;
        self.pmtiles.center_zoom = meta.center_zoom;
        self.pmtiles.center_longitude = meta.center_lon;
        self.pmtiles.center_latitude = meta.center_lat;
        self.pmtiles.meta_data = Some(serde_json::json!({
            "name": meta.name,
            "vector_layers": [{
                "id": meta.layer_name,
                "fields": meta.attribute_keys,
            }],
        }));
        Ok(())
    }

    /// Write the archive to `path`. If `force`, a pre-existing file is
    /// removed first rather than erroring.
    ///
    /// `pmtiles2`'s writer is `async fn`; this pipeline is otherwise fully
    /// synchronous (spec §5), so the one async call is driven inline with
    /// `futures::executor::block_on` over a plain `std::fs::File` rather
    /// than pulling in a full Tokio runtime for a single blocking write.
    pub fn write(self, path: &Path, force: bool) -> Result<()> {
        if force && path.exists() {
            std::fs::remove_file(path)?;
        }
        let file = std::fs::File::create(path)?;
        let mut sink = futures::io::AllowStdIo::new(file);
        futures::executor::block_on(self.pmtiles.to_writer(&mut sink))
            .map_err(|e| TcError::Archive(e.to_string()))
    }
}

impl Default for TileArchive {
    fn default() -> Self {
        Self::new()
    }
}
