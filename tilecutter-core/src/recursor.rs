//! Zoom Recursor: iterative, level-wise quadrant subdivision (spec §4.4).
//!
//! Peak memory is bounded by at most four mmapped previous-level files plus
//! four output write buffers (spec §9 "Recursion vs iteration") — each
//! level z is fully consumed before level z+1 starts.
use crate::archive::TileArchive;
use crate::coord::WorldBBox;
use crate::error::Result;
use crate::metadata::CenterTile;
use crate::ops::{DrawOp, GeomKind};
use crate::property::PropType;
use crate::tempstream::{GeomReader, GeomRecord, GeomWriter, MetaReader};
use crate::tile_encoder::{self, TileFeature};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct RecursorConfig {
    pub minzoom: u8,
    pub maxzoom: u8,
    pub full_detail: u8,
    pub low_detail: u8,
    pub buffer_pixels: i64,
    pub layer_name: String,
}

/// One buffered feature, read back from a geom stream with its bbox
/// derived from its own ops (needed for quadrant-intersection tests).
struct BufferedFeature {
    kind: GeomKind,
    meta_offset: i64,
    ops: Vec<DrawOp>,
    minzoom: i8,
    bbox: WorldBBox,
}

fn ops_bbox(ops: &[DrawOp]) -> WorldBBox {
    let mut bbox = WorldBBox::default();
    for op in ops {
        match op {
            DrawOp::MoveTo(c) | DrawOp::LineTo(c) => bbox.expand(*c),
            DrawOp::ClosePath => {}
        }
    }
    bbox
}

/// Run the full recursion from the level-0 geom stream to `config.maxzoom`,
/// writing every visited tile into `archive`. Returns the tile with the
/// largest encoded size at maxzoom, for the metadata emitter's center.
pub fn run(
    tmp_dir: &Path,
    level0: std::fs::File,
    meta: &MetaReader,
    archive: &mut TileArchive,
    config: &RecursorConfig,
) -> Result<CenterTile> {
    let mut current = vec![GeomReader::new(level0)?];
    let mut center = CenterTile::default();

    for z in 0..=config.maxzoom {
        let detail = if z == config.maxzoom { config.full_detail } else { config.low_detail };
        let has_children = z < config.maxzoom;

        let mut child_writers: Option<[GeomWriter; 4]> = if has_children {
            Some([
                GeomWriter::new(tmp_dir)?,
                GeomWriter::new(tmp_dir)?,
                GeomWriter::new(tmp_dir)?,
                GeomWriter::new(tmp_dir)?,
            ])
        } else {
            None
        };
        let mut child_last_header: [Option<(u32, u32)>; 4] = [None, None, None, None];
        let mut child_has_any = [false; 4];

        for input in current.iter_mut() {
            if input.is_empty() {
                continue;
            }
            let mut tile: Option<(u32, u32)> = None;
            let mut buf: Vec<BufferedFeature> = Vec::new();

            loop {
                let record = input.next_record()?;
                match record {
                    None => {
                        if let Some((tx, ty)) = tile {
                            flush_tile(
                                z, tx, ty, detail, &buf, meta, config, archive, &mut center,
                                child_writers.as_mut(), &mut child_last_header, &mut child_has_any,
                            )?;
                        }
                        break;
                    }
                    Some(GeomRecord::EndOfLevel) => {
                        if let Some((tx, ty)) = tile {
                            flush_tile(
                                z, tx, ty, detail, &buf, meta, config, archive, &mut center,
                                child_writers.as_mut(), &mut child_last_header, &mut child_has_any,
                            )?;
                        }
                        break;
                    }
                    Some(GeomRecord::TileHeader { x, y, .. }) => {
                        if let Some((tx, ty)) = tile {
                            flush_tile(
                                z, tx, ty, detail, &buf, meta, config, archive, &mut center,
                                child_writers.as_mut(), &mut child_last_header, &mut child_has_any,
                            )?;
                        }
                        tile = Some((x, y));
                        buf.clear();
                    }
                    Some(GeomRecord::Feature { kind, meta_offset, ops, minzoom }) => {
                        let bbox = ops_bbox(&ops);
                        buf.push(BufferedFeature { kind, meta_offset, ops, minzoom, bbox });
                    }
                }
            }
        }

        current = if let Some(writers) = child_writers {
            let mut next = Vec::with_capacity(4);
            for (idx, mut w) in writers.into_iter().enumerate() {
                if child_has_any[idx] {
                    w.write_end_of_level()?;
                }
                next.push(GeomReader::new(w.finish()?)?);
            }
            next
        } else {
            Vec::new()
        };
    }

    Ok(center)
}

#[allow(clippy::too_many_arguments)]
fn flush_tile(
    z: u8,
    tx: u32,
    ty: u32,
    detail: u8,
    features: &[BufferedFeature],
    meta: &MetaReader,
    config: &RecursorConfig,
    archive: &mut TileArchive,
    center: &mut CenterTile,
    mut child_writers: Option<&mut [GeomWriter; 4]>,
    child_last_header: &mut [Option<(u32, u32)>; 4],
    child_has_any: &mut [bool; 4],
) -> Result<()> {
    // Draw only features visible at this zoom.
    let mut props_cache: Vec<Vec<(PropType, String, String)>> = Vec::with_capacity(features.len());
    for f in features {
        props_cache.push(if f.minzoom as u8 <= z {
            meta.read_record(f.meta_offset)?
        } else {
            Vec::new()
        });
    }
    let drawn: Vec<TileFeature> = features
        .iter()
        .zip(props_cache.iter())
        .filter(|(f, _)| f.minzoom as u8 <= z)
        .map(|(f, props)| TileFeature { kind: f.kind, ops: &f.ops, properties: props })
        .collect();

    if z >= config.minzoom && !drawn.is_empty() {
        let bytes = tile_encoder::encode_tile(z, tx, ty, detail, &config.layer_name, &drawn)?;
        if z == config.maxzoom {
            center.consider(tx, ty, bytes.len());
        }
        archive.put_tile(z, tx, ty, bytes)?;
    }

    if let Some(writers) = child_writers.as_deref_mut() {
        let child_detail = config.low_detail.max(config.full_detail);
        for f in features {
            // A dropped point stays dropped: it is never forwarded once its
            // minzoom exceeds the current level (spec §4.4 "Point dropping").
            if f.kind == GeomKind::Point && (f.minzoom as u8) > z {
                continue;
            }
            for (idx, (dx, dy)) in [(0u32, 0u32), (1, 0), (0, 1), (1, 1)].into_iter().enumerate() {
                let cx = tx * 2 + dx;
                let cy = ty * 2 + dy;
                if !f.bbox.intersects_tile(z + 1, cx, cy, config.buffer_pixels, child_detail) {
                    continue;
                }
                if child_last_header[idx] != Some((cx, cy)) {
                    writers[idx].write_tile_header(z as i32 + 1, cx, cy)?;
                    child_last_header[idx] = Some((cx, cy));
                }
                writers[idx].write_feature(f.kind, f.meta_offset, &f.ops, f.minzoom)?;
                child_has_any[idx] = true;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ops_bbox_ignores_close_path() {
        use crate::coord::WorldCoord;
        let ops = vec![
            DrawOp::MoveTo(WorldCoord::new(10, 10)),
            DrawOp::LineTo(WorldCoord::new(20, 5)),
            DrawOp::ClosePath,
        ];
        let bbox = ops_bbox(&ops);
        assert_eq!((bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y), (10, 5, 20, 10));
    }
}
