//! Wraps the external `mvt` crate (the out-of-scope "vector-tile binary
//! encoder" collaborator): translates a tile's worth of geom/meta records
//! into tile-local coordinates and hands them to `mvt::GeomEncoder`.
use crate::coord::WorldCoord;
use crate::error::{Result, TcError};
use crate::ops::{DrawOp, GeomKind};
use crate::property::PropType;
use mvt::{Feature, GeomEncoder, GeomType, Tile as MvtTile, Transform};

/// One feature ready to be drawn into a tile: its primitive kind, its ops
/// in world coordinates, and its already-filtered property list.
pub struct TileFeature<'a> {
    pub kind: GeomKind,
    pub ops: &'a [DrawOp],
    pub properties: &'a [(PropType, String, String)],
}

/// Encode the features visible at `(z, tx, ty)` into a compressed MVT blob.
/// `detail` is `full_detail` at the max zoom and `low_detail` otherwise.
pub fn encode_tile(
    z: u8,
    tx: u32,
    ty: u32,
    detail: u8,
    layer_name: &str,
    features: &[TileFeature<'_>],
) -> Result<Vec<u8>> {
    let extent = 1u32 << detail;
    let mut tile = MvtTile::new(extent);
    let mut layer = tile.create_layer(layer_name);

    for feature in features {
        let geom_type = match feature.kind {
            GeomKind::Point => GeomType::Point,
            GeomKind::Line => GeomType::Linestring,
            GeomKind::Polygon => GeomType::Polygon,
        };
        let mut encoder = GeomEncoder::new(geom_type, Transform::default());
        // A `MoveTo` that isn't the first op in the feature starts a new
        // sub-path (a MultiLineString member or a MultiPoint point), so the
        // previous one must be completed first. `ClosePath` only ever
        // follows a polygon ring; it completes and resets the flag too.
        let mut subpath_open = false;
        for op in feature.ops {
            match op {
                DrawOp::MoveTo(c) => {
                    if subpath_open {
                        encoder = encoder
                            .complete()
                            .map_err(|e| TcError::Mvt(e.to_string()))?;
                    }
                    let (lx, ly) = local_point(c, z, tx, ty, detail);
                    encoder = encoder.point(lx, ly);
                    subpath_open = true;
                }
                DrawOp::LineTo(c) => {
                    let (lx, ly) = local_point(c, z, tx, ty, detail);
                    encoder = encoder.point(lx, ly);
                }
                DrawOp::ClosePath => {
                    encoder = encoder
                        .complete()
                        .map_err(|e| TcError::Mvt(e.to_string()))?;
                    subpath_open = false;
                }
            }
        }
        let encoded = encoder.encode().map_err(|e| TcError::Mvt(e.to_string()))?;
        let mut mvt_feature: Feature = layer.into_feature(encoded);
        for (ty, key, value) in feature.properties {
            match ty {
                PropType::String => {
                    mvt_feature
                        .add_tag_string(key, value)
                        .map_err(|e| TcError::Mvt(e.to_string()))?;
                }
                PropType::Number => {
                    let n: f64 = value.parse().unwrap_or(0.0);
                    mvt_feature
                        .add_tag_double(key, n)
                        .map_err(|e| TcError::Mvt(e.to_string()))?;
                }
                PropType::Boolean => {
                    mvt_feature
                        .add_tag_bool(key, value == "true")
                        .map_err(|e| TcError::Mvt(e.to_string()))?;
                }
            }
        }
        layer = mvt_feature.into_layer();
    }

    tile.add_layer(layer).map_err(|e| TcError::Mvt(e.to_string()))?;
    tile.to_bytes().map_err(|e| TcError::Mvt(e.to_string()))
}

fn local_point(c: &WorldCoord, z: u8, tx: u32, ty: u32, detail: u8) -> (f64, f64) {
    let (lx, ly) = c.to_local(z, tx, ty, detail);
    (lx as f64, ly as f64)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::WorldCoord;

    fn point(x: u32, y: u32) -> WorldCoord {
        WorldCoord::new(x, y)
    }

    #[test]
    fn multilinestring_keeps_its_two_lines_separate() {
        let center = 1u32 << 31;
        // Two disjoint two-point lines, each its own MoveTo/LineTo pair, with
        // no ClosePath between them (matches what MultiLineString ingest
        // produces: only polygon rings get a ClosePath).
        let ops = vec![
            DrawOp::MoveTo(point(center, center)),
            DrawOp::LineTo(point(center + 1000, center)),
            DrawOp::MoveTo(point(center, center + 2000)),
            DrawOp::LineTo(point(center + 1000, center + 2000)),
        ];
        let props = vec![];
        let features = vec![TileFeature { kind: GeomKind::Line, ops: &ops, properties: &props }];
        let bytes = encode_tile(10, 1 << 9, 1 << 9, 12, "layer", &features).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn single_linestring_still_encodes() {
        let center = 1u32 << 31;
        let ops = vec![
            DrawOp::MoveTo(point(center, center)),
            DrawOp::LineTo(point(center + 1000, center)),
            DrawOp::LineTo(point(center + 1000, center + 1000)),
        ];
        let props = vec![];
        let features = vec![TileFeature { kind: GeomKind::Line, ops: &ops, properties: &props }];
        let bytes = encode_tile(10, 1 << 9, 1 << 9, 12, "layer", &features).unwrap();
        assert!(!bytes.is_empty());
    }
}
