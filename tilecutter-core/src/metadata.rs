//! Metadata Emitter: after recursion, derive the archive's lat/lon bbox and
//! suggested center from the file bbox and the largest tile at maxzoom.
use crate::coord::{self, WorldBBox};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLonBBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

#[derive(Debug, Clone)]
pub struct ArchiveMetadata {
    pub name: String,
    pub layer_name: String,
    pub minzoom: u8,
    pub maxzoom: u8,
    pub bbox: LatLonBBox,
    pub center_lon: f64,
    pub center_lat: f64,
    pub center_zoom: u8,
    pub attribute_keys: Vec<String>,
}

/// The tile with the largest encoded size at maxzoom, tracked by the
/// recursor, becomes the archive's suggested center.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterTile {
    pub x: u32,
    pub y: u32,
    pub size: usize,
}

impl CenterTile {
    /// Keep the larger tile; ties keep the first one seen (spec §4.4).
    pub fn consider(&mut self, x: u32, y: u32, size: usize) {
        if size > self.size {
            self.x = x;
            self.y = y;
            self.size = size;
        }
    }
}

pub fn build(
    name: String,
    layer_name: String,
    minzoom: u8,
    maxzoom: u8,
    file_bbox: &WorldBBox,
    center: CenterTile,
    attribute_keys: Vec<String>,
) -> ArchiveMetadata {
    let bbox = if file_bbox.empty {
        LatLonBBox { min_lon: -180.0, min_lat: -85.051_129, max_lon: 180.0, max_lat: 85.051_129 }
    } else {
        let (min_lat, min_lon) = coord::tile2latlon(file_bbox.min_x as f64, file_bbox.max_y as f64, 32);
        let (max_lat, max_lon) = coord::tile2latlon(file_bbox.max_x as f64, file_bbox.min_y as f64, 32);
        LatLonBBox { min_lon, min_lat, max_lon, max_lat }
    };

    let (mut center_lat, mut center_lon) = coord::tile2latlon(
        center.x as f64 + 0.5,
        center.y as f64 + 0.5,
        maxzoom as u32,
    );
    center_lon = center_lon.clamp(bbox.min_lon, bbox.max_lon);
    center_lat = center_lat.clamp(bbox.min_lat, bbox.max_lat);

    ArchiveMetadata {
        name,
        layer_name,
        minzoom,
        maxzoom,
        bbox,
        center_lon,
        center_lat,
        center_zoom: maxzoom,
        attribute_keys,
    }
}

#[test]
fn center_tile_keeps_first_on_tie() {
    let mut c = CenterTile::default();
    c.consider(1, 1, 100);
    c.consider(2, 2, 100);
    assert_eq!((c.x, c.y), (1, 1));
}

#[test]
fn center_tile_prefers_larger() {
    let mut c = CenterTile::default();
    c.consider(1, 1, 100);
    c.consider(2, 2, 200);
    assert_eq!((c.x, c.y), (2, 2));
}
