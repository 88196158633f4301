//! Spherical Web Mercator projection between (lat, lon) and the 32-bit
//! world-coordinate grid, plus the bounding-box type threaded through
//! ingest and recursion.
use std::f64::consts::PI;

/// Full range of a world coordinate axis, i.e. zoom 32.
pub const WORLD_BITS: u32 = 32;

/// A projected position: an unsigned integer pair in `[0, 2^32)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldCoord {
    pub x: u32,
    pub y: u32,
}

impl WorldCoord {
    pub fn new(x: u32, y: u32) -> Self {
        WorldCoord { x, y }
    }

    /// Tile index containing this coordinate at zoom `z` (top `z` bits).
    pub fn tile_at(&self, z: u8) -> (u32, u32) {
        if z == 0 {
            return (0, 0);
        }
        (self.x >> (WORLD_BITS - z as u32), self.y >> (WORLD_BITS - z as u32))
    }

    /// This coordinate's position local to tile `(z, tx, ty)` at the given
    /// `detail` (tile-local coordinates run `0..2^detail`). Values outside
    /// the tile (from buffered geometry) are not clamped — the encoder is
    /// expected to handle small overflow into the buffer margin.
    pub fn to_local(&self, z: u8, tx: u32, ty: u32, detail: u8) -> (i64, i64) {
        let tile_bits = WORLD_BITS - z as u32;
        let tile_origin_x = (tx as u64) << tile_bits;
        let tile_origin_y = (ty as u64) << tile_bits;
        let dx = self.x as i64 - tile_origin_x as i64;
        let dy = self.y as i64 - tile_origin_y as i64;
        let scale_down = tile_bits as i64 - detail as i64;
        if scale_down >= 0 {
            (dx >> scale_down, dy >> scale_down)
        } else {
            (dx << -scale_down, dy << -scale_down)
        }
    }
}

/// Project (lat, lon) to the 32-bit world grid using spherical Web Mercator.
///
/// Out-of-range latitudes saturate rather than panic, matching the Mercator
/// formula's natural behavior near the poles.
pub fn project(lon: f64, lat: f64) -> WorldCoord {
    let lat = lat.clamp(-85.051_129, 85.051_129);
    let (fx, fy) = latlon2tile(lat, lon, WORLD_BITS);
    WorldCoord {
        x: fx.clamp(0.0, u32::MAX as f64) as u32,
        y: fy.clamp(0.0, u32::MAX as f64) as u32,
    }
}

/// `(lat, lon) -> (x, y)` tile-unit coordinates at zoom `z`, i.e. scaled by
/// `2^z`. At `z = 32` these are the full-range world coordinates.
pub fn latlon2tile(lat: f64, lon: f64, z: u32) -> (f64, f64) {
    let n = 2f64.powi(z as i32);
    let lat_rad = lat.to_radians();
    let x = (lon + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;
    (x, y)
}

/// Inverse of [`latlon2tile`]: tile-unit `(x, y)` at zoom `z` back to `(lat, lon)`.
pub fn tile2latlon(x: f64, y: f64, z: u32) -> (f64, f64) {
    let n = 2f64.powi(z as i32);
    let lon = x / n * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y / n)).sinh().atan();
    (lat_rad.to_degrees(), lon)
}

/// Axis-aligned bounding box over world coordinates. Tracks whether any
/// point has been folded in; an empty bbox has no meaningful extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub empty: bool,
}

impl Default for WorldBBox {
    fn default() -> Self {
        WorldBBox {
            min_x: u32::MAX,
            min_y: u32::MAX,
            max_x: 0,
            max_y: 0,
            empty: true,
        }
    }
}

impl WorldBBox {
    pub fn expand(&mut self, c: WorldCoord) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
        self.empty = false;
    }

    pub fn union(&mut self, other: &WorldBBox) {
        if other.empty {
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
        self.empty = false;
    }

    /// Smallest zoom `z` in `0..=31` at which `min`/`max` disagree in the
    /// top `z+1` bits of either axis — the zoom at which this bbox first
    /// spans more than one tile.
    pub fn spanning_zoom(&self) -> u8 {
        for z in 0..31u32 {
            let shift = WORLD_BITS - (z + 1);
            if (self.min_x >> shift) != (self.max_x >> shift)
                || (self.min_y >> shift) != (self.max_y >> shift)
            {
                return z as u8;
            }
        }
        31
    }

    /// Does this bbox, expanded by `buffer` pixels at `detail` resolution
    /// for tile `(z, tx, ty)`, intersect that tile's extent?
    pub fn intersects_tile(&self, z: u8, tx: u32, ty: u32, buffer_pixels: i64, detail: u8) -> bool {
        if self.empty {
            return false;
        }
        let tile_bits = WORLD_BITS - z as u32;
        let tile_span = 1u64 << tile_bits;
        let tile_min_x = (tx as u64) << tile_bits;
        let tile_min_y = (ty as u64) << tile_bits;
        let tile_max_x = tile_min_x + tile_span;
        let tile_max_y = tile_min_y + tile_span;

        let buffer_world = if detail == 0 {
            0
        } else {
            (buffer_pixels as i64 * (tile_span as i64 / (1i64 << detail))).max(0)
        };

        let min_x = tile_min_x as i64 - buffer_world;
        let min_y = tile_min_y as i64 - buffer_world;
        let max_x = tile_max_x as i64 + buffer_world;
        let max_y = tile_max_y as i64 + buffer_world;

        (self.max_x as i64) >= min_x
            && (self.min_x as i64) <= max_x
            && (self.max_y as i64) >= min_y
            && (self.min_y as i64) <= max_y
    }
}

#[test]
fn project_origin() {
    let c = project(0.0, 0.0);
    assert_eq!(c, WorldCoord::new(1 << 31, 1 << 31));
}

#[test]
fn tile_at_root() {
    let c = project(0.0, 0.0);
    assert_eq!(c.tile_at(0), (0, 0));
    assert_eq!(c.tile_at(1), (1, 1));
}

#[test]
fn roundtrip_latlon() {
    let (x, y) = latlon2tile(40.0, -73.0, 14);
    let (lat, lon) = tile2latlon(x, y, 14);
    assert!((lat - 40.0).abs() < 0.01);
    assert!((lon - -73.0).abs() < 0.01);
}

#[test]
fn bbox_spanning_zoom_antimeridian_line() {
    let a = project(0.0, 0.0);
    let b = project(180.0, 0.0);
    let mut bbox = WorldBBox::default();
    bbox.expand(a);
    bbox.expand(b);
    assert_eq!(bbox.spanning_zoom(), 0);
}
