//! Drawing-op and geometry-kind tags shared by the geom-file record format
//! ([`crate::tempstream`]) and the tile encoder.
use crate::coord::WorldCoord;

/// Vector-tile primitive a feature's geometry reduces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum GeomKind {
    Point = 1,
    Line = 2,
    Polygon = 3,
}

impl GeomKind {
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            1 => Some(GeomKind::Point),
            2 => Some(GeomKind::Line),
            3 => Some(GeomKind::Polygon),
            _ => None,
        }
    }
}

/// Sentinel `geom_kind` value marking end-of-level in a geom stream.
pub const END_OF_LEVEL: i32 = -2;

/// Sentinel marking a tile header, distinct from both `END_OF_LEVEL` and
/// every `GeomKind` discriminant so a reader can tell header from feature
/// from end-of-level by the leading tag alone.
pub const TILE_HEADER_TAG: i32 = -1;

/// One drawing operation. `MoveTo`/`LineTo` carry a world coordinate;
/// `ClosePath` does not. The terminating `END` marker is not a variant here
/// — it is written as its own tag by [`crate::tempstream::GeomWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOp {
    MoveTo(WorldCoord),
    LineTo(WorldCoord),
    ClosePath,
}

pub(crate) const OP_END: i32 = 0;
pub(crate) const OP_MOVETO: i32 = 1;
pub(crate) const OP_LINETO: i32 = 2;
pub(crate) const OP_CLOSEPATH: i32 = 3;

impl DrawOp {
    pub(crate) fn tag(&self) -> i32 {
        match self {
            DrawOp::MoveTo(_) => OP_MOVETO,
            DrawOp::LineTo(_) => OP_LINETO,
            DrawOp::ClosePath => OP_CLOSEPATH,
        }
    }
}
