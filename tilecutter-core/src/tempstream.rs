//! Binary record formats for the geom and meta temp files, and the
//! `tempfile`/`memmap2`-backed readers and writers over them.
//!
//! Byte layout (see spec §3):
//! ```text
//! tile header:    i32 z | u32 x | u32 y
//! feature record: i32 geom_kind | i64 meta_offset | (op,[x,y])* | i32 END | i8 minzoom
//! end-of-level:   i32 -2
//! property record: i32 n_props | (i32 type | cstring key | cstring value) * n_props
//! cstring:        i32 len | len bytes | NUL
//! ```
use crate::error::{Result, TcError};
use crate::coord::WorldCoord;
use crate::ops::{
    DrawOp, GeomKind, END_OF_LEVEL, OP_CLOSEPATH, OP_END, OP_LINETO, OP_MOVETO, TILE_HEADER_TAG,
};
use crate::property::PropType;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Append-only writer for a geom-file (level-0 ingest output, or one of the
/// four per-level quadrant outputs during recursion).
pub struct GeomWriter {
    file: BufWriter<File>,
}

impl GeomWriter {
    /// Allocate a fresh, already-unlinked temp file in `dir`.
    pub fn new(dir: &Path) -> Result<Self> {
        let file = tempfile::tempfile_in(dir).map_err(TcError::Io)?;
        Ok(GeomWriter {
            file: BufWriter::new(file),
        })
    }

    pub fn write_tile_header(&mut self, z: i32, x: u32, y: u32) -> Result<()> {
        self.file.write_i32::<LittleEndian>(TILE_HEADER_TAG)?;
        self.file.write_i32::<LittleEndian>(z)?;
        self.file.write_u32::<LittleEndian>(x)?;
        self.file.write_u32::<LittleEndian>(y)?;
        Ok(())
    }

    pub fn write_feature(
        &mut self,
        kind: GeomKind,
        meta_offset: i64,
        ops: &[DrawOp],
        minzoom: i8,
    ) -> Result<()> {
        self.file.write_i32::<LittleEndian>(kind as i32)?;
        self.file.write_i64::<LittleEndian>(meta_offset)?;
        for op in ops {
            self.file.write_i32::<LittleEndian>(op.tag())?;
            match op {
                DrawOp::MoveTo(c) | DrawOp::LineTo(c) => {
                    self.file.write_u32::<LittleEndian>(c.x)?;
                    self.file.write_u32::<LittleEndian>(c.y)?;
                }
                DrawOp::ClosePath => {}
            }
        }
        self.file.write_i32::<LittleEndian>(OP_END)?;
        self.file.write_i8(minzoom)?;
        Ok(())
    }

    pub fn write_end_of_level(&mut self) -> Result<()> {
        self.file.write_i32::<LittleEndian>(END_OF_LEVEL)?;
        Ok(())
    }

    /// Flush and hand back the underlying file, rewound, ready to be
    /// memory-mapped by [`GeomReader`].
    pub fn finish(mut self) -> Result<File> {
        self.file.flush()?;
        let mut file = self.file.into_inner().map_err(|e| TcError::Io(e.into_error()))?;
        file.seek(SeekFrom::Start(0))?;
        Ok(file)
    }
}

/// One parsed record from a geom stream.
#[derive(Debug, Clone, PartialEq)]
pub enum GeomRecord {
    TileHeader { z: i32, x: u32, y: u32 },
    Feature { kind: GeomKind, meta_offset: i64, ops: Vec<DrawOp>, minzoom: i8 },
    EndOfLevel,
}

/// Sequential reader over a geom stream, memory-mapped for O(1) open and
/// O(n) scan regardless of file size.
pub struct GeomReader {
    mmap: Mmap,
    pos: usize,
}

impl GeomReader {
    pub fn new(file: File) -> Result<Self> {
        // SAFETY: the file is process-private and not concurrently
        // truncated; geozero's mmap-backed readers rely on the same
        // invariant for FlatGeobuf.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(GeomReader { mmap, pos: 0 })
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    fn read_i32(&mut self) -> Result<i32> {
        let mut cur = &self.mmap[self.pos..self.pos + 4];
        self.pos += 4;
        Ok(cur.read_i32::<LittleEndian>()?)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut cur = &self.mmap[self.pos..self.pos + 4];
        self.pos += 4;
        Ok(cur.read_u32::<LittleEndian>()?)
    }

    fn read_i64(&mut self) -> Result<i64> {
        let mut cur = &self.mmap[self.pos..self.pos + 8];
        self.pos += 8;
        Ok(cur.read_i64::<LittleEndian>()?)
    }

    fn read_i8(&mut self) -> Result<i8> {
        let v = self.mmap[self.pos] as i8;
        self.pos += 1;
        Ok(v)
    }

    /// Read the next record, or `None` at end of stream.
    pub fn next_record(&mut self) -> Result<Option<GeomRecord>> {
        if self.pos >= self.mmap.len() {
            return Ok(None);
        }
        let tag = self.read_i32()?;
        match tag {
            END_OF_LEVEL => Ok(Some(GeomRecord::EndOfLevel)),
            TILE_HEADER_TAG => {
                let z = self.read_i32()?;
                let x = self.read_u32()?;
                let y = self.read_u32()?;
                Ok(Some(GeomRecord::TileHeader { z, x, y }))
            }
            other => {
                let kind = GeomKind::from_i32(other)
                    .ok_or_else(|| TcError::Geometry(format!("unknown geom_kind {other}")))?;
                let meta_offset = self.read_i64()?;
                let ops = self.read_ops()?;
                let minzoom = self.read_i8()?;
                Ok(Some(GeomRecord::Feature { kind, meta_offset, ops, minzoom }))
            }
        }
    }

    fn read_ops(&mut self) -> Result<Vec<DrawOp>> {
        let mut ops = Vec::new();
        loop {
            let tag = self.read_i32()?;
            match tag {
                OP_END => break,
                OP_MOVETO => {
                    let x = self.read_u32()?;
                    let y = self.read_u32()?;
                    ops.push(DrawOp::MoveTo(WorldCoord::new(x, y)));
                }
                OP_LINETO => {
                    let x = self.read_u32()?;
                    let y = self.read_u32()?;
                    ops.push(DrawOp::LineTo(WorldCoord::new(x, y)));
                }
                OP_CLOSEPATH => ops.push(DrawOp::ClosePath),
                other => return Err(TcError::Geometry(format!("unknown op tag {other}"))),
            }
        }
        Ok(ops)
    }
}

/// Append-only writer for the meta (property) file. Persists across the
/// whole recursion, unlike the per-level geom streams.
pub struct MetaWriter {
    file: BufWriter<File>,
    offset: u64,
}

impl MetaWriter {
    pub fn new(dir: &Path) -> Result<Self> {
        let file = tempfile::tempfile_in(dir).map_err(TcError::Io)?;
        Ok(MetaWriter {
            file: BufWriter::new(file),
            offset: 0,
        })
    }

    /// Write one property record and return the byte offset it starts at
    /// (the geom file's stable `meta_offset` pointer).
    pub fn write_record(&mut self, props: &[(PropType, String, String)]) -> Result<i64> {
        let start = self.offset;
        self.write_i32(props.len() as i32)?;
        for (ty, key, value) in props {
            self.write_i32(*ty as i32)?;
            self.write_cstring(key)?;
            self.write_cstring(value)?;
        }
        Ok(start as i64)
    }

    fn write_i32(&mut self, v: i32) -> Result<()> {
        self.file.write_i32::<LittleEndian>(v)?;
        self.offset += 4;
        Ok(())
    }

    fn write_cstring(&mut self, s: &str) -> Result<()> {
        let bytes = s.as_bytes();
        self.file.write_i32::<LittleEndian>(bytes.len() as i32)?;
        self.file.write_all(bytes)?;
        self.file.write_u8(0)?;
        self.offset += 4 + bytes.len() as u64 + 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<File> {
        self.file.flush()?;
        let mut file = self.file.into_inner().map_err(|e| TcError::Io(e.into_error()))?;
        file.seek(SeekFrom::Start(0))?;
        Ok(file)
    }

    pub fn len(&self) -> u64 {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }
}

/// Random-access reader over the meta file via `meta_offset` pointers.
pub struct MetaReader {
    mmap: Mmap,
}

impl MetaReader {
    pub fn new(file: File) -> Result<Self> {
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(MetaReader { mmap })
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn read_record(&self, offset: i64) -> Result<Vec<(PropType, String, String)>> {
        let mut pos = offset as usize;
        let n = self.read_i32(&mut pos)?;
        let mut out = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let ty_raw = self.read_i32(&mut pos)?;
            let ty = PropType::from_i32(ty_raw)
                .ok_or_else(|| TcError::Property(format!("unknown property type tag {ty_raw}")))?;
            let key = self.read_cstring(&mut pos)?;
            let value = self.read_cstring(&mut pos)?;
            out.push((ty, key, value));
        }
        Ok(out)
    }

    fn read_i32(&self, pos: &mut usize) -> Result<i32> {
        let mut cur = &self.mmap[*pos..*pos + 4];
        *pos += 4;
        Ok(cur.read_i32::<LittleEndian>()?)
    }

    fn read_cstring(&self, pos: &mut usize) -> Result<String> {
        let len = self.read_i32(pos)? as usize;
        let s = std::str::from_utf8(&self.mmap[*pos..*pos + len])
            .map_err(|e| TcError::Property(e.to_string()))?
            .to_owned();
        *pos += len + 1; // trailing NUL
        Ok(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::WorldCoord;

    #[test]
    fn geom_roundtrip() -> Result<()> {
        let dir = std::env::temp_dir();
        let mut w = GeomWriter::new(&dir)?;
        w.write_tile_header(0, 0, 0)?;
        let ops = vec![
            DrawOp::MoveTo(WorldCoord::new(1, 2)),
            DrawOp::LineTo(WorldCoord::new(3, 4)),
            DrawOp::ClosePath,
        ];
        w.write_feature(GeomKind::Polygon, 42, &ops, 7)?;
        w.write_end_of_level()?;
        let file = w.finish()?;
        let mut r = GeomReader::new(file)?;

        assert_eq!(
            r.next_record()?,
            Some(GeomRecord::TileHeader { z: 0, x: 0, y: 0 })
        );
        assert_eq!(
            r.next_record()?,
            Some(GeomRecord::Feature {
                kind: GeomKind::Polygon,
                meta_offset: 42,
                ops,
                minzoom: 7,
            })
        );
        assert_eq!(r.next_record()?, Some(GeomRecord::EndOfLevel));
        assert_eq!(r.next_record()?, None);
        Ok(())
    }

    #[test]
    fn meta_roundtrip() -> Result<()> {
        let dir = std::env::temp_dir();
        let mut w = MetaWriter::new(&dir)?;
        let offset = w.write_record(&[
            (PropType::String, "name".into(), "hello".into()),
            (PropType::Number, "count".into(), "3".into()),
        ])?;
        let file = w.finish()?;
        let r = MetaReader::new(file)?;
        let record = r.read_record(offset)?;
        assert_eq!(
            record,
            vec![
                (PropType::String, "name".to_string(), "hello".to_string()),
                (PropType::Number, "count".to_string(), "3".to_string()),
            ]
        );
        Ok(())
    }
}
