//! Decoded chunk columns and the chunk reader contract.
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::io;

use quarry_blocks::types::{AIR, BlockId};
use thiserror::Error;

/// Horizontal edge of a chunk column in blocks.
pub const CHUNK_SIDE: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Chunk containing world block column `(x, z)`.
    #[inline]
    pub fn containing(x: i32, z: i32) -> Self {
        Self {
            cx: x.div_euclid(CHUNK_SIDE as i32),
            cz: z.div_euclid(CHUNK_SIDE as i32),
        }
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

/// Stored block: id plus its 4-bit auxiliary value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub id: BlockId,
    pub aux: u8,
}

impl Cell {
    pub const AIR: Cell = Cell { id: AIR, aux: 0 };

    #[inline]
    pub const fn new(id: BlockId, aux: u8) -> Self {
        Self { id, aux }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self.id == AIR
    }
}

/// A non-air cell with its in-chunk position (`y` is Minecraft's vertical).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockCell {
    pub x: u8,
    pub y: u16,
    pub z: u8,
    pub id: BlockId,
    pub aux: u8,
}

/// Dense 16×height×16 column of decoded cells.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkColumn {
    pub coord: ChunkCoord,
    pub height: usize,
    cells: Vec<Cell>,
}

impl ChunkColumn {
    pub fn new(coord: ChunkCoord, height: usize) -> Self {
        Self {
            coord,
            height,
            cells: vec![Cell::AIR; CHUNK_SIDE * CHUNK_SIDE * height],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * CHUNK_SIDE + z) * CHUNK_SIDE + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Cell {
        self.cells[self.idx(x, y, z)]
    }

    /// Signed lookup; `None` outside the column.
    #[inline]
    pub fn get_checked(&self, x: i32, y: i32, z: i32) -> Option<Cell> {
        let side = CHUNK_SIDE as i32;
        if x < 0 || z < 0 || y < 0 || x >= side || z >= side || y >= self.height as i32 {
            return None;
        }
        Some(self.get(x as usize, y as usize, z as usize))
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, cell: Cell) {
        let i = self.idx(x, y, z);
        self.cells[i] = cell;
    }

    /// Every non-air cell, y-major then z then x.
    pub fn cells(&self) -> impl Iterator<Item = BlockCell> + '_ {
        self.cells.iter().enumerate().filter(|(_, c)| !c.is_air()).map(|(i, c)| {
            let x = i % CHUNK_SIDE;
            let z = (i / CHUNK_SIDE) % CHUNK_SIDE;
            let y = i / (CHUNK_SIDE * CHUNK_SIDE);
            BlockCell {
                x: x as u8,
                y: y as u16,
                z: z as u8,
                id: c.id,
                aux: c.aux,
            }
        })
    }

    pub fn non_air_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_air()).count()
    }
}

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("unknown chunk compression scheme {0}")]
    Compression(u8),
    #[error("chunk ({cx}, {cz}) data is truncated")]
    Truncated { cx: i32, cz: i32 },
    #[error("chunk NBT: {0}")]
    Nbt(String),
    #[error("chunk layout: {0}")]
    Layout(String),
}

/// Source of decoded chunk columns. A chunk that was never generated is
/// `Ok(None)`, not an error.
pub trait ChunkReader: Send + Sync {
    fn read_chunk(&self, coord: ChunkCoord) -> Result<Option<ChunkColumn>, ChunkError>;
}

impl<T: ChunkReader + ?Sized> ChunkReader for Box<T> {
    fn read_chunk(&self, coord: ChunkCoord) -> Result<Option<ChunkColumn>, ChunkError> {
        (**self).read_chunk(coord)
    }
}

impl<T: ChunkReader + ?Sized> ChunkReader for &T {
    fn read_chunk(&self, coord: ChunkCoord) -> Result<Option<ChunkColumn>, ChunkError> {
        (**self).read_chunk(coord)
    }
}

/// In-memory reader over prebuilt columns.
#[derive(Clone, Debug, Default)]
pub struct MemoryChunks {
    pub height: usize,
    columns: HashMap<ChunkCoord, ChunkColumn>,
}

impl MemoryChunks {
    pub fn new(height: usize) -> Self {
        Self {
            height,
            columns: HashMap::new(),
        }
    }

    /// Sets a cell by world block position, creating its column on demand.
    pub fn set_block(&mut self, x: i32, y: usize, z: i32, cell: Cell) {
        let coord = ChunkCoord::containing(x, z);
        let height = self.height;
        let col = self
            .columns
            .entry(coord)
            .or_insert_with(|| ChunkColumn::new(coord, height));
        let lx = x.rem_euclid(CHUNK_SIDE as i32) as usize;
        let lz = z.rem_euclid(CHUNK_SIDE as i32) as usize;
        col.set(lx, y, lz, cell);
    }

    pub fn insert(&mut self, column: ChunkColumn) {
        self.columns.insert(column.coord, column);
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl ChunkReader for MemoryChunks {
    fn read_chunk(&self, coord: ChunkCoord) -> Result<Option<ChunkColumn>, ChunkError> {
        Ok(self.columns.get(&coord).cloned())
    }
}
