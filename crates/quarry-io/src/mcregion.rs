//! McRegion chunk layout: one 128-high column of byte ids.

use fastnbt::ByteArray;
use quarry_chunk::{CHUNK_SIDE, Cell, ChunkColumn, ChunkCoord, ChunkError};
use serde::Deserialize;

use crate::nibble;

pub const HEIGHT: usize = 128;
const BLOCKS: usize = CHUNK_SIDE * CHUNK_SIDE * HEIGHT;

#[derive(Deserialize)]
struct Chunk {
    #[serde(rename = "Level")]
    level: Level,
}

#[derive(Deserialize)]
struct Level {
    #[serde(rename = "Blocks")]
    blocks: ByteArray,
    #[serde(rename = "Data")]
    data: Option<ByteArray>,
}

/// Index into `Blocks`/`Data`: y fastest, then z, then x.
#[inline]
pub fn block_index(x: usize, y: usize, z: usize) -> usize {
    y + z * HEIGHT + x * HEIGHT * CHUNK_SIDE
}

pub fn decode(coord: ChunkCoord, nbt: &[u8]) -> Result<ChunkColumn, ChunkError> {
    let chunk: Chunk = fastnbt::from_bytes(nbt).map_err(|e| ChunkError::Nbt(e.to_string()))?;
    let blocks = chunk.level.blocks.into_inner();
    if blocks.len() != BLOCKS {
        return Err(ChunkError::Layout(format!(
            "McRegion Blocks holds {} entries, expected {}",
            blocks.len(),
            BLOCKS
        )));
    }
    let data = chunk.level.data.map(ByteArray::into_inner).unwrap_or_default();
    let mut column = ChunkColumn::new(coord, HEIGHT);
    for x in 0..CHUNK_SIDE {
        for z in 0..CHUNK_SIDE {
            for y in 0..HEIGHT {
                let i = block_index(x, y, z);
                let id = blocks[i] as u8;
                if id != 0 {
                    column.set(x, y, z, Cell::new(u16::from(id), nibble(&data, i)));
                }
            }
        }
    }
    Ok(column)
}
