//! Anvil chunk layout: up to sixteen 16³ sections with an optional high
//! id nibble array.

use fastnbt::ByteArray;
use quarry_chunk::{CHUNK_SIDE, Cell, ChunkColumn, ChunkCoord, ChunkError};
use serde::Deserialize;

use crate::nibble;

pub const HEIGHT: usize = 256;
const SECTION_BLOCKS: usize = CHUNK_SIDE * CHUNK_SIDE * CHUNK_SIDE;
const SECTIONS: i8 = (HEIGHT / CHUNK_SIDE) as i8;

#[derive(Deserialize)]
struct Chunk {
    #[serde(rename = "Level")]
    level: Option<Level>,
}

#[derive(Deserialize)]
struct Level {
    #[serde(rename = "Sections", default)]
    sections: Vec<Section>,
}

#[derive(Deserialize)]
struct Section {
    #[serde(rename = "Y")]
    y: i8,
    #[serde(rename = "Blocks")]
    blocks: Option<ByteArray>,
    #[serde(rename = "Add")]
    add: Option<ByteArray>,
    #[serde(rename = "Data")]
    data: Option<ByteArray>,
}

/// Index inside one section: x fastest, then z, then y.
#[inline]
pub fn section_index(x: usize, y: usize, z: usize) -> usize {
    (y * CHUNK_SIDE + z) * CHUNK_SIDE + x
}

pub fn decode(coord: ChunkCoord, nbt: &[u8]) -> Result<ChunkColumn, ChunkError> {
    let chunk: Chunk = fastnbt::from_bytes(nbt).map_err(|e| ChunkError::Nbt(e.to_string()))?;
    let level = chunk.level.ok_or_else(|| {
        ChunkError::Layout("chunk has no Level compound (post-1.18 save?)".to_string())
    })?;
    let mut column = ChunkColumn::new(coord, HEIGHT);
    for section in level.sections {
        if !(0..SECTIONS).contains(&section.y) {
            log::trace!("chunk {:?}: skipping section Y={}", coord, section.y);
            continue;
        }
        let Some(blocks) = section.blocks.map(ByteArray::into_inner) else {
            // Lighting-only sections carry no blocks; palette sections are
            // a later format.
            continue;
        };
        if blocks.len() != SECTION_BLOCKS {
            return Err(ChunkError::Layout(format!(
                "section Y={} holds {} blocks, expected {}",
                section.y,
                blocks.len(),
                SECTION_BLOCKS
            )));
        }
        let add = section.add.map(ByteArray::into_inner);
        let data = section.data.map(ByteArray::into_inner).unwrap_or_default();
        let base_y = section.y as usize * CHUNK_SIDE;
        for (i, &b) in blocks.iter().enumerate() {
            let high = add.as_deref().map_or(0, |a| nibble(a, i));
            let id = u16::from(b as u8) | (u16::from(high) << 8);
            if id == 0 {
                continue;
            }
            let x = i % CHUNK_SIDE;
            let z = (i / CHUNK_SIDE) % CHUNK_SIDE;
            let y = base_y + i / (CHUNK_SIDE * CHUNK_SIDE);
            column.set(x, y, z, Cell::new(id, nibble(&data, i)));
        }
    }
    Ok(column)
}
