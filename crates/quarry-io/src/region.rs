use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use flate2::read::{GzDecoder, ZlibDecoder};
use quarry_chunk::{ChunkColumn, ChunkCoord, ChunkError, ChunkReader};
use quarry_world::{Dimension, WorldFormat};

use crate::{anvil, mcregion};

const SECTOR_BYTES: usize = 4096;
const HEADER_BYTES: usize = 2 * SECTOR_BYTES;
/// Chunks per region edge.
pub const REGION_SIDE: i32 = 32;

const COMPRESSION_GZIP: u8 = 1;
const COMPRESSION_ZLIB: u8 = 2;
const COMPRESSION_NONE: u8 = 3;

/// `r.<rx>.<rz>.<ext>` for the region holding `coord`.
pub fn region_file_name(coord: ChunkCoord, format: WorldFormat) -> String {
    format!("r.{}.{}.{}", coord.cx >> 5, coord.cz >> 5, format.extension())
}

type RegionBytes = Option<Arc<Vec<u8>>>;

/// Reads chunks out of one dimension's region directory. Whole region
/// files are loaded on first touch and kept for the store's lifetime.
pub struct RegionStore {
    dir: PathBuf,
    format: WorldFormat,
    files: Mutex<HashMap<(i32, i32), RegionBytes>>,
}

impl RegionStore {
    pub fn new(dir: impl Into<PathBuf>, format: WorldFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            files: Mutex::new(HashMap::new()),
        }
    }

    pub fn open(world_dir: &Path, dimension: Dimension, format: WorldFormat) -> Self {
        Self::new(world_dir.join(dimension.region_dir()), format)
    }

    pub fn format(&self) -> WorldFormat {
        self.format
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Bytes of the region holding `coord`. The file is read without the
    /// cache lock held; when two workers race, the first insert wins.
    fn region(&self, coord: ChunkCoord) -> Result<RegionBytes, ChunkError> {
        let key = (coord.cx >> 5, coord.cz >> 5);
        let cached = self.files.lock().unwrap_or_else(|e| e.into_inner()).get(&key).cloned();
        if let Some(bytes) = cached {
            return Ok(bytes);
        }
        let path = self.dir.join(region_file_name(coord, self.format));
        let bytes = match std::fs::read(&path) {
            Ok(b) => Some(Arc::new(b)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::trace!("no region file {}", path.display());
                None
            }
            Err(e) => return Err(ChunkError::Io(e)),
        };
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        Ok(files.entry(key).or_insert(bytes).clone())
    }

    /// Decompressed NBT of one chunk, `None` when never generated.
    pub fn raw_chunk(&self, coord: ChunkCoord) -> Result<Option<Vec<u8>>, ChunkError> {
        match self.region(coord)? {
            Some(data) => chunk_payload(&data, coord),
            None => Ok(None),
        }
    }
}

impl ChunkReader for RegionStore {
    fn read_chunk(&self, coord: ChunkCoord) -> Result<Option<ChunkColumn>, ChunkError> {
        let Some(nbt) = self.raw_chunk(coord)? else {
            return Ok(None);
        };
        let column = match self.format {
            WorldFormat::McRegion => mcregion::decode(coord, &nbt)?,
            WorldFormat::Anvil => anvil::decode(coord, &nbt)?,
        };
        Ok(Some(column))
    }
}

/// Locates and inflates `coord` inside a whole region file.
pub fn chunk_payload(data: &[u8], coord: ChunkCoord) -> Result<Option<Vec<u8>>, ChunkError> {
    let truncated = || ChunkError::Truncated {
        cx: coord.cx,
        cz: coord.cz,
    };
    if data.len() < HEADER_BYTES {
        // Freshly created region files can be empty.
        return if data.is_empty() { Ok(None) } else { Err(truncated()) };
    }
    let slot = 4 * ((coord.cx & (REGION_SIDE - 1)) + (coord.cz & (REGION_SIDE - 1)) * REGION_SIDE) as usize;
    let entry = &data[slot..slot + 4];
    let sector = u32::from_be_bytes([0, entry[0], entry[1], entry[2]]) as usize;
    let count = entry[3];
    if sector == 0 || count == 0 {
        return Ok(None);
    }
    let start = sector * SECTOR_BYTES;
    let header = data.get(start..start + 5).ok_or_else(truncated)?;
    let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    if length == 0 {
        return Err(truncated());
    }
    // `length` counts the compression byte.
    let body = data.get(start + 5..start + 4 + length).ok_or_else(truncated)?;
    let mut out = Vec::new();
    match header[4] {
        COMPRESSION_GZIP => {
            GzDecoder::new(body).read_to_end(&mut out)?;
        }
        COMPRESSION_ZLIB => {
            ZlibDecoder::new(body).read_to_end(&mut out)?;
        }
        COMPRESSION_NONE => out.extend_from_slice(body),
        other => return Err(ChunkError::Compression(other)),
    }
    Ok(Some(out))
}
