//! Minecraft to scene axis conversion.
//!
//! Minecraft is Y-up with X east and Z south. The scene is Z-up; both
//! horizontal axes are reflected and swapped, so Minecraft `z` becomes
//! scene `-x` and Minecraft `x` becomes scene `-y`.

use std::fmt;
use std::str::FromStr;

use quarry_chunk::{CHUNK_SIDE, ChunkCoord};
use quarry_geom::Vec3;
use serde::{Deserialize, Serialize};

/// Integer block position in Minecraft axes (`y` vertical).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block containing a floating point position (floors each axis).
    pub fn from_f64(pos: [f64; 3]) -> Self {
        Self {
            x: pos[0].floor() as i32,
            y: pos[1].floor() as i32,
            z: pos[2].floor() as i32,
        }
    }

    #[inline]
    pub fn chunk(self) -> ChunkCoord {
        ChunkCoord::containing(self.x, self.z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for BlockPos {
    type Err = String;

    /// Parses `x,y,z`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected x,y,z but got '{s}'"));
        }
        let mut v = [0i32; 3];
        for (slot, part) in v.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|e| format!("bad coordinate '{part}': {e}"))?;
        }
        Ok(BlockPos::new(v[0], v[1], v[2]))
    }
}

/// Scene lattice position of in-chunk block `(bx, by, bz)` of `chunk`.
#[inline]
pub fn scene_block(chunk: ChunkCoord, bx: i32, by: i32, bz: i32) -> [i32; 3] {
    [-(chunk.cz << 4) - bz, -(chunk.cx << 4) - bx, by]
}

/// Scene position of a free-floating Minecraft position (player, markers).
#[inline]
pub fn scene_point(pos: [f64; 3]) -> Vec3 {
    Vec3::new(-pos[2] as f32, -pos[0] as f32, pos[1] as f32)
}

/// Inverse of [`scene_block`], as a world block position.
#[inline]
pub fn scene_to_world(scene: [i32; 3]) -> BlockPos {
    BlockPos::new(-scene[1], scene[2], -scene[0])
}

/// Splits a world block position into its chunk and in-chunk offsets.
#[inline]
pub fn split_world(pos: BlockPos) -> (ChunkCoord, [i32; 3]) {
    let side = CHUNK_SIDE as i32;
    (
        pos.chunk(),
        [pos.x.rem_euclid(side), pos.y, pos.z.rem_euclid(side)],
    )
}
