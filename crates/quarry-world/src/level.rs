//! `level.dat` reading and load-center selection.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coords::BlockPos;

pub const MCREGION_VERSION: i32 = 0x4abc;
pub const ANVIL_VERSION: i32 = 0x4abd;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("level.dat is not valid NBT: {0}")]
    Nbt(#[from] fastnbt::error::Error),
    #[error("unsupported world format version {0:#x}")]
    UnsupportedFormat(i32),
    #[error("level.dat has no {0} tag")]
    MissingField(&'static str),
}

/// Region container format of a save.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorldFormat {
    McRegion,
    Anvil,
}

impl WorldFormat {
    /// Worlds written before the version tag existed are McRegion.
    pub fn from_version(version: Option<i32>) -> Result<Self, LevelError> {
        match version {
            None | Some(MCREGION_VERSION) => Ok(WorldFormat::McRegion),
            Some(ANVIL_VERSION) => Ok(WorldFormat::Anvil),
            Some(other) => Err(LevelError::UnsupportedFormat(other)),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            WorldFormat::McRegion => "mcr",
            WorldFormat::Anvil => "mca",
        }
    }

    /// Decoded column height in blocks.
    pub fn height(self) -> usize {
        match self {
            WorldFormat::McRegion => 128,
            WorldFormat::Anvil => 256,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    End,
}

impl Dimension {
    /// The game's numeric dimension id.
    pub fn index(self) -> i32 {
        match self {
            Dimension::Overworld => 0,
            Dimension::Nether => -1,
            Dimension::End => 1,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Dimension::Overworld),
            -1 => Some(Dimension::Nether),
            1 => Some(Dimension::End),
            _ => None,
        }
    }

    /// Region directory relative to the world root.
    pub fn region_dir(self) -> PathBuf {
        match self {
            Dimension::Overworld => PathBuf::from("region"),
            Dimension::Nether => Path::new("DIM-1").join("region"),
            Dimension::End => Path::new("DIM1").join("region"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Overworld => "overworld",
            Dimension::Nether => "nether",
            Dimension::End => "end",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overworld" | "0" => Ok(Dimension::Overworld),
            "nether" | "-1" => Ok(Dimension::Nether),
            "end" | "1" => Ok(Dimension::End),
            other => Err(format!("unknown dimension '{other}'")),
        }
    }
}

#[derive(Deserialize)]
struct LevelDat {
    #[serde(rename = "Data")]
    data: LevelData,
}

#[derive(Deserialize)]
struct LevelData {
    version: Option<i32>,
    #[serde(rename = "RandomSeed")]
    random_seed: Option<i64>,
    #[serde(rename = "Player")]
    player: Option<PlayerData>,
    #[serde(rename = "SpawnX", default)]
    spawn_x: i32,
    #[serde(rename = "SpawnY", default)]
    spawn_y: i32,
    #[serde(rename = "SpawnZ", default)]
    spawn_z: i32,
    #[serde(rename = "LevelName")]
    level_name: Option<String>,
    #[serde(rename = "SizeOnDisk")]
    size_on_disk: Option<i64>,
}

#[derive(Deserialize)]
struct PlayerData {
    #[serde(rename = "Pos")]
    pos: Vec<f64>,
    #[serde(rename = "Dimension")]
    dimension: Option<DimensionTag>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DimensionTag {
    Index(i32),
    Name(String),
}

impl DimensionTag {
    fn resolve(&self) -> Option<Dimension> {
        match self {
            DimensionTag::Index(i) => Dimension::from_index(*i),
            DimensionTag::Name(name) => match name.trim_start_matches("minecraft:") {
                "overworld" => Some(Dimension::Overworld),
                "the_nether" => Some(Dimension::Nether),
                "the_end" => Some(Dimension::End),
                _ => None,
            },
        }
    }
}

/// Where the single-player character last saved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerInfo {
    pub pos: [f64; 3],
    /// `None` when the save names a dimension this importer does not know.
    pub dimension: Option<Dimension>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CenterSource {
    Explicit,
    Player,
    Spawn,
    Origin,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelInfo {
    pub name: Option<String>,
    pub format: WorldFormat,
    pub seed: i64,
    /// Absent for multiplayer saves copied into the saves folder.
    pub player: Option<PlayerInfo>,
    pub spawn: BlockPos,
    pub size_on_disk: Option<i64>,
}

impl LevelInfo {
    /// Reads `<world>/level.dat`.
    pub fn read(world_dir: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = world_dir.as_ref().join("level.dat");
        let file = File::open(&path).map_err(|source| LevelError::Io {
            path: path.clone(),
            source,
        })?;
        let mut raw = Vec::new();
        GzDecoder::new(file)
            .read_to_end(&mut raw)
            .map_err(|source| LevelError::Io { path, source })?;
        Self::from_nbt(&raw)
    }

    /// Parses the decompressed NBT payload.
    pub fn from_nbt(bytes: &[u8]) -> Result<Self, LevelError> {
        let dat: LevelDat = fastnbt::from_bytes(bytes)?;
        let data = dat.data;
        let format = WorldFormat::from_version(data.version)?;
        let seed = data.random_seed.ok_or(LevelError::MissingField("RandomSeed"))?;
        let player = match data.player {
            Some(p) if p.pos.len() == 3 => Some(PlayerInfo {
                pos: [p.pos[0], p.pos[1], p.pos[2]],
                // Old saves omit the tag while in the overworld.
                dimension: p
                    .dimension
                    .map_or(Some(Dimension::Overworld), |d| d.resolve()),
            }),
            Some(p) => {
                log::warn!("ignoring player position with {} components", p.pos.len());
                None
            }
            None => None,
        };
        Ok(LevelInfo {
            name: data.level_name,
            format,
            seed,
            player,
            spawn: BlockPos::new(data.spawn_x, data.spawn_y, data.spawn_z),
            size_on_disk: data.size_on_disk,
        })
    }

    /// Chooses the load center. An explicit position always wins; the
    /// player is used when they saved in `dimension`; multiplayer saves
    /// fall back to spawn in the overworld; everything else loads at the
    /// origin.
    pub fn load_center(
        &self,
        dimension: Dimension,
        explicit: Option<BlockPos>,
    ) -> ([f64; 3], CenterSource) {
        if let Some(pos) = explicit {
            return (
                [f64::from(pos.x), f64::from(pos.y), f64::from(pos.z)],
                CenterSource::Explicit,
            );
        }
        match self.player {
            Some(p) if p.dimension == Some(dimension) => (p.pos, CenterSource::Player),
            None if dimension == Dimension::Overworld => {
                let s = self.spawn;
                (
                    [f64::from(s.x), f64::from(s.y), f64::from(s.z)],
                    CenterSource::Spawn,
                )
            }
            _ => ([0.0; 3], CenterSource::Origin),
        }
    }

    pub fn size_mib(&self) -> Option<f64> {
        self.size_on_disk.map(|b| b as f64 / (1024.0 * 1024.0))
    }
}
