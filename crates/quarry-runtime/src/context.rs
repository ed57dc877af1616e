use std::path::PathBuf;

use hashbrown::HashSet;
use quarry_blocks::types::BlockId;
use quarry_chunk::ChunkCoord;
use quarry_world::{BlockPos, Dimension, LevelError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stone, dirt and netherrack.
pub const COMMON_BLOCKS: [BlockId; 3] = [1, 3, 87];

pub const MIN_RADIUS: i32 = 1;
pub const MAX_RADIUS: i32 = 50;
pub const MAX_HEIGHT: i32 = 256;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("world folder {} does not exist", .0.display())]
    MissingWorld(PathBuf),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error("worker pool: {0}")]
    Workers(String),
}

/// User-facing load settings, as read from `quarry.toml` and the CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub radius: i32,
    pub floor: i32,
    pub ceiling: i32,
    pub dimension: Dimension,
    pub center: Option<BlockPos>,
    pub omit_common: bool,
    pub slimes: bool,
    pub surface_only: bool,
    pub hollow: bool,
    pub faster_viewport: bool,
    pub jobs: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            radius: 5,
            floor: 60,
            ceiling: 128,
            dimension: Dimension::Overworld,
            center: None,
            omit_common: false,
            slimes: false,
            surface_only: false,
            hollow: true,
            faster_viewport: false,
            jobs: 1,
        }
    }
}

impl LoadOptions {
    pub fn validate(&self) -> Result<(), LoadError> {
        if !(MIN_RADIUS..=MAX_RADIUS).contains(&self.radius) {
            return Err(LoadError::InvalidOption(format!(
                "radius {} outside {}..={}",
                self.radius, MIN_RADIUS, MAX_RADIUS
            )));
        }
        for (label, v) in [("floor", self.floor), ("ceiling", self.ceiling)] {
            if !(0..=MAX_HEIGHT).contains(&v) {
                return Err(LoadError::InvalidOption(format!(
                    "{label} {v} outside 0..={MAX_HEIGHT}"
                )));
            }
        }
        if self.floor > self.ceiling {
            return Err(LoadError::InvalidOption(format!(
                "floor {} above ceiling {}",
                self.floor, self.ceiling
            )));
        }
        if self.jobs == 0 {
            return Err(LoadError::InvalidOption("jobs must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Features {
    pub slime_markers: bool,
    pub surface_only: bool,
    pub hollow: bool,
    pub viewport_hides: bool,
}

/// Everything one load needs besides the catalog and the chunk source.
#[derive(Clone, Debug)]
pub struct LoadContext {
    pub center: BlockPos,
    /// Half-width of the chunk grid.
    pub radius: i32,
    pub floor: i32,
    pub ceiling: i32,
    pub exclude: HashSet<BlockId>,
    pub dimension: Dimension,
    pub features: Features,
    pub jobs: usize,
    pub seed: i64,
    /// Player position in Minecraft axes, marked in the scene when set.
    pub player: Option<[f64; 3]>,
}

impl LoadContext {
    pub fn new(options: &LoadOptions, center: BlockPos, seed: i64) -> Result<Self, LoadError> {
        options.validate()?;
        let exclude = if options.omit_common {
            COMMON_BLOCKS.into_iter().collect()
        } else {
            HashSet::new()
        };
        Ok(Self {
            center,
            radius: options.radius,
            floor: options.floor,
            ceiling: options.ceiling,
            exclude,
            dimension: options.dimension,
            features: Features {
                slime_markers: options.slimes,
                surface_only: options.surface_only,
                hollow: options.hollow,
                viewport_hides: options.faster_viewport,
            },
            jobs: options.jobs,
            seed,
            player: None,
        })
    }

    pub fn with_player(mut self, pos: [f64; 3]) -> Self {
        self.player = Some(pos);
        self
    }

    #[inline]
    pub fn center_chunk(&self) -> ChunkCoord {
        self.center.chunk()
    }

    /// Chunk rows in walk order: `z` outer, `x` inner, each over
    /// `[c - radius, c + radius)`.
    pub fn grid_rows(&self) -> Vec<Vec<ChunkCoord>> {
        let c = self.center_chunk();
        (c.cz - self.radius..c.cz + self.radius)
            .map(|z| {
                (c.cx - self.radius..c.cx + self.radius)
                    .map(|x| ChunkCoord::new(x, z))
                    .collect()
            })
            .collect()
    }

    pub fn grid(&self) -> impl Iterator<Item = ChunkCoord> {
        self.grid_rows().into_iter().flatten()
    }

    #[inline]
    pub fn in_range(&self, y: i32) -> bool {
        y >= self.floor && y <= self.ceiling
    }

    #[inline]
    pub fn is_excluded(&self, id: BlockId) -> bool {
        self.exclude.contains(&id)
    }
}
