//! World save metadata: level.dat, dimensions, axis conversion and the
//! slime-chunk predicate.
#![forbid(unsafe_code)]

pub mod coords;
pub mod level;
pub mod saves;
pub mod slime;

pub use coords::{BlockPos, scene_block, scene_point, scene_to_world, split_world};
pub use level::{CenterSource, Dimension, LevelError, LevelInfo, PlayerInfo, WorldFormat};
pub use saves::{SaveSummary, default_saves_dir, has_dimension, has_end, has_nether, list_saves};
pub use slime::{JavaRandom, is_slime_chunk};
