use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use quarry_runtime::LoadOptions;
use quarry_world::{BlockPos, Dimension};

pub const DEFAULT_CONFIG: &str = "quarry.toml";

/// Load settings given on the command line. Anything left unset keeps the
/// value from `quarry.toml` (or the built-in default).
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Half-width of the chunk grid (1-50)
    #[arg(long, short)]
    pub radius: Option<i32>,
    /// Lowest block layer kept (0-256)
    #[arg(long)]
    pub floor: Option<i32>,
    /// Highest block layer kept (0-256)
    #[arg(long)]
    pub ceiling: Option<i32>,
    /// overworld, nether or end
    #[arg(long, short)]
    pub dimension: Option<Dimension>,
    /// Load center as x,y,z in block coordinates
    #[arg(long, allow_hyphen_values = true)]
    pub center: Option<BlockPos>,
    /// Leave out stone, dirt and netherrack
    #[arg(long)]
    pub omit_common: bool,
    /// Mark slime-spawning chunks
    #[arg(long)]
    pub slimes: bool,
    /// Drop everything below the topmost opaque block of each column
    #[arg(long)]
    pub surface_only: bool,
    /// Keep enclosed opaque blocks
    #[arg(long)]
    pub no_hollow: bool,
    /// Hide bulk terrain prototypes in the viewport
    #[arg(long)]
    pub faster_viewport: bool,
    /// Chunk decode threads
    #[arg(long, short)]
    pub jobs: Option<usize>,
}

impl Overrides {
    pub fn apply(&self, options: &mut LoadOptions) {
        if let Some(r) = self.radius {
            options.radius = r;
        }
        if let Some(f) = self.floor {
            options.floor = f;
        }
        if let Some(c) = self.ceiling {
            options.ceiling = c;
        }
        if let Some(d) = self.dimension {
            options.dimension = d;
        }
        if self.center.is_some() {
            options.center = self.center;
        }
        if let Some(j) = self.jobs {
            options.jobs = j;
        }
        // Switches only ever turn their feature on (or hollowing off).
        options.omit_common |= self.omit_common;
        options.slimes |= self.slimes;
        options.surface_only |= self.surface_only;
        options.faster_viewport |= self.faster_viewport;
        if self.no_hollow {
            options.hollow = false;
        }
    }
}

pub fn parse_options(toml_str: &str) -> Result<LoadOptions, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Reads the options file. An explicit path must exist; the implicit
/// `quarry.toml` in the working directory is optional.
pub fn load_options(explicit: Option<&Path>) -> Result<LoadOptions, Box<dyn Error>> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG);
            if !p.is_file() {
                return Ok(LoadOptions::default());
            }
            p
        }
    };
    let text = fs::read_to_string(&path)
        .map_err(|e| format!("config {}: {}", path.display(), e))?;
    let options = parse_options(&text).map_err(|e| format!("config {}: {}", path.display(), e))?;
    log::debug!("options from {}: {:?}", path.display(), options);
    Ok(options)
}
