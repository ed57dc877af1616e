//! Save folder discovery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::level::{Dimension, LevelInfo};

#[derive(Clone, Debug, PartialEq)]
pub struct SaveSummary {
    /// Directory name under the saves folder.
    pub folder: String,
    pub name: String,
    pub size_mib: Option<f64>,
    pub has_nether: bool,
    pub has_end: bool,
}

/// The launcher's saves directory for this platform, if a home is known.
pub fn default_saves_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join(".minecraft").join("saves"))
    } else if cfg!(target_os = "macos") {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("minecraft")
                .join("saves")
        })
    } else {
        std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".minecraft").join("saves"))
    }
}

pub fn has_dimension(world_dir: &Path, dimension: Dimension) -> bool {
    world_dir.join(dimension.region_dir()).is_dir()
}

pub fn has_nether(world_dir: &Path) -> bool {
    has_dimension(world_dir, Dimension::Nether)
}

pub fn has_end(world_dir: &Path) -> bool {
    has_dimension(world_dir, Dimension::End)
}

/// Every sub-directory of `saves_dir` with a readable `level.dat`, sorted
/// by folder name. Unreadable saves are skipped with a warning.
pub fn list_saves(saves_dir: &Path) -> Vec<SaveSummary> {
    let entries = match fs::read_dir(saves_dir) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("cannot read saves dir {}: {}", saves_dir.display(), e);
            return Vec::new();
        }
    };
    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.join("level.dat").is_file() {
            continue;
        }
        let folder = entry.file_name().to_string_lossy().into_owned();
        match LevelInfo::read(&path) {
            Ok(info) => out.push(SaveSummary {
                name: info.name.clone().unwrap_or_else(|| "<no name>".to_string()),
                size_mib: info.size_mib(),
                has_nether: has_nether(&path),
                has_end: has_end(&path),
                folder,
            }),
            Err(e) => log::warn!("skipping save '{}': {}", folder, e),
        }
    }
    out.sort_by(|a, b| a.folder.cmp(&b.folder));
    out
}
