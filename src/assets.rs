use std::path::{Path, PathBuf};

use quarry_world::default_saves_dir;

const CATALOG_MARKER: &str = "assets/blocks.toml";

pub fn resolve_assets_root(cli: Option<PathBuf>) -> PathBuf {
    // Precedence: CLI flag -> QUARRY_ASSETS env -> search nearby dirs -> CWD
    if let Some(pb) = cli {
        if pb.exists() {
            return pb;
        }
        log::warn!("assets root {} does not exist, searching", pb.display());
    }
    if let Ok(p) = std::env::var("QUARRY_ASSETS") {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return pb;
        }
    }
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.to_path_buf());
        }
    }
    candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")));
    candidates
        .into_iter()
        .find_map(|base| find_upward(&base, 5))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn find_upward(base: &Path, parents: usize) -> Option<PathBuf> {
    let mut cur = base.to_path_buf();
    for _ in 0..parents {
        if cur.join(CATALOG_MARKER).exists() {
            return Some(cur);
        }
        cur = cur.parent()?.to_path_buf();
    }
    None
}

pub fn blocks_path(root: &Path) -> PathBuf {
    root.join(CATALOG_MARKER)
}

/// Atlas image named by the catalog, relative to `assets/`.
pub fn atlas_path(root: &Path, image: &str) -> PathBuf {
    root.join("assets").join(image)
}

/// Saves folder: CLI flag -> QUARRY_SAVES env -> launcher default.
pub fn resolve_saves_dir(cli: Option<PathBuf>) -> Option<PathBuf> {
    cli.or_else(|| std::env::var_os("QUARRY_SAVES").map(PathBuf::from))
        .or_else(default_saves_dir)
}

/// A world argument is either a path to the world folder or a folder name
/// under the saves directory.
pub fn resolve_world(arg: &Path, saves: Option<&Path>) -> PathBuf {
    if arg.join("level.dat").is_file() || arg.is_absolute() {
        return arg.to_path_buf();
    }
    match saves {
        Some(dir) if dir.join(arg).is_dir() => dir.join(arg),
        _ => arg.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_wins() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_assets_root(Some(dir.path().to_path_buf())), dir.path());
    }

    #[test]
    fn crate_root_carries_the_catalog() {
        let root = resolve_assets_root(None);
        assert!(blocks_path(&root).is_file());
    }

    #[test]
    fn upward_search_stops_at_limit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join(CATALOG_MARKER), "").unwrap();
        let deep = dir.path().join("a/b/c/d/e/f");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(find_upward(&dir.path().join("a/b"), 5).as_deref(), Some(dir.path()));
        assert!(find_upward(&deep, 5).is_none());
    }

    #[test]
    fn world_names_resolve_under_saves() {
        let saves = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(saves.path().join("Survival")).unwrap();
        let w = resolve_world(Path::new("Survival"), Some(saves.path()));
        assert_eq!(w, saves.path().join("Survival"));
        let direct = resolve_world(Path::new("elsewhere"), Some(saves.path()));
        assert_eq!(direct, PathBuf::from("elsewhere"));
    }
}
