//! The single hand-off from buffered placements to a scene.

use std::io;
use std::path::{Path, PathBuf};

use quarry_blocks::Material;
use quarry_geom::{Placement, Vec3};
use quarry_mesh::AtlasLayout;
use thiserror::Error;

use crate::cache::Prototype;
use crate::loader::LoadOutcome;

/// Bulk terrain hidden from the viewport when faster display is wanted.
pub const VIEWPORT_HIDES: [&str; 8] = [
    "mcStone",
    "mcDirt",
    "mcSandstone",
    "mcIronOre",
    "mcGravel",
    "mcCoalOre",
    "mcBedrock",
    "mcRedstoneOre",
];

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene i/o: {0}")]
    Io(#[from] io::Error),
    #[error("scene image: {0}")]
    Image(#[from] image::ImageError),
    #[error("scene rejected {name}: {reason}")]
    Rejected { name: String, reason: String },
}

/// Texture atlas as found on disk. A missing or unreadable image becomes
/// a placeholder that sinks replace with a blank image of the same size.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub placeholder: bool,
}

impl AtlasImage {
    pub fn locate(path: impl AsRef<Path>, layout: &AtlasLayout) -> Self {
        let path = path.as_ref().to_path_buf();
        match image::image_dimensions(&path) {
            Ok((width, height)) => {
                if width != layout.pixels() || height != layout.pixels() {
                    log::warn!(
                        "atlas {} is {}x{}, expected {}x{}",
                        path.display(),
                        width,
                        height,
                        layout.pixels(),
                        layout.pixels()
                    );
                }
                Self {
                    path,
                    width,
                    height,
                    placeholder: false,
                }
            }
            Err(e) => {
                log::debug!("atlas {} unavailable: {}", path.display(), e);
                Self::placeholder(path, layout)
            }
        }
    }

    pub fn placeholder(path: PathBuf, layout: &AtlasLayout) -> Self {
        Self {
            path,
            width: layout.pixels(),
            height: layout.pixels(),
            placeholder: true,
        }
    }
}

/// Receiver of finished geometry. Only `commit` calls into a sink.
pub trait SceneSink {
    fn set_atlas(&mut self, atlas: &AtlasImage) -> Result<(), SceneError>;

    fn add_prototype(
        &mut self,
        prototype: &Prototype,
        material: &Material,
        placements: &[Placement],
        visible: bool,
    ) -> Result<(), SceneError>;

    fn add_markers(&mut self, name: &str, points: &[Vec3]) -> Result<(), SceneError>;

    fn finish(&mut self) -> Result<(), SceneError> {
        Ok(())
    }
}

/// Hands every non-empty placement list to `sink`, once.
pub fn commit<S: SceneSink + ?Sized>(
    sink: &mut S,
    outcome: &LoadOutcome,
    atlas: &AtlasImage,
    viewport_hides: bool,
) -> Result<usize, SceneError> {
    sink.set_atlas(atlas)?;
    let mut committed = 0;
    for (id, placements) in outcome.placements.iter() {
        let prototype = outcome.cache.get(id);
        let material = outcome.cache.material(prototype.material).ok_or_else(|| {
            SceneError::Rejected {
                name: prototype.name.clone(),
                reason: "material missing from library".to_string(),
            }
        })?;
        let visible = !(viewport_hides && VIEWPORT_HIDES.contains(&prototype.name.as_str()));
        sink.add_prototype(prototype, material, placements, visible)?;
        committed += 1;
    }
    for set in &outcome.markers {
        sink.add_markers(&set.name, &set.points)?;
    }
    sink.finish()?;
    log::info!(
        "committed {} prototypes with {} placements",
        committed,
        outcome.placements.total()
    );
    Ok(committed)
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedPrototype {
    pub name: String,
    pub material: String,
    pub placements: Vec<Placement>,
    pub visible: bool,
}

/// In-memory sink that keeps what it was given; used for dry runs.
#[derive(Clone, Debug, Default)]
pub struct RecordingScene {
    pub atlas: Option<AtlasImage>,
    pub prototypes: Vec<RecordedPrototype>,
    pub markers: Vec<(String, Vec<Vec3>)>,
    pub finished: bool,
}

impl RecordingScene {
    pub fn prototype(&self, name: &str) -> Option<&RecordedPrototype> {
        self.prototypes.iter().find(|p| p.name == name)
    }
}

impl SceneSink for RecordingScene {
    fn set_atlas(&mut self, atlas: &AtlasImage) -> Result<(), SceneError> {
        self.atlas = Some(atlas.clone());
        Ok(())
    }

    fn add_prototype(
        &mut self,
        prototype: &Prototype,
        material: &Material,
        placements: &[Placement],
        visible: bool,
    ) -> Result<(), SceneError> {
        self.prototypes.push(RecordedPrototype {
            name: prototype.name.clone(),
            material: material.name.clone(),
            placements: placements.to_vec(),
            visible,
        });
        Ok(())
    }

    fn add_markers(&mut self, name: &str, points: &[Vec3]) -> Result<(), SceneError> {
        self.markers.push((name.to_string(), points.to_vec()));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SceneError> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_atlas_is_placeholder() {
        let layout = AtlasLayout::default();
        let a = AtlasImage::locate("/nonexistent/textures_0.png", &layout);
        assert!(a.placeholder);
        assert_eq!((a.width, a.height), (512, 512));
    }

    #[test]
    fn present_atlas_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.png");
        image::RgbaImage::new(64, 64).save(&path).unwrap();
        let a = AtlasImage::locate(&path, &AtlasLayout::new(4, 16));
        assert!(!a.placeholder);
        assert_eq!((a.width, a.height), (64, 64));
    }
}
