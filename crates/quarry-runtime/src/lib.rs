//! Load orchestration: prototype cache, chunk grid walk and the single
//! batched commit into a scene.
#![forbid(unsafe_code)]

pub mod cache;
pub mod commit;
pub mod context;
mod cull;
pub mod loader;
pub mod report;

pub use cache::{Prototype, PrototypeCache, PrototypeId};
pub use commit::{AtlasImage, RecordingScene, SceneError, SceneSink, VIEWPORT_HIDES, commit};
pub use context::{Features, LoadContext, LoadError, LoadOptions};
pub use loader::{LoadOutcome, MarkerSet, PlacementLists, load};
pub use report::LoadReport;
