//! Block catalog: data-driven block definitions, variant overrides and
//! shading descriptions.
#![forbid(unsafe_code)]

pub mod config;
pub mod material;
pub mod registry;
pub mod types;

pub use material::{Material, MaterialId, MaterialLibrary, ShadingKind};
pub use registry::{CatalogError, CatalogStore, ResolvedBlock};
pub use types::{
    BlockDefinition, BlockId, FaceDataError, FaceTextures, Insets, ShadingParams, ShapeKind,
    VariantOverride,
};
