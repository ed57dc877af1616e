//! Texture atlas mapping and prototype geometry synthesis.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod face;
pub mod mesh;
pub mod synth;

pub use atlas::{AtlasLayout, UvRect};
pub use face::{Corner, CubeFace};
pub use mesh::{PrototypeMesh, Quad};
pub use synth::{Form, synthesize};
