use serde::Deserialize;

use crate::types::ShadingParams;

// Top-level catalog file
#[derive(Deserialize, Debug, Default)]
pub struct BlocksConfig {
    #[serde(default)]
    pub atlas: AtlasConfig,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
    // Per-block variant lists, indexed by auxiliary value
    #[serde(default)]
    pub variants: Vec<VariantsDef>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AtlasConfig {
    #[serde(default = "default_units")]
    pub units: u16,
    #[serde(default = "default_pixels_per_unit")]
    pub pixels_per_unit: u16,
    // Relative to the assets directory
    #[serde(default = "default_image")]
    pub image: String,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            units: default_units(),
            pixels_per_unit: default_pixels_per_unit(),
            image: default_image(),
        }
    }
}

fn default_units() -> u16 {
    32
}

fn default_pixels_per_unit() -> u16 {
    16
}

fn default_image() -> String {
    "textures_0.png".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct BlockDef {
    pub id: u16,
    pub name: String,
    #[serde(default)]
    pub color: Option<[u8; 3]>,
    // An index, or a list ordered bottom, top, right, front, left, back.
    // Kept untyped so one bad entry only disables its own block.
    #[serde(default)]
    pub faces: Option<toml::Value>,
    // Auxiliary data selects a variant
    #[serde(default)]
    pub aux: bool,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub params: Option<Vec<u8>>,
    #[serde(default)]
    pub shading: ShadingParams,
}

#[derive(Deserialize, Debug, Clone)]
pub struct VariantsDef {
    pub id: u16,
    pub entries: Vec<VariantEntry>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct VariantEntry {
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub color: Option<[u8; 3]>,
    #[serde(default)]
    pub faces: Option<toml::Value>,
}
