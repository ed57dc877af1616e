use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::{AtlasConfig, BlocksConfig};
use crate::types::{
    AIR, BlockDefinition, BlockId, FaceDataError, FaceTextures, RawFaces, ShapeKind,
    VariantOverride,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("block id {0} is defined twice")]
    DuplicateId(BlockId),
    #[error("block id 0 is reserved for air ({0})")]
    AirDefined(String),
    #[error("variants declared for undefined block id {0}")]
    VariantsForUnknown(BlockId),
    #[error("atlas must have at least one unit and one pixel per unit")]
    EmptyAtlas,
}

/// A block definition with its variant override applied.
#[derive(Clone, Debug)]
pub struct ResolvedBlock<'a> {
    pub def: &'a BlockDefinition,
    pub suffix: &'a str,
    pub color: [u8; 3],
    pub faces: Result<FaceTextures, FaceDataError>,
}

impl ResolvedBlock<'_> {
    /// Display name plus variant suffix, e.g. `WoolOrange`.
    pub fn full_name(&self) -> String {
        let mut s = String::with_capacity(self.def.name.len() + self.suffix.len());
        s.push_str(&self.def.name);
        s.push_str(self.suffix);
        s
    }
}

/// Owned block table for one load. Indexed by id; holes are unknown ids.
#[derive(Clone, Debug)]
pub struct CatalogStore {
    pub atlas: AtlasConfig,
    blocks: Vec<Option<BlockDefinition>>,
    variants: HashMap<BlockId, Vec<VariantOverride>>,
    by_name: HashMap<String, BlockId>,
    placeholder: BlockDefinition,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(AtlasConfig::default())
    }
}

impl CatalogStore {
    pub fn new(atlas: AtlasConfig) -> Self {
        Self {
            atlas,
            blocks: Vec::new(),
            variants: HashMap::new(),
            by_name: HashMap::new(),
            placeholder: BlockDefinition::placeholder(),
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&s)?)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, CatalogError> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, CatalogError> {
        if cfg.atlas.units == 0 || cfg.atlas.pixels_per_unit == 0 {
            return Err(CatalogError::EmptyAtlas);
        }
        let mut store = CatalogStore::new(cfg.atlas);
        for def in cfg.blocks {
            if def.id == AIR {
                return Err(CatalogError::AirDefined(def.name));
            }
            let shape = def
                .shape
                .as_deref()
                .map(|s| ShapeKind::from_name(s, def.params.as_deref()))
                .unwrap_or(ShapeKind::Box);
            store.insert(BlockDefinition {
                id: def.id,
                name: def.name,
                color: def.color.unwrap_or(BlockDefinition::PLACEHOLDER_COLOR),
                faces: def.faces.as_ref().map(RawFaces::from_toml),
                uses_aux: def.aux,
                shape,
                shading: def.shading,
            })?;
        }
        for v in cfg.variants {
            if store.get(v.id).is_none() {
                return Err(CatalogError::VariantsForUnknown(v.id));
            }
            let entries = v
                .entries
                .into_iter()
                .map(|e| VariantOverride {
                    suffix: e.suffix,
                    color: e.color,
                    faces: e.faces.as_ref().map(RawFaces::from_toml),
                })
                .collect();
            store.variants.insert(v.id, entries);
        }
        log::debug!(
            "catalog: {} blocks, {} with variants",
            store.by_name.len(),
            store.variants.len()
        );
        Ok(store)
    }

    pub fn insert(&mut self, def: BlockDefinition) -> Result<(), CatalogError> {
        let idx = def.id as usize;
        if self.blocks.len() <= idx {
            self.blocks.resize(idx + 1, None);
        }
        if self.blocks[idx].is_some() {
            return Err(CatalogError::DuplicateId(def.id));
        }
        self.by_name.insert(def.name.clone(), def.id);
        self.blocks[idx] = Some(def);
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockDefinition> {
        self.blocks.get(id as usize).and_then(|b| b.as_ref())
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn placeholder(&self) -> &BlockDefinition {
        &self.placeholder
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.blocks.iter().filter_map(|b| b.as_ref())
    }

    /// Applies the variant selected by `aux`. `None` for an unknown id.
    /// Aux values outside the variant list, and blocks that ignore aux,
    /// resolve to the base definition with an empty suffix.
    pub fn resolve_variant(&self, id: BlockId, aux: u8) -> Option<ResolvedBlock<'_>> {
        let def = self.get(id)?;
        let variant = if def.uses_aux {
            self.variants
                .get(&id)
                .and_then(|list| list.get(aux as usize))
        } else {
            None
        };
        let (suffix, color, raw) = match variant {
            Some(v) => (
                v.suffix.as_str(),
                v.color.unwrap_or(def.color),
                v.faces.as_ref().or(def.faces.as_ref()),
            ),
            None => ("", def.color, def.faces.as_ref()),
        };
        Some(ResolvedBlock {
            def,
            suffix,
            color,
            faces: FaceTextures::normalize(raw, def.shape, self.atlas.units),
        })
    }

    /// Variant suffix only; the hot path uses this to find cache keys
    /// without normalizing faces.
    pub fn variant_suffix(&self, id: BlockId, aux: u8) -> Option<&str> {
        let def = self.get(id)?;
        if !def.uses_aux {
            return Some("");
        }
        Some(
            self.variants
                .get(&id)
                .and_then(|list| list.get(aux as usize))
                .map(|v| v.suffix.as_str())
                .unwrap_or(""),
        )
    }

    pub fn resolve_placeholder(&self) -> ResolvedBlock<'_> {
        ResolvedBlock {
            def: &self.placeholder,
            suffix: "",
            color: self.placeholder.color,
            faces: Ok(FaceTextures::Untextured),
        }
    }
}
