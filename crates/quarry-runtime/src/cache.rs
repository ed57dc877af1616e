//! One synthesized prototype per distinct (block, variant, form).

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;
use quarry_blocks::registry::{CatalogStore, ResolvedBlock};
use quarry_blocks::types::{BlockId, FaceTextures, ShapeKind};
use quarry_blocks::{Material, MaterialId, MaterialLibrary};
use quarry_mesh::{AtlasLayout, Form, PrototypeMesh, synthesize};

/// Upside-down bit of a stair's aux value.
pub const STAIR_UPSIDE_DOWN: u8 = 0x4;

/// Quarter turns for stair facing (aux bits 0-1: east, west, south, north).
const STAIR_TURNS: [u8; 4] = [2, 0, 1, 3];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrototypeId(pub u32);

impl PrototypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
pub struct Prototype {
    pub id: PrototypeId,
    /// Scene name, e.g. `mcWoolOrange` or `mcFenceRail`.
    pub name: String,
    pub block: BlockId,
    pub form: Form,
    pub mesh: PrototypeMesh,
    pub material: MaterialId,
    pub placeholder: bool,
}

/// Lazily built prototypes for one load. `resolve` is called once per
/// placed cell, so the hot path is a single memo lookup.
pub struct PrototypeCache {
    atlas: AtlasLayout,
    prototypes: Vec<Prototype>,
    materials: MaterialLibrary,
    by_key: HashMap<(BlockId, String), PrototypeId>,
    memo: HashMap<(BlockId, u8, Form), PrototypeId>,
    placeholder: Option<PrototypeId>,
    unknown: BTreeSet<BlockId>,
    malformed: BTreeMap<BlockId, String>,
    hits: u64,
    misses: u64,
}

impl PrototypeCache {
    pub fn new(atlas: AtlasLayout) -> Self {
        Self {
            atlas,
            prototypes: Vec::new(),
            materials: MaterialLibrary::new(),
            by_key: HashMap::new(),
            memo: HashMap::new(),
            placeholder: None,
            unknown: BTreeSet::new(),
            malformed: BTreeMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    #[inline]
    pub fn resolve(&mut self, catalog: &CatalogStore, id: BlockId, aux: u8) -> PrototypeId {
        self.resolve_form(catalog, id, aux, Form::Standard)
    }

    /// Stair prototype (inverted when the upside-down bit is set) and the
    /// quarter turns that face it.
    pub fn resolve_stair(
        &mut self,
        catalog: &CatalogStore,
        id: BlockId,
        aux: u8,
    ) -> (PrototypeId, u8) {
        let form = if aux & STAIR_UPSIDE_DOWN != 0 {
            Form::Inverted
        } else {
            Form::Standard
        };
        (self.resolve_form(catalog, id, aux, form), stair_turns(aux))
    }

    pub fn resolve_rail(&mut self, catalog: &CatalogStore, id: BlockId, aux: u8) -> PrototypeId {
        self.resolve_form(catalog, id, aux, Form::Rail)
    }

    pub fn resolve_form(
        &mut self,
        catalog: &CatalogStore,
        id: BlockId,
        aux: u8,
        form: Form,
    ) -> PrototypeId {
        if let Some(&p) = self.memo.get(&(id, aux, form)) {
            self.hits += 1;
            return p;
        }
        self.misses += 1;
        let p = self.build(catalog, id, aux, form);
        self.memo.insert((id, aux, form), p);
        p
    }

    fn build(&mut self, catalog: &CatalogStore, id: BlockId, aux: u8, form: Form) -> PrototypeId {
        let Some(resolved) = catalog.resolve_variant(id, aux) else {
            if self.unknown.insert(id) {
                log::debug!("unknown block id {id}");
            }
            return self.placeholder(catalog);
        };
        let faces = match &resolved.faces {
            Ok(f) => f.clone(),
            Err(e) => {
                if !self.malformed.contains_key(&id) {
                    log::debug!("block {} ({}) has bad face data: {}", id, resolved.def.name, e);
                    self.malformed.insert(id, e.to_string());
                }
                return self.placeholder(catalog);
            }
        };
        // Forms only apply to the shapes that have them.
        let form = match (resolved.def.shape, form) {
            (ShapeKind::Stair, Form::Inverted) => Form::Inverted,
            (ShapeKind::Fence, Form::Rail) => Form::Rail,
            _ => Form::Standard,
        };
        let key_suffix = format!("{}{}", resolved.suffix, form.suffix());
        if let Some(&p) = self.by_key.get(&(id, key_suffix.clone())) {
            return p;
        }
        let p = self.insert(&resolved, &faces, form, false);
        self.by_key.insert((id, key_suffix), p);
        p
    }

    fn placeholder(&mut self, catalog: &CatalogStore) -> PrototypeId {
        if let Some(p) = self.placeholder {
            return p;
        }
        let resolved = catalog.resolve_placeholder();
        let p = self.insert(&resolved, &FaceTextures::Untextured, Form::Standard, true);
        self.placeholder = Some(p);
        p
    }

    fn insert(
        &mut self,
        resolved: &ResolvedBlock<'_>,
        faces: &FaceTextures,
        form: Form,
        placeholder: bool,
    ) -> PrototypeId {
        let full = resolved.full_name();
        let material = self.materials.material_for(
            &format!("mc{full}Mat"),
            resolved.color,
            &resolved.def.shading,
            !matches!(faces, FaceTextures::Untextured),
        );
        let id = PrototypeId(self.prototypes.len() as u32);
        let name = format!("mc{}{}", full, form.suffix());
        log::trace!("new prototype {name}");
        self.prototypes.push(Prototype {
            id,
            name,
            block: resolved.def.id,
            form,
            mesh: synthesize(resolved.def.shape, form, faces, &self.atlas),
            material,
            placeholder,
        });
        id
    }

    #[inline]
    pub fn get(&self, id: PrototypeId) -> &Prototype {
        &self.prototypes[id.index()]
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn prototypes(&self) -> &[Prototype] {
        &self.prototypes
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    pub fn placeholder_id(&self) -> Option<PrototypeId> {
        self.placeholder
    }

    /// Ids with no catalog entry, each recorded once.
    pub fn unknown_ids(&self) -> &BTreeSet<BlockId> {
        &self.unknown
    }

    /// Blocks whose face data could not be normalized, with the reason.
    pub fn malformed(&self) -> &BTreeMap<BlockId, String> {
        &self.malformed
    }

    /// `(memo hits, syntheses attempted)`.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn atlas(&self) -> &AtlasLayout {
        &self.atlas
    }
}

/// Quarter turns for a stair's facing bits.
#[inline]
pub fn stair_turns(aux: u8) -> u8 {
    STAIR_TURNS[(aux & 0x3) as usize]
}
