use std::collections::HashMap;

use crate::types::ShadingParams;

/// Alpha below which a cutout texel is discarded.
pub const CUTOUT_THRESHOLD: f32 = 0.001;
/// Tint endpoints mixed by the cutout mask on leaf materials.
pub const LEAF_DARK: [f32; 3] = [0.01, 0.0185002, 0.0137021];
pub const LEAF_LIGHT: [f32; 3] = [0.098, 0.238398, 0.135633];

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShadingKind {
    Emissive { strength: f32 },
    /// Alpha-cutout: opaque where the texture is, transparent elsewhere.
    Stencil,
    /// Blended translucency (glass, water).
    Translucent,
    /// Cutout tinted between two fixed colors.
    Leaf { dark: [f32; 3], light: [f32; 3] },
    Diffuse,
}

impl ShadingKind {
    /// First match wins: emission, stencil, alpha, leaf, then diffuse.
    pub fn from_params(p: &ShadingParams) -> ShadingKind {
        if p.emit > 0.0 {
            ShadingKind::Emissive { strength: p.emit }
        } else if p.stencil {
            ShadingKind::Stencil
        } else if p.alpha {
            ShadingKind::Translucent
        } else if p.leaf {
            ShadingKind::Leaf {
                dark: LEAF_DARK,
                light: LEAF_LIGHT,
            }
        } else {
            ShadingKind::Diffuse
        }
    }

    #[inline]
    pub fn is_cutout(&self) -> bool {
        matches!(self, ShadingKind::Stencil | ShadingKind::Leaf { .. })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct MaterialId(pub u32);

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct GraphId(pub u16);

/// Reusable shader building blocks. Materials reference these by handle, so
/// editing one restyles every material of that kind.
#[derive(Clone, Debug, PartialEq)]
pub enum ShaderGraph {
    /// Nearest-neighbour lookup into the block atlas.
    TextureSampler,
    Diffuse { texture: GraphId },
    Cutout { texture: GraphId, threshold: f32 },
    TintedCutout {
        cutout: GraphId,
        dark: [f32; 3],
        light: [f32; 3],
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    /// Base color in 0..1, used untextured and in viewport shading.
    pub color: [f32; 3],
    pub kind: ShadingKind,
    pub graph: Option<GraphId>,
    pub textured: bool,
}

#[derive(Default, Clone, Debug)]
pub struct MaterialLibrary {
    graphs: Vec<ShaderGraph>,
    graph_by_kind: HashMap<&'static str, GraphId>,
    materials: Vec<Material>,
    by_name: HashMap<String, MaterialId>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graphs(&self) -> &[ShaderGraph] {
        &self.graphs
    }

    pub fn graph(&self, id: GraphId) -> Option<&ShaderGraph> {
        self.graphs.get(id.0 as usize)
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    fn shared(&mut self, key: &'static str, make: impl FnOnce(&mut Self) -> ShaderGraph) -> GraphId {
        if let Some(id) = self.graph_by_kind.get(key) {
            return *id;
        }
        let graph = make(self);
        let id = GraphId(self.graphs.len() as u16);
        self.graphs.push(graph);
        self.graph_by_kind.insert(key, id);
        id
    }

    fn texture(&mut self) -> GraphId {
        self.shared("texture", |_| ShaderGraph::TextureSampler)
    }

    fn cutout(&mut self) -> GraphId {
        self.shared("cutout", |lib| ShaderGraph::Cutout {
            texture: lib.texture(),
            threshold: CUTOUT_THRESHOLD,
        })
    }

    fn graph_for(&mut self, kind: ShadingKind) -> GraphId {
        match kind {
            ShadingKind::Emissive { .. } => self.texture(),
            ShadingKind::Stencil => self.cutout(),
            ShadingKind::Diffuse | ShadingKind::Translucent => {
                self.shared("diffuse", |lib| ShaderGraph::Diffuse {
                    texture: lib.texture(),
                })
            }
            ShadingKind::Leaf { dark, light } => self.shared("tinted_cutout", |lib| {
                ShaderGraph::TintedCutout {
                    cutout: lib.cutout(),
                    dark,
                    light,
                }
            }),
        }
    }

    /// Returns the material called `name`, creating it on first use.
    pub fn material_for(
        &mut self,
        name: &str,
        rgb: [u8; 3],
        shading: &ShadingParams,
        textured: bool,
    ) -> MaterialId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let kind = ShadingKind::from_params(shading);
        let graph = textured.then(|| self.graph_for(kind));
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(Material {
            id,
            name: name.to_string(),
            color: rgb.map(|c| f32::from(c) / 256.0),
            kind,
            graph,
            textured,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(emit: f32, stencil: bool, alpha: bool, leaf: bool) -> ShadingParams {
        ShadingParams {
            emit,
            stencil,
            alpha,
            leaf,
        }
    }

    #[test]
    fn precedence_is_emit_stencil_alpha_leaf() {
        assert_eq!(
            ShadingKind::from_params(&params(1.1, true, true, true)),
            ShadingKind::Emissive { strength: 1.1 }
        );
        assert_eq!(ShadingKind::from_params(&params(0.0, true, true, true)), ShadingKind::Stencil);
        assert_eq!(
            ShadingKind::from_params(&params(0.0, false, true, true)),
            ShadingKind::Translucent
        );
        assert!(matches!(
            ShadingKind::from_params(&params(0.0, false, false, true)),
            ShadingKind::Leaf { .. }
        ));
        assert_eq!(ShadingKind::from_params(&ShadingParams::default()), ShadingKind::Diffuse);
    }

    #[test]
    fn sub_graphs_are_created_once() {
        let mut lib = MaterialLibrary::new();
        let plain = ShadingParams::default();
        let glass = params(0.0, true, false, false);
        let leaf = params(0.0, false, false, true);
        let a = lib.material_for("mcStoneMat", [116, 116, 116], &plain, true);
        let b = lib.material_for("mcDirtMat", [150, 108, 74], &plain, true);
        let c = lib.material_for("mcGlassMat", [254, 254, 254], &glass, true);
        let d = lib.material_for("mcLeavesMat", [99, 128, 15], &leaf, true);
        assert_eq!(lib.get(a).unwrap().graph, lib.get(b).unwrap().graph);
        // texture, diffuse, cutout, tinted cutout
        assert_eq!(lib.graphs().len(), 4);
        let leaf_graph = lib.get(d).unwrap().graph.unwrap();
        let glass_graph = lib.get(c).unwrap().graph.unwrap();
        match lib.graph(leaf_graph) {
            Some(ShaderGraph::TintedCutout { cutout, .. }) => assert_eq!(*cutout, glass_graph),
            other => panic!("unexpected graph {:?}", other),
        }
    }

    #[test]
    fn materials_are_keyed_by_name() {
        let mut lib = MaterialLibrary::new();
        let p = ShadingParams::default();
        let a = lib.material_for("mcWoolMat", [235, 235, 235], &p, true);
        let b = lib.material_for("mcWoolMat", [0, 0, 0], &p, true);
        assert_eq!(a, b);
        assert_eq!(lib.len(), 1);
        let m = lib.get(a).unwrap();
        assert!((m.color[0] - 235.0 / 256.0).abs() < 1e-6);
        let untextured = lib.material_for("mcBedMat", [214, 127, 255], &p, false);
        assert!(lib.get(untextured).unwrap().graph.is_none());
    }
}
