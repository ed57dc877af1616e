use serde::Deserialize;
use thiserror::Error;

pub type BlockId = u16;

pub const AIR: BlockId = 0;

/// Face slots in the fixed order used throughout: bottom, top, right, front,
/// left, back.
pub const CUBE_FACES: usize = 6;
pub const CROSS_FACES: usize = 2;

/// Per-face inward displacement of an inset box, in texels. One texel is
/// `1 / pixels_per_unit` of a block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Insets {
    pub bottom: u8,
    pub top: u8,
    pub side: u8,
}

impl Insets {
    pub const NONE: Insets = Insets {
        bottom: 0,
        top: 0,
        side: 0,
    };

    #[inline]
    pub const fn new(bottom: u8, top: u8, side: u8) -> Self {
        Self { bottom, top, side }
    }
}

/// Closed set of prototype shapes. Unrecognized shape names become `Box`
/// when the catalog is loaded; synthesis matches exhaustively.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    InsetBox(Insets),
    Cross,
    Stair,
    Fence,
}

impl ShapeKind {
    /// Fixed post insets of a fence.
    pub const FENCE_POST: Insets = Insets::new(0, 0, 6);

    /// Maps a catalog shape name (and its optional parameters) to a kind.
    pub fn from_name(name: &str, params: Option<&[u8]>) -> ShapeKind {
        match name {
            "box" => ShapeKind::Box,
            "onehigh" => ShapeKind::InsetBox(Insets::new(0, 15, 0)),
            "slab" => ShapeKind::InsetBox(Insets::new(0, 8, 0)),
            "inset" => match params {
                Some(&[bottom, top, side]) if u16::from(bottom) + u16::from(top) < 16 && side < 8 => {
                    ShapeKind::InsetBox(Insets::new(bottom, top, side))
                }
                _ => {
                    log::warn!("inset shape without three valid insets {:?}; using box", params);
                    ShapeKind::Box
                }
            },
            "cross" | "crops" => ShapeKind::Cross,
            "stair" | "stairs" => ShapeKind::Stair,
            "fence" => ShapeKind::Fence,
            other => {
                log::debug!("shape '{}' has no dedicated geometry; using box", other);
                ShapeKind::Box
            }
        }
    }

    #[inline]
    pub fn face_slots(&self) -> usize {
        match self {
            ShapeKind::Cross => CROSS_FACES,
            _ => CUBE_FACES,
        }
    }
}

/// Shading flags as authored in the catalog.
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShadingParams {
    pub emit: f32,
    pub stencil: bool,
    pub alpha: bool,
    pub leaf: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FaceDataError {
    #[error("face textures must be an index or a list of indices, found {0}")]
    WrongType(String),
    #[error("{shape} expects {expected} face textures, found {found}")]
    WrongLength {
        shape: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("texture index {index} is outside the {units}x{units} atlas")]
    OutOfRange { index: i64, units: u16 },
}

/// Face texture data exactly as it appeared in the catalog, before it is
/// checked against the block's shape.
#[derive(Clone, Debug, PartialEq)]
pub enum RawFaces {
    Single(i64),
    List(Vec<i64>),
    Malformed(String),
}

impl RawFaces {
    pub fn from_toml(value: &toml::Value) -> RawFaces {
        match value {
            toml::Value::Integer(i) => RawFaces::Single(*i),
            toml::Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        toml::Value::Integer(i) => out.push(*i),
                        other => return RawFaces::Malformed(format!("list item {}", other.type_str())),
                    }
                }
                RawFaces::List(out)
            }
            other => RawFaces::Malformed(other.type_str().to_string()),
        }
    }
}

/// Normalized face textures: one atlas index per face slot of the shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceTextures {
    /// No texture data; the prototype is shaded by its base color only.
    Untextured,
    Cube([u16; CUBE_FACES]),
    Cross([u16; CROSS_FACES]),
}

impl FaceTextures {
    /// Validates raw catalog data against `shape`. A single index (or a list
    /// of one) is broadcast; cube shapes need 6 entries, a cross takes 2 or
    /// the first 2 of 6.
    pub fn normalize(
        raw: Option<&RawFaces>,
        shape: ShapeKind,
        atlas_units: u16,
    ) -> Result<FaceTextures, FaceDataError> {
        let list: Vec<i64> = match raw {
            None => return Ok(FaceTextures::Untextured),
            Some(RawFaces::Malformed(what)) => return Err(FaceDataError::WrongType(what.clone())),
            Some(RawFaces::Single(i)) => vec![*i],
            Some(RawFaces::List(v)) => v.clone(),
        };
        let tiles = i64::from(atlas_units) * i64::from(atlas_units);
        let mut checked = Vec::with_capacity(list.len());
        for index in list {
            let out_of_range = FaceDataError::OutOfRange {
                index,
                units: atlas_units,
            };
            if index >= tiles {
                return Err(out_of_range);
            }
            checked.push(u16::try_from(index).map_err(|_| out_of_range)?);
        }
        match (shape, checked.as_slice()) {
            (ShapeKind::Cross, &[one]) => Ok(FaceTextures::Cross([one, one])),
            (ShapeKind::Cross, &[a, b]) | (ShapeKind::Cross, &[a, b, _, _, _, _]) => {
                Ok(FaceTextures::Cross([a, b]))
            }
            (ShapeKind::Cross, other) => Err(FaceDataError::WrongLength {
                shape: "cross",
                expected: "1, 2 or 6",
                found: other.len(),
            }),
            (_, &[one]) => Ok(FaceTextures::Cube([one; CUBE_FACES])),
            (_, other) => {
                let faces: [u16; CUBE_FACES] =
                    other.try_into().map_err(|_| FaceDataError::WrongLength {
                        shape: "cube",
                        expected: "1 or 6",
                        found: other.len(),
                    })?;
                Ok(FaceTextures::Cube(faces))
            }
        }
    }

    /// Atlas index for face slot `slot`, if any.
    #[inline]
    pub fn slot(&self, slot: usize) -> Option<u16> {
        match self {
            FaceTextures::Untextured => None,
            FaceTextures::Cube(f) => f.get(slot).copied(),
            FaceTextures::Cross(f) => f.get(slot).copied(),
        }
    }
}

/// One entry of a block's variant list, selected by auxiliary value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantOverride {
    pub suffix: String,
    pub color: Option<[u8; 3]>,
    pub faces: Option<RawFaces>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockDefinition {
    pub id: BlockId,
    pub name: String,
    pub color: [u8; 3],
    pub faces: Option<RawFaces>,
    pub uses_aux: bool,
    pub shape: ShapeKind,
    pub shading: ShadingParams,
}

impl BlockDefinition {
    pub const PLACEHOLDER_COLOR: [u8; 3] = [214, 127, 255];

    /// Magenta cube standing in for unknown ids and unusable definitions.
    pub fn placeholder() -> Self {
        BlockDefinition {
            id: AIR,
            name: "Unknown".to_string(),
            color: Self::PLACEHOLDER_COLOR,
            faces: None,
            uses_aux: false,
            shape: ShapeKind::Box,
            shading: ShadingParams::default(),
        }
    }

    /// Full cube that hides every face it touches.
    #[inline]
    pub fn is_opaque_cube(&self) -> bool {
        matches!(self.shape, ShapeKind::Box)
            && !self.shading.stencil
            && !self.shading.alpha
            && !self.shading.leaf
    }

    #[inline]
    pub fn is_fence(&self) -> bool {
        matches!(self.shape, ShapeKind::Fence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_index_broadcasts_to_shape() {
        let raw = RawFaces::Single(308);
        assert_eq!(
            FaceTextures::normalize(Some(&raw), ShapeKind::Box, 32),
            Ok(FaceTextures::Cube([308; 6]))
        );
        assert_eq!(
            FaceTextures::normalize(Some(&raw), ShapeKind::Cross, 32),
            Ok(FaceTextures::Cross([308, 308]))
        );
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        let seven = RawFaces::List(vec![237, 175, 78, 46, 46, 46, 46]);
        assert!(matches!(
            FaceTextures::normalize(Some(&seven), ShapeKind::Box, 32),
            Err(FaceDataError::WrongLength { found: 7, .. })
        ));
        let three = RawFaces::List(vec![1, 2, 3]);
        assert!(FaceTextures::normalize(Some(&three), ShapeKind::Cross, 32).is_err());
    }

    #[test]
    fn cross_takes_first_two_of_six() {
        let six = RawFaces::List(vec![20, 21, 22, 23, 24, 25]);
        assert_eq!(
            FaceTextures::normalize(Some(&six), ShapeKind::Cross, 32),
            Ok(FaceTextures::Cross([20, 21]))
        );
    }

    #[test]
    fn out_of_atlas_indices_fail() {
        let raw = RawFaces::Single(1024);
        assert_eq!(
            FaceTextures::normalize(Some(&raw), ShapeKind::Box, 32),
            Err(FaceDataError::OutOfRange { index: 1024, units: 32 })
        );
        let neg = RawFaces::List(vec![0, 0, -1, 0, 0, 0]);
        assert!(FaceTextures::normalize(Some(&neg), ShapeKind::Stair, 32).is_err());
    }

    #[test]
    fn indices_past_u16_fail_on_large_atlases() {
        let raw = RawFaces::List(vec![1, 2, 3, 70_000, 5, 6]);
        assert_eq!(
            FaceTextures::normalize(Some(&raw), ShapeKind::Box, 300),
            Err(FaceDataError::OutOfRange {
                index: 70_000,
                units: 300
            })
        );
        assert!(FaceTextures::normalize(Some(&RawFaces::Single(-1)), ShapeKind::Box, 300).is_err());
        assert_eq!(
            FaceTextures::normalize(Some(&RawFaces::Single(65_535)), ShapeKind::Box, 300),
            Ok(FaceTextures::Cube([65_535; CUBE_FACES]))
        );
    }

    #[test]
    fn malformed_toml_values_surface_as_type_errors() {
        let v: toml::Value = toml::Value::String("stone".into());
        let raw = RawFaces::from_toml(&v);
        assert!(matches!(
            FaceTextures::normalize(Some(&raw), ShapeKind::Box, 32),
            Err(FaceDataError::WrongType(_))
        ));
    }

    #[test]
    fn shape_names_map_to_kinds() {
        assert_eq!(ShapeKind::from_name("onehigh", None), ShapeKind::InsetBox(Insets::new(0, 15, 0)));
        assert_eq!(
            ShapeKind::from_name("inset", Some(&[0, 6, 7])),
            ShapeKind::InsetBox(Insets::new(0, 6, 7))
        );
        assert_eq!(ShapeKind::from_name("inset", Some(&[0, 6])), ShapeKind::Box);
        assert_eq!(ShapeKind::from_name("crops", None), ShapeKind::Cross);
        assert_eq!(ShapeKind::from_name("stairs", None), ShapeKind::Stair);
        assert_eq!(ShapeKind::from_name("pstn", None), ShapeKind::Box);
    }

    #[test]
    fn only_plain_boxes_are_opaque() {
        let mut def = BlockDefinition::placeholder();
        assert!(def.is_opaque_cube());
        def.shading.alpha = true;
        assert!(!def.is_opaque_cube());
        def.shading = ShadingParams::default();
        def.shape = ShapeKind::InsetBox(Insets::new(0, 8, 0));
        assert!(!def.is_opaque_cube());
    }
}
