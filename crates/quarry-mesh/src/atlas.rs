//! Flat texture index to atlas UV mapping.
//!
//! The atlas is a square grid of `units`×`units` tiles, each
//! `pixels_per_unit` pixels wide. Image rows run top to bottom while V runs
//! bottom to top, so a tile's top edge sits at `1 - row/units`.

use quarry_blocks::config::AtlasConfig;
use quarry_blocks::types::Insets;
use quarry_geom::{Vec2, Vec3};

use crate::face::{Corner, CubeFace};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    pub units: u16,
    pub pixels_per_unit: u16,
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            units: 32,
            pixels_per_unit: 16,
        }
    }
}

/// Axis-aligned UV rectangle; `top > bottom`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl UvRect {
    #[inline]
    pub fn corner(&self, c: Corner) -> Vec2 {
        match c {
            Corner::TopLeft => Vec2::new(self.left, self.top),
            Corner::TopRight => Vec2::new(self.right, self.top),
            Corner::BottomRight => Vec2::new(self.right, self.bottom),
            Corner::BottomLeft => Vec2::new(self.left, self.bottom),
        }
    }
}

impl AtlasLayout {
    pub const fn new(units: u16, pixels_per_unit: u16) -> Self {
        Self {
            units,
            pixels_per_unit,
        }
    }

    pub fn from_config(cfg: &AtlasConfig) -> Self {
        Self::new(cfg.units, cfg.pixels_per_unit)
    }

    /// Edge length of the atlas image in pixels.
    #[inline]
    pub fn pixels(&self) -> u32 {
        u32::from(self.units) * u32::from(self.pixels_per_unit)
    }

    /// Normalized width and height of one tile.
    #[inline]
    pub fn uv_unit(&self) -> f32 {
        1.0 / f32::from(self.units)
    }

    /// One source pixel in normalized UV units.
    #[inline]
    pub fn pixel_unit(&self) -> f32 {
        self.uv_unit() / f32::from(self.pixels_per_unit)
    }

    /// One texel in block units; a block edge spans `pixels_per_unit` texels.
    #[inline]
    pub fn texel(&self) -> f32 {
        1.0 / f32::from(self.pixels_per_unit)
    }

    /// `(column, row)` of a tile, rows counted from the top of the image.
    #[inline]
    pub fn tile(&self, index: u16) -> (u16, u16) {
        (index % self.units, index / self.units)
    }

    pub fn index_of(&self, col: u16, row: u16) -> Option<u16> {
        if col >= self.units || row >= self.units {
            return None;
        }
        Some(row * self.units + col)
    }

    /// Top-left UV corner of the tile.
    pub fn atlas_coords(&self, index: u16) -> (f32, f32) {
        let (col, row) = self.tile(index);
        let p = f32::from(self.pixels_per_unit);
        let size = self.pixels() as f32;
        let u = f32::from(col) * p / size;
        let v = 1.0 - f32::from(row) * p / size;
        (u, v)
    }

    pub fn tile_rect(&self, index: u16) -> UvRect {
        let (u, v) = self.atlas_coords(index);
        let w = self.uv_unit();
        UvRect {
            left: u,
            right: u + w,
            top: v,
            bottom: v - w,
        }
    }

    /// Tile rectangle of `face` shrunk by the box insets. Top and bottom
    /// faces lose the side inset on every edge; side faces lose it left and
    /// right and lose the top and bottom insets on those edges.
    pub fn inset_rect(&self, index: u16, face: CubeFace, insets: Insets) -> UvRect {
        let px = self.pixel_unit();
        let r = self.tile_rect(index);
        let side = f32::from(insets.side) * px;
        let (top, bottom) = match face {
            CubeFace::Top | CubeFace::Bottom => (side, side),
            _ => (f32::from(insets.top) * px, f32::from(insets.bottom) * px),
        };
        UvRect {
            left: r.left + side,
            right: r.right - side,
            top: r.top - top,
            bottom: r.bottom + bottom,
        }
    }

    /// UVs of `face` in its corner-traversal order.
    pub fn face_uvs(&self, index: u16, face: CubeFace, insets: Insets) -> [Vec2; 4] {
        let rect = self.inset_rect(index, face, insets);
        face.corners().map(|c| rect.corner(c))
    }

    /// UVs of a billboard quad: top-right, top-left, bottom-left, bottom-right.
    pub fn cross_uvs(&self, index: u16) -> [Vec2; 4] {
        let rect = self.tile_rect(index);
        [
            Corner::TopRight,
            Corner::TopLeft,
            Corner::BottomLeft,
            Corner::BottomRight,
        ]
        .map(|c| rect.corner(c))
    }

    /// Box projection of a point onto `face`'s tile. `p` is in block space
    /// (unit block centered on the origin).
    pub fn project(&self, index: u16, face: CubeFace, p: Vec3) -> Vec2 {
        let r = self.tile_rect(index);
        let w = self.uv_unit();
        let s = p.dot(face.right()) + 0.5;
        let t = p.dot(face.up()) + 0.5;
        Vec2::new(r.left + s * w, r.bottom + t * w)
    }
}
