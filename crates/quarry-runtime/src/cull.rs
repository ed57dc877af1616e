//! Per-chunk visibility rules: hollowing, surface-only and fence links.

use quarry_blocks::registry::CatalogStore;
use quarry_blocks::types::BlockId;
use quarry_chunk::{CHUNK_SIDE, ChunkColumn};

use crate::context::LoadContext;

/// The six face neighbours in Minecraft axes.
const NEIGHBOURS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Lateral fence directions `(dx, dz)` with the rail's quarter turns.
pub(crate) const FENCE_DIRS: [(i32, i32, u8); 4] = [(1, 0, 2), (-1, 0, 0), (0, 1, 1), (0, -1, 3)];

/// Per-id flags folded from the catalog and the exclusion set.
pub(crate) struct BlockTraits {
    opaque: Vec<bool>,
    fence: Vec<bool>,
}

impl BlockTraits {
    pub fn new(catalog: &CatalogStore, ctx: &LoadContext) -> Self {
        let len = catalog.iter().map(|d| d.id as usize + 1).max().unwrap_or(0);
        let mut opaque = vec![false; len];
        let mut fence = vec![false; len];
        for def in catalog.iter() {
            let i = def.id as usize;
            opaque[i] = def.is_opaque_cube() && !ctx.is_excluded(def.id);
            fence[i] = def.is_fence();
        }
        Self { opaque, fence }
    }

    /// Unknown ids are never opaque.
    #[inline]
    pub fn is_opaque(&self, id: BlockId) -> bool {
        self.opaque.get(id as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_fence(&self, id: BlockId) -> bool {
        self.fence.get(id as usize).copied().unwrap_or(false)
    }
}

/// What lies across one lateral side of a fence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Connect,
    Open,
    /// The neighbour is in another chunk.
    Outside,
}

pub(crate) struct ChunkView<'a> {
    pub column: &'a ChunkColumn,
    pub ctx: &'a LoadContext,
    pub traits: &'a BlockTraits,
}

impl ChunkView<'_> {
    /// An in-column, in-range, non-excluded opaque cube.
    #[inline]
    pub fn opaque_at(&self, x: i32, y: i32, z: i32) -> bool {
        match self.column.get_checked(x, y, z) {
            Some(cell) => self.ctx.in_range(y) && self.traits.is_opaque(cell.id),
            None => false,
        }
    }

    /// Every face touches an opaque cube, so nothing of the cell shows.
    pub fn enclosed(&self, x: i32, y: i32, z: i32) -> bool {
        NEIGHBOURS
            .iter()
            .all(|&(dx, dy, dz)| self.opaque_at(x + dx, y + dy, z + dz))
    }

    /// Lowest visible `y` per `(x, z)` column, indexed `z * 16 + x`: the
    /// first opaque cube from the ceiling down, or the floor when there
    /// is none.
    pub fn surface_floors(&self) -> Vec<i32> {
        let top = self.ctx.ceiling.min(self.column.height as i32 - 1);
        let mut floors = vec![self.ctx.floor; CHUNK_SIDE * CHUNK_SIDE];
        for z in 0..CHUNK_SIDE as i32 {
            for x in 0..CHUNK_SIDE as i32 {
                let mut y = top;
                while y >= self.ctx.floor {
                    if self.opaque_at(x, y, z) {
                        floors[(z as usize) * CHUNK_SIDE + x as usize] = y;
                        break;
                    }
                    y -= 1;
                }
            }
        }
        floors
    }

    /// Whether a fence at `(x, y, z)` joins its neighbour at `(dx, dz)`.
    pub fn fence_side(&self, x: i32, y: i32, z: i32, dx: i32, dz: i32) -> Side {
        let side = CHUNK_SIDE as i32;
        let (nx, nz) = (x + dx, z + dz);
        if nx < 0 || nz < 0 || nx >= side || nz >= side {
            return Side::Outside;
        }
        match self.column.get_checked(nx, y, nz) {
            Some(cell) if self.traits.is_fence(cell.id) || self.traits.is_opaque(cell.id) => {
                Side::Connect
            }
            _ => Side::Open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LoadOptions;
    use quarry_chunk::{Cell, ChunkCoord};
    use quarry_world::BlockPos;

    const CATALOG: &str = r#"
        [[blocks]]
        id = 1
        name = "Stone"
        color = [116, 116, 116]
        faces = 308

        [[blocks]]
        id = 8
        name = "WaterFlo"
        color = [31, 85, 255]
        faces = 2
        shading = { alpha = true }

        [[blocks]]
        id = 85
        name = "Fence"
        color = [160, 130, 70]
        faces = 4
        shape = "fence"
    "#;

    fn setup(options: LoadOptions) -> (CatalogStore, LoadContext) {
        let cat = CatalogStore::from_toml_str(CATALOG).unwrap();
        let ctx = LoadContext::new(&options, BlockPos::default(), 0).unwrap();
        (cat, ctx)
    }

    fn solid_cube(col: &mut ChunkColumn, id: u16) {
        for x in 4..7 {
            for y in 4..7 {
                for z in 4..7 {
                    col.set(x, y, z, Cell::new(id, 0));
                }
            }
        }
    }

    #[test]
    fn traits_fold_exclusion() {
        let (cat, ctx) = setup(LoadOptions { omit_common: true, ..Default::default() });
        let t = BlockTraits::new(&cat, &ctx);
        assert!(!t.is_opaque(1));
        assert!(!t.is_opaque(8));
        assert!(!t.is_opaque(9999));
        assert!(t.is_fence(85));
        let (cat, ctx) = setup(LoadOptions::default());
        assert!(BlockTraits::new(&cat, &ctx).is_opaque(1));
    }

    #[test]
    fn centre_of_stone_cube_is_enclosed() {
        let (cat, ctx) = setup(LoadOptions { floor: 0, ..Default::default() });
        let traits = BlockTraits::new(&cat, &ctx);
        let mut col = ChunkColumn::new(ChunkCoord::default(), 16);
        solid_cube(&mut col, 1);
        let view = ChunkView { column: &col, ctx: &ctx, traits: &traits };
        assert!(view.enclosed(5, 5, 5));
        assert!(!view.enclosed(4, 5, 5));
    }

    #[test]
    fn water_neighbour_keeps_stone_visible() {
        let (cat, ctx) = setup(LoadOptions { floor: 0, ..Default::default() });
        let traits = BlockTraits::new(&cat, &ctx);
        let mut col = ChunkColumn::new(ChunkCoord::default(), 16);
        solid_cube(&mut col, 1);
        col.set(5, 6, 5, Cell::new(8, 0));
        let view = ChunkView { column: &col, ctx: &ctx, traits: &traits };
        assert!(!view.enclosed(5, 5, 5));
    }

    #[test]
    fn neighbours_below_floor_do_not_hide() {
        let (cat, ctx) = setup(LoadOptions { floor: 5, ..Default::default() });
        let traits = BlockTraits::new(&cat, &ctx);
        let mut col = ChunkColumn::new(ChunkCoord::default(), 16);
        solid_cube(&mut col, 1);
        let view = ChunkView { column: &col, ctx: &ctx, traits: &traits };
        assert!(!view.enclosed(5, 5, 5));
    }

    #[test]
    fn chunk_edges_never_hide() {
        let (cat, ctx) = setup(LoadOptions { floor: 0, ..Default::default() });
        let traits = BlockTraits::new(&cat, &ctx);
        let mut col = ChunkColumn::new(ChunkCoord::default(), 4);
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..4 {
                    col.set(x, y, z, Cell::new(1, 0));
                }
            }
        }
        let view = ChunkView { column: &col, ctx: &ctx, traits: &traits };
        assert!(view.enclosed(1, 1, 1));
        assert!(!view.enclosed(0, 1, 1));
        assert!(!view.enclosed(1, 1, 15));
        assert!(!view.enclosed(1, 3, 1));
    }

    #[test]
    fn surface_floor_stops_at_first_opaque() {
        let (cat, ctx) = setup(LoadOptions { floor: 0, ceiling: 10, ..Default::default() });
        let traits = BlockTraits::new(&cat, &ctx);
        let mut col = ChunkColumn::new(ChunkCoord::default(), 16);
        col.set(0, 8, 0, Cell::new(8, 0));
        col.set(0, 6, 0, Cell::new(1, 0));
        col.set(0, 12, 0, Cell::new(1, 0)); // above the ceiling
        col.set(3, 2, 0, Cell::new(1, 0));
        let view = ChunkView { column: &col, ctx: &ctx, traits: &traits };
        let floors = view.surface_floors();
        assert_eq!(floors[0], 6);
        assert_eq!(floors[3], 2);
        assert_eq!(floors[1], 0);
    }

    #[test]
    fn fence_sides() {
        let (cat, ctx) = setup(LoadOptions::default());
        let traits = BlockTraits::new(&cat, &ctx);
        let mut col = ChunkColumn::new(ChunkCoord::default(), 16);
        col.set(5, 1, 5, Cell::new(85, 0));
        col.set(6, 1, 5, Cell::new(85, 0));
        col.set(5, 1, 6, Cell::new(1, 0));
        col.set(4, 1, 5, Cell::new(8, 0));
        col.set(15, 1, 0, Cell::new(85, 0));
        let view = ChunkView { column: &col, ctx: &ctx, traits: &traits };
        assert_eq!(view.fence_side(5, 1, 5, 1, 0), Side::Connect);
        assert_eq!(view.fence_side(5, 1, 5, 0, 1), Side::Connect);
        assert_eq!(view.fence_side(5, 1, 5, -1, 0), Side::Open);
        assert_eq!(view.fence_side(5, 1, 5, 0, -1), Side::Open);
        assert_eq!(view.fence_side(15, 1, 0, 1, 0), Side::Outside);
        assert_eq!(view.fence_side(15, 1, 0, 0, -1), Side::Outside);
    }
}
