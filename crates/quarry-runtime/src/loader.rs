//! The chunk grid walk. Chunks are visited in a fixed order and every
//! placement is buffered; nothing reaches a scene until `commit`.

use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use hashbrown::HashSet;
use quarry_blocks::registry::CatalogStore;
use quarry_blocks::types::{BlockId, ShapeKind};
use quarry_chunk::{CHUNK_SIDE, ChunkColumn, ChunkCoord, ChunkError, ChunkReader};
use quarry_geom::{Placement, Vec3};
use quarry_mesh::AtlasLayout;
use quarry_world::{is_slime_chunk, scene_block, scene_point};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::cache::{PrototypeCache, PrototypeId};
use crate::context::{LoadContext, LoadError};
use crate::cull::{BlockTraits, ChunkView, FENCE_DIRS, Side};
use crate::report::LoadReport;

pub const SLIME_MARKERS: &str = "slimeChunks";
pub const PLAYER_MARKER: &str = "PlayerLoc";

/// Rows in flight between the decode thread and the resolving thread.
const ROWS_IN_FLIGHT: usize = 2;

/// Placements per prototype, indexed by `PrototypeId`.
#[derive(Clone, Debug, Default)]
pub struct PlacementLists {
    lists: Vec<Vec<Placement>>,
}

impl PlacementLists {
    pub fn push(&mut self, id: PrototypeId, placement: Placement) {
        let i = id.index();
        if self.lists.len() <= i {
            self.lists.resize_with(i + 1, Vec::new);
        }
        self.lists[i].push(placement);
    }

    pub fn get(&self, id: PrototypeId) -> &[Placement] {
        self.lists.get(id.index()).map_or(&[], Vec::as_slice)
    }

    /// Non-empty lists in prototype order.
    pub fn iter(&self) -> impl Iterator<Item = (PrototypeId, &[Placement])> {
        self.lists
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.is_empty())
            .map(|(i, l)| (PrototypeId(i as u32), l.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerSet {
    pub name: String,
    pub points: Vec<Vec3>,
}

pub struct LoadOutcome {
    pub cache: PrototypeCache,
    pub placements: PlacementLists,
    pub markers: Vec<MarkerSet>,
    pub report: LoadReport,
}

struct ChunkFetch {
    coord: ChunkCoord,
    result: Result<Option<ChunkColumn>, ChunkError>,
    elapsed: Duration,
}

fn fetch<R: ChunkReader + ?Sized>(reader: &R, coord: ChunkCoord) -> ChunkFetch {
    let t0 = Instant::now();
    let result = reader.read_chunk(coord);
    ChunkFetch {
        coord,
        result,
        elapsed: t0.elapsed(),
    }
}

/// A fence on a chunk edge whose outward sides wait for the whole grid.
struct EdgeFence {
    world: (i32, i32, i32),
    translation: Vec3,
    id: BlockId,
    aux: u8,
    pending: Vec<(i32, i32, u8)>,
}

struct Walk<'a> {
    ctx: &'a LoadContext,
    catalog: &'a CatalogStore,
    traits: BlockTraits,
    cache: PrototypeCache,
    placements: PlacementLists,
    slimes: Vec<Vec3>,
    edge_fences: Vec<EdgeFence>,
    fence_positions: HashSet<(i32, i32, i32)>,
    report: LoadReport,
}

impl<'a> Walk<'a> {
    fn new(ctx: &'a LoadContext, catalog: &'a CatalogStore, atlas: AtlasLayout) -> Self {
        Self {
            ctx,
            catalog,
            traits: BlockTraits::new(catalog, ctx),
            cache: PrototypeCache::new(atlas),
            placements: PlacementLists::default(),
            slimes: Vec::new(),
            edge_fences: Vec::new(),
            fence_positions: HashSet::new(),
            report: LoadReport::default(),
        }
    }

    fn accept(&mut self, fetched: ChunkFetch) {
        let coord = fetched.coord;
        self.report.chunks_visited += 1;
        self.report.read_times.push(fetched.elapsed);
        if self.ctx.features.slime_markers && is_slime_chunk(self.ctx.seed, coord.cx, coord.cz) {
            let [x, y, z] = scene_block(coord, 8, 8, 8);
            self.slimes
                .push(Vec3::new(x as f32, y as f32, z as f32) + Vec3::new(0.5, 0.5, -0.5));
        }
        match fetched.result {
            Ok(Some(column)) => {
                self.report.chunks_present += 1;
                self.place_chunk(&column);
            }
            Ok(None) => {}
            Err(e) => {
                log::debug!("chunk ({}, {}) unreadable: {}", coord.cx, coord.cz, e);
                self.report.chunks_unreadable.push((coord, e.to_string()));
            }
        }
    }

    fn place_chunk(&mut self, column: &ChunkColumn) {
        let ctx = self.ctx;
        let view = ChunkView {
            column,
            ctx,
            traits: &self.traits,
        };
        let floors = ctx.features.surface_only.then(|| view.surface_floors());
        let coord = column.coord;
        for cell in column.cells() {
            self.report.cells_considered += 1;
            let (x, y, z) = (i32::from(cell.x), i32::from(cell.y), i32::from(cell.z));
            if !ctx.in_range(y) {
                self.report.cells_clipped += 1;
                continue;
            }
            if ctx.is_excluded(cell.id) {
                self.report.cells_excluded += 1;
                continue;
            }
            if let Some(floors) = &floors {
                if y < floors[(z as usize) * CHUNK_SIDE + x as usize] {
                    self.report.cells_buried += 1;
                    continue;
                }
            }
            if ctx.features.hollow && self.traits.is_opaque(cell.id) && view.enclosed(x, y, z) {
                self.report.cells_hollowed += 1;
                continue;
            }
            let [sx, sy, sz] = scene_block(coord, x, y, z);
            let translation = Vec3::new(sx as f32, sy as f32, sz as f32);
            let shape = self.catalog.get(cell.id).map(|d| d.shape);
            match shape {
                Some(ShapeKind::Stair) => {
                    let (p, turns) = self.cache.resolve_stair(self.catalog, cell.id, cell.aux);
                    self.placements.push(p, Placement::rotated(translation, turns));
                }
                Some(ShapeKind::Fence) => {
                    let post = self.cache.resolve(self.catalog, cell.id, cell.aux);
                    self.placements.push(post, Placement::at(translation));
                    let mut pending = Vec::new();
                    for (dx, dz, turns) in FENCE_DIRS {
                        match view.fence_side(x, y, z, dx, dz) {
                            Side::Connect => {
                                let rail = self.cache.resolve_rail(self.catalog, cell.id, cell.aux);
                                self.placements.push(rail, Placement::rotated(translation, turns));
                                self.report.rails_placed += 1;
                            }
                            Side::Outside => pending.push((dx, dz, turns)),
                            Side::Open => {}
                        }
                    }
                    if !pending.is_empty() {
                        let world = (
                            coord.cx * CHUNK_SIDE as i32 + x,
                            y,
                            coord.cz * CHUNK_SIDE as i32 + z,
                        );
                        self.fence_positions.insert(world);
                        self.edge_fences.push(EdgeFence {
                            world,
                            translation,
                            id: cell.id,
                            aux: cell.aux,
                            pending,
                        });
                    }
                }
                _ => {
                    let p = self.cache.resolve(self.catalog, cell.id, cell.aux);
                    self.placements.push(p, Placement::at(translation));
                }
            }
            self.report.cells_placed += 1;
        }
    }

    /// Joins fences that face each other across a chunk boundary.
    fn link_edge_fences(&mut self) {
        let edges = std::mem::take(&mut self.edge_fences);
        for fence in &edges {
            let (wx, wy, wz) = fence.world;
            for &(dx, dz, turns) in &fence.pending {
                if self.fence_positions.contains(&(wx + dx, wy, wz + dz)) {
                    let rail = self.cache.resolve_rail(self.catalog, fence.id, fence.aux);
                    self.placements
                        .push(rail, Placement::rotated(fence.translation, turns));
                    self.report.rails_placed += 1;
                }
            }
        }
    }

    fn finish(mut self, started: Instant) -> LoadOutcome {
        let mut markers = Vec::new();
        if self.ctx.features.slime_markers {
            self.report.slime_chunks = self.slimes.len();
            markers.push(MarkerSet {
                name: SLIME_MARKERS.to_string(),
                points: std::mem::take(&mut self.slimes),
            });
        }
        if let Some(pos) = self.ctx.player {
            markers.push(MarkerSet {
                name: PLAYER_MARKER.to_string(),
                points: vec![scene_point(pos)],
            });
        }
        let (hits, built) = self.cache.stats();
        log::debug!("prototype cache: {hits} hits, {built} misses");
        self.report.prototypes = self.cache.len();
        self.report.unknown_ids = self.cache.unknown_ids().clone();
        self.report.malformed = self.cache.malformed().clone();
        self.report.build_time = started.elapsed();
        LoadOutcome {
            cache: self.cache,
            placements: self.placements,
            markers,
            report: self.report,
        }
    }
}

/// Walks the `(2R)²` chunk grid around the context's center and buffers
/// one placement per visible cell.
pub fn load<R: ChunkReader + ?Sized>(
    ctx: &LoadContext,
    catalog: &CatalogStore,
    reader: &R,
    atlas: AtlasLayout,
) -> Result<LoadOutcome, LoadError> {
    let started = Instant::now();
    let c = ctx.center_chunk();
    log::info!(
        "loading {} chunks around chunk ({}, {}) in the {}",
        (2 * ctx.radius) * (2 * ctx.radius),
        c.cx,
        c.cz,
        ctx.dimension
    );
    let mut walk = Walk::new(ctx, catalog, atlas);
    if ctx.jobs > 1 {
        walk_parallel(ctx, reader, &mut walk)?;
    } else {
        for coord in ctx.grid() {
            walk.accept(fetch(reader, coord));
        }
    }
    walk.link_edge_fences();
    Ok(walk.finish(started))
}

/// Decodes one grid row at a time on a worker pool while this thread
/// resolves the previous row. Rows arrive in walk order, so the output
/// matches the sequential walk exactly.
fn walk_parallel<R: ChunkReader + ?Sized>(
    ctx: &LoadContext,
    reader: &R,
    walk: &mut Walk<'_>,
) -> Result<(), LoadError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(ctx.jobs)
        .thread_name(|i| format!("quarry-read-{i}"))
        .build()
        .map_err(|e| LoadError::Workers(e.to_string()))?;
    let rows = ctx.grid_rows();
    let (tx, rx) = bounded::<Vec<ChunkFetch>>(ROWS_IN_FLIGHT);
    std::thread::scope(|s| {
        s.spawn(move || {
            for row in rows {
                let fetched: Vec<ChunkFetch> =
                    pool.install(|| row.par_iter().map(|&c| fetch(reader, c)).collect());
                if tx.send(fetched).is_err() {
                    break;
                }
            }
        });
        for row in rx {
            for fetched in row {
                walk.accept(fetched);
            }
        }
    });
    Ok(())
}
