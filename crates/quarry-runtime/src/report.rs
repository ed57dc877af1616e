use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use quarry_blocks::types::BlockId;
use quarry_chunk::ChunkCoord;

/// Counters and substitutions gathered over one load, reported once.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    pub chunks_visited: usize,
    pub chunks_present: usize,
    pub chunks_unreadable: Vec<(ChunkCoord, String)>,
    pub cells_considered: u64,
    pub cells_placed: u64,
    pub cells_hollowed: u64,
    /// Dropped below the surface in surface-only mode.
    pub cells_buried: u64,
    pub cells_excluded: u64,
    pub cells_clipped: u64,
    pub rails_placed: u64,
    pub slime_chunks: usize,
    pub read_times: Vec<Duration>,
    pub build_time: Duration,
    pub prototypes: usize,
    pub unknown_ids: BTreeSet<BlockId>,
    pub malformed: BTreeMap<BlockId, String>,
    pub atlas_placeholder: bool,
}

impl LoadReport {
    pub fn total_read_time(&self) -> Duration {
        self.read_times.iter().sum()
    }

    pub fn mean_read_time(&self) -> Option<Duration> {
        let n = u32::try_from(self.read_times.len()).ok().filter(|n| *n > 0)?;
        Some(self.total_read_time() / n)
    }

    /// Share of in-range cells that culling kept out of the scene.
    pub fn hollowed_percent(&self) -> f64 {
        let eligible = self.cells_placed + self.cells_hollowed + self.cells_buried;
        if eligible == 0 {
            return 0.0;
        }
        (self.cells_hollowed + self.cells_buried) as f64 * 100.0 / eligible as f64
    }

    pub fn log_summary(&self) {
        log::info!(
            "chunks: {} visited, {} present, {} unreadable",
            self.chunks_visited,
            self.chunks_present,
            self.chunks_unreadable.len()
        );
        log::info!(
            "cells: {} considered, {} placed, {} hollowed, {} buried, {} excluded, {} clipped",
            self.cells_considered,
            self.cells_placed,
            self.cells_hollowed,
            self.cells_buried,
            self.cells_excluded,
            self.cells_clipped
        );
        if self.cells_placed > 0 {
            log::info!("hollowing made the scene {:.0}% lighter", self.hollowed_percent());
        }
        if let Some(mean) = self.mean_read_time() {
            log::info!(
                "chunk reads: {:.2}s total, {:.2}ms mean",
                self.total_read_time().as_secs_f64(),
                mean.as_secs_f64() * 1000.0
            );
        }
        log::info!(
            "{} prototypes, {} fence rails, built in {:.2}s",
            self.prototypes,
            self.rails_placed,
            self.build_time.as_secs_f64()
        );
        if self.slime_chunks > 0 {
            log::info!("{} slime chunks marked", self.slime_chunks);
        }
        if !self.unknown_ids.is_empty() {
            let ids: Vec<String> = self.unknown_ids.iter().map(|i| i.to_string()).collect();
            log::warn!("unknown block ids: {}", ids.join(" "));
        }
        for (id, reason) in &self.malformed {
            log::warn!("block {id} drawn as placeholder: {reason}");
        }
        if !self.chunks_unreadable.is_empty() {
            let first = &self.chunks_unreadable[0];
            log::warn!(
                "{} chunks skipped as unreadable, first ({}, {}): {}",
                self.chunks_unreadable.len(),
                first.0.cx,
                first.0.cz,
                first.1
            );
        }
        if self.atlas_placeholder {
            log::warn!("texture atlas missing, geometry is untextured");
        }
    }
}
