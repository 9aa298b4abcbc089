//! Seeded tower generation
//!
//! Builds a climbable tower: a full floor, then ledges every four rows that
//! alternate between the left and right walls, up to a summit ledge just
//! below the level top. Some ledges carry a
//! trigger tile. The same seed always yields the same tower.

use std::ops::Range;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{LevelError, Tile, TileLevel};
use crate::consts::{PLATFORM_BLOCK_HEIGHT, PLATFORM_BLOCK_WIDTH};
use crate::settings::Settings;

/// Rows between consecutive ledges
pub const LEDGE_SPACING: usize = 4;
/// Row of the summit ledge (counted from the top)
pub const SUMMIT_ROW: usize = 2;
/// Number of distinct trigger kinds handed out
pub const TRIGGER_KINDS: u16 = 4;

/// A horizontal run of solid tiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledge {
    pub row: usize,
    pub cols: Range<usize>,
}

/// A generated level plus the layout the generator chose
#[derive(Debug, Clone)]
pub struct Tower {
    pub seed: u64,
    pub level: TileLevel,
    /// Ledges from the bottom up; the last one is the summit
    pub ledges: Vec<Ledge>,
}

/// Generate a tower of at least `floors` ledges that fills the viewport
pub fn generate_tower(seed: u64, floors: usize, settings: &Settings) -> Result<Tower, LevelError> {
    let mut rng = Pcg32::seed_from_u64(seed);

    let cols = ((settings.viewport_width / PLATFORM_BLOCK_WIDTH).floor() as usize).max(8);
    let min_rows = (settings.viewport_height / PLATFORM_BLOCK_HEIGHT).ceil() as usize;
    let min_floors = min_rows.saturating_sub(SUMMIT_ROW + 1).div_ceil(LEDGE_SPACING);
    let floors = floors.max(min_floors).max(1);
    let rows = floors * LEDGE_SPACING + SUMMIT_ROW + 1;

    let mut builder = TileLevel::builder(cols, rows, PLATFORM_BLOCK_WIDTH, PLATFORM_BLOCK_HEIGHT)?;
    builder.fill_row(rows - 1, 0..cols, Tile::Solid)?;

    let mut ledges = Vec::with_capacity(floors);
    for floor in 1..=floors {
        let row = rows - 1 - floor * LEDGE_SPACING;
        // Over half the width so each ledge overlaps the one below it, at
        // most two thirds so there is room to stand beside the next one
        let len = rng.random_range(cols / 2 + 1..=cols * 2 / 3);
        let shift = rng.random_range(0..=1).min(cols - len);
        let start = if floor % 2 == 0 {
            shift
        } else {
            cols - len - shift
        };
        let span = start..start + len;
        builder.fill_row(row, span.clone(), Tile::Solid)?;

        // Summit stays clear so the top of the level is open
        if floor < floors && rng.random_bool(0.4) {
            let col = rng.random_range(span.clone());
            let kind = rng.random_range(1..=TRIGGER_KINDS);
            builder.set(col, row - 1, Tile::Trigger(kind))?;
        }

        ledges.push(Ledge { row, cols: span });
    }

    log::info!(
        "Generated tower seed={} cols={} rows={} ledges={}",
        seed,
        cols,
        rows,
        ledges.len()
    );

    Ok(Tower {
        seed,
        level: builder.build(),
        ledges,
    })
}
