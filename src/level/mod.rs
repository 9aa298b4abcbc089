//! Level geometry
//!
//! The simulation treats a level as a read-only oracle: it asks for the
//! nearest obstacle around a box and enumerates the level's blocks. All
//! coordinates here are world space (y grows downward, 0 is the level top).

pub mod generate;
pub mod tiles;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Aabb;

pub use generate::{Ledge, Tower, generate_tower};
pub use tiles::{Tile, TileLevel, TileLevelBuilder};

/// Stable index of a block within its level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A static level object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelBlock {
    /// World-space rectangle
    pub rect: Aabb,
    /// Trigger blocks are consumed on contact instead of blocking movement
    pub trigger: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("level grid must have at least one column and one row (got {cols}x{rows})")]
    EmptyGrid { cols: usize, rows: usize },
    #[error("cell size must be positive (got {width}x{height})")]
    InvalidCellSize { width: f64, height: f64 },
    #[error("tile ({col}, {row}) is outside the {cols}x{rows} grid")]
    OutOfRange {
        col: usize,
        row: usize,
        cols: usize,
        rows: usize,
    },
    #[error("trigger kind must be non-zero")]
    ZeroTriggerKind,
    #[error("level is {level_height} tall but the viewport is {viewport_height}")]
    ShorterThanViewport {
        level_height: f64,
        viewport_height: f64,
    },
}

/// Read-only geometry queries the simulation needs from a level
pub trait LevelGeometry {
    /// Total width of the level
    fn world_width(&self) -> f64;

    /// Total height of the level
    fn world_height(&self) -> f64;

    /// Top of the nearest surface below the box (world height if none)
    fn lower_bound(&self, bbox: &Aabb) -> f64;

    /// Bottom of the nearest obstacle above the box (0 if none)
    fn upper_bound(&self, bbox: &Aabb) -> f64;

    /// Right edge of the nearest obstacle left of the box (0 if none)
    fn left_bound(&self, bbox: &Aabb) -> f64;

    /// Left edge of the nearest obstacle right of the box (world width if none)
    fn right_bound(&self, bbox: &Aabb) -> f64;

    /// Every block, in a stable order; `EntityId(i)` refers to `blocks()[i]`
    fn blocks(&self) -> &[LevelBlock];

    /// Block containing a world point
    fn entity_at(&self, x: f64, y: f64) -> Option<EntityId>;

    /// Signed code for the level cell at a world point
    ///
    /// Trigger handlers receive the negation of this value.
    fn position_index(&self, x: f64, y: f64) -> i32;

    /// Trigger blocks, in enumeration order
    fn trigger_ids(&self) -> Vec<EntityId> {
        self.blocks()
            .iter()
            .enumerate()
            .filter(|(_, block)| block.trigger)
            .map(|(i, _)| EntityId(i as u32))
            .collect()
    }
}

/// Check that a level can be shown in a viewport of the given height
pub fn validate_for_viewport<L: LevelGeometry + ?Sized>(
    level: &L,
    viewport_height: f64,
) -> Result<(), LevelError> {
    if level.world_height() < viewport_height {
        return Err(LevelError::ShorterThanViewport {
            level_height: level.world_height(),
            viewport_height,
        });
    }
    Ok(())
}
