//! Grid-backed level geometry
//!
//! A level is a `cols × rows` grid of equally sized cells. Solid cells block
//! movement; trigger cells are passable and get consumed on contact.

use serde::{Deserialize, Serialize};

use super::{EntityId, LevelBlock, LevelError, LevelGeometry};
use crate::sim::Aabb;

/// Boxes are shrunk by this much before picking the cells they span, so a
/// box resting exactly on a cell edge does not count as overlapping it.
const EDGE_INSET: f64 = 1e-6;

/// Contents of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Solid,
    /// Passable trigger carrying a non-zero kind
    Trigger(u16),
}

impl Tile {
    /// Signed cell code: 0 empty, 1 solid, `-kind` for triggers
    pub fn code(self) -> i32 {
        match self {
            Tile::Empty => 0,
            Tile::Solid => 1,
            Tile::Trigger(kind) => -i32::from(kind),
        }
    }

    fn is_solid(self) -> bool {
        self == Tile::Solid
    }
}

/// Mutable grid used to assemble a [`TileLevel`]
#[derive(Debug, Clone)]
pub struct TileLevelBuilder {
    cols: usize,
    rows: usize,
    cell_width: f64,
    cell_height: f64,
    tiles: Vec<Tile>,
}

impl TileLevelBuilder {
    pub fn new(
        cols: usize,
        rows: usize,
        cell_width: f64,
        cell_height: f64,
    ) -> Result<Self, LevelError> {
        if cols == 0 || rows == 0 {
            return Err(LevelError::EmptyGrid { cols, rows });
        }
        if !(cell_width > 0.0 && cell_height > 0.0) {
            return Err(LevelError::InvalidCellSize {
                width: cell_width,
                height: cell_height,
            });
        }
        Ok(Self {
            cols,
            rows,
            cell_width,
            cell_height,
            tiles: vec![Tile::Empty; cols * rows],
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Set a single cell
    pub fn set(&mut self, col: usize, row: usize, tile: Tile) -> Result<&mut Self, LevelError> {
        if col >= self.cols || row >= self.rows {
            return Err(LevelError::OutOfRange {
                col,
                row,
                cols: self.cols,
                rows: self.rows,
            });
        }
        if tile == Tile::Trigger(0) {
            return Err(LevelError::ZeroTriggerKind);
        }
        self.tiles[row * self.cols + col] = tile;
        Ok(self)
    }

    /// Fill columns `cols` of one row
    pub fn fill_row(
        &mut self,
        row: usize,
        cols: std::ops::Range<usize>,
        tile: Tile,
    ) -> Result<&mut Self, LevelError> {
        for col in cols {
            self.set(col, row, tile)?;
        }
        Ok(self)
    }

    /// Freeze the grid and enumerate its blocks
    pub fn build(self) -> TileLevel {
        let mut blocks = Vec::new();
        let mut block_index = vec![None; self.tiles.len()];

        // Row-major: top to bottom, left to right
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = row * self.cols + col;
                let tile = self.tiles[cell];
                if tile == Tile::Empty {
                    continue;
                }
                block_index[cell] = Some(EntityId(blocks.len() as u32));
                blocks.push(LevelBlock {
                    rect: Aabb::new(
                        col as f64 * self.cell_width,
                        row as f64 * self.cell_height,
                        self.cell_width,
                        self.cell_height,
                    ),
                    trigger: matches!(tile, Tile::Trigger(_)),
                });
            }
        }

        TileLevel {
            cols: self.cols,
            rows: self.rows,
            cell_width: self.cell_width,
            cell_height: self.cell_height,
            tiles: self.tiles,
            blocks,
            block_index,
        }
    }
}

/// Immutable grid level
#[derive(Debug, Clone)]
pub struct TileLevel {
    cols: usize,
    rows: usize,
    cell_width: f64,
    cell_height: f64,
    tiles: Vec<Tile>,
    blocks: Vec<LevelBlock>,
    /// Cell index -> block id
    block_index: Vec<Option<EntityId>>,
}

impl TileLevel {
    pub fn builder(
        cols: usize,
        rows: usize,
        cell_width: f64,
        cell_height: f64,
    ) -> Result<TileLevelBuilder, LevelError> {
        TileLevelBuilder::new(cols, rows, cell_width, cell_height)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> (f64, f64) {
        (self.cell_width, self.cell_height)
    }

    pub fn tile(&self, col: usize, row: usize) -> Option<Tile> {
        if col < self.cols && row < self.rows {
            Some(self.tiles[row * self.cols + col])
        } else {
            None
        }
    }

    fn solid(&self, col: usize, row: usize) -> bool {
        self.tiles[row * self.cols + col].is_solid()
    }

    /// Cell containing a world point, if inside the grid
    fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = ((x + EDGE_INSET) / self.cell_width).floor();
        let row = ((y + EDGE_INSET) / self.cell_height).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f64 || row >= self.rows as f64 {
            return None;
        }
        Some((col as usize, row as usize))
    }

    /// Inclusive range of cells covering `[lo, hi]` along one axis
    fn span(lo: f64, hi: f64, cell: f64, count: usize) -> Option<(usize, usize)> {
        let first = ((lo + EDGE_INSET) / cell).floor();
        let last = ((hi - EDGE_INSET) / cell).floor();
        let max = (count - 1) as f64;
        if last < 0.0 || first > max || last < first {
            return None;
        }
        Some((first.max(0.0) as usize, last.min(max) as usize))
    }

    fn col_span(&self, bbox: &Aabb) -> Option<(usize, usize)> {
        Self::span(bbox.left(), bbox.right(), self.cell_width, self.cols)
    }

    fn row_span(&self, bbox: &Aabb) -> Option<(usize, usize)> {
        Self::span(bbox.top(), bbox.bottom(), self.cell_height, self.rows)
    }

    /// First cell index whose near edge is at or past `pos`
    fn first_at_or_after(pos: f64, cell: f64) -> usize {
        (pos / cell).ceil().max(0.0) as usize
    }

    /// Number of cells whose far edge is at or before `pos`
    fn count_before(pos: f64, cell: f64, count: usize) -> usize {
        ((pos / cell).floor().max(0.0) as usize).min(count)
    }
}

impl LevelGeometry for TileLevel {
    fn world_width(&self) -> f64 {
        self.cols as f64 * self.cell_width
    }

    fn world_height(&self) -> f64 {
        self.rows as f64 * self.cell_height
    }

    fn lower_bound(&self, bbox: &Aabb) -> f64 {
        let floor = self.world_height();
        let Some((c0, c1)) = self.col_span(bbox) else {
            return floor;
        };
        let start = Self::first_at_or_after(bbox.center().y, self.cell_height);

        let mut bound = floor;
        for col in c0..=c1 {
            if let Some(row) = (start..self.rows).find(|&row| self.solid(col, row)) {
                bound = bound.min(row as f64 * self.cell_height);
            }
        }
        bound
    }

    fn upper_bound(&self, bbox: &Aabb) -> f64 {
        let Some((c0, c1)) = self.col_span(bbox) else {
            return 0.0;
        };
        let end = Self::count_before(bbox.center().y, self.cell_height, self.rows);

        let mut bound: f64 = 0.0;
        for col in c0..=c1 {
            if let Some(row) = (0..end).rev().find(|&row| self.solid(col, row)) {
                bound = bound.max((row + 1) as f64 * self.cell_height);
            }
        }
        bound
    }

    fn left_bound(&self, bbox: &Aabb) -> f64 {
        let Some((r0, r1)) = self.row_span(bbox) else {
            return 0.0;
        };
        let end = Self::count_before(bbox.center().x, self.cell_width, self.cols);

        let mut bound: f64 = 0.0;
        for row in r0..=r1 {
            if let Some(col) = (0..end).rev().find(|&col| self.solid(col, row)) {
                bound = bound.max((col + 1) as f64 * self.cell_width);
            }
        }
        bound
    }

    fn right_bound(&self, bbox: &Aabb) -> f64 {
        let wall = self.world_width();
        let Some((r0, r1)) = self.row_span(bbox) else {
            return wall;
        };
        let start = Self::first_at_or_after(bbox.center().x, self.cell_width);

        let mut bound = wall;
        for row in r0..=r1 {
            if let Some(col) = (start..self.cols).find(|&col| self.solid(col, row)) {
                bound = bound.min(col as f64 * self.cell_width);
            }
        }
        bound
    }

    fn blocks(&self) -> &[LevelBlock] {
        &self.blocks
    }

    fn entity_at(&self, x: f64, y: f64) -> Option<EntityId> {
        let (col, row) = self.cell_at(x, y)?;
        self.block_index[row * self.cols + col]
    }

    fn position_index(&self, x: f64, y: f64) -> i32 {
        self.cell_at(x, y)
            .map(|(col, row)| self.tiles[row * self.cols + col].code())
            .unwrap_or(0)
    }
}
