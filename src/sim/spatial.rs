//! Uniform grid over the arena for pursuer proximity queries
//!
//! Rebuilt from scratch every tick before projectile resolution. Each entity
//! is bucketed by its center; queries return a conservative superset that
//! callers still have to run exact overlap tests against.

use super::geometry::Aabb;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, GRID_CELL_SIZE};

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cols: i32,
    rows: i32,
    /// Entity indices per cell, row-major
    cells: Vec<Vec<usize>>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(ARENA_WIDTH, ARENA_HEIGHT, GRID_CELL_SIZE)
    }
}

impl SpatialGrid {
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let cols = (width / cell_size).ceil().max(1.0) as i32;
        let rows = (height / cell_size).ceil().max(1.0) as i32;
        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); (cols * rows) as usize],
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Clear and re-bucket. Entities are identified by their position in `boxes`.
    pub fn rebuild<'a>(&mut self, boxes: impl IntoIterator<Item = &'a Aabb>) {
        self.clear();
        for (index, aabb) in boxes.into_iter().enumerate() {
            self.insert(index, aabb);
        }
    }

    /// Bucket one entity by its center. Centers outside the arena (or
    /// non-finite) are not indexed.
    pub fn insert(&mut self, index: usize, aabb: &Aabb) {
        let col = (aabb.center.x / self.cell_size).floor();
        let row = (aabb.center.y / self.cell_size).floor();
        if !col.is_finite() || !row.is_finite() {
            return;
        }
        let (col, row) = (col as i32, row as i32);
        if col < 0 || col >= self.cols || row < 0 || row >= self.rows {
            return;
        }
        self.cells[(row * self.cols + col) as usize].push(index);
    }

    fn col_of(&self, x: f32) -> i32 {
        ((x / self.cell_size).floor() as i32).clamp(0, self.cols - 1)
    }

    fn row_of(&self, y: f32) -> i32 {
        ((y / self.cell_size).floor() as i32).clamp(0, self.rows - 1)
    }

    /// Indices of every entity bucketed in the cells under `area`, padded by
    /// one cell in each direction. Sorted ascending.
    pub fn query(&self, area: &Aabb) -> Vec<usize> {
        let mut out = Vec::new();
        self.query_into(area, &mut out);
        out
    }

    /// Like [`query`](Self::query) but reuses the caller's buffer
    pub fn query_into(&self, area: &Aabb, out: &mut Vec<usize>) {
        out.clear();
        let min = area.min();
        let max = area.max();
        if !min.is_finite() || !max.is_finite() {
            return;
        }

        let start_col = (self.col_of(min.x) - 1).max(0);
        let end_col = (self.col_of(max.x) + 1).min(self.cols - 1);
        let start_row = (self.row_of(min.y) - 1).max(0);
        let end_row = (self.row_of(max.y) + 1).min(self.rows - 1);

        for row in start_row..=end_row {
            for col in start_col..=end_col {
                out.extend_from_slice(&self.cells[(row * self.cols + col) as usize]);
            }
        }
        out.sort_unstable();
    }

    /// Number of indexed entities
    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }
}
