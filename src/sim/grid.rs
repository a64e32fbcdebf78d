//! Block grid: cell ownership and column clearing
//!
//! Row 0 is the far row. Clearing walks from the hit row toward the
//! highest row index (the rows closest to the launcher).

use serde::{Deserialize, Serialize};

use super::block::{BlockId, BlockType};

/// A rows x columns mapping from cell to the block occupying it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Option<BlockId>>,
}

impl Grid {
    /// Allocate an empty grid
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![None; rows * columns],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.columns,
            "grid access ({row}, {col}) out of bounds for {}x{} grid",
            self.rows,
            self.columns
        );
        row * self.columns + col
    }

    pub fn get(&self, row: usize, col: usize) -> Option<BlockId> {
        self.cells[self.index(row, col)]
    }

    pub fn place(&mut self, row: usize, col: usize, block: BlockId) {
        let i = self.index(row, col);
        self.cells[i] = Some(block);
    }

    /// Empty every occupied cell from `from_row` to the last row in `col`.
    ///
    /// Returns the evicted blocks in row order. Empty cells are skipped.
    pub fn clear_column(&mut self, from_row: usize, col: usize) -> Vec<BlockId> {
        let mut evicted = Vec::new();
        for row in from_row..self.rows {
            let i = self.index(row, col);
            if let Some(block) = self.cells[i].take() {
                evicted.push(block);
            }
        }
        evicted
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Occupied cells as (row, col, block) in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, BlockId)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|block| (i / self.columns, i % self.columns, block))
        })
    }
}

/// Block type for a cell of the starting layout.
///
/// The top `rows / 2` rows are Blue. Below that the left `cols / 2`
/// columns are Green and the rest Cyan.
pub fn layout_type(rows: usize, columns: usize, row: usize, col: usize) -> BlockType {
    let blue_rows = rows / 2;
    let green_columns = columns / 2;

    if row < blue_rows {
        BlockType::Blue
    } else if col < green_columns {
        BlockType::Green
    } else {
        BlockType::Cyan
    }
}

/// Full starting layout, indexed `[row][col]`
pub fn generate_layout(rows: usize, columns: usize) -> Vec<Vec<BlockType>> {
    (0..rows)
        .map(|row| {
            (0..columns)
                .map(|col| layout_type(rows, columns, row, col))
                .collect()
        })
        .collect()
}
