//! Block entities and their colors

use serde::{Deserialize, Serialize};

use super::scene::ColliderId;

/// Block types; `None` marks an empty/inactive block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockType {
    #[default]
    None,
    Green,
    Blue,
    Cyan,
}

impl BlockType {
    /// Display color used for the block and the trajectory preview
    pub fn color(self) -> Color {
        match self {
            BlockType::Green => Color::GREEN,
            BlockType::Blue => Color::BLUE,
            BlockType::Cyan => Color::CYAN,
            BlockType::None => Color::WHITE,
        }
    }
}

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);
    pub const GREEN: Color = Color([0.0, 1.0, 0.0, 1.0]);
    pub const BLUE: Color = Color([0.0, 0.0, 1.0, 1.0]);
    pub const CYAN: Color = Color([0.0, 1.0, 1.0, 1.0]);
}

/// Stable block identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Grid coordinates of a live block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

/// A block entity. Its transform lives on the scene collider it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub collider: ColliderId,
    block_type: BlockType,
    cell: Option<GridCell>,
}

impl Block {
    pub fn new(id: BlockId, collider: ColliderId) -> Self {
        Self {
            id,
            collider,
            block_type: BlockType::None,
            cell: None,
        }
    }

    /// Place the block in the grid with a type
    pub fn set(&mut self, block_type: BlockType, row: usize, col: usize) {
        self.block_type = block_type;
        self.cell = Some(GridCell { row, col });
    }

    /// Return the block to the inactive state. The caller disables its collider.
    pub fn reset(&mut self) {
        self.block_type = BlockType::None;
        self.cell = None;
    }

    #[inline]
    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    #[inline]
    pub fn cell(&self) -> Option<GridCell> {
        self.cell
    }

    /// Row index, -1 when inactive
    pub fn row(&self) -> i32 {
        self.cell.map_or(-1, |c| c.row as i32)
    }

    /// Column index, -1 when inactive
    pub fn col(&self) -> i32 {
        self.cell.map_or(-1, |c| c.col as i32)
    }

    pub fn is_active(&self) -> bool {
        self.block_type != BlockType::None
    }

    pub fn color(&self) -> Color {
        self.block_type.color()
    }
}

/// Typed "does this collider carry a block" query, keyed by collider identity
pub trait BlockLookup {
    fn block_for(&self, collider: ColliderId) -> Option<&Block>;
}
