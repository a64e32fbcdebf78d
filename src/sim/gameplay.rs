//! Gameplay orchestration: owns the grid and every block
//!
//! Clearing a block drops it and everything below it in its column.
//! Cleared blocks lose collision and slide off toward -Z until they pass
//! the removal depth, then they are destroyed.

use std::collections::BTreeMap;

use glam::Vec3;

use super::block::{Block, BlockId, BlockLookup, BlockType};
use super::grid::{Grid, layout_type};
use super::scene::{ColliderId, Layers, Scene, Transform};
use crate::settings::{GameplaySettings, GridSettings};

pub struct Gameplay {
    grid: Grid,
    blocks: BTreeMap<BlockId, Block>,
    by_collider: BTreeMap<ColliderId, BlockId>,
    /// Evicted blocks still animating, in eviction order
    cleared: Vec<BlockId>,
    settings: GameplaySettings,
    next_block_id: u32,
}

impl Gameplay {
    pub fn new(settings: GameplaySettings) -> Self {
        Self {
            grid: Grid::new(0, 0),
            blocks: BTreeMap::new(),
            by_collider: BTreeMap::new(),
            cleared: Vec::new(),
            settings,
            next_block_id: 1,
        }
    }

    /// Allocate an empty rows x columns grid
    pub fn init_grid(&mut self, rows: usize, columns: usize) {
        self.grid = Grid::new(rows, columns);
    }

    /// Build the starting board: one block per cell, typed by the layout rule
    pub fn generate(&mut self, layout: &GridSettings, scene: &mut Scene) {
        self.init_grid(layout.rows, layout.columns);

        for row in 0..layout.rows {
            for col in 0..layout.columns {
                let transform = Transform {
                    position: layout.cell_position(row, col),
                    scale: Vec3::splat(layout.block_size),
                    ..Default::default()
                };
                let collider = scene.spawn(transform, Layers::BLOCK);
                let id = BlockId(self.next_block_id);
                self.next_block_id += 1;

                let mut block = Block::new(id, collider);
                block.set(layout_type(layout.rows, layout.columns, row, col), row, col);
                self.blocks.insert(id, block);
                self.by_collider.insert(collider, id);
                self.grid.place(row, col, id);
            }
        }

        log::info!(
            "Generated {}x{} grid ({} blocks)",
            layout.rows,
            layout.columns,
            self.blocks.len()
        );
    }

    /// Clear a block and everything below it in its column.
    ///
    /// Returns the number of blocks evicted. Inactive or unknown blocks are a no-op.
    pub fn clear_block(&mut self, id: BlockId, scene: &mut Scene) -> usize {
        let Some(cell) = self.blocks.get(&id).and_then(Block::cell) else {
            return 0;
        };

        let evicted = self.grid.clear_column(cell.row, cell.col);
        for block_id in &evicted {
            if let Some(block) = self.blocks.get_mut(block_id) {
                block.reset();
                scene.set_enabled(block.collider, false);
            }
            self.cleared.push(*block_id);
        }

        log::info!(
            "Cleared column {} from row {}: {} blocks",
            cell.col,
            cell.row,
            evicted.len()
        );
        evicted.len()
    }

    /// Slide cleared blocks away and destroy those past the removal depth.
    ///
    /// Returns the destroyed blocks in the order they were cleared.
    pub fn tick(&mut self, scene: &mut Scene, dt: f32) -> Vec<BlockId> {
        let step = Vec3::NEG_Z * self.settings.cleared_block_move_speed * dt;
        let removal_z = self.settings.removal_z;

        let mut removed = Vec::new();
        let blocks = &mut self.blocks;
        let by_collider = &mut self.by_collider;
        self.cleared.retain(|id| {
            let Some(block) = blocks.get(id) else {
                return false;
            };
            let collider = block.collider;
            let Some(transform) = scene.transform_mut(collider) else {
                return false;
            };
            transform.translate(step);
            if transform.position.z >= removal_z {
                return true;
            }

            scene.destroy(collider);
            by_collider.remove(&collider);
            blocks.remove(id);
            removed.push(*id);
            false
        });

        for id in &removed {
            log::debug!("Block {:?} left the play area", id);
        }
        removed
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Blocks still animating off-stage
    #[inline]
    pub fn cleared(&self) -> &[BlockId] {
        &self.cleared
    }

    /// Blocks alive in memory (grid plus cleared)
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Block types of the live grid, indexed `[row][col]`
    pub fn grid_types(&self) -> Vec<Vec<BlockType>> {
        let mut types = vec![vec![BlockType::None; self.grid.columns()]; self.grid.rows()];
        for (row, col, id) in self.grid.iter() {
            if let Some(block) = self.blocks.get(&id) {
                types[row][col] = block.block_type();
            }
        }
        types
    }
}

impl BlockLookup for Gameplay {
    fn block_for(&self, collider: ColliderId) -> Option<&Block> {
        self.by_collider
            .get(&collider)
            .and_then(|id| self.blocks.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::generate_layout;

    fn board(rows: usize, columns: usize) -> (Gameplay, Scene) {
        let mut scene = Scene::new();
        let mut gameplay = Gameplay::new(GameplaySettings::default());
        let layout = GridSettings {
            rows,
            columns,
            ..Default::default()
        };
        gameplay.generate(&layout, &mut scene);
        (gameplay, scene)
    }

    #[test]
    fn test_generate_matches_layout_and_coordinates() {
        let (gameplay, scene) = board(4, 4);
        assert_eq!(gameplay.grid_types(), generate_layout(4, 4));
        assert_eq!(scene.len(), 16);

        for (row, col, id) in gameplay.grid().iter() {
            let block = gameplay.block(id).unwrap();
            assert_eq!(block.row(), row as i32);
            assert_eq!(block.col(), col as i32);
            assert_eq!(gameplay.block_for(block.collider).unwrap().id, id);
        }
    }

    #[test]
    fn test_clear_block_drops_column_below() {
        let (mut gameplay, mut scene) = board(4, 4);
        let hit = gameplay.grid().get(1, 2).unwrap();
        let expected: Vec<_> = (1..4).map(|row| gameplay.grid().get(row, 2).unwrap()).collect();

        assert_eq!(gameplay.clear_block(hit, &mut scene), 3);

        assert!(gameplay.grid().get(0, 2).is_some());
        for row in 1..4 {
            assert!(gameplay.grid().get(row, 2).is_none());
        }
        for col in [0, 1, 3] {
            for row in 0..4 {
                assert!(gameplay.grid().get(row, col).is_some());
            }
        }
        assert_eq!(gameplay.cleared(), expected.as_slice());

        for id in &expected {
            let block = gameplay.block(*id).unwrap();
            assert_eq!(block.block_type(), BlockType::None);
            assert_eq!((block.row(), block.col()), (-1, -1));
            assert!(!scene.get(block.collider).unwrap().enabled);
        }
    }

    #[test]
    fn test_clearing_inactive_block_is_noop() {
        let (mut gameplay, mut scene) = board(4, 4);
        let hit = gameplay.grid().get(3, 0).unwrap();
        assert_eq!(gameplay.clear_block(hit, &mut scene), 1);
        assert_eq!(gameplay.clear_block(hit, &mut scene), 0);
        assert_eq!(gameplay.clear_block(BlockId(9999), &mut scene), 0);
        assert_eq!(gameplay.cleared().len(), 1);
    }

    #[test]
    fn test_cleared_blocks_removed_once_past_threshold() {
        let (mut gameplay, mut scene) = board(4, 4);
        let hit = gameplay.grid().get(0, 1).unwrap();
        gameplay.clear_block(hit, &mut scene);
        let cleared: Vec<_> = gameplay.cleared().to_vec();
        assert_eq!(cleared.len(), 4);

        // Rows sit at z = 20, 17.9, 15.8, 13.7; speed 20/s
        let mut removed_all = Vec::new();
        let mut ticks = 0;
        while !gameplay.cleared().is_empty() {
            for id in gameplay.cleared() {
                let block = gameplay.block(*id).unwrap();
                let z = scene.transform(block.collider).unwrap().position.z;
                assert!(z >= -100.0, "block {:?} lingered at z={}", id, z);
            }
            removed_all.extend(gameplay.tick(&mut scene, 0.1));
            ticks += 1;
            assert!(ticks < 1000);
        }

        // Nearest rows cross first; every block removed exactly once
        let mut expected = cleared.clone();
        expected.reverse();
        assert_eq!(removed_all, expected);
        assert_eq!(gameplay.block_count(), 12);
        assert_eq!(scene.len(), 12);
        for id in &cleared {
            assert!(gameplay.block(*id).is_none());
        }
    }

    #[test]
    fn test_adjacent_removals_in_one_tick() {
        let (mut gameplay, mut scene) = board(4, 4);
        let a = gameplay.grid().get(0, 0).unwrap();
        let b = gameplay.grid().get(0, 3).unwrap();
        gameplay.clear_block(a, &mut scene);
        gameplay.clear_block(b, &mut scene);
        assert_eq!(gameplay.cleared().len(), 8);

        // One huge step pushes every block past the threshold at once
        let removed = gameplay.tick(&mut scene, 100.0);
        assert_eq!(removed.len(), 8);
        assert!(gameplay.cleared().is_empty());
        assert_eq!(scene.len(), 8);
    }
}
