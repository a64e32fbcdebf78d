//! Game state: the single board and everything wired to it
//!
//! One `GameState` is built by the entry point and owns the scene, the
//! gameplay orchestrator, the launcher, the live bullets and the preview.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::block::{BlockId, BlockType};
use super::bullet::{Bullet, BulletId, BulletState};
use super::gameplay::Gameplay;
use super::launcher::Launcher;
use super::scene::{ColliderId, Layers, Scene, Transform};
use super::trajectory::{TrajectoryPredictor, TrajectoryPreview};
use crate::settings::Settings;

/// Why a bullet left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveReason {
    /// Hit a block of its target type
    Matched,
    /// Came back to the launcher after a recall
    Returned,
}

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BulletFired {
        bullet: BulletId,
        direction: Vec3,
        target: BlockType,
    },
    FireRejected,
    BulletReflected {
        bullet: BulletId,
        collider: ColliderId,
    },
    ColumnCleared {
        bullet: BulletId,
        row: usize,
        col: usize,
        block_type: BlockType,
        cleared: usize,
    },
    BulletResolved {
        bullet: BulletId,
        reason: ResolveReason,
    },
    BulletsRecalled {
        count: usize,
    },
    BlockRemoved {
        block: BlockId,
    },
}

/// Serializable view of the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub time_ticks: u64,
    pub launcher_yaw: f32,
    pub has_active_bullet: bool,
    pub detected_block_type: BlockType,
    pub grid: Vec<Vec<BlockType>>,
    pub bullets: Vec<BulletSnapshot>,
    pub cleared_blocks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletSnapshot {
    pub id: BulletId,
    pub position: Vec3,
    pub direction: Vec3,
    pub state: BulletState,
    pub target: BlockType,
}

pub struct GameState {
    pub settings: Settings,
    pub scene: Scene,
    pub gameplay: Gameplay,
    pub launcher: Launcher,
    pub trajectory: TrajectoryPredictor,
    /// Live bullets, sorted by id
    pub bullets: Vec<Bullet>,
    pub walls: Vec<ColliderId>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Direction requested for this tick's preview
    pub(crate) preview_request: Option<Vec3>,
    events: Vec<GameEvent>,
    next_bullet_id: u32,
}

impl GameState {
    /// Build the board, walls and launcher from settings
    pub fn new(settings: Settings) -> Self {
        let mut scene = Scene::new();
        let mut gameplay = Gameplay::new(settings.gameplay.clone());
        gameplay.generate(&settings.grid, &mut scene);
        let walls = spawn_walls(&settings, &mut scene);

        Self {
            launcher: Launcher::new(settings.launcher.clone()),
            trajectory: TrajectoryPredictor::new(
                settings.trajectory.clone(),
                Layers::WALL | Layers::BLOCK,
            ),
            settings,
            scene,
            gameplay,
            bullets: Vec::new(),
            walls,
            time_ticks: 0,
            preview_request: None,
            events: Vec::new(),
            next_bullet_id: 1,
        }
    }

    pub fn preview(&self) -> &TrajectoryPreview {
        self.trajectory.preview()
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fire along the launcher's facing with the currently previewed target
    pub fn fire(&mut self) -> Option<BulletId> {
        let id = BulletId(self.next_bullet_id);
        let detected = self.trajectory.detected_block_type();

        let Some(bullet) = self.launcher.fire(id, detected, &self.settings.bullet) else {
            self.push_event(GameEvent::FireRejected);
            return None;
        };
        self.next_bullet_id += 1;
        self.trajectory.disable();
        self.preview_request = None;

        log::info!(
            "Fired bullet {} at {:.1} deg targeting {:?}",
            id.0,
            self.launcher.yaw(),
            detected
        );
        self.push_event(GameEvent::BulletFired {
            bullet: id,
            direction: bullet.direction(),
            target: detected,
        });
        self.bullets.push(bullet);
        Some(id)
    }

    /// Send all tracked bullets home
    pub fn recall(&mut self) -> usize {
        let count = self.launcher.recall(&mut self.bullets);
        if count > 0 {
            log::info!("Recalled {} bullet(s)", count);
            self.push_event(GameEvent::BulletsRecalled { count });
        }
        count
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            time_ticks: self.time_ticks,
            launcher_yaw: self.launcher.yaw(),
            has_active_bullet: self.launcher.has_active_bullet(),
            detected_block_type: self.trajectory.detected_block_type(),
            grid: self.gameplay.grid_types(),
            bullets: self
                .bullets
                .iter()
                .map(|b| BulletSnapshot {
                    id: b.id,
                    position: b.position(),
                    direction: b.direction(),
                    state: b.state(),
                    target: b.target_block_type(),
                })
                .collect(),
            cleared_blocks: self.gameplay.cleared().len(),
        }
    }
}

/// Side walls and a far wall around the grid, on the wall layer
fn spawn_walls(settings: &Settings, scene: &mut Scene) -> Vec<ColliderId> {
    let grid = &settings.grid;
    let arena = &settings.arena;
    let half_block = grid.block_size * 0.5;

    let left = grid.origin.x - half_block - arena.side_margin - arena.wall_thickness * 0.5;
    let right = grid.cell_position(0, grid.columns.saturating_sub(1)).x
        + half_block
        + arena.side_margin
        + arena.wall_thickness * 0.5;
    let far = grid.origin.z + half_block + arena.far_margin + arena.wall_thickness * 0.5;
    let near = settings.launcher.position.z.min(grid.cell_position(grid.rows, 0).z);

    let height = grid.block_size;
    let side_length = far - near;
    let side_center_z = (far + near) * 0.5;
    let width = right - left + arena.wall_thickness;

    let mut walls = Vec::with_capacity(3);
    for x in [left, right] {
        walls.push(scene.spawn(
            Transform {
                position: Vec3::new(x, grid.origin.y, side_center_z),
                scale: Vec3::new(arena.wall_thickness, height, side_length),
                ..Default::default()
            },
            Layers::WALL,
        ));
    }
    walls.push(scene.spawn(
        Transform {
            position: Vec3::new((left + right) * 0.5, grid.origin.y, far),
            scale: Vec3::new(width, height, arena.wall_thickness),
            ..Default::default()
        },
        Layers::WALL,
    ));
    walls
}
