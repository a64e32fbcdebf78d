//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Caller-supplied timestep only
//! - Stable iteration order (by id)
//! - No rendering or platform dependencies

pub mod block;
pub mod bullet;
pub mod collision;
pub mod gameplay;
pub mod grid;
pub mod launcher;
pub mod scene;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use block::{Block, BlockId, BlockLookup, BlockType, Color, GridCell};
pub use bullet::{Bullet, BulletId, BulletState, Contact};
pub use collision::{Aabb, reflect, reflect_planar};
pub use gameplay::Gameplay;
pub use grid::{Grid, generate_layout, layout_type};
pub use launcher::{Launcher, LauncherAction};
pub use scene::{ColliderId, Layers, RayCaster, RaycastHit, Scene, Transform};
pub use state::{BoardSnapshot, GameEvent, GameState, ResolveReason};
pub use tick::{TickInput, tick};
pub use trajectory::{PreviewPoint, TrajectoryPredictor, TrajectoryPreview};
