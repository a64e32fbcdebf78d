//! Game settings and tunables
//!
//! Loaded from an optional JSON file; every section falls back to defaults.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Block grid layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub rows: usize,
    pub columns: usize,
    /// Edge length of each block
    pub block_size: f32,
    /// Gap between neighbouring blocks
    pub spacing: f32,
    /// World position of block (0, 0)
    pub origin: Vec3,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            columns: GRID_COLUMNS,
            block_size: BLOCK_SIZE,
            spacing: BLOCK_SPACING,
            origin: Vec3::new(-5.25, 0.0, 20.0),
        }
    }
}

impl GridSettings {
    /// Distance between neighbouring block centers
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.block_size + self.spacing
    }

    /// World position of the block at (row, col)
    pub fn cell_position(&self, row: usize, col: usize) -> Vec3 {
        Vec3::new(
            self.origin.x + col as f32 * self.pitch(),
            self.origin.y,
            self.origin.z - row as f32 * self.pitch(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    pub position: Vec3,
    /// Distance from the pivot to the fire point along the facing direction
    pub fire_offset: f32,
    /// Degrees per second per unit of input
    pub rotation_speed: f32,
    pub min_angle: f32,
    pub max_angle: f32,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -10.0),
            fire_offset: 1.0,
            rotation_speed: LAUNCHER_ROTATION_SPEED,
            min_angle: LAUNCHER_MIN_ANGLE,
            max_angle: LAUNCHER_MAX_ANGLE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletSettings {
    pub speed: f32,
    pub radius: f32,
    pub return_radius: f32,
    /// Keep flying after clearing a matching column
    pub pierce_on_match: bool,
}

impl Default for BulletSettings {
    fn default() -> Self {
        Self {
            speed: BULLET_SPEED,
            radius: BULLET_RADIUS,
            return_radius: BULLET_RETURN_RADIUS,
            pierce_on_match: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectorySettings {
    pub num_points: usize,
    pub spacing: f32,
    pub ray_cast_max_distance: f32,
}

impl Default for TrajectorySettings {
    fn default() -> Self {
        Self {
            num_points: TRAJECTORY_POINTS,
            spacing: TRAJECTORY_SPACING,
            ray_cast_max_distance: TRAJECTORY_RAY_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    pub cleared_block_move_speed: f32,
    /// Cleared blocks are destroyed once their z drops below this
    pub removal_z: f32,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            cleared_block_move_speed: CLEARED_BLOCK_SPEED,
            removal_z: CLEARED_BLOCK_REMOVAL_Z,
        }
    }
}

/// Wall placement around the grid
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    /// Gap between the outer block columns and the side walls
    pub side_margin: f32,
    /// Gap between row 0 and the far wall
    pub far_margin: f32,
    pub wall_thickness: f32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            side_margin: 3.0,
            far_margin: 2.0,
            wall_thickness: 1.0,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid: GridSettings,
    pub launcher: LauncherSettings,
    pub bullet: BulletSettings,
    pub trajectory: TrajectorySettings,
    pub gameplay: GameplaySettings,
    pub arena: ArenaSettings,
}

impl Settings {
    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from a file if given, falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load(path).unwrap_or_else(|e| {
                log::warn!("{}; using default settings", e);
                Self::default()
            }),
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Reject layouts the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: &str| Err(SettingsError::Invalid(msg.to_string()));

        if self.grid.rows == 0 || self.grid.columns == 0 {
            return invalid("grid must have at least one row and one column");
        }
        if self.grid.block_size <= 0.0 || self.grid.spacing < 0.0 {
            return invalid("block size must be positive and spacing non-negative");
        }
        if self.launcher.min_angle > self.launcher.max_angle {
            return invalid("launcher min_angle exceeds max_angle");
        }
        if self.bullet.speed <= 0.0 || self.bullet.radius <= 0.0 {
            return invalid("bullet speed and radius must be positive");
        }
        if self.bullet.return_radius <= 0.0 {
            return invalid("bullet return_radius must be positive");
        }
        if self.trajectory.num_points == 0 || self.trajectory.num_points > TRAJECTORY_POINTS {
            return Err(SettingsError::Invalid(format!(
                "trajectory num_points must be between 1 and {}",
                TRAJECTORY_POINTS
            )));
        }
        if self.trajectory.spacing <= 0.0 || self.trajectory.ray_cast_max_distance <= 0.0 {
            return invalid("trajectory spacing and ray distance must be positive");
        }
        if self.gameplay.cleared_block_move_speed <= 0.0 {
            return invalid("cleared_block_move_speed must be positive");
        }
        Ok(())
    }
}
