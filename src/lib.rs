//! Bounce Shot - A color-matching block shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (trajectory preview, bullets, grid clearing)
//! - `settings`: Data-driven tunables loaded from JSON
//! - `autopilot`: Seeded input generator for the headless driver

pub mod autopilot;
pub mod settings;
pub mod sim;

pub use autopilot::Autopilot;
pub use settings::{Settings, SettingsError};

use glam::{Quat, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Grid defaults
    pub const GRID_ROWS: usize = 8;
    pub const GRID_COLUMNS: usize = 6;
    pub const BLOCK_SIZE: f32 = 2.0;
    pub const BLOCK_SPACING: f32 = 0.1;

    /// Launcher defaults (degrees, degrees per second)
    pub const LAUNCHER_ROTATION_SPEED: f32 = 50.0;
    pub const LAUNCHER_MIN_ANGLE: f32 = -85.0;
    pub const LAUNCHER_MAX_ANGLE: f32 = 85.0;

    /// Bullet defaults
    pub const BULLET_SPEED: f32 = 10.0;
    pub const BULLET_RADIUS: f32 = 0.25;
    /// Distance at which a returning bullet counts as home
    pub const BULLET_RETURN_RADIUS: f32 = 1.0;

    /// Trajectory preview defaults
    pub const TRAJECTORY_POINTS: usize = 50;
    pub const TRAJECTORY_SPACING: f32 = 3.0;
    pub const TRAJECTORY_RAY_DISTANCE: f32 = 3.0;

    /// Cleared blocks slide toward -Z and are dropped past this depth
    pub const CLEARED_BLOCK_SPEED: f32 = 20.0;
    pub const CLEARED_BLOCK_REMOVAL_Z: f32 = -100.0;

    /// Below this squared length a direction is treated as zero
    pub const DIRECTION_EPSILON_SQ: f32 = 1e-8;
}

/// Normalize an angle in degrees to (-180, 180]
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    if angle > -180.0 && angle <= 180.0 {
        return angle;
    }
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Planar facing direction for a yaw about world up (0° faces +Z)
#[inline]
pub fn yaw_to_direction(yaw_degrees: f32) -> Vec3 {
    let yaw = yaw_degrees.to_radians();
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Rotation that faces a planar direction, or `None` for a zero vector
#[inline]
pub fn look_rotation(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() < consts::DIRECTION_EPSILON_SQ {
        return None;
    }
    Some(Quat::from_rotation_y(flat.x.atan2(flat.z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees_range() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert!((normalize_degrees(350.0) - -10.0).abs() < 1e-4);
        assert!((normalize_degrees(-370.0) - -10.0).abs() < 1e-4);
        assert!((normalize_degrees(725.0) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_yaw_to_direction() {
        let forward = yaw_to_direction(0.0);
        assert!((forward - Vec3::Z).length() < 1e-6);

        let right = yaw_to_direction(90.0);
        assert!((right - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_look_rotation_matches_direction() {
        let dir = Vec3::new(1.0, 0.0, 1.0).normalize();
        let rot = look_rotation(dir).unwrap();
        assert!((rot * Vec3::Z - dir).length() < 1e-5);
        assert!(look_rotation(Vec3::ZERO).is_none());
        assert!(look_rotation(Vec3::Y).is_none());
    }
}
