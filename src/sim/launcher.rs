//! Launcher: aiming, firing and recall
//!
//! Only one bullet may be live at a time. While it is, aiming input is
//! ignored and firing is rejected.

use glam::Vec3;

use super::block::BlockType;
use super::bullet::{Bullet, BulletId};
use super::scene::Transform;
use super::tick::TickInput;
use crate::settings::{BulletSettings, LauncherSettings};
use crate::{normalize_degrees, yaw_to_direction};

/// What the launcher wants from the rest of the tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LauncherAction {
    Idle,
    /// Preview the trajectory along this direction
    Aim(Vec3),
    Fire,
}

#[derive(Debug, Clone)]
pub struct Launcher {
    pub transform: Transform,
    /// Yaw in degrees about world up, 0 faces +Z
    yaw: f32,
    settings: LauncherSettings,
    has_active_bullet: bool,
    dragging: bool,
    last_pointer_x: f32,
    active_bullets: Vec<BulletId>,
}

impl Launcher {
    pub fn new(settings: LauncherSettings) -> Self {
        Self {
            transform: Transform::from_position(settings.position),
            yaw: 0.0,
            settings,
            has_active_bullet: false,
            dragging: false,
            last_pointer_x: 0.0,
            active_bullets: Vec::new(),
        }
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Current facing direction on the play plane
    #[inline]
    pub fn facing(&self) -> Vec3 {
        yaw_to_direction(self.yaw)
    }

    /// Where bullets spawn and the preview starts
    pub fn fire_point(&self) -> Vec3 {
        self.position() + self.facing() * self.settings.fire_offset
    }

    #[inline]
    pub fn has_active_bullet(&self) -> bool {
        self.has_active_bullet
    }

    pub fn active_bullets(&self) -> &[BulletId] {
        &self.active_bullets
    }

    /// Process one tick of input
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> LauncherAction {
        if self.has_active_bullet {
            return LauncherAction::Idle;
        }

        if input.pointer_pressed {
            self.dragging = true;
            self.last_pointer_x = input.pointer_x;
        } else if input.pointer_released {
            self.dragging = false;
        }

        let mut aiming = input.aiming;
        let mut rotation = 0.0;
        if self.dragging {
            rotation = (input.pointer_x - self.last_pointer_x) * self.settings.rotation_speed * dt;
            self.last_pointer_x = input.pointer_x;
            aiming = true;
        } else if input.horizontal_axis != 0.0 {
            rotation = input.horizontal_axis * self.settings.rotation_speed * dt;
            aiming = true;
        }
        self.rotate(rotation);

        if input.pointer_released {
            LauncherAction::Fire
        } else if aiming {
            LauncherAction::Aim(self.facing())
        } else {
            LauncherAction::Idle
        }
    }

    /// Apply a yaw delta. Wraps to (-180, 180] before clamping.
    pub fn rotate(&mut self, degrees: f32) {
        let yaw = normalize_degrees(self.yaw + degrees);
        self.yaw = yaw.clamp(self.settings.min_angle, self.settings.max_angle);
        self.transform.set_yaw(self.yaw);
    }

    /// Spawn a bullet along the facing direction, unless one is already live
    pub fn fire(
        &mut self,
        id: BulletId,
        detected: BlockType,
        settings: &BulletSettings,
    ) -> Option<Bullet> {
        if self.has_active_bullet {
            log::warn!("Fire rejected: bullet {:?} still active", self.active_bullets);
            return None;
        }

        self.has_active_bullet = true;
        self.dragging = false;
        self.active_bullets.push(id);
        Some(Bullet::new(id, self.fire_point(), self.facing(), detected, settings))
    }

    /// Send every tracked bullet back to the launcher and stop tracking them.
    ///
    /// Returns how many bullets were recalled.
    pub fn recall(&mut self, bullets: &mut [Bullet]) -> usize {
        let home = self.position();
        let mut recalled = 0;
        for bullet in bullets.iter_mut() {
            if self.active_bullets.contains(&bullet.id) {
                bullet.recall(home);
                recalled += 1;
            }
        }
        self.active_bullets.clear();
        recalled
    }

    /// A bullet finished; allow aiming and firing again
    pub fn notify_bullet_resolved(&mut self, id: BulletId) {
        self.active_bullets.retain(|b| *b != id);
        self.has_active_bullet = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::bullet::BulletState;
    use proptest::prelude::*;

    fn launcher() -> Launcher {
        Launcher::new(LauncherSettings::default())
    }

    fn axis(value: f32) -> TickInput {
        TickInput {
            horizontal_axis: value,
            ..Default::default()
        }
    }

    #[test]
    fn test_axis_rotates_and_aims() {
        let mut l = launcher();
        let action = l.tick(&axis(1.0), 0.1);
        assert!((l.yaw() - 5.0).abs() < 1e-4);
        match action {
            LauncherAction::Aim(dir) => assert!((dir - l.facing()).length() < 1e-6),
            other => panic!("expected Aim, got {:?}", other),
        }
    }

    #[test]
    fn test_idle_without_input() {
        let mut l = launcher();
        assert_eq!(l.tick(&TickInput::default(), SIM_DT), LauncherAction::Idle);
        assert_eq!(l.yaw(), 0.0);
    }

    #[test]
    fn test_aiming_flag_previews_without_rotating() {
        let mut l = launcher();
        l.rotate(12.0);
        let hold = TickInput {
            aiming: true,
            ..Default::default()
        };
        match l.tick(&hold, SIM_DT) {
            LauncherAction::Aim(dir) => assert!((dir - l.facing()).length() < 1e-6),
            other => panic!("expected Aim, got {:?}", other),
        }
        assert_eq!(l.yaw(), 12.0);
    }

    #[test]
    fn test_pointer_drag_then_release_fires() {
        let mut l = launcher();
        let press = TickInput {
            pointer_pressed: true,
            pointer_x: 100.0,
            ..Default::default()
        };
        assert!(matches!(l.tick(&press, 0.1), LauncherAction::Aim(_)));
        assert_eq!(l.yaw(), 0.0);

        let drag = TickInput {
            pointer_x: 102.0,
            ..Default::default()
        };
        l.tick(&drag, 0.1);
        // 2 px * 50 deg/s * 0.1 s
        assert!((l.yaw() - 10.0).abs() < 1e-4);

        let release = TickInput {
            pointer_released: true,
            pointer_x: 102.0,
            ..Default::default()
        };
        assert_eq!(l.tick(&release, 0.1), LauncherAction::Fire);
    }

    #[test]
    fn test_fire_rejected_while_bullet_active() {
        let mut l = launcher();
        let settings = BulletSettings::default();
        let first = l.fire(BulletId(1), BlockType::Blue, &settings).unwrap();
        assert_eq!(first.target_block_type(), BlockType::Blue);
        assert!(l.has_active_bullet());

        assert!(l.fire(BulletId(2), BlockType::Blue, &settings).is_none());
        assert_eq!(l.active_bullets(), &[BulletId(1)]);

        // Input is ignored while the bullet is live
        assert_eq!(l.tick(&axis(1.0), 1.0), LauncherAction::Idle);
        assert_eq!(l.yaw(), 0.0);
    }

    #[test]
    fn test_bullet_spawns_at_fire_point() {
        let mut l = launcher();
        l.rotate(30.0);
        let bullet = l.fire(BulletId(1), BlockType::None, &BulletSettings::default()).unwrap();
        assert!((bullet.position() - l.fire_point()).length() < 1e-6);
        assert!((bullet.direction() - l.facing()).length() < 1e-6);
    }

    #[test]
    fn test_recall_redirects_tracked_bullets() {
        let mut l = launcher();
        let mut bullets = vec![l.fire(BulletId(1), BlockType::Cyan, &BulletSettings::default()).unwrap()];
        bullets[0].advance(1.0);

        assert_eq!(l.recall(&mut bullets), 1);
        assert!(l.active_bullets().is_empty());
        assert!(l.has_active_bullet());
        assert!(matches!(bullets[0].state(), BulletState::Returning { .. }));
        let to_home = (l.position() - bullets[0].position()).normalize();
        assert!((bullets[0].direction() - to_home).length() < 1e-5);

        // Tracking is gone, so a second recall does nothing
        assert_eq!(l.recall(&mut bullets), 0);

        l.notify_bullet_resolved(BulletId(1));
        assert!(!l.has_active_bullet());
        assert!(l.fire(BulletId(2), BlockType::Cyan, &BulletSettings::default()).is_some());
    }

    #[test]
    fn test_clamp_after_wrap() {
        let mut l = launcher();
        l.rotate(200.0); // wraps to -160, clamps to -85
        assert_eq!(l.yaw(), -85.0);
        l.rotate(-10.0);
        assert_eq!(l.yaw(), -85.0);
        l.rotate(170.0);
        assert_eq!(l.yaw(), 85.0);
    }

    proptest! {
        #[test]
        fn prop_yaw_stays_clamped(deltas in prop::collection::vec(-5000.0f32..5000.0, 1..50)) {
            let mut l = launcher();
            for d in deltas {
                l.rotate(d);
                prop_assert!(l.yaw() >= -85.0 && l.yaw() <= 85.0);
            }
            let settled = l.yaw();
            l.rotate(0.0);
            prop_assert_eq!(l.yaw(), settled);
        }
    }
}
