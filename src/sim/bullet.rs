//! Live projectile
//!
//! State machine: Flying -> Returning (recall) -> Resolved. Resolved
//! bullets are removed by the tick once their outcome has been handled.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockId, BlockType};
use super::collision::reflect_planar;
use super::scene::{ColliderId, Overlap, Transform};
use crate::consts::DIRECTION_EPSILON_SQ;
use crate::look_rotation;
use crate::settings::BulletSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BulletId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BulletState {
    Flying,
    /// Heading back to the launcher; non-matching hits are ignored
    Returning { target: Vec3 },
    Resolved,
}

/// What a collision did to the bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Hit a block of the bullet's target type
    Clear(BlockId),
    Reflected,
    Ignored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: BulletId,
    pub transform: Transform,
    direction: Vec3,
    speed: f32,
    pub radius: f32,
    return_radius: f32,
    pierce_on_match: bool,
    target_block_type: BlockType,
    state: BulletState,
    /// Colliders overlapped last tick; only new overlaps count as hits
    touching: Vec<ColliderId>,
}

impl Bullet {
    pub fn new(
        id: BulletId,
        position: Vec3,
        direction: Vec3,
        target_block_type: BlockType,
        settings: &BulletSettings,
    ) -> Self {
        let mut bullet = Self {
            id,
            transform: Transform::from_position(position),
            direction: planar(direction),
            speed: settings.speed,
            radius: settings.radius,
            return_radius: settings.return_radius,
            pierce_on_match: settings.pierce_on_match,
            target_block_type,
            state: BulletState::Flying,
            touching: Vec::new(),
        };
        bullet.face_direction();
        bullet
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn state(&self) -> BulletState {
        self.state
    }

    #[inline]
    pub fn target_block_type(&self) -> BlockType {
        self.target_block_type
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.state == BulletState::Resolved
    }

    /// Switch to returning mode, heading for `target`
    pub fn recall(&mut self, target: Vec3) {
        if self.is_resolved() {
            return;
        }
        self.direction = planar(target - self.position());
        self.state = BulletState::Returning { target };
        self.face_direction();
    }

    /// Move one step. Returns true when a returning bullet reaches home.
    ///
    /// A returning bullet never overshoots: a step longer than the remaining
    /// distance lands it on the target.
    pub fn advance(&mut self, dt: f32) -> bool {
        let step = self.speed * dt;
        match self.state {
            BulletState::Resolved => false,
            BulletState::Flying => {
                self.transform.translate(self.direction * step);
                self.face_direction();
                false
            }
            BulletState::Returning { target } => {
                let to_home = target - self.position();
                if step >= to_home.length() {
                    self.transform.position = target;
                } else {
                    self.direction = planar(to_home);
                    self.transform.translate(self.direction * step);
                }
                self.face_direction();

                if self.position().distance(target) <= self.return_radius {
                    self.state = BulletState::Resolved;
                    return true;
                }
                false
            }
        }
    }

    /// Record this tick's overlaps and return the ones that just started
    pub fn update_contacts(&mut self, overlaps: &[Overlap]) -> Vec<Overlap> {
        let entered = overlaps
            .iter()
            .filter(|o| !self.touching.contains(&o.collider))
            .copied()
            .collect();
        self.touching = overlaps.iter().map(|o| o.collider).collect();
        entered
    }

    /// Handle entering a collider. `block` is the block the collider carries, if any.
    pub fn on_enter(&mut self, block: Option<&Block>, contact_point: Vec3) -> Contact {
        if self.is_resolved() {
            return Contact::Ignored;
        }

        if let Some(block) = block {
            if block.is_active() && block.block_type() == self.target_block_type {
                if !self.pierce_on_match {
                    self.state = BulletState::Resolved;
                }
                return Contact::Clear(block.id);
            }
        }

        if matches!(self.state, BulletState::Returning { .. }) {
            return Contact::Ignored;
        }

        // Only bounce off surfaces we are moving into
        let normal = contact_point - self.position();
        if normal.dot(self.direction) <= 0.0 {
            return Contact::Ignored;
        }
        match reflect_planar(self.direction, normal) {
            Some(reflected) => {
                self.direction = reflected;
                self.face_direction();
                Contact::Reflected
            }
            None => Contact::Ignored,
        }
    }

    fn face_direction(&mut self) {
        if let Some(rotation) = look_rotation(self.direction) {
            self.transform.rotation = rotation;
        }
    }
}

/// Flatten onto the play plane and normalize; zero stays zero
fn planar(v: Vec3) -> Vec3 {
    let flat = Vec3::new(v.x, 0.0, v.z);
    if flat.length_squared() < DIRECTION_EPSILON_SQ {
        Vec3::ZERO
    } else {
        flat.normalize()
    }
}
