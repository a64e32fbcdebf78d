//! Minimal scene: transforms, authored box colliders and queries
//!
//! Stands in for the engine's scene graph and physics queries. Only
//! colliders that are explicitly enabled take part in raycasts and
//! overlap checks.

use std::collections::BTreeMap;
use std::ops::BitOr;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, ray_aabb, sphere_overlaps_aabb};

/// Position, rotation and scale of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Move in world space
    #[inline]
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Set the yaw about world up, in degrees
    pub fn set_yaw(&mut self, degrees: f32) {
        self.rotation = Quat::from_rotation_y(degrees.to_radians());
    }

    /// Local +Z in world space
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

/// Collider identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

/// Collision layer bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layers(pub u32);

impl Layers {
    pub const WALL: Layers = Layers(1 << 0);
    pub const BLOCK: Layers = Layers(1 << 1);
    pub const ALL: Layers = Layers(u32::MAX);

    #[inline]
    pub fn intersects(self, other: Layers) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Layers {
    type Output = Layers;

    fn bitor(self, rhs: Layers) -> Layers {
        Layers(self.0 | rhs.0)
    }
}

/// A box collider. The box is centered on the transform and sized by its scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    pub id: ColliderId,
    pub transform: Transform,
    pub layers: Layers,
    /// Authored collidable flag; disabled colliders are invisible to queries
    pub enabled: bool,
}

impl Collider {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.transform.position, self.transform.scale)
    }
}

/// Result of a raycast against the scene
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub collider: ColliderId,
}

/// Ray intersection query
pub trait RayCaster {
    /// First enabled collider on `mask` hit within `max_distance`
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: Layers,
    ) -> Option<RaycastHit>;
}

/// A collider overlapping a sphere, with the closest point on its surface
#[derive(Debug, Clone, Copy)]
pub struct Overlap {
    pub collider: ColliderId,
    pub closest_point: Vec3,
}

/// In-memory scene of box colliders, iterated in id order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    colliders: BTreeMap<ColliderId, Collider>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate an enabled box collider
    pub fn spawn(&mut self, transform: Transform, layers: Layers) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.colliders.insert(
            id,
            Collider {
                id,
                transform,
                layers,
                enabled: true,
            },
        );
        id
    }

    /// Destroy a collider. Unknown ids are ignored.
    pub fn destroy(&mut self, id: ColliderId) {
        self.colliders.remove(&id);
    }

    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(&id)
    }

    pub fn transform(&self, id: ColliderId) -> Option<&Transform> {
        self.colliders.get(&id).map(|c| &c.transform)
    }

    pub fn transform_mut(&mut self, id: ColliderId) -> Option<&mut Transform> {
        self.colliders.get_mut(&id).map(|c| &mut c.transform)
    }

    pub fn set_enabled(&mut self, id: ColliderId, enabled: bool) {
        if let Some(collider) = self.colliders.get_mut(&id) {
            collider.enabled = enabled;
        }
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn active(&self, mask: Layers) -> impl Iterator<Item = &Collider> {
        self.colliders
            .values()
            .filter(move |c| c.enabled && c.layers.intersects(mask))
    }

    /// Enabled colliders on `mask` touching a sphere, in id order
    pub fn overlaps(&self, center: Vec3, radius: f32, mask: Layers) -> Vec<Overlap> {
        self.active(mask)
            .filter_map(|c| {
                let bounds = c.bounds();
                sphere_overlaps_aabb(center, radius, &bounds).then(|| Overlap {
                    collider: c.id,
                    closest_point: bounds.closest_point(center),
                })
            })
            .collect()
    }
}

impl RayCaster for Scene {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: Layers,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let mut best: Option<RaycastHit> = None;
        for collider in self.active(mask) {
            if let Some(hit) = ray_aabb(origin, direction, max_distance, &collider.bounds()) {
                if best.is_none_or(|b| hit.distance < b.distance) {
                    best = Some(RaycastHit {
                        point: hit.point,
                        normal: hit.normal,
                        distance: hit.distance,
                        collider: collider.id,
                    });
                }
            }
        }
        best
    }
}
