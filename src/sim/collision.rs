//! Collision geometry and reflection
//!
//! Play happens on the XZ plane. Colliders are axis-aligned boxes; the
//! bullet is a sphere and the trajectory preview is a ray.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::DIRECTION_EPSILON_SQ;

/// Axis-aligned box given by center and half extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Aabb {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Closest point on (or in) the box to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min(), self.max())
    }
}

/// Result of a ray/box query
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Distance along the ray
    pub distance: f32,
    pub point: Vec3,
    /// Outward face normal at the hit
    pub normal: Vec3,
}

/// Slab test of a ray against a box.
///
/// `direction` must be normalized. A ray starting inside the box reports
/// no hit, matching trigger-style colliders that only see entries.
pub fn ray_aabb(origin: Vec3, direction: Vec3, max_distance: f32, aabb: &Aabb) -> Option<RayHit> {
    let min = aabb.min();
    let max = aabb.max();

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = 0;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < 1e-8 {
            // Parallel to this slab
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_enter {
            t_enter = t0;
            enter_axis = axis;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 || t_enter > max_distance {
        return None;
    }

    let mut normal = Vec3::ZERO;
    normal[enter_axis] = -direction[enter_axis].signum();

    Some(RayHit {
        distance: t_enter,
        point: origin + direction * t_enter,
        normal,
    })
}

/// Whether a sphere overlaps a box
#[inline]
pub fn sphere_overlaps_aabb(center: Vec3, radius: f32, aabb: &Aabb) -> bool {
    aabb.closest_point(center).distance_squared(center) <= radius * radius
}

/// Reflect a direction off a surface: d' = d - 2(d·n)n
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Reflect a planar direction and keep it planar and unit length.
///
/// Returns `None` when the direction, the normal or the result is a zero
/// vector; callers keep their current direction in that case.
pub fn reflect_planar(direction: Vec3, normal: Vec3) -> Option<Vec3> {
    if direction.length_squared() < DIRECTION_EPSILON_SQ {
        return None;
    }
    let normal = normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        return None;
    }

    let mut reflected = reflect(direction, normal).normalize_or_zero();
    reflected.y = 0.0;
    let reflected = reflected.normalize_or_zero();
    (reflected != Vec3::ZERO).then_some(reflected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_box(center: Vec3) -> Aabb {
        Aabb::new(center, Vec3::splat(2.0))
    }

    #[test]
    fn test_ray_hits_front_face() {
        let aabb = unit_box(Vec3::new(0.0, 0.0, 5.0));
        let hit = ray_aabb(Vec3::ZERO, Vec3::Z, 10.0, &aabb).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.point - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
        assert_eq!(hit.normal, Vec3::NEG_Z);
    }

    #[test]
    fn test_ray_respects_max_distance() {
        let aabb = unit_box(Vec3::new(0.0, 0.0, 5.0));
        assert!(ray_aabb(Vec3::ZERO, Vec3::Z, 3.0, &aabb).is_none());
    }

    #[test]
    fn test_ray_misses_sideways() {
        let aabb = unit_box(Vec3::new(5.0, 0.0, 5.0));
        assert!(ray_aabb(Vec3::ZERO, Vec3::Z, 10.0, &aabb).is_none());
    }

    #[test]
    fn test_ray_from_inside_ignored() {
        let aabb = unit_box(Vec3::ZERO);
        assert!(ray_aabb(Vec3::ZERO, Vec3::X, 10.0, &aabb).is_none());
    }

    #[test]
    fn test_ray_side_face_normal() {
        let aabb = unit_box(Vec3::new(5.0, 0.0, 0.0));
        let dir = Vec3::new(1.0, 0.0, 0.2).normalize();
        let hit = ray_aabb(Vec3::ZERO, dir, 10.0, &aabb).unwrap();
        assert_eq!(hit.normal, Vec3::NEG_X);
    }

    #[test]
    fn test_sphere_overlap() {
        let aabb = unit_box(Vec3::new(0.0, 0.0, 3.0));
        assert!(sphere_overlaps_aabb(Vec3::new(0.0, 0.0, 1.9), 0.25, &aabb));
        assert!(!sphere_overlaps_aabb(Vec3::new(0.0, 0.0, 1.5), 0.25, &aabb));
    }

    #[test]
    fn test_reflect_off_wall() {
        let out = reflect_planar(Vec3::X, Vec3::NEG_X).unwrap();
        assert!((out - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn test_reflect_zero_inputs_short_circuit() {
        assert!(reflect_planar(Vec3::ZERO, Vec3::X).is_none());
        assert!(reflect_planar(Vec3::X, Vec3::ZERO).is_none());
        // Bouncing straight up leaves nothing on the plane
        assert!(reflect_planar(Vec3::new(0.0, 1.0, 0.0), Vec3::Y).is_none());
    }

    #[test]
    fn test_reflect_normal_sign_irrelevant() {
        let d = Vec3::new(1.0, 0.0, 1.0).normalize();
        let a = reflect_planar(d, Vec3::X).unwrap();
        let b = reflect_planar(d, Vec3::NEG_X).unwrap();
        assert!((a - b).length() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_reflection_law(
            d_angle in 0.0f32..std::f32::consts::TAU,
            n_angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let d = Vec3::new(d_angle.sin(), 0.0, d_angle.cos());
            let n = Vec3::new(n_angle.sin(), 0.0, n_angle.cos());
            let out = reflect_planar(d, n).unwrap();

            prop_assert!((out.length() - 1.0).abs() < 1e-4);
            prop_assert_eq!(out.y, 0.0);
            prop_assert!((out.dot(n) + d.dot(n)).abs() < 1e-4);
        }
    }
}
