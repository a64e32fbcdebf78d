//! Trajectory preview
//!
//! Hops a ray across the board in fixed steps, bouncing off whatever it
//! hits, until it lands on a block. The block's type is what the next
//! bullet will be allowed to destroy.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::block::{BlockLookup, BlockType, Color};
use super::collision::reflect_planar;
use super::scene::{Layers, RayCaster};
use crate::settings::TrajectorySettings;

/// A single dot of the preview
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewPoint {
    pub position: Vec3,
    pub active: bool,
    pub color: Color,
}

impl Default for PreviewPoint {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            active: false,
            color: Color::WHITE,
        }
    }
}

/// Latest simulated path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryPreview {
    pub points: Vec<PreviewPoint>,
    pub detected_block_type: BlockType,
    pub current_color: Color,
}

impl TrajectoryPreview {
    pub fn active_count(&self) -> usize {
        self.points.iter().filter(|p| p.active).count()
    }
}

pub struct TrajectoryPredictor {
    settings: TrajectorySettings,
    mask: Layers,
    preview: TrajectoryPreview,
}

impl TrajectoryPredictor {
    pub fn new(settings: TrajectorySettings, mask: Layers) -> Self {
        let points = vec![PreviewPoint::default(); settings.num_points];
        Self {
            settings,
            mask,
            preview: TrajectoryPreview {
                points,
                detected_block_type: BlockType::None,
                current_color: Color::WHITE,
            },
        }
    }

    #[inline]
    pub fn preview(&self) -> &TrajectoryPreview {
        &self.preview
    }

    #[inline]
    pub fn detected_block_type(&self) -> BlockType {
        self.preview.detected_block_type
    }

    /// Simulate the path from `origin` along `direction`
    pub fn predict<R, B>(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        caster: &R,
        blocks: &B,
    ) -> &TrajectoryPreview
    where
        R: RayCaster,
        B: BlockLookup,
    {
        let mut point = origin;
        let mut dir = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        let mut detected: Option<(usize, BlockType, Color)> = None;

        if dir != Vec3::ZERO {
            for i in 0..self.preview.points.len() {
                point += dir * self.settings.spacing;

                if let Some(hit) =
                    caster.raycast(point, dir, self.settings.ray_cast_max_distance, self.mask)
                {
                    if let Some(reflected) = reflect_planar(dir, hit.normal) {
                        dir = reflected;
                    }
                    point = hit.point;
                    self.place(i, point);

                    if let Some(block) = blocks.block_for(hit.collider) {
                        detected = Some((i + 1, block.block_type(), block.color()));
                        break;
                    }
                } else {
                    self.place(i, point);
                }
            }
        }

        match detected {
            Some((cutoff, block_type, color)) => {
                for p in &mut self.preview.points[cutoff..] {
                    p.active = false;
                }
                self.set_color(color);
                self.preview.detected_block_type = block_type;
                log::debug!("Trajectory locked on {:?} after {} hops", block_type, cutoff);
            }
            None => {
                if dir == Vec3::ZERO {
                    self.disable();
                }
                self.set_color(Color::WHITE);
                self.preview.detected_block_type = BlockType::None;
            }
        }

        &self.preview
    }

    /// Hide every preview point
    pub fn disable(&mut self) {
        for p in &mut self.preview.points {
            p.active = false;
        }
    }

    fn place(&mut self, index: usize, position: Vec3) {
        let p = &mut self.preview.points[index];
        p.position = position;
        p.active = true;
    }

    /// Recolor all points. Returns false when the color is already current.
    fn set_color(&mut self, color: Color) -> bool {
        if self.preview.current_color == color {
            return false;
        }
        self.preview.current_color = color;
        for p in &mut self.preview.points {
            p.color = color;
        }
        true
    }
}
