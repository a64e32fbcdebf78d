//! Simulation tick
//!
//! Fixed order each frame: gameplay (cleared blocks) -> launcher ->
//! bullets -> trajectory preview.

use super::block::BlockLookup;
use super::bullet::{BulletId, Contact};
use super::launcher::LauncherAction;
use super::scene::Layers;
use super::state::{GameEvent, GameState, ResolveReason};

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer button went down this tick
    pub pointer_pressed: bool,
    /// Pointer button went up this tick (fires)
    pub pointer_released: bool,
    /// Horizontal pointer position in screen pixels
    pub pointer_x: f32,
    /// Continuous horizontal axis (-1..1)
    pub horizontal_axis: f32,
    /// Hold the current aim and refresh the preview without rotating
    pub aiming: bool,
    /// Call live bullets back to the launcher
    pub recall: bool,
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    // Cleared blocks slide off and are destroyed past the threshold
    for block in state.gameplay.tick(&mut state.scene, dt) {
        state.push_event(GameEvent::BlockRemoved { block });
    }

    // Launcher
    if input.recall {
        state.recall();
    }
    match state.launcher.tick(input, dt) {
        LauncherAction::Aim(direction) => state.preview_request = Some(direction),
        LauncherAction::Fire => {
            state.fire();
        }
        LauncherAction::Idle => {}
    }

    tick_bullets(state, dt);

    // Trajectory preview from the launcher's current aim
    if let Some(direction) = state.preview_request.take() {
        let origin = state.launcher.fire_point();
        state
            .trajectory
            .predict(origin, direction, &state.scene, &state.gameplay);
    }
}

fn tick_bullets(state: &mut GameState, dt: f32) {
    let mut events = Vec::new();
    let mut resolved: Vec<(BulletId, ResolveReason)> = Vec::new();

    for bullet in &mut state.bullets {
        if bullet.advance(dt) {
            resolved.push((bullet.id, ResolveReason::Returned));
            continue;
        }

        let overlaps = state
            .scene
            .overlaps(bullet.position(), bullet.radius, Layers::WALL | Layers::BLOCK);
        for overlap in bullet.update_contacts(&overlaps) {
            let block = state.gameplay.block_for(overlap.collider);
            let hit = block.and_then(|b| b.cell().map(|cell| (cell, b.block_type())));

            match bullet.on_enter(block, overlap.closest_point) {
                Contact::Clear(block_id) => {
                    let cleared = state.gameplay.clear_block(block_id, &mut state.scene);
                    if let Some((cell, block_type)) = hit {
                        events.push(GameEvent::ColumnCleared {
                            bullet: bullet.id,
                            row: cell.row,
                            col: cell.col,
                            block_type,
                            cleared,
                        });
                    }
                }
                Contact::Reflected => {
                    log::debug!(
                        "Bullet {} reflected off {:?}, now heading {:?}",
                        bullet.id.0,
                        overlap.collider,
                        bullet.direction()
                    );
                    events.push(GameEvent::BulletReflected {
                        bullet: bullet.id,
                        collider: overlap.collider,
                    });
                }
                Contact::Ignored => {}
            }

            if bullet.is_resolved() {
                resolved.push((bullet.id, ResolveReason::Matched));
                break;
            }
        }
    }

    state.bullets.retain(|b| !b.is_resolved());

    for event in events {
        state.push_event(event);
    }
    for (id, reason) in resolved {
        log::info!("Bullet {} resolved: {:?}", id.0, reason);
        state.launcher.notify_bullet_resolved(id);
        state.push_event(GameEvent::BulletResolved { bullet: id, reason });
    }
}
