//! Seeded input generator for the headless driver
//!
//! Picks a random yaw inside the launcher's limits, steers toward it with
//! the horizontal axis, fires, and recalls the bullet if it is still out
//! after a time budget.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{GameState, TickInput};

/// Seconds a bullet may fly before the autopilot recalls it
pub const DEFAULT_RECALL_AFTER: f32 = 6.0;

pub struct Autopilot {
    rng: Pcg32,
    target_yaw: Option<f32>,
    aim_ticks: u32,
    flight_time: f32,
    recall_after: f32,
    recalled: bool,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            target_yaw: None,
            aim_ticks: 0,
            flight_time: 0.0,
            recall_after: DEFAULT_RECALL_AFTER,
            recalled: false,
        }
    }

    pub fn with_recall_after(mut self, seconds: f32) -> Self {
        self.recall_after = seconds;
        self
    }

    /// Yaw currently being steered toward
    pub fn target_yaw(&self) -> Option<f32> {
        self.target_yaw
    }

    /// Produce the input for the next tick
    pub fn next_input(&mut self, state: &GameState, dt: f32) -> TickInput {
        if state.launcher.has_active_bullet() {
            self.flight_time += dt;
            if self.flight_time >= self.recall_after && !self.recalled {
                self.recalled = true;
                log::debug!("Autopilot recalling after {:.1}s", self.flight_time);
                return TickInput {
                    recall: true,
                    ..Default::default()
                };
            }
            return TickInput::default();
        }
        self.flight_time = 0.0;
        self.recalled = false;

        let launcher = &state.settings.launcher;
        let target = match self.target_yaw {
            Some(yaw) => yaw,
            None => {
                let yaw = self.rng.random_range(launcher.min_angle..=launcher.max_angle);
                log::debug!("Autopilot aiming at {:.1} deg", yaw);
                self.target_yaw = Some(yaw);
                self.aim_ticks = 0;
                yaw
            }
        };

        let step = launcher.rotation_speed * dt;
        let error = target - state.launcher.yaw();

        // At least one aiming tick so the preview has picked a target
        if error.abs() <= step && self.aim_ticks > 0 {
            self.target_yaw = None;
            return TickInput {
                pointer_released: true,
                ..Default::default()
            };
        }

        self.aim_ticks += 1;
        let axis = if step > 0.0 {
            (error / step).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        TickInput {
            horizontal_axis: axis,
            aiming: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::{GameEvent, tick};

    fn run(seed: u64, ticks: usize) -> Vec<GameEvent> {
        let mut state = GameState::new(Settings::default());
        let mut pilot = Autopilot::new(seed);
        let mut events = Vec::new();
        for _ in 0..ticks {
            let input = pilot.next_input(&state, SIM_DT);
            tick(&mut state, &input, SIM_DT);
            events.extend(state.drain_events());
        }
        events
    }

    #[test]
    fn test_autopilot_fires() {
        let events = run(7, 600);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::BulletFired { .. }))
        );
    }

    #[test]
    fn test_same_seed_same_game() {
        assert_eq!(run(42, 900), run(42, 900));
    }

    #[test]
    fn test_target_within_limits() {
        let state = GameState::new(Settings::default());
        let mut pilot = Autopilot::new(3);
        for _ in 0..20 {
            pilot.target_yaw = None;
            pilot.next_input(&state, SIM_DT);
            let yaw = pilot.target_yaw().unwrap();
            assert!((-85.0..=85.0).contains(&yaw));
        }
    }

    #[test]
    fn test_steering_requests_preview() {
        let state = GameState::new(Settings::default());
        let mut pilot = Autopilot::new(9);
        let input = pilot.next_input(&state, SIM_DT);
        assert!(input.aiming);
        assert!(!input.pointer_released);
    }

    #[test]
    fn test_recalls_after_budget() {
        let mut state = GameState::new(Settings::default());
        let mut pilot = Autopilot::new(1).with_recall_after(0.5);
        state.fire();

        let mut recalls = 0;
        for _ in 0..60 {
            let input = pilot.next_input(&state, SIM_DT);
            if input.recall {
                recalls += 1;
            }
            tick(&mut state, &input, SIM_DT);
            if !state.launcher.has_active_bullet() {
                break;
            }
        }
        assert_eq!(recalls, 1);
    }
}
