//! Enemy decision policy
//!
//! Memoryless random walk with a randomised bomb habit. The brain only
//! produces intent; the tick validates moves against the grid and live bombs.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::actor::Direction;
use crate::tuning::Tuning;

/// What an enemy would like to do this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    /// Drop a bomb behind it if the tick also moves it
    pub wants_bomb: bool,
    /// Movement cadence elapsed; try to step this tick
    pub move_ready: bool,
}

/// Per-enemy cadence timers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Brain {
    move_timer: f32,
    bomb_timer: f32,
    /// Last direction rolled on the movement cadence. Informational only.
    pub last_direction: Option<Direction>,
}

impl Brain {
    /// Advance both cadence timers and roll this tick's intent
    pub fn think<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        has_bombs: bool,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Intent {
        self.move_timer += dt;
        self.bomb_timer += dt;

        let mut intent = Intent::default();

        if self.bomb_timer >= tuning.enemy_bomb_delay
            && has_bombs
            && rng.random_bool(f64::from(tuning.enemy_bomb_chance))
        {
            intent.wants_bomb = true;
            self.bomb_timer = 0.0;
        }

        if self.move_timer >= tuning.enemy_move_delay {
            self.move_timer = 0.0;
            self.last_direction = Some(Direction::ALL[rng.random_range(0..4)]);
            intent.move_ready = true;
        }

        intent
    }
}

/// The four directions in a fresh random order
pub fn shuffled_directions<R: Rng + ?Sized>(rng: &mut R) -> [Direction; 4] {
    let mut order = Direction::ALL;
    order.shuffle(rng);
    order
}
