//! Data-driven game balance
//!
//! Defaults reproduce the classic 21x15 arena. A JSON file may override any
//! subset of fields.

use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::grid::SafeZone;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Largest arena a tuning file may ask for, in cells
pub const MAX_CELLS: i32 = 1 << 20;

/// Balance knobs for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub map_width: i32,
    pub map_height: i32,
    pub player_start: IVec2,
    /// Enemy spawn cells; `None` puts one in each of the other three corners
    pub enemy_starts: Option<Vec<IVec2>>,

    pub player_lives: u32,
    pub player_max_bombs: u32,
    pub player_bomb_range: i32,
    pub enemy_max_bombs: u32,
    pub enemy_bomb_range: i32,
    /// Seconds from placement to detonation
    pub bomb_fuse_secs: f32,

    /// Seconds between player steps while a direction is held
    pub player_move_delay: f32,
    pub enemy_move_delay: f32,
    pub enemy_bomb_delay: f32,
    /// Chance an enemy wants to bomb once its cooldown is up
    pub enemy_bomb_chance: f32,
    /// Chance a destroyed block leaves a power-up
    pub powerup_spawn_chance: f32,
    /// How long explosion cells stay lethal
    pub explosion_clear_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            map_width: 21,
            map_height: 15,
            player_start: IVec2::new(1, 1),
            enemy_starts: None,

            player_lives: 3,
            player_max_bombs: 1,
            player_bomb_range: 2,
            enemy_max_bombs: 1,
            enemy_bomb_range: 2,
            bomb_fuse_secs: 3.0,

            player_move_delay: 0.15,
            enemy_move_delay: 0.3,
            enemy_bomb_delay: 2.0,
            enemy_bomb_chance: 0.3,
            powerup_spawn_chance: 0.3,
            explosion_clear_secs: 0.5,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Enemy spawn cells, defaulting to the three non-player corners
    pub fn enemy_spawns(&self) -> Vec<IVec2> {
        match &self.enemy_starts {
            Some(starts) => starts.clone(),
            None => {
                let (w, h) = (self.map_width, self.map_height);
                vec![
                    IVec2::new(w - 2, h - 2),
                    IVec2::new(w - 2, 1),
                    IVec2::new(1, h - 2),
                ]
            }
        }
    }

    /// Areas map generation keeps free of blocks: a 2x2 pocket at the player
    /// start and a 3x3 pocket at each enemy start, opening toward the centre.
    pub fn safe_zones(&self) -> Vec<SafeZone> {
        let mut zones = vec![self.pocket(self.player_start, 1)];
        zones.extend(self.enemy_spawns().into_iter().map(|s| self.pocket(s, 2)));
        zones
    }

    fn pocket(&self, spawn: IVec2, reach: i32) -> SafeZone {
        let inward = IVec2::new(
            if spawn.x * 2 < self.map_width { 1 } else { -1 },
            if spawn.y * 2 < self.map_height { 1 } else { -1 },
        );
        let far = spawn + inward * reach;
        SafeZone::new(spawn.min(far), spawn.max(far))
    }

    fn interior(&self, pos: IVec2) -> bool {
        pos.x >= 1 && pos.x < self.map_width - 1 && pos.y >= 1 && pos.y < self.map_height - 1
    }

    /// Even-even cells are always lattice pillars
    fn on_pillar(pos: IVec2) -> bool {
        pos.x % 2 == 0 && pos.y % 2 == 0
    }

    /// Reject configurations the simulation cannot run
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |msg: String| Err(TuningError::Invalid(msg));

        if self.map_width < 5 || self.map_height < 5 {
            return invalid(format!(
                "map must be at least 5x5, got {}x{}",
                self.map_width, self.map_height
            ));
        }
        match self.map_width.checked_mul(self.map_height) {
            Some(cells) if cells <= MAX_CELLS => {}
            _ => {
                return invalid(format!(
                    "map {}x{} exceeds {MAX_CELLS} cells",
                    self.map_width, self.map_height
                ));
            }
        }
        if !self.interior(self.player_start) {
            return invalid(format!("player start {} is not inside the arena", self.player_start));
        }
        if Self::on_pillar(self.player_start) {
            return invalid(format!("player start {} is a pillar", self.player_start));
        }
        if let Some(bad) = self.enemy_spawns().into_iter().find(|s| !self.interior(*s)) {
            return invalid(format!("enemy start {bad} is not inside the arena"));
        }
        if let Some(bad) = self.enemy_spawns().into_iter().find(|s| Self::on_pillar(*s)) {
            return invalid(format!("enemy start {bad} is a pillar"));
        }
        if self.player_bomb_range < 0 || self.enemy_bomb_range < 0 {
            return invalid("bomb range must not be negative".into());
        }
        if !(self.bomb_fuse_secs.is_finite() && self.bomb_fuse_secs > 0.0) {
            return invalid(format!("bomb fuse must be positive, got {}", self.bomb_fuse_secs));
        }
        if !(self.explosion_clear_secs.is_finite() && self.explosion_clear_secs > 0.0) {
            return invalid(format!(
                "explosion clear time must be positive, got {}",
                self.explosion_clear_secs
            ));
        }
        for (name, delay) in [
            ("player_move_delay", self.player_move_delay),
            ("enemy_move_delay", self.enemy_move_delay),
            ("enemy_bomb_delay", self.enemy_bomb_delay),
        ] {
            if !(delay.is_finite() && delay >= 0.0) {
                return invalid(format!("{name} must be a non-negative number, got {delay}"));
            }
        }
        for (name, chance) in [
            ("enemy_bomb_chance", self.enemy_bomb_chance),
            ("powerup_spawn_chance", self.powerup_spawn_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return invalid(format!("{name} must be within [0, 1], got {chance}"));
            }
        }
        Ok(())
    }
}
