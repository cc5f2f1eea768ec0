//! Game state and core simulation types
//!
//! The state owns every entity by value: bombs, enemies and power-ups live in
//! plain vectors and are removed with `retain`, never by handle.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::actor::{Enemy, Player};
use super::bomb::{Bomb, Owner};
use super::grid::{Cell, Grid};
use crate::tuning::Tuning;

/// Whole-run phase. Both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Running,
    /// Player ran out of lives
    Defeated,
    /// Every enemy is dead
    Victorious,
}

impl GamePhase {
    pub fn is_over(self) -> bool {
        self != GamePhase::Running
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// +1 bomb capacity (and a full refill)
    ExtraBomb,
    ExtraLife,
    /// +1 blast range
    ExtraRange,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::ExtraBomb,
        PowerUpKind::ExtraLife,
        PowerUpKind::ExtraRange,
    ];
}

/// A collectible left behind by a destroyed block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: IVec2,
    pub collected: bool,
}

/// Fire-once notifications for the audio/presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    BombPlaced { pos: IVec2, owner: Owner },
    BombExploded { pos: IVec2, owner: Owner },
    PowerUpSpawned { pos: IVec2, kind: PowerUpKind },
    PowerUpCollected { pos: IVec2, kind: PowerUpKind },
    PlayerDied { lives_left: u32 },
    PlayerRespawned,
    EnemyKilled { index: usize },
    GameOver,
    Victory,
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tuning: Tuning,
    pub grid: Grid,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Live bombs in placement order
    pub bombs: Vec<Bomb>,
    /// Uncollected power-ups
    pub powerups: Vec<PowerUp>,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Enemy count at start; victory needs at least one
    pub initial_enemies: usize,
    /// Time since the player's last step
    pub(crate) player_move_timer: f32,
    /// Time since explosion cells were last cleared
    pub(crate) explosion_timer: f32,
    /// Events raised since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Fresh arena using the given balance settings
    pub fn new(tuning: Tuning) -> Self {
        let grid = Grid::generate(tuning.map_width, tuning.map_height, &tuning.safe_zones());
        let player = Player::new(
            tuning.player_start,
            tuning.player_lives,
            tuning.player_max_bombs,
            tuning.player_bomb_range,
        );
        let enemies: Vec<Enemy> = tuning
            .enemy_spawns()
            .into_iter()
            .map(|pos| Enemy::new(pos, tuning.enemy_max_bombs))
            .collect();

        Self::with_layout(tuning, grid, player, enemies)
    }

    /// State over a hand-built arena. Used by scenarios and tests.
    pub fn with_layout(tuning: Tuning, grid: Grid, player: Player, enemies: Vec<Enemy>) -> Self {
        Self {
            initial_enemies: enemies.len(),
            tuning,
            grid,
            player,
            enemies,
            bombs: Vec::new(),
            powerups: Vec::new(),
            phase: GamePhase::Running,
            time_ticks: 0,
            player_move_timer: 0.0,
            explosion_timer: 0.0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn bomb_at(&self, pos: IVec2) -> bool {
        self.bombs.iter().any(|b| b.pos == pos)
    }

    pub fn powerup_at(&self, pos: IVec2) -> bool {
        self.powerups.iter().any(|p| p.pos == pos)
    }

    pub fn living_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    /// Start tracking a bomb and announce it
    pub(crate) fn spawn_bomb(&mut self, owner: Owner, pos: IVec2, range: i32) {
        let id = self.next_entity_id();
        let fuse = self.tuning.bomb_fuse_secs;
        self.bombs.push(Bomb::new(id, owner, pos, fuse, range));
        self.events.push(GameEvent::BombPlaced { pos, owner });
        log::debug!("{owner:?} bomb {id} placed at {pos}");
    }

    /// Take the events raised since the previous call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Owned read-only view for renderers
    pub fn snapshot(&self) -> Frame {
        Frame {
            tick: self.time_ticks,
            width: self.grid.width(),
            height: self.grid.height(),
            cells: self.grid.cells().to_vec(),
            player: PlayerView {
                pos: self.player.pos(),
                alive: self.player.is_alive(),
                lives: self.player.lives(),
                bombs: self.player.actor.bomb_count(),
                max_bombs: self.player.actor.max_bombs(),
                range: self.player.bomb_range(),
            },
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyView {
                    pos: e.pos(),
                    alive: e.is_alive(),
                })
                .collect(),
            bombs: self
                .bombs
                .iter()
                .map(|b| BombView {
                    pos: b.pos,
                    range: b.range,
                    remaining_fuse: b.remaining_fuse(),
                })
                .collect(),
            powerups: self
                .powerups
                .iter()
                .filter(|p| !p.collected)
                .map(|p| PowerUpView {
                    pos: p.pos,
                    kind: p.kind,
                })
                .collect(),
            outcome: match self.phase {
                GamePhase::Running => Outcome::None,
                GamePhase::Victorious => Outcome::Victory,
                GamePhase::Defeated => Outcome::Defeat,
            },
        }
    }
}

/// Terminal flag as seen by renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    None,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: IVec2,
    pub alive: bool,
    pub lives: u32,
    pub bombs: u32,
    pub max_bombs: u32,
    pub range: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub pos: IVec2,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BombView {
    pub pos: IVec2,
    pub range: i32,
    pub remaining_fuse: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpView {
    pub pos: IVec2,
    pub kind: PowerUpKind,
}

/// One render-feed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    /// Row-major cell tags
    pub cells: Vec<Cell>,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub bombs: Vec<BombView>,
    pub powerups: Vec<PowerUpView>,
    pub outcome: Outcome,
}

impl Frame {
    pub fn cell(&self, pos: IVec2) -> Cell {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return Cell::Wall;
        }
        self.cells[(pos.y * self.width + pos.x) as usize]
    }
}
