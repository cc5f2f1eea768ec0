//! Player and enemy actors
//!
//! Both sides share one [`Actor`] body (position, alive flag, bomb economy).
//! [`Player`] adds lives and blast range; [`Enemy`] adds its AI brain.
//! Movement primitives are unconditional: legality is checked by the tick.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::ai::Brain;

/// Cardinal step direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit cell offset (y grows downward)
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}

/// Shared body of every actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub pos: IVec2,
    alive: bool,
    bombs: u32,
    max_bombs: u32,
}

impl Actor {
    pub fn new(pos: IVec2, max_bombs: u32) -> Self {
        Self {
            pos,
            alive: true,
            bombs: max_bombs,
            max_bombs,
        }
    }

    pub fn move_up(&mut self) {
        self.pos.y -= 1;
    }

    pub fn move_down(&mut self) {
        self.pos.y += 1;
    }

    pub fn move_left(&mut self) {
        self.pos.x -= 1;
    }

    pub fn move_right(&mut self) {
        self.pos.x += 1;
    }

    pub fn step(&mut self, dir: Direction) {
        match dir {
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark dead. Returns true only on the alive -> dead transition.
    pub fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    pub fn bomb_count(&self) -> u32 {
        self.bombs
    }

    pub fn max_bombs(&self) -> u32 {
        self.max_bombs
    }

    /// Set the placeable count, clamped to capacity
    pub fn set_bomb_count(&mut self, count: u32) {
        self.bombs = count.min(self.max_bombs);
    }

    pub fn can_place_bomb(&self) -> bool {
        self.bombs > 0
    }

    /// Spend one bomb; no-op when empty
    pub fn place_bomb(&mut self) {
        self.bombs = self.bombs.saturating_sub(1);
    }

    /// Hand one bomb back (clamped)
    pub fn return_bomb(&mut self) {
        self.set_bomb_count(self.bombs + 1);
    }

    fn raise_capacity(&mut self) {
        self.max_bombs += 1;
        self.bombs = self.max_bombs;
    }

    fn revive(&mut self, pos: IVec2) {
        self.pos = pos;
        self.alive = true;
        self.bombs = self.max_bombs;
    }
}

/// The human-controlled actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub actor: Actor,
    lives: u32,
    bomb_range: i32,
}

impl Player {
    pub fn new(pos: IVec2, lives: u32, max_bombs: u32, bomb_range: i32) -> Self {
        Self {
            actor: Actor::new(pos, max_bombs),
            lives,
            bomb_range,
        }
    }

    pub fn pos(&self) -> IVec2 {
        self.actor.pos
    }

    pub fn is_alive(&self) -> bool {
        self.actor.is_alive()
    }

    /// Kill the player; a life is lost only if they were alive
    pub fn kill(&mut self) -> bool {
        let died = self.actor.kill();
        if died {
            self.lives = self.lives.saturating_sub(1);
        }
        died
    }

    /// Back to `pos`, alive, with a full bomb count. Lives and upgrades stay.
    pub fn respawn(&mut self, pos: IVec2) {
        self.actor.revive(pos);
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn has_lives(&self) -> bool {
        self.lives > 0
    }

    pub fn add_life(&mut self) {
        self.lives += 1;
    }

    /// +1 capacity, refilling the current count
    pub fn increase_max_bombs(&mut self) {
        self.actor.raise_capacity();
    }

    pub fn bomb_range(&self) -> i32 {
        self.bomb_range
    }

    pub fn increase_bomb_range(&mut self) {
        self.bomb_range += 1;
    }
}

/// An autonomous opponent. Death is final.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub actor: Actor,
    pub brain: Brain,
}

impl Enemy {
    pub fn new(pos: IVec2, max_bombs: u32) -> Self {
        Self {
            actor: Actor::new(pos, max_bombs),
            brain: Brain::default(),
        }
    }

    pub fn pos(&self) -> IVec2 {
        self.actor.pos
    }

    pub fn is_alive(&self) -> bool {
        self.actor.is_alive()
    }

    pub fn kill(&mut self) -> bool {
        self.actor.kill()
    }
}
