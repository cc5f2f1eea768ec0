//! Timed bombs

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Which side placed a bomb. A tag only; bombs never point back at an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A placed bomb counting down to detonation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub id: u32,
    pub owner: Owner,
    pub pos: IVec2,
    pub range: i32,
    fuse: f32,
    elapsed: f32,
    exploded: bool,
}

impl Bomb {
    pub fn new(id: u32, owner: Owner, pos: IVec2, fuse: f32, range: i32) -> Self {
        Self {
            id,
            owner,
            pos,
            range,
            fuse,
            elapsed: 0.0,
            exploded: false,
        }
    }

    /// Burn `dt` seconds of fuse. Returns true once the bomb has gone off,
    /// and keeps returning true on every later call.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.exploded {
            return true;
        }
        self.elapsed += dt;
        if self.elapsed >= self.fuse {
            self.exploded = true;
        }
        self.exploded
    }

    pub fn has_exploded(&self) -> bool {
        self.exploded
    }

    /// Seconds until detonation; negative once past due
    pub fn remaining_fuse(&self) -> f32 {
        self.fuse - self.elapsed
    }
}
