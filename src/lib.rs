//! Blast Arena - a tile-grid bomb arena
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (grid, bombs, actors, enemy AI, game state)
//! - `tuning`: Data-driven game balance
//! - `audio`: Sound cues for simulation events

pub mod audio;
pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

/// Game loop constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}
