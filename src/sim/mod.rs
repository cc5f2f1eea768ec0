//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Randomness only through the generator handed to [`tick`]
//! - Entities owned by value inside [`GameState`]
//! - No rendering, input or audio dependencies

pub mod actor;
pub mod ai;
pub mod bomb;
pub mod grid;
pub mod state;
pub mod tick;

pub use actor::{Actor, Direction, Enemy, Player};
pub use ai::{Brain, Intent};
pub use bomb::{Bomb, Owner};
pub use grid::{Cell, Grid, SafeZone};
pub use state::{
    BombView, EnemyView, Frame, GameEvent, GamePhase, GameState, Outcome, PlayerView, PowerUp,
    PowerUpKind, PowerUpView,
};
pub use tick::{TickInput, tick};
