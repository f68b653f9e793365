//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Delta-factor scaled integration only
//! - Seeded RNG only
//! - Timed phases compare the sim clock against stored start times
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod field;
pub mod physics;
pub mod powerup;
pub mod state;
pub mod tick;

pub use collision::{any_horizontal_overlap, horizontal_overlap, resolve};
pub use physics::BoundsHit;
pub use powerup::PowerUp;
pub use state::{
    Avatar, Band, Collectible, GameEvent, GamePhase, GameState, Obstacle, ObstacleKind,
    Oscillation, PatternState,
};
pub use tick::{TickInput, tick};
