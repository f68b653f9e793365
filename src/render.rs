//! Read-only per-frame view for the render collaborator
//!
//! The renderer draws whatever is in here and mutates nothing. Geometry
//! is in world units; subtract `camera_x` for screen space.

use glam::Vec2;

use crate::sim::{Collectible, GamePhase, Obstacle, PowerUp};

/// Avatar pose and extents
#[derive(Debug, Clone, Copy)]
pub struct AvatarPose {
    pub pos: Vec2,
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
}

/// Power-up sub-phase flags the renderer may visualize
#[derive(Debug, Clone, Copy)]
pub struct PowerUpView {
    pub active: bool,
    pub slowdown_active: bool,
    pub invincibility_pipes_left: u32,
    pub safe_zone_active: bool,
    pub grace_pipe_allowed: bool,
    pub grace_pipe_used: bool,
}

impl From<&PowerUp> for PowerUpView {
    fn from(p: &PowerUp) -> Self {
        Self {
            active: p.active,
            slowdown_active: p.slowdown_active,
            invincibility_pipes_left: p.invincibility_pipes_left,
            safe_zone_active: p.safe_zone_active,
            grace_pipe_allowed: p.grace_pipe_allowed,
            grace_pipe_used: p.grace_pipe_used,
        }
    }
}

/// Everything the render collaborator needs for one frame
#[derive(Debug)]
pub struct FrameSnapshot<'a> {
    pub phase: GamePhase,
    pub score: u32,
    pub best: u32,
    pub camera_x: f32,
    pub ground_y: f32,
    pub pipe_w: f32,
    pub avatar: AvatarPose,
    pub obstacles: &'a [Obstacle],
    pub collectibles: &'a [Collectible],
    pub speed_multiplier: f32,
    pub powerup: PowerUpView,
}
