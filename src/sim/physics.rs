//! Avatar physics: gravity, hold-scaled jump impulses, integration
//!
//! Everything is scaled by the delta factor, so trajectories are identical
//! regardless of the actual frame cadence.

use crate::lerp;
use crate::tuning::Tuning;

use super::state::Avatar;

/// Outcome of the vertical bounds check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsHit {
    None,
    Ceiling,
    Ground,
}

/// Accumulate gravity into the vertical velocity.
pub fn apply_gravity(avatar: &mut Avatar, t: &Tuning, dt: f32) {
    avatar.vel += t.gravity * dt;
}

/// Apply a jump impulse scaled by how long the input was held.
///
/// The impulse replaces the current velocity outright; a zero-length tap
/// yields the minimum impulse. Returns false when the re-trigger lockout
/// swallowed the jump.
pub fn apply_jump(avatar: &mut Avatar, hold_ms: f32, now: f64, t: &Tuning) -> bool {
    if let Some(last) = avatar.last_jump_at {
        if now - last < t.jump_cooldown_secs {
            return false;
        }
    }
    let strength = (hold_ms / t.jump_hold_max_ms).clamp(0.0, 1.0);
    avatar.vel = lerp(t.jump_impulse_min, t.jump_impulse_max, strength);
    avatar.last_jump_at = Some(now);
    true
}

/// Advance vertical position and derive the visual tilt.
///
/// Tilt clamps are asymmetric: descent is held closer to level than ascent
/// so falling reads as a vertical drop.
pub fn integrate(avatar: &mut Avatar, t: &Tuning, dt: f32) {
    avatar.pos.y += avatar.vel * dt;
    let tilt = (avatar.vel / t.scale) * t.rot_per_vel;
    avatar.rotation = tilt.clamp(t.rot_rise_max, t.rot_fall_max);
}

/// Test the avatar against the ceiling and the ground strip.
pub fn check_bounds(avatar: &Avatar, t: &Tuning) -> BoundsHit {
    let half_h = t.avatar_h / 2.0;
    if avatar.pos.y - half_h < 0.0 {
        BoundsHit::Ceiling
    } else if avatar.pos.y + half_h > t.ground_y() {
        BoundsHit::Ground
    } else {
        BoundsHit::None
    }
}

/// Clamp the avatar back into the playable band (invincible bound hits).
pub fn clamp_to_bounds(avatar: &mut Avatar, t: &Tuning) {
    let half_h = t.avatar_h / 2.0;
    avatar.pos.y = avatar.pos.y.clamp(half_h, t.ground_y() - half_h);
    if avatar.pos.y >= t.ground_y() - half_h {
        avatar.vel = avatar.vel.min(0.0);
    }
}
