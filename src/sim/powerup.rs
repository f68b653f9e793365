//! Collectible-triggered power-up state machine
//!
//! One instance per session. A pickup engages a speed boost for a fixed
//! duration; when the boost ends (deferred until the avatar is clear of
//! every obstacle) four tail phases begin together and wind down
//! independently: an eased slowdown back to 1x, an obstacle-counted
//! extended invincibility, a timed safe zone that suppresses spawning,
//! and a one-shot grace pipe. All phases are advanced against the sim
//! clock, exactly once per tick; there are no host timers.

use serde::{Deserialize, Serialize};

use crate::ease_out_cubic;
use crate::tuning::Tuning;

use super::state::GameEvent;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUp {
    /// Boost engaged
    pub active: bool,
    pub activated_at: f64,
    /// Boost duration elapsed but the avatar was not yet clear of all
    /// obstacles; re-tested each tick
    pub pending_deactivation: bool,

    /// Eased decay of the speed multiplier back to 1
    pub slowdown_active: bool,
    pub slowdown_started_at: f64,

    /// Obstacles that may still be passed with collisions ignored
    pub invincibility_pipes_left: u32,

    /// No new obstacles spawn while this window is open
    pub safe_zone_active: bool,
    pub safe_zone_until: f64,

    /// Sim time the boost ended; drives the wide-spacing recovery window
    pub deactivated_at: Option<f64>,

    /// The first obstacle after the boost ends cannot be fatal
    pub grace_pipe_allowed: bool,
    pub grace_pipe_used: bool,
}

impl PowerUp {
    /// Engage the boost. The collectible spawner guarantees no pickup can
    /// occur while one is already active.
    pub fn activate(&mut self, now: f64, events: &mut Vec<GameEvent>) {
        self.active = true;
        self.activated_at = now;
        self.pending_deactivation = false;
        events.push(GameEvent::PowerupStart);
        log::info!("power-up activated at t={now:.2}");
    }

    /// Advance every live phase by one tick.
    ///
    /// `avatar_clear` is true when the avatar has no horizontal overlap
    /// with any obstacle; deactivation waits for it.
    pub fn advance(&mut self, now: f64, avatar_clear: bool, t: &Tuning, events: &mut Vec<GameEvent>) {
        if self.active && !self.pending_deactivation && now - self.activated_at >= t.boost_secs {
            self.pending_deactivation = true;
        }
        if self.active && self.pending_deactivation && avatar_clear {
            self.deactivate(now, t, events);
        }
        if self.slowdown_active && now - self.slowdown_started_at >= t.slowdown_secs {
            self.slowdown_active = false;
        }
        if self.safe_zone_active && now >= self.safe_zone_until {
            self.safe_zone_active = false;
        }
    }

    fn deactivate(&mut self, now: f64, t: &Tuning, events: &mut Vec<GameEvent>) {
        self.active = false;
        self.pending_deactivation = false;
        self.grace_pipe_allowed = true;
        self.grace_pipe_used = false;
        self.slowdown_active = true;
        self.slowdown_started_at = now;
        self.invincibility_pipes_left = t.invincibility_pipes;
        self.safe_zone_active = true;
        self.safe_zone_until = now + t.safe_zone_secs;
        self.deactivated_at = Some(now);
        events.push(GameEvent::PowerupEnd);
        log::info!(
            "power-up deactivated at t={now:.2}, {} grace pipes",
            self.invincibility_pipes_left
        );
    }

    /// Current speed multiplier. Exactly one of the boost or the slowdown
    /// drives it; outside both it is exactly 1.
    pub fn speed_multiplier(&self, now: f64, t: &Tuning) -> f32 {
        if self.active {
            t.boost_mult
        } else if self.slowdown_active {
            let progress = ((now - self.slowdown_started_at) / t.slowdown_secs).clamp(0.0, 1.0);
            1.0 + (t.boost_mult - 1.0) * (1.0 - ease_out_cubic(progress as f32))
        } else {
            1.0
        }
    }

    /// Whether pipe collisions are ignored this tick.
    #[inline]
    pub fn collision_immune(&self) -> bool {
        self.active || self.invincibility_pipes_left > 0
    }

    #[inline]
    pub fn grace_available(&self) -> bool {
        self.grace_pipe_allowed && !self.grace_pipe_used
    }

    pub fn consume_grace(&mut self) {
        self.grace_pipe_used = true;
        log::debug!("grace pipe consumed");
    }

    /// Called once per scored obstacle; counts the invincibility budget
    /// down (obstacle-counted, never time-based).
    pub fn on_obstacle_scored(&mut self) {
        self.invincibility_pipes_left = self.invincibility_pipes_left.saturating_sub(1);
    }

    /// Wide-spacing recovery window after the boost ends.
    pub fn recovery_active(&self, now: f64, t: &Tuning) -> bool {
        self.deactivated_at
            .is_some_and(|ended| now - ended < t.recovery_secs)
    }
}
