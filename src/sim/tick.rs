//! Per-tick simulation advance
//!
//! One entry point drives the whole sim in a fixed order every tick:
//! jump → gravity → position and camera → obstacle spawn/update →
//! collectible update → power-up phase advance → collision check →
//! scoring. Timed phases compare the sim clock against stored start
//! times inside this path; nothing runs off host timers.

use rand::Rng;

use crate::tuning::Tuning;

use super::collision;
use super::field;
use super::physics::{self, BoundsHit};
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// A completed press/release pair: hold duration in milliseconds
    pub jump: Option<f32>,
    /// Raw press this frame; starts a run from the menu and restarts
    /// after game over
    pub press: bool,
}

/// Advance the game state by one tick with the given delta factor
/// (1.0 = one nominal frame).
pub fn tick(state: &mut GameState, input: &TickInput, t: &Tuning, dt: f32) {
    match state.phase {
        // Scheduling continues while paused; state does not advance, so
        // resume is instantaneous and timed phases stay frozen.
        GamePhase::Paused => {}
        GamePhase::Menu => menu_tick(state, input, t, dt),
        GamePhase::GameOver => game_over_tick(state, input, t, dt),
        GamePhase::Playing => playing_tick(state, input, t, dt),
    }
}

fn menu_tick(state: &mut GameState, input: &TickInput, t: &Tuning, dt: f32) {
    state.time += dt as f64 * t.frame_secs;
    // Idle bob while waiting for the first press
    state.avatar.pos.y = t.ground_y() * 0.45
        + (state.time as f32 * t.menu_bob_rate).sin() * t.menu_bob_amp;

    if input.press {
        state.phase = GamePhase::Playing;
        let now = state.time;
        if physics::apply_jump(&mut state.avatar, 0.0, now, t) {
            state.push_event(GameEvent::Jump);
        }
        log::info!("run started (seed {})", state.seed);
    }
}

fn game_over_tick(state: &mut GameState, input: &TickInput, t: &Tuning, dt: f32) {
    state.time += dt as f64 * t.frame_secs;

    // Tumble to the ground under the game-over panel
    if state.avatar.pos.y + t.avatar_h / 2.0 < t.ground_y() {
        physics::apply_gravity(&mut state.avatar, t, dt);
        physics::integrate(&mut state.avatar, t, dt);
        if state.avatar.pos.y + t.avatar_h / 2.0 >= t.ground_y() {
            state.avatar.pos.y = t.ground_y() - t.avatar_h / 2.0;
            state.avatar.vel = 0.0;
        }
    }

    // Restart is gated by a minimum delay to avoid accidental replays
    let gate_open = state
        .game_over_at
        .is_some_and(|at| state.time - at >= t.restart_delay_secs);
    if input.press && gate_open {
        let seed = state.rng.random::<u64>();
        state.reset_run(seed, t);
        let now = state.time;
        if physics::apply_jump(&mut state.avatar, 0.0, now, t) {
            state.push_event(GameEvent::Jump);
        }
        log::info!("restarted with seed {seed}");
    }
}

fn playing_tick(state: &mut GameState, input: &TickInput, t: &Tuning, dt: f32) {
    state.time += dt as f64 * t.frame_secs;
    let now = state.time;

    if let Some(hold_ms) = input.jump {
        if physics::apply_jump(&mut state.avatar, hold_ms, now, t) {
            state.push_event(GameEvent::Jump);
        }
    }

    physics::apply_gravity(&mut state.avatar, t, dt);
    physics::integrate(&mut state.avatar, t, dt);

    // Forward progress substitutes for camera motion
    let speed = t.speed(state.score) * state.powerup.speed_multiplier(now, t);
    state.avatar.pos.x += speed * dt;
    state.camera_x = state.avatar.pos.x - t.avatar_lead;

    field::update_obstacles(state, t, dt);
    field::update_collectibles(state, t, dt);

    let clear = !collision::any_horizontal_overlap(&state.avatar, &state.obstacles, t);
    state.powerup.advance(now, clear, t, &mut state.events);

    // Ground/ceiling is evaluated independently of pipe collision and is
    // also suppressed while any invincibility phase is live
    let mut terminal = false;
    if physics::check_bounds(&state.avatar, t) != BoundsHit::None {
        if state.powerup.collision_immune() {
            physics::clamp_to_bounds(&mut state.avatar, t);
        } else {
            terminal = true;
        }
    }
    if !terminal {
        terminal = collision::resolve(&state.avatar, &state.obstacles, &mut state.powerup, t);
    }

    if terminal {
        state.push_event(GameEvent::Collision);
        state.phase = GamePhase::GameOver;
        state.game_over_at = Some(now);
        log::info!("game over at score {}", state.score);
        return;
    }

    field::score_passes(state, t);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DeviceProfile;
    use crate::sim::state::{Obstacle, ObstacleKind};

    fn tuning() -> Tuning {
        Tuning::new(800.0, 480.0, DeviceProfile::Desktop)
    }

    fn start_run(state: &mut GameState, t: &Tuning) {
        tick(
            state,
            &TickInput {
                press: true,
                jump: None,
            },
            t,
            1.0,
        );
        assert_eq!(state.phase, GamePhase::Playing);
    }

    /// Keep the avatar alive by re-centering it in front of nothing.
    fn hover(state: &mut GameState, t: &Tuning) {
        state.avatar.pos.y = t.ground_y() * 0.45;
        state.avatar.vel = 0.0;
    }

    #[test]
    fn menu_press_starts_playing() {
        let t = tuning();
        let mut state = GameState::new(1, &t);
        assert_eq!(state.phase, GamePhase::Menu);
        start_run(&mut state, &t);
        assert!(state.events.contains(&GameEvent::Jump));
    }

    #[test]
    fn paused_state_does_not_advance() {
        let t = tuning();
        let mut state = GameState::new(2, &t);
        start_run(&mut state, &t);
        state.phase = GamePhase::Paused;

        let before_time = state.time;
        let before_x = state.avatar.pos.x;
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), &t, 1.0);
        }
        assert_eq!(state.time, before_time);
        assert_eq!(state.avatar.pos.x, before_x);
        assert_eq!(state.phase, GamePhase::Paused);
    }

    #[test]
    fn ground_hit_ends_run() {
        let t = tuning();
        let mut state = GameState::new(3, &t);
        start_run(&mut state, &t);

        for _ in 0..2000 {
            tick(&mut state, &TickInput::default(), &t, 1.0);
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::Collision));
        assert!(state.game_over_at.is_some());
    }

    #[test]
    fn restart_is_gated_then_resets_fully() {
        let t = tuning();
        let mut state = GameState::new(4, &t);
        start_run(&mut state, &t);
        state.score = 17;
        state.pattern.band_streak = 2;
        state.powerup.grace_pipe_allowed = true;
        state.phase = GamePhase::GameOver;
        state.game_over_at = Some(state.time);

        // Immediate press: swallowed by the gate
        tick(
            &mut state,
            &TickInput {
                press: true,
                jump: None,
            },
            &t,
            1.0,
        );
        assert_eq!(state.phase, GamePhase::GameOver);

        // Wait out the gate, then restart
        let gate_ticks = (t.restart_delay_secs / t.frame_secs).ceil() as usize + 1;
        for _ in 0..gate_ticks {
            tick(&mut state, &TickInput::default(), &t, 1.0);
        }
        tick(
            &mut state,
            &TickInput {
                press: true,
                jump: None,
            },
            &t,
            1.0,
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert!(state.obstacles.is_empty());
        assert!(state.pattern.last_opening.is_none());
        assert_eq!(state.pattern.band_streak, 0);
        assert!(!state.powerup.grace_pipe_allowed);
        assert!(!state.powerup.slowdown_active);
        assert_eq!(state.powerup.invincibility_pipes_left, 0);
    }

    #[test]
    fn identical_seed_and_inputs_replay_identically() {
        let t = tuning();
        let run = || {
            let mut state = GameState::new(99, &t);
            start_run(&mut state, &t);
            for i in 0..240 {
                let input = TickInput {
                    jump: if i % 19 == 0 { Some(80.0) } else { None },
                    press: false,
                };
                let dt = if i % 4 == 0 { 0.9 } else { 1.05 };
                tick(&mut state, &input, &t, dt);
            }
            (
                state.score,
                state.avatar.pos,
                state.phase,
                state.obstacles.len(),
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn boost_multiplies_forward_speed() {
        let t = tuning();
        let mut state = GameState::new(5, &t);
        start_run(&mut state, &t);
        state.obstacles.clear();
        state.powerup.active = true;
        state.powerup.activated_at = state.time;

        hover(&mut state, &t);
        let x0 = state.avatar.pos.x;
        tick(&mut state, &TickInput::default(), &t, 1.0);
        let boosted = state.avatar.pos.x - x0;

        let mut plain = GameState::new(5, &t);
        start_run(&mut plain, &t);
        plain.obstacles.clear();
        hover(&mut plain, &t);
        let x1 = plain.avatar.pos.x;
        tick(&mut plain, &TickInput::default(), &t, 1.0);
        let normal = plain.avatar.pos.x - x1;

        assert!((boosted / normal - t.boost_mult).abs() < 0.01);
    }

    #[test]
    fn grace_pipe_survives_first_obstacle_after_boost() {
        let t = tuning();
        let mut state = GameState::new(6, &t);
        start_run(&mut state, &t);
        state.score = 10;

        // Boost just expired, all obstacles cleared away: deactivation
        // fires on the next tick
        state.powerup.active = true;
        state.powerup.activated_at = state.time - t.boost_secs - 0.1;
        state.obstacles.clear();
        hover(&mut state, &t);
        tick(&mut state, &TickInput::default(), &t, 1.0);
        assert!(!state.powerup.active);
        assert!(state.powerup.grace_pipe_allowed);
        assert!(!state.powerup.grace_pipe_used);

        // Burn through the invincibility pipes without overlap
        state.powerup.invincibility_pipes_left = 0;

        // Drop an otherwise-fatal obstacle right on the avatar
        let deadly = Obstacle {
            kind: ObstacleKind::Full,
            x: state.avatar.pos.x - t.pipe_w / 2.0 + t.speed(state.score),
            gap_center: state.avatar.pos.y + 300.0,
            gap: t.gap_min,
            scored: false,
            osc: None,
        };
        state.obstacles.push(deadly);
        hover(&mut state, &t);
        tick(&mut state, &TickInput::default(), &t, 1.0);

        assert_eq!(state.phase, GamePhase::Playing, "grace pipe must save the run");
        assert!(state.powerup.grace_pipe_used);
    }

    #[test]
    fn safe_zone_holds_off_spawns_then_releases() {
        let t = tuning();
        let mut state = GameState::new(7, &t);
        start_run(&mut state, &t);
        state.obstacles.clear();
        state.powerup.safe_zone_active = true;
        state.powerup.safe_zone_until = state.time + t.safe_zone_secs;
        state.powerup.invincibility_pipes_left = t.invincibility_pipes;

        let window_ticks = (t.safe_zone_secs / t.frame_secs) as usize - 2;
        for _ in 0..window_ticks {
            hover(&mut state, &t);
            tick(&mut state, &TickInput::default(), &t, 1.0);
            assert!(
                state.obstacles.is_empty(),
                "no spawns for the full safe-zone window"
            );
        }

        // Past the window the normal trigger refills the field
        for _ in 0..8 {
            hover(&mut state, &t);
            tick(&mut state, &TickInput::default(), &t, 1.0);
        }
        assert!(!state.obstacles.is_empty());
    }
}
