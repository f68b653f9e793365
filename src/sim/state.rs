//! Game state and core simulation types
//!
//! All state that must be persisted for suspend/resume and determinism
//! lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::powerup::PowerUp;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, avatar bobbing in place
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused; rendering may continue, state does not advance
    Paused,
    /// Run ended; restart is gated by a short delay
    GameOver,
}

/// Discrete events emitted by the sim for the audio/analytics collaborators.
///
/// Names only, no payload; the embedder decides how to render them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jump,
    Score,
    Collision,
    PowerupStart,
    PowerupEnd,
}

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    /// World position; `x` increases monotonically while playing
    pub pos: Vec2,
    /// Vertical velocity, positive downward
    pub vel: f32,
    /// Visual tilt in radians, derived from velocity
    pub rotation: f32,
    /// Sim time of the last accepted jump (re-trigger lockout)
    pub last_jump_at: Option<f64>,
}

impl Avatar {
    pub fn new(t: &Tuning) -> Self {
        Self {
            pos: Vec2::new(t.avatar_lead, t.ground_y() * 0.45),
            vel: 0.0,
            rotation: 0.0,
            last_jump_at: None,
        }
    }

    /// Leading (right) edge of the avatar
    #[inline]
    pub fn leading_edge(&self, t: &Tuning) -> f32 {
        self.pos.x + t.avatar_w / 2.0
    }
}

/// Obstacle shape variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Top and bottom pipe with a passable gap between them
    #[default]
    Full,
    /// Top pipe only; fly under it
    TopOnly,
    /// Bottom pipe only; fly over it
    BottomOnly,
    /// Full pair whose gap oscillates vertically
    Moving,
}

/// Vertical oscillation parameters for `ObstacleKind::Moving`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Oscillation {
    pub lo: f32,
    pub hi: f32,
    /// +1 moving down, -1 moving up
    pub dir: f32,
    pub speed: f32,
}

/// A pipe obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// World x of the leading (left) edge
    pub x: f32,
    /// Center of the passable opening
    pub gap_center: f32,
    /// Opening height
    pub gap: f32,
    /// Set exactly once when the avatar passes the trailing edge
    pub scored: bool,
    #[serde(default)]
    pub osc: Option<Oscillation>,
}

impl Obstacle {
    /// Bottom edge of the top pipe (top of the opening)
    #[inline]
    pub fn gap_top(&self) -> f32 {
        self.gap_center - self.gap / 2.0
    }

    /// Top edge of the bottom pipe (bottom of the opening)
    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.gap_center + self.gap / 2.0
    }

    #[inline]
    pub fn trailing_edge(&self, t: &Tuning) -> f32 {
        self.x + t.pipe_w
    }

    #[inline]
    pub fn has_top_pipe(&self) -> bool {
        !matches!(self.kind, ObstacleKind::BottomOnly)
    }

    #[inline]
    pub fn has_bottom_pipe(&self) -> bool {
        !matches!(self.kind, ObstacleKind::TopOnly)
    }
}

/// A rare collectible that triggers the power-up when picked up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec2,
    /// Animation phase for the render collaborator
    pub phase: f32,
}

/// Vertical thirds of the playable range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    Low,
    Mid,
    High,
}

impl Band {
    /// Classify a normalized opening height (0 = top of playable range).
    pub fn of(tn: f32) -> Self {
        if tn < 1.0 / 3.0 {
            Band::Low
        } else if tn < 2.0 / 3.0 {
            Band::Mid
        } else {
            Band::High
        }
    }
}

/// Anti-repetition bookkeeping for obstacle placement.
///
/// Mutated only by the obstacle field's spawn path; reset on session start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternState {
    /// Previous opening height, normalized over the playable range
    pub last_opening: Option<f32>,
    pub last_band: Option<Band>,
    /// How many consecutive openings landed in `last_band`
    pub band_streak: u8,
    /// `Some` while zig-zag mode is active; the value is the next target
    /// (true = high third)
    pub zigzag_high_next: Option<bool>,
    /// Whether the previous obstacle was a non-Full kind
    pub last_kind_nonfull: bool,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Session RNG; all procedural draws flow through it
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Sim clock in seconds, advanced by the tick only
    pub time: f64,
    /// Obstacles passed this run
    pub score: u32,
    pub avatar: Avatar,
    /// Left edge of the visible world
    pub camera_x: f32,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub pattern: PatternState,
    pub powerup: PowerUp,
    /// Sim time of the last collectible spawn (rate limiting)
    pub last_collectible_at: Option<f64>,
    /// Sim time the run ended; gates restart
    pub game_over_at: Option<f64>,
    /// Events produced this tick, drained by the embedder
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh state in the menu phase.
    pub fn new(seed: u64, t: &Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            time: 0.0,
            score: 0,
            avatar: Avatar::new(t),
            camera_x: 0.0,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            pattern: PatternState::default(),
            powerup: PowerUp::default(),
            last_collectible_at: None,
            game_over_at: None,
            events: Vec::new(),
        }
    }

    /// Full reset for a new run; no state leaks across sessions.
    pub fn reset_run(&mut self, seed: u64, t: &Tuning) {
        *self = Self::new(seed, t);
        self.phase = GamePhase::Playing;
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DeviceProfile;

    fn tuning() -> Tuning {
        Tuning::new(800.0, 480.0, DeviceProfile::Desktop)
    }

    #[test]
    fn band_classification_thirds() {
        assert_eq!(Band::of(0.0), Band::Low);
        assert_eq!(Band::of(0.32), Band::Low);
        assert_eq!(Band::of(0.5), Band::Mid);
        assert_eq!(Band::of(0.67), Band::High);
        assert_eq!(Band::of(1.0), Band::High);
    }

    #[test]
    fn reset_clears_everything() {
        let t = tuning();
        let mut state = GameState::new(7, &t);
        state.score = 12;
        state.pattern.band_streak = 3;
        state.pattern.last_opening = Some(0.4);
        state.powerup.grace_pipe_allowed = true;
        state.obstacles.push(Obstacle {
            kind: ObstacleKind::Full,
            x: 100.0,
            gap_center: 200.0,
            gap: 140.0,
            scored: true,
            osc: None,
        });

        state.reset_run(9, &t);

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert!(state.obstacles.is_empty());
        assert!(state.pattern.last_opening.is_none());
        assert_eq!(state.pattern.band_streak, 0);
        assert!(!state.powerup.grace_pipe_allowed);
    }

    #[test]
    fn state_snapshot_round_trips() {
        let t = tuning();
        let state = GameState::new(42, &t);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, 42);
        assert_eq!(back.phase, GamePhase::Menu);
    }
}
