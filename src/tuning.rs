//! Data-driven game balance, scaled to the viewport
//!
//! Every gameplay constant that depends on screen size is derived here from
//! a single scale factor (viewport height / nominal height), so the same
//! core runs identically across device profiles. This is the one
//! parameterized replacement for per-device loop variants: the profile
//! only changes numbers, never code paths.

use crate::consts::NOMINAL_HEIGHT;
use crate::lerp;
use crate::settings::DeviceProfile;

/// Viewport-scaled gameplay constants for one device profile.
///
/// Values are authored against a 480-unit-tall reference viewport and
/// multiplied by `scale`. Velocities are per nominal frame (a delta factor
/// of 1.0), accelerations per nominal frame squared.
#[derive(Debug, Clone)]
pub struct Tuning {
    pub profile: DeviceProfile,
    pub width: f32,
    pub height: f32,
    pub scale: f32,

    /// Target callback cadence for the frame driver
    pub target_hz: f32,
    /// Seconds of sim time one nominal frame represents
    pub frame_secs: f64,

    /// Ground strip height; the playable sky ends above it
    pub ground_h: f32,

    // === Avatar ===
    pub avatar_w: f32,
    pub avatar_h: f32,
    /// Horizontal offset of the avatar from the camera's left edge
    pub avatar_lead: f32,

    // === Physics ===
    pub gravity: f32,
    /// Jump impulse for a zero-length tap (negative = upward)
    pub jump_impulse_min: f32,
    /// Jump impulse at the full hold duration
    pub jump_impulse_max: f32,
    /// Hold duration that maps to the maximum impulse
    pub jump_hold_max_ms: f32,
    /// Re-trigger lockout between jumps
    pub jump_cooldown_secs: f64,
    /// Rotation clamp while rising (negative) and falling; falling is
    /// clamped tighter to keep descent visually vertical
    pub rot_rise_max: f32,
    pub rot_fall_max: f32,
    pub rot_per_vel: f32,

    // === Scrolling ===
    pub scroll_speed: f32,
    /// Fractional speed increase at full difficulty
    pub speed_ramp: f32,

    // === Obstacles ===
    pub pipe_w: f32,
    pub gap_base: f32,
    pub gap_min: f32,
    /// Fractional gap shrink at full difficulty
    pub gap_shrink: f32,
    /// Gap-center clearance from the ceiling and the ground
    pub vertical_margin: f32,
    /// How far behind the camera an obstacle must scroll before retirement
    pub retire_margin: f32,

    // === Spacing ===
    pub spacing_jitter: f32,
    pub recovery_spacing_mult: f32,
    /// Recovery window after a power-up ends during which spacing widens
    pub recovery_secs: f64,
    pub profile_spacing_mult: f32,
    /// Spacing between obstacles inside one cluster, as a fraction of the
    /// cluster-to-cluster spacing
    pub intra_cluster_spacing: f32,

    // === Vertical placement ===
    pub lane_count: u32,
    pub lane_pull_early: f32,
    pub lane_pull_late: f32,
    /// Score at which lane pull fades to its late value
    pub lane_fade_score: u32,
    pub first_opening_jitter: f32,
    pub zigzag_enter_chance: f64,
    pub zigzag_exit_chance: f64,
    /// Normalized distance from center beyond which drift correction kicks in
    pub drift_limit: f32,
    pub drift_pull: f32,

    // === Obstacle kinds ===
    pub nonfull_min_score: u32,
    pub nonfull_ramp: f32,
    pub nonfull_cap: f32,
    /// Damping applied to the non-Full chance right after a non-Full kind
    pub nonfull_repeat_damp: f32,
    pub moving_min_score: u32,
    pub moving_chance: f64,
    /// Oscillation amplitude as a fraction of the playable range
    pub moving_amp: f32,
    pub moving_speed: f32,

    // === Collectibles ===
    pub collectible_chance: f64,
    pub collectible_cooldown_secs: f64,
    pub collectible_radius: f32,

    // === Collision forgiveness ===
    pub forgive_margin: f32,
    pub corner_radius: f32,
    /// Extra radius at the top pipe's trailing corner
    pub exit_corner_scale: f32,

    // === Power-up ===
    pub boost_mult: f32,
    pub boost_secs: f64,
    pub slowdown_secs: f64,
    pub invincibility_pipes: u32,
    pub safe_zone_secs: f64,

    // === Session ===
    pub restart_delay_secs: f64,
    pub menu_bob_amp: f32,
    pub menu_bob_rate: f32,
}

impl Tuning {
    pub fn new(width: f32, height: f32, profile: DeviceProfile) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let scale = height / NOMINAL_HEIGHT;

        let (target_hz, forgive, corner, spacing_mult) = match profile {
            DeviceProfile::Desktop => (60.0_f32, 2.0, 7.0, 1.0),
            DeviceProfile::Mobile => (60.0, 2.5, 8.0, 1.0),
            DeviceProfile::Constrained => (45.0, 3.0, 8.5, 1.15),
        };

        Self {
            profile,
            width,
            height,
            scale,
            target_hz,
            frame_secs: 1.0 / target_hz as f64,
            ground_h: (height * 0.12).clamp(24.0, 96.0),

            avatar_w: 34.0 * scale,
            avatar_h: 24.0 * scale,
            avatar_lead: (width * 0.28).max(40.0),

            gravity: 0.3 * scale,
            jump_impulse_min: -8.0 * scale,
            jump_impulse_max: -11.5 * scale,
            jump_hold_max_ms: 300.0,
            jump_cooldown_secs: 0.15,
            rot_rise_max: -0.55,
            rot_fall_max: 0.35,
            rot_per_vel: 0.07,

            scroll_speed: 2.6 * scale,
            speed_ramp: 0.25,

            pipe_w: 56.0 * scale,
            gap_base: 150.0 * scale,
            gap_min: 110.0 * scale,
            gap_shrink: 0.3,
            vertical_margin: 48.0 * scale,
            retire_margin: 120.0 * scale,

            spacing_jitter: 0.15,
            recovery_spacing_mult: 1.8,
            recovery_secs: 6.0,
            profile_spacing_mult: spacing_mult,
            intra_cluster_spacing: 0.55,

            lane_count: 4,
            lane_pull_early: 0.6,
            lane_pull_late: 0.15,
            lane_fade_score: 30,
            first_opening_jitter: 0.2,
            zigzag_enter_chance: 0.07,
            zigzag_exit_chance: 0.35,
            drift_limit: 0.38,
            drift_pull: 0.25,

            nonfull_min_score: 10,
            nonfull_ramp: 0.01,
            nonfull_cap: 0.30,
            nonfull_repeat_damp: 0.35,
            moving_min_score: 15,
            moving_chance: 0.06,
            moving_amp: 0.18,
            moving_speed: 0.9 * scale,

            collectible_chance: 0.12,
            collectible_cooldown_secs: 18.0,
            collectible_radius: 18.0 * scale,

            forgive_margin: forgive * scale,
            corner_radius: corner * scale,
            exit_corner_scale: 1.5,

            boost_mult: 5.0,
            boost_secs: 6.5,
            slowdown_secs: 2.5,
            invincibility_pipes: 3,
            safe_zone_secs: 3.0,

            restart_delay_secs: 0.6,
            menu_bob_amp: 6.0 * scale,
            menu_bob_rate: 3.0,
        }
    }

    /// Recompute all scale-dependent values for a new viewport size.
    pub fn resize(&mut self, width: f32, height: f32) {
        *self = Self::new(width, height, self.profile);
    }

    /// Top of the ground strip; the playable sky is `[0, ground_y)`.
    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.height - self.ground_h
    }

    /// Bounds for obstacle opening centers, with the safety margin applied.
    pub fn opening_bounds(&self) -> (f32, f32) {
        let lo = self.vertical_margin;
        let hi = (self.ground_y() - self.vertical_margin).max(lo + 1.0);
        (lo, hi)
    }

    /// Difficulty in `[0, 0.8]`, driven by score.
    pub fn difficulty(&self, score: u32) -> f32 {
        (score as f32 * 0.016).min(0.8)
    }

    /// Gap size for the given score; shrinks with difficulty but never
    /// below the hard floor.
    pub fn gap(&self, score: u32) -> f32 {
        let shrunk = self.gap_base * (1.0 - self.gap_shrink * self.difficulty(score));
        shrunk.max(self.gap_min)
    }

    /// Cluster-to-cluster base spacing for the current viewport.
    pub fn spacing_base(&self) -> f32 {
        (self.width * 0.45).max(self.pipe_w * 3.0) * self.profile_spacing_mult
    }

    /// Scroll speed for the given score (before the power-up multiplier).
    pub fn speed(&self, score: u32) -> f32 {
        self.scroll_speed * (1.0 + self.speed_ramp * self.difficulty(score))
    }

    /// Peak height gained by a maximum-impulse jump; bounds how far one
    /// opening may move from the previous one.
    pub fn jump_reach(&self) -> f32 {
        (self.jump_impulse_max * self.jump_impulse_max) / (2.0 * self.gravity)
    }

    /// Largest allowed opening delta for the given score, in viewport units.
    pub fn opening_delta_cap(&self, score: u32) -> f32 {
        let d = self.difficulty(score);
        self.jump_reach() * lerp(0.5, 1.0, d / 0.8)
    }
}
