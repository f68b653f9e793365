//! Procedural obstacle field
//!
//! Owns spawning, vertical placement, kind selection, clustering,
//! collectible placement, retirement and scoring. Placement runs a
//! pipeline of heuristics over a normalized opening height (0 = top of
//! the playable range, 1 = bottom): difficulty-bounded deltas, early lane
//! blending, anti-same-level enforcement, zig-zag runs, a band-repeat
//! guard and center-drift correction. Two invariants hold for every
//! spawn after the first: consecutive openings differ by at least 15% of
//! the playable range, and no band repeats more than three times in a row.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{BAND_MAX_STREAK, MAX_COLLECTIBLES, MAX_OBSTACLES, MIN_OPENING_SEPARATION};
use crate::lerp;
use crate::tuning::Tuning;

use super::state::{
    Band, Collectible, GameEvent, GameState, Obstacle, ObstacleKind, Oscillation, PatternState,
};

/// Advance moving pipes, spawn while the field would otherwise run dry,
/// then retire scrolled-out entries and enforce the hard cap.
pub fn update_obstacles(state: &mut GameState, t: &Tuning, dt: f32) {
    for obstacle in &mut state.obstacles {
        if let Some(osc) = &mut obstacle.osc {
            obstacle.gap_center += osc.dir * osc.speed * dt;
            if obstacle.gap_center >= osc.hi {
                obstacle.gap_center = osc.hi;
                osc.dir = -1.0;
            } else if obstacle.gap_center <= osc.lo {
                obstacle.gap_center = osc.lo;
                osc.dir = 1.0;
            }
        }
    }

    if !state.powerup.safe_zone_active {
        while needs_spawn(state, t) {
            spawn_cluster(state, t);
        }
    }

    retire(state, t);
}

/// The field never runs dry: spawn once the furthest obstacle is within
/// one screen width of the avatar.
fn needs_spawn(state: &GameState, t: &Tuning) -> bool {
    furthest_x(state)
        .map(|x| x < state.avatar.pos.x + t.width)
        .unwrap_or(true)
}

fn furthest_x(state: &GameState) -> Option<f32> {
    state
        .obstacles
        .iter()
        .map(|o| o.x)
        .fold(None, |acc: Option<f32>, x| Some(acc.map_or(x, |a| a.max(x))))
}

/// Spawn one cluster of 1-5 obstacles, plus the occasional collectible.
fn spawn_cluster(state: &mut GameState, t: &Tuning) {
    let spacing = cluster_spacing(state, t);
    let start_x = match furthest_x(state) {
        Some(x) => x + spacing,
        None => state.camera_x + t.width + t.pipe_w,
    };

    let count = cluster_size(&mut state.rng);
    let score = state.score;
    let (lo, hi) = t.opening_bounds();
    let range = hi - lo;
    let gap = t.gap(score);

    for i in 0..count {
        let x = start_x + i as f32 * spacing * t.intra_cluster_spacing;
        let tn = place_opening(&mut state.rng, &mut state.pattern, score, t);
        let kind = choose_kind(&mut state.rng, &mut state.pattern, score, t);
        let gap_center = (lo + tn * range).clamp(lo + gap / 2.0, hi - gap / 2.0);

        let osc = if kind == ObstacleKind::Moving {
            let amp = t.moving_amp * range;
            let osc_lo = (gap_center - amp).max(lo + gap / 2.0);
            let osc_hi = (gap_center + amp).min(hi - gap / 2.0);
            Some(Oscillation {
                lo: osc_lo,
                hi: osc_hi,
                dir: if state.rng.random_bool(0.5) { 1.0 } else { -1.0 },
                speed: t.moving_speed * (1.0 + t.speed_ramp * t.difficulty(score)),
            })
        } else {
            None
        };

        state.obstacles.push(Obstacle {
            kind,
            x,
            gap_center,
            gap,
            scored: false,
            osc,
        });
    }
    log::debug!("spawned cluster of {count} at x={start_x:.0}");

    maybe_spawn_collectible(state, t, start_x);
}

fn cluster_spacing(state: &mut GameState, t: &Tuning) -> f32 {
    let jitter = 1.0 + state.rng.random_range(-t.spacing_jitter..=t.spacing_jitter);
    let mut spacing = t.spacing_base() * jitter;
    if state.powerup.recovery_active(state.time, t) {
        spacing *= t.recovery_spacing_mult;
    }
    spacing
}

/// Cluster sizes are heavily skewed toward a single obstacle.
fn cluster_size(rng: &mut Pcg32) -> u32 {
    match rng.random_range(0.0..1.0_f32) {
        r if r < 0.62 => 1,
        r if r < 0.82 => 2,
        r if r < 0.92 => 3,
        r if r < 0.97 => 4,
        _ => 5,
    }
}

/// Compute the next opening height, normalized over the playable range,
/// and record it into the pattern state.
pub fn place_opening(rng: &mut Pcg32, pattern: &mut PatternState, score: u32, t: &Tuning) -> f32 {
    let (lo, hi) = t.opening_bounds();
    let range = hi - lo;

    let mut tn = match pattern.last_opening {
        // First obstacle: centered, moderate random offset
        None => 0.5 + rng.random_range(-1.0..=1.0_f32) * t.first_opening_jitter,
        // Bounded delta from the previous opening; the bound grows from
        // half the jump-reach cap toward the full cap with difficulty
        Some(prev) => {
            let cap = (t.opening_delta_cap(score) / range).min(0.9);
            prev + rng.random_range(-cap..=cap)
        }
    };

    // Early-session lane blending: pull toward discrete lanes hard at the
    // start, weakly later. Always a blend, never a hard snap.
    let fade = (score as f32 / t.lane_fade_score as f32).min(1.0);
    let pull = lerp(t.lane_pull_early, t.lane_pull_late, fade);
    tn = lerp(tn, nearest_lane(tn, t.lane_count), pull);

    // Anti-same-level: too close to the previous opening pushes toward
    // the opposite third
    if let Some(prev) = pattern.last_opening {
        if (tn - prev).abs() < MIN_OPENING_SEPARATION {
            let target = if prev >= 0.5 { 1.0 / 6.0 } else { 5.0 / 6.0 };
            tn = lerp(tn, target, 0.65);
        }
    }

    // Zig-zag mode: short sequences alternating high/low thirds
    if let Some(high) = pattern.zigzag_high_next {
        let target = if high { 5.0 / 6.0 } else { 1.0 / 6.0 };
        tn = lerp(tn, target, 0.6);
        pattern.zigzag_high_next = if rng.random_bool(t.zigzag_exit_chance) {
            None
        } else {
            Some(!high)
        };
    } else if rng.random_bool(t.zigzag_enter_chance) {
        pattern.zigzag_high_next = Some(rng.random_bool(0.5));
    }

    // Center-drift correction: pull extreme openings gently back
    if (tn - 0.5).abs() > t.drift_limit {
        tn = lerp(tn, 0.5, t.drift_pull);
    }

    tn = tn.clamp(0.0, 1.0);

    // Invariant reconciliation: the heuristics above make violations
    // rare, these two steps make them impossible.
    if let Some(prev) = pattern.last_opening {
        tn = enforce_separation(prev, tn);
        if let Some(last) = pattern.last_band {
            if pattern.band_streak >= BAND_MAX_STREAK && last == Band::of(tn) {
                tn = force_band_change(rng, last, prev);
            }
        }
    }

    let band = Band::of(tn);
    pattern.band_streak = if pattern.last_band == Some(band) {
        pattern.band_streak.saturating_add(1)
    } else {
        1
    };
    pattern.last_band = Some(band);
    pattern.last_opening = Some(tn);
    tn
}

fn nearest_lane(tn: f32, lanes: u32) -> f32 {
    (0..lanes)
        .map(|i| (i as f32 + 0.5) / lanes as f32)
        .min_by(|a, b| {
            (a - tn)
                .abs()
                .partial_cmp(&(b - tn).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(0.5)
}

/// Guarantee the minimum separation from the previous opening. The push
/// direction is whichever side of the previous opening has room.
fn enforce_separation(prev: f32, tn: f32) -> f32 {
    if (tn - prev).abs() >= MIN_OPENING_SEPARATION {
        return tn;
    }
    let dir = if prev >= 0.5 { -1.0 } else { 1.0 };
    (prev + dir * MIN_OPENING_SEPARATION * 1.15).clamp(0.0, 1.0)
}

/// Break a three-in-a-row band streak. Mid is the safety fallback; a mid
/// streak breaks toward whichever outer third is further from the
/// previous opening. The forced value keeps the separation invariant:
/// any point of a different band's center is at least a sixth of the
/// range away from any point in the repeated band.
fn force_band_change(rng: &mut Pcg32, repeated: Band, prev: f32) -> f32 {
    let jitter = rng.random_range(-0.01..=0.01_f32);
    let target = match repeated {
        Band::Low | Band::High => 0.5,
        Band::Mid => {
            if prev >= 0.5 {
                1.0 / 6.0
            } else {
                5.0 / 6.0
            }
        }
    };
    target + jitter
}

/// Non-Full kinds ramp in with score, stay a minority, and are biased
/// back toward Full after each non-Full spawn. The moving variant rolls
/// independently.
fn choose_kind(rng: &mut Pcg32, pattern: &mut PatternState, score: u32, t: &Tuning) -> ObstacleKind {
    if score >= t.moving_min_score && rng.random_bool(t.moving_chance) {
        pattern.last_kind_nonfull = false;
        return ObstacleKind::Moving;
    }
    if score < t.nonfull_min_score {
        pattern.last_kind_nonfull = false;
        return ObstacleKind::Full;
    }
    let mut chance = ((score - t.nonfull_min_score) as f32 * t.nonfull_ramp).min(t.nonfull_cap);
    if pattern.last_kind_nonfull {
        chance *= t.nonfull_repeat_damp;
    }
    if rng.random_bool(chance as f64) {
        pattern.last_kind_nonfull = true;
        if rng.random_bool(0.5) {
            ObstacleKind::TopOnly
        } else {
            ObstacleKind::BottomOnly
        }
    } else {
        pattern.last_kind_nonfull = false;
        ObstacleKind::Full
    }
}

/// Rare, cooldown-limited, and never while the boost is active.
fn maybe_spawn_collectible(state: &mut GameState, t: &Tuning, cluster_x: f32) {
    if state.powerup.active {
        return;
    }
    if let Some(last) = state.last_collectible_at {
        if state.time - last < t.collectible_cooldown_secs {
            return;
        }
    }
    if !state.rng.random_bool(t.collectible_chance) {
        return;
    }
    let anchor_gap = state
        .obstacles
        .iter()
        .rev()
        .find(|o| (o.x - cluster_x).abs() < 1.0)
        .map(|o| o.gap_center)
        .unwrap_or_else(|| t.ground_y() * 0.5);
    state.collectibles.push(Collectible {
        pos: Vec2::new(cluster_x - t.pipe_w, anchor_gap),
        phase: 0.0,
    });
    state.last_collectible_at = Some(state.time);
    log::debug!("collectible spawned ahead of x={cluster_x:.0}");
}

/// Animate collectibles and apply pickups.
pub fn update_collectibles(state: &mut GameState, t: &Tuning, dt: f32) {
    for c in &mut state.collectibles {
        c.phase += 0.15 * dt;
    }

    if !state.powerup.active {
        let avatar_pos = state.avatar.pos;
        let reach = t.collectible_radius + t.avatar_h / 2.0;
        let mut picked = false;
        state.collectibles.retain(|c| {
            if !picked && c.pos.distance_squared(avatar_pos) < reach * reach {
                picked = true;
                false
            } else {
                true
            }
        });
        if picked {
            let now = state.time;
            let events = &mut state.events;
            state.powerup.activate(now, events);
        }
    }
}

/// Retire scrolled-out entries and enforce the hard caps. Dropped excess
/// obstacles are presumed already resolved; scoring never depends on them.
fn retire(state: &mut GameState, t: &Tuning) {
    let cutoff = state.camera_x - t.retire_margin;
    state.obstacles.retain(|o| o.trailing_edge(t) > cutoff);
    state.collectibles.retain(|c| c.pos.x > cutoff);

    if state.obstacles.len() > MAX_OBSTACLES {
        let excess = state.obstacles.len() - MAX_OBSTACLES;
        state.obstacles.drain(..excess);
        log::debug!("obstacle cap hit, dropped {excess} oldest");
    }
    if state.collectibles.len() > MAX_COLLECTIBLES {
        let excess = state.collectibles.len() - MAX_COLLECTIBLES;
        state.collectibles.drain(..excess);
    }
}

/// Score each obstacle exactly once, the tick its trailing edge passes
/// the avatar's leading edge.
pub fn score_passes(state: &mut GameState, t: &Tuning) {
    let leading = state.avatar.leading_edge(t);
    for obstacle in &mut state.obstacles {
        if !obstacle.scored && obstacle.trailing_edge(t) < leading {
            obstacle.scored = true;
            state.score += 1;
            state.powerup.on_obstacle_scored();
            state.events.push(GameEvent::Score);
        }
    }
}
