//! Collision detection with forgiveness margins and corner safe zones
//!
//! The avatar's box is shrunk by a forgiveness margin before any test, and
//! near-miss clips at the gap corners are forgiven by a distance-radius
//! test. The top pipe's trailing corner gets an enlarged radius: it is the
//! corner players clip most when exiting a gap on a rising arc.

use glam::Vec2;

use crate::tuning::Tuning;

use super::powerup::PowerUp;
use super::state::{Avatar, Obstacle};

/// Axis-aligned avatar box after the forgiveness margin is applied.
#[derive(Debug, Clone, Copy)]
struct HitBox {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

fn avatar_box(avatar: &Avatar, t: &Tuning) -> HitBox {
    let half_w = (t.avatar_w / 2.0 - t.forgive_margin).max(1.0);
    let half_h = (t.avatar_h / 2.0 - t.forgive_margin).max(1.0);
    HitBox {
        left: avatar.pos.x - half_w,
        right: avatar.pos.x + half_w,
        top: avatar.pos.y - half_h,
        bottom: avatar.pos.y + half_h,
    }
}

/// Whether the (forgiveness-shrunk) avatar box overlaps the obstacle's
/// horizontal extent.
pub fn horizontal_overlap(avatar: &Avatar, obstacle: &Obstacle, t: &Tuning) -> bool {
    let hb = avatar_box(avatar, t);
    hb.right > obstacle.x && hb.left < obstacle.trailing_edge(t)
}

/// Whether the avatar horizontally overlaps any obstacle (power-up
/// deactivation waits for this to be false).
pub fn any_horizontal_overlap(avatar: &Avatar, obstacles: &[Obstacle], t: &Tuning) -> bool {
    obstacles.iter().any(|o| horizontal_overlap(avatar, o, t))
}

/// Test the avatar against every horizontally-overlapping obstacle.
///
/// Grace-pipe consumption is evaluated before the invincibility skip, so
/// under simultaneous conditions the grace flag is the one consumed.
/// Returns true on a terminal collision.
pub fn resolve(avatar: &Avatar, obstacles: &[Obstacle], powerup: &mut PowerUp, t: &Tuning) -> bool {
    if powerup.grace_available() && any_horizontal_overlap(avatar, obstacles, t) {
        powerup.consume_grace();
        return false;
    }
    if powerup.collision_immune() {
        return false;
    }
    obstacles
        .iter()
        .filter(|o| horizontal_overlap(avatar, o, t))
        .any(|o| gap_violation(avatar, o, t))
}

/// Vertical test against one obstacle's opening, with corner safe zones.
fn gap_violation(avatar: &Avatar, obstacle: &Obstacle, t: &Tuning) -> bool {
    let hb = avatar_box(avatar, t);

    if obstacle.has_top_pipe() && hb.top < obstacle.gap_top() {
        let edge_y = obstacle.gap_top();
        let leading = Vec2::new(obstacle.x, edge_y);
        let trailing = Vec2::new(obstacle.trailing_edge(t), edge_y);
        let forgiven = in_safe_zone(avatar.pos, leading, t.corner_radius)
            || in_safe_zone(avatar.pos, trailing, t.corner_radius * t.exit_corner_scale);
        if !forgiven {
            return true;
        }
    }

    if obstacle.has_bottom_pipe() && hb.bottom > obstacle.gap_bottom() {
        let edge_y = obstacle.gap_bottom();
        let leading = Vec2::new(obstacle.x, edge_y);
        let trailing = Vec2::new(obstacle.trailing_edge(t), edge_y);
        let forgiven = in_safe_zone(avatar.pos, leading, t.corner_radius)
            || in_safe_zone(avatar.pos, trailing, t.corner_radius);
        if !forgiven {
            return true;
        }
    }

    false
}

#[inline]
fn in_safe_zone(center: Vec2, corner: Vec2, radius: f32) -> bool {
    center.distance_squared(corner) < radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DeviceProfile;
    use crate::sim::state::ObstacleKind;

    fn tuning() -> Tuning {
        Tuning::new(800.0, 480.0, DeviceProfile::Desktop)
    }

    fn obstacle(x: f32, gap_center: f32, gap: f32) -> Obstacle {
        Obstacle {
            kind: ObstacleKind::Full,
            x,
            gap_center,
            gap,
            scored: false,
            osc: None,
        }
    }

    fn avatar_at(t: &Tuning, x: f32, y: f32) -> Avatar {
        let mut a = Avatar::new(t);
        a.pos = Vec2::new(x, y);
        a
    }

    #[test]
    fn centered_in_gap_is_safe() {
        let t = tuning();
        let o = obstacle(200.0, 200.0, 140.0);
        let avatar = avatar_at(&t, 210.0, 200.0);
        let mut p = PowerUp::default();
        assert!(!resolve(&avatar, &[o], &mut p, &t));
    }

    #[test]
    fn top_pipe_hit_is_terminal() {
        let t = tuning();
        let o = obstacle(200.0, 200.0, 140.0);
        // Deep inside the top pipe, far from both corners
        let avatar = avatar_at(&t, 228.0, 80.0);
        let mut p = PowerUp::default();
        assert!(resolve(&avatar, &[o], &mut p, &t));
    }

    #[test]
    fn bottom_pipe_hit_is_terminal() {
        let t = tuning();
        let o = obstacle(200.0, 200.0, 140.0);
        let avatar = avatar_at(&t, 228.0, 330.0);
        let mut p = PowerUp::default();
        assert!(resolve(&avatar, &[o], &mut p, &t));
    }

    #[test]
    fn no_horizontal_overlap_no_collision() {
        let t = tuning();
        let o = obstacle(400.0, 200.0, 140.0);
        let avatar = avatar_at(&t, 100.0, 80.0);
        let mut p = PowerUp::default();
        assert!(!resolve(&avatar, &[o], &mut p, &t));
    }

    #[test]
    fn trailing_top_corner_zone_forgives_clip() {
        let t = tuning();
        let o = obstacle(200.0, 200.0, 140.0);
        let gap_top = o.gap_top();
        // Barely above the gap ceiling, hugging the trailing corner: inside
        // the enlarged exit zone
        let clip = t.forgive_margin + 2.0;
        let avatar = avatar_at(&t, o.trailing_edge(&t) - 1.0, gap_top + t.avatar_h / 2.0 - clip);
        let hb_top = avatar.pos.y - (t.avatar_h / 2.0 - t.forgive_margin);
        assert!(hb_top < gap_top, "test setup must actually clip the pipe");
        let mut p = PowerUp::default();
        assert!(!resolve(&avatar, &[o.clone()], &mut p, &t));

        // The same clip depth in the middle of the pipe is fatal
        let mid = avatar_at(&t, o.x + t.pipe_w / 2.0, avatar.pos.y - 40.0);
        assert!(resolve(&mid, &[o], &mut p, &t));
    }

    #[test]
    fn top_only_kind_is_passable_below() {
        let t = tuning();
        let mut o = obstacle(200.0, 150.0, 140.0);
        o.kind = ObstacleKind::TopOnly;
        // Flying low, where a Full obstacle's bottom pipe would sit
        let avatar = avatar_at(&t, 220.0, 350.0);
        let mut p = PowerUp::default();
        assert!(!resolve(&avatar, &[o], &mut p, &t));
    }

    #[test]
    fn bottom_only_kind_is_passable_above() {
        let t = tuning();
        let mut o = obstacle(200.0, 300.0, 140.0);
        o.kind = ObstacleKind::BottomOnly;
        let avatar = avatar_at(&t, 220.0, 60.0);
        let mut p = PowerUp::default();
        assert!(!resolve(&avatar, &[o], &mut p, &t));
    }

    #[test]
    fn invincibility_pipes_skip_all_tests() {
        let t = tuning();
        let o = obstacle(200.0, 200.0, 140.0);
        let avatar = avatar_at(&t, 228.0, 80.0);
        let mut p = PowerUp::default();
        p.invincibility_pipes_left = 2;
        assert!(!resolve(&avatar, &[o], &mut p, &t));
    }

    #[test]
    fn grace_consumed_before_invincibility_skip() {
        let t = tuning();
        let o = obstacle(200.0, 200.0, 140.0);
        // Overlapping but safely inside the gap; grace still burns on the
        // first horizontal overlap
        let avatar = avatar_at(&t, 220.0, 200.0);
        let mut p = PowerUp::default();
        p.grace_pipe_allowed = true;
        p.invincibility_pipes_left = 3;

        assert!(!resolve(&avatar, &[o.clone()], &mut p, &t));
        assert!(p.grace_pipe_used);
        // Pipe budget untouched by grace consumption
        assert_eq!(p.invincibility_pipes_left, 3);

        // Second overlap: grace is spent, invincibility takes over
        assert!(!resolve(&avatar, &[o], &mut p, &t));
    }

    #[test]
    fn grace_pipe_saves_otherwise_fatal_overlap() {
        let t = tuning();
        let o = obstacle(200.0, 200.0, 140.0);
        let avatar = avatar_at(&t, 228.0, 80.0);
        let mut p = PowerUp::default();
        p.grace_pipe_allowed = true;

        assert!(!resolve(&avatar, &[o.clone()], &mut p, &t));
        assert!(p.grace_pipe_used);

        // No grace left and no pipes: the same overlap is now fatal
        assert!(resolve(&avatar, &[o], &mut p, &t));
    }
}
