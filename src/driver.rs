//! Frame pacing and delta-factor normalization
//!
//! The host's refresh callback supplies timestamps; the driver turns them
//! into a normalized delta factor where 1.0 is one nominal frame at the
//! profile's target rate. The factor is clamped so a throttled or
//! backgrounded host can never produce a catch-up integration step that
//! teleports the avatar through obstacles.

use crate::consts::{DELTA_MAX, DELTA_MIN};

#[derive(Debug, Clone)]
pub struct FrameDriver {
    nominal_ms: f64,
    last_frame_ms: Option<f64>,
}

impl FrameDriver {
    pub fn new(target_hz: f32) -> Self {
        Self {
            nominal_ms: 1000.0 / target_hz.max(1.0) as f64,
            last_frame_ms: None,
        }
    }

    pub fn set_target_hz(&mut self, target_hz: f32) {
        self.nominal_ms = 1000.0 / target_hz.max(1.0) as f64;
    }

    /// Delta factor for the frame arriving at `now_ms`. The first frame
    /// after construction or a reset is exactly nominal.
    pub fn delta_factor(&mut self, now_ms: f64) -> f32 {
        let raw = match self.last_frame_ms {
            Some(last) if now_ms > last => ((now_ms - last) / self.nominal_ms) as f32,
            _ => 1.0,
        };
        self.last_frame_ms = Some(now_ms);
        raw.clamp(DELTA_MIN, DELTA_MAX)
    }

    /// Forget pacing history so the next frame integrates one nominal
    /// step (start, resume).
    pub fn reset(&mut self) {
        self.last_frame_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_nominal() {
        let mut driver = FrameDriver::new(60.0);
        assert_eq!(driver.delta_factor(1000.0), 1.0);
    }

    #[test]
    fn steady_cadence_yields_unit_factor() {
        let mut driver = FrameDriver::new(60.0);
        driver.delta_factor(0.0);
        let dt = driver.delta_factor(1000.0 / 60.0);
        assert!((dt - 1.0).abs() < 1e-3);
    }

    #[test]
    fn long_stall_clamps_instead_of_catching_up() {
        let mut driver = FrameDriver::new(60.0);
        driver.delta_factor(0.0);
        // Five seconds in a background tab
        assert_eq!(driver.delta_factor(5000.0), DELTA_MAX);
    }

    #[test]
    fn fast_frames_clamp_low() {
        let mut driver = FrameDriver::new(60.0);
        driver.delta_factor(0.0);
        assert_eq!(driver.delta_factor(1.0), DELTA_MIN);
    }

    #[test]
    fn reset_restores_nominal_step() {
        let mut driver = FrameDriver::new(60.0);
        driver.delta_factor(0.0);
        driver.reset();
        assert_eq!(driver.delta_factor(9999.0), 1.0);
    }

    #[test]
    fn non_monotonic_timestamp_is_nominal() {
        let mut driver = FrameDriver::new(60.0);
        driver.delta_factor(1000.0);
        assert_eq!(driver.delta_factor(900.0), 1.0);
    }
}
