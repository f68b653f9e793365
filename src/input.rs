//! Unified press/release input stream
//!
//! Touch, mouse and keyboard all reduce to timestamped press/release
//! events; hold duration is derived from the pair. Anomalies (a release
//! with no matching press, a second press while held) are logged and
//! ignored, never propagated.

/// A single logical input event from the embedder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Press { at_ms: f64 },
    Release { at_ms: f64 },
}

/// Tracks the press currently in flight and derives hold durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTracker {
    pressed_at: Option<f64>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press. Returns true when this press was newly
    /// registered (a repeat while already held is ignored).
    pub fn press(&mut self, at_ms: f64) -> bool {
        if self.pressed_at.is_some() {
            log::warn!("press at {at_ms:.0}ms while already held, ignoring");
            return false;
        }
        self.pressed_at = Some(at_ms);
        true
    }

    /// Register a release. Returns the hold duration in milliseconds
    /// when a matching press exists.
    pub fn release(&mut self, at_ms: f64) -> Option<f32> {
        match self.pressed_at.take() {
            Some(pressed) => Some(((at_ms - pressed).max(0.0)) as f32),
            None => {
                log::warn!("release at {at_ms:.0}ms with no matching press, ignoring");
                None
            }
        }
    }

    pub fn is_held(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Forget any in-flight press (session reset, focus loss).
    pub fn reset(&mut self) {
        self.pressed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_release_yields_hold_duration() {
        let mut tracker = InputTracker::new();
        assert!(tracker.press(100.0));
        assert!(tracker.is_held());
        assert_eq!(tracker.release(260.0), Some(160.0));
        assert!(!tracker.is_held());
    }

    #[test]
    fn unmatched_release_is_ignored() {
        let mut tracker = InputTracker::new();
        assert_eq!(tracker.release(50.0), None);
    }

    #[test]
    fn double_press_keeps_first_timestamp() {
        let mut tracker = InputTracker::new();
        assert!(tracker.press(100.0));
        assert!(!tracker.press(150.0));
        assert_eq!(tracker.release(300.0), Some(200.0));
    }

    #[test]
    fn out_of_order_release_clamps_to_zero() {
        let mut tracker = InputTracker::new();
        tracker.press(500.0);
        assert_eq!(tracker.release(400.0), Some(0.0));
    }
}
