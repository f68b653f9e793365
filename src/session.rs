//! Embedder-facing session controller
//!
//! Owns the game state, tuning, frame driver and input tracker, and the
//! handles to the storage and leaderboard collaborators. This is the one
//! context object the embedder talks to: feed it input events and frame
//! timestamps, read the snapshot back, drain the event queue. All
//! persistence flows through the narrow storage interface; nothing in
//! here reaches for ambient globals.

use crate::driver::FrameDriver;
use crate::highscores::HighScores;
use crate::input::{InputEvent, InputTracker};
use crate::persistence;
use crate::platform::{Capabilities, Leaderboard, Storage};
use crate::render::{AvatarPose, FrameSnapshot};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, physics, tick};
use crate::tuning::Tuning;

const BEST_KEY: &str = "gapwing_best";
const SAVE_KEY: &str = "gapwing_save";
const SAVE_VERSION: u32 = 1;

pub struct Session {
    settings: Settings,
    capabilities: Capabilities,
    tuning: Tuning,
    state: GameState,
    driver: FrameDriver,
    tracker: InputTracker,
    /// One-shot inputs latched between frames, cleared after each tick
    pending: TickInput,
    highscores: HighScores,
    best: u32,
    storage: Box<dyn Storage>,
    leaderboard: Box<dyn Leaderboard>,
    last_phase: GamePhase,
}

impl Session {
    pub fn new(
        width: f32,
        height: f32,
        seed: u64,
        capabilities: Capabilities,
        storage: Box<dyn Storage>,
        leaderboard: Box<dyn Leaderboard>,
    ) -> Self {
        let settings = Settings::load(&*storage);
        let tuning = Tuning::new(width, height, settings.profile(&capabilities));
        let best = storage
            .get(BEST_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        let highscores = HighScores::load(&*storage);
        let driver = FrameDriver::new(tuning.target_hz);
        let state = GameState::new(seed, &tuning);

        log::info!(
            "session created: {}x{}, profile {}, best {best}, seed {seed}",
            width,
            height,
            tuning.profile.as_str()
        );

        Self {
            settings,
            capabilities,
            tuning,
            state,
            driver,
            tracker: InputTracker::new(),
            pending: TickInput::default(),
            highscores,
            best,
            storage,
            leaderboard,
            last_phase: GamePhase::Menu,
        }
    }

    /// Feed one unified input event; hold durations are derived from
    /// press/release pairs.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Press { at_ms } => {
                if self.tracker.press(at_ms) {
                    self.pending.press = true;
                }
            }
            InputEvent::Release { at_ms } => {
                if let Some(hold_ms) = self.tracker.release(at_ms) {
                    self.pending.jump = Some(hold_ms);
                }
            }
        }
    }

    /// Advance the session by one host frame.
    pub fn frame(&mut self, now_ms: f64) {
        let dt = self.driver.delta_factor(now_ms);
        let input = self.pending;
        // Clear one-shot inputs after processing
        self.pending = TickInput::default();

        tick(&mut self.state, &input, &self.tuning, dt);

        if self.state.phase != self.last_phase {
            self.on_phase_change(now_ms);
            self.last_phase = self.state.phase;
        }
    }

    fn on_phase_change(&mut self, now_ms: f64) {
        if self.state.phase == GamePhase::GameOver {
            self.finalize_run(now_ms);
        }
    }

    fn finalize_run(&mut self, now_ms: f64) {
        let score = self.state.score;
        if score > self.best {
            self.best = score;
            if let Err(e) = self.storage.set(BEST_KEY, &score.to_string()) {
                log::warn!("failed to persist best score: {e}");
            }
        }
        if self.highscores.add_score(score, now_ms).is_some() {
            self.highscores.save(&mut *self.storage);
        }
        self.storage.remove(SAVE_KEY);
        // Fire-and-forget; completion or failure never reaches the core
        self.leaderboard.submit_score(score);
    }

    /// Pause gameplay. Idempotent: pausing while paused stays paused.
    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.state.phase = GamePhase::Paused;
            self.last_phase = GamePhase::Paused;
            self.save_run();
            log::info!("paused");
        }
    }

    /// Resume gameplay. Idempotent.
    pub fn resume(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.state.phase = GamePhase::Playing;
            self.last_phase = GamePhase::Playing;
            // Next frame integrates one nominal step, not the pause gap
            self.driver.reset();
            log::info!("resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => {}
        }
    }

    /// Apply a viewport change mid-session: retune and clamp everything
    /// back into the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        let old_height = self.tuning.height;
        self.tuning.resize(width, height);
        self.driver.set_target_hz(self.tuning.target_hz);

        let ratio = self.tuning.height / old_height;
        let (lo, hi) = self.tuning.opening_bounds();

        self.state.avatar.pos.y *= ratio;
        physics::clamp_to_bounds(&mut self.state.avatar, &self.tuning);

        for obstacle in &mut self.state.obstacles {
            obstacle.gap *= ratio;
            obstacle.gap_center = (obstacle.gap_center * ratio).clamp(lo, hi);
            if let Some(osc) = &mut obstacle.osc {
                osc.lo = (osc.lo * ratio).clamp(lo, hi);
                osc.hi = (osc.hi * ratio).clamp(osc.lo, hi);
            }
        }
        for collectible in &mut self.state.collectibles {
            collectible.pos.y = (collectible.pos.y * ratio).clamp(0.0, self.tuning.ground_y());
        }
        log::info!("resized to {width}x{height}");
    }

    /// Replace the settings, persist them, and retune if the effective
    /// profile changed.
    pub fn set_settings(&mut self, settings: Settings) {
        let old_profile = self.settings.profile(&self.capabilities);
        self.settings = settings;
        self.settings.save(&mut *self.storage);

        let new_profile = self.settings.profile(&self.capabilities);
        if new_profile != old_profile {
            let (w, h) = (self.tuning.width, self.tuning.height);
            self.tuning = Tuning::new(w, h, new_profile);
            self.driver.set_target_hz(self.tuning.target_hz);
        }
    }

    /// Persist a snapshot of the current run.
    pub fn save_run(&mut self) {
        match persistence::encode(SAVE_VERSION, &self.state) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(SAVE_KEY, &raw) {
                    log::warn!("failed to save run: {e}");
                }
            }
            Err(e) => log::warn!("failed to encode run snapshot: {e}"),
        }
    }

    /// Restore a previously saved run, if one exists and decodes.
    pub fn try_restore_run(&mut self) -> bool {
        let Some(raw) = self.storage.get(SAVE_KEY) else {
            return false;
        };
        match persistence::decode::<GameState>(SAVE_VERSION, &raw) {
            Ok(state) => {
                self.last_phase = state.phase;
                self.state = state;
                self.driver.reset();
                self.tracker.reset();
                self.pending = TickInput::default();
                log::info!("restored run at score {}", self.state.score);
                true
            }
            Err(e) => {
                log::warn!("discarding saved run: {e}");
                self.storage.remove(SAVE_KEY);
                false
            }
        }
    }

    /// Read-only view for the render collaborator.
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            phase: self.state.phase,
            score: self.state.score,
            best: self.best,
            camera_x: self.state.camera_x,
            ground_y: self.tuning.ground_y(),
            pipe_w: self.tuning.pipe_w,
            avatar: AvatarPose {
                pos: self.state.avatar.pos,
                rotation: self.state.avatar.rotation,
                width: self.tuning.avatar_w,
                height: self.tuning.avatar_h,
            },
            obstacles: &self.state.obstacles,
            collectibles: &self.state.collectibles,
            speed_multiplier: self
                .state
                .powerup
                .speed_multiplier(self.state.time, &self.tuning),
            powerup: (&self.state.powerup).into(),
        }
    }

    /// Drain the events produced since the last call (audio/analytics).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.state.take_events()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn best_score(&self) -> u32 {
        self.best
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
