//! Frame driver for a [`Game`].
//!
//! The [`TickLoop`] advances the game either by a fixed step ([`TickLoop::tick`],
//! used by headless runs and tests) or by whatever time the host's animation
//! callback reports ([`TickLoop::frame`]). Each call:
//!
//! 1. converts the held keys in the current [`InputFrame`] to controls;
//! 2. runs [`Game::update`];
//! 3. refreshes the render view unless running headless;
//! 4. records [`TickDiagnostics`].
//!
//! With a fixed step, a given seed and the same sequence of input frames, two
//! runs produce identical state.
//!
//! # Example
//!
//! ```
//! use cabbie_engine::prelude::*;
//!
//! let game = Game::new(GameConfig::default(), 7);
//! let config = TickConfig { fixed_dt: 1.0 / 60.0, headless: true };
//! let mut tick_loop = TickLoop::new(game, config);
//!
//! tick_loop.set_input(InputFrame { accelerate: true, ..Default::default() });
//! tick_loop.run_ticks(30);
//!
//! assert_eq!(tick_loop.tick_count(), 30);
//! assert!(tick_loop.game().player().unwrap().body.velocity.x > 0.0);
//! ```

use std::time::{Duration, Instant};

use cabbie_physics::handling::Controls;

use crate::game::{Game, SpriteView};
use crate::passenger::TripEvent;

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Settings for a [`TickLoop`].
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Seconds per [`TickLoop::tick`]. Must be positive and finite.
    pub fixed_dt: f64,
    /// Skip building the render view.
    pub headless: bool,
}

impl Default for TickConfig {
    /// 60 Hz, with rendering.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            headless: false,
        }
    }
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Measurements from the last frame.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time spent in the frame.
    pub total_time: Duration,
    /// Entities alive after the frame.
    pub entity_count: usize,
    /// Trip transitions during the frame.
    pub trip_events: usize,
}

// ---------------------------------------------------------------------------
// InputFrame
// ---------------------------------------------------------------------------

/// Keys held during a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InputFrame {
    pub accelerate: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
}

impl InputFrame {
    /// Held keys as handling controls. Brake wins over accelerate.
    pub fn controls(&self) -> Controls {
        Controls::from_keys(self.accelerate, self.brake, self.left, self.right)
    }
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

/// Drives a [`Game`] frame by frame and keeps count of time and ticks.
pub struct TickLoop {
    game: Game,
    tick_counter: u64,
    elapsed_sec: f64,
    fixed_dt: f64,
    config: TickConfig,
    last_diagnostics: TickDiagnostics,
    current_input: InputFrame,
    view: Vec<SpriteView>,
}

impl TickLoop {
    /// # Panics
    ///
    /// Panics if `config.fixed_dt` is not positive and finite.
    pub fn new(game: Game, config: TickConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        let view = if config.headless {
            Vec::new()
        } else {
            game.visible_sprites()
        };
        Self {
            game,
            tick_counter: 0,
            elapsed_sec: 0.0,
            fixed_dt: config.fixed_dt,
            config,
            last_diagnostics: TickDiagnostics::default(),
            current_input: InputFrame::default(),
            view,
        }
    }

    /// Advance by the fixed step.
    pub fn tick(&mut self) -> Vec<TripEvent> {
        self.frame(self.fixed_dt)
    }

    /// Advance by `dt` seconds as measured by the host.
    ///
    /// # Panics
    ///
    /// Panics if `dt` is negative or not finite.
    pub fn frame(&mut self, dt: f64) -> Vec<TripEvent> {
        assert!(
            dt >= 0.0 && dt.is_finite(),
            "frame dt must be non-negative and finite, got {dt}"
        );
        let start = Instant::now();

        let events = self.game.update(dt, self.current_input.controls());
        if !self.config.headless {
            self.view = self.game.visible_sprites();
        }

        self.tick_counter += 1;
        self.elapsed_sec += dt;
        self.last_diagnostics = TickDiagnostics {
            total_time: start.elapsed(),
            entity_count: self.game.world().len(),
            trip_events: events.len(),
        };
        tracing::trace!(
            tick = self.tick_counter,
            entities = self.last_diagnostics.entity_count,
            "frame done"
        );

        events
    }

    /// Run `count` fixed ticks. Returns every trip event in order.
    pub fn run_ticks(&mut self, count: u64) -> Vec<TripEvent> {
        let mut events = Vec::new();
        for _ in 0..count {
            events.extend(self.tick());
        }
        events
    }

    // -- accessors ----------------------------------------------------------

    /// Frames run so far, fixed or variable.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Total simulated seconds.
    pub fn elapsed_sec(&self) -> f64 {
        self.elapsed_sec
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Measurements from the most recent frame.
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    /// Keys held from the next frame on.
    pub fn set_input(&mut self, input: InputFrame) {
        self.current_input = input;
    }

    pub fn current_input(&self) -> &InputFrame {
        &self.current_input
    }

    /// Sprites visible after the last frame. Always empty when headless.
    pub fn view(&self) -> &[SpriteView] {
        &self.view
    }

    pub fn is_headless(&self) -> bool {
        self.config.headless
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn tick_loop(headless: bool) -> TickLoop {
        TickLoop::new(
            Game::new(GameConfig::default(), 11),
            TickConfig {
                fixed_dt: 0.02,
                headless,
            },
        )
    }

    // -- 1. Construction --------------------------------------------------------

    #[test]
    fn starts_at_zero() {
        let tl = tick_loop(true);
        assert_eq!(tl.tick_count(), 0);
        assert_eq!(tl.elapsed_sec(), 0.0);
        assert_eq!(tl.current_input(), &InputFrame::default());
    }

    #[test]
    fn default_config_is_60hz() {
        let config = TickConfig::default();
        assert!((config.fixed_dt - 1.0 / 60.0).abs() < f64::EPSILON);
        assert!(!config.headless);
    }

    #[test]
    #[should_panic(expected = "fixed_dt must be positive")]
    fn zero_dt_panics() {
        TickLoop::new(
            Game::new(GameConfig::default(), 1),
            TickConfig {
                fixed_dt: 0.0,
                ..Default::default()
            },
        );
    }

    #[test]
    #[should_panic(expected = "fixed_dt must be positive")]
    fn infinite_dt_panics() {
        TickLoop::new(
            Game::new(GameConfig::default(), 1),
            TickConfig {
                fixed_dt: f64::INFINITY,
                ..Default::default()
            },
        );
    }

    #[test]
    #[should_panic(expected = "frame dt must be non-negative")]
    fn negative_frame_dt_panics() {
        tick_loop(true).frame(-0.1);
    }

    // -- 2. Advancing -----------------------------------------------------------

    #[test]
    fn ticks_and_frames_accumulate_time() {
        let mut tl = tick_loop(true);
        tl.run_ticks(5);
        tl.frame(0.5);
        assert_eq!(tl.tick_count(), 6);
        assert!((tl.elapsed_sec() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn input_frame_maps_to_controls() {
        let input = InputFrame {
            accelerate: true,
            brake: true,
            left: true,
            right: false,
        };
        assert_eq!(input.controls(), Controls::new(-1.0, -1.0));
    }

    #[test]
    fn held_accelerator_moves_player() {
        let mut tl = tick_loop(true);
        tl.set_input(InputFrame {
            accelerate: true,
            ..Default::default()
        });
        tl.run_ticks(10);
        assert!(tl.game().player().unwrap().body.velocity.x > 0.0);
    }

    // -- 3. Diagnostics and view ------------------------------------------------

    #[test]
    fn diagnostics_count_entities() {
        let mut tl = tick_loop(true);
        tl.tick();
        let diag = tl.last_diagnostics();
        assert_eq!(diag.entity_count, tl.game().world().len());
        assert_eq!(diag.trip_events, 0);
    }

    #[test]
    fn headless_skips_view() {
        let mut headless = tick_loop(true);
        headless.tick();
        assert!(headless.view().is_empty());
        assert!(headless.is_headless());

        let mut windowed = tick_loop(false);
        windowed.tick();
        assert!(windowed.view().iter().any(|s| s.kind == "car"));
    }
}
