//! Cabbie Engine -- the taxi game built on [`cabbie_physics`].
//!
//! A [`Game`](game::Game) owns the level: an entity [`World`](world::World)
//! of cars, houses, passengers and guards, the trip dispatcher, the camera
//! and the player's cash. The [`TickLoop`](tick::TickLoop) drives it one
//! frame at a time and can capture a hashed
//! [`GameSnapshot`](snapshot::GameSnapshot) of the state.
//!
//! Configuration comes from a plain-text [`Settings`](settings::Settings)
//! file, read once into a [`GameConfig`](config::GameConfig).
//!
//! # Quick Start
//!
//! ```
//! use cabbie_engine::prelude::*;
//!
//! let settings = Settings::parse(cabbie_engine::config::DEFAULT_SETTINGS);
//! let game = Game::new(GameConfig::from_settings(&settings), 1);
//! let mut tick_loop = TickLoop::new(game, TickConfig { fixed_dt: 1.0 / 60.0, headless: true });
//!
//! tick_loop.run_ticks(60);
//! assert_eq!(tick_loop.game().trip_state(), &TripState::Idle);
//! assert_eq!(tick_loop.state_hash().len(), 64);
//! ```

#![deny(unsafe_code)]

pub mod camera;
pub mod config;
pub mod entity;
pub mod game;
pub mod passenger;
pub mod settings;
pub mod snapshot;
pub mod tick;
pub mod world;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the physics crate for convenience.
pub use cabbie_physics;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use cabbie_physics::prelude::*;

    pub use crate::camera::Camera;
    pub use crate::config::GameConfig;
    pub use crate::entity::EntityId;
    pub use crate::game::{Game, SpriteView, StatusMessage};
    pub use crate::passenger::{Trip, TripEvent, TripState};
    pub use crate::settings::{Settings, SettingsError};
    pub use crate::snapshot::{GameSnapshot, SnapshotError};
    pub use crate::tick::{InputFrame, TickConfig, TickDiagnostics, TickLoop};
    pub use crate::world::{Driver, Entity, EntityKind, World};
}
