//! Game configuration, read once from [`Settings`] at startup.
//!
//! Every tuning constant the simulation needs is copied into a plain struct
//! here and passed down explicitly. Missing settings come through as zero or
//! empty values.

use cabbie_physics::collision::CollisionBox;
use cabbie_physics::handling::HandlingConfig;
use cabbie_physics::math::Vec2;

use crate::settings::Settings;

/// Settings shipped with the crate. Also the source of [`GameConfig::default`].
pub const DEFAULT_SETTINGS: &str = include_str!("../data/settings.cfg");

/// Countdown used when `general/passenger_time_sec` is absent.
pub const DEFAULT_PASSENGER_TIME_SEC: f64 = 10.0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Component `index` of a float vector, or `0.0` if it is too short.
fn component(values: &[f64], index: usize) -> f64 {
    values.get(index).copied().unwrap_or(0.0)
}

fn vec2_setting(settings: &Settings, name: &str) -> Vec2 {
    let values = settings.get_float_vec(name);
    Vec2::new(component(&values, 0), component(&values, 1))
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Restitution factors and the car's collision box (`collision/*`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CollisionConfig {
    /// Restitution of the player car.
    pub car_bounce_factor: f64,
    /// Restitution of houses.
    pub house_bounce_factor: f64,
    /// Local `[min, max]` x range of the car's collision box. Empty means "whole sprite".
    pub car_box_x: Vec<f64>,
    /// Local `[min, max]` y range of the car's collision box.
    pub car_box_y: Vec<f64>,
}

impl CollisionConfig {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            car_bounce_factor: settings.get_float("collision/car_bounce_factor"),
            house_bounce_factor: settings.get_float("collision/house_bounce_factor"),
            car_box_x: settings.get_float_vec("collision/car_box_x"),
            car_box_y: settings.get_float_vec("collision/car_box_y"),
        }
    }

    /// The car's collision box, falling back to the full sprite when either range is incomplete.
    pub fn car_box(&self, car_size: SpriteSize) -> CollisionBox {
        match (self.car_box_x.as_slice(), self.car_box_y.as_slice()) {
            ([min_x, max_x, ..], [min_y, max_y, ..]) => {
                CollisionBox::new(*min_x, *max_x, *min_y, *max_y)
            }
            _ => CollisionBox::from_half_extents(car_size.half_extents()),
        }
    }
}

/// Cash award curve for deliveries (`target/*`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TargetConfig {
    /// Manhattan distance paying `min_cash`.
    pub min_threshold: f64,
    /// Manhattan distance paying `max_cash`.
    pub max_threshold: f64,
    /// Fare at `min_threshold`.
    pub min_cash: f64,
    /// Fare at `max_threshold`.
    pub max_cash: f64,
}

impl TargetConfig {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            min_threshold: settings.get_float("target/min_threshold"),
            max_threshold: settings.get_float("target/max_threshold"),
            min_cash: settings.get_float("target/min_cash"),
            max_cash: settings.get_float("target/max_cash"),
        }
    }
}

/// Screen size (`screen/*`). The play area is three screens each way.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScreenConfig {
    /// Never negative.
    pub width: f64,
    /// Never negative.
    pub height: f64,
    /// How close the player may get to a view edge before the camera moves.
    pub camera_move_border: f64,
}

impl ScreenConfig {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            // Backdrop tiles are screen-sized; negative sizes count as missing.
            width: settings.get_float("screen/width").max(0.0),
            height: settings.get_float("screen/height").max(0.0),
            camera_move_border: settings.get_float("screen/camera_move_border"),
        }
    }
}

/// Timers (`general/*`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeneralConfig {
    /// How long a one-line status message stays up.
    pub msg_display_time_sec: f64,
    /// Countdown for delivering a passenger.
    pub passenger_time_sec: f64,
}

impl GeneralConfig {
    fn from_settings(settings: &Settings) -> Self {
        let passenger_time_sec = if settings.contains("general/passenger_time_sec") {
            settings.get_float("general/passenger_time_sec")
        } else {
            DEFAULT_PASSENGER_TIME_SEC
        };
        Self {
            msg_display_time_sec: settings.get_float("general/msg_display_time_sec"),
            passenger_time_sec,
        }
    }
}

/// Width and height of a sprite.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpriteSize {
    pub width: f64,
    pub height: f64,
}

impl SpriteSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn half_extents(self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    fn from_settings(settings: &Settings, name: &str) -> Self {
        let size = vec2_setting(settings, name);
        // Negative sizes would trip the body invariant; treat them as missing.
        Self::new(size.x.max(0.0), size.y.max(0.0))
    }
}

/// Sprite sizes (`sprites/*_size`). Bodies take their extents from these.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpriteConfig {
    pub car: SpriteSize,
    pub house: SpriteSize,
    pub man: SpriteSize,
    pub target: SpriteSize,
    pub guard: SpriteSize,
}

impl SpriteConfig {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            car: SpriteSize::from_settings(settings, "sprites/car_size"),
            house: SpriteSize::from_settings(settings, "sprites/house_size"),
            man: SpriteSize::from_settings(settings, "sprites/man_size"),
            target: SpriteSize::from_settings(settings, "sprites/target_size"),
            guard: SpriteSize::from_settings(settings, "sprites/guard_size"),
        }
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// One house from `level/houses`: an obstacle, and a possible destination.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HouseSpec {
    /// Label used in `level/destinations` and the entity name.
    pub label: String,
    pub position: Vec2,
    /// First line shown on pickup.
    pub start_message: String,
    /// Optional second line shown on pickup.
    pub start_message2: String,
    /// Shown on delivery. `{cash}` is replaced by the fare.
    pub win_message: String,
    /// Shown when the countdown runs out.
    pub lose_message: String,
}

/// A waiting passenger.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManSpec {
    pub label: String,
    pub position: Vec2,
}

/// A patrolling guard and its starting velocity.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GuardSpec {
    pub label: String,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Level layout (`level/*`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LevelConfig {
    pub houses: Vec<HouseSpec>,
    pub men: Vec<ManSpec>,
    pub guards: Vec<GuardSpec>,
    /// House labels a passenger may ask for.
    pub destinations: Vec<String>,
    /// Where the player car starts, facing right.
    pub player_position: Vec2,
}

impl LevelConfig {
    fn from_settings(settings: &Settings) -> Self {
        let houses: Vec<HouseSpec> = settings
            .get_string_vec("level/houses")
            .into_iter()
            .map(|label| {
                let key = |suffix: &str| format!("level/house{label}_{suffix}");
                HouseSpec {
                    position: vec2_setting(settings, &key("pos")),
                    start_message: settings.get_string(&key("start")).to_owned(),
                    start_message2: settings.get_string(&key("start2")).to_owned(),
                    win_message: settings.get_string(&key("win")).to_owned(),
                    lose_message: settings.get_string(&key("lose")).to_owned(),
                    label,
                }
            })
            .collect();

        let men = settings
            .get_string_vec("level/men")
            .into_iter()
            .map(|label| ManSpec {
                position: vec2_setting(settings, &format!("level/man{label}_pos")),
                label,
            })
            .collect();

        let guards = settings
            .get_string_vec("level/guards")
            .into_iter()
            .map(|label| GuardSpec {
                position: vec2_setting(settings, &format!("level/guard{label}_pos")),
                velocity: vec2_setting(settings, &format!("level/guard{label}_vel")),
                label,
            })
            .collect();

        let destinations = settings
            .get_string_vec("level/destinations")
            .into_iter()
            .filter(|label| {
                let known = houses.iter().any(|h| &h.label == label);
                if !known {
                    tracing::warn!(label = %label, "destination does not name a house, ignored");
                }
                known
            })
            .collect();

        Self {
            houses,
            men,
            guards,
            destinations,
            player_position: vec2_setting(settings, "level/player_pos"),
        }
    }

    pub fn house(&self, label: &str) -> Option<&HouseSpec> {
        self.houses.iter().find(|h| h.label == label)
    }
}

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Everything the game reads from settings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GameConfig {
    pub handling: HandlingConfig,
    pub collision: CollisionConfig,
    pub target: TargetConfig,
    pub screen: ScreenConfig,
    pub general: GeneralConfig,
    pub sprites: SpriteConfig,
    pub level: LevelConfig,
}

impl GameConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            handling: handling_from_settings(settings),
            collision: CollisionConfig::from_settings(settings),
            target: TargetConfig::from_settings(settings),
            screen: ScreenConfig::from_settings(settings),
            general: GeneralConfig::from_settings(settings),
            sprites: SpriteConfig::from_settings(settings),
            level: LevelConfig::from_settings(settings),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::parse(DEFAULT_SETTINGS))
    }
}

fn handling_from_settings(settings: &Settings) -> HandlingConfig {
    let get = |key: &str| settings.get_float(&format!("handling/{key}"));
    HandlingConfig {
        steer_rads_per_sec_low: get("steer_rads_per_sec_low"),
        steer_rads_per_sec_high: get("steer_rads_per_sec_high"),
        low_threshold: get("low_threshold"),
        high_threshold: get("high_threshold"),
        accel_per_sec_low: get("accel_per_sec_low"),
        accel_per_sec_high: get("accel_per_sec_high"),
        no_accel_slowing: get("no_accel_slowing"),
        brake_per_sec: get("brake_per_sec"),
        grip: get("grip"),
        grip_factor_when_braking: get("grip_factor_when_braking"),
        autoreverse_hold_time_sec: get("autoreverse_hold_time_sec"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
