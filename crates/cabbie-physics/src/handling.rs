//! Car handling model.
//!
//! Each tick the car's velocity is split into a *facing* component (along
//! the nose) and a *tangential* component (sideways slide). Controls act on
//! those two components separately and the velocity is rebuilt from them:
//!
//! - steering rotates the facing angle, at a rate that depends on speed and
//!   drops to zero at standstill;
//! - the accelerator adds to the facing speed at a speed-dependent rate;
//! - the brake, or coasting drag when no pedal is pressed, bleeds the facing
//!   speed towards zero without crossing it;
//! - grip always bleeds the tangential speed towards zero, at a different
//!   rate while braking.
//!
//! The velocity is rebuilt on the facing frame from *before* steering, so a
//! turn leaves part of the old motion as sideways slide on the next tick.
//!
//! Switching between forward and reverse requires the car to be at rest and
//! the opposite pedal to be held for [`HandlingConfig::autoreverse_hold_time_sec`].

use std::f64::consts::FRAC_PI_2;

use crate::body::Body;
use crate::math::{approx_eq, lerp, sign, Vec2};

// ---------------------------------------------------------------------------
// HandlingConfig
// ---------------------------------------------------------------------------

/// Tuning constants for the handling model. Loaded once at startup.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HandlingConfig {
    /// Steering rate at the low speed threshold (radians per second).
    pub steer_rads_per_sec_low: f64,
    /// Steering rate at and above the high speed threshold.
    pub steer_rads_per_sec_high: f64,
    /// Speed below which "low speed" constants apply.
    pub low_threshold: f64,
    /// Speed above which "high speed" constants apply.
    pub high_threshold: f64,
    /// Acceleration at low speed (units per second squared).
    pub accel_per_sec_low: f64,
    /// Acceleration at high speed.
    pub accel_per_sec_high: f64,
    /// Coasting deceleration when no pedal is pressed.
    pub no_accel_slowing: f64,
    /// Deceleration at full brake.
    pub brake_per_sec: f64,
    /// Rate at which sideways slide bleeds off.
    pub grip: f64,
    /// Multiplier applied to `grip` while braking.
    pub grip_factor_when_braking: f64,
    /// How long the opposite pedal must be held at rest to change gear.
    pub autoreverse_hold_time_sec: f64,
}

impl Default for HandlingConfig {
    fn default() -> Self {
        Self {
            steer_rads_per_sec_low: 3.0,
            steer_rads_per_sec_high: 1.8,
            low_threshold: 40.0,
            high_threshold: 300.0,
            accel_per_sec_low: 160.0,
            accel_per_sec_high: 60.0,
            no_accel_slowing: 50.0,
            brake_per_sec: 320.0,
            grip: 400.0,
            grip_factor_when_braking: 0.4,
            autoreverse_hold_time_sec: 0.3,
        }
    }
}

impl HandlingConfig {
    /// Blend factor in `[0, 1]`: 0 below `low_threshold`, 1 above `high_threshold`,
    /// linear in between.
    pub fn blend_factor(&self, speed: f64) -> f64 {
        if speed < self.low_threshold {
            0.0
        } else if speed > self.high_threshold {
            1.0
        } else if self.high_threshold > self.low_threshold {
            (speed - self.low_threshold) / (self.high_threshold - self.low_threshold)
        } else {
            // Degenerate band (e.g. both thresholds missing from settings).
            0.0
        }
    }

    /// Steering rate at `speed`. Falls linearly to zero below the low threshold.
    pub fn steer_rate(&self, speed: f64) -> f64 {
        if speed < self.low_threshold {
            lerp(speed / self.low_threshold, 0.0, self.steer_rads_per_sec_low)
        } else {
            lerp(
                self.blend_factor(speed),
                self.steer_rads_per_sec_low,
                self.steer_rads_per_sec_high,
            )
        }
    }

    /// Acceleration rate at `speed`.
    pub fn accel_rate(&self, speed: f64) -> f64 {
        lerp(
            self.blend_factor(speed),
            self.accel_per_sec_low,
            self.accel_per_sec_high,
        )
    }
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// Driver input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Controls {
    /// `< 0` steers left, `> 0` steers right.
    pub steer: f64,
    /// `> 0` accelerates in the current gear, `< 0` brakes (or asks for the other gear at rest).
    pub accel: f64,
}

impl Controls {
    /// No input.
    pub const IDLE: Controls = Controls {
        steer: 0.0,
        accel: 0.0,
    };

    /// Build controls, clamping both axes to `[-1, 1]`.
    pub fn new(steer: f64, accel: f64) -> Self {
        Self {
            steer: steer.clamp(-1.0, 1.0),
            accel: accel.clamp(-1.0, 1.0),
        }
    }

    /// Map held keys to controls. Brake wins over accelerate; opposing steer keys cancel.
    pub fn from_keys(accelerate: bool, brake: bool, left: bool, right: bool) -> Self {
        let accel = if brake {
            -1.0
        } else if accelerate {
            1.0
        } else {
            0.0
        };
        let steer = match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        Self { steer, accel }
    }
}

// ---------------------------------------------------------------------------
// GearState
// ---------------------------------------------------------------------------

/// Forward/reverse gear with the hold timer used to switch between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GearState {
    reversing: bool,
    switch_timer_sec: f64,
}

impl GearState {
    pub fn is_reversing(&self) -> bool {
        self.reversing
    }

    /// Time the opposite pedal has been held at rest so far.
    pub fn switch_timer_sec(&self) -> f64 {
        self.switch_timer_sec
    }
}

// ---------------------------------------------------------------------------
// apply_handling
// ---------------------------------------------------------------------------

/// What happened during one handling step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandlingStep {
    /// The car had non-zero speed at the start of the tick. Collision tests
    /// are only needed when this is set.
    pub was_moving: bool,
    /// Pedals were ignored this tick because a gear change is pending.
    pub switching: bool,
    /// Speed along the nose after the step (negative while reversing).
    pub facing_speed: f64,
    /// Sideways speed after the step.
    pub tangent_speed: f64,
}

/// Move `value` towards zero by `amount` without crossing zero.
#[inline]
fn toward_zero(value: f64, amount: f64) -> f64 {
    (value.abs() - amount).max(0.0) * sign(value)
}

/// Run the handling model for one tick, updating the body's velocity and
/// facing angle. Position is not touched; integrate afterwards.
pub fn apply_handling(
    body: &mut Body,
    gear: &mut GearState,
    controls: Controls,
    config: &HandlingConfig,
    dt: f64,
) -> HandlingStep {
    let (speed, _) = body.speed_and_direction();

    let facing_unit = Vec2::from_angle(body.facing);
    let tangent_unit = Vec2::from_angle(body.facing + FRAC_PI_2);
    let mut facing_speed = body.velocity.dot(facing_unit);
    let mut tangent_speed = body.velocity.dot(tangent_unit);
    let mut facing = body.facing;

    let mut accel = controls.accel.max(0.0);
    let mut brake = (-controls.accel).max(0.0);

    let mut was_moving = true;
    let mut switching = false;
    if approx_eq(speed, 0.0) {
        was_moving = false;
        let wants_other_gear = (!gear.reversing && controls.accel < 0.0)
            || (gear.reversing && controls.accel > 0.0);
        if wants_other_gear {
            gear.switch_timer_sec += dt;
            if gear.switch_timer_sec >= config.autoreverse_hold_time_sec {
                gear.reversing = !gear.reversing;
                gear.switch_timer_sec = 0.0;
                tracing::debug!(reversing = gear.reversing, "gear changed");
            }
            accel = 0.0;
            brake = 0.0;
            switching = true;
        }
    }
    if !switching {
        gear.switch_timer_sec = 0.0;
    }

    // In reverse the pedals swap roles so "accelerate" always means "drive in this gear".
    if gear.reversing {
        std::mem::swap(&mut accel, &mut brake);
    }

    if speed > 0.0 && controls.steer != 0.0 {
        facing += dt * config.steer_rate(speed) * controls.steer;
    }

    if accel > 0.0 {
        let delta = dt * config.accel_rate(speed) * accel;
        facing_speed += if gear.reversing { -delta } else { delta };
    } else if brake > 0.0 {
        facing_speed = toward_zero(facing_speed, dt * config.brake_per_sec * brake);
    } else if !approx_eq(facing_speed, 0.0) {
        facing_speed = toward_zero(facing_speed, dt * config.no_accel_slowing);
    }

    if !approx_eq(tangent_speed, 0.0) {
        let mut grip = config.grip;
        if brake > 0.0 {
            grip *= config.grip_factor_when_braking;
        }
        tangent_speed = toward_zero(tangent_speed, dt * grip);
    }

    body.velocity = facing_unit * facing_speed + tangent_unit * tangent_speed;
    body.facing = facing;

    HandlingStep {
        was_moving,
        switching,
        facing_speed,
        tangent_speed,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
