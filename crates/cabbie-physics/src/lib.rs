//! Cabbie Physics -- car handling, rotated-rect collision and boundary rules.
//!
//! This crate holds the per-body simulation pieces of the taxi game. It has no
//! notion of a world or of game rules: callers own the [`Body`](body::Body)
//! values and decide which of them interact.
//!
//! # Quick Start
//!
//! ```
//! use cabbie_physics::prelude::*;
//!
//! let config = HandlingConfig::default();
//! let mut car = Body::new(0.0, 0.0, 40.0, 20.0).with_role(BodyRole::Player);
//! let mut gear = GearState::default();
//!
//! let step = apply_handling(&mut car, &mut gear, Controls::new(0.0, 1.0), &config, 0.1);
//! car.integrate(0.1);
//!
//! assert!(!step.was_moving);
//! assert!(car.position.x > 0.0);
//! ```

#![deny(unsafe_code)]

pub mod body;
pub mod boundary;
pub mod collision;
pub mod handling;
pub mod math;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::body::{Body, BodyRole, ColliderShape, Rect};
    pub use crate::boundary::{centre_bounds, enforce_boundaries, reflect_within};
    pub use crate::collision::{
        apply_response, find_contact, rotated_bounding_box, rotated_corners, Axis, CollisionBox,
        Contact, Corner,
    };
    pub use crate::handling::{apply_handling, Controls, GearState, HandlingConfig, HandlingStep};
    pub use crate::math::{approx_eq, lerp, polar_from_rect, rect_from_polar, sign, Vec2};
}
