//! The body record shared by every car, house, passenger and target.
//!
//! A [`Body`] carries the kinematic state (position, velocity, facing), the
//! fixed extents of its sprite, and the collision properties the resolver
//! needs. Behaviour beyond kinematics lives with the owner of the body; the
//! body itself only knows how to integrate and report its bounds.

use crate::collision::CollisionBox;
use crate::math::{polar_from_rect, Vec2};

// ---------------------------------------------------------------------------
// Shape / role
// ---------------------------------------------------------------------------

/// How a body is tested for contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColliderShape {
    /// Rotated rectangle, defined by the body's [`CollisionBox`].
    Rect,
    /// Circle. Recognised but not resolved; pairs involving a circle are skipped.
    Circle,
}

/// Whether a body actively resolves collisions against others.
///
/// Decided when the body is created. Only [`BodyRole::Player`] bodies run the
/// resolver; everything else is something the player can run into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BodyRole {
    /// Player-controlled: tests its corners against other bodies every moving tick.
    Player,
    /// Never initiates a collision test.
    Passive,
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle in world space. `top < bottom` because y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// Construct from the four edges.
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle centred on `centre` with the given half-extents.
    pub fn from_centre(centre: Vec2, half_extents: Vec2) -> Self {
        Self {
            left: centre.x - half_extents.x,
            top: centre.y - half_extents.y,
            right: centre.x + half_extents.x,
            bottom: centre.y + half_extents.y,
        }
    }

    /// Whether `point` lies strictly inside the rectangle.
    ///
    /// Points on an edge are outside, so a body that has just been pushed
    /// onto an edge does not collide again on the next test.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.left && point.x < self.right && point.y > self.top && point.y < self.bottom
    }

    /// Whether the two rectangles overlap with non-zero area.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Kinematic and collision state of one world object.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Body {
    /// World-space centre.
    pub position: Vec2,
    /// World units per second.
    pub velocity: Vec2,
    /// Facing angle in radians. Independent of the velocity direction.
    pub facing: f64,
    /// Half the sprite size. Fixed at construction.
    half_extents: Vec2,
    /// Collision test kind.
    shape: ColliderShape,
    /// Scale applied to the reflected velocity component; multiplied with the other body's.
    restitution: f64,
    /// Local-space rectangle used for the rotated corner test.
    collision_box: CollisionBox,
    /// Whether this body runs the resolver.
    role: BodyRole,
    /// Sensor bodies report contact but never push the other body back.
    is_sensor: bool,
}

impl Body {
    /// Create a passive, rectangular, non-sensor body at rest.
    ///
    /// The collision box defaults to the full sprite rectangle and the
    /// restitution to `1.0`.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is negative or not finite.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        assert!(
            width >= 0.0 && height >= 0.0 && width.is_finite() && height.is_finite(),
            "body size must be non-negative and finite, got {width}x{height}"
        );
        let half_extents = Vec2::new(width * 0.5, height * 0.5);
        Self {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            facing: 0.0,
            half_extents,
            shape: ColliderShape::Rect,
            restitution: 1.0,
            collision_box: CollisionBox::from_half_extents(half_extents),
            role: BodyRole::Passive,
            is_sensor: false,
        }
    }

    /// Set the restitution factor.
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        debug_assert!(
            restitution.is_finite() && restitution >= 0.0,
            "restitution must be finite and non-negative, got {restitution}"
        );
        self.restitution = restitution;
        self
    }

    /// Replace the collision box used for rotated corner tests.
    pub fn with_collision_box(mut self, collision_box: CollisionBox) -> Self {
        self.collision_box = collision_box;
        self
    }

    pub fn with_role(mut self, role: BodyRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_shape(mut self, shape: ColliderShape) -> Self {
        self.shape = shape;
        self
    }

    /// Mark this body as a sensor (contact is reported, no bounce).
    pub fn sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.velocity = Vec2::new(vx, vy);
        self
    }

    pub fn with_facing(mut self, facing: f64) -> Self {
        self.facing = facing;
        self
    }

    // -- kinematics -----------------------------------------------------------

    /// Advance the position by `velocity * dt`. Pure Euler step; `dt` may vary per call.
    #[inline]
    pub fn integrate(&mut self, dt: f64) {
        self.position.x += self.velocity.x * dt;
        self.position.y += self.velocity.y * dt;
    }

    /// Magnitude of the velocity.
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Velocity as `(speed, direction)`, direction in `(-π, π]`.
    pub fn speed_and_direction(&self) -> (f64, f64) {
        polar_from_rect(self.velocity.x, self.velocity.y)
    }

    // -- accessors ------------------------------------------------------------

    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    pub fn half_width(&self) -> f64 {
        self.half_extents.x
    }

    pub fn half_height(&self) -> f64 {
        self.half_extents.y
    }

    pub fn width(&self) -> f64 {
        self.half_extents.x * 2.0
    }

    pub fn height(&self) -> f64 {
        self.half_extents.y * 2.0
    }

    pub fn left(&self) -> f64 {
        self.position.x - self.half_extents.x
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.half_extents.x
    }

    pub fn top(&self) -> f64 {
        self.position.y - self.half_extents.y
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.half_extents.y
    }

    /// Unrotated sprite rectangle. Obstacles are collided into using this.
    pub fn bounds(&self) -> Rect {
        Rect::from_centre(self.position, self.half_extents)
    }

    pub fn shape(&self) -> ColliderShape {
        self.shape
    }

    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    pub fn collision_box(&self) -> &CollisionBox {
        &self.collision_box
    }

    pub fn role(&self) -> BodyRole {
        self.role
    }

    pub fn is_sensor(&self) -> bool {
        self.is_sensor
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
