//! Rotated-corner collision detection and bounce response.
//!
//! The moving body is represented by the four corners of its
//! [`CollisionBox`], rotated by its facing angle. The body it runs into is
//! treated as its unrotated sprite rectangle. The first corner found inside
//! that rectangle (order: top-left, top-right, bottom-left, bottom-right)
//! decides the contact:
//!
//! 1. The axis whose nearer edge is closest to the corner is chosen.
//! 2. The moving body is shifted along that axis so the corner sits on the edge.
//! 3. The velocity component on that axis is negated and scaled by the
//!    product of both restitution factors. The other component is untouched.
//!
//! Only corners of the mover are tested, so a small fast body can pass
//! through a larger one between ticks. There is no swept test.

use crate::body::{Body, BodyRole, ColliderShape, Rect};
use crate::math::Vec2;

// ---------------------------------------------------------------------------
// CollisionBox
// ---------------------------------------------------------------------------

/// A rectangle in body-local space (facing angle zero), possibly smaller than the sprite.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CollisionBox {
    /// Local top-left corner.
    pub min: Vec2,
    /// Local bottom-right corner.
    pub max: Vec2,
}

impl CollisionBox {
    /// Box spanning `[min_x, max_x] x [min_y, max_y]` in local space.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    /// Box covering the whole sprite.
    pub fn from_half_extents(half_extents: Vec2) -> Self {
        Self {
            min: -half_extents,
            max: half_extents,
        }
    }

    /// Local corners in test order.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.min.x, self.min.y),
            Vec2::new(self.max.x, self.min.y),
            Vec2::new(self.min.x, self.max.y),
            Vec2::new(self.max.x, self.max.y),
        ]
    }
}

/// Which corner of the collision box made contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Corners in the order they are tested.
    pub const ORDER: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// The axis a contact is resolved along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    /// Pushed left or right; x velocity reflected.
    Horizontal,
    /// Pushed up or down; y velocity reflected.
    Vertical,
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// World-space corners of `body`'s collision box under its current facing.
///
/// Order matches [`Corner::ORDER`].
pub fn rotated_corners(body: &Body) -> [Vec2; 4] {
    let centre = body.position;
    body.collision_box()
        .corners()
        .map(|local| centre + local.rotated(body.facing))
}

/// Axis-aligned box enclosing the rotated collision box.
pub fn rotated_bounding_box(body: &Body) -> Rect {
    let corners = rotated_corners(body);
    let mut rect = Rect::new(corners[0].x, corners[0].y, corners[0].x, corners[0].y);
    for corner in &corners[1..] {
        rect.left = rect.left.min(corner.x);
        rect.right = rect.right.max(corner.x);
        rect.top = rect.top.min(corner.y);
        rect.bottom = rect.bottom.max(corner.y);
    }
    rect
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// A resolved overlap between a moving body and an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Contact {
    /// The first corner found inside the obstacle.
    pub corner: Corner,
    /// World position of that corner before correction.
    pub point: Vec2,
    /// Axis the contact is resolved along.
    pub axis: Axis,
    /// Displacement that puts the corner on the obstacle's nearer edge.
    pub correction: Vec2,
}

/// Find the first corner of `mover` inside `obstacle`'s rectangle and work out
/// how to push it out. Returns `None` when no corner is inside.
pub fn find_contact(mover: &Body, obstacle: &Body) -> Option<Contact> {
    let bounds = obstacle.bounds();
    let corners = rotated_corners(mover);

    let (corner, point) = Corner::ORDER
        .iter()
        .zip(corners.iter())
        .find(|(_, point)| bounds.contains(**point))
        .map(|(corner, point)| (*corner, *point))?;

    let left_offset = (point.x - bounds.left).abs();
    let right_offset = (bounds.right - point.x).abs();
    let top_offset = (point.y - bounds.top).abs();
    let bottom_offset = (bounds.bottom - point.y).abs();

    let (axis, correction) = if left_offset.min(right_offset) < top_offset.min(bottom_offset) {
        let dx = if left_offset < right_offset {
            -left_offset
        } else {
            right_offset
        };
        (Axis::Horizontal, Vec2::new(dx, 0.0))
    } else {
        let dy = if top_offset < bottom_offset {
            -top_offset
        } else {
            bottom_offset
        };
        (Axis::Vertical, Vec2::new(0.0, dy))
    };

    Some(Contact {
        corner,
        point,
        axis,
        correction,
    })
}

/// Move `mover` out of `obstacle` and reflect the velocity along the contact axis.
///
/// `obstacle` is only read for its restitution.
pub fn apply_response(mover: &mut Body, obstacle: &Body, contact: &Contact) {
    mover.position = mover.position + contact.correction;

    let factor = mover.restitution() * obstacle.restitution();
    match contact.axis {
        Axis::Horizontal => mover.velocity.x = -mover.velocity.x * factor,
        Axis::Vertical => mover.velocity.y = -mover.velocity.y * factor,
    }
}

impl Body {
    /// Test this body against `other` and resolve any overlap.
    ///
    /// Only player bodies resolve; for any other role this returns `false`
    /// without testing. Pairs involving a circle shape are skipped. When
    /// `other` is a sensor the contact is reported but nothing moves.
    /// `other` is never modified.
    pub fn check_collision_with(&mut self, other: &Body) -> bool {
        if self.role() != BodyRole::Player {
            return false;
        }
        if self.shape() == ColliderShape::Circle || other.shape() == ColliderShape::Circle {
            tracing::trace!("circle collision shape is not resolved, skipping pair");
            return false;
        }

        let Some(contact) = find_contact(self, other) else {
            return false;
        };
        if !other.is_sensor() {
            apply_response(self, other, &contact);
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
