//! Keeping bodies inside a region.
//!
//! Two policies exist. Cars are *clamped*: the sprite is pushed back onto the
//! play-area edge and the outward velocity component is dropped. Patrolling
//! bodies are *reflected*: the overshoot is mirrored back inside and the
//! velocity component flips.

use crate::body::{Body, Rect};

/// Clamp `body`'s sprite rectangle inside `area`.
///
/// Each axis is handled on its own, and on each axis only one side is
/// corrected per call (the left/top edge wins if the body is wider than the
/// area). Velocity pointing out of the crossed edge is zeroed; velocity
/// pointing back inside is kept. Returns `true` if anything was corrected.
pub fn enforce_boundaries(body: &mut Body, area: &Rect) -> bool {
    let mut clamped = false;

    if body.left() < area.left {
        body.position.x = area.left + body.half_width();
        if body.velocity.x < 0.0 {
            body.velocity.x = 0.0;
        }
        clamped = true;
    } else if body.right() > area.right {
        body.position.x = area.right - body.half_width();
        if body.velocity.x > 0.0 {
            body.velocity.x = 0.0;
        }
        clamped = true;
    }

    if body.top() < area.top {
        body.position.y = area.top + body.half_height();
        if body.velocity.y < 0.0 {
            body.velocity.y = 0.0;
        }
        clamped = true;
    } else if body.bottom() > area.bottom {
        body.position.y = area.bottom - body.half_height();
        if body.velocity.y > 0.0 {
            body.velocity.y = 0.0;
        }
        clamped = true;
    }

    clamped
}

/// Region the *centre* of `body` may occupy so that its sprite stays inside `area`.
pub fn centre_bounds(body: &Body, area: &Rect) -> Rect {
    Rect::new(
        area.left + body.half_width(),
        area.top + body.half_height(),
        area.right - body.half_width(),
        area.bottom - body.half_height(),
    )
}

/// Bounce `body`'s centre off the edges of `centre_area`.
///
/// A centre that overshot an edge by `d` ends up `d` inside it, and the
/// velocity component on that axis is negated.
pub fn reflect_within(body: &mut Body, centre_area: &Rect) -> bool {
    let mut reflected = false;
    let p = &mut body.position;
    let v = &mut body.velocity;

    if p.x > centre_area.right {
        p.x = centre_area.right - (p.x - centre_area.right);
        v.x = -v.x;
        reflected = true;
    } else if p.x < centre_area.left {
        p.x = centre_area.left + (centre_area.left - p.x);
        v.x = -v.x;
        reflected = true;
    }

    if p.y > centre_area.bottom {
        p.y = centre_area.bottom - (p.y - centre_area.bottom);
        v.y = -v.y;
        reflected = true;
    } else if p.y < centre_area.top {
        p.y = centre_area.top + (centre_area.top - p.y);
        v.y = -v.y;
        reflected = true;
    }

    reflected
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    fn area() -> Rect {
        Rect::new(-100.0, -50.0, 100.0, 50.0)
    }

    // -- 1. Clamp ---------------------------------------------------------------

    #[test]
    fn clamps_left_and_zeroes_outward_velocity() {
        let mut body = Body::new(-95.0, 0.0, 20.0, 10.0).with_velocity(-30.0, 4.0);
        assert!(enforce_boundaries(&mut body, &area()));
        assert_eq!(body.position, Vec2::new(-90.0, 0.0));
        assert_eq!(body.velocity, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn inward_velocity_survives_clamp() {
        let mut body = Body::new(98.0, 0.0, 20.0, 10.0).with_velocity(-5.0, 0.0);
        assert!(enforce_boundaries(&mut body, &area()));
        assert_eq!(body.position.x, 90.0);
        assert_eq!(body.velocity.x, -5.0);
    }

    #[test]
    fn corner_overshoot_clamps_both_axes() {
        let mut body = Body::new(200.0, 200.0, 20.0, 10.0).with_velocity(10.0, 10.0);
        enforce_boundaries(&mut body, &area());
        assert_eq!(body.position, Vec2::new(90.0, 45.0));
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn inside_is_untouched() {
        let mut body = Body::new(0.0, 0.0, 20.0, 10.0).with_velocity(-7.0, 3.0);
        assert!(!enforce_boundaries(&mut body, &area()));
        assert_eq!(body.position, Vec2::ZERO);
        assert_eq!(body.velocity, Vec2::new(-7.0, 3.0));
    }

    #[test]
    fn touching_edge_is_not_a_violation() {
        let mut body = Body::new(90.0, -45.0, 20.0, 10.0).with_velocity(3.0, -3.0);
        assert!(!enforce_boundaries(&mut body, &area()));
        assert_eq!(body.velocity, Vec2::new(3.0, -3.0));
    }

    // -- 2. Reflect -------------------------------------------------------------

    #[test]
    fn reflect_mirrors_overshoot() {
        let body = Body::new(0.0, 0.0, 20.0, 20.0);
        let bounds = centre_bounds(&body, &Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(bounds, Rect::new(10.0, 10.0, 190.0, 90.0));

        let mut body = body.with_velocity(-40.0, 15.0);
        body.position = Vec2::new(4.0, 95.0);
        assert!(reflect_within(&mut body, &bounds));
        assert_eq!(body.position, Vec2::new(16.0, 85.0));
        assert_eq!(body.velocity, Vec2::new(40.0, -15.0));
    }

    #[test]
    fn reflect_inside_is_noop() {
        let mut body = Body::new(50.0, 50.0, 20.0, 20.0).with_velocity(1.0, 1.0);
        let bounds = Rect::new(10.0, 10.0, 190.0, 90.0);
        assert!(!reflect_within(&mut body, &bounds));
        assert_eq!(body.velocity, Vec2::new(1.0, 1.0));
    }
}
