//! Small 2D math helpers shared by the handling model and the resolver.
//!
//! Angles are in radians, measured from the positive x-axis towards the
//! positive y-axis. Because screen space has y pointing down, a positive
//! angle turns clockwise on screen.

use std::f64::consts::{FRAC_PI_2, PI};
use std::ops::{Add, Mul, Neg, Sub};

/// Tolerance used by [`approx_eq`]. Values closer than this are treated as equal.
pub const EPSILON: f64 = 1.0e-6;

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2D vector used for positions, velocities and extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component (screen space, grows downwards).
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Construct a vector from its components.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle_rad`.
    #[inline]
    pub fn from_angle(angle_rad: f64) -> Self {
        let (x, y) = rect_from_polar(1.0, angle_rad);
        Self { x, y }
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// This vector rotated by `angle_rad` about the origin.
    #[inline]
    pub fn rotated(self, angle_rad: f64) -> Self {
        let (sin, cos) = angle_rad.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Whether both components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Whether `a` and `b` differ by less than [`EPSILON`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    a - EPSILON < b && b < a + EPSILON
}

/// Linear interpolation from `low` (at `factor == 0`) to `high` (at `factor == 1`).
///
/// `factor` is not clamped; callers that need clamping compute it themselves.
#[inline]
pub fn lerp(factor: f64, low: f64, high: f64) -> f64 {
    low + (high - low) * factor
}

/// `-1.0`, `0.0` or `1.0` depending on the sign of `value`.
///
/// Unlike [`f64::signum`], zero maps to zero so that "scale the magnitude and
/// restore the sign" leaves a zero speed at zero.
#[inline]
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Polar / rectangular conversion
// ---------------------------------------------------------------------------

/// Decompose `(x, y)` into `(magnitude, angle)` with the angle in `(-π, π]`.
///
/// Axis-aligned inputs are resolved without dividing by a (near) zero
/// component. The zero vector reports an angle of `0.0`.
pub fn polar_from_rect(x: f64, y: f64) -> (f64, f64) {
    let magnitude = (x * x + y * y).sqrt();

    let x_zero = approx_eq(x, 0.0);
    let y_zero = approx_eq(y, 0.0);
    let angle = match (x_zero, y_zero) {
        (true, true) => 0.0,
        (true, false) => {
            if y > 0.0 {
                FRAC_PI_2
            } else {
                -FRAC_PI_2
            }
        }
        (false, true) => {
            if x > 0.0 {
                0.0
            } else {
                PI
            }
        }
        (false, false) => {
            let base = (y / x).atan();
            if x > 0.0 {
                base
            } else if y > 0.0 {
                base + PI
            } else {
                base - PI
            }
        }
    };

    (magnitude, angle)
}

/// Rebuild `(x, y)` from a magnitude and an angle.
#[inline]
pub fn rect_from_polar(magnitude: f64, angle_rad: f64) -> (f64, f64) {
    let (sin, cos) = angle_rad.sin_cos();
    (cos * magnitude, sin * magnitude)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
