//! The view onto the world.

use cabbie_physics::body::Rect;
use cabbie_physics::math::Vec2;

/// A screen-sized window that follows the player.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Camera {
    /// World position shown at the middle of the screen.
    pub centre: Vec2,
    half_extents: Vec2,
}

impl Camera {
    /// A `width` x `height` view centred on `centre`.
    pub fn new(centre: Vec2, width: f64, height: f64) -> Self {
        Self {
            centre,
            half_extents: Vec2::new(width * 0.5, height * 0.5),
        }
    }

    /// The world rectangle currently on screen.
    pub fn view(&self) -> Rect {
        Rect::from_centre(self.centre, self.half_extents)
    }

    /// Whether any part of `rect` is in view. Touching an edge does not count.
    pub fn can_see(&self, rect: &Rect) -> bool {
        self.view().overlaps(rect)
    }

    /// Scroll so that `player` stays at least `border` away from each view
    /// edge, without showing anything outside `area`.
    pub fn follow(&mut self, player: &Rect, area: &Rect, border: f64) {
        let view = self.view();
        let half = self.half_extents;

        if player.left < view.left + border {
            self.centre.x = (player.left - border).max(area.left) + half.x;
        } else if player.right > view.right - border {
            self.centre.x = (player.right + border).min(area.right) - half.x;
        }

        if player.top < view.top + border {
            self.centre.y = (player.top - border).max(area.top) + half.y;
        } else if player.bottom > view.bottom - border {
            self.centre.y = (player.bottom + border).min(area.bottom) - half.y;
        }
    }
}
