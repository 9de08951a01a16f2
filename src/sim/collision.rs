//! Collision detection and response for balls against blocks and walls
//!
//! Balls are circles, blocks are axis-aligned rectangles. Response is always
//! along a single axis: the one with the least penetration.

use glam::Vec2;

use super::rect::Rect;

/// Extra push-out beyond the measured penetration so a resolved ball is
/// strictly separated instead of exactly touching.
pub const CONTACT_SLOP: f32 = 0.01;

/// Collision response axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    #[inline]
    pub fn other(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// Result of a circle-vs-rectangle test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    /// Whether the circle touches or overlaps the rectangle
    pub overlapping: bool,
    /// Nearest point on the rectangle to the circle center
    pub nearest: Vec2,
    /// Distance to move along x to clear the rectangle
    pub penetration_x: f32,
    /// Distance to move along y to clear the rectangle
    pub penetration_y: f32,
}

impl Overlap {
    /// Axis of least penetration. Exact ties resolve horizontally.
    #[inline]
    pub fn axis(&self) -> Axis {
        if self.penetration_x <= self.penetration_y {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }
}

/// Check a circle against a rectangle
///
/// The center is clamped to the rectangle to find the nearest point; the
/// circle overlaps iff the squared distance to it is at most `r²`. Per-axis
/// penetration is `r - |center - nearest|`.
///
/// A center inside the rectangle (deep penetration after a hitch) also has
/// to travel to the nearest face on that axis, so that distance is added.
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> Overlap {
    let nearest = rect.clamp_point(center);
    let delta = center - nearest;
    let overlapping = delta.length_squared() <= radius * radius;

    let mut penetration_x = radius - delta.x.abs();
    let mut penetration_y = radius - delta.y.abs();

    if delta == Vec2::ZERO {
        let c = rect.center();
        let to_face_x = if center.x >= c.x {
            rect.right() - center.x
        } else {
            center.x - rect.x
        };
        let to_face_y = if center.y >= c.y {
            rect.bottom() - center.y
        } else {
            center.y - rect.y
        };
        penetration_x += to_face_x;
        penetration_y += to_face_y;
    }

    Overlap {
        overlapping,
        nearest,
        penetration_x,
        penetration_y,
    }
}

/// Direction (+1/-1) pointing from the rectangle center toward `value` on one axis.
/// A perfectly centered ball is pushed in the positive direction.
#[inline]
pub fn away_sign(value: f32, rect_center: f32) -> f32 {
    if value < rect_center { -1.0 } else { 1.0 }
}

/// Position after pushing out along the least-penetration axis by the
/// measured penetration. Returns the new center and the push sign.
fn push_by_penetration(pos: Vec2, overlap: &Overlap, rect: &Rect) -> (Vec2, f32) {
    let c = rect.center();
    match overlap.axis() {
        Axis::Horizontal => {
            let sign = away_sign(pos.x, c.x);
            let x = pos.x + sign * (overlap.penetration_x + CONTACT_SLOP);
            (Vec2::new(x, pos.y), sign)
        }
        Axis::Vertical => {
            let sign = away_sign(pos.y, c.y);
            let y = pos.y + sign * (overlap.penetration_y + CONTACT_SLOP);
            (Vec2::new(pos.x, y), sign)
        }
    }
}

/// Position after moving the center a full radius past the facing edge on `axis`.
fn push_past_face(pos: Vec2, radius: f32, rect: &Rect, axis: Axis) -> (Vec2, f32) {
    let c = rect.center();
    match axis {
        Axis::Horizontal => {
            let sign = away_sign(pos.x, c.x);
            let x = if sign > 0.0 {
                rect.right() + radius + CONTACT_SLOP
            } else {
                rect.x - radius - CONTACT_SLOP
            };
            (Vec2::new(x, pos.y), sign)
        }
        Axis::Vertical => {
            let sign = away_sign(pos.y, c.y);
            let y = if sign > 0.0 {
                rect.bottom() + radius + CONTACT_SLOP
            } else {
                rect.y - radius - CONTACT_SLOP
            };
            (Vec2::new(pos.x, y), sign)
        }
    }
}

/// Resolve a ball that overlaps a block: push out along the least-penetration
/// axis and turn that velocity component away from the block.
///
/// `bounds` is the rectangle the ball center must stay inside (the field
/// shrunk by the radius). If the preferred push would leave it, the ball is
/// cleared across the other axis instead; if neither fits, the preferred push
/// is kept and the caller's wall clamp takes over.
///
/// Returns the axis used.
pub fn resolve_circle_rect(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    overlap: &Overlap,
    rect: &Rect,
    bounds: &Rect,
) -> Axis {
    let preferred = overlap.axis();
    let (mut axis, (mut new_pos, mut sign)) = (preferred, push_by_penetration(*pos, overlap, rect));

    if !bounds.contains(new_pos) {
        let fallback = push_past_face(*pos, radius, rect, preferred.other());
        if bounds.contains(fallback.0) {
            axis = preferred.other();
            (new_pos, sign) = fallback;
        }
    }

    *pos = new_pos;
    match axis {
        Axis::Horizontal => vel.x = sign * vel.x.abs(),
        Axis::Vertical => vel.y = sign * vel.y.abs(),
    }
    axis
}

/// Valid region for a ball center: the field shrunk by the radius on every side
#[inline]
pub fn center_bounds(radius: f32, width: f32, height: f32) -> Rect {
    Rect::new(radius, radius, width - 2.0 * radius, height - 2.0 * radius)
}

/// Clamp a ball into `[radius, extent - radius]` on both axes.
///
/// Whenever a clamp happens the perpendicular velocity component is turned to
/// point back into the field; the parallel component is untouched.
/// Returns true if any wall was hit.
pub fn clamp_to_walls(pos: &mut Vec2, vel: &mut Vec2, radius: f32, width: f32, height: f32) -> bool {
    let mut hit = false;

    if pos.x < radius {
        pos.x = radius;
        vel.x = vel.x.abs();
        hit = true;
    } else if pos.x > width - radius {
        pos.x = width - radius;
        vel.x = -vel.x.abs();
        hit = true;
    }

    if pos.y < radius {
        pos.y = radius;
        vel.y = vel.y.abs();
        hit = true;
    } else if pos.y > height - radius {
        pos.y = height - radius;
        vel.y = -vel.y.abs();
        hit = true;
    }

    hit
}
