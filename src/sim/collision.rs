//! Collision detection primitives
//!
//! The arena is flat and axis aligned, so everything reduces to circles and
//! bullet-sized rectangles.

use glam::Vec2;

/// Circle-circle overlap (touching edges do not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Axis-aligned rectangle (centered at `center`) against a circle
pub fn rect_circle_overlap(center: Vec2, size: Vec2, circle: Vec2, radius: f32) -> bool {
    let half = size / 2.0;
    let closest = circle.clamp(center - half, center + half);
    circle.distance_squared(closest) < radius * radius
}

/// Penetration depth of two circles (0 when apart)
#[inline]
pub fn circle_overlap_depth(a: Vec2, ra: f32, b: Vec2, rb: f32) -> f32 {
    (ra + rb - a.distance(b)).max(0.0)
}

/// True if `pos` lies inside `[0, size]` expanded by `margin` on every side
#[inline]
pub fn inside_bounds(pos: Vec2, size: Vec2, margin: f32) -> bool {
    pos.x >= -margin && pos.y >= -margin && pos.x <= size.x + margin && pos.y <= size.y + margin
}

/// Clamp a circle so it stays fully inside `[0, size]`
#[inline]
pub fn clamp_to_bounds(pos: Vec2, radius: f32, size: Vec2) -> Vec2 {
    let min = Vec2::splat(radius);
    let max = (size - Vec2::splat(radius)).max(min);
    pos.clamp(min, max)
}
