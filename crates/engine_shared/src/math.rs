// crates/engine_shared/src/math.rs
//! 2D helpers on top of `glam::DVec2` plus the axis-aligned rectangle used
//! for every collision test in the game.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Operations the game needs that glam does not spell the same way.
pub trait Vec2Ext {
    /// Unit vector in the same direction, or zero for a zero-length input.
    fn normalized(self) -> Self;
    /// Rotate counter-clockwise by `angle` radians.
    fn rotated(self, angle: f64) -> Self;
    /// Clamp each axis into the closed range covered by `rect`.
    fn clamp_rect(self, rect: &Rect) -> Self;
    /// Truncate to integer pixel coordinates.
    fn to_point(self) -> (i32, i32);
}

impl Vec2Ext for DVec2 {
    fn normalized(self) -> Self {
        self.normalize_or_zero()
    }

    fn rotated(self, angle: f64) -> Self {
        DVec2::from_angle(angle).rotate(self)
    }

    fn clamp_rect(self, rect: &Rect) -> Self {
        // Not glam's clamp: that one asserts min <= max, and a degenerate
        // rect is a valid (if useless) input here.
        DVec2::new(
            self.x.max(rect.pos.x).min(rect.pos.x + rect.size.x),
            self.y.max(rect.pos.y).min(rect.pos.y + rect.size.y),
        )
    }

    fn to_point(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// Axis-aligned bounding box. `pos` is the top-left corner, y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: DVec2,
    pub size: DVec2,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            pos: DVec2::new(x, y),
            size: DVec2::new(w, h),
        }
    }

    pub fn from_pos_size(pos: DVec2, size: DVec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.pos.y + self.size.y
    }

    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Strict overlap: rectangles that merely share an edge do not intersect,
    /// so an entity resting exactly on a platform is not "inside" it.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// The overlapping region, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Half-open containment, matching how grid cells tile the screen.
    pub fn contains_point(&self, point: DVec2) -> bool {
        point.x >= self.left() && point.x < self.right() && point.y >= self.top() && point.y < self.bottom()
    }

    pub fn translated(&self, offset: DVec2) -> Rect {
        Rect::from_pos_size(self.pos + offset, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn normalize_zero_stays_zero() {
        assert_eq!(DVec2::ZERO.normalized(), DVec2::ZERO);
        let n = DVec2::new(3.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert!((n.x - 0.6).abs() < 1e-12);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = DVec2::new(1.0, 0.0).rotated(FRAC_PI_2);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn lerp_midpoint() {
        let a = DVec2::new(0.0, 10.0);
        let b = DVec2::new(10.0, 20.0);
        assert_eq!(a.lerp(b, 0.5), DVec2::new(5.0, 15.0));
    }

    #[test]
    fn clamp_into_rect() {
        let r = Rect::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(DVec2::new(-3.0, 7.0).clamp_rect(&r), DVec2::new(0.0, 5.0));
        assert_eq!(DVec2::new(4.0, 2.0).clamp_rect(&r), DVec2::new(4.0, 2.0));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let floor = Rect::new(0.0, 100.0, 200.0, 30.0);
        let resting = Rect::new(10.0, 40.0, 30.0, 60.0);
        assert!(!resting.intersects(&floor));
        assert!(resting.translated(DVec2::new(0.0, 1.0)).intersects(&floor));
    }

    #[test]
    fn intersection_area() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 8.0, 10.0, 10.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i, Rect::new(5.0, 8.0, 5.0, 2.0));
        assert!(a.intersection(&Rect::new(20.0, 0.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn empty_rect_never_intersects() {
        let a = Rect::new(0.0, 0.0, 0.0, 10.0);
        assert!(!a.intersects(&Rect::new(-5.0, -5.0, 20.0, 20.0)));
    }
}
