//! Axis-aligned bounding box overlap
//!
//! Field coordinates: x grows to the right, y grows downward, the floor line
//! is the bottom edge of the field.

use glam::Vec2;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    #[inline]
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Strict overlap: boxes that merely touch edges do not collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Whole box is left of the field
    #[inline]
    pub fn is_past_left_edge(&self) -> bool {
        self.right() < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn boxed(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::from_pos_size(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_overlap() {
        let player = boxed(50.0, 540.0, 40.0, 60.0);
        let log = boxed(70.0, 560.0, 50.0, 40.0);
        assert!(player.overlaps(&log));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let right = boxed(10.0, 0.0, 10.0, 10.0);
        let below = boxed(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn test_overhead_obstacle_misses() {
        let player = boxed(50.0, 540.0, 40.0, 60.0);
        let vine = boxed(60.0, 0.0, 10.0, 100.0);
        assert!(!player.overlaps(&vine));
    }

    #[test]
    fn test_past_left_edge() {
        assert!(!boxed(-10.0, 0.0, 10.0, 5.0).is_past_left_edge());
        assert!(boxed(-10.1, 0.0, 10.0, 5.0).is_past_left_edge());
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0, aw in 1.0f32..200.0, ah in 1.0f32..200.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0, bw in 1.0f32..200.0, bh in 1.0f32..200.0,
        ) {
            let a = boxed(ax, ay, aw, ah);
            let b = boxed(bx, by, bw, bh);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
