//! Axis-aligned rectangle overlap
//!
//! Cars and cones are both boxes; a hit is a strict overlap of the two.
//! The test is not swept: a cone that moves farther than the car's height
//! in one frame can skip past it.

use glam::Vec2;

/// Axis-aligned bounding box (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Strict overlap; boxes that only share an edge do not touch
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Same box moved by `delta`
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_overlap() {
        let car = boxed(175.0, 480.0, 50.0, 80.0);
        assert!(car.overlaps(&boxed(180.0, 450.0, 40.0, 40.0)));
        assert!(boxed(180.0, 450.0, 40.0, 40.0).overlaps(&car));
    }

    #[test]
    fn test_disjoint_horizontally() {
        let car = boxed(15.0, 480.0, 50.0, 80.0);
        assert!(!car.overlaps(&boxed(200.0, 500.0, 40.0, 40.0)));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let car = boxed(100.0, 480.0, 50.0, 80.0);
        assert!(!car.overlaps(&boxed(150.0, 480.0, 40.0, 40.0)));
        assert!(!car.overlaps(&boxed(100.0, 440.0, 40.0, 40.0)));
    }

    #[test]
    fn test_translated() {
        let b = boxed(0.0, 0.0, 10.0, 10.0).translated(Vec2::new(5.0, -5.0));
        assert_eq!(b.min, Vec2::new(5.0, -5.0));
        assert_eq!(b.max, Vec2::new(15.0, 5.0));
    }
}
