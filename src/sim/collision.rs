//! Axis-aligned box overlap and penetration resolution
//!
//! Everything that collides in the platformer is a box: bodies, platforms,
//! projectiles (their bounding square) and pickups. Resolution pushes a box
//! out along the axis of shallower penetration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (screen space, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from its centre point and full size
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Box from its top-left corner and full size
    pub fn from_top_left(top_left: Vec2, size: Vec2) -> Self {
        Self {
            min: top_left,
            max: top_left + size,
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

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Strict overlap: boxes that only share an edge do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Which face of the solid box a body was pushed out of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    /// Body was left of the solid, pushed back out to the left
    Left,
    /// Body was right of the solid, pushed back out to the right
    Right,
    /// Body landed on the solid
    Top,
    /// Body bumped the solid's underside
    Bottom,
}

impl Contact {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Contact::Left | Contact::Right)
    }
}

/// Overlap depths of a body box into a solid box, one per side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Penetration {
    pub fn between(body: &Aabb, solid: &Aabb) -> Self {
        Self {
            left: body.right() - solid.left(),
            right: solid.right() - body.left(),
            top: body.bottom() - solid.top(),
            bottom: solid.bottom() - body.top(),
        }
    }

    /// Pick the side to resolve along.
    ///
    /// The shallower axis wins; an exact tie resolves horizontally.
    pub fn contact(&self) -> Contact {
        let min_dx = self.left.min(self.right);
        let min_dy = self.top.min(self.bottom);

        if min_dx <= min_dy {
            if self.left < self.right {
                Contact::Left
            } else {
                Contact::Right
            }
        } else if self.top < self.bottom {
            Contact::Top
        } else {
            Contact::Bottom
        }
    }
}

/// Determine the contact side of an overlapping pair, or `None` if they
/// don't overlap
pub fn box_contact(body: &Aabb, solid: &Aabb) -> Option<Contact> {
    if !body.overlaps(solid) {
        return None;
    }
    Some(Penetration::between(body, solid).contact())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn solid() -> Aabb {
        Aabb::from_top_left(Vec2::new(100.0, 500.0), Vec2::new(200.0, 20.0))
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let body = Aabb::from_top_left(Vec2::new(60.0, 440.0), Vec2::new(40.0, 60.0));
        assert!(!body.overlaps(&solid()));
        assert_eq!(box_contact(&body, &solid()), None);
    }

    #[test]
    fn test_landing_resolves_top() {
        // Feet 2px into the platform top, well inside horizontally
        let body = Aabb::from_center(Vec2::new(200.0, 472.0), Vec2::new(40.0, 60.0));
        assert_eq!(box_contact(&body, &solid()), Some(Contact::Top));
    }

    #[test]
    fn test_side_hit_resolves_horizontal() {
        // Body overlapping the left edge by 3px, vertically centred on the slab
        let body = Aabb::from_center(Vec2::new(83.0, 510.0), Vec2::new(40.0, 60.0));
        assert_eq!(box_contact(&body, &solid()), Some(Contact::Left));
    }

    #[test]
    fn test_underside_bump() {
        let body = Aabb::from_center(Vec2::new(200.0, 548.0), Vec2::new(40.0, 60.0));
        assert_eq!(box_contact(&body, &solid()), Some(Contact::Bottom));
    }

    #[test]
    fn test_exact_tie_is_horizontal() {
        // 5px into both the left face and the top face
        let body = Aabb::from_top_left(Vec2::new(65.0, 445.0), Vec2::new(40.0, 60.0));
        let pen = Penetration::between(&body, &solid());
        assert_eq!(pen.left.min(pen.right), pen.top.min(pen.bottom));
        assert_eq!(box_contact(&body, &solid()), Some(Contact::Left));
    }

    proptest! {
        #[test]
        fn prop_equal_depths_always_resolve_horizontally(
            whole in 1u8..10,
            half in any::<bool>(),
            from_left in any::<bool>(),
            from_top in any::<bool>(),
        ) {
            // Half-pixel steps keep every sum exact in f32
            let depth = whole as f32 + if half { 0.5 } else { 0.0 };
            let s = solid();
            let size = Vec2::new(40.0, 60.0);
            let x = if from_left { s.left() - size.x + depth } else { s.right() - depth };
            let y = if from_top { s.top() - size.y + depth } else { s.bottom() - depth };
            let body = Aabb::from_top_left(Vec2::new(x, y), size);
            let contact = box_contact(&body, &s);
            prop_assert!(contact.is_some());
            prop_assert!(contact.unwrap().is_horizontal());
        }

        #[test]
        fn prop_separated_boxes_have_no_contact(
            gap in 0.0f32..300.0,
            y in 0.0f32..800.0,
        ) {
            let s = solid();
            let body = Aabb::from_top_left(Vec2::new(s.right() + gap, y), Vec2::new(40.0, 60.0));
            prop_assert_eq!(box_contact(&body, &s), None);
        }
    }
}
