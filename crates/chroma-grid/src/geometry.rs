//! Faces, axis-aligned boxes and the cell ranges they cover.
//!
//! The y axis points down: [`Face::Down`] has direction `(0, 1)` and gravity is
//! a positive y force.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Face
// ---------------------------------------------------------------------------

/// One of the four cardinal contact directions.
///
/// Faces name the side of the *moving* box that is being probed: a body
/// resting on a floor is in contact on [`Face::Down`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Left,
    Right,
    Up,
    Down,
}

impl Face {
    /// All faces in probe order.
    pub const ALL: [Face; 4] = [Face::Left, Face::Right, Face::Up, Face::Down];

    /// Unit vector pointing out of this face.
    #[inline]
    pub fn direction(self) -> Vec2 {
        match self {
            Face::Left => Vec2::new(-1.0, 0.0),
            Face::Right => Vec2::new(1.0, 0.0),
            Face::Up => Vec2::new(0.0, -1.0),
            Face::Down => Vec2::new(0.0, 1.0),
        }
    }

    /// The face on the other side of the box.
    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::Left => Face::Right,
            Face::Right => Face::Left,
            Face::Up => Face::Down,
            Face::Down => Face::Up,
        }
    }

    /// Stable index into per-face arrays (`[bool; 4]` and friends).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Face::Left => 0,
            Face::Right => 1,
            Face::Up => 2,
            Face::Down => 3,
        }
    }

    /// Cell offset of the neighbor on this side.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Face::Left => (-1, 0),
            Face::Right => (1, 0),
            Face::Up => (0, -1),
            Face::Down => (0, 1),
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Face::Left => "left",
            Face::Right => "right",
            Face::Up => "up",
            Face::Down => "down",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// An axis-aligned box given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub position: Vec2,
    pub size: Vec2,
}

impl Bounds {
    #[inline]
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Bottom-right corner.
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// The same box moved by `offset`.
    #[inline]
    pub fn translated(self, offset: Vec2) -> Self {
        Self {
            position: self.position + offset,
            size: self.size,
        }
    }

    /// Strict overlap test. Boxes that only share an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.position.x < other.position.x + other.size.x
            && self.position.x + self.size.x > other.position.x
            && self.position.y < other.position.y + other.size.y
            && self.position.y + self.size.y > other.position.y
    }

    /// Inclusive range of grid cells touched by this box.
    ///
    /// Both corners are floored, so a box whose far edge lies exactly on a
    /// cell boundary also covers the next cell.
    pub fn cells(&self) -> CellRange {
        let max = self.max();
        CellRange {
            min_x: self.position.x.floor() as i32,
            min_y: self.position.y.floor() as i32,
            max_x: max.x.floor() as i32,
            max_y: max.y.floor() as i32,
        }
    }
}

// ---------------------------------------------------------------------------
// CellRange
// ---------------------------------------------------------------------------

/// An inclusive rectangle of cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl CellRange {
    /// Whether every cell lies inside `[0, width) x [0, height)`.
    pub fn within(&self, width: usize, height: usize) -> bool {
        self.min_x >= 0
            && self.min_y >= 0
            && (self.max_x as i64) < width as i64
            && (self.max_y as i64) < height as i64
    }

    /// The part of this range inside the grid, or `None` if nothing is left.
    pub fn clamped(&self, width: usize, height: usize) -> Option<CellRange> {
        if width == 0 || height == 0 {
            return None;
        }
        let last_x = (width - 1).min(i32::MAX as usize) as i32;
        let last_y = (height - 1).min(i32::MAX as usize) as i32;
        let range = CellRange {
            min_x: self.min_x.max(0),
            min_y: self.min_y.max(0),
            max_x: self.max_x.min(last_x),
            max_y: self.max_y.min(last_y),
        };
        (range.min_x <= range.max_x && range.min_y <= range.max_y).then_some(range)
    }

    /// Iterate the covered cells, column by column.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> {
        let CellRange {
            min_x,
            min_y,
            max_x,
            max_y,
        } = *self;
        (min_x..=max_x).flat_map(move |x| (min_y..=max_y).map(move |y| (x, y)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for face in Face::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_eq!(face.direction(), -face.opposite().direction());
        }
    }

    #[test]
    fn face_indices_are_distinct() {
        let mut seen = [false; 4];
        for face in Face::ALL {
            assert!(!seen[face.index()]);
            seen[face.index()] = true;
        }
    }

    #[test]
    fn unit_box_across_a_corner_covers_four_cells() {
        let b = Bounds::new(Vec2::new(1.5, 1.5), Vec2::new(1.0, 1.0));
        assert_eq!(b.cells().iter().count(), 4);
    }

    #[test]
    fn far_edge_on_boundary_covers_next_cell() {
        let b = Bounds::new(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0));
        let cells = b.cells();
        assert_eq!((cells.min_x, cells.max_x), (1, 2));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Bounds::new(Vec2::ZERO, Vec2::ONE);
        let b = Bounds::new(Vec2::new(1.0, 0.0), Vec2::ONE);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.translated(Vec2::new(-0.01, 0.0))));
    }

    #[test]
    fn clamped_range_drops_outside_cells() {
        let range = CellRange {
            min_x: -2,
            min_y: -1,
            max_x: 1,
            max_y: 7,
        };
        assert!(!range.within(4, 4));
        let clamped = range.clamped(4, 4).unwrap();
        assert_eq!(
            clamped,
            CellRange {
                min_x: 0,
                min_y: 0,
                max_x: 1,
                max_y: 3
            }
        );

        let gone = CellRange {
            min_x: 10,
            min_y: 0,
            max_x: 12,
            max_y: 1,
        };
        assert!(gone.clamped(4, 4).is_none());
    }
}
