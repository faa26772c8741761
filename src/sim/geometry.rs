//! Grid and continuous-space primitives
//!
//! Locations are `glam::Vec2` points measured in cell units: the center of
//! grid cell (x, y) sits at exactly (x as f32, y as f32), and adjacent
//! centers are 1.0 apart. Agents move continuously between centers; all
//! closeness tests use manhattan distance.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Travel axis of a cardinal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// The four unit cardinal directions. Y grows downward (screen order),
/// so North is -y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four cardinals in a fixed N, E, S, W order. Iteration order is
    /// part of the deterministic contract; random choices index into
    /// slices built in this order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit displacement of one step in this direction.
    #[inline]
    pub fn delta(self) -> Vec2 {
        match self {
            Direction::North => Vec2::new(0.0, -1.0),
            Direction::East => Vec2::new(1.0, 0.0),
            Direction::South => Vec2::new(0.0, 1.0),
            Direction::West => Vec2::new(-1.0, 0.0),
        }
    }

    /// Integer cell offset of one step in this direction.
    #[inline]
    pub fn grid_step(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Axis this direction travels along.
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::Y,
            Direction::East | Direction::West => Axis::X,
        }
    }

    /// Position in [`Direction::ALL`], also the wall-join bit position.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Integer grid coordinates, top-left origin, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell whose unit square contains `location` (centers at integer
    /// coordinates, so this is a per-component round).
    #[inline]
    pub fn containing(location: Vec2) -> Self {
        Self {
            x: location.x.round() as i32,
            y: location.y.round() as i32,
        }
    }

    /// Continuous point at this cell's center.
    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// One cell over in `direction`.
    #[inline]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.grid_step();
        self.offset(dx, dy)
    }

    /// Grid manhattan distance to another cell.
    #[inline]
    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Manhattan magnitude of a displacement.
#[inline]
pub fn manhattan(v: Vec2) -> f32 {
    v.x.abs() + v.y.abs()
}

/// Whether two points agree to within `tolerance`, manhattan-wise.
#[inline]
pub fn is_close(a: Vec2, b: Vec2, tolerance: f32) -> bool {
    manhattan(a - b) < tolerance
}

/// Whether a displacement runs along a single axis (to within `epsilon`
/// on the other component).
#[inline]
pub fn is_axis_aligned(v: Vec2, epsilon: f32) -> bool {
    v.x.abs() <= epsilon || v.y.abs() <= epsilon
}
