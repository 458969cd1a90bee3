//! Coordinates - World/cache frame conversion and the 8-way compass.
//!
//! The cache frame is a fixed 256x256 window centered on the agent's home
//! position, so every teammate indexes the same cells by the same numbers
//! once translated through its own frame.

use crate::constants::{FRAME_CENTER, MAP_SIZE};

// ============================================================================
// LOCATIONS
// ============================================================================

/// Absolute world coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldLoc {
    pub x: i32,
    pub y: i32,
}

impl WorldLoc {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Location `steps` cells away in the given direction.
    pub fn add(self, dir: Dir8, steps: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self { x: self.x + dx * steps, y: self.y + dy * steps }
    }
}

/// Coordinate in the agent-local cache frame (0..256 on each axis).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheLoc {
    pub x: i32,
    pub y: i32,
}

impl CacheLoc {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighboring cell one step in the given direction.
    pub fn step(self, dir: Dir8) -> Self {
        let (dx, dy) = dir.delta();
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// Squared euclidean distance to another cache cell.
    pub fn dist_sq(self, other: CacheLoc) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Chebyshev (king-move) distance to another cache cell.
    pub fn chebyshev(self, other: CacheLoc) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Row-major index into a full-resolution 256x256 grid.
    pub(crate) fn grid_index(self) -> usize {
        debug_assert!(self.x >= 0 && self.x < MAP_SIZE && self.y >= 0 && self.y < MAP_SIZE);
        (self.y as usize) * (MAP_SIZE as usize) + self.x as usize
    }
}

// ============================================================================
// FRAME
// ============================================================================

/// Translation between world coordinates and one agent's cache frame.
/// Pure data, no grid state. Conversions are exact inverses.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    home_x: i32,
    home_y: i32,
}

impl Frame {
    /// Frame centered on the agent's home position.
    pub fn new(home: WorldLoc) -> Self {
        Self { home_x: home.x, home_y: home.y }
    }

    pub fn world_to_cache(&self, w: WorldLoc) -> CacheLoc {
        CacheLoc {
            x: w.x - self.home_x + FRAME_CENTER,
            y: w.y - self.home_y + FRAME_CENTER,
        }
    }

    pub fn cache_to_world(&self, c: CacheLoc) -> WorldLoc {
        WorldLoc {
            x: c.x + self.home_x - FRAME_CENTER,
            y: c.y + self.home_y - FRAME_CENTER,
        }
    }
}

// ============================================================================
// COMPASS
// ============================================================================

/// The eight compass directions, clockwise from north. Y grows southward,
/// so north is (0, -1). The ordering matters: the navigator's wall-hugging
/// parity formula assumes exactly this layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir8 {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

/// (dx, dy) deltas indexed by `Dir8 as usize`.
pub const DIR_DELTAS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

impl Dir8 {
    pub const ALL: [Dir8; 8] = [
        Dir8::North,
        Dir8::NorthEast,
        Dir8::East,
        Dir8::SouthEast,
        Dir8::South,
        Dir8::SouthWest,
        Dir8::West,
        Dir8::NorthWest,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Dir8 {
        Self::ALL[i % 8]
    }

    pub fn delta(self) -> (i32, i32) {
        DIR_DELTAS[self as usize]
    }

    /// One step counterclockwise (north -> northwest).
    pub fn rotate_left(self) -> Dir8 {
        Self::from_index((self as usize + 7) % 8)
    }

    /// One step clockwise (north -> northeast).
    pub fn rotate_right(self) -> Dir8 {
        Self::from_index((self as usize + 1) % 8)
    }

    pub fn opposite(self) -> Dir8 {
        Self::from_index((self as usize + 4) % 8)
    }

    pub fn is_diagonal(self) -> bool {
        self as usize % 2 == 1
    }

    pub fn is_cardinal(self) -> bool {
        !self.is_diagonal()
    }

    /// Compass direction whose angular sector contains the delta vector.
    /// Sector boundaries sit at tan(22.5deg) ~ 0.414 and tan(67.5deg) ~ 2.414;
    /// dx == 0 resolves by the sign of dy alone.
    pub fn towards(dx: i32, dy: i32) -> Dir8 {
        if dx == 0 {
            return if dy > 0 { Dir8::South } else { Dir8::North };
        }
        let slope = dy as f64 / dx as f64;
        let idx = if dx > 0 {
            if slope > 2.414 {
                4
            } else if slope > 0.414 {
                3
            } else if slope > -0.414 {
                2
            } else if slope > -2.414 {
                1
            } else {
                0
            }
        } else {
            if slope > 2.414 {
                0
            } else if slope > 0.414 {
                7
            } else if slope > -0.414 {
                6
            } else if slope > -2.414 {
                5
            } else {
                4
            }
        };
        Self::from_index(idx)
    }
}
