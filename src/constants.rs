//! Constants - Map geometry, navigator tuning, and sensor shape tables.

use crate::coords::Dir8;

// ============================================================================
// MAP GEOMETRY
// ============================================================================

/// Side length of the full-resolution cache frame.
pub const MAP_SIZE: i32 = 256;

/// Cache coordinate of the agent's home position on both axes.
pub const FRAME_CENTER: i32 = 128;

/// Side length of one packed block (16 cells per block).
pub const BLOCK_SIZE: i32 = 4;

/// Side length of the packed block grid (MAP_SIZE / BLOCK_SIZE).
pub const PACKED_SIZE: i32 = 64;

// ============================================================================
// NAVIGATOR TUNING
// ============================================================================

/// Turns of wall tracing allowed before the first forced timeout.
pub const INITIAL_TRACE_THRESHOLD: u32 = 100;

/// Timeout multiplier applied on every trace timeout. Together with the
/// rotation flip this bounds worst-case looping on symmetric obstacles.
pub const TRACE_THRESHOLD_GROWTH: u32 = 3;

// ============================================================================
// WIRE FORMAT
// ============================================================================

/// Sentinel in a structure report meaning "enemy anchor location unknown".
pub const ANCHOR_UNKNOWN: u32 = 32001;

/// Bits per packed coordinate in a structure report word (`x << 15 | y`).
pub const REPORT_COORD_BITS: u32 = 15;

// ============================================================================
// AGENT CLASSES
// ============================================================================

/// Agent chassis. Determines sensor radius and the incremental sensing
/// shape used after a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentClass {
    /// Long-range overseer, radius 6.
    Surveyor,
    /// Fast explorer, radius 5.
    Scout,
    /// Mid-range harasser, radius 4.
    Skirmisher,
    /// Line unit, radius 3.
    Sentinel,
    /// Short-range area unit, radius 3.
    Warden,
}

impl AgentClass {
    pub fn sensor_radius(self) -> i32 {
        match self {
            AgentClass::Surveyor => 6,
            AgentClass::Scout => 5,
            AgentClass::Skirmisher => 4,
            AgentClass::Sentinel => 3,
            AgentClass::Warden => 3,
        }
    }

    /// Relative offsets newly visible after moving in `last_moved`.
    /// Precomputed per class so a moving agent re-senses only the leading
    /// crescent instead of the whole disc.
    pub fn sense_offsets(self, last_moved: Dir8) -> &'static [(i32, i32)] {
        let table: &'static [&'static [(i32, i32)]; 8] = match self {
            AgentClass::Surveyor => &SENSE_SURVEYOR,
            AgentClass::Scout => &SENSE_SCOUT,
            AgentClass::Skirmisher => &SENSE_SKIRMISHER,
            AgentClass::Sentinel => &SENSE_SENTINEL,
            AgentClass::Warden => &SENSE_WARDEN,
        };
        table[last_moved.index()]
    }
}

// ============================================================================
// SENSOR SHAPE TABLES
// ============================================================================
// Leading-edge cells per movement direction, ordered N, NE, E, SE, S, SW, W,
// NW. Static configuration data: load once, never mutate.

pub static SENSE_SURVEYOR: [&[(i32, i32)]; 8] = [
    // North
    &[(-6, 0), (-5, -3), (-4, -4), (-3, -5), (-2, -5), (-1, -5), (0, -6), (1, -5), (2, -5),
      (3, -5), (4, -4), (5, -3), (6, 0)],
    // NorthEast
    &[(-3, -5), (-2, -5), (0, -6), (0, -5), (1, -5), (2, -5), (3, -5), (3, -4), (4, -4),
      (4, -3), (5, -3), (5, -2), (5, -1), (5, 0), (5, 2), (5, 3), (6, 0)],
    // East
    &[(0, -6), (0, 6), (3, -5), (3, 5), (4, -4), (4, 4), (5, -3), (5, -2), (5, -1), (5, 1),
      (5, 2), (5, 3), (6, 0)],
    // SouthEast
    &[(-3, 5), (-2, 5), (0, 5), (0, 6), (1, 5), (2, 5), (3, 4), (3, 5), (4, 3), (4, 4),
      (5, -3), (5, -2), (5, 0), (5, 1), (5, 2), (5, 3), (6, 0)],
    // South
    &[(-6, 0), (-5, 3), (-4, 4), (-3, 5), (-2, 5), (-1, 5), (0, 6), (1, 5), (2, 5), (3, 5),
      (4, 4), (5, 3), (6, 0)],
    // SouthWest
    &[(-6, 0), (-5, -3), (-5, -2), (-5, 0), (-5, 1), (-5, 2), (-5, 3), (-4, 3), (-4, 4),
      (-3, 4), (-3, 5), (-2, 5), (-1, 5), (0, 5), (0, 6), (2, 5), (3, 5)],
    // West
    &[(-6, 0), (-5, -3), (-5, -2), (-5, -1), (-5, 1), (-5, 2), (-5, 3), (-4, -4), (-4, 4),
      (-3, -5), (-3, 5), (0, -6), (0, 6)],
    // NorthWest
    &[(-6, 0), (-5, -3), (-5, -2), (-5, -1), (-5, 0), (-5, 2), (-5, 3), (-4, -4), (-4, -3),
      (-3, -5), (-3, -4), (-2, -5), (-1, -5), (0, -6), (0, -5), (2, -5), (3, -5)],
];

pub static SENSE_SCOUT: [&[(i32, i32)]; 8] = [
    // North
    &[(-5, 0), (-4, -3), (-3, -4), (-2, -4), (-1, -4), (0, -5), (1, -4), (2, -4), (3, -4),
      (4, -3), (5, 0)],
    // NorthEast
    &[(-3, -4), (-2, -4), (0, -5), (0, -4), (1, -4), (2, -4), (3, -4), (3, -3), (4, -3),
      (4, -2), (4, -1), (4, 0), (4, 2), (4, 3), (5, 0)],
    // East
    &[(0, -5), (0, 5), (3, -4), (3, 4), (4, -3), (4, -2), (4, -1), (4, 1), (4, 2), (4, 3),
      (5, 0)],
    // SouthEast
    &[(-3, 4), (-2, 4), (0, 4), (0, 5), (1, 4), (2, 4), (3, 3), (3, 4), (4, -3), (4, -2),
      (4, 0), (4, 1), (4, 2), (4, 3), (5, 0)],
    // South
    &[(-5, 0), (-4, 3), (-3, 4), (-2, 4), (-1, 4), (0, 5), (1, 4), (2, 4), (3, 4), (4, 3),
      (5, 0)],
    // SouthWest
    &[(-5, 0), (-4, -3), (-4, -2), (-4, 0), (-4, 1), (-4, 2), (-4, 3), (-3, 3), (-3, 4),
      (-2, 4), (-1, 4), (0, 4), (0, 5), (2, 4), (3, 4)],
    // West
    &[(-5, 0), (-4, -3), (-4, -2), (-4, -1), (-4, 1), (-4, 2), (-4, 3), (-3, -4), (-3, 4),
      (0, -5), (0, 5)],
    // NorthWest
    &[(-5, 0), (-4, -3), (-4, -2), (-4, -1), (-4, 0), (-4, 2), (-4, 3), (-3, -4), (-3, -3),
      (-2, -4), (-1, -4), (0, -5), (0, -4), (2, -4), (3, -4)],
];

pub static SENSE_SKIRMISHER: [&[(i32, i32)]; 8] = [
    // North
    &[(-4, 0), (-3, -2), (-2, -3), (-1, -3), (0, -4), (1, -3), (2, -3), (3, -2), (4, 0)],
    // NorthEast
    &[(-2, -3), (0, -4), (0, -3), (1, -3), (2, -3), (2, -2), (3, -2), (3, -1), (3, 0),
      (3, 2), (4, 0)],
    // East
    &[(0, -4), (0, 4), (2, -3), (2, 3), (3, -2), (3, -1), (3, 1), (3, 2), (4, 0)],
    // SouthEast
    &[(-2, 3), (0, 3), (0, 4), (1, 3), (2, 2), (2, 3), (3, -2), (3, 0), (3, 1), (3, 2),
      (4, 0)],
    // South
    &[(-4, 0), (-3, 2), (-2, 3), (-1, 3), (0, 4), (1, 3), (2, 3), (3, 2), (4, 0)],
    // SouthWest
    &[(-4, 0), (-3, -2), (-3, 0), (-3, 1), (-3, 2), (-2, 2), (-2, 3), (-1, 3), (0, 3),
      (0, 4), (2, 3)],
    // West
    &[(-4, 0), (-3, -2), (-3, -1), (-3, 1), (-3, 2), (-2, -3), (-2, 3), (0, -4), (0, 4)],
    // NorthWest
    &[(-4, 0), (-3, -2), (-3, -1), (-3, 0), (-3, 2), (-2, -3), (-2, -2), (-1, -3), (0, -4),
      (0, -3), (2, -3)],
];

pub static SENSE_SENTINEL: [&[(i32, i32)]; 8] = [
    // North
    &[(-3, -1), (-2, -2), (-1, -3), (0, -3), (1, -3), (2, -2), (3, -1)],
    // NorthEast
    &[(-1, -3), (0, -3), (1, -3), (1, -2), (2, -2), (2, -1), (3, -1), (3, 0), (3, 1)],
    // East
    &[(1, -3), (1, 3), (2, -2), (2, 2), (3, -1), (3, 0), (3, 1)],
    // SouthEast
    &[(-1, 3), (0, 3), (1, 2), (1, 3), (2, 1), (2, 2), (3, -1), (3, 0), (3, 1)],
    // South
    &[(-3, 1), (-2, 2), (-1, 3), (0, 3), (1, 3), (2, 2), (3, 1)],
    // SouthWest
    &[(-3, -1), (-3, 0), (-3, 1), (-2, 1), (-2, 2), (-1, 2), (-1, 3), (0, 3), (1, 3)],
    // West
    &[(-3, -1), (-3, 0), (-3, 1), (-2, -2), (-2, 2), (-1, -3), (-1, 3)],
    // NorthWest
    &[(-3, -1), (-3, 0), (-3, 1), (-2, -2), (-2, -1), (-1, -3), (-1, -2), (0, -3), (1, -3)],
];

pub static SENSE_WARDEN: [&[(i32, i32)]; 8] = [
    // North
    &[(-2, -2), (-1, -3), (0, -3), (1, -3), (2, -2)],
    // NorthEast
    &[(-1, -3), (0, -3), (1, -3), (1, -2), (2, -2), (2, -1), (3, -1), (3, 0), (3, 1)],
    // East
    &[(2, -2), (2, 2), (3, -1), (3, 0), (3, 1)],
    // SouthEast
    &[(-1, 3), (0, 3), (1, 2), (1, 3), (2, 1), (2, 2), (3, -1), (3, 0), (3, 1)],
    // South
    &[(-2, 2), (-1, 3), (0, 3), (1, 3), (2, 2)],
    // SouthWest
    &[(-3, -1), (-3, 0), (-3, 1), (-2, 1), (-2, 2), (-1, 2), (-1, 3), (0, 3), (1, 3)],
    // West
    &[(-3, -1), (-3, 0), (-3, 1), (-2, -2), (-2, 2)],
    // NorthWest
    &[(-3, -1), (-3, 0), (-3, 1), (-2, -2), (-2, -1), (-1, -3), (-1, -2), (0, -3), (1, -3)],
];
