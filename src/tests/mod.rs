//! Test Framework - Scenario tests for the gridnav core.
//!
//! Each file covers one subsystem. Shared synthetic worlds live here so
//! terrain, navigation, and exchange tests all drive the same fixtures.

mod coords_frame;
mod structures;

use std::sync::Once;

use hashbrown::HashSet;

use crate::coords::{CacheLoc, Dir8, Frame, WorldLoc};
use crate::terrain::{TileReading, TileSensor};

static LOG_INIT: Once = Once::new();

/// Route tracing output through the test harness (visible with --nocapture).
pub fn init_logs() {
    LOG_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Synthetic bounded world: rectangular map with explicit wall cells.
/// Outside the rectangle is off-map.
pub struct GridWorld {
    pub min: WorldLoc,
    pub max: WorldLoc,
    pub walls: HashSet<(i32, i32)>,
}

impl GridWorld {
    pub fn open(min: WorldLoc, max: WorldLoc) -> Self {
        Self { min, max, walls: HashSet::new() }
    }

    pub fn wall(&mut self, x: i32, y: i32) {
        self.walls.insert((x, y));
    }

    pub fn in_bounds(&self, loc: WorldLoc) -> bool {
        loc.x >= self.min.x && loc.x <= self.max.x && loc.y >= self.min.y && loc.y <= self.max.y
    }
}

impl TileSensor for GridWorld {
    fn sense(&self, loc: WorldLoc) -> Option<TileReading> {
        if !self.in_bounds(loc) {
            Some(TileReading::OffMap)
        } else if self.walls.contains(&(loc.x, loc.y)) {
            Some(TileReading::Blocked)
        } else {
            Some(TileReading::Open)
        }
    }
}

/// Cache-frame obstacle set for driving the navigator directly.
pub struct Maze {
    blocked: HashSet<(i32, i32)>,
}

impl Maze {
    pub fn empty() -> Self {
        Self { blocked: HashSet::new() }
    }

    pub fn block(&mut self, x: i32, y: i32) {
        self.blocked.insert((x, y));
    }

    /// Ring of walls at the given chebyshev radius around a center, minus
    /// the listed gap cells.
    pub fn ring(&mut self, center: CacheLoc, radius: i32, gaps: &[(i32, i32)]) {
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let cell = (center.x + dx, center.y + dy);
                if !gaps.contains(&cell) {
                    self.blocked.insert(cell);
                }
            }
        }
    }

    pub fn passable_from(&self, c: CacheLoc) -> [bool; 8] {
        let mut out = [false; 8];
        for dir in Dir8::ALL {
            let n = c.step(dir);
            out[dir.index()] = !self.blocked.contains(&(n.x, n.y));
        }
        out
    }
}

/// Frame-aware passability oracle over a GridWorld, for AgentCore tests.
pub struct WorldOracle<'a> {
    pub world: &'a GridWorld,
    pub frame: Frame,
}

impl crate::nav::PassabilityOracle for WorldOracle<'_> {
    fn can_step(&self, from: CacheLoc, dir: Dir8) -> bool {
        let w = self.frame.cache_to_world(from.step(dir));
        self.world.in_bounds(w) && !self.world.walls.contains(&(w.x, w.y))
    }
}
