//! Local Navigator - Bug-style obstacle avoidance on the 8-way grid.
//!
//! Moves straight at the destination until blocked, then hugs the obstacle
//! boundary (wall tracing) until it has made net progress past the point
//! where tracing began. A growing turn budget plus rotation flipping bounds
//! worst-case looping on symmetric or adversarial obstacle shapes; a
//! predicted-position check recovers from transient obstacles the cache
//! never saw.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::constants::{INITIAL_TRACE_THRESHOLD, TRACE_THRESHOLD_GROWTH};
use crate::coords::{CacheLoc, Dir8};
use crate::settings::CoreSettings;
use crate::terrain::MapEdges;

// ============================================================================
// PASSABILITY
// ============================================================================

/// Live "can I step there" check, combining cached terrain with whatever
/// transient obstacles the movement layer can see. Injected so the navigator
/// is testable against synthetic grids.
pub trait PassabilityOracle {
    fn can_step(&self, from: CacheLoc, dir: Dir8) -> bool;
}

/// Evaluate the oracle in all 8 compass directions from one cell.
pub fn passability<O: PassabilityOracle>(oracle: &O, from: CacheLoc) -> [bool; 8] {
    let mut out = [false; 8];
    for dir in Dir8::ALL {
        out[dir.index()] = oracle.can_step(from, dir);
    }
    out
}

// ============================================================================
// BUG NAVIGATOR
// ============================================================================

/// Wall-tracing rotation. Clockwise scans directions by increasing compass
/// index from the wall, counterclockwise by decreasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    fn flipped(self) -> Rotation {
        match self {
            Rotation::Clockwise => Rotation::CounterClockwise,
            Rotation::CounterClockwise => Rotation::Clockwise,
        }
    }

    /// 0 for clockwise, 1 for counterclockwise; the wall-update parity
    /// formula and the scan order both key off this.
    fn parity(self) -> i32 {
        match self {
            Rotation::Clockwise => 0,
            Rotation::CounterClockwise => 1,
        }
    }
}

/// Per-destination navigation state. Reset whenever the destination changes.
pub struct BugNavigator {
    target: Option<CacheLoc>,
    tracing: Option<Rotation>,
    default_rotation: Rotation,
    /// Compass index of the wall currently being hugged.
    wall_dir: usize,
    turns_traced: u32,
    trace_threshold: u32,
    /// Squared distance to target when the current trace began.
    trace_distance: i64,
    /// Where the last returned step should have put us; a mismatch next call
    /// means something outside our knowledge moved.
    expected: Option<CacheLoc>,
    hit_edge_other_rotation: bool,
    initial_threshold: u32,
    threshold_growth: u32,
    rng: SmallRng,
}

impl BugNavigator {
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Deterministic construction for tests and replay.
    pub fn with_seed(seed: u64) -> Self {
        let mut nav = Self {
            target: None,
            tracing: None,
            default_rotation: Rotation::Clockwise,
            wall_dir: 0,
            turns_traced: 0,
            trace_threshold: INITIAL_TRACE_THRESHOLD,
            trace_distance: 0,
            expected: None,
            hit_edge_other_rotation: false,
            initial_threshold: INITIAL_TRACE_THRESHOLD,
            threshold_growth: TRACE_THRESHOLD_GROWTH,
            rng: SmallRng::seed_from_u64(seed),
        };
        nav.reset();
        nav
    }

    /// Construction with tuned trace constants from settings.
    pub fn with_settings(settings: &CoreSettings) -> Self {
        let mut nav = Self::new();
        nav.initial_threshold = settings.initial_trace_threshold;
        nav.threshold_growth = settings.trace_threshold_growth;
        nav.trace_threshold = nav.initial_threshold;
        nav
    }

    pub fn target(&self) -> Option<CacheLoc> {
        self.target
    }

    /// Set the destination. A changed destination discards all trace state.
    pub fn set_target(&mut self, target: CacheLoc) {
        if self.target == Some(target) {
            return;
        }
        self.target = Some(target);
        self.reset();
    }

    pub fn clear_target(&mut self) {
        self.target = None;
        self.reset();
    }

    /// Discard trace state. The starting rotation is re-rolled so repeated
    /// resets do not always circle obstacles the same way.
    pub fn reset(&mut self) {
        self.tracing = None;
        self.default_rotation = if self.rng.random_bool(0.5) {
            Rotation::Clockwise
        } else {
            Rotation::CounterClockwise
        };
        self.trace_threshold = self.initial_threshold;
        self.hit_edge_other_rotation = false;
        self.expected = None;
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing.is_some()
    }

    /// One step of the bug algorithm. `passable` reports current legality
    /// per compass direction; `edges` is the live boundary record. Returns
    /// `None` at the destination or when fully boxed in.
    pub fn compute_step(
        &mut self,
        cur: CacheLoc,
        passable: &[bool; 8],
        edges: &MapEdges,
    ) -> Option<(i32, i32)> {
        let target = self.target?;
        if cur == target {
            return None;
        }
        // Adjacent to the destination: step exactly onto it, no tracing.
        if cur.chebyshev(target) <= 1 {
            return Some((target.x - cur.x, target.y - cur.y));
        }

        let dist = cur.dist_sq(target);
        if let Some(rotation) = self.tracing {
            self.turns_traced += 1;
            if dist < self.trace_distance {
                // Net progress past where the trace began: back to direct.
                self.tracing = None;
                self.hit_edge_other_rotation = false;
            } else if self.turns_traced >= self.trace_threshold {
                // Timeout: give up this rotation, allow a longer trace next
                // time, and circle the other way.
                self.tracing = None;
                self.trace_threshold *= self.threshold_growth;
                self.default_rotation = self.default_rotation.flipped();
                self.hit_edge_other_rotation = false;
                debug!(threshold = self.trace_threshold, "trace timeout, rotation flipped");
            } else if self.expected != Some(cur) {
                // Desynchronization: something unmodeled moved us. Re-aim at
                // where we expected to be; if that way is open take it,
                // otherwise treat it as the new wall and keep tracing.
                let expected = self.expected.unwrap_or(cur);
                let dir = Dir8::towards(expected.x - cur.x, expected.y - cur.y);
                if passable[dir.index()] {
                    self.expected = Some(cur.step(dir));
                    return Some(dir.delta());
                }
                self.wall_dir = dir.index();
            } else if passable[self.wall_dir] {
                // The wall we were hugging is gone - it was a transient
                // obstacle, not terrain. Stop tracing.
                self.tracing = None;
                self.hit_edge_other_rotation = false;
            } else if !self.hit_edge_other_rotation {
                // About to trace past a known map boundary: circle the other
                // way instead, once per trace.
                let ahead = cur.step(Dir8::from_index(self.wall_dir));
                if edges.is_off_map(ahead) {
                    self.tracing = Some(rotation.flipped());
                    self.default_rotation = self.default_rotation.flipped();
                    self.hit_edge_other_rotation = true;
                }
            }
        }

        if self.tracing.is_none() {
            let dir = Dir8::towards(target.x - cur.x, target.y - cur.y);
            if passable[dir.index()] {
                self.expected = Some(cur.step(dir));
                return Some(dir.delta());
            }
            // Blocked straight ahead: start hugging this wall.
            self.tracing = Some(self.default_rotation);
            self.trace_distance = dist;
            self.turns_traced = 0;
            self.wall_dir = dir.index();
        }

        if let Some(rotation) = self.tracing {
            let parity = rotation.parity();
            // Scan the 7 non-wall directions in rotation order starting next
            // to the wall; the parity formula keeps us hugging the obstacle
            // on the chosen side.
            for ti in 1..8 {
                let dir_idx =
                    ((1 - parity * 2) * ti + self.wall_dir as i32).rem_euclid(8) as usize;
                if passable[dir_idx] {
                    self.wall_dir =
                        ((dir_idx as i32 + 6 + 5 * parity) / 2 % 4 * 2) as usize;
                    let dir = Dir8::from_index(dir_idx);
                    self.expected = Some(cur.step(dir));
                    return Some(dir.delta());
                }
            }
        }
        None
    }
}

impl Default for BugNavigator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// DIRECTION REPAIR ("WIGGLE")
// ============================================================================

/// Find a passable direction near `dir` by rotating outward, up to two steps
/// each way, starting on a random side. Returns `dir` itself when open.
pub fn wiggle(dir: Dir8, passable: &[bool; 8], rng: &mut impl Rng) -> Option<Dir8> {
    wiggle_search(dir, passable, rng, 2, 2)
}

/// Wiggle restricted so a diagonal preference never crosses into the
/// orthogonal opposite quadrant (e.g. NW never repairs to SW or NE's far
/// side). Cardinals get one rotation each way; diagonals get two.
pub fn wiggle_limited(dir: Dir8, passable: &[bool; 8], rng: &mut impl Rng) -> Option<Dir8> {
    let steps = if dir.is_diagonal() { 2 } else { 1 };
    wiggle_search(dir, passable, rng, steps, steps)
}

fn wiggle_search(
    dir: Dir8,
    passable: &[bool; 8],
    rng: &mut impl Rng,
    left_steps: u32,
    right_steps: u32,
) -> Option<Dir8> {
    if passable[dir.index()] {
        return Some(dir);
    }
    let left_first = rng.random_bool(0.5);
    let mut left = dir;
    let mut right = dir;
    for ring in 0..left_steps.max(right_steps) {
        for try_left in [left_first, !left_first] {
            if try_left {
                if ring < left_steps {
                    left = left.rotate_left();
                    if passable[left.index()] {
                        return Some(left);
                    }
                }
            } else if ring < right_steps {
                right = right.rotate_right();
                if passable[right.index()] {
                    return Some(right);
                }
            }
        }
    }
    None
}
