//! Terrain Cache - Per-agent knowledge of passable, unknown, and blocked
//! cells, plus map boundary discovery.
//!
//! Knowledge is held at two resolutions: a full 256x256 boolean grid for
//! fast local queries and a 4x4-packed bitmask grid for cheap transmission
//! and merge. Knowledge is monotonic - a cell never leaves the sensed state,
//! boundaries are fixed on first discovery, and merges are pure unions.

use tracing::{debug, info};

use crate::constants::{
    AgentClass, ANCHOR_UNKNOWN, BLOCK_SIZE, FRAME_CENTER, MAP_SIZE, PACKED_SIZE,
    REPORT_COORD_BITS,
};
use crate::coords::{CacheLoc, Dir8, Frame, WorldLoc};
use crate::graph::StructureGraph;

/// Cells in the full grid.
const GRID_CELLS: usize = (MAP_SIZE * MAP_SIZE) as usize;
/// Blocks in the packed grid.
const PACKED_CELLS: usize = (PACKED_SIZE * PACKED_SIZE) as usize;

// ============================================================================
// SENSING INPUT
// ============================================================================

/// One terrain reading from the perception API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileReading {
    Open,
    Blocked,
    OffMap,
}

/// Source of per-cell terrain readings. Returns `None` outside sensor range.
pub trait TileSensor {
    fn sense(&self, loc: WorldLoc) -> Option<TileReading>;
}

// ============================================================================
// BOUNDARY RECORD
// ============================================================================

/// The four map boundary coordinates in the cache frame. 0 means unknown;
/// a value is set at most once and never changed afterward.
#[derive(Clone, Copy, Debug, Default)]
pub struct MapEdges {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl MapEdges {
    /// How many of the four boundaries are known.
    pub fn known_count(&self) -> u32 {
        [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .filter(|&&e| e != 0)
            .count() as u32
    }

    /// True if the cell lies on or past a known boundary. Unknown boundaries
    /// never exclude anything (optimistic default).
    pub fn is_off_map(&self, c: CacheLoc) -> bool {
        (self.x_min != 0 && c.x <= self.x_min)
            || (self.x_max != 0 && c.x >= self.x_max)
            || (self.y_min != 0 && c.y <= self.y_min)
            || (self.y_max != 0 && c.y >= self.y_max)
    }

    /// Merge a teammate's edge report. First write wins per scalar.
    pub fn merge_report(&mut self, report: [i32; 4]) {
        if self.x_min == 0 {
            self.x_min = report[0];
        }
        if self.x_max == 0 {
            self.x_max = report[1];
        }
        if self.y_min == 0 {
            self.y_min = report[2];
        }
        if self.y_max == 0 {
            self.y_max = report[3];
        }
    }

    pub fn report(&self) -> [i32; 4] {
        [self.x_min, self.x_max, self.y_min, self.y_max]
    }
}

// ============================================================================
// DIRTY BLOCK QUEUE
// ============================================================================

/// Queue of packed blocks whose full-grid mirror is stale. Membership bitmap
/// keeps pushes idempotent; pop order is unimportant.
struct DirtyBlocks {
    queue: Vec<u16>,
    member: Box<[bool]>,
}

impl DirtyBlocks {
    fn new() -> Self {
        Self {
            queue: Vec::new(),
            member: vec![false; PACKED_CELLS].into_boxed_slice(),
        }
    }

    fn push(&mut self, block: u16) {
        if !self.member[block as usize] {
            self.member[block as usize] = true;
            self.queue.push(block);
        }
    }

    fn pop(&mut self) -> Option<u16> {
        let block = self.queue.pop()?;
        self.member[block as usize] = false;
        Some(block)
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

// ============================================================================
// TERRAIN CACHE
// ============================================================================

/// One agent's terrain knowledge. Owns the structure graph as well, since
/// structure cells are themselves terrain features.
pub struct TerrainCache {
    frame: Frame,
    class: AgentClass,
    sense_radius: i32,
    /// Full-resolution mirrors, row-major.
    wall: Box<[bool]>,
    sensed: Box<[bool]>,
    /// Packed blocks: block address in bits 16.., 16-bit cell mask below.
    /// The baked-in address makes a stored word directly transmittable.
    packed_wall: Box<[u32]>,
    packed_sensed: Box<[u32]>,
    /// Blocks needing lazy full-grid resync after a remote merge.
    dirty: DirtyBlocks,
    /// Blocks whose masks changed since the last export (retransmission
    /// eligibility for the gossip path).
    recent: DirtyBlocks,
    pub edges: MapEdges,
    pub structures: StructureGraph,
}

impl TerrainCache {
    pub fn new(home: WorldLoc, class: AgentClass) -> Self {
        let mut packed_wall = vec![0u32; PACKED_CELLS].into_boxed_slice();
        let mut packed_sensed = vec![0u32; PACKED_CELLS].into_boxed_slice();
        for addr in 0..PACKED_CELLS {
            let word = (addr as u32) << 16;
            packed_wall[addr] = word;
            packed_sensed[addr] = word;
        }
        Self {
            frame: Frame::new(home),
            class,
            sense_radius: class.sensor_radius(),
            wall: vec![false; GRID_CELLS].into_boxed_slice(),
            sensed: vec![false; GRID_CELLS].into_boxed_slice(),
            packed_wall,
            packed_sensed,
            dirty: DirtyBlocks::new(),
            recent: DirtyBlocks::new(),
            edges: MapEdges::default(),
            structures: StructureGraph::new(),
        }
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn class(&self) -> AgentClass {
        self.class
    }

    pub fn sense_radius(&self) -> i32 {
        self.sense_radius
    }

    fn in_frame(c: CacheLoc) -> bool {
        c.x >= 0 && c.x < MAP_SIZE && c.y >= 0 && c.y < MAP_SIZE
    }

    /// Block address (bits 16.. of a packed word) for a cache cell.
    fn block_addr(c: CacheLoc) -> u16 {
        ((c.x / BLOCK_SIZE) * PACKED_SIZE + c.y / BLOCK_SIZE) as u16
    }

    /// Bit within a packed block for a cache cell.
    fn cell_bit(c: CacheLoc) -> u32 {
        1 << ((c.x % BLOCK_SIZE) * 4 + c.y % BLOCK_SIZE)
    }

    // ------------------------------------------------------------------------
    // RECORDING
    // ------------------------------------------------------------------------

    /// Record a direct terrain reading for one cell. No-op once sensed.
    pub fn record_sensed_cell(&mut self, c: CacheLoc, blocked: bool) {
        if !Self::in_frame(c) {
            return;
        }
        let idx = c.grid_index();
        if self.sensed[idx] {
            return;
        }
        self.sensed[idx] = true;
        self.wall[idx] = blocked;
        let addr = Self::block_addr(c) as usize;
        let bit = Self::cell_bit(c);
        self.packed_sensed[addr] |= bit;
        if blocked {
            self.packed_wall[addr] |= bit;
        }
        self.recent.push(addr as u16);
    }

    /// Mark a structure cell as a wall. Structures are permanent terrain
    /// features once identified.
    fn insert_structure_wall(&mut self, c: CacheLoc) {
        if !Self::in_frame(c) {
            return;
        }
        let idx = c.grid_index();
        self.sensed[idx] = true;
        self.wall[idx] = true;
        let addr = Self::block_addr(c) as usize;
        let bit = Self::cell_bit(c);
        self.packed_sensed[addr] |= bit;
        self.packed_wall[addr] |= bit;
    }

    // ------------------------------------------------------------------------
    // SENSING PASSES
    // ------------------------------------------------------------------------

    /// Full-disc sensing sweep. Used on spawn and after any discontinuous
    /// relocation; otherwise `sense_after_move` covers the leading crescent.
    pub fn sense_all<S: TileSensor>(&mut self, sensor: &S, cur: WorldLoc) {
        let me = self.frame.world_to_cache(cur);
        let r = self.sense_radius;
        for dx in -r..=r {
            for dy in -r..=r {
                self.sense_cell(sensor, cur, me, dx, dy);
            }
        }
        self.sense_map_edges(sensor, cur, None);
    }

    /// Incremental sensing after a move: only the cells newly revealed by
    /// stepping in `last_moved`, from the per-class shape table.
    pub fn sense_after_move<S: TileSensor>(&mut self, sensor: &S, cur: WorldLoc, last_moved: Dir8) {
        let me = self.frame.world_to_cache(cur);
        for &(dx, dy) in self.class.sense_offsets(last_moved) {
            self.sense_cell(sensor, cur, me, dx, dy);
        }
        self.sense_map_edges(sensor, cur, Some(last_moved));
    }

    fn sense_cell<S: TileSensor>(
        &mut self,
        sensor: &S,
        cur: WorldLoc,
        me: CacheLoc,
        dx: i32,
        dy: i32,
    ) {
        let c = CacheLoc::new(me.x + dx, me.y + dy);
        if !Self::in_frame(c) || self.sensed[c.grid_index()] {
            return;
        }
        match sensor.sense(WorldLoc::new(cur.x + dx, cur.y + dy)) {
            Some(TileReading::Open) => self.record_sensed_cell(c, false),
            Some(TileReading::Blocked) => self.record_sensed_cell(c, true),
            // Off-map cells live in the boundary record, not the wall grid.
            Some(TileReading::OffMap) | None => {}
        }
    }

    /// Discover exact map boundaries from off-map readings at sensor range.
    /// With `last_moved` set, only the edges the move could have revealed are
    /// checked. Each boundary is recorded once and then fixed forever.
    pub fn sense_map_edges<S: TileSensor>(
        &mut self,
        sensor: &S,
        cur: WorldLoc,
        last_moved: Option<Dir8>,
    ) {
        let me = self.frame.world_to_cache(cur);
        let checks: [(Dir8, i32, bool); 4] = [
            (Dir8::West, -1, true),
            (Dir8::East, 1, true),
            (Dir8::North, -1, false),
            (Dir8::South, 1, false),
        ];
        for (dir, sign, horizontal) in checks {
            let unknown = match (horizontal, sign) {
                (true, -1) => self.edges.x_min == 0,
                (true, _) => self.edges.x_max == 0,
                (false, -1) => self.edges.y_min == 0,
                (false, _) => self.edges.y_max == 0,
            };
            if !unknown {
                continue;
            }
            if let Some(moved) = last_moved {
                let (mdx, mdy) = moved.delta();
                let component = if horizontal { mdx } else { mdy };
                if component != sign {
                    continue;
                }
            }
            if sensor.sense(cur.add(dir, self.sense_radius)) != Some(TileReading::OffMap) {
                continue;
            }
            // Walk inward to the first off-map cell. Bounded by the radius.
            let mut d = self.sense_radius;
            while d > 1 && sensor.sense(cur.add(dir, d - 1)) == Some(TileReading::OffMap) {
                d -= 1;
            }
            let value = if horizontal { me.x + sign * d } else { me.y + sign * d };
            match (horizontal, sign) {
                (true, -1) => self.edges.x_min = value,
                (true, _) => self.edges.x_max = value,
                (false, -1) => self.edges.y_min = value,
                (false, _) => self.edges.y_max = value,
            }
            info!(?dir, value, "map boundary discovered");
        }
    }

    // ------------------------------------------------------------------------
    // PACKED BLOCK MERGE / RESYNC
    // ------------------------------------------------------------------------

    /// Union a teammate's packed block into ours. The block address rides in
    /// bits 16.. of `wall_word`. A block whose sensed mask grew is queued for
    /// lazy full-grid resync and flagged for retransmission.
    pub fn merge_packed_block(&mut self, wall_word: u32, sensed_word: u32) {
        let addr = (wall_word >> 16) as usize;
        if addr >= PACKED_CELLS {
            return;
        }
        let merged = self.packed_sensed[addr] | (sensed_word & 0xFFFF);
        if merged != self.packed_sensed[addr] {
            self.packed_wall[addr] |= wall_word & 0xFFFF;
            self.packed_sensed[addr] = merged;
            self.dirty.push(addr as u16);
            self.recent.push(addr as u16);
        }
    }

    /// Decompress one dirty block back into the full grid. Returns true when
    /// nothing is left to resync. One block per call bounds per-tick cost
    /// when a burst of fragments arrives.
    pub fn resync_step(&mut self) -> bool {
        let Some(addr) = self.dirty.pop() else {
            return true;
        };
        let xb = addr as i32 / PACKED_SIZE;
        let yb = addr as i32 % PACKED_SIZE;
        let wall_mask = self.packed_wall[addr as usize];
        let sensed_mask = self.packed_sensed[addr as usize];
        for bit in 0..16 {
            let c = CacheLoc::new(xb * BLOCK_SIZE + bit / 4, yb * BLOCK_SIZE + bit % 4);
            let idx = c.grid_index();
            self.wall[idx] = wall_mask & (1 << bit) != 0;
            self.sensed[idx] = sensed_mask & (1 << bit) != 0;
        }
        self.dirty.is_empty()
    }

    /// Raw packed words for a block address (wall word, sensed word).
    pub fn packed_block(&self, addr: u16) -> (u32, u32) {
        (
            self.packed_wall[addr as usize],
            self.packed_sensed[addr as usize],
        )
    }

    /// Pairs of packed words for transmission. Selection alternates between
    /// a systematic sweep of one block column (staggered by agent id, bounded
    /// by known edges) and the 3x3 block neighborhood of the agent, with any
    /// recently changed blocks appended. Empty blocks are never exported.
    pub fn export_fragment(&mut self, tick: u32, agent_id: u32, cur: WorldLoc) -> Vec<u32> {
        let me = self.frame.world_to_cache(cur);
        let (start_col, num_cols, start_row, num_rows) = if tick / 6 % 2 == 0 {
            let (start_col, num_cols) = Self::sweep_span(self.edges.x_min, self.edges.x_max);
            let (start_row, num_rows) = Self::sweep_span(self.edges.y_min, self.edges.y_max);
            (start_col, num_cols, start_row, num_rows)
        } else {
            let rotation = (tick / 12 % 4) as i32;
            (
                me.x / BLOCK_SIZE - rotation % 2 * 2,
                3,
                me.y / BLOCK_SIZE - rotation / 2 * 2,
                3,
            )
        };

        let mut words = Vec::new();
        let xb = start_col + ((tick / 12 + agent_id) % num_cols as u32) as i32;
        if (0..PACKED_SIZE).contains(&xb) {
            for yb in start_row..start_row + num_rows {
                if !(0..PACKED_SIZE).contains(&yb) {
                    continue;
                }
                self.push_block_pair(&mut words, (xb * PACKED_SIZE + yb) as u16);
            }
        }
        // Gossip: piggyback blocks that changed since the last export.
        for _ in 0..8 {
            let Some(addr) = self.recent.pop() else { break };
            self.push_block_pair(&mut words, addr);
        }
        debug!(tick, pairs = words.len() / 2, "terrain fragment exported");
        words
    }

    fn push_block_pair(&self, words: &mut Vec<u32>, addr: u16) {
        let (wall_word, sensed_word) = self.packed_block(addr);
        if sensed_word & 0xFFFF == 0 {
            return;
        }
        if words.iter().step_by(2).any(|w| w >> 16 == (addr as u32)) {
            return;
        }
        words.push(wall_word);
        words.push(sensed_word);
    }

    /// Block span for the systematic sweep along one axis, narrowed by
    /// whichever edges are known on that axis.
    fn sweep_span(edge_min: i32, edge_max: i32) -> (i32, i32) {
        if edge_min != 0 {
            let start = (edge_min + 1) / BLOCK_SIZE;
            if edge_max != 0 {
                // A corrupt report can invert the edges; keep the span at
                // least one block wide so the column pick stays valid.
                (start, (edge_max / BLOCK_SIZE - start + 1).max(1))
            } else {
                (start, 16)
            }
        } else if edge_max != 0 {
            (edge_max / BLOCK_SIZE - 15, 16)
        } else {
            (0, PACKED_SIZE)
        }
    }

    // ------------------------------------------------------------------------
    // QUERIES
    // ------------------------------------------------------------------------

    /// Do we know the terrain at the given world location?
    pub fn is_sensed(&self, loc: WorldLoc) -> bool {
        let c = self.frame.world_to_cache(loc);
        Self::in_frame(c) && self.sensed[c.grid_index()]
    }

    /// Is the location a known wall? Unsensed cells answer false - the
    /// optimistic default that keeps exploration moving.
    pub fn is_known_wall(&self, loc: WorldLoc) -> bool {
        let c = self.frame.world_to_cache(loc);
        Self::in_frame(c) && self.wall[c.grid_index()]
    }

    /// Is the location beyond a known map boundary?
    pub fn is_off_map(&self, loc: WorldLoc) -> bool {
        self.edges.is_off_map(self.frame.world_to_cache(loc))
    }

    /// Combined path blocker: known wall or known off-map.
    pub fn blocks_path(&self, loc: WorldLoc) -> bool {
        self.is_known_wall(loc) || self.is_off_map(loc)
    }

    // ------------------------------------------------------------------------
    // STRUCTURES
    // ------------------------------------------------------------------------

    /// Record a directly sensed structure with its advertised neighbors.
    /// The structure's own cell becomes a wall; neighbor cells stay plain
    /// until sensed in person.
    pub fn record_structure(&mut self, loc: WorldLoc, neighbors: &[WorldLoc], enemy_owned: bool) {
        let existing = self.structures.id_at(loc);
        if existing != 0 && self.structures.is_sensed(existing) {
            return;
        }
        let (id, created) = self.structures.upsert(loc);
        if created {
            self.insert_structure_wall(self.frame.world_to_cache(loc));
        }
        if enemy_owned {
            self.structures.mark_enemy_anchor(id);
        }
        for &nloc in neighbors {
            let nid = self.structures.id_at(nloc);
            if nid != 0 && self.structures.is_sensed(nid) {
                continue;
            }
            let (nid, _) = self.structures.upsert(nloc);
            self.structures.add_edge(id, nid);
        }
        self.structures.mark_sensed(id);
    }

    /// Merge one teammate structure report (see `messages` for the layout).
    pub fn integrate_structure_report(&mut self, words: &[u32]) {
        if words.len() < 2 {
            return;
        }
        let mask = (1u32 << REPORT_COORD_BITS) - 1;
        let unpack = |w: u32| WorldLoc::new((w >> REPORT_COORD_BITS) as i32, (w & mask) as i32);

        if self.structures.enemy_anchor() == 0 && words[0] != ANCHOR_UNKNOWN {
            let (core_id, _) = self.structures.upsert(unpack(words[0]));
            self.structures.mark_enemy_anchor(core_id);
        }

        let node_loc = unpack(words[1]);
        let existing = self.structures.id_at(node_loc);
        if existing != 0 && self.structures.is_sensed(existing) {
            return;
        }
        let (id, created) = self.structures.upsert(node_loc);
        if created {
            self.insert_structure_wall(self.frame.world_to_cache(node_loc));
        }
        for &word in &words[2..] {
            let nloc = unpack(word);
            let nid = self.structures.id_at(nloc);
            if nid != 0 && self.structures.is_sensed(nid) {
                continue;
            }
            let (nid, _) = self.structures.upsert(nloc);
            self.structures.add_edge(id, nid);
        }
        self.structures.mark_sensed(id);
    }

    /// Best estimate of the enemy anchor location. Exact if reported;
    /// otherwise assumes rotational map symmetry around the known edges,
    /// falling back to the mean direction of known structure nodes.
    pub fn guess_enemy_anchor(&self, cur: WorldLoc) -> WorldLoc {
        if let Some(loc) = self.structures.enemy_anchor_loc() {
            return loc;
        }
        let home = self.frame.cache_to_world(CacheLoc::new(FRAME_CENTER, FRAME_CENTER));

        if self.edges.known_count() == 0 {
            // No edges: head far out along the mean direction of known nodes.
            let (mut sdx, mut sdy) = (0i64, 0i64);
            for id in 2..=self.structures.node_count() as u16 {
                if let Some(loc) = self.structures.location(id) {
                    sdx += (loc.x - home.x) as i64;
                    sdy += (loc.y - home.y) as i64;
                }
            }
            let magnitude = ((sdx * sdx + sdy * sdy) as f64).sqrt();
            if magnitude < 1.0 {
                return cur.add(Dir8::North, 60);
            }
            return WorldLoc::new(
                home.x + (sdx as f64 * 90.0 / magnitude) as i32,
                home.y + (sdy as f64 * 90.0 / magnitude) as i32,
            );
        }

        // Assume a 60-wide map where an edge is missing, then try the
        // rotationally symmetric candidates until one is unsensed.
        let map_size = 61;
        let (xmin, xmax) = Self::span_guess(self.edges.x_min, self.edges.x_max, map_size);
        let (ymin, ymax) = Self::span_guess(self.edges.y_min, self.edges.y_max, map_size);
        let candidates = [
            (xmin + xmax - FRAME_CENTER, ymin + ymax - FRAME_CENTER),
            (xmin + xmax - FRAME_CENTER, FRAME_CENTER),
            (FRAME_CENTER, ymin + ymax - FRAME_CENTER),
            (xmin + ymax - FRAME_CENTER, ymin + xmax - FRAME_CENTER),
            (xmin - ymin + FRAME_CENTER, ymin - xmin + FRAME_CENTER),
        ];
        for (x, y) in candidates {
            let guess = self.frame.cache_to_world(CacheLoc::new(x, y));
            if !self.is_sensed(guess) {
                return guess;
            }
        }
        for (edge, dir) in [
            (self.edges.x_min, Dir8::West),
            (self.edges.x_max, Dir8::East),
            (self.edges.y_min, Dir8::North),
            (self.edges.y_max, Dir8::South),
        ] {
            if edge == 0 {
                return cur.add(dir, 60);
            }
        }
        cur.add(Dir8::North, 60)
    }

    fn span_guess(known_min: i32, known_max: i32, map_size: i32) -> (i32, i32) {
        match (known_min, known_max) {
            (0, 0) => (FRAME_CENTER, FRAME_CENTER),
            (0, max) => (max - map_size, max),
            (min, 0) => (min, min + map_size),
            (min, max) => (min, max),
        }
    }

    /// ASCII dump of the 21x21 neighborhood for logs: `x` self, `o` unknown,
    /// `#` wall, `.` open.
    pub fn local_view(&self, cur: WorldLoc) -> String {
        let me = self.frame.world_to_cache(cur);
        let mut out = String::with_capacity(22 * 22);
        for y in me.y - 10..=me.y + 10 {
            for x in me.x - 10..=me.x + 10 {
                let c = CacheLoc::new(x, y);
                let ch = if x == me.x && y == me.y {
                    'x'
                } else if !Self::in_frame(c) || !self.sensed[c.grid_index()] {
                    'o'
                } else if self.wall[c.grid_index()] {
                    '#'
                } else {
                    '.'
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}
