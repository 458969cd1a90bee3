//! Agent Core - Per-agent ownership of the terrain cache and navigator.
//!
//! One instance per agent lifetime, owned by the agent's task. Everything
//! here runs inside the host's single-threaded tick: perception and inbound
//! merges first, then navigation, then optional housekeeping and outbound
//! publication that the scheduler may defer under budget pressure.

use rand::Rng;

use crate::constants::AgentClass;
use crate::coords::{Dir8, WorldLoc};
use crate::messages;
use crate::nav::{BugNavigator, PassabilityOracle};
use crate::settings::CoreSettings;
use crate::terrain::{TerrainCache, TileSensor};

/// Payloads ready for the transport layer after one publish call. Empty
/// options simply mean nothing was scheduled or shareable this tick.
#[derive(Default)]
pub struct OutboundBundle {
    pub terrain: Option<Vec<u32>>,
    pub edges: Option<[u16; 4]>,
    pub structures: Option<Vec<u32>>,
}

/// The perception and locomotion core for one agent.
pub struct AgentCore {
    pub cache: TerrainCache,
    pub nav: BugNavigator,
    agent_id: u32,
    settings: CoreSettings,
}

impl AgentCore {
    pub fn new(home: WorldLoc, class: AgentClass, agent_id: u32, settings: CoreSettings) -> Self {
        Self {
            cache: TerrainCache::new(home, class),
            nav: BugNavigator::with_settings(&settings),
            agent_id,
            settings,
        }
    }

    // ------------------------------------------------------------------------
    // INBOUND (run before navigation within a tick)
    // ------------------------------------------------------------------------

    /// Sense the surroundings: the full disc on spawn or relocation, the
    /// per-class leading crescent after an ordinary move.
    pub fn perceive<S: TileSensor>(&mut self, sensor: &S, cur: WorldLoc, last_moved: Option<Dir8>) {
        match last_moved {
            Some(dir) => self.cache.sense_after_move(sensor, cur, dir),
            None => self.cache.sense_all(sensor, cur),
        }
    }

    pub fn receive_terrain(&mut self, words: &[u32]) {
        messages::apply_terrain_fragment(&mut self.cache, words);
    }

    pub fn receive_edges(&mut self, report: [u16; 4]) {
        messages::apply_edge_report(&mut self.cache, report);
    }

    pub fn receive_structures(&mut self, words: &[u32]) {
        messages::apply_structure_report(&mut self.cache, words);
    }

    // ------------------------------------------------------------------------
    // NAVIGATION
    // ------------------------------------------------------------------------

    /// One navigation step toward a world destination. Combines cached
    /// terrain with the caller's live passability oracle; `None` means
    /// arrived or boxed in.
    pub fn step_towards<O: PassabilityOracle>(
        &mut self,
        cur: WorldLoc,
        dest: WorldLoc,
        oracle: &O,
    ) -> Option<Dir8> {
        let frame = self.cache.frame();
        let cur_c = frame.world_to_cache(cur);
        self.nav.set_target(frame.world_to_cache(dest));

        let mut passable = [false; 8];
        for dir in Dir8::ALL {
            let (dx, dy) = dir.delta();
            let ahead = WorldLoc::new(cur.x + dx, cur.y + dy);
            passable[dir.index()] = !self.cache.blocks_path(ahead) && oracle.can_step(cur_c, dir);
        }

        let (dx, dy) = self.nav.compute_step(cur_c, &passable, &self.cache.edges)?;
        Some(Dir8::towards(dx, dy))
    }

    /// Abandon the current destination.
    pub fn stop(&mut self) {
        self.nav.clear_target();
    }

    // ------------------------------------------------------------------------
    // HOUSEKEEPING / OUTBOUND (deferrable by the scheduler)
    // ------------------------------------------------------------------------

    /// One unit of deferred work: a single packed-block resync. Returns true
    /// when the cache is fully synced.
    pub fn housekeeping(&mut self) -> bool {
        self.cache.resync_step()
    }

    /// Collect whatever this tick's schedule says should go out.
    pub fn publish(&mut self, tick: u32, cur: WorldLoc) -> OutboundBundle {
        let mut out = OutboundBundle::default();
        if tick % self.settings.fragment_interval == 0 {
            let words = self.cache.export_fragment(tick, self.agent_id, cur);
            if !words.is_empty() {
                out.terrain = Some(words);
            }
        }
        if tick % self.settings.edge_report_interval == 0 && self.cache.edges.known_count() > 0 {
            out.edges = Some(messages::encode_edge_report(&self.cache));
        }
        if tick % self.settings.structure_report_interval == 0 {
            out.structures = messages::encode_structure_report(&self.cache.structures, tick);
        }
        out
    }

    /// Repair a blocked preferred direction against live passability.
    /// Tracing agents use the limited search so the wall hug is not broken.
    pub fn repair_direction(
        &mut self,
        dir: Dir8,
        passable: &[bool; 8],
        rng: &mut impl Rng,
    ) -> Option<Dir8> {
        if self.nav.is_tracing() {
            crate::nav::wiggle_limited(dir, passable, rng)
        } else {
            crate::nav::wiggle(dir, passable, rng)
        }
    }
}
