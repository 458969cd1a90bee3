//! Gridnav - Perception and locomotion core for agents on a bounded 2D grid.
//!
//! Each agent senses only a local neighborhood per tick, caches what it has
//! learned about terrain it can no longer see, shares that knowledge with
//! teammates as packed block fragments over a narrow channel, and steps
//! toward destinations with a bug-style local navigator that never needs the
//! whole map.

// ============================================================================
// MODULES
// ============================================================================

pub mod agent;
pub mod constants;
pub mod coords;
pub mod graph;
pub mod messages;
pub mod nav;
pub mod settings;
pub mod terrain;

#[cfg(test)]
mod tests;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use agent::{AgentCore, OutboundBundle};
pub use constants::AgentClass;
pub use coords::{CacheLoc, Dir8, Frame, WorldLoc};
pub use settings::{CoreSettings, load_settings, save_settings};
pub use graph::{NodeId, StructureGraph};
pub use nav::{BugNavigator, PassabilityOracle, Rotation, wiggle, wiggle_limited};
pub use terrain::{MapEdges, TerrainCache, TileReading, TileSensor};
