//! Structure Graph - Adjacency graph of capturable map structures.
//!
//! Reconstructed incrementally as structures are sensed or reported by
//! teammates. Every agent owns an independent copy; consistency comes from
//! all agents applying the same monotonic merge rules, never from shared
//! state.

use hashbrown::HashMap;
use tracing::info;

use crate::coords::WorldLoc;

/// Structure node identifier. 0 is reserved for "none".
pub type NodeId = u16;

/// One known structure: its location, whether any agent has directly sensed
/// it, and the neighbor ids discovered so far.
#[derive(Clone, Debug)]
pub struct StructureNode {
    pub loc: WorldLoc,
    pub sensed: bool,
    pub adjacency: Vec<NodeId>,
}

/// Incrementally reconstructed structure adjacency graph. Nodes are created
/// on first sight (or first report) and never removed; edges are added,
/// never removed.
pub struct StructureGraph {
    /// Index 0 is a placeholder so node ids can double as indices.
    nodes: Vec<StructureNode>,
    /// World location -> node id, for id assignment on repeat sightings.
    loc_index: HashMap<(i32, i32), NodeId>,
    enemy_anchor: NodeId,
    sensed_count: u16,
}

impl Default for StructureGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![StructureNode {
                loc: WorldLoc::new(0, 0),
                sensed: false,
                adjacency: Vec::new(),
            }],
            loc_index: HashMap::new(),
            enemy_anchor: 0,
            sensed_count: 0,
        }
    }

    /// Number of known nodes (placeholder excluded).
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn sensed_count(&self) -> u16 {
        self.sensed_count
    }

    /// Node id at a location, or 0 if no structure is known there.
    pub fn id_at(&self, loc: WorldLoc) -> NodeId {
        self.loc_index.get(&(loc.x, loc.y)).copied().unwrap_or(0)
    }

    pub fn location(&self, id: NodeId) -> Option<WorldLoc> {
        if id == 0 {
            return None;
        }
        self.nodes.get(id as usize).map(|n| n.loc)
    }

    pub fn is_sensed(&self, id: NodeId) -> bool {
        self.nodes.get(id as usize).is_some_and(|n| n.sensed)
    }

    /// Get-or-create the node at `loc`. Returns the id and whether the node
    /// was newly created (a new node means the caller may need to mark the
    /// cell as terrain).
    pub fn upsert(&mut self, loc: WorldLoc) -> (NodeId, bool) {
        let existing = self.id_at(loc);
        if existing != 0 {
            return (existing, false);
        }
        let id = self.nodes.len() as NodeId;
        self.nodes.push(StructureNode {
            loc,
            sensed: false,
            adjacency: Vec::new(),
        });
        self.loc_index.insert((loc.x, loc.y), id);
        (id, true)
    }

    /// Append the edge to both adjacency lists unless already present.
    /// Linear dedup: lists are small (bounded structure degree).
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) {
        if a == 0 || b == 0 || a == b {
            return;
        }
        if !self.nodes[a as usize].adjacency.contains(&b) {
            self.nodes[a as usize].adjacency.push(b);
        }
        if !self.nodes[b as usize].adjacency.contains(&a) {
            self.nodes[b as usize].adjacency.push(a);
        }
    }

    /// Mark a node as directly sensed (or fully reported). Monotonic.
    pub fn mark_sensed(&mut self, id: NodeId) {
        if id == 0 {
            return;
        }
        if let Some(node) = self.nodes.get_mut(id as usize) {
            if !node.sensed {
                node.sensed = true;
                self.sensed_count += 1;
            }
        }
    }

    /// Record the enemy-owned anchor node. First write wins; later calls are
    /// no-ops, same discipline as boundary discovery.
    pub fn mark_enemy_anchor(&mut self, id: NodeId) {
        if self.enemy_anchor == 0 && id != 0 {
            self.enemy_anchor = id;
            info!(node = id, "enemy anchor fixed");
        }
    }

    /// The enemy-owned anchor node, or 0 while unknown.
    pub fn enemy_anchor(&self) -> NodeId {
        self.enemy_anchor
    }

    pub fn enemy_anchor_loc(&self) -> Option<WorldLoc> {
        self.location(self.enemy_anchor)
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id as usize)
            .map(|n| n.adjacency.as_slice())
            .unwrap_or(&[])
    }

    /// True if we know the node is a graph leaf: sensed with degree <= 1.
    pub fn is_dead_end(&self, id: NodeId) -> bool {
        match self.nodes.get(id as usize) {
            Some(node) if id != 0 => node.sensed && node.adjacency.len() <= 1,
            _ => false,
        }
    }
}

impl std::fmt::Display for StructureGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (id, node) in self.nodes.iter().enumerate().skip(1) {
            write!(
                f,
                "node #{id} ({}, {}) sensed={}",
                node.loc.x, node.loc.y, node.sensed
            )?;
            for adj in &node.adjacency {
                write!(f, " {adj}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "enemy anchor is node #{}", self.enemy_anchor)
    }
}
