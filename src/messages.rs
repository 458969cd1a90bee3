//! Messages - Wire payloads exchanged between teammates.
//!
//! The layouts here are the wire contract and stay hand-packed fixed-width
//! words; bytemuck only reinterprets finished word buffers as bytes for the
//! transport. Three payload kinds: terrain fragments (packed block pairs),
//! edge reports, and structure reports.

use crate::constants::{ANCHOR_UNKNOWN, REPORT_COORD_BITS};
use crate::coords::WorldLoc;
use crate::graph::{NodeId, StructureGraph};
use crate::terrain::TerrainCache;

// ============================================================================
// TERRAIN FRAGMENTS
// ============================================================================
// Flat sequence of word pairs. First word of each pair: block address in
// bits 16.., wall mask in the low 16. Second word: sensed mask in the low 16.

/// Merge a received terrain fragment, pair by pair. Odd trailing words are
/// ignored (truncated transmission).
pub fn apply_terrain_fragment(cache: &mut TerrainCache, words: &[u32]) {
    for pair in words.chunks_exact(2) {
        cache.merge_packed_block(pair[0], pair[1]);
    }
}

/// View a finished word payload as bytes for the transport layer.
pub fn payload_bytes(words: &[u32]) -> &[u8] {
    bytemuck::cast_slice(words)
}

/// Reassemble a word payload from transport bytes. `None` if the length is
/// not word-aligned.
pub fn payload_from_bytes(bytes: &[u8]) -> Option<Vec<u32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
    )
}

// ============================================================================
// EDGE REPORTS
// ============================================================================
// Four scalars, one per map boundary, 0 = unknown. Merged first-write-wins
// like local discovery.

pub fn encode_edge_report(cache: &TerrainCache) -> [u16; 4] {
    let report = cache.edges.report();
    [
        report[0] as u16,
        report[1] as u16,
        report[2] as u16,
        report[3] as u16,
    ]
}

pub fn apply_edge_report(cache: &mut TerrainCache, report: [u16; 4]) {
    cache.edges.merge_report([
        report[0] as i32,
        report[1] as i32,
        report[2] as i32,
        report[3] as i32,
    ]);
}

// ============================================================================
// STRUCTURE REPORTS
// ============================================================================
// Word 0: enemy anchor location, or ANCHOR_UNKNOWN. Word 1: the reported
// node. Words 2..: its known neighbors. Locations pack as `x << 15 | y`.

/// Pack a world location into one report word. World coordinates are
/// nonnegative and below 2^15 by the map-size invariant.
pub fn pack_report_loc(loc: WorldLoc) -> u32 {
    ((loc.x as u32) << REPORT_COORD_BITS) | (loc.y as u32)
}

pub fn unpack_report_loc(word: u32) -> WorldLoc {
    let mask = (1u32 << REPORT_COORD_BITS) - 1;
    WorldLoc::new((word >> REPORT_COORD_BITS) as i32, (word & mask) as i32)
}

/// Build the outbound structure report for this tick: nodes are reported
/// round-robin by tick so the whole graph cycles through the channel.
/// `None` when the graph has nothing shareable yet or the scheduled node is
/// still unsensed.
pub fn encode_structure_report(graph: &StructureGraph, tick: u32) -> Option<Vec<u32>> {
    let count = graph.node_count() as u32;
    if count < 2 {
        return None;
    }
    let id = ((tick % (count - 1)) + 2) as NodeId;
    if !graph.is_sensed(id) {
        return None;
    }
    let loc = graph.location(id)?;
    let mut words = Vec::with_capacity(graph.neighbors(id).len() + 2);
    words.push(match graph.enemy_anchor_loc() {
        Some(anchor) => pack_report_loc(anchor),
        None => ANCHOR_UNKNOWN,
    });
    words.push(pack_report_loc(loc));
    for &neighbor in graph.neighbors(id) {
        if let Some(nloc) = graph.location(neighbor) {
            words.push(pack_report_loc(nloc));
        }
    }
    Some(words)
}

/// Merge a received structure report.
pub fn apply_structure_report(cache: &mut TerrainCache, words: &[u32]) {
    cache.integrate_structure_report(words);
}
