//! Structure Tests - Graph maintenance, reports, and anchor guessing.

use crate::constants::{ANCHOR_UNKNOWN, AgentClass};
use crate::coords::{Dir8, WorldLoc};
use crate::graph::StructureGraph;
use crate::messages::{apply_structure_report, encode_structure_report, pack_report_loc};
use crate::terrain::TerrainCache;

const HOME: WorldLoc = WorldLoc { x: 30, y: 30 };

#[test]
fn upsert_assigns_stable_ids() {
    let mut graph = StructureGraph::new();
    let (a, created_a) = graph.upsert(WorldLoc::new(40, 30));
    let (b, created_b) = graph.upsert(WorldLoc::new(40, 31));
    let (a2, created_a2) = graph.upsert(WorldLoc::new(40, 30));
    assert!(created_a && created_b && !created_a2);
    assert_eq!(a, a2);
    assert_ne!(a, b);
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.id_at(WorldLoc::new(40, 30)), a);
    assert_eq!(graph.id_at(WorldLoc::new(99, 99)), 0);
}

#[test]
fn edges_are_bidirectional_and_deduplicated() {
    let mut graph = StructureGraph::new();
    let (a, _) = graph.upsert(WorldLoc::new(40, 30));
    let (b, _) = graph.upsert(WorldLoc::new(50, 30));
    graph.add_edge(a, b);
    graph.add_edge(a, b);
    graph.add_edge(b, a);
    assert_eq!(graph.neighbors(a), &[b]);
    assert_eq!(graph.neighbors(b), &[a]);
    assert!(graph.to_string().starts_with("node #1 (40, 30)"));
}

#[test]
fn dead_ends_need_sensing_and_low_degree() {
    let mut graph = StructureGraph::new();
    let (a, _) = graph.upsert(WorldLoc::new(40, 30));
    let (b, _) = graph.upsert(WorldLoc::new(50, 30));
    let (c, _) = graph.upsert(WorldLoc::new(50, 40));
    graph.add_edge(a, b);
    assert!(!graph.is_dead_end(b));
    graph.mark_sensed(b);
    assert!(graph.is_dead_end(b));
    graph.add_edge(b, c);
    assert!(!graph.is_dead_end(b));
}

#[test]
fn enemy_anchor_is_first_write_wins() {
    let mut graph = StructureGraph::new();
    let (a, _) = graph.upsert(WorldLoc::new(40, 30));
    let (b, _) = graph.upsert(WorldLoc::new(50, 30));
    graph.mark_enemy_anchor(a);
    graph.mark_enemy_anchor(b);
    assert_eq!(graph.enemy_anchor(), a);
    assert_eq!(graph.enemy_anchor_loc(), Some(WorldLoc::new(40, 30)));
}

#[test]
fn recorded_structures_wall_their_own_cell_only() {
    let mut cache = TerrainCache::new(HOME, AgentClass::Scout);
    let node = WorldLoc::new(40, 30);
    let neighbor = WorldLoc::new(50, 30);
    cache.record_structure(node, &[neighbor], false);

    assert!(cache.is_known_wall(node));
    assert!(!cache.is_known_wall(neighbor));
    let id = cache.structures.id_at(node);
    assert!(cache.structures.is_sensed(id));
    assert!(!cache.structures.is_sensed(cache.structures.id_at(neighbor)));
    assert_eq!(cache.structures.sensed_count(), 1);
}

#[test]
fn reports_cycle_round_robin_and_skip_unsensed() {
    let mut cache = TerrainCache::new(HOME, AgentClass::Scout);
    cache.record_structure(HOME, &[], false);
    let node = WorldLoc::new(40, 30);
    let frontier = WorldLoc::new(50, 30);
    cache.record_structure(node, &[frontier], false);

    // Tick 0 schedules the first non-home node; tick 1 lands on the
    // frontier neighbor, which nobody has sensed yet.
    let words = encode_structure_report(&cache.structures, 0).unwrap();
    assert_eq!(words[0], ANCHOR_UNKNOWN);
    assert_eq!(words[1], pack_report_loc(node));
    assert_eq!(&words[2..], &[pack_report_loc(frontier)]);
    assert_eq!(encode_structure_report(&cache.structures, 1), None);
}

#[test]
fn tiny_graphs_produce_no_report() {
    let mut cache = TerrainCache::new(HOME, AgentClass::Scout);
    assert_eq!(encode_structure_report(&cache.structures, 0), None);
    cache.record_structure(HOME, &[], false);
    assert_eq!(encode_structure_report(&cache.structures, 0), None);
}

#[test]
fn structure_reports_rebuild_the_graph_remotely() {
    let mut sender = TerrainCache::new(HOME, AgentClass::Scout);
    sender.record_structure(HOME, &[], false);
    let node = WorldLoc::new(40, 30);
    let frontier = WorldLoc::new(50, 30);
    sender.record_structure(node, &[frontier], false);

    let mut receiver = TerrainCache::new(HOME, AgentClass::Warden);
    let words = encode_structure_report(&sender.structures, 0).unwrap();
    apply_structure_report(&mut receiver, &words);

    let id = receiver.structures.id_at(node);
    assert_ne!(id, 0);
    assert!(receiver.structures.is_sensed(id));
    assert!(receiver.is_known_wall(node));
    assert!(!receiver.is_known_wall(frontier));
    let nid = receiver.structures.id_at(frontier);
    assert!(receiver.structures.neighbors(id).contains(&nid));

    // Reapplying the same report changes nothing.
    let count = receiver.structures.node_count();
    apply_structure_report(&mut receiver, &words);
    assert_eq!(receiver.structures.node_count(), count);
}

#[test]
fn anchor_sightings_travel_with_reports() {
    let mut sender = TerrainCache::new(HOME, AgentClass::Scout);
    sender.record_structure(HOME, &[], false);
    sender.record_structure(WorldLoc::new(40, 30), &[], false);
    let anchor = WorldLoc::new(45, 45);
    sender.record_structure(anchor, &[], true);

    let mut receiver = TerrainCache::new(HOME, AgentClass::Warden);
    let words = encode_structure_report(&sender.structures, 0).unwrap();
    assert_eq!(words[0], pack_report_loc(anchor));
    apply_structure_report(&mut receiver, &words);
    assert_eq!(receiver.structures.enemy_anchor_loc(), Some(anchor));

    // A conflicting later claim loses.
    let mut fake = words.clone();
    fake[0] = pack_report_loc(WorldLoc::new(12, 12));
    fake[1] = pack_report_loc(WorldLoc::new(41, 31));
    apply_structure_report(&mut receiver, &fake);
    assert_eq!(receiver.structures.enemy_anchor_loc(), Some(anchor));
}

#[test]
fn anchor_guess_prefers_hard_knowledge() {
    let mut cache = TerrainCache::new(HOME, AgentClass::Scout);
    let anchor = WorldLoc::new(45, 45);
    cache.record_structure(anchor, &[], true);
    assert_eq!(cache.guess_enemy_anchor(HOME), anchor);
}

#[test]
fn anchor_guess_with_no_knowledge_heads_out() {
    let cache = TerrainCache::new(HOME, AgentClass::Scout);
    assert_eq!(cache.guess_enemy_anchor(HOME), HOME.add(Dir8::North, 60));
}

#[test]
fn anchor_guess_follows_the_mean_structure_direction() {
    let mut cache = TerrainCache::new(HOME, AgentClass::Scout);
    cache.record_structure(HOME, &[], false);
    cache.record_structure(WorldLoc::new(40, 30), &[], false);
    cache.record_structure(WorldLoc::new(40, 40), &[], false);
    // Mean offset (20, 10), scaled out to radius 90 from home.
    assert_eq!(cache.guess_enemy_anchor(HOME), WorldLoc::new(110, 70));
}

#[test]
fn anchor_guess_with_edges_lands_on_unsensed_ground() {
    let mut cache = TerrainCache::new(HOME, AgentClass::Warden);
    let world = super::GridWorld::open(WorldLoc::new(0, 0), WorldLoc::new(60, 60));
    cache.sense_all(&world, HOME);
    cache.edges.merge_report([97, 0, 0, 0]);
    let guess = cache.guess_enemy_anchor(HOME);
    assert!(!cache.is_sensed(guess));
    assert_ne!(guess, HOME);
}
