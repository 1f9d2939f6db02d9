//! Integration tests: graph model invariants under long mutation sequences.
//!
//! Drives a `Diagram` with a deterministic pseudo-random mix of adds and
//! deletes and checks uniqueness, referential integrity and idempotence
//! after every step.

use pretty_assertions::assert_eq;
use sld_core::*;
use std::collections::HashSet;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

fn assert_no_dangling(d: &Diagram) {
    for e in d.edges() {
        assert!(d.contains_node(e.source), "edge {} has dangling source", e.id);
        assert!(d.contains_node(e.target), "edge {} has dangling target", e.id);
    }
}

fn run_sequence(seed: u64, steps: usize) -> (Diagram, Vec<NodeId>, Vec<EdgeId>) {
    init_logs();
    let mut rng = Lcg(seed);
    let mut d = Diagram::new();
    let mut node_ids = Vec::new();
    let mut edge_ids = Vec::new();

    for _ in 0..steps {
        let live: Vec<NodeId> = d.nodes().map(|n| n.id).collect();
        match rng.below(5) {
            0 | 1 => {
                let kind = SymbolKind::ALL[rng.below(SymbolKind::ALL.len())];
                let p = Position::new(rng.below(800) as f32, rng.below(600) as f32);
                node_ids.push(d.add_node(kind, p));
            }
            2 if live.len() >= 2 => {
                let a = live[rng.below(live.len())];
                let b = live[rng.below(live.len())];
                edge_ids.push(d.add_edge(Connection::new(a, b)).unwrap());
            }
            3 if !live.is_empty() => {
                let victim = live[rng.below(live.len())];
                d.delete_nodes(&[victim]);
                assert!(d.edges().all(|e| !e.touches(victim)));
            }
            4 => {
                let edges: Vec<EdgeId> = d.edges().map(|e| e.id).collect();
                if let Some(&e) = edges.first() {
                    d.delete_edges(&[e]);
                }
            }
            _ => {}
        }
        assert_no_dangling(&d);
    }
    (d, node_ids, edge_ids)
}

// ─── Identity ────────────────────────────────────────────────────────────

#[test]
fn ids_never_repeat_within_a_session() {
    for seed in [1, 7, 42, 1234] {
        let (_, nodes, edges) = run_sequence(seed, 400);
        let unique_nodes: HashSet<_> = nodes.iter().collect();
        let unique_edges: HashSet<_> = edges.iter().collect();
        assert_eq!(unique_nodes.len(), nodes.len(), "seed {seed}");
        assert_eq!(unique_edges.len(), edges.len(), "seed {seed}");
    }
}

#[test]
fn two_diagrams_allocate_independently() {
    let mut a = Diagram::new();
    let mut b = Diagram::new();
    for _ in 0..3 {
        a.add_node(SymbolKind::Load, Position::default());
    }
    let first_b = b.add_node(SymbolKind::Load, Position::default());
    assert_eq!(first_b.as_str(), "node_0");
}

// ─── Integrity ───────────────────────────────────────────────────────────

#[test]
fn no_dangling_edges_after_random_sequences() {
    for seed in [3, 99, 2024] {
        let (d, _, _) = run_sequence(seed, 300);
        assert_no_dangling(&d);
    }
}

#[test]
fn delete_nodes_twice_equals_once() {
    let (mut d, _, _) = run_sequence(5, 120);
    let victims: Vec<NodeId> = d.nodes().step_by(2).map(|n| n.id).collect();
    d.delete_nodes(&victims);
    let once = d.snapshot();
    d.delete_nodes(&victims);
    assert_eq!(d.snapshot(), once);
}

#[test]
fn snapshot_restore_is_lossless() {
    let (mut d, _, _) = run_sequence(11, 150);
    let snap = d.snapshot();
    let all: Vec<NodeId> = d.nodes().map(|n| n.id).collect();
    d.delete_nodes(&all);
    assert!(d.is_empty());
    d.restore(&snap);
    assert_eq!(d.snapshot(), snap);
}

#[test]
fn seeding_drops_dangling_and_duplicate_entries() {
    init_logs();
    let (d, _, _) = run_sequence(17, 60);
    let snap = d.snapshot();
    let mut nodes = snap.nodes.to_vec();
    let mut edges = snap.edges.to_vec();
    if let Some(first) = nodes.first().cloned() {
        nodes.push(first);
    }
    edges.push(Edge {
        id: EdgeId::intern("edge_dangling"),
        source: NodeId::intern("node_missing"),
        target: NodeId::intern("node_missing_too"),
        source_handle: None,
        target_handle: None,
        selected: false,
    });
    let seeded = Diagram::from_parts(nodes, edges);
    assert_eq!(seeded.node_count(), d.node_count());
    assert_eq!(seeded.edge_count(), d.edge_count());
    assert_no_dangling(&seeded);
}

// ─── Rendering ───────────────────────────────────────────────────────────

#[test]
fn renderers_are_deterministic() {
    for kind in SymbolKind::ALL {
        for state in [SwitchState::Open, SwitchState::Closed] {
            assert_eq!(kind.render(state), kind.render(state));
        }
    }
}

#[test]
fn drop_position_round_trips_within_grid_tolerance() {
    let vt = ViewTransform::new(-37.0, 12.5, 1.2);
    for (sx, sy) in [(100.0, 100.0), (431.0, 17.0), (5.0, 599.0)] {
        let p = snap_to_grid(vt.screen_to_flow(sx, sy), GRID_SIZE);
        let (bx, by) = vt.flow_to_screen(p);
        let tolerance = GRID_SIZE / 2.0 * vt.zoom + 1e-3;
        assert!((bx - sx).abs() <= tolerance, "x {bx} vs {sx}");
        assert!((by - sy).abs() <= tolerance, "y {by} vs {sy}");
    }
}
