use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use test_log::test;

use dialectic_rs::distance::{normalised_hamming_distance, normalised_edit_distance};
use dialectic_rs::formula::{Argument, Debate, Formula, Sentence};
use dialectic_rs::position::{pick_random_positions, Position};
use dialectic_rs::sccp::Sccp;

fn debate() -> Debate {
    Debate::new([
        Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap(),
        Argument::new([Formula::atom("b"), -Formula::atom("c")], Formula::atom("d")).unwrap(),
    ])
}

#[test]
fn test_four_cycle() {
    let sccp = Debate::over([Sentence::new("a"), Sentence::new("b")]).sccp();
    assert_eq!(sccp.len(), 4);
    assert_eq!(sccp.num_edges(), 4);
    for node in sccp.nodes() {
        assert_eq!(sccp.neighbours(node).len(), 2, "node {}", node);
    }
    // Opposite corners are not adjacent
    assert!(!sccp.neighbours("00").contains(&"11".to_string()));
    assert!(!sccp.neighbours("01").contains(&"10".to_string()));
}

#[test]
fn test_adjacency_is_symmetric() {
    let sccp = debate().sccp();
    assert_eq!(sccp.len(), 10);
    for (node, neighbours) in sccp.adjacency() {
        for other in neighbours {
            assert!(sccp.neighbours(other).contains(node), "{} -> {}", node, other);
        }
    }
}

#[test]
fn test_neighbours_differ_in_one_sentence() {
    let sccp = debate().sccp();
    for (node, neighbours) in sccp.adjacency() {
        let p = Position::new(sccp.attribution(node).unwrap().clone());
        for other in neighbours {
            let q = Position::new(sccp.attribution(other).unwrap().clone());
            let d = normalised_hamming_distance(&p, &q).unwrap();
            assert_eq!(d, 1.0 / sccp.order().len() as f64);
        }
    }
}

#[test]
fn test_distance_is_a_metric_on_total_positions() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let positions = pick_random_positions(5, &debate(), &mut rng).unwrap();
    for p in &positions {
        assert_eq!(normalised_hamming_distance(p, p).unwrap(), 0.0);
        assert_eq!(normalised_edit_distance(p, p), 0.0);
        for q in &positions {
            assert_eq!(
                normalised_hamming_distance(p, q).unwrap(),
                normalised_hamming_distance(q, p).unwrap()
            );
            assert_eq!(normalised_edit_distance(p, q), normalised_edit_distance(q, p));
        }
    }
    assert!(pick_random_positions(100, &debate(), &mut rng).is_none());
}

#[test]
fn test_graph_from_positions_matches_sccp() {
    let sccp = debate().sccp();
    let positions: Vec<Position> = sccp
        .nodes()
        .map(|code| Position::new(sccp.attribution(code).unwrap().clone()))
        .collect();
    let graph = Sccp::from_positions(&positions);
    assert_eq!(graph.adjacency(), sccp.adjacency());
}
