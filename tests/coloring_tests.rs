//! End-to-end scenarios for the LP-relaxation coloring core.
#![cfg(feature = "lp-solver")]

use layoutsolvers::models::{ColorCount, ConflictGraph};
use layoutsolvers::solvers::LpColoring;

#[test]
fn triangle_is_three_colored() {
    let graph = ConflictGraph::with_edges(3, vec![(0, 1, 1), (1, 2, 1), (0, 2, 1)]).unwrap();
    let (colors, stats) = LpColoring::new(ColorCount::Three)
        .solve_with_stats(&graph)
        .unwrap();
    assert!(graph.is_proper(&colors), "colors {colors:?}");
    assert!(colors.iter().all(|&c| c < 3));
    assert_eq!(stats.residual_conflicts, 0);
}

#[test]
fn k4_uses_all_four_colors() {
    let graph = ConflictGraph::with_edges(
        4,
        vec![(0, 1, 1), (0, 2, 1), (0, 3, 1), (1, 2, 1), (1, 3, 1), (2, 3, 1)],
    )
    .unwrap();
    let colors = LpColoring::new(ColorCount::Four).solve(&graph).unwrap();
    assert!(graph.is_proper(&colors), "colors {colors:?}");
    let mut seen = colors.clone();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 4, "colors {colors:?}");
}

#[test]
fn odd_pentagon_converges() {
    let graph = ConflictGraph::with_edges(
        5,
        vec![(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 4, 1), (4, 0, 1)],
    )
    .unwrap();
    let (colors, stats) = LpColoring::new(ColorCount::Three)
        .solve_with_stats(&graph)
        .unwrap();
    assert!(graph.is_proper(&colors), "colors {colors:?}");
    assert!(colors.iter().all(|&c| c < 3));
    assert_eq!(stats.residual_conflicts, 0);
}

#[test]
fn precolored_vertex_keeps_its_color() {
    let mut graph = ConflictGraph::with_edges(2, vec![(0, 1, 1)]).unwrap();
    graph.set_precolor(0, 1).unwrap();
    for palette in [ColorCount::Three, ColorCount::Four] {
        let colors = LpColoring::new(palette).solve(&graph).unwrap();
        assert_eq!(colors[0], 1, "{palette:?}");
        assert_ne!(colors[1], 1, "{palette:?}");
        assert!(colors[1] < palette.colors(), "{palette:?}");
    }
}

#[test]
fn triangular_prism_resolves_with_four_colors() {
    // Two triangles joined by a matching.
    let graph = ConflictGraph::with_edges(
        6,
        vec![
            (0, 1, 1),
            (1, 2, 1),
            (0, 2, 1),
            (3, 4, 1),
            (4, 5, 1),
            (3, 5, 1),
            (0, 3, 1),
            (1, 4, 1),
            (2, 5, 1),
        ],
    )
    .unwrap();
    let colors = LpColoring::new(ColorCount::Four).solve(&graph).unwrap();
    assert!(graph.is_proper(&colors), "colors {colors:?}");
    assert!(colors.iter().all(|&c| c < 4));
}

#[test]
fn weighted_conflicts_all_resolved() {
    let graph =
        ConflictGraph::with_edges(4, vec![(0, 1, 5), (1, 2, 2), (2, 3, 7), (3, 0, 2)]).unwrap();
    let colors = LpColoring::new(ColorCount::Three).solve(&graph).unwrap();
    assert_eq!(graph.conflict_weight(&colors), 0);
}

#[test]
fn several_precolored_vertices() {
    // Path 0 - 1 - 2 with both ends pinned to the same color.
    let mut graph = ConflictGraph::with_edges(3, vec![(0, 1, 1), (1, 2, 1)]).unwrap();
    graph.set_precolor(0, 2).unwrap();
    graph.set_precolor(2, 2).unwrap();
    let colors = LpColoring::new(ColorCount::Three).solve(&graph).unwrap();
    assert_eq!(colors[0], 2);
    assert_eq!(colors[2], 2);
    assert_ne!(colors[1], 2);
}
