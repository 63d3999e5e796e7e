//! Least-cost path behavior on small synthetic grids.

use approx::assert_relative_eq;
use std::f64::consts::SQRT_2;
use terrawalk_algorithms::barrier::IMPASSABLE;
use terrawalk_algorithms::conductance::{LorentzianSpeed, SpeedModel};
use terrawalk_algorithms::graph::{CostLayers, GraphBuilder, GraphParams, TravelGraph};
use terrawalk_algorithms::path::{solve, solve_coords, solve_many, travel_time_surface, SolverParams};
use terrawalk_core::raster::{Neighborhood, Raster};
use terrawalk_core::{Error, GeoTransform};
use terrawalk_parallel::ProcessingMode;

const RES: f64 = 10.0;

/// Congruent layers on a north-up grid with 10 m cells
struct Scene {
    elevation: Raster<f64>,
    density: Raster<f64>,
    roughness: Raster<f64>,
    cliff: Raster<u8>,
    water: Raster<u8>,
}

impl Scene {
    fn uniform(rows: usize, cols: usize, density: f64, roughness: f64) -> Self {
        let gt = GeoTransform::north_up(0.0, rows as f64 * RES, RES);
        Self {
            elevation: Raster::filled(rows, cols, 0.0).with_transform(gt),
            density: Raster::filled(rows, cols, density).with_transform(gt),
            roughness: Raster::filled(rows, cols, roughness).with_transform(gt),
            cliff: Raster::filled(rows, cols, 1u8).with_transform(gt),
            water: Raster::filled(rows, cols, 1u8).with_transform(gt),
        }
    }

    fn flat(rows: usize, cols: usize) -> Self {
        Self::uniform(rows, cols, 0.0, 0.0)
    }

    fn graph_with(&self, neighborhood: Neighborhood) -> TravelGraph {
        let layers = CostLayers {
            elevation: &self.elevation,
            density: &self.density,
            roughness: &self.roughness,
            cliff: &self.cliff,
            water: &self.water,
        };
        let params = GraphParams {
            neighborhood,
            mode: ProcessingMode::Sequential,
        };
        GraphBuilder::new(layers).unwrap().build(&params).unwrap()
    }

    fn graph(&self) -> TravelGraph {
        self.graph_with(Neighborhood::Knight16)
    }
}

fn flat_speed() -> f64 {
    LorentzianSpeed.speed(0.0, 0.0, 0.0)
}

// ---------------------------------------------------------------------------
// 3x3 flat grid
// ---------------------------------------------------------------------------

#[test]
fn flat_grid_speed_is_lorentzian_at_zero() {
    let graph = Scene::flat(3, 3).graph();
    let v = LorentzianSpeed::lorentzian(0.0);
    assert_relative_eq!(flat_speed(), v);

    for node in 0..graph.node_count() {
        let (r, c) = graph.cell(node);
        for (target, seconds) in graph.edges(node) {
            let (tr, tc) = graph.cell(target);
            let dr = tr as f64 - r as f64;
            let dc = tc as f64 - c as f64;
            let distance = RES * dr.hypot(dc);
            assert_relative_eq!(distance / seconds, v, max_relative = 1e-12);
        }
    }
}

#[test]
fn diagonal_neighbor_uses_single_diagonal_edge() {
    let graph = Scene::flat(3, 3).graph();
    let path = solve(&graph, (0, 0), (1, 1)).unwrap();

    assert_eq!(path.cells, vec![(0, 0), (1, 1)]);
    assert_relative_eq!(path.length(), RES * SQRT_2, max_relative = 1e-12);
    assert_relative_eq!(path.travel_time, RES * SQRT_2 / flat_speed(), max_relative = 1e-12);
    // cheaper than the orthogonal detour
    assert!(path.travel_time < 2.0 * RES / flat_speed());
}

#[test]
fn corner_to_corner_follows_the_diagonal() {
    let graph = Scene::flat(3, 3).graph();
    let path = solve(&graph, (0, 0), (2, 2)).unwrap();

    assert_eq!(path.cells, vec![(0, 0), (1, 1), (2, 2)]);
    assert_relative_eq!(path.travel_time, 2.0 * RES * SQRT_2 / flat_speed(), max_relative = 1e-12);
}

#[test]
fn knight_offset_is_a_single_edge() {
    let graph = Scene::flat(3, 3).graph();
    let path = solve(&graph, (0, 0), (1, 2)).unwrap();

    assert_eq!(path.cells, vec![(0, 0), (1, 2)]);
    assert_relative_eq!(path.length(), RES * 5f64.sqrt(), max_relative = 1e-12);
}

#[test]
fn origin_equals_destination() {
    let graph = Scene::flat(3, 3).graph();
    let path = solve(&graph, (1, 1), (1, 1)).unwrap();

    assert_eq!(path.cells, vec![(1, 1)]);
    assert_eq!(path.travel_time, 0.0);
    assert_eq!(path.length(), 0.0);
}

#[test]
fn out_of_grid_cells_are_rejected() {
    let graph = Scene::flat(3, 3).graph();
    assert!(matches!(solve(&graph, (0, 0), (3, 0)), Err(Error::IndexOutOfBounds { .. })));
    assert!(solve_coords(&graph, (5.0, 25.0), (500.0, 25.0)).is_err());
}

// ---------------------------------------------------------------------------
// Uniform cover
// ---------------------------------------------------------------------------

#[test]
fn straight_line_time_on_uniform_grid() {
    let (density, roughness) = (0.3, 0.1);
    let graph = Scene::uniform(10, 10, density, roughness).graph();
    let speed = LorentzianSpeed.speed(0.0, density, roughness);

    let along_row = solve(&graph, (5, 0), (5, 9)).unwrap();
    assert_eq!(along_row.cells.len(), 10);
    assert!(along_row.cells.iter().all(|&(r, _)| r == 5));
    assert_relative_eq!(along_row.length(), 90.0, max_relative = 1e-12);
    assert_relative_eq!(along_row.travel_time, 90.0 / speed, max_relative = 1e-12);

    // four knight moves line up exactly
    let knight_line = solve(&graph, (0, 0), (4, 8)).unwrap();
    let distance = RES * (4.0f64 * 4.0 + 8.0 * 8.0).sqrt();
    assert_eq!(knight_line.steps(), 4);
    assert_relative_eq!(knight_line.length(), distance, max_relative = 1e-12);
    assert_relative_eq!(knight_line.travel_time, distance / speed, max_relative = 1e-12);
}

#[test]
fn world_coordinate_queries() {
    let graph = Scene::flat(10, 10).graph();
    // cell (5, 0) center is (5, 45); cell (5, 9) center is (95, 45)
    let path = solve_coords(&graph, (1.0, 41.0), (99.0, 49.0)).unwrap();

    assert_eq!(path.origin(), Some((5, 0)));
    assert_eq!(path.destination(), Some((5, 9)));
    assert_eq!(path.coordinates()[0], (5.0, 45.0));
    assert_eq!(path.coordinates().last(), Some(&(95.0, 45.0)));
}

// ---------------------------------------------------------------------------
// Slope asymmetry
// ---------------------------------------------------------------------------

#[test]
fn uphill_and_downhill_times_differ() {
    let mut scene = Scene::flat(1, 6);
    for col in 0..6 {
        scene.elevation.set(0, col, col as f64 * 2.0).unwrap();
    }
    let graph = scene.graph();

    let up = solve(&graph, (0, 0), (0, 5)).unwrap();
    let down = solve(&graph, (0, 5), (0, 0)).unwrap();

    let s = (2.0f64 / RES).atan().to_degrees();
    assert_relative_eq!(up.travel_time, 50.0 / LorentzianSpeed::lorentzian(s), max_relative = 1e-12);
    assert_relative_eq!(down.travel_time, 50.0 / LorentzianSpeed::lorentzian(-s), max_relative = 1e-12);
    assert!(up.travel_time > down.travel_time);
}

// ---------------------------------------------------------------------------
// Barriers
// ---------------------------------------------------------------------------

fn with_cliff_rows(rows: &[usize]) -> Scene {
    let mut scene = Scene::flat(7, 7);
    for &r in rows {
        for c in 0..7 {
            scene.cliff.set(r, c, IMPASSABLE).unwrap();
        }
    }
    scene
}

#[test]
fn cliff_row_separates_origin_and_destination() {
    let graph = with_cliff_rows(&[3]).graph_with(Neighborhood::Queen8);
    match solve(&graph, (0, 3), (6, 3)) {
        Err(e @ Error::NoPath { .. }) => assert!(e.is_no_path()),
        other => panic!("expected NoPath, got {other:?}"),
    }
}

#[test]
fn knight_moves_need_a_two_cell_band() {
    // endpoints of a knight edge straddle a single blocked row
    let single = with_cliff_rows(&[3]).graph();
    assert!(solve(&single, (0, 3), (6, 3)).is_ok());

    let double = with_cliff_rows(&[3, 4]).graph();
    assert!(matches!(solve(&double, (0, 3), (6, 3)), Err(Error::NoPath { .. })));
}

#[test]
fn water_cells_are_avoided() {
    let mut scene = Scene::flat(7, 7);
    for r in 0..6 {
        for c in 3..5 {
            scene.water.set(r, c, IMPASSABLE).unwrap();
        }
    }
    let graph = scene.graph();
    let path = solve(&graph, (0, 0), (0, 6)).unwrap();

    assert!(path.cells.iter().all(|&(r, c)| !(r < 6 && (3..5).contains(&c))));
    assert!(path.cells.iter().any(|&(r, _)| r == 6));
    assert!(path.travel_time > 60.0 / flat_speed());
}

// ---------------------------------------------------------------------------
// Batches and surfaces
// ---------------------------------------------------------------------------

#[test]
fn solve_many_isolates_failures() {
    let graph = with_cliff_rows(&[3, 4]).graph();
    let queries = [
        ((0, 0), (2, 6)),
        ((0, 0), (6, 6)),
        ((0, 0), (9, 9)),
        ((5, 0), (6, 6)),
    ];

    for mode in [ProcessingMode::Sequential, ProcessingMode::ParallelWith(2)] {
        let results = solve_many(&graph, &queries, &SolverParams { mode }).unwrap();
        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::NoPath { .. })));
        assert!(matches!(results[2], Err(Error::IndexOutOfBounds { .. })));
        assert!(results[3].is_ok());
    }
}

#[test]
fn solve_many_matches_single_queries() {
    let mut scene = Scene::uniform(8, 8, 0.2, 0.05);
    for r in 0..8 {
        for c in 0..8 {
            scene.elevation.set(r, c, ((r * 7 + c * 3) % 5) as f64).unwrap();
        }
    }
    let graph = scene.graph();
    let queries: Vec<_> = (0..8).map(|i| ((0, i), (7, 7 - i))).collect();

    let batch = solve_many(&graph, &queries, &SolverParams::default()).unwrap();
    for (q, result) in queries.iter().zip(batch) {
        let single = solve(&graph, q.0, q.1).unwrap();
        let batched = result.unwrap();
        assert_eq!(single.cells, batched.cells);
        assert_eq!(single.travel_time, batched.travel_time);
    }
}

#[test]
fn travel_time_surface_agrees_with_paths() {
    let scene = with_cliff_rows(&[3, 4]);
    let graph = scene.graph();
    let surface = travel_time_surface(&graph, (1, 1)).unwrap();

    assert_eq!(surface.shape(), (7, 7));
    assert_eq!(surface.transform(), scene.elevation.transform());
    assert_eq!(surface.get(1, 1).unwrap(), 0.0);
    assert_relative_eq!(
        surface.get(2, 6).unwrap(),
        solve(&graph, (1, 1), (2, 6)).unwrap().travel_time,
        max_relative = 1e-12
    );
    // blocked band and everything beyond it
    assert!(surface.get(3, 0).unwrap().is_nan());
    assert!(surface.get(6, 6).unwrap().is_nan());
    assert!(surface.is_nodata_at(6, 6).unwrap());
}
