//! Dijkstra shortest paths over a travel graph

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use terrawalk_core::raster::Raster;
use terrawalk_core::{Error, Result};
use terrawalk_parallel::{ParallelStrategy, ProcessingMode};
use tracing::debug;

use super::Path;
use crate::graph::TravelGraph;

/// Parameters for batched path queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverParams {
    /// Scheduling of independent queries
    pub mode: ProcessingMode,
}

const NO_PREDECESSOR: u32 = u32::MAX;

/// Priority queue entry, ordered as a min-heap on cost
#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    cost: f64,
    node: usize,
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; ties broken on node index
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Settled times and predecessors of one search
struct Search {
    times: Vec<f64>,
    predecessors: Vec<u32>,
}

/// Single-source Dijkstra, stopping once `target` is settled
fn dijkstra(graph: &TravelGraph, source: usize, target: Option<usize>) -> Search {
    let n = graph.node_count();
    let mut times = vec![f64::INFINITY; n];
    let mut predecessors = vec![NO_PREDECESSOR; n];
    let mut heap = BinaryHeap::new();

    times[source] = 0.0;
    heap.push(State { cost: 0.0, node: source });

    while let Some(State { cost, node }) = heap.pop() {
        if cost > times[node] {
            continue;
        }
        if Some(node) == target {
            break;
        }

        for (next, weight) in graph.edges(node) {
            let candidate = cost + weight;
            if candidate < times[next] {
                times[next] = candidate;
                predecessors[next] = node as u32;
                heap.push(State { cost: candidate, node: next });
            }
        }
    }

    Search { times, predecessors }
}

/// Least-cost path between two cells.
///
/// Returns [`Error::NoPath`] when barriers separate the cells and
/// [`Error::IndexOutOfBounds`] when either cell is outside the grid.
pub fn solve(graph: &TravelGraph, origin: (usize, usize), destination: (usize, usize)) -> Result<Path> {
    let source = graph.index(origin)?;
    let target = graph.index(destination)?;

    let search = dijkstra(graph, source, Some(target));
    let travel_time = search.times[target];
    if !travel_time.is_finite() {
        return Err(Error::NoPath { origin, destination });
    }

    let mut nodes = vec![target];
    let mut current = target;
    while current != source {
        current = search.predecessors[current] as usize;
        nodes.push(current);
    }
    nodes.reverse();

    let cells: Vec<_> = nodes.into_iter().map(|i| graph.cell(i)).collect();
    let coordinates = cells.iter().map(|&c| graph.cell_center(c)).collect();

    debug!(?origin, ?destination, travel_time, steps = cells.len() - 1, "path solved");

    Ok(Path::new(cells, travel_time, coordinates, graph.crs().cloned()))
}

/// Least-cost path between two world coordinates in the graph's CRS
pub fn solve_coords(graph: &TravelGraph, from: (f64, f64), to: (f64, f64)) -> Result<Path> {
    let locate = |name: &'static str, (x, y): (f64, f64)| {
        graph.cell_at(x, y).ok_or_else(|| Error::InvalidParameter {
            name,
            value: format!("({}, {})", x, y),
            reason: "outside the grid".into(),
        })
    };
    solve(graph, locate("origin", from)?, locate("destination", to)?)
}

/// Run independent queries against one graph.
///
/// The outer `Result` only fails when the worker pool cannot be set up;
/// each query carries its own outcome, so an unreachable destination does
/// not affect the others.
pub fn solve_many(
    graph: &TravelGraph,
    queries: &[((usize, usize), (usize, usize))],
    params: &SolverParams,
) -> Result<Vec<Result<Path>>> {
    params.mode.par_map(0..queries.len(), |i| {
        let (origin, destination) = queries[i];
        solve(graph, origin, destination)
    })
}

/// Cumulative travel time in seconds from `origin` to every cell.
///
/// Unreachable cells are NaN, which is also the output nodata value. The
/// result shares the graph's georeferencing.
pub fn travel_time_surface(graph: &TravelGraph, origin: (usize, usize)) -> Result<Raster<f64>> {
    let source = graph.index(origin)?;
    let search = dijkstra(graph, source, None);

    let reached = search.times.iter().filter(|t| t.is_finite()).count();
    debug!(?origin, reached, cells = graph.node_count(), "travel time surface computed");

    let values: Vec<f64> = search
        .times
        .into_iter()
        .map(|t| if t.is_finite() { t } else { f64::NAN })
        .collect();

    let (rows, cols) = graph.shape();
    let mut surface = Raster::from_vec(values, rows, cols)?.with_transform(*graph.transform());
    surface.set_crs(graph.crs().cloned());
    surface.set_nodata(Some(f64::NAN));
    Ok(surface)
}
