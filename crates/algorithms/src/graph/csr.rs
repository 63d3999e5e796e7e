//! Compressed sparse row storage for the built travel graph

use serde::{Deserialize, Serialize};
use terrawalk_core::{Error, GeoTransform, Result, CRS};

/// Counts collected while building a graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Grid cells (graph nodes)
    pub cells: usize,
    /// Stored, traversable edges
    pub edges: usize,
    /// Candidate edges dropped because an endpoint is a cliff or water cell
    pub barrier_edges: usize,
    /// Candidate edges dropped because the speed model returned a
    /// non-positive or non-finite speed
    pub degenerate_edges: usize,
}

/// Directed, weighted graph over grid cells.
///
/// Node `i` is the cell at `(i / cols, i % cols)`. Outgoing edges of node
/// `i` are `targets[offsets[i]..offsets[i + 1]]` with matching `weights`
/// holding traversal times in seconds. Only finite weights are stored.
///
/// A `TravelGraph` is immutable once built; concurrent queries only need
/// a shared reference.
#[derive(Debug, Clone)]
pub struct TravelGraph {
    rows: usize,
    cols: usize,
    transform: GeoTransform,
    crs: Option<CRS>,
    offsets: Vec<usize>,
    targets: Vec<u32>,
    weights: Vec<f64>,
    summary: GraphSummary,
}

impl TravelGraph {
    pub(crate) fn from_parts(
        (rows, cols): (usize, usize),
        transform: GeoTransform,
        crs: Option<CRS>,
        offsets: Vec<usize>,
        targets: Vec<u32>,
        weights: Vec<f64>,
        summary: GraphSummary,
    ) -> Self {
        debug_assert_eq!(offsets.len(), rows * cols + 1);
        debug_assert_eq!(targets.len(), weights.len());
        Self {
            rows,
            cols,
            transform,
            crs,
            offsets,
            targets,
            weights,
            summary,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of nodes (cells)
    pub fn node_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of stored edges
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    pub fn summary(&self) -> &GraphSummary {
        &self.summary
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// Cell size in ground units
    pub fn resolution(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Node index of a cell
    pub fn index(&self, (row, col): (usize, usize)) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Cell of a node index
    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Outgoing edges of a node as `(target, seconds)`
    pub fn edges(&self, index: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.offsets[index]..self.offsets[index + 1];
        self.targets[span.clone()]
            .iter()
            .zip(&self.weights[span])
            .map(|(&t, &w)| (t as usize, w))
    }

    /// Weight of the directed edge between two cells, `None` if absent
    pub fn edge_weight(&self, from: (usize, usize), to: (usize, usize)) -> Option<f64> {
        let from = self.index(from).ok()?;
        let to = self.index(to).ok()?;
        self.edges(from).find(|&(t, _)| t == to).map(|(_, w)| w)
    }

    /// World coordinates of a cell center
    pub fn cell_center(&self, (row, col): (usize, usize)) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }

    /// Cell containing a world coordinate, if inside the grid
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (col, row) = self.transform.geo_to_pixel(x, y);
        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }
        let (row, col) = (row.floor() as usize, col.floor() as usize);
        (row < self.rows && col < self.cols).then_some((row, col))
    }
}
