//! Cell adjacency patterns

use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

/// √5, the length of a knight's-move step in cell units.
pub const SQRT_5: f64 = 2.236_067_977_499_79;

/// Orthogonal offsets as (row, col)
const ROOK: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Orthogonal and diagonal offsets
#[rustfmt::skip]
const QUEEN: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// Queen offsets plus the eight knight's moves
#[rustfmt::skip]
const KNIGHT: [(isize, isize); 16] = [
    (-2, -1), (-2, 1),
    (-1, -2), (-1, -1), (-1, 0), (-1, 1), (-1, 2),
    (0, -1),                              (0, 1),
    (1, -2),  (1, -1),  (1, 0),  (1, 1),  (1, 2),
    (2, -1),  (2, 1),
];

/// Grid adjacency used to connect cells in a travel graph.
///
/// The wider patterns approximate straight paths in continuous space more
/// closely: with `Knight16` headings are quantised to 22.5° steps instead of
/// 45°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Neighborhood {
    /// 4 orthogonal neighbors
    Rook4,
    /// 8 orthogonal and diagonal neighbors
    Queen8,
    /// 16 neighbors: orthogonal, diagonal and knight's-move
    #[default]
    Knight16,
}

impl Neighborhood {
    /// Relative (row, col) offsets, center excluded
    pub fn offsets(&self) -> &'static [(isize, isize)] {
        match self {
            Neighborhood::Rook4 => &ROOK,
            Neighborhood::Queen8 => &QUEEN,
            Neighborhood::Knight16 => &KNIGHT,
        }
    }

    /// Number of neighbors in the pattern
    pub fn len(&self) -> usize {
        self.offsets().len()
    }

    /// Whether the pattern has no neighbors
    pub fn is_empty(&self) -> bool {
        self.offsets().is_empty()
    }

    /// Distance between cell centers for an offset, in cell units
    pub fn step_length(dr: isize, dc: isize) -> f64 {
        match (dr.unsigned_abs(), dc.unsigned_abs()) {
            (0, 1) | (1, 0) => 1.0,
            (1, 1) => SQRT_2,
            (1, 2) | (2, 1) => SQRT_5,
            (r, c) => ((r * r + c * c) as f64).sqrt(),
        }
    }

    /// In-bounds neighbors of (row, col) as `(row, col, step_length)`
    pub fn neighbors(
        &self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.offsets().iter().filter_map(move |&(dr, dc)| {
            let nr = row.checked_add_signed(dr)?;
            let nc = col.checked_add_signed(dc)?;
            (nr < rows && nc < cols).then(|| (nr, nc, Self::step_length(dr, dc)))
        })
    }
}
