//! Path results

use geo::LineString;
use terrawalk_core::{AttributeValue, Feature, CRS};

/// A least-cost route between two cells
#[derive(Debug, Clone)]
pub struct Path {
    /// Visited cells from origin to destination, both included
    pub cells: Vec<(usize, usize)>,
    /// Total traversal time in seconds
    pub travel_time: f64,
    coordinates: Vec<(f64, f64)>,
    crs: Option<CRS>,
}

impl Path {
    pub(crate) fn new(
        cells: Vec<(usize, usize)>,
        travel_time: f64,
        coordinates: Vec<(f64, f64)>,
        crs: Option<CRS>,
    ) -> Self {
        Self {
            cells,
            travel_time,
            coordinates,
            crs,
        }
    }

    pub fn origin(&self) -> Option<(usize, usize)> {
        self.cells.first().copied()
    }

    pub fn destination(&self) -> Option<(usize, usize)> {
        self.cells.last().copied()
    }

    /// Number of edges traversed
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Cell centers in world coordinates
    pub fn coordinates(&self) -> &[(f64, f64)] {
        &self.coordinates
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// Length along cell centers in ground units
    pub fn length(&self) -> f64 {
        self.coordinates
            .windows(2)
            .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
            .sum()
    }

    /// LineString feature with `travel_time_s` and `length` attributes.
    ///
    /// A path that never leaves its origin becomes a two-vertex line on the
    /// same point so the geometry stays a valid LineString.
    pub fn to_feature(&self) -> Feature {
        let mut coords = self.coordinates.clone();
        if coords.len() == 1 {
            coords.push(coords[0]);
        }

        let mut feature = Feature::new(LineString::from(coords));
        feature.set_property("travel_time_s", AttributeValue::Float(self.travel_time));
        feature.set_property("length", AttributeValue::Float(self.length()));
        feature
    }
}
