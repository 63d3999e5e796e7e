//! Error types for terrawalk

use thiserror::Error;

/// Main error type for terrawalk operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// A layer is not spatially congruent with the reference grid.
    #[error("Layer '{layer}' is not congruent with the reference grid: {property} differs (expected {expected}, got {actual})")]
    InputMismatch {
        layer: String,
        property: &'static str,
        expected: String,
        actual: String,
    },

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    /// No barrier polygons were supplied and retrieving them failed.
    #[error("Barrier source error: {0}")]
    BarrierSource(String),

    /// Origin and destination are not connected in the travel graph.
    #[error("No path from ({}, {}) to ({}, {})", origin.0, origin.1, destination.0, destination.1)]
    NoPath {
        origin: (usize, usize),
        destination: (usize, usize),
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error only concerns a single path query.
    pub fn is_no_path(&self) -> bool {
        matches!(self, Error::NoPath { .. })
    }
}

/// Result type alias for terrawalk operations
pub type Result<T> = std::result::Result<T, Error>;
