//! # terrawalk core
//!
//! Core types and I/O shared by the terrawalk crates.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced grid used for every cost and barrier layer
//! - `GeoTransform`: affine transformation for georeferencing
//! - `CRS`: coordinate reference system identity and WGS84/UTM reprojection
//! - `Feature` / `FeatureCollection`: vector barriers and path geometries
//! - GeoTIFF and GeoJSON I/O

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use vector::{AttributeValue, BoundingBox, Feature, FeatureCollection};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Neighborhood, Raster, RasterElement};
    pub use crate::vector::{BoundingBox, Feature, FeatureCollection};
}
