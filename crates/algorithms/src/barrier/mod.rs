//! Barrier rasterization
//!
//! Produces binary passability masks on the elevation grid: `1` is
//! passable, `0` is impassable.
//! - Cliffs: cells whose Horn slope reaches a threshold angle
//! - Water: cells whose center falls inside a waterbody polygon, taken from
//!   a supplied dataset or queried from a hydrography source

mod cliff;
mod water;

pub use cliff::{cliff_barrier, CliffParams};
pub use water::{
    hydrography_query_extent, rasterize_polygons, water_barrier, HydrographySource, WaterParams,
    WaterSource,
};

/// Mask value for passable cells
pub const PASSABLE: u8 = 1;
/// Mask value for impassable cells
pub const IMPASSABLE: u8 = 0;
