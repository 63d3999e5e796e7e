//! # terrawalk algorithms
//!
//! Pedestrian travel-time analysis over raster cost surfaces.
//!
//! ## Pipeline
//!
//! - **barrier**: cliff masks from slope thresholding, water masks from
//!   polygon rasterization
//! - **conductance**: calibrated walking speed from slope, vegetation
//!   density and surface roughness
//! - **graph**: directed 16-neighbor travel graph with traversal-time weights
//! - **path**: least-cost routes and travel-time surfaces
//! - **terrain**: slope, used by the cliff mask

pub mod barrier;
pub mod conductance;
pub mod graph;
pub mod path;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::barrier::{
        cliff_barrier, water_barrier, CliffParams, HydrographySource, WaterParams, WaterSource,
    };
    pub use crate::conductance::{LorentzianSpeed, SpeedModel};
    pub use crate::graph::{CostLayers, GraphBuilder, GraphParams, GraphSummary, TravelGraph};
    pub use crate::path::{solve, solve_coords, solve_many, travel_time_surface, Path, SolverParams};
    pub use terrawalk_core::prelude::*;
    pub use terrawalk_parallel::ProcessingMode;
}
