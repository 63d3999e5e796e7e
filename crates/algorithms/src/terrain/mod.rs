//! Terrain analysis algorithms
//!
//! - Slope: Horn (1981) finite-difference slope, used to locate cliffs

mod slope;

pub use slope::{slope, SlopeParams};
