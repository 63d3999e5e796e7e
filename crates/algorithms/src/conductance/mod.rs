//! Walking conductance
//!
//! A calibrated biomechanical speed model and its combination with
//! directional slope, vegetation density and surface roughness into a
//! per-edge speed.

mod edge;
mod speed;

pub use edge::{edge_conductance, slope_angle, CellSample, Conductance};
pub use speed::{LorentzianSpeed, SpeedModel};
