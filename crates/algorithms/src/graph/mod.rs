//! Travel graph construction
//!
//! Turns congruent cost and barrier layers into a directed graph whose
//! edge weights are traversal times in seconds.

mod builder;
mod csr;

pub use builder::{CostLayers, GraphBuilder, GraphParams};
pub use csr::{GraphSummary, TravelGraph};
