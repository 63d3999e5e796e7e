//! Least-cost path queries on a built travel graph

mod route;
mod solver;

pub use route::Path;
pub use solver::{solve, solve_coords, solve_many, travel_time_surface, SolverParams};
