//! # terrawalk parallel
//!
//! Execution strategies for the embarrassingly parallel parts of terrawalk:
//! building graph rows and answering independent path queries.
//!
//! A [`ProcessingMode`] is passed explicitly to each call; a dedicated pool
//! for [`ProcessingMode::ParallelWith`] lives only for that call.

pub mod strategy;

pub use strategy::{num_cpus, ParallelStrategy, ProcessingMode};
