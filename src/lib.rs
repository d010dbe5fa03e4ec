//! Weekly timetable generation for academic batches.
//!
//! A small evolutionary search over complete candidate timetables: candidates are
//! built by a preference-aware random generator, ranked by an additive penalty score,
//! and improved by elitism plus slot mutation for a fixed number of generations.

pub mod config;
pub mod data;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod generator;
pub mod index;
pub mod mutation;
pub mod problem;
pub mod server;
pub mod solver;
