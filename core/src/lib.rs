//! Core

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate log;

// Re-export.
pub mod blocked_array;
pub mod camera;
pub mod common;
pub mod error;
pub mod film;
pub mod geometry;
pub mod integrator;
pub mod low_discrepancy;
pub mod mipmap;
pub mod rng;
pub mod sampler;
pub mod sampling;
pub mod spectrum;
