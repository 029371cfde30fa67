//! Sampler implementations.

#[macro_use]
extern crate log;

mod low_discrepancy;
mod random;
mod stratified;

// Re-export.
pub use low_discrepancy::*;
pub use random::*;
pub use stratified::*;
