//! Statistics over loaded sample sequences.
//!
//! Plain aggregates live in `aggregator`; the kernel density estimator
//! used by the density chart lives in `density`.

pub mod aggregator;
pub mod density;

pub use aggregator::*;
pub use density::{KernelDensity, DEFAULT_GRID_POINTS};
