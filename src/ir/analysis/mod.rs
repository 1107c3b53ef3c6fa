//! Checks over Dynamics declarations.
//!
//! - `binding`: `Dynamics::bind`, resolving regime references
//! - `dimensions`: the `DimensionChecker` seam used by port connections

pub mod binding;
pub mod dimensions;

pub use dimensions::{DimensionChecker, SiDimensions};
