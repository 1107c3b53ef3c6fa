//! Intermediate representation of NineML Dynamics.
//!
//! # Submodules
//! - `expr`: expressions, their parser and symbolic helpers
//! - `ast`: declarations, regimes, transitions and the Dynamics container
//! - `analysis`: binding and dimension checks
//! - `transform`: namespacing, renaming and MultiDynamics composition
//! - `visitor`: visitor traits shared by the passes
//! - `error`: error types of every stage

pub mod analysis;
pub mod ast;
pub mod error;
pub mod expr;
pub mod transform;
pub mod visitor;
