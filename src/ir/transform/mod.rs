//! Passes that rewrite or combine Dynamics.
//!
//! # Submodules
//! - `namespace`: invertible flattening of `(identifier, namespace)` pairs
//! - `sub_comp_namer`: visitors that rename symbols inside a Dynamics
//! - `multi`: MultiDynamics composition

pub mod multi;
pub mod namespace;
pub mod sub_comp_namer;

pub use multi::{
    ComposeOptions, EventConnection, MultiDynamics, PortConnection, PortExposure,
    ReduceDimensionPolicy, SubDynamics, TransitionOrder,
};
pub use namespace::{append_namespace, make_regime_name, split_namespace};
pub use sub_comp_namer::{SubCompNamer, SymbolRenamer};
