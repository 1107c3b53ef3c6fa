//! NineML hybrid dynamics: component classes with regimes, transitions and
//! ports, plus composition of several classes into one.

use std::sync::Once;

pub mod ir;

pub use ir::ast::{BoundDynamics, Dynamics, DynamicsBuilder};
pub use ir::error::{BindError, ComposeError, ConnectionError, ModelError, ParseError};
pub use ir::expr::Expression;
pub use ir::transform::{
    append_namespace, make_regime_name, split_namespace, ComposeOptions, MultiDynamics,
    PortConnection, PortExposure,
};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::init();
    });
}
