//! Declarations making up a Dynamics component class.
//!
//! # Submodules
//! - `dimension`: SI dimensions attached to ports and declarations
//! - `port`: analog and event ports, reduce operators, port handles
//! - `declaration`: parameters, state variables, constants, aliases, ODEs
//! - `transition`: triggers, state assignments, output events, transitions
//! - `dynamics`: regimes, the Dynamics container and its builder

mod declaration;
mod dimension;
mod dynamics;
pub(crate) mod named;
mod port;
mod transition;

pub use declaration::{Alias, Constant, Parameter, StateVariable, TimeDerivative};
pub use dimension::{Dimension, Exponents};
pub use dynamics::{BoundDynamics, Dynamics, DynamicsBuilder, Regime, TransitionTarget};
pub use named::Named;
pub use port::{
    AnalogMode, AnalogPort, Direction, EventMode, EventPort, PortKind, PortRef, ReduceOperator,
};
pub use transition::{
    OnCondition, OnEvent, OutputEvent, RegimeId, RegimeTarget, StateAssignment, Transition,
    TransitionBody, Trigger,
};

use crate::ir::error::ModelError;
use crate::ir::expr::{BUILTIN_FUNCTIONS, TIME_VARIABLE};

/// Check `[A-Za-z][A-Za-z0-9_]*` with no trailing underscore.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.ends_with('_')
}

pub fn is_reserved(name: &str) -> bool {
    name == TIME_VARIABLE || name == "true" || name == "false" || BUILTIN_FUNCTIONS.contains(&name)
}

pub fn validate_identifier(name: &str) -> Result<(), ModelError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(ModelError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// A name declared inside `component`: a valid identifier that is not
/// reserved.
pub fn validate_declared_name(component: &str, name: &str) -> Result<(), ModelError> {
    validate_identifier(name)?;
    if is_reserved(name) {
        return Err(ModelError::ReservedName {
            component: component.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
