//! Named declarations of a Dynamics: parameters, state variables,
//! constants, aliases and time derivatives.

use serde::{Deserialize, Serialize};

use super::named::Named;
use super::transition::split_equation;
use super::Dimension;
use crate::ir::error::ParseError;
use crate::ir::expr::Expression;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub dimension: Dimension,
}

impl Parameter {
    pub fn new(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            dimension,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVariable {
    pub name: String,
    #[serde(default)]
    pub dimension: Dimension,
}

impl StateVariable {
    pub fn new(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            dimension,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub dimension: Dimension,
}

impl Constant {
    pub fn new(name: impl Into<String>, value: f64, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            value,
            dimension,
        }
    }
}

/// A named expression, `name := rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    pub rhs: Expression,
}

impl Alias {
    pub fn new(name: impl Into<String>, rhs: Expression) -> Self {
        Self {
            name: name.into(),
            rhs,
        }
    }

    /// Parse `"name := rhs"`.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let (name, rhs) = split_equation(source, ":=")?;
        Ok(Self::new(name, rhs.parse()?))
    }
}

/// `d(variable)/dt = rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeDerivative {
    pub variable: String,
    pub rhs: Expression,
}

impl TimeDerivative {
    pub fn new(variable: impl Into<String>, rhs: Expression) -> Self {
        Self {
            variable: variable.into(),
            rhs,
        }
    }

    /// Parse `"dv/dt = (i * R - v) / tau"`.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let Some(pos) = source.find('=') else {
            return Err(ParseError::new(
                "expected '='",
                source.len()..source.len(),
                source,
            ));
        };
        let head: String = source[..pos].chars().filter(|c| !c.is_whitespace()).collect();
        let variable = head
            .strip_prefix('d')
            .and_then(|rest| rest.strip_suffix("/dt"))
            .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
            .ok_or_else(|| ParseError::new("expected 'dX/dt' on the left-hand side", 0..pos, source))?;
        Ok(Self::new(variable, source[pos + 1..].parse()?))
    }
}

macro_rules! impl_named {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl Named for $ty {
                fn name(&self) -> &str {
                    &self.$field
                }

                fn set_name(&mut self, name: String) {
                    self.$field = name;
                }
            }
        )*
    };
}

impl_named!(
    Parameter => name,
    StateVariable => name,
    Constant => name,
    Alias => name,
    TimeDerivative => variable,
    super::StateAssignment => variable,
    super::OutputEvent => port_name,
    super::AnalogPort => name,
    super::EventPort => name,
);
