//! Analog and event ports.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Dimension;
use crate::ir::expr::{BinaryOp, Expression};

/// Associative operator of an analog reduce port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReduceOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "*")]
    Mul,
}

impl ReduceOperator {
    /// Value of the reduction when nothing is connected.
    pub fn identity(self) -> Expression {
        match self {
            ReduceOperator::Add => Expression::Number(0.0),
            ReduceOperator::Mul => Expression::Number(1.0),
        }
    }

    pub fn binary_op(self) -> BinaryOp {
        match self {
            ReduceOperator::Add => BinaryOp::Add,
            ReduceOperator::Mul => BinaryOp::Mul,
        }
    }

    /// Left fold of `terms`, or the identity for an empty list.
    pub fn reduce(self, terms: impl IntoIterator<Item = Expression>) -> Expression {
        let mut terms = terms.into_iter();
        match terms.next() {
            Some(first) => terms.fold(first, |acc, term| {
                Expression::binary(self.binary_op(), acc, term)
            }),
            None => self.identity(),
        }
    }
}

impl fmt::Display for ReduceOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_op().symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalogMode {
    Send,
    Receive,
    Reduce(ReduceOperator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMode {
    Send,
    Receive,
}

/// Port direction, shared by analog and event ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Send,
    Receive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalogPort {
    pub name: String,
    pub mode: AnalogMode,
    #[serde(default)]
    pub dimension: Dimension,
}

impl AnalogPort {
    pub fn send(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            mode: AnalogMode::Send,
            dimension,
        }
    }

    pub fn receive(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            mode: AnalogMode::Receive,
            dimension,
        }
    }

    pub fn reduce(name: impl Into<String>, operator: ReduceOperator, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            mode: AnalogMode::Reduce(operator),
            dimension,
        }
    }

    pub fn direction(&self) -> Direction {
        match self.mode {
            AnalogMode::Send => Direction::Send,
            AnalogMode::Receive | AnalogMode::Reduce(_) => Direction::Receive,
        }
    }

    pub fn reduce_operator(&self) -> Option<ReduceOperator> {
        match self.mode {
            AnalogMode::Reduce(op) => Some(op),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPort {
    pub name: String,
    pub mode: EventMode,
}

impl EventPort {
    pub fn send(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: EventMode::Send,
        }
    }

    pub fn receive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: EventMode::Receive,
        }
    }

    pub fn direction(&self) -> Direction {
        match self.mode {
            EventMode::Send => Direction::Send,
            EventMode::Receive => Direction::Receive,
        }
    }
}

/// A borrowed view of either kind of port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortKind<'a> {
    Analog(&'a AnalogPort),
    Event(&'a EventPort),
}

impl PortKind<'_> {
    pub fn name(&self) -> &str {
        match self {
            PortKind::Analog(port) => &port.name,
            PortKind::Event(port) => &port.name,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            PortKind::Analog(port) => port.direction(),
            PortKind::Event(port) => port.direction(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            PortKind::Analog(port) => match port.mode {
                AnalogMode::Send => "analog send port",
                AnalogMode::Receive => "analog receive port",
                AnalogMode::Reduce(_) => "analog reduce port",
            },
            PortKind::Event(port) => match port.mode {
                EventMode::Send => "event send port",
                EventMode::Receive => "event receive port",
            },
        }
    }
}

/// Handle to a port of a named sub-component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortRef {
    pub component: String,
    pub port: String,
}

impl PortRef {
    pub fn new(component: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.port)
    }
}
