//! Port connections between sub-components and their validation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::options::ReduceDimensionPolicy;
use super::sub_dynamics::SubDynamics;
use crate::ir::analysis::DimensionChecker;
use crate::ir::ast::{AnalogMode, AnalogPort, EventMode, PortKind, PortRef};
use crate::ir::error::ConnectionError;
use crate::ir::expr::Expression;

/// A wire from a sender port to a receiver port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PortConnection {
    /// Analog send port to a single analog receive port.
    AnalogDirect { sender: PortRef, receiver: PortRef },
    /// Analog send port into an analog reduce port.
    AnalogReduce { sender: PortRef, receiver: PortRef },
    /// Event send port to an event receive port.
    Event {
        sender: PortRef,
        receiver: PortRef,
        #[serde(default = "zero_delay")]
        delay: Expression,
    },
}

fn zero_delay() -> Expression {
    Expression::Number(0.0)
}

impl PortConnection {
    pub fn analog(sender: PortRef, receiver: PortRef) -> Self {
        PortConnection::AnalogDirect { sender, receiver }
    }

    pub fn reduce(sender: PortRef, receiver: PortRef) -> Self {
        PortConnection::AnalogReduce { sender, receiver }
    }

    pub fn event(sender: PortRef, receiver: PortRef) -> Self {
        PortConnection::Event {
            sender,
            receiver,
            delay: zero_delay(),
        }
    }

    pub fn with_delay(self, delay: Expression) -> Self {
        match self {
            PortConnection::Event {
                sender, receiver, ..
            } => PortConnection::Event {
                sender,
                receiver,
                delay,
            },
            other => other,
        }
    }

    pub fn sender(&self) -> &PortRef {
        match self {
            PortConnection::AnalogDirect { sender, .. }
            | PortConnection::AnalogReduce { sender, .. }
            | PortConnection::Event { sender, .. } => sender,
        }
    }

    pub fn receiver(&self) -> &PortRef {
        match self {
            PortConnection::AnalogDirect { receiver, .. }
            | PortConnection::AnalogReduce { receiver, .. }
            | PortConnection::Event { receiver, .. } => receiver,
        }
    }

    fn invalid(&self, reason: String) -> ConnectionError {
        ConnectionError::InvalidPortConnection {
            sender: self.sender().to_string(),
            receiver: self.receiver().to_string(),
            reason,
        }
    }

    /// Check that both ends exist, have the right kind and mode, and that
    /// analog ends have compatible dimensions.
    pub(super) fn validate(
        &self,
        subs: &IndexMap<String, SubDynamics>,
        checker: &dyn DimensionChecker,
        reduce_policy: ReduceDimensionPolicy,
    ) -> Result<(), ConnectionError> {
        let send = lookup(subs, self.sender())?;
        let receive = lookup(subs, self.receiver())?;

        let expect = |port: PortKind<'_>, ok: bool, wanted: &str| {
            if ok {
                Ok(())
            } else {
                Err(self.invalid(format!("expected {wanted}, found {}", port.describe())))
            }
        };

        match self {
            PortConnection::AnalogDirect { .. } | PortConnection::AnalogReduce { .. } => {
                let sender = match send {
                    PortKind::Analog(port) if port.mode == AnalogMode::Send => port,
                    other => return expect(other, false, "an analog send port"),
                };
                let reduce = matches!(self, PortConnection::AnalogReduce { .. });
                let receiver = match receive {
                    PortKind::Analog(port) if !reduce && port.mode == AnalogMode::Receive => port,
                    PortKind::Analog(port) if reduce && port.reduce_operator().is_some() => port,
                    other if reduce => return expect(other, false, "an analog reduce port"),
                    other => return expect(other, false, "an analog receive port"),
                };
                let check = !reduce || reduce_policy == ReduceDimensionPolicy::AgainstPort;
                if check && !checker.dimensions_match(sender, receiver) {
                    return Err(self.dimension_mismatch(sender, receiver));
                }
                Ok(())
            }
            PortConnection::Event { .. } => {
                let is_event = |port: PortKind<'_>, mode| {
                    matches!(port, PortKind::Event(p) if p.mode == mode)
                };
                expect(send, is_event(send, EventMode::Send), "an event send port")?;
                expect(receive, is_event(receive, EventMode::Receive), "an event receive port")
            }
        }
    }

    pub(super) fn dimension_mismatch(&self, send: &AnalogPort, receive: &AnalogPort) -> ConnectionError {
        ConnectionError::DimensionMismatch {
            sender: self.sender().to_string(),
            send_dimension: send.dimension.to_string(),
            receiver: self.receiver().to_string(),
            receive_dimension: receive.dimension.to_string(),
        }
    }
}

pub(super) fn lookup<'a>(
    subs: &'a IndexMap<String, SubDynamics>,
    port: &PortRef,
) -> Result<PortKind<'a>, ConnectionError> {
    let sub = subs
        .get(&port.component)
        .ok_or_else(|| ConnectionError::UnknownSubComponent {
            name: port.component.clone(),
        })?;
    sub.component()
        .port(&port.port)
        .ok_or_else(|| ConnectionError::UnknownPort {
            component: port.component.clone(),
            port: port.port.clone(),
        })
}

/// An event connection as stored per receive port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConnection {
    pub sender: PortRef,
    pub delay: Expression,
}
