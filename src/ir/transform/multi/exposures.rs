//! Port exposures: sub-component ports made visible on the composite.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::sub_dynamics::SubDynamics;
use crate::ir::ast::{
    validate_declared_name, Alias, AnalogMode, AnalogPort, EventMode, EventPort, PortKind,
};
use crate::ir::error::ComposeError;
use crate::ir::expr::Expression;
use crate::ir::transform::namespace::{append_namespace, REDUCE_SUFFIX};

/// Exposes `sub_component.port` on the composite as `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortExposure {
    pub sub_component: String,
    pub port: String,
    /// Defaults to the namespaced port name, with a `__reduce` suffix for
    /// reduce ports.
    #[serde(default)]
    pub name: Option<String>,
}

impl PortExposure {
    pub fn new(sub_component: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            sub_component: sub_component.into(),
            port: port.into(),
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An exposure checked against its sub-component.
#[derive(Debug, Clone)]
pub(super) struct ResolvedExposure {
    /// Name of the composite port.
    pub name: String,
    /// Namespaced name of the exposed sub-component port.
    pub namespaced: String,
    pub kind: ExposedPort,
}

#[derive(Debug, Clone)]
pub(super) enum ExposedPort {
    Analog(AnalogPort),
    Event(EventPort),
}

/// All exposures of a MultiDynamics, indexed by namespaced port.
#[derive(Debug, Clone, Default)]
pub(super) struct Exposures {
    resolved: Vec<ResolvedExposure>,
    by_port: HashMap<String, usize>,
}

impl Exposures {
    pub fn resolve(
        component: &str,
        subs: &IndexMap<String, SubDynamics>,
        exposures: &[PortExposure],
    ) -> Result<Self, ComposeError> {
        let mut out = Exposures::default();
        let mut names = HashSet::new();

        for exposure in exposures {
            let display = exposure
                .name
                .clone()
                .unwrap_or_else(|| format!("{}.{}", exposure.sub_component, exposure.port));
            let invalid = |reason: String| ComposeError::InvalidExposure {
                name: display.clone(),
                reason,
            };

            let sub = subs.get(&exposure.sub_component).ok_or_else(|| {
                invalid(format!("unknown sub-component '{}'", exposure.sub_component))
            })?;
            let port = sub.component().port(&exposure.port).ok_or_else(|| {
                invalid(format!(
                    "sub-component '{}' has no port '{}'",
                    exposure.sub_component, exposure.port
                ))
            })?;
            let namespaced = sub.namespaced(&exposure.port);
            let is_reduce = matches!(port, PortKind::Analog(p) if p.reduce_operator().is_some());
            let name = match &exposure.name {
                Some(name) => name.clone(),
                None => default_exposure_name(&exposure.sub_component, &exposure.port, is_reduce),
            };
            validate_declared_name(component, &name)?;

            if is_reduce && name == namespaced {
                return Err(invalid(
                    "a reduce port cannot be exposed under its namespaced name".to_string(),
                ));
            }
            if out.by_port.contains_key(&namespaced) {
                return Err(invalid("port is already exposed".to_string()));
            }
            if !names.insert(name.clone()) {
                return Err(ComposeError::DuplicateName {
                    component: component.to_string(),
                    scope: "port exposures",
                    name,
                });
            }

            let kind = match port {
                PortKind::Analog(p) => ExposedPort::Analog(AnalogPort {
                    name: name.clone(),
                    mode: p.mode,
                    dimension: p.dimension.clone(),
                }),
                PortKind::Event(p) => ExposedPort::Event(EventPort {
                    name: name.clone(),
                    mode: p.mode,
                }),
            };
            out.by_port.insert(namespaced.clone(), out.resolved.len());
            out.resolved.push(ResolvedExposure {
                name,
                namespaced,
                kind,
            });
        }
        Ok(out)
    }

    pub fn get(&self, namespaced_port: &str) -> Option<&ResolvedExposure> {
        self.by_port.get(namespaced_port).map(|&i| &self.resolved[i])
    }

    /// Composite name of an exposed event send port.
    pub fn event_send_name(&self, namespaced_port: &str) -> Option<&str> {
        self.get(namespaced_port).and_then(|e| match &e.kind {
            ExposedPort::Event(p) if p.mode == EventMode::Send => Some(e.name.as_str()),
            _ => None,
        })
    }

    /// Composite name of an exposed event receive port.
    pub fn event_receive_name(&self, namespaced_port: &str) -> Option<&str> {
        self.get(namespaced_port).and_then(|e| match &e.kind {
            ExposedPort::Event(p) if p.mode == EventMode::Receive => Some(e.name.as_str()),
            _ => None,
        })
    }

    pub fn analog_ports(&self) -> impl Iterator<Item = &AnalogPort> {
        self.resolved.iter().filter_map(|e| match &e.kind {
            ExposedPort::Analog(p) => Some(p),
            ExposedPort::Event(_) => None,
        })
    }

    pub fn event_ports(&self) -> impl Iterator<Item = &EventPort> {
        self.resolved.iter().filter_map(|e| match &e.kind {
            ExposedPort::Event(p) => Some(p),
            ExposedPort::Analog(_) => None,
        })
    }

    /// Aliases bridging exposed analog send and receive ports to the
    /// namespaced symbols. Reduce ports are handled with their senders.
    pub fn aliases(&self) -> Vec<Alias> {
        self.resolved
            .iter()
            .filter(|e| e.name != e.namespaced)
            .filter_map(|e| match &e.kind {
                ExposedPort::Analog(p) if p.mode == AnalogMode::Send => Some(Alias::new(
                    e.name.clone(),
                    Expression::symbol(e.namespaced.clone()),
                )),
                ExposedPort::Analog(p) if p.mode == AnalogMode::Receive => Some(Alias::new(
                    e.namespaced.clone(),
                    Expression::symbol(e.name.clone()),
                )),
                _ => None,
            })
            .collect()
    }
}

/// Default composite name of an exposed port.
pub fn default_exposure_name(sub_component: &str, port: &str, reduce: bool) -> String {
    let namespaced = append_namespace(port, sub_component);
    if reduce {
        format!("{namespaced}{REDUCE_SUFFIX}")
    } else {
        namespaced
    }
}
