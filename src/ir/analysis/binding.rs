//! Resolve transition targets and check port and variable references.
//!
//! Binding is the second phase of building a Dynamics. It turns every
//! regime name a transition targets into a `RegimeId`, and checks that
//! output events, `OnEvent` ports and assigned variables refer to
//! declarations of the right kind. It is all-or-nothing: the first problem
//! found is returned and nothing is bound.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::ir::ast::{
    AnalogMode, BoundDynamics, Dynamics, EventMode, Regime, RegimeId, Transition,
};
use crate::ir::error::BindError;

impl Dynamics {
    /// Resolve regime references and check port and variable references.
    pub fn bind(self) -> Result<BoundDynamics, BindError> {
        self.check_references()?;

        let names: Vec<String> = self.regimes().map(|r| r.name.clone()).collect();
        let component = self.name().to_string();
        let mut unresolved = None;
        let bound = self.into_regimes(|regimes| {
            regimes
                .into_iter()
                .enumerate()
                .map(|(index, (name, regime))| {
                    let regime = regime.map_targets(|target| match target {
                        None => RegimeId(index),
                        Some(target) => match names.iter().position(|n| *n == target) {
                            Some(id) => RegimeId(id),
                            None => {
                                unresolved.get_or_insert_with(|| BindError::UnresolvedRegime {
                                    component: component.clone(),
                                    regime: name.clone(),
                                    target,
                                });
                                RegimeId(index)
                            }
                        },
                    });
                    (name, regime)
                })
                .collect::<IndexMap<_, _>>()
        });
        if let Some(err) = unresolved {
            return Err(err);
        }
        log::debug!(
            "bound '{}' with {} regime(s)",
            bound.name(),
            bound.num_regimes()
        );
        Ok(bound)
    }

    fn check_references(&self) -> Result<(), BindError> {
        let component = self.name();

        for port in self.analog_ports_with_mode(|m| *m == AnalogMode::Send) {
            if self.alias(&port.name).is_none() && self.state_variable(&port.name).is_none() {
                return Err(BindError::UnboundPort {
                    component: component.to_string(),
                    context: "analog send port".to_string(),
                    port: port.name.clone(),
                    expected: "an alias or state variable",
                });
            }
        }

        for regime in self.regimes() {
            self.check_regime(regime)?;
        }
        Ok(())
    }

    fn check_regime(&self, regime: &Regime) -> Result<(), BindError> {
        let component = self.name();

        for derivative in regime.time_derivatives.values() {
            if self.state_variable(&derivative.variable).is_none() {
                return Err(BindError::UnknownVariable {
                    component: component.to_string(),
                    context: format!("time derivative in regime '{}'", regime.name),
                    variable: derivative.variable.clone(),
                });
            }
        }

        let mut on_event_ports = HashSet::new();
        for transition in &regime.transitions {
            let context = format!("{} in regime '{}'", transition.describe(), regime.name);

            if let Transition::OnEvent(on_event) = transition {
                let port = &on_event.src_port_name;
                if self.event_port(port).map(|p| p.mode) != Some(EventMode::Receive) {
                    return Err(BindError::UnboundPort {
                        component: component.to_string(),
                        context,
                        port: port.clone(),
                        expected: "an event receive port",
                    });
                }
                if !on_event_ports.insert(port.as_str()) {
                    return Err(BindError::DuplicateName {
                        component: component.to_string(),
                        regime: regime.name.clone(),
                        what: "OnEvent for port",
                        name: port.clone(),
                    });
                }
            }

            for event in transition.output_events() {
                if self.event_port(&event.port_name).map(|p| p.mode) != Some(EventMode::Send) {
                    return Err(BindError::UnboundPort {
                        component: component.to_string(),
                        context: context.clone(),
                        port: event.port_name.clone(),
                        expected: "an event send port",
                    });
                }
            }

            for assignment in transition.state_assignments() {
                if self.state_variable(&assignment.variable).is_none() {
                    return Err(BindError::UnknownVariable {
                        component: component.to_string(),
                        context: context.clone(),
                        variable: assignment.variable.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl BoundDynamics {
    /// Already bound: returns itself unchanged.
    pub fn bind(self) -> Result<BoundDynamics, BindError> {
        Ok(self)
    }
}
