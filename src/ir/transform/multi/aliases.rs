//! Aliases generated from analog port connections.

use indexmap::IndexMap;

use super::exposures::Exposures;
use super::sub_dynamics::SubDynamics;
use crate::ir::ast::{Alias, AnalogMode, PortRef};
use crate::ir::error::ComposeError;
use crate::ir::expr::Expression;

/// Aliases for every direct connection and every reduce port.
///
/// A direct connection becomes `receiver := sender`. A reduce port becomes
/// `port := op.reduce(terms)` where the terms are the exposure symbol (if
/// the port is exposed) followed by the senders in connection order; with
/// no terms the port is bound to the operator identity.
pub(super) fn connection_aliases(
    component: &str,
    subs: &IndexMap<String, SubDynamics>,
    exposures: &Exposures,
    analog_connections: &IndexMap<PortRef, PortRef>,
    reduce_connections: &IndexMap<PortRef, Vec<PortRef>>,
) -> Result<Vec<Alias>, ComposeError> {
    let namespaced = |port: &PortRef| match subs.get(&port.component) {
        Some(sub) => sub.namespaced(&port.port),
        None => port.port.clone(),
    };
    let mut aliases = Vec::new();

    for (receiver, sender) in analog_connections {
        let receive = namespaced(receiver);
        if exposures.get(&receive).is_some() {
            return Err(ComposeError::InvalidPortConnection {
                component: component.to_string(),
                receiver: receiver.to_string(),
                reason: "receive port is both exposed and driven by a connection".to_string(),
            });
        }
        aliases.push(Alias::new(receive, Expression::symbol(namespaced(sender))));
    }

    for sub in subs.values() {
        for port in sub.component().analog_ports() {
            let AnalogMode::Reduce(operator) = port.mode else {
                continue;
            };
            let reduce = sub.namespaced(&port.name);
            let exposed = exposures
                .get(&reduce)
                .map(|e| Expression::symbol(e.name.clone()));
            let senders = reduce_connections
                .get(&PortRef::new(sub.name(), port.name.clone()))
                .into_iter()
                .flatten()
                .map(|sender| Expression::symbol(namespaced(sender)));
            let rhs = operator.reduce(exposed.into_iter().chain(senders));
            log::debug!("reduce port '{reduce}' of '{component}' := {rhs}");
            aliases.push(Alias::new(reduce, rhs));
        }
    }
    Ok(aliases)
}

/// Log receive ports that nothing drives.
pub(super) fn warn_unconnected(
    component: &str,
    subs: &IndexMap<String, SubDynamics>,
    exposures: &Exposures,
    analog_connections: &IndexMap<PortRef, PortRef>,
) {
    for sub in subs.values() {
        for port in sub.component().analog_ports_with_mode(|m| *m == AnalogMode::Receive) {
            let connected =
                analog_connections.contains_key(&PortRef::new(sub.name(), port.name.clone()));
            if !connected && exposures.get(&sub.namespaced(&port.name)).is_none() {
                log::warn!(
                    "analog receive port '{}.{}' of '{component}' is neither connected nor exposed",
                    sub.name(),
                    port.name
                );
            }
        }
    }
}
