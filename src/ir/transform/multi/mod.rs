//! MultiDynamics: composition of several Dynamics into one.
//!
//! Each sub-component is wrapped in a namespaced view, the product of the
//! sub-component regime sets becomes the composite regime set, event
//! cascades are resolved per composite transition and analog connections
//! become aliases. The result is one ordinary `Dynamics`.
//!
//! # Submodules
//! - `sub_dynamics`: namespaced read-only view of a bound sub-component
//! - `exposures`: sub-component ports made visible on the composite
//! - `connections`: port wiring and its validation
//! - `aliases`: aliases generated from analog connections
//! - `cascade`: breadth-first event cascade resolution
//! - `regimes`: the regime product
//! - `options`: composition policies
//!
//! # Example
//! ```ignore
//! let composite = MultiDynamics::compose(
//!     "Network",
//!     [("cell", cell), ("syn", synapse)],
//!     vec![PortExposure::new("cell", "spike")],
//!     vec![PortConnection::analog(
//!         PortRef::new("syn", "i"),
//!         PortRef::new("cell", "i_syn"),
//!     )],
//!     &ComposeOptions::default(),
//! )?;
//! ```

mod aliases;
mod cascade;
mod connections;
mod exposures;
mod options;
mod regimes;
mod sub_dynamics;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use indexmap::IndexMap;

pub use connections::{EventConnection, PortConnection};
pub use exposures::{default_exposure_name, PortExposure};
pub use options::{ComposeOptions, ReduceDimensionPolicy, TransitionOrder};
pub use sub_dynamics::{SubDynamics, DEFAULT_REGIME};

use crate::ir::analysis::{DimensionChecker, SiDimensions};
use crate::ir::ast::{validate_identifier, AnalogPort, BoundDynamics, Dynamics, PortKind, PortRef};
use crate::ir::error::{ComposeError, ConnectionError};
use cascade::{CascadeContext, EventRoutes};
use exposures::Exposures;
use regimes::RegimeProduct;

/// A composite component class built from named sub-components.
#[derive(Debug, Clone)]
pub struct MultiDynamics {
    name: String,
    sub_components: IndexMap<String, SubDynamics>,
    port_exposures: Vec<PortExposure>,
    analog_connections: IndexMap<PortRef, PortRef>,
    reduce_connections: IndexMap<PortRef, Vec<PortRef>>,
    event_connections: IndexMap<PortRef, Vec<EventConnection>>,
    options: ComposeOptions,
    dynamics: Dynamics,
}

impl MultiDynamics {
    /// Compose with SI dimension checking.
    pub fn new<N, C>(
        name: impl Into<String>,
        sub_components: impl IntoIterator<Item = (N, C)>,
        exposures: Vec<PortExposure>,
        connections: Vec<PortConnection>,
        options: &ComposeOptions,
    ) -> Result<Self, ComposeError>
    where
        N: Into<String>,
        C: Into<Arc<BoundDynamics>>,
    {
        Self::with_checker(
            name,
            sub_components,
            exposures,
            connections,
            options,
            &SiDimensions,
        )
    }

    /// Compose, checking analog connections with `checker`.
    pub fn with_checker<N, C>(
        name: impl Into<String>,
        sub_components: impl IntoIterator<Item = (N, C)>,
        exposures: Vec<PortExposure>,
        connections: Vec<PortConnection>,
        options: &ComposeOptions,
        checker: &dyn DimensionChecker,
    ) -> Result<Self, ComposeError>
    where
        N: Into<String>,
        C: Into<Arc<BoundDynamics>>,
    {
        let name = name.into();
        validate_identifier(&name)?;

        let mut subs: IndexMap<String, SubDynamics> = IndexMap::new();
        for (sub_name, component) in sub_components {
            let sub_name = sub_name.into();
            validate_identifier(&sub_name)?;
            if subs.contains_key(&sub_name) {
                return Err(ComposeError::DuplicateName {
                    component: name,
                    scope: "sub-components",
                    name: sub_name,
                });
            }
            let view = SubDynamics::new(sub_name.clone(), component.into());
            subs.insert(sub_name, view);
        }
        subs.sort_keys();

        let resolved = Exposures::resolve(&name, &subs, &exposures)?;

        let mut analog_connections: IndexMap<PortRef, PortRef> = IndexMap::new();
        let mut reduce_connections: IndexMap<PortRef, Vec<PortRef>> = IndexMap::new();
        let mut event_connections: IndexMap<PortRef, Vec<EventConnection>> = IndexMap::new();
        for connection in &connections {
            connection.validate(&subs, checker, options.reduce_dimensions)?;
            match connection {
                PortConnection::AnalogDirect { sender, receiver } => {
                    if let Some(existing) = analog_connections.get(receiver) {
                        return Err(ConnectionError::InvalidPortConnection {
                            sender: sender.to_string(),
                            receiver: receiver.to_string(),
                            reason: format!("receive port is already driven by '{existing}'"),
                        }
                        .into());
                    }
                    analog_connections.insert(receiver.clone(), sender.clone());
                }
                PortConnection::AnalogReduce { sender, receiver } => {
                    reduce_connections
                        .entry(receiver.clone())
                        .or_default()
                        .push(sender.clone());
                }
                PortConnection::Event {
                    sender,
                    receiver,
                    delay,
                } => {
                    event_connections
                        .entry(receiver.clone())
                        .or_default()
                        .push(EventConnection {
                            sender: sender.clone(),
                            delay: delay.clone(),
                        });
                }
            }
        }
        if options.reduce_dimensions == ReduceDimensionPolicy::PairwiseSenders {
            check_pairwise_senders(&subs, &reduce_connections, checker)?;
        }
        aliases::warn_unconnected(&name, &subs, &resolved, &analog_connections);

        let dynamics = assemble(
            &name,
            &subs,
            &resolved,
            &analog_connections,
            &reduce_connections,
            &event_connections,
            options,
        )?;
        log::info!(
            "composed '{name}' from {} sub-components into {} regimes",
            subs.len(),
            dynamics.num_regimes()
        );

        Ok(Self {
            name,
            sub_components: subs,
            port_exposures: exposures,
            analog_connections,
            reduce_connections,
            event_connections,
            options: options.clone(),
            dynamics,
        })
    }

    /// Build and return only the composite Dynamics.
    pub fn compose<N, C>(
        name: impl Into<String>,
        sub_components: impl IntoIterator<Item = (N, C)>,
        exposures: Vec<PortExposure>,
        connections: Vec<PortConnection>,
        options: &ComposeOptions,
    ) -> Result<Dynamics, ComposeError>
    where
        N: Into<String>,
        C: Into<Arc<BoundDynamics>>,
    {
        Self::new(name, sub_components, exposures, connections, options).map(Self::into_dynamics)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sub-component views, sorted by name.
    pub fn sub_components(&self) -> impl Iterator<Item = &SubDynamics> {
        self.sub_components.values()
    }

    pub fn sub_component(&self, name: &str) -> Option<&SubDynamics> {
        self.sub_components.get(name)
    }

    pub fn port_exposures(&self) -> &[PortExposure] {
        &self.port_exposures
    }

    /// Direct analog connections, receiver to sender.
    pub fn analog_connections(&self) -> &IndexMap<PortRef, PortRef> {
        &self.analog_connections
    }

    /// Senders of each connected reduce port.
    pub fn reduce_connections(&self) -> &IndexMap<PortRef, Vec<PortRef>> {
        &self.reduce_connections
    }

    /// Incoming event connections of each receive port.
    pub fn event_connections(&self) -> &IndexMap<PortRef, Vec<EventConnection>> {
        &self.event_connections
    }

    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// The composite Dynamics.
    pub fn dynamics(&self) -> &Dynamics {
        &self.dynamics
    }

    pub fn into_dynamics(self) -> Dynamics {
        self.dynamics
    }
}

/// Every sender into a reduce port must match the first one.
fn check_pairwise_senders(
    subs: &IndexMap<String, SubDynamics>,
    reduce_connections: &IndexMap<PortRef, Vec<PortRef>>,
    checker: &dyn DimensionChecker,
) -> Result<(), ConnectionError> {
    let analog = |port: &PortRef| -> Result<Option<AnalogPort>, ConnectionError> {
        Ok(match connections::lookup(subs, port)? {
            PortKind::Analog(p) => Some(p.clone()),
            PortKind::Event(_) => None,
        })
    };
    for senders in reduce_connections.values() {
        let Some((first, rest)) = senders.split_first() else {
            continue;
        };
        let Some(first_port) = analog(first)? else {
            continue;
        };
        for sender in rest {
            let Some(port) = analog(sender)? else {
                continue;
            };
            if !checker.dimensions_match(&port, &first_port) {
                return Err(ConnectionError::DimensionMismatch {
                    sender: sender.to_string(),
                    send_dimension: port.dimension.to_string(),
                    receiver: first.to_string(),
                    receive_dimension: first_port.dimension.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn assemble(
    name: &str,
    subs: &IndexMap<String, SubDynamics>,
    exposures: &Exposures,
    analog_connections: &IndexMap<PortRef, PortRef>,
    reduce_connections: &IndexMap<PortRef, Vec<PortRef>>,
    event_connections: &IndexMap<PortRef, Vec<EventConnection>>,
    options: &ComposeOptions,
) -> Result<Dynamics, ComposeError> {
    let mut builder = Dynamics::builder(name);
    for sub in subs.values() {
        for parameter in sub.parameters() {
            builder = builder.with_parameter(parameter.clone());
        }
        for state_variable in sub.state_variables() {
            builder = builder.with_state_variable(state_variable.clone());
        }
        for constant in sub.constants() {
            builder = builder.with_constant(constant.clone());
        }
        for alias in sub.aliases() {
            builder = builder.with_alias(alias.clone());
        }
    }
    for alias in exposures.aliases() {
        builder = builder.with_alias(alias);
    }
    let connection_aliases = aliases::connection_aliases(
        name,
        subs,
        exposures,
        analog_connections,
        reduce_connections,
    )?;
    for alias in connection_aliases {
        builder = builder.with_alias(alias);
    }
    for port in exposures.analog_ports() {
        builder = builder.with_analog_port(port.clone());
    }
    for port in exposures.event_ports() {
        builder = builder.with_event_port(port.clone());
    }

    let routes = EventRoutes::new(subs, event_connections);
    let context = CascadeContext {
        component: name,
        subs: subs.values().collect(),
        routes: &routes,
        exposures,
    };
    let product = RegimeProduct::new(context, options.transition_order);
    for regime in product.build_all(options.parallel)? {
        builder = builder.with_regime(regime);
    }
    Ok(builder.build()?)
}
