//! The Dynamics component class and its regimes.
//!
//! A `Dynamics` is created through `DynamicsBuilder` (or deserialized), with
//! transitions naming their target regime by string. `bind` resolves those
//! names to `RegimeId`s and returns a `BoundDynamics`, a distinct type that
//! refuses structural mutation.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::named::{self, collect_named, Named};
use super::{
    validate_declared_name, validate_identifier, Alias, AnalogMode, AnalogPort, Constant,
    EventMode, EventPort, OnEvent, Parameter, PortKind, RegimeId, RegimeTarget, StateVariable,
    TimeDerivative, Transition,
};
use crate::ir::error::{BindError, ModelError};
use crate::ir::transform::SymbolRenamer;
use crate::ir::visitor::MutVisitable;

// =============================================================================
// Regime
// =============================================================================

/// One mode of continuous behaviour plus its outgoing transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct Regime<T = RegimeTarget> {
    pub name: String,
    #[serde(default, with = "named")]
    pub time_derivatives: IndexMap<String, TimeDerivative>,
    #[serde(default)]
    pub transitions: Vec<Transition<T>>,
}

impl<T> Named for Regime<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

impl<T> Regime<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time_derivatives: IndexMap::new(),
            transitions: Vec::new(),
        }
    }

    pub fn with_time_derivative(mut self, derivative: TimeDerivative) -> Self {
        self.time_derivatives
            .insert(derivative.variable.clone(), derivative);
        self
    }

    pub fn with_transition(mut self, transition: Transition<T>) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn on_conditions(&self) -> impl Iterator<Item = &Transition<T>> {
        self.transitions
            .iter()
            .filter(|t| matches!(t, Transition::OnCondition(_)))
    }

    pub fn on_events(&self) -> impl Iterator<Item = &Transition<T>> {
        self.transitions
            .iter()
            .filter(|t| matches!(t, Transition::OnEvent(_)))
    }

    /// The `OnEvent` listening on `port`, if any.
    pub fn on_event(&self, port: &str) -> Option<&OnEvent<T>> {
        self.transitions.iter().find_map(|t| match t {
            Transition::OnEvent(on_event) if on_event.src_port_name == port => Some(on_event),
            _ => None,
        })
    }

    pub(crate) fn map_targets<U>(self, mut f: impl FnMut(T) -> U) -> Regime<U> {
        Regime {
            name: self.name,
            time_derivatives: self.time_derivatives,
            transitions: self
                .transitions
                .into_iter()
                .map(|t| t.map_target(&mut f))
                .collect(),
        }
    }
}

// =============================================================================
// Dynamics
// =============================================================================

/// A hybrid state machine: regimes with ODEs and transitions, plus the
/// parameters, ports, aliases and state variables they refer to.
///
/// `T` is the transition target: a regime name before binding, a
/// `RegimeId` after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "DynamicsDocument<T>",
    bound(
        serialize = "T: Serialize",
        deserialize = "T: Deserialize<'de> + TransitionTarget"
    )
)]
pub struct Dynamics<T = RegimeTarget> {
    name: String,
    #[serde(serialize_with = "named::serialize")]
    parameters: IndexMap<String, Parameter>,
    #[serde(serialize_with = "named::serialize")]
    state_variables: IndexMap<String, StateVariable>,
    #[serde(serialize_with = "named::serialize")]
    constants: IndexMap<String, Constant>,
    #[serde(serialize_with = "named::serialize")]
    aliases: IndexMap<String, Alias>,
    #[serde(serialize_with = "named::serialize")]
    analog_ports: IndexMap<String, AnalogPort>,
    #[serde(serialize_with = "named::serialize")]
    event_ports: IndexMap<String, EventPort>,
    #[serde(serialize_with = "named::serialize")]
    regimes: IndexMap<String, Regime<T>>,
}

/// A Dynamics whose transition targets have been resolved.
pub type BoundDynamics = Dynamics<RegimeId>;

/// Wire form of a Dynamics, validated on conversion. A transition without
/// a target stays in its source regime.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct DynamicsDocument<T> {
    name: String,
    #[serde(default, with = "named")]
    parameters: IndexMap<String, Parameter>,
    #[serde(default, with = "named")]
    state_variables: IndexMap<String, StateVariable>,
    #[serde(default, with = "named")]
    constants: IndexMap<String, Constant>,
    #[serde(default, with = "named")]
    aliases: IndexMap<String, Alias>,
    #[serde(default, with = "named")]
    analog_ports: IndexMap<String, AnalogPort>,
    #[serde(default, with = "named")]
    event_ports: IndexMap<String, EventPort>,
    #[serde(default, with = "named")]
    regimes: IndexMap<String, Regime<Option<T>>>,
}

impl<T: TransitionTarget> TryFrom<DynamicsDocument<T>> for Dynamics<T> {
    type Error = ModelError;

    fn try_from(doc: DynamicsDocument<T>) -> Result<Self, Self::Error> {
        let dynamics = Dynamics {
            name: doc.name,
            parameters: doc.parameters,
            state_variables: doc.state_variables,
            constants: doc.constants,
            aliases: doc.aliases,
            analog_ports: doc.analog_ports,
            event_ports: doc.event_ports,
            regimes: doc.regimes,
        };
        dynamics.validate()?;
        T::from_document(dynamics)
    }
}

/// Transition targets a Dynamics can be read with.
pub trait TransitionTarget: Sized {
    /// Finish reading a validated document whose transitions may omit
    /// their target.
    fn from_document(dynamics: Dynamics<Option<Self>>) -> Result<Dynamics<Self>, ModelError>;
}

impl TransitionTarget for RegimeTarget {
    fn from_document(dynamics: Dynamics<Option<Self>>) -> Result<Dynamics<Self>, ModelError> {
        Ok(dynamics.into_regimes(|regimes| {
            regimes
                .into_iter()
                .map(|(name, regime)| (name, regime.map_targets(Option::flatten)))
                .collect()
        }))
    }
}

/// Bound documents go back through `bind`, so a `BoundDynamics` read from
/// JSON has every guarantee of one built in memory.
impl TransitionTarget for RegimeId {
    fn from_document(dynamics: Dynamics<Option<Self>>) -> Result<Dynamics<Self>, ModelError> {
        let component = dynamics.name.clone();
        let names: Vec<String> = dynamics.regimes.keys().cloned().collect();
        let mut unresolved = None;
        let unbound: Dynamics = dynamics.into_regimes(|regimes| {
            regimes
                .into_iter()
                .map(|(name, regime)| {
                    let regime = regime.map_targets(|target| {
                        let id = target?;
                        let resolved = names.get(id.0).cloned();
                        if resolved.is_none() {
                            unresolved.get_or_insert_with(|| BindError::UnresolvedRegime {
                                component: component.clone(),
                                regime: name.clone(),
                                target: id.0.to_string(),
                            });
                        }
                        resolved
                    });
                    (name, regime)
                })
                .collect()
        });
        if let Some(err) = unresolved {
            return Err(err.into());
        }
        Ok(unbound.bind()?)
    }
}

impl Dynamics {
    pub fn builder(name: impl Into<String>) -> DynamicsBuilder {
        DynamicsBuilder::new(name)
    }

    /// Rename a declared symbol or port everywhere it is used.
    pub fn rename_symbol(&mut self, old: &str, new: &str) -> Result<(), ModelError> {
        if old == new {
            return Ok(());
        }
        validate_declared_name(&self.name, new)?;
        if !self.declares(old) {
            return Err(ModelError::UnknownSymbol {
                component: self.name.clone(),
                name: old.to_string(),
            });
        }
        if self.declares(new) {
            return Err(ModelError::DuplicateName {
                scope: format!("component '{}'", self.name),
                name: new.to_string(),
            });
        }

        rename_key(&mut self.parameters, old, new);
        rename_key(&mut self.state_variables, old, new);
        rename_key(&mut self.constants, old, new);
        rename_key(&mut self.aliases, old, new);
        rename_key(&mut self.analog_ports, old, new);
        rename_key(&mut self.event_ports, old, new);

        let mut renamer = SymbolRenamer::new(old, new);
        for alias in self.aliases.values_mut() {
            alias.accept_mut(&mut renamer);
        }
        for regime in self.regimes.values_mut() {
            regime.accept_mut(&mut renamer);
        }
        log::debug!("renamed '{old}' to '{new}' in '{}'", self.name);
        Ok(())
    }
}

impl BoundDynamics {
    /// Bound Dynamics are frozen.
    pub fn rename_symbol(&mut self, old: &str, _new: &str) -> Result<(), ModelError> {
        Err(ModelError::Immutable {
            what: format!("symbol '{old}' of bound component '{}'", self.name),
        })
    }

    pub fn regime_id(&self, name: &str) -> Option<RegimeId> {
        self.regimes.get_index_of(name).map(RegimeId)
    }

    pub fn regime_by_id(&self, id: RegimeId) -> Option<&Regime<RegimeId>> {
        self.regimes.get_index(id.0).map(|(_, regime)| regime)
    }

    /// Return to the declaration stage, turning regime ids back into names.
    pub fn unbind(self) -> Dynamics {
        let names: Vec<String> = self.regimes.keys().cloned().collect();
        let regimes = self
            .regimes
            .into_iter()
            .map(|(name, regime)| {
                let regime = regime.map_targets(|id| names.get(id.0).cloned());
                (name, regime)
            })
            .collect();
        Dynamics {
            name: self.name,
            parameters: self.parameters,
            state_variables: self.state_variables,
            constants: self.constants,
            aliases: self.aliases,
            analog_ports: self.analog_ports,
            event_ports: self.event_ports,
            regimes,
        }
    }
}

impl<T> Dynamics<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn state_variables(&self) -> impl Iterator<Item = &StateVariable> {
        self.state_variables.values()
    }

    pub fn constants(&self) -> impl Iterator<Item = &Constant> {
        self.constants.values()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.values()
    }

    pub fn analog_ports(&self) -> impl Iterator<Item = &AnalogPort> {
        self.analog_ports.values()
    }

    pub fn event_ports(&self) -> impl Iterator<Item = &EventPort> {
        self.event_ports.values()
    }

    pub fn regimes(&self) -> impl Iterator<Item = &Regime<T>> {
        self.regimes.values()
    }

    pub fn num_regimes(&self) -> usize {
        self.regimes.len()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    pub fn state_variable(&self, name: &str) -> Option<&StateVariable> {
        self.state_variables.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.get(name)
    }

    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    pub fn analog_port(&self, name: &str) -> Option<&AnalogPort> {
        self.analog_ports.get(name)
    }

    pub fn event_port(&self, name: &str) -> Option<&EventPort> {
        self.event_ports.get(name)
    }

    pub fn regime(&self, name: &str) -> Option<&Regime<T>> {
        self.regimes.get(name)
    }

    pub fn port(&self, name: &str) -> Option<PortKind<'_>> {
        self.analog_ports
            .get(name)
            .map(PortKind::Analog)
            .or_else(|| self.event_ports.get(name).map(PortKind::Event))
    }

    pub fn analog_ports_with_mode(
        &self,
        pred: impl Fn(&AnalogMode) -> bool,
    ) -> impl Iterator<Item = &AnalogPort> {
        self.analog_ports.values().filter(move |p| pred(&p.mode))
    }

    pub fn event_ports_with_mode(&self, mode: EventMode) -> impl Iterator<Item = &EventPort> {
        self.event_ports.values().filter(move |p| p.mode == mode)
    }

    /// True if `name` is a declared symbol or port.
    pub fn declares(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
            || self.state_variables.contains_key(name)
            || self.constants.contains_key(name)
            || self.aliases.contains_key(name)
            || self.analog_ports.contains_key(name)
            || self.event_ports.contains_key(name)
    }

    /// Check identifiers and name uniqueness.
    ///
    /// Parameters, state variables, constants, aliases, receiving analog
    /// ports and event ports share one namespace. An analog send port
    /// carries the name of the alias or state variable it publishes, so it
    /// is only required to be distinct from the other ports.
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_identifier(&self.name)?;
        let scope = || format!("component '{}'", self.name);

        let mut symbols: HashSet<&str> = HashSet::new();
        let declared = self
            .parameters
            .keys()
            .chain(self.state_variables.keys())
            .chain(self.constants.keys())
            .chain(self.aliases.keys())
            .chain(
                self.analog_ports
                    .values()
                    .filter(|p| p.mode != AnalogMode::Send)
                    .map(|p| &p.name),
            )
            .chain(self.event_ports.keys());
        for name in declared {
            validate_declared_name(&self.name, name)?;
            if !symbols.insert(name.as_str()) {
                return Err(ModelError::DuplicateName {
                    scope: scope(),
                    name: name.clone(),
                });
            }
        }
        for port in self.analog_ports_with_mode(|m| *m == AnalogMode::Send) {
            validate_declared_name(&self.name, &port.name)?;
            if self.event_ports.contains_key(&port.name) {
                return Err(ModelError::DuplicateName {
                    scope: scope(),
                    name: port.name.clone(),
                });
            }
        }
        for regime in self.regimes.keys() {
            validate_identifier(regime)?;
        }
        Ok(())
    }

    /// Split into regimes and everything else, used by binding.
    pub(crate) fn into_regimes<U>(
        self,
        f: impl FnOnce(IndexMap<String, Regime<T>>) -> IndexMap<String, Regime<U>>,
    ) -> Dynamics<U> {
        Dynamics {
            name: self.name,
            parameters: self.parameters,
            state_variables: self.state_variables,
            constants: self.constants,
            aliases: self.aliases,
            analog_ports: self.analog_ports,
            event_ports: self.event_ports,
            regimes: f(self.regimes),
        }
    }
}

fn rename_key<V: Named>(map: &mut IndexMap<String, V>, old: &str, new: &str) {
    if !map.contains_key(old) {
        return;
    }
    *map = std::mem::take(map)
        .into_iter()
        .map(|(key, mut value)| {
            if key == old {
                value.set_name(new.to_string());
                (new.to_string(), value)
            } else {
                (key, value)
            }
        })
        .collect();
}

// =============================================================================
// Builder
// =============================================================================

/// Collects declarations and produces a validated `Dynamics`.
#[derive(Debug, Clone, Default)]
pub struct DynamicsBuilder {
    name: String,
    parameters: Vec<Parameter>,
    state_variables: Vec<StateVariable>,
    constants: Vec<Constant>,
    aliases: Vec<Alias>,
    analog_ports: Vec<AnalogPort>,
    event_ports: Vec<EventPort>,
    regimes: Vec<Regime>,
}

impl DynamicsBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_state_variable(mut self, state_variable: StateVariable) -> Self {
        self.state_variables.push(state_variable);
        self
    }

    pub fn with_constant(mut self, constant: Constant) -> Self {
        self.constants.push(constant);
        self
    }

    pub fn with_alias(mut self, alias: Alias) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn with_analog_port(mut self, port: AnalogPort) -> Self {
        self.analog_ports.push(port);
        self
    }

    pub fn with_event_port(mut self, port: EventPort) -> Self {
        self.event_ports.push(port);
        self
    }

    pub fn with_regime(mut self, regime: Regime) -> Self {
        self.regimes.push(regime);
        self
    }

    pub fn build(self) -> Result<Dynamics, ModelError> {
        let name = self.name;
        let dup = |scope: &str| {
            let scope = format!("{scope} of component '{name}'");
            move |dup: String| ModelError::DuplicateName { scope, name: dup }
        };
        let dynamics = Dynamics {
            parameters: collect_named(self.parameters).map_err(dup("parameters"))?,
            state_variables: collect_named(self.state_variables).map_err(dup("state variables"))?,
            constants: collect_named(self.constants).map_err(dup("constants"))?,
            aliases: collect_named(self.aliases).map_err(dup("aliases"))?,
            analog_ports: collect_named(self.analog_ports).map_err(dup("analog ports"))?,
            event_ports: collect_named(self.event_ports).map_err(dup("event ports"))?,
            regimes: collect_named(self.regimes).map_err(dup("regimes"))?,
            name,
        };
        dynamics.validate()?;
        Ok(dynamics)
    }
}
