//! Namespace-wrapped, read-only view of a bound sub-component.
//!
//! Every symbol, port and regime body of the wrapped Dynamics is renamed
//! into the sub-component's namespace once, when the view is built. The
//! view shares the underlying `BoundDynamics` and never changes it.

use std::sync::Arc;

use crate::ir::ast::{
    Alias, BoundDynamics, Constant, Named, OnEvent, Parameter, Regime, RegimeId, StateVariable,
};
use crate::ir::error::ModelError;
use crate::ir::transform::namespace::append_namespace;
use crate::ir::transform::sub_comp_namer::SubCompNamer;
use crate::ir::visitor::MutVisitable;

/// Name of the regime contributed by a sub-component that declares none.
pub const DEFAULT_REGIME: &str = "default";

#[derive(Debug, Clone)]
pub struct SubDynamics {
    name: String,
    component: Arc<BoundDynamics>,
    parameters: Vec<Parameter>,
    state_variables: Vec<StateVariable>,
    constants: Vec<Constant>,
    aliases: Vec<Alias>,
    regimes: Vec<Regime<RegimeId>>,
}

impl SubDynamics {
    pub fn new(name: impl Into<String>, component: Arc<BoundDynamics>) -> Self {
        let name = name.into();
        let declared = component
            .parameters()
            .map(|p| p.name.clone())
            .chain(component.state_variables().map(|s| s.name.clone()))
            .chain(component.constants().map(|c| c.name.clone()))
            .chain(component.aliases().map(|a| a.name.clone()))
            .chain(component.analog_ports().map(|p| p.name.clone()))
            .chain(component.event_ports().map(|p| p.name.clone()));
        let mut namer = SubCompNamer::new(name.as_str(), declared);

        let namespaced = |item: &dyn Named| append_namespace(item.name(), &name);
        let parameters = component
            .parameters()
            .map(|p| Parameter::new(namespaced(p), p.dimension.clone()))
            .collect();
        let state_variables = component
            .state_variables()
            .map(|s| StateVariable::new(namespaced(s), s.dimension.clone()))
            .collect();
        let constants = component
            .constants()
            .map(|c| Constant::new(namespaced(c), c.value, c.dimension.clone()))
            .collect();
        let aliases = component
            .aliases()
            .map(|alias| {
                let mut alias = alias.clone();
                alias.accept_mut(&mut namer);
                alias
            })
            .collect();

        let mut regimes: Vec<Regime<RegimeId>> = component
            .regimes()
            .map(|regime| {
                let mut regime = regime.clone();
                regime.accept_mut(&mut namer);
                regime
            })
            .collect();
        if regimes.is_empty() {
            regimes.push(Regime::new(DEFAULT_REGIME));
        }

        Self {
            name,
            component,
            parameters,
            state_variables,
            constants,
            aliases,
            regimes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wrapped component class.
    pub fn component(&self) -> &BoundDynamics {
        &self.component
    }

    /// `symbol` moved into this sub-component's namespace.
    pub fn namespaced(&self, symbol: &str) -> String {
        append_namespace(symbol, &self.name)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn state_variables(&self) -> &[StateVariable] {
        &self.state_variables
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// Namespaced regimes, indexed by `RegimeId`. Never empty.
    pub fn regimes(&self) -> &[Regime<RegimeId>] {
        &self.regimes
    }

    pub fn num_regimes(&self) -> usize {
        self.regimes.len()
    }

    /// The `OnEvent` of regime `regime` listening on the namespaced `port`.
    pub fn on_event(&self, regime: usize, port: &str) -> Option<&OnEvent<RegimeId>> {
        self.regimes.get(regime).and_then(|r| r.on_event(port))
    }

    /// Views are read-only.
    pub fn rename_symbol(&mut self, old: &str, _new: &str) -> Result<(), ModelError> {
        Err(ModelError::Immutable {
            what: format!("symbol '{old}' of sub-component '{}'", self.name),
        })
    }
}
