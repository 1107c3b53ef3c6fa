//! Product regime space of a MultiDynamics.
//!
//! Every combination of sub-component regimes (a regime tuple) becomes one
//! composite regime. Tuples are enumerated in mixed radix with the first
//! sub-component most significant, so composite regime order depends only
//! on the (name-sorted) sub-components.

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use super::cascade::{Cascade, CascadeContext};
use super::options::TransitionOrder;
use crate::ir::ast::{OnCondition, OnEvent, Regime, RegimeId, Transition, TransitionBody};
use crate::ir::error::ComposeError;
use crate::ir::transform::namespace::make_regime_name;

/// Builds composite regimes from a cascade context.
pub(super) struct RegimeProduct<'a> {
    context: CascadeContext<'a>,
    order: TransitionOrder,
    radices: Vec<usize>,
}

impl<'a> RegimeProduct<'a> {
    pub fn new(context: CascadeContext<'a>, order: TransitionOrder) -> Self {
        let radices = context.subs.iter().map(|s| s.num_regimes()).collect();
        Self {
            context,
            order,
            radices,
        }
    }

    /// Number of composite regimes.
    pub fn num_regimes(&self) -> usize {
        self.radices.iter().product()
    }

    /// Regime tuple of the composite regime at `index`.
    pub fn tuple(&self, mut index: usize) -> Vec<usize> {
        let mut tuple = vec![0; self.radices.len()];
        for (slot, radix) in tuple.iter_mut().zip(&self.radices).rev() {
            *slot = index % radix;
            index /= radix;
        }
        tuple
    }

    pub fn regime_name(&self, tuple: &[usize]) -> String {
        make_regime_name(
            self.context
                .subs
                .iter()
                .zip(tuple)
                .map(|(sub, &r)| sub.regimes()[r].name.as_str()),
        )
    }

    /// Build every composite regime.
    pub fn build_all(&self, parallel: bool) -> Result<Vec<Regime>, ComposeError> {
        if self.radices.is_empty() {
            return Ok(Vec::new());
        }
        let total = self.num_regimes();
        log::debug!(
            "building {total} composite regimes for '{}'",
            self.context.component
        );
        build_indexed(total, parallel, |index| self.build(index))
    }

    /// Build the composite regime at `index`.
    pub fn build(&self, index: usize) -> Result<Regime, ComposeError> {
        let tuple = self.tuple(index);
        let name = self.regime_name(&tuple);

        let mut regime = Regime::new(name.clone());
        for (sub, &r) in self.context.subs.iter().zip(&tuple) {
            for derivative in sub.regimes()[r].time_derivatives.values() {
                regime = regime.with_time_derivative(derivative.clone());
            }
        }

        let mut sources: Vec<(usize, &Transition<RegimeId>)> = Vec::new();
        match self.order {
            TransitionOrder::ComponentMajor => {
                for (i, (sub, &r)) in self.context.subs.iter().zip(&tuple).enumerate() {
                    sources.extend(sub.regimes()[r].transitions.iter().map(|t| (i, t)));
                }
            }
            TransitionOrder::KindMajor => {
                for (i, (sub, &r)) in self.context.subs.iter().zip(&tuple).enumerate() {
                    sources.extend(sub.regimes()[r].on_conditions().map(|t| (i, t)));
                }
                for (i, (sub, &r)) in self.context.subs.iter().zip(&tuple).enumerate() {
                    sources.extend(sub.regimes()[r].on_events().map(|t| (i, t)));
                }
            }
        }

        for (i, transition) in sources {
            if let Some(composite) = self.transition(&name, &tuple, i, transition)? {
                regime = regime.with_transition(composite);
            }
        }
        log::debug!(
            "composite regime '{name}' has {} transitions",
            regime.transitions.len()
        );
        Ok(regime)
    }

    /// The composite counterpart of one sub-component transition. `OnEvent`s
    /// on ports that are not exposed have no counterpart.
    fn transition(
        &self,
        name: &str,
        tuple: &[usize],
        origin: usize,
        transition: &Transition<RegimeId>,
    ) -> Result<Option<Transition>, ComposeError> {
        match transition {
            Transition::OnCondition(on_condition) => {
                let cascade = self
                    .context
                    .resolve(name, tuple, origin, None, &on_condition.body)?;
                Ok(Some(Transition::OnCondition(OnCondition {
                    trigger: on_condition.trigger.clone(),
                    body: self.body(cascade),
                })))
            }
            Transition::OnEvent(on_event) => {
                let port = &on_event.src_port_name;
                let exposed = self.context.exposures.event_receive_name(port);
                if exposed.is_none() && !self.context.routes.is_connected(origin, port) {
                    return Ok(None);
                }
                // Internally driven handlers are resolved for their cycle
                // check only; they fire as part of another cascade.
                let cascade =
                    self.context
                        .resolve(name, tuple, origin, Some(port), &on_event.body)?;
                Ok(exposed.map(|exposed| {
                    Transition::OnEvent(OnEvent {
                        src_port_name: exposed.to_string(),
                        body: self.body(cascade),
                    })
                }))
            }
        }
    }

    fn body(&self, cascade: Cascade) -> TransitionBody<Option<String>> {
        TransitionBody {
            target: Some(self.regime_name(&cascade.next)),
            state_assignments: cascade.state_assignments,
            output_events: cascade.output_events,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_indexed<T, F>(total: usize, parallel: bool, f: F) -> Result<Vec<T>, ComposeError>
where
    T: Send,
    F: Fn(usize) -> Result<T, ComposeError> + Sync + Send,
{
    if parallel {
        (0..total).into_par_iter().map(f).collect()
    } else {
        (0..total).map(f).collect()
    }
}

#[cfg(target_arch = "wasm32")]
fn build_indexed<T, F>(total: usize, _parallel: bool, f: F) -> Result<Vec<T>, ComposeError>
where
    F: Fn(usize) -> Result<T, ComposeError>,
{
    (0..total).map(f).collect()
}
