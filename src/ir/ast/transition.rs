//! Transitions, their triggers and their discrete effects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::named;
use crate::ir::error::ParseError;
use crate::ir::expr::{BinaryOp, Expression, TIME_VARIABLE};

/// Unresolved transition target: a regime name, or `None` to stay in the
/// source regime.
pub type RegimeTarget = Option<String>;

/// Index of a regime inside a bound Dynamics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegimeId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAssignment {
    pub variable: String,
    pub rhs: Expression,
}

impl StateAssignment {
    pub fn new(variable: impl Into<String>, rhs: Expression) -> Self {
        Self {
            variable: variable.into(),
            rhs,
        }
    }

    /// Parse `"v = v_reset"`.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let (variable, rhs) = split_equation(source, "=")?;
        Ok(Self::new(variable, rhs.parse()?))
    }
}

/// Split `lhs <sep> rhs` where `lhs` must be a bare identifier.
pub(crate) fn split_equation<'a>(source: &'a str, sep: &str) -> Result<(&'a str, &'a str), ParseError> {
    let Some(pos) = source.find(sep) else {
        return Err(ParseError::new(
            format!("expected '{sep}'"),
            source.len()..source.len(),
            source,
        ));
    };
    let lhs = source[..pos].trim();
    if lhs.is_empty() || !lhs.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ParseError::new(
            "left-hand side must be a single identifier",
            0..pos,
            source,
        ));
    }
    Ok((lhs, &source[pos + sep.len()..]))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputEvent {
    pub port_name: String,
}

impl OutputEvent {
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
        }
    }
}

/// Boolean condition guarding an `OnCondition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trigger {
    rhs: Expression,
}

impl Trigger {
    pub fn new(rhs: Expression) -> Self {
        Self { rhs }
    }

    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Ok(Self::new(source.parse()?))
    }

    pub fn rhs(&self) -> &Expression {
        &self.rhs
    }

    pub(crate) fn rhs_mut(&mut self) -> &mut Expression {
        &mut self.rhs
    }

    /// Canonical string form, used for ordering and equality.
    pub fn key(&self) -> String {
        self.rhs.to_string()
    }

    /// Condition that must hold again before the trigger can re-fire.
    pub fn reactivate_condition(&self) -> Expression {
        self.rhs.negate()
    }

    /// Time at which the trigger becomes true, if it can be solved for.
    ///
    /// Strict comparisons involving `t` are solved as equalities; a
    /// disjunction resolves to the minimum of its parts. Conjunctions,
    /// non-linear conditions and conditions not mentioning `t` give `None`.
    pub fn crossing_time_expr(&self) -> Option<Expression> {
        crossing_time(&self.rhs.make_strict())
    }
}

fn crossing_time(expr: &Expression) -> Option<Expression> {
    if !expr.contains_symbol(TIME_VARIABLE) {
        return None;
    }
    match expr {
        Expression::Binary {
            op: BinaryOp::Gt | BinaryOp::Lt,
            ..
        } => {
            let mut solutions = expr.solve_for(TIME_VARIABLE);
            if solutions.len() == 1 {
                solutions.pop()
            } else {
                None
            }
        }
        Expression::Binary {
            op: BinaryOp::Or,
            lhs,
            rhs,
        } => {
            let lhs = crossing_time(lhs)?;
            let rhs = crossing_time(rhs)?;
            Some(Expression::call("Min", vec![lhs, rhs]))
        }
        _ => None,
    }
}

/// Effects shared by both transition kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct TransitionBody<T> {
    #[serde(default, with = "named")]
    pub state_assignments: IndexMap<String, StateAssignment>,
    #[serde(default, with = "named")]
    pub output_events: IndexMap<String, OutputEvent>,
    #[serde(default)]
    pub target: T,
}

impl<T: Default> Default for TransitionBody<T> {
    fn default() -> Self {
        Self {
            state_assignments: IndexMap::new(),
            output_events: IndexMap::new(),
            target: T::default(),
        }
    }
}

impl<T> TransitionBody<T> {
    pub fn map_target<U>(self, f: impl FnOnce(T) -> U) -> TransitionBody<U> {
        TransitionBody {
            state_assignments: self.state_assignments,
            output_events: self.output_events,
            target: f(self.target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct OnCondition<T> {
    pub trigger: Trigger,
    #[serde(flatten)]
    pub body: TransitionBody<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct OnEvent<T> {
    pub src_port_name: String,
    #[serde(flatten)]
    pub body: TransitionBody<T>,
}

/// A discrete transition out of a regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "snake_case",
    bound(deserialize = "T: Deserialize<'de> + Default")
)]
pub enum Transition<T = RegimeTarget> {
    OnCondition(OnCondition<T>),
    OnEvent(OnEvent<T>),
}

impl<T> Transition<T> {
    pub fn body(&self) -> &TransitionBody<T> {
        match self {
            Transition::OnCondition(t) => &t.body,
            Transition::OnEvent(t) => &t.body,
        }
    }

    pub fn body_mut(&mut self) -> &mut TransitionBody<T> {
        match self {
            Transition::OnCondition(t) => &mut t.body,
            Transition::OnEvent(t) => &mut t.body,
        }
    }

    pub fn target(&self) -> &T {
        &self.body().target
    }

    pub fn state_assignments(&self) -> impl Iterator<Item = &StateAssignment> {
        self.body().state_assignments.values()
    }

    pub fn output_events(&self) -> impl Iterator<Item = &OutputEvent> {
        self.body().output_events.values()
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Transition::OnCondition(t) => format!("OnCondition({})", t.trigger.key()),
            Transition::OnEvent(t) => format!("OnEvent({})", t.src_port_name),
        }
    }

    /// Replace the target, keeping everything else.
    pub fn map_target<U>(self, f: impl FnOnce(T) -> U) -> Transition<U> {
        match self {
            Transition::OnCondition(OnCondition { trigger, body }) => {
                Transition::OnCondition(OnCondition {
                    trigger,
                    body: body.map_target(f),
                })
            }
            Transition::OnEvent(OnEvent {
                src_port_name,
                body,
            }) => Transition::OnEvent(OnEvent {
                src_port_name,
                body: body.map_target(f),
            }),
        }
    }
}

impl Transition<RegimeTarget> {
    pub fn on_condition(trigger: &str) -> Result<Self, ParseError> {
        Ok(Self::from_trigger(Trigger::parse(trigger)?))
    }

    pub fn from_trigger(trigger: Trigger) -> Self {
        Transition::OnCondition(OnCondition {
            trigger,
            body: TransitionBody::default(),
        })
    }

    pub fn on_event(src_port_name: impl Into<String>) -> Self {
        Transition::OnEvent(OnEvent {
            src_port_name: src_port_name.into(),
            body: TransitionBody::default(),
        })
    }

    /// Add a state assignment; a second assignment to the same variable
    /// replaces the first.
    pub fn with_state_assignment(mut self, assignment: StateAssignment) -> Self {
        self.body_mut()
            .state_assignments
            .insert(assignment.variable.clone(), assignment);
        self
    }

    pub fn with_output_event(mut self, port_name: impl Into<String>) -> Self {
        let event = OutputEvent::new(port_name);
        self.body_mut()
            .output_events
            .insert(event.port_name.clone(), event);
        self
    }

    pub fn to(mut self, regime: impl Into<String>) -> Self {
        self.body_mut().target = Some(regime.into());
        self
    }
}
