//! Visitor traits over expressions and Dynamics declarations.
//!
//! `Visitor` walks immutably, `MutVisitor` may rewrite nodes in place. Both
//! have empty default hooks so an implementation only overrides what it
//! needs, e.g. a renamer only touches `exit_expression` and
//! `exit_symbol_name`.

use crate::ir::ast::{Alias, OutputEvent, Regime, StateAssignment, TimeDerivative, Transition};
use crate::ir::expr::Expression;

#[allow(unused_variables)]
pub trait Visitor {
    fn enter_expression(&mut self, node: &Expression) {}
    fn exit_expression(&mut self, node: &Expression) {}
    fn visit_symbol(&mut self, name: &str) {}
}

#[allow(unused_variables)]
pub trait MutVisitor {
    fn enter_expression(&mut self, node: &mut Expression) {}
    fn exit_expression(&mut self, node: &mut Expression) {}
    /// A declared symbol name outside an expression: the variable of a time
    /// derivative or state assignment, or the name of an alias.
    fn exit_symbol_name(&mut self, name: &mut String) {}
    /// The port named by an output event or an `OnEvent`.
    fn exit_port_name(&mut self, name: &mut String) {}
}

pub trait Visitable {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V);
}

pub trait MutVisitable {
    fn accept_mut<V: MutVisitor + ?Sized>(&mut self, visitor: &mut V);
}

impl MutVisitable for TimeDerivative {
    fn accept_mut<V: MutVisitor + ?Sized>(&mut self, visitor: &mut V) {
        visitor.exit_symbol_name(&mut self.variable);
        self.rhs.accept_mut(visitor);
    }
}

impl MutVisitable for StateAssignment {
    fn accept_mut<V: MutVisitor + ?Sized>(&mut self, visitor: &mut V) {
        visitor.exit_symbol_name(&mut self.variable);
        self.rhs.accept_mut(visitor);
    }
}

impl MutVisitable for OutputEvent {
    fn accept_mut<V: MutVisitor + ?Sized>(&mut self, visitor: &mut V) {
        visitor.exit_port_name(&mut self.port_name);
    }
}

impl MutVisitable for Alias {
    fn accept_mut<V: MutVisitor + ?Sized>(&mut self, visitor: &mut V) {
        visitor.exit_symbol_name(&mut self.name);
        self.rhs.accept_mut(visitor);
    }
}

impl<T> MutVisitable for Transition<T> {
    fn accept_mut<V: MutVisitor + ?Sized>(&mut self, visitor: &mut V) {
        match self {
            Transition::OnCondition(on_condition) => {
                on_condition.trigger.rhs_mut().accept_mut(visitor);
            }
            Transition::OnEvent(on_event) => {
                visitor.exit_port_name(&mut on_event.src_port_name);
            }
        }
        let body = self.body_mut();
        // Keys mirror the contained names, so the maps are rebuilt.
        body.state_assignments = std::mem::take(&mut body.state_assignments)
            .into_values()
            .map(|mut assignment| {
                assignment.accept_mut(visitor);
                (assignment.variable.clone(), assignment)
            })
            .collect();
        body.output_events = std::mem::take(&mut body.output_events)
            .into_values()
            .map(|mut event| {
                event.accept_mut(visitor);
                (event.port_name.clone(), event)
            })
            .collect();
    }
}

impl<T> MutVisitable for Regime<T> {
    fn accept_mut<V: MutVisitor + ?Sized>(&mut self, visitor: &mut V) {
        self.time_derivatives = std::mem::take(&mut self.time_derivatives)
            .into_values()
            .map(|mut derivative| {
                derivative.accept_mut(visitor);
                (derivative.variable.clone(), derivative)
            })
            .collect();
        for transition in self.transitions.iter_mut() {
            transition.accept_mut(visitor);
        }
    }
}
