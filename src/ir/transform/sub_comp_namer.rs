//! A visitor that moves a sub-component's symbols into its namespace.
//!
//! The `SubCompNamer` rewrites every reference to a symbol declared by the
//! sub-component `comp` into the flattened name
//! `append_namespace(symbol, comp)`. Symbols the sub-component does not
//! declare (the time variable `t`, function names) are left untouched.
//!
//! # Example
//! With `comp = "cell"` and `v` declared, `dv/dt = -v / tau` becomes
//! `dv__cell/dt = -v__cell / tau__cell` when `tau` is also declared.
use std::collections::HashSet;

use crate::ir::expr::Expression;
use crate::ir::transform::namespace::append_namespace;
use crate::ir::visitor::MutVisitor;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SubCompNamer {
    pub comp: String,
    /// Symbols and ports declared by the sub-component.
    pub declared: HashSet<String>,
}

impl SubCompNamer {
    pub fn new(comp: impl Into<String>, declared: impl IntoIterator<Item = String>) -> Self {
        Self {
            comp: comp.into(),
            declared: declared.into_iter().collect(),
        }
    }

    fn rename(&self, name: &mut String) {
        if self.declared.contains(name.as_str()) {
            *name = append_namespace(name, &self.comp);
        }
    }
}

impl MutVisitor for SubCompNamer {
    fn exit_expression(&mut self, node: &mut Expression) {
        if let Expression::Symbol(name) = node {
            self.rename(name);
        }
    }

    fn exit_symbol_name(&mut self, name: &mut String) {
        self.rename(name);
    }

    fn exit_port_name(&mut self, name: &mut String) {
        self.rename(name);
    }
}

/// Renames one symbol, used by `Dynamics::rename_symbol`.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRenamer {
    old: String,
    new: String,
}

impl SymbolRenamer {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    fn rename(&self, name: &mut String) {
        if *name == self.old {
            name.clone_from(&self.new);
        }
    }
}

impl MutVisitor for SymbolRenamer {
    fn exit_expression(&mut self, node: &mut Expression) {
        if let Expression::Symbol(name) = node {
            self.rename(name);
        }
    }

    fn exit_symbol_name(&mut self, name: &mut String) {
        self.rename(name);
    }

    fn exit_port_name(&mut self, name: &mut String) {
        self.rename(name);
    }
}
