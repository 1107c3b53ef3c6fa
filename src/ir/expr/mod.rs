//! Symbolic expressions used by aliases, time derivatives, state
//! assignments and triggers.
//!
//! This is deliberately a small engine: it parses the NineML math syntax,
//! prints a canonical string, substitutes symbols and solves equations that
//! are linear in one variable. That is everything the Dynamics model and
//! the MultiDynamics composer ask of it.
//!
//! # Submodules
//! - `lexer`: `logos` tokenizer
//! - `parser`: Pratt parser producing `Expression`
//! - `simplify`: folding constructors and canonical ordering
//! - `solve`: linear solving for a single variable

mod lexer;
mod parser;
mod simplify;
mod solve;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ir::error::ParseError;
use crate::ir::visitor::{MutVisitable, MutVisitor, Visitable, Visitor};

pub use lexer::Token;
pub use simplify::simplify;

/// Name of the reserved time variable.
pub const TIME_VARIABLE: &str = "t";

/// Functions understood by the expression engine. They can appear in calls
/// but cannot be used as declared symbol names.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "exp", "log", "sin", "cos", "tan", "sinh", "cosh", "tanh", "asin", "acos", "atan", "atan2",
    "sqrt", "abs", "pow", "floor", "ceil", "Min", "Max", "min", "max",
];

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    /// Binding strength used by both the parser and the printer.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 10,
            BinaryOp::And => 20,
            BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne => 30,
            BinaryOp::Add | BinaryOp::Sub => 40,
            BinaryOp::Mul | BinaryOp::Div => 50,
            BinaryOp::Pow => 60,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Number(f64),
    Bool(bool),
    Symbol(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Call {
        func: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expression::Symbol(name.into())
    }

    pub fn number(value: f64) -> Self {
        Expression::Number(value)
    }

    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn call(func: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Call {
            func: func.into(),
            args,
        }
    }

    /// Returns true if this is the numeric literal `value`.
    pub fn is_number(&self, value: f64) -> bool {
        matches!(self, Expression::Number(n) if *n == value)
    }

    /// Names of all symbols referenced by the expression. Function names are
    /// not included.
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut collector = SymbolCollector::default();
        self.accept(&mut collector);
        collector.symbols
    }

    /// Returns true if `name` appears as a symbol in the expression.
    pub fn contains_symbol(&self, name: &str) -> bool {
        let mut finder = SymbolFinder {
            name,
            found: false,
        };
        self.accept(&mut finder);
        finder.found
    }

    /// Replace every symbol that appears in `map` by the mapped expression.
    pub fn substitute(&self, map: &HashMap<String, Expression>) -> Expression {
        let mut out = self.clone();
        out.accept_mut(&mut SymbolSubstituter { map });
        out
    }

    /// Rename symbols by name.
    pub fn rename(&self, map: &HashMap<String, String>) -> Expression {
        let mut out = self.clone();
        out.accept_mut(&mut SymbolRenamer { map });
        out
    }

    /// Structural equivalence after canonicalization: constants folded,
    /// identities removed and the operands of `+` and `*` chains sorted.
    pub fn equivalent(&self, other: &Expression) -> bool {
        simplify::canonical(self) == simplify::canonical(other)
    }

    /// Logical negation with comparisons flipped and double negation
    /// removed.
    pub fn negate(&self) -> Expression {
        match self {
            Expression::Bool(b) => Expression::Bool(!b),
            Expression::Unary {
                op: UnaryOp::Not,
                operand,
            } => (**operand).clone(),
            Expression::Binary { op, lhs, rhs } if op.is_comparison() => {
                let flipped = match op {
                    BinaryOp::Lt => BinaryOp::Ge,
                    BinaryOp::Le => BinaryOp::Gt,
                    BinaryOp::Gt => BinaryOp::Le,
                    BinaryOp::Ge => BinaryOp::Lt,
                    BinaryOp::Eq => BinaryOp::Ne,
                    _ => BinaryOp::Eq,
                };
                Expression::binary(flipped, (**lhs).clone(), (**rhs).clone())
            }
            other => Expression::unary(UnaryOp::Not, other.clone()),
        }
    }

    /// Rewrite non-strict comparisons as strict ones and push negations of
    /// comparisons inwards, e.g. `!(a < b) || c <= d` becomes `a > b || c < d`.
    pub fn make_strict(&self) -> Expression {
        match self {
            Expression::Binary { op, lhs, rhs } => {
                let lhs = lhs.make_strict();
                let rhs = rhs.make_strict();
                let op = match op {
                    BinaryOp::Ge => BinaryOp::Gt,
                    BinaryOp::Le => BinaryOp::Lt,
                    other => *other,
                };
                Expression::binary(op, lhs, rhs)
            }
            Expression::Unary {
                op: UnaryOp::Not,
                operand,
            } => match operand.as_ref() {
                Expression::Binary { op, lhs, rhs } if op.is_comparison() => {
                    let op = match op {
                        BinaryOp::Lt | BinaryOp::Le => BinaryOp::Gt,
                        BinaryOp::Gt | BinaryOp::Ge => BinaryOp::Lt,
                        BinaryOp::Eq => BinaryOp::Ne,
                        _ => BinaryOp::Eq,
                    };
                    Expression::binary(op, lhs.make_strict(), rhs.make_strict())
                }
                Expression::Unary {
                    op: UnaryOp::Not,
                    operand: inner,
                } => inner.make_strict(),
                other => Expression::unary(UnaryOp::Not, other.make_strict()),
            },
            Expression::Unary { op, operand } => Expression::unary(*op, operand.make_strict()),
            Expression::Call { func, args } => Expression::call(
                func.clone(),
                args.iter().map(Expression::make_strict).collect(),
            ),
            leaf => leaf.clone(),
        }
    }

    /// Solve for `variable`.
    ///
    /// Comparisons and equalities are solved as the equation `lhs == rhs`,
    /// any other expression as `expr == 0`. Only equations linear in
    /// `variable` are handled; everything else returns no solutions.
    pub fn solve_for(&self, variable: &str) -> Vec<Expression> {
        let (lhs, rhs) = match self {
            Expression::Binary { op, lhs, rhs } if op.is_comparison() => {
                ((**lhs).clone(), (**rhs).clone())
            }
            other => (other.clone(), Expression::Number(0.0)),
        };
        solve::solve_linear(&lhs, &rhs, variable)
            .into_iter()
            .collect()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_expr(self, 0, f)
    }
}

/// Prints `expr`, parenthesizing it when its own precedence is below
/// `min_prec`.
fn fmt_expr(expr: &Expression, min_prec: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expression::Number(n) => {
            if *n < 0.0 && min_prec > 0 {
                write!(f, "({n})")
            } else {
                write!(f, "{n}")
            }
        }
        Expression::Bool(b) => write!(f, "{b}"),
        Expression::Symbol(name) => write!(f, "{name}"),
        Expression::Call { func, args } => {
            write!(f, "{func}(")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_expr(arg, 0, f)?;
            }
            write!(f, ")")
        }
        Expression::Unary { op, operand } => {
            let (sym, prec) = match op {
                UnaryOp::Neg => ("-", 55),
                UnaryOp::Not => ("!", 25),
            };
            let wrap = prec < min_prec;
            if wrap {
                write!(f, "(")?;
            }
            write!(f, "{sym}")?;
            fmt_expr(operand, prec + 1, f)?;
            if wrap {
                write!(f, ")")?;
            }
            Ok(())
        }
        Expression::Binary { op, lhs, rhs } => {
            let prec = op.precedence();
            let wrap = prec < min_prec;
            // Right-associative power binds its left operand tighter, the
            // left-associative operators bind their right operand tighter.
            // Comparisons do not chain, so both sides need parentheses.
            let (lhs_prec, rhs_prec) = if *op == BinaryOp::Pow {
                (prec + 1, prec)
            } else if op.is_comparison() {
                (prec + 1, prec + 1)
            } else {
                (prec, prec + 1)
            };
            if wrap {
                write!(f, "(")?;
            }
            fmt_expr(lhs, lhs_prec, f)?;
            if *op == BinaryOp::Pow {
                write!(f, "{}", op.symbol())?;
            } else {
                write!(f, " {} ", op.symbol())?;
            }
            fmt_expr(rhs, rhs_prec, f)?;
            if wrap {
                write!(f, ")")?;
            }
            Ok(())
        }
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl Visitable for Expression {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.enter_expression(self);
        match self {
            Expression::Symbol(name) => visitor.visit_symbol(name),
            Expression::Unary { operand, .. } => operand.accept(visitor),
            Expression::Binary { lhs, rhs, .. } => {
                lhs.accept(visitor);
                rhs.accept(visitor);
            }
            Expression::Call { args, .. } => {
                for arg in args {
                    arg.accept(visitor);
                }
            }
            Expression::Number(_) | Expression::Bool(_) => {}
        }
        visitor.exit_expression(self);
    }
}

impl MutVisitable for Expression {
    fn accept_mut<V: MutVisitor + ?Sized>(&mut self, visitor: &mut V) {
        visitor.enter_expression(self);
        match self {
            Expression::Unary { operand, .. } => operand.accept_mut(visitor),
            Expression::Binary { lhs, rhs, .. } => {
                lhs.accept_mut(visitor);
                rhs.accept_mut(visitor);
            }
            Expression::Call { args, .. } => {
                for arg in args.iter_mut() {
                    arg.accept_mut(visitor);
                }
            }
            Expression::Number(_) | Expression::Bool(_) | Expression::Symbol(_) => {}
        }
        visitor.exit_expression(self);
    }
}

#[derive(Default)]
struct SymbolCollector {
    symbols: BTreeSet<String>,
}

impl Visitor for SymbolCollector {
    fn visit_symbol(&mut self, name: &str) {
        self.symbols.insert(name.to_string());
    }
}

struct SymbolFinder<'a> {
    name: &'a str,
    found: bool,
}

impl Visitor for SymbolFinder<'_> {
    fn visit_symbol(&mut self, name: &str) {
        self.found |= name == self.name;
    }
}

struct SymbolSubstituter<'a> {
    map: &'a HashMap<String, Expression>,
}

impl MutVisitor for SymbolSubstituter<'_> {
    // Substitutes on the way out so replacements are never re-visited.
    fn exit_expression(&mut self, node: &mut Expression) {
        if let Expression::Symbol(name) = node {
            if let Some(replacement) = self.map.get(name) {
                *node = replacement.clone();
            }
        }
    }
}

struct SymbolRenamer<'a> {
    map: &'a HashMap<String, String>,
}

impl MutVisitor for SymbolRenamer<'_> {
    fn exit_expression(&mut self, node: &mut Expression) {
        if let Expression::Symbol(name) = node {
            if let Some(new_name) = self.map.get(name.as_str()) {
                *name = new_name.clone();
            }
        }
    }
}
