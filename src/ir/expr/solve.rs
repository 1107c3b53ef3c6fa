//! Solving equations that are linear in one variable.

use super::simplify::{add, div, mul, neg, sub};
use super::{BinaryOp, Expression, UnaryOp};

/// Solve `lhs == rhs` for `variable`.
///
/// Returns `None` when the equation is not linear in `variable` or when the
/// variable cancels out.
pub(super) fn solve_linear(lhs: &Expression, rhs: &Expression, variable: &str) -> Option<Expression> {
    let (a1, b1) = decompose(lhs, variable)?;
    let (a2, b2) = decompose(rhs, variable)?;
    let coefficient = sub(a1, a2);
    if coefficient.is_number(0.0) {
        return None;
    }
    let offset = sub(b1, b2);
    Some(div(neg(offset), coefficient))
}

/// Split `expr` into `(a, b)` such that `expr == a * variable + b` with
/// neither `a` nor `b` mentioning `variable`.
fn decompose(expr: &Expression, variable: &str) -> Option<(Expression, Expression)> {
    if !expr.contains_symbol(variable) {
        return Some((Expression::Number(0.0), expr.clone()));
    }
    match expr {
        Expression::Symbol(_) => Some((Expression::Number(1.0), Expression::Number(0.0))),
        Expression::Unary {
            op: UnaryOp::Neg,
            operand,
        } => {
            let (a, b) = decompose(operand, variable)?;
            Some((neg(a), neg(b)))
        }
        Expression::Binary { op, lhs, rhs } => {
            let (a1, b1) = decompose(lhs, variable)?;
            let (a2, b2) = decompose(rhs, variable)?;
            match op {
                BinaryOp::Add => Some((add(a1, a2), add(b1, b2))),
                BinaryOp::Sub => Some((sub(a1, a2), sub(b1, b2))),
                BinaryOp::Mul if a1.is_number(0.0) => Some((mul(b1.clone(), a2), mul(b1, b2))),
                BinaryOp::Mul if a2.is_number(0.0) => Some((mul(a1, b2.clone()), mul(b1, b2))),
                BinaryOp::Div if a2.is_number(0.0) => Some((div(a1, b2.clone()), div(b1, b2))),
                _ => None,
            }
        }
        _ => None,
    }
}
