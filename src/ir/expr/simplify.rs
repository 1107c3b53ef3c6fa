//! Folding constructors and canonical ordering.
//!
//! The constructors (`add`, `sub`, ...) fold constants and drop identity
//! operands as they build, so the solver never produces `0 + 1 * x`.
//! `canonical` additionally sorts the operands of `+` and `*` chains and is
//! what `Expression::equivalent` compares.

use super::{BinaryOp, Expression, UnaryOp};

pub fn add(lhs: Expression, rhs: Expression) -> Expression {
    match (&lhs, &rhs) {
        (Expression::Number(a), Expression::Number(b)) => Expression::Number(a + b),
        _ if lhs.is_number(0.0) => rhs,
        _ if rhs.is_number(0.0) => lhs,
        (_, Expression::Unary {
            op: UnaryOp::Neg,
            operand,
        }) => sub(lhs.clone(), (**operand).clone()),
        _ => Expression::binary(BinaryOp::Add, lhs, rhs),
    }
}

pub fn sub(lhs: Expression, rhs: Expression) -> Expression {
    match (&lhs, &rhs) {
        (Expression::Number(a), Expression::Number(b)) => Expression::Number(a - b),
        _ if rhs.is_number(0.0) => lhs,
        _ if lhs.is_number(0.0) => neg(rhs),
        _ if lhs == rhs => Expression::Number(0.0),
        (_, Expression::Unary {
            op: UnaryOp::Neg,
            operand,
        }) => add(lhs.clone(), (**operand).clone()),
        _ => Expression::binary(BinaryOp::Sub, lhs, rhs),
    }
}

pub fn mul(lhs: Expression, rhs: Expression) -> Expression {
    match (&lhs, &rhs) {
        (Expression::Number(a), Expression::Number(b)) => Expression::Number(a * b),
        _ if lhs.is_number(0.0) || rhs.is_number(0.0) => Expression::Number(0.0),
        _ if lhs.is_number(1.0) => rhs,
        _ if rhs.is_number(1.0) => lhs,
        _ if lhs.is_number(-1.0) => neg(rhs),
        _ if rhs.is_number(-1.0) => neg(lhs),
        _ => Expression::binary(BinaryOp::Mul, lhs, rhs),
    }
}

pub fn div(lhs: Expression, rhs: Expression) -> Expression {
    match (&lhs, &rhs) {
        (Expression::Number(a), Expression::Number(b)) if *b != 0.0 => Expression::Number(a / b),
        _ if rhs.is_number(1.0) => lhs,
        _ if rhs.is_number(-1.0) => neg(lhs),
        _ if lhs.is_number(0.0) && !rhs.is_number(0.0) => Expression::Number(0.0),
        _ => Expression::binary(BinaryOp::Div, lhs, rhs),
    }
}

pub fn pow(base: Expression, exponent: Expression) -> Expression {
    match (&base, &exponent) {
        (Expression::Number(a), Expression::Number(b)) => Expression::Number(a.powf(*b)),
        _ if exponent.is_number(1.0) => base,
        _ if exponent.is_number(0.0) => Expression::Number(1.0),
        _ => Expression::binary(BinaryOp::Pow, base, exponent),
    }
}

pub fn neg(operand: Expression) -> Expression {
    match operand {
        Expression::Number(n) => Expression::Number(-n),
        Expression::Unary {
            op: UnaryOp::Neg,
            operand,
        } => *operand,
        Expression::Binary {
            op: BinaryOp::Sub,
            lhs,
            rhs,
        } => sub(*rhs, *lhs),
        other => Expression::unary(UnaryOp::Neg, other),
    }
}

fn not(operand: Expression) -> Expression {
    match operand {
        Expression::Bool(b) => Expression::Bool(!b),
        Expression::Unary {
            op: UnaryOp::Not,
            operand,
        } => *operand,
        other => Expression::unary(UnaryOp::Not, other),
    }
}

fn compare(op: BinaryOp, lhs: Expression, rhs: Expression) -> Expression {
    if let (Expression::Number(a), Expression::Number(b)) = (&lhs, &rhs) {
        let result = match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Le => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::Ge => a >= b,
            BinaryOp::Eq => a == b,
            _ => a != b,
        };
        return Expression::Bool(result);
    }
    Expression::binary(op, lhs, rhs)
}

fn logical(op: BinaryOp, lhs: Expression, rhs: Expression) -> Expression {
    match (op, &lhs, &rhs) {
        (BinaryOp::And, Expression::Bool(false), _) | (BinaryOp::And, _, Expression::Bool(false)) => {
            Expression::Bool(false)
        }
        (BinaryOp::Or, Expression::Bool(true), _) | (BinaryOp::Or, _, Expression::Bool(true)) => {
            Expression::Bool(true)
        }
        (_, Expression::Bool(_), _) => rhs,
        (_, _, Expression::Bool(_)) => lhs,
        _ => Expression::binary(op, lhs, rhs),
    }
}

/// Fold constants and remove identity operands bottom-up.
pub fn simplify(expr: &Expression) -> Expression {
    match expr {
        Expression::Number(_) | Expression::Bool(_) | Expression::Symbol(_) => expr.clone(),
        Expression::Unary { op, operand } => {
            let operand = simplify(operand);
            match op {
                UnaryOp::Neg => neg(operand),
                UnaryOp::Not => not(operand),
            }
        }
        Expression::Binary { op, lhs, rhs } => {
            let lhs = simplify(lhs);
            let rhs = simplify(rhs);
            match op {
                BinaryOp::Add => add(lhs, rhs),
                BinaryOp::Sub => sub(lhs, rhs),
                BinaryOp::Mul => mul(lhs, rhs),
                BinaryOp::Div => div(lhs, rhs),
                BinaryOp::Pow => pow(lhs, rhs),
                BinaryOp::And | BinaryOp::Or => logical(*op, lhs, rhs),
                cmp => compare(*cmp, lhs, rhs),
            }
        }
        Expression::Call { func, args } => {
            Expression::call(func.clone(), args.iter().map(simplify).collect())
        }
    }
}

/// Simplified form with the operands of associative chains sorted by their
/// printed form.
pub(super) fn canonical(expr: &Expression) -> Expression {
    sort_chains(&simplify(expr))
}

fn sort_chains(expr: &Expression) -> Expression {
    match expr {
        Expression::Binary { op, lhs, rhs } => match op {
            BinaryOp::Add | BinaryOp::Mul | BinaryOp::And | BinaryOp::Or => {
                let mut operands = Vec::new();
                flatten(*op, expr, &mut operands);
                let mut operands: Vec<Expression> = operands.into_iter().map(sort_chains).collect();
                operands.sort_by_cached_key(|e| e.to_string());
                let mut iter = operands.into_iter();
                match iter.next() {
                    Some(first) => iter.fold(first, |acc, e| Expression::binary(*op, acc, e)),
                    None => expr.clone(),
                }
            }
            _ => Expression::binary(*op, sort_chains(lhs), sort_chains(rhs)),
        },
        Expression::Unary { op, operand } => Expression::unary(*op, sort_chains(operand)),
        Expression::Call { func, args } => {
            Expression::call(func.clone(), args.iter().map(sort_chains).collect())
        }
        leaf => leaf.clone(),
    }
}

fn flatten<'a>(op: BinaryOp, expr: &'a Expression, out: &mut Vec<&'a Expression>) {
    match expr {
        Expression::Binary {
            op: inner,
            lhs,
            rhs,
        } if *inner == op => {
            flatten(op, lhs, out);
            flatten(op, rhs, out);
        }
        other => out.push(other),
    }
}
