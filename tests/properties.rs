use proptest::prelude::*;

use nineml::ir::ast::is_reserved;
use nineml::ir::expr::{BinaryOp, Expression, UnaryOp};
use nineml::{append_namespace, split_namespace};

/// Identifiers with interior runs of one to four underscores.
fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,3}(_{1,4}[a-z0-9]{1,3}){0,3}"
}

fn symbol() -> impl Strategy<Value = Expression> {
    "[a-z][a-z0-9_]{0,4}[a-z0-9]"
        .prop_filter("reserved", |s| !is_reserved(s))
        .prop_map(Expression::symbol)
}

fn binary_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Add),
        Just(BinaryOp::Sub),
        Just(BinaryOp::Mul),
        Just(BinaryOp::Div),
        Just(BinaryOp::Pow),
        Just(BinaryOp::Lt),
        Just(BinaryOp::Ge),
        Just(BinaryOp::Eq),
        Just(BinaryOp::And),
        Just(BinaryOp::Or),
    ]
}

fn expression() -> impl Strategy<Value = Expression> {
    let leaf = prop_oneof![
        symbol(),
        (0u32..1000).prop_map(|n| Expression::number(f64::from(n) / 4.0)),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (binary_op(), inner.clone(), inner.clone())
                .prop_map(|(op, lhs, rhs)| Expression::binary(op, lhs, rhs)),
            // The parser folds a minus sign into a literal.
            inner
                .clone()
                .prop_filter("literal or double negation", |e| !matches!(
                    e,
                    Expression::Number(_) | Expression::Unary { op: UnaryOp::Neg, .. }
                ))
                .prop_map(|e| Expression::unary(UnaryOp::Neg, e)),
            (inner.clone(), inner).prop_map(|(a, b)| Expression::call("max", vec![a, b])),
        ]
    })
}

proptest! {
    #[test]
    fn namespace_round_trip(id in identifier(), ns in identifier()) {
        let flat = append_namespace(&id, &ns);
        prop_assert_eq!(split_namespace(&flat), Some((id, ns)));
    }

    #[test]
    fn nested_namespace_round_trip(id in identifier(), inner in identifier(), outer in identifier()) {
        let once = append_namespace(&id, &inner);
        let twice = append_namespace(&once, &outer);
        prop_assert_eq!(split_namespace(&twice), Some((once.clone(), outer)));
        prop_assert_eq!(split_namespace(&once), Some((id, inner)));
    }

    #[test]
    fn printed_expression_parses_back(expr in expression()) {
        let printed = expr.to_string();
        let parsed: Expression = printed.parse().unwrap();
        prop_assert_eq!(&parsed, &expr, "printed as {}", printed);
        prop_assert_eq!(parsed.to_string(), printed);
    }

    #[test]
    fn equivalence_ignores_operand_order(a in symbol(), b in symbol(), c in symbol()) {
        let forward = Expression::binary(
            BinaryOp::Add,
            Expression::binary(BinaryOp::Add, a.clone(), b.clone()),
            c.clone(),
        );
        let backward = Expression::binary(BinaryOp::Add, c, Expression::binary(BinaryOp::Add, b, a));
        prop_assert!(forward.equivalent(&backward));
    }
}
