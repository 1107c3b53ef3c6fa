//! Pratt parser for NineML math expressions.
//!
//! Precedence (loosest first): `||`, `&&`, comparisons, `+ -`, `* /`,
//! unary `-`, `^`. `!` binds looser than comparisons so `!a < b` reads as
//! `!(a < b)`. Comparisons do not chain.

use std::ops::Range;

use logos::Logos;

use super::lexer::Token;
use super::{BinaryOp, Expression, UnaryOp};
use crate::ir::error::ParseError;

const NEG_PREC: u8 = 55;
const NOT_PREC: u8 = 25;

/// Parse `source` into an expression.
pub fn parse(source: &str) -> Result<Expression, ParseError> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(source).spanned() {
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(ParseError::new(
                    format!("unexpected character '{}'", &source[span.clone()]),
                    span,
                    source,
                ))
            }
        }
    }
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    let expr = parser.parse_expr(0)?;
    if let Some((token, span)) = parser.tokens.get(parser.pos) {
        return Err(ParseError::new(
            format!("unexpected token '{token}'"),
            span.clone(),
            source,
        ));
    }
    Ok(expr)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
}

fn binary_op_info(token: &Token) -> Option<BinaryOp> {
    let op = match token {
        Token::Or => BinaryOp::Or,
        Token::And => BinaryOp::And,
        Token::Lt => BinaryOp::Lt,
        Token::LtEq => BinaryOp::Le,
        Token::Gt => BinaryOp::Gt,
        Token::GtEq => BinaryOp::Ge,
        Token::EqEq => BinaryOp::Eq,
        Token::BangEq => BinaryOp::Ne,
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Sub,
        Token::Star => BinaryOp::Mul,
        Token::Slash => BinaryOp::Div,
        Token::Caret => BinaryOp::Pow,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<(Token, Range<usize>)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn end_span(&self) -> Range<usize> {
        self.source.len()..self.source.len()
    }

    fn error_here(&self, message: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some((token, span)) => ParseError::new(
                format!("{message}, found '{token}'"),
                span.clone(),
                self.source,
            ),
            None => ParseError::new(
                format!("{message}, found end of input"),
                self.end_span(),
                self.source,
            ),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_here(&format!("expected '{expected}'")))
        }
    }

    fn parse_expr(&mut self, min_prec: u8) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_prefix()?;
        let mut bare_comparison = false;

        while let Some(op) = self.peek().and_then(binary_op_info) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            let op_span = self.tokens[self.pos].1.clone();
            self.pos += 1;
            let next_min = if op == BinaryOp::Pow { prec } else { prec + 1 };
            let rhs = self.parse_expr(next_min)?;
            if op.is_comparison() && bare_comparison {
                return Err(ParseError::new(
                    "comparison operators cannot be chained",
                    op_span,
                    self.source,
                ));
            }
            bare_comparison = op.is_comparison();
            lhs = Expression::binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expression, ParseError> {
        let Some((token, span)) = self.next() else {
            return Err(self.error_here("expected an expression"));
        };
        match token {
            Token::Number(n) => Ok(Expression::Number(n)),
            Token::True => Ok(Expression::Bool(true)),
            Token::False => Ok(Expression::Bool(false)),
            Token::Minus => {
                let operand = self.parse_expr(NEG_PREC)?;
                Ok(match operand {
                    Expression::Number(n) => Expression::Number(-n),
                    other => Expression::unary(UnaryOp::Neg, other),
                })
            }
            Token::Plus => self.parse_expr(NEG_PREC),
            Token::Bang => {
                let operand = self.parse_expr(NOT_PREC)?;
                Ok(Expression::unary(UnaryOp::Not, operand))
            }
            Token::LParen => {
                let inner = self.parse_expr(0)?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let args = self.parse_args()?;
                    Ok(Expression::Call { func: name, args })
                } else {
                    Ok(Expression::Symbol(name))
                }
            }
            other => Err(ParseError::new(
                format!("unexpected token '{other}'"),
                span,
                self.source,
            )),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr(0)?);
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RParen) => {
                    self.pos += 1;
                    return Ok(args);
                }
                _ => return Err(self.error_here("expected ',' or ')'")),
            }
        }
    }
}
