//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 6. `||`
//! 5. `&&`
//! 4. `==`, `!=`, `<`, `<=`, `>`, `>=`
//! 3. `+`, `-`
//! 2. `*`, `/`
//! 1. unary `-`, `!`
//!
//! Every binary level is left-associative.

use brewin_lexer::token::TokenKind;
use brewin_types::ast::*;
use brewin_types::ErrorCode;
use std::rc::Rc;

use crate::parser::{Parser, MAX_EXPR_DEPTH, MAX_OPERATOR_CHAIN};

impl<'src> Parser<'src> {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.nested(Self::parse_or)
    }

    /// Run `parse` one nesting level deeper, reporting E106 past the limit.
    fn nested(&mut self, parse: fn(&mut Self) -> Option<Expr>) -> Option<Expr> {
        if self.expr_depth >= MAX_EXPR_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("maximum expression nesting depth is {MAX_EXPR_DEPTH}"),
            );
            return None;
        }
        self.expr_depth += 1;
        let result = parse(self);
        self.expr_depth -= 1;
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse one left-associative binary level: `operand { op operand }`.
    fn parse_binary_level(
        &mut self,
        operand: fn(&mut Self) -> Option<Expr>,
        match_op: fn(&TokenKind) -> Option<BinOp>,
    ) -> Option<Expr> {
        let mut left = operand(self)?;
        let mut chain = 0;
        while let Some(op) = match_op(self.peek_kind()) {
            if chain == MAX_OPERATOR_CHAIN {
                self.error_at_current(
                    ErrorCode::NESTING_LIMIT_EXCEEDED,
                    format!("maximum operator chain length is {MAX_OPERATOR_CHAIN}"),
                );
                return None;
            }
            chain += 1;
            self.advance();
            let right = operand(self)?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Some(left)
    }

    fn parse_or(&mut self) -> Option<Expr> {
        self.parse_binary_level(Self::parse_and, |kind| match kind {
            TokenKind::OrOr => Some(BinOp::Or),
            _ => None,
        })
    }

    fn parse_and(&mut self) -> Option<Expr> {
        self.parse_binary_level(Self::parse_comparison, |kind| match kind {
            TokenKind::AndAnd => Some(BinOp::And),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> Option<Expr> {
        self.parse_binary_level(Self::parse_add, |kind| match kind {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::NotEq),
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::LessEq => Some(BinOp::LessEq),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            _ => None,
        })
    }

    fn parse_add(&mut self) -> Option<Expr> {
        self.parse_binary_level(Self::parse_mul, |kind| match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn parse_mul(&mut self) -> Option<Expr> {
        self.parse_binary_level(Self::parse_unary, |kind| match kind {
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            _ => None,
        })
    }

    /// `UnaryExpr = ( "-" | "!" ) UnaryExpr | PrimaryExpr`
    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let start = self.advance().span;
        let operand = self.nested(Self::parse_unary)?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let kind = match self.peek_kind().clone() {
            TokenKind::IntLit(n) => ExprKind::IntLit(n),
            TokenKind::StringLit(s) => ExprKind::StringLit(s),
            TokenKind::True => ExprKind::BoolLit(true),
            TokenKind::False => ExprKind::BoolLit(false),
            TokenKind::Nil => ExprKind::NilLit,

            TokenKind::LParen => {
                self.advance(); // eat `(`
                let mut inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                inner.span = start.merge(self.previous_span());
                return Some(inner);
            }

            TokenKind::Lambda => return self.parse_lambda(),

            TokenKind::Identifier(name) => {
                if *self.look_ahead(1) == TokenKind::LParen {
                    let call = self.parse_call()?;
                    let span = call.span;
                    return Some(Expr::new(ExprKind::Call(call), span));
                }
                ExprKind::Variable(name)
            }

            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                );
                return None;
            }
        };
        self.advance();
        Some(Expr::new(kind, start))
    }

    /// `Identifier "(" [ Expression { "," Expression } ] ")"`
    pub(crate) fn parse_call(&mut self) -> Option<CallExpr> {
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let span = name.span.merge(self.previous_span());
        Some(CallExpr { name, args, span })
    }

    /// `"lambda" "(" [ ParamList ] ")" Block`
    fn parse_lambda(&mut self) -> Option<Expr> {
        let start = self.advance().span; // eat `lambda`
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Some(Expr::new(
            ExprKind::Lambda(Rc::new(LambdaExpr { params, body, span })),
            span,
        ))
    }
}
