//! Statement parsing.

use crate::parser::{Parser, MAX_BLOCK_DEPTH};
use brewin_lexer::token::TokenKind;
use brewin_types::ast::*;
use brewin_types::{ErrorCode, Span};

impl<'src> Parser<'src> {
    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        if self.block_depth >= MAX_BLOCK_DEPTH && self.check(&TokenKind::LBrace) {
            self.error_at_current(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("maximum block nesting depth is {MAX_BLOCK_DEPTH}"),
            );
            self.skip_block();
            return None;
        }
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        self.block_depth += 1;
        let block = self.parse_block_body(start);
        self.block_depth -= 1;
        block
    }

    fn parse_block_body(&mut self, start: Span) -> Option<Block> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        if !self.check(&TokenKind::RBrace) {
            self.error_at(
                ErrorCode::UNCLOSED_DELIMITER,
                "unclosed '{'",
                start,
            );
            return None;
        }
        self.advance();
        let span = start.merge(self.previous_span());
        Some(Block { stmts, span })
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::If => self.parse_if_stmt().map(Stmt::If),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Identifier(_) if *self.look_ahead(1) == TokenKind::LParen => {
                let call = self.parse_call()?;
                self.expect_semicolon()?;
                Some(Stmt::Call(call))
            }
            TokenKind::Identifier(_) => self.parse_assign_stmt(),
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected statement, got '{}'", self.peek_kind()),
                );
                // Always make progress so recovery cannot loop on this token.
                self.advance();
                None
            }
        }
    }

    /// `name = expr;`
    fn parse_assign_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let target = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = start.merge(self.previous_span());
        self.expect_semicolon()?;
        Some(Stmt::Assign(AssignStmt {
            target,
            value,
            span,
        }))
    }

    /// `if (cond) { ... } [else { ... } | else if ...]`
    fn parse_if_stmt(&mut self) -> Option<IfStmt> {
        let start = self.current_span();
        self.advance(); // eat `if`
        let condition = self.parse_condition()?;
        let Some(then_block) = self.parse_block() else {
            self.skip_else_branches();
            return None;
        };
        let else_block = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(self.parse_else_if()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Some(IfStmt {
            condition,
            then_block,
            else_block,
            span,
        })
    }

    /// `else if ...`, wrapped in a block of its own.
    fn parse_else_if(&mut self) -> Option<Block> {
        self.block_depth += 1;
        let nested = self.parse_if_stmt();
        self.block_depth -= 1;
        let nested = nested?;
        let span = nested.span;
        Some(Block {
            stmts: vec![Stmt::If(nested)],
            span,
        })
    }

    /// `while (cond) { ... }`
    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `while`
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Some(Stmt::While(WhileStmt {
            condition,
            body,
            span,
        }))
    }

    /// `return;` or `return expr;`
    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `return`
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let span = start.merge(self.previous_span());
        self.expect_semicolon()?;
        Some(Stmt::Return(ReturnStmt { value, span }))
    }

    /// `"(" Expression ")"`
    fn parse_condition(&mut self) -> Option<Expr> {
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        Some(condition)
    }
}
