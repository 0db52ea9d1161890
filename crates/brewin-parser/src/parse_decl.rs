//! Top-level declarations: the program, functions and parameter lists.

use crate::parser::Parser;
use brewin_lexer::token::TokenKind;
use brewin_types::ast::*;
use brewin_types::ErrorCode;
use std::rc::Rc;

impl<'src> Parser<'src> {
    /// `Program = { FunctionDecl }`
    pub(crate) fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let mut functions = Vec::new();
        while !self.at_end() && !self.too_many_errors() {
            if !self.check(&TokenKind::Func) {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected 'func', got '{}'", self.peek_kind()),
                );
                self.advance();
                self.synchronize_to_function();
                continue;
            }
            match self.parse_function() {
                Some(function) => functions.push(Rc::new(function)),
                None => {
                    if !self.check(&TokenKind::Func) {
                        self.advance();
                    }
                    self.synchronize_to_function();
                }
            }
        }
        let span = start.merge(self.previous_span());
        Program { functions, span }
    }

    /// `FunctionDecl = "func" Identifier "(" [ ParamList ] ")" Block`
    fn parse_function(&mut self) -> Option<FunctionDecl> {
        let start = self.current_span();
        self.expect(&TokenKind::Func)?;
        let name = self.expect_identifier()?;
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Some(FunctionDecl {
            name,
            params,
            body,
            span,
        })
    }

    /// `"(" [ Param { "," Param } ] ")"` where `Param = [ "ref" ] Identifier`.
    pub(crate) fn parse_param_list(&mut self) -> Option<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params: Vec<Param> = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Some(params);
        }
        loop {
            let start = self.current_span();
            let mode = if self.eat(&TokenKind::Ref) {
                ParamMode::ByRef
            } else {
                ParamMode::ByValue
            };
            let name = self.expect_identifier()?;
            if params.iter().any(|p| p.name.name == name.name) {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("duplicate parameter '{}'", name.name),
                    name.span,
                );
            }
            let span = start.merge(name.span);
            params.push(Param { name, mode, span });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(params)
    }
}
