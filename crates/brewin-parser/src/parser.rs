//! Core parser infrastructure: token cursor, error reporting, helpers.

use brewin_lexer::token::{Token, TokenKind};
use brewin_types::ast::{Ident, Program};
use brewin_types::{BrewinError, CompileErrors, ErrorCode, SourceFile, Span};

/// Deepest expression nesting accepted before reporting E106.
pub const MAX_EXPR_DEPTH: u32 = 64;

/// Deepest block nesting (bodies, branches, lambda bodies) accepted before
/// reporting E106.
pub const MAX_BLOCK_DEPTH: u32 = 128;

/// Longest run of same-precedence binary operators in one expression.
pub const MAX_OPERATOR_CHAIN: usize = 1024;

/// The Brewin parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and attempts recovery when possible.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    source_file: &'src SourceFile,
    errors: CompileErrors,
    /// Current expression nesting depth.
    pub(crate) expr_depth: u32,
    /// Current block nesting depth; an `else if` counts as one level.
    pub(crate) block_depth: u32,
}

/// Result of parsing.
pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(mut tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map_or(Span::point(1, 1), |t| t.span);
            tokens.push(Token::new(TokenKind::Eof, span));
        }
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
            expr_depth: 0,
            block_depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(1, 1),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect `;`, pointing the error just past the previous token.
    pub(crate) fn expect_semicolon(&mut self) -> Option<()> {
        if self.eat(&TokenKind::Semicolon) {
            return Some(());
        }
        let span = self.previous_span();
        let message = format!("expected ';', got '{}'", self.peek_kind());
        let error = self
            .make_error(ErrorCode::UNEXPECTED_TOKEN, message, span)
            .with_suggestion("Terminate the statement with ';'");
        self.errors.push_error(error);
        None
    }

    /// Expect an identifier token.
    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            kind if kind.is_keyword() => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("'{kind}' is a reserved word and cannot be used as a name"),
                );
                None
            }
            kind => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{kind}'"),
                );
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Report an error at the current token position.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at a specific span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let error = self.make_error(code, message, span);
        self.errors.push_error(error);
    }

    fn make_error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> BrewinError {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        BrewinError::new(&self.source_file.name, code, message, span, source_line)
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_full()
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until a statement boundary: just past `;`, or before `}`
    /// or a statement keyword.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::If
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Func
                | TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip a brace-balanced block starting at the current `{`.
    pub(crate) fn skip_block(&mut self) {
        let mut open = 0usize;
        while !self.at_end() {
            match self.advance().kind {
                TokenKind::LBrace => open += 1,
                TokenKind::RBrace => {
                    open = open.saturating_sub(1);
                    if open == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    /// Skip any `else` branches following an `if` whose body failed to parse.
    pub(crate) fn skip_else_branches(&mut self) {
        while self.eat(&TokenKind::Else) {
            while !self.at_end() && !self.check(&TokenKind::LBrace) {
                self.advance();
            }
            self.skip_block();
        }
    }

    /// Skip tokens until the next top-level `func`.
    pub(crate) fn synchronize_to_function(&mut self) {
        while !self.at_end() && !self.check(&TokenKind::Func) {
            self.advance();
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a `Program` AST.
    ///
    /// `program` is `None` whenever any error was reported.
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        let program = if self.errors.has_errors() {
            None
        } else {
            Some(program)
        };
        ParseResult {
            program,
            errors: self.errors,
        }
    }
}
