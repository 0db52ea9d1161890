//! Core Brewin lexer: converts source text to a token stream.
//!
//! - Whitespace (including newlines) separates tokens; statements end with `;`
//! - Single-line comments stripped (`//`)
//! - Block comments rejected (`/* */`) with error E107
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use brewin_types::{BrewinError, CompileErrors, ErrorCode, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The Brewin lexer.
pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Consume the next byte when it equals `expected`.
    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn text_from(&self, start: usize) -> &'src str {
        std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("")
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.push_error(self.make_error(code, message, span));
    }

    fn make_error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> BrewinError {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        BrewinError::new(&self.source_file.name, code, message, span, source_line)
    }

    fn push_error(&mut self, error: BrewinError) {
        self.errors.push_error(error);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace, line comments and (rejected) block comments.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.advance();
                }
                (Some(b'/'), Some(b'/')) => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.advance();
                    }
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start_line = self.line;
        let start_col = self.col;
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                None => break,
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }
        let span = self.span_from(start_line, start_col);
        let err = self
            .make_error(
                ErrorCode::BLOCK_COMMENT_USED,
                "Only single-line comments (//) are supported",
                span,
            )
            .with_suggestion("Replace /* ... */ with // on each line");
        self.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            if self.errors.is_full() || self.pos >= self.source.len() {
                return Token::new(TokenKind::Eof, self.current_span());
            }

            let start = self.pos;
            let start_line = self.line;
            let start_col = self.col;
            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, self.current_span());
            };

            let kind = match ch {
                b'"' => self.scan_string(start_line, start_col),
                b'0'..=b'9' => self.scan_int(start, start_line, start_col),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start),

                b'+' => TokenKind::Plus,
                b'-' => TokenKind::Minus,
                b'*' => TokenKind::Star,
                b'/' => TokenKind::Slash,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b'{' => TokenKind::LBrace,
                b'}' => TokenKind::RBrace,
                b',' => TokenKind::Comma,
                b';' => TokenKind::Semicolon,

                b'=' if self.eat(b'=') => TokenKind::EqEq,
                b'=' => TokenKind::Eq,
                b'!' if self.eat(b'=') => TokenKind::BangEq,
                b'!' => TokenKind::Bang,
                b'<' if self.eat(b'=') => TokenKind::LessEq,
                b'<' => TokenKind::Less,
                b'>' if self.eat(b'=') => TokenKind::GreaterEq,
                b'>' => TokenKind::Greater,
                b'&' if self.eat(b'&') => TokenKind::AndAnd,
                b'|' if self.eat(b'|') => TokenKind::OrOr,

                b'&' | b'|' => {
                    let span = self.span_from(start_line, start_col);
                    let op = ch as char;
                    let err = self
                        .make_error(
                            ErrorCode::UNEXPECTED_CHARACTER,
                            format!("Unexpected character '{op}'"),
                            span,
                        )
                        .with_suggestion(format!("Use '{op}{op}' for the logical operator"));
                    self.push_error(err);
                    continue;
                }

                _ => {
                    // Skip the rest of a multi-byte character so the message shows it whole.
                    while matches!(self.peek(), Some(0x80..=0xBF)) {
                        self.advance();
                    }
                    let span = self.span_from(start_line, start_col);
                    let text = self.text_from(start);
                    self.emit_error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("Unexpected character '{text}'"),
                        span,
                    );
                    continue;
                }
            };

            return Token::new(kind, self.span_from(start_line, start_col));
        }
    }

    fn scan_int(&mut self, start: usize, start_line: u32, start_col: u32) -> TokenKind {
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        let text = self.text_from(start);
        match text.parse::<i64>() {
            Ok(value) => TokenKind::IntLit(value),
            Err(_) => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INTEGER_OUT_OF_RANGE,
                    format!("Integer literal '{text}' does not fit in 64 bits"),
                    span,
                );
                TokenKind::IntLit(0)
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.text_from(start);
        TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }

    /// Scan a string literal starting after the opening `"`.
    fn scan_string(&mut self, start_line: u32, start_col: u32) -> TokenKind {
        let mut buf = Vec::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "Unterminated string literal",
                        span,
                    );
                    break;
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some(ch) => {
                    self.advance();
                    buf.push(ch);
                }
            }
        }
        TokenKind::StringLit(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Scan an escape sequence at the current `\`.
    /// Returns the unescaped byte, or `None` at end of file (error emitted).
    fn scan_escape_sequence(&mut self) -> Option<u8> {
        let start_line = self.line;
        let start_col = self.col;
        self.advance();

        match self.peek() {
            Some(b'"') => self.advance().map(|_| b'"'),
            Some(b'\\') => self.advance().map(|_| b'\\'),
            Some(b'n') => self.advance().map(|_| b'\n'),
            Some(b't') => self.advance().map(|_| b'\t'),
            Some(b'r') => self.advance().map(|_| b'\r'),
            Some(b'\n') | None => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::UNTERMINATED_STRING,
                    "Unexpected end of line in escape sequence",
                    span,
                );
                None
            }
            Some(ch) => {
                self.advance();
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_ESCAPE,
                    format!("Invalid escape sequence '\\{}'", ch as char),
                    span,
                );
                Some(ch)
            }
        }
    }
}
