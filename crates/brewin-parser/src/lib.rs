//! Brewin parser: converts a token stream into an AST.

mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser, MAX_BLOCK_DEPTH, MAX_EXPR_DEPTH, MAX_OPERATOR_CHAIN};
