//! Tod source code parser
//!
//! This module transforms Tod source text into an Abstract Syntax Tree (AST):
//! - [`token`]: Token kinds, decoded literal values, and the token record
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → members), split across `declarations`,
//!   `statements`, and `expressions`
//! - [`ast`]: AST node definitions
//! - [`tree`]: Indented tree dumps for diagnostics
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary
//! operators. A single syntax error aborts the parse; there is no recovery.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;
pub mod token;
pub mod tree;

pub use parse::{parse, ParseError, Parser};
