//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, cursor helpers, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: top-level members, parameters, and type clauses
//! - `statements`: blocks, variable declarations, and control flow
//! - `expressions`: precedence climbing, primaries, and the ambiguous
//!   `name[...]` bracket
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! Any token mismatch is fatal: the error is returned through `Result` and the
//! whole parse stops. The only place the parser backs up is the speculative
//! type clause behind `name[`, which uses [`Parser::checkpoint`] and
//! [`Parser::restore`].

use crate::parser::ast::Member;
use crate::parser::token::{Token, TokenKind};
use crate::source::Span;
use thiserror::Error;

/// Fatal syntax error
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub found: TokenKind,
    pub expected: Option<TokenKind>,
}

/// Parse a complete token stream into its top-level members
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Member>, ParseError> {
    Parser::new(tokens).parse_members()
}

/// Saved cursor position for speculative parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint(usize);

/// Recursive descent parser for Tod
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Returned for any peek outside the stream
    eof: Token,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end = tokens
            .last()
            .map(|t| Span::point(t.span.file, t.span.end, t.span.end_line, t.span.end_column))
            .unwrap_or_default();

        Self {
            tokens,
            position: 0,
            eof: Token::eof(end),
        }
    }

    /// Parse the entire program (top-level members)
    pub fn parse_members(&mut self) -> Result<Vec<Member>, ParseError> {
        let mut members = Vec::new();

        while !self.is_at_end() {
            let start = self.position;

            let member = self.parse_member()?;
            log::debug!("parsed {} at {}:{}", member.kind(), member.span().start_line, member.span().start_column);
            members.push(member);

            // Never spin on a member that consumed nothing
            if self.position == start {
                self.position += 1;
            }
        }

        Ok(members)
    }

    // ===== Helper methods =====

    pub(crate) fn current(&self) -> &Token {
        self.peek(0)
    }

    /// Token at `offset` from the cursor; a synthetic EOF outside the stream
    pub(crate) fn peek(&self, offset: isize) -> &Token {
        self.position
            .checked_add_signed(offset)
            .and_then(|index| self.tokens.get(index))
            .unwrap_or(&self.eof)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Move past the current token and return it
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of the given kind or fail the parse
    pub(crate) fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }

        let found = self.current();
        let mut message = format!("unexpected {}, expected '{}'", found, kind);
        if found.kind.is_keyword() {
            message.push_str(&format!(" (identifier may be '{}')", found.literal));
        }

        Err(ParseError {
            message,
            span: found.span,
            found: found.kind,
            expected: Some(kind),
        })
    }

    /// Fail at the current token with a free-form description of what was wanted
    pub(crate) fn unexpected(&self, wanted: &str) -> ParseError {
        let found = self.current();
        ParseError {
            message: format!("unexpected {}, expected {}", found, wanted),
            span: found.span,
            found: found.kind,
            expected: None,
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.position)
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        log::trace!("rewinding parser from token {} to {}", self.position, checkpoint.0);
        self.position = checkpoint.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;
    use crate::source::FileId;

    fn parser(source: &str) -> Parser {
        Parser::new(tokenize(source, FileId(0), true).unwrap())
    }

    #[test]
    fn test_peek_outside_stream_is_eof() {
        let p = parser("a b");
        assert_eq!(p.peek(-1).kind, TokenKind::Eof);
        assert_eq!(p.peek(1).literal, "b");
        assert_eq!(p.peek(2).kind, TokenKind::Eof);
        assert_eq!(p.peek(100).kind, TokenKind::Eof);
    }

    #[test]
    fn test_consume_mismatch_reports_both_kinds() {
        let mut p = parser("fn");
        let err = p.consume(TokenKind::Ident).unwrap_err();

        assert_eq!(err.found, TokenKind::Fn);
        assert_eq!(err.expected, Some(TokenKind::Ident));
        assert!(err.message.contains("expected 'IDENT'"), "{}", err.message);
        assert!(err.message.contains("identifier may be 'fn'"), "{}", err.message);
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut p = parser("a b c");
        let saved = p.checkpoint();
        p.advance();
        p.advance();
        assert_eq!(p.current().literal, "c");

        p.restore(saved);
        assert_eq!(p.current().literal, "a");
    }

    #[test]
    fn test_advance_stops_at_eof() {
        let mut p = parser("x");
        p.advance();
        assert!(p.is_at_end());
        p.advance();
        assert!(p.is_at_end());
    }

    #[test]
    fn test_empty_stream() {
        assert!(parse(Vec::new()).unwrap().is_empty());
    }
}
