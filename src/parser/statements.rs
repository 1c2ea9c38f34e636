//! Statement parsing implementation
//!
//! This module handles parsing of all Tod statement types:
//!
//! - Variable declarations: `var int x = 42`, `set name = "tod"`
//! - Control flow: `if`, `while`, `for`
//! - Jump statements: `return`, `break`, `continue`
//! - Blocks: `{ ... }`
//! - Expression statements: calls, assignments, edits
//!
//! # Grammar
//!
//! ```text
//! statement ::= (var_decl | block | if_stmt | return_stmt | for_stmt
//!             | while_stmt | "break" | "continue" | expression) ";"?
//! var_decl  ::= ("var" | "set") type? IDENT ("=" expression)?
//! if_stmt   ::= "if" "(" expression ")" statement ("else" statement)?
//! for_stmt  ::= "for" "(" var_decl ";" expression ";" statement ")" statement
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{ParseError, Parser};
use crate::parser::token::TokenKind;

impl Parser {
    /// Parse a statement and its optional trailing semicolon
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let statement = match self.current().kind {
            TokenKind::Var | TokenKind::Set => {
                Statement::VariableDeclaration(self.parse_variable_declaration()?)
            }
            TokenKind::LBrace => Statement::Block(self.parse_block_statement()?),
            TokenKind::If => self.parse_if_statement()?,
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::For => self.parse_for_statement()?,
            TokenKind::While => self.parse_while_statement()?,
            TokenKind::Break => Statement::Break {
                keyword: self.advance().span,
            },
            TokenKind::Continue => Statement::Continue {
                keyword: self.advance().span,
            },
            _ => Statement::Expression(self.parse_expression()?),
        };

        self.eat(TokenKind::Semicolon);
        Ok(statement)
    }

    /// Parse block: { statements }
    pub(crate) fn parse_block_statement(&mut self) -> Result<BlockStatement, ParseError> {
        let open = self.consume(TokenKind::LBrace)?.span;

        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let start = self.position;

            statements.push(self.parse_statement()?);

            if self.position == start {
                self.position += 1;
            }
        }

        let close = self.consume(TokenKind::RBrace)?.span;

        Ok(BlockStatement {
            open,
            statements,
            close,
        })
    }

    /// Parse variable declaration: var|set Type? name (= value)?
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, ParseError> {
        let read_only = match self.current().kind {
            TokenKind::Var => false,
            TokenKind::Set => true,
            _ => return Err(self.unexpected("'var' or 'set'")),
        };
        let keyword = self.advance();

        // A type is present when the name is not the very next identifier
        let has_type = self.check(TokenKind::Ident)
            && matches!(
                self.peek(1).kind,
                TokenKind::Ident | TokenKind::LBrack | TokenKind::PathSep
            );
        let type_clause = if has_type {
            Some(self.parse_type_clause()?)
        } else {
            None
        };

        let name = Ident::from(&self.consume(TokenKind::Ident)?);

        let initializer = if self.eat(TokenKind::Assign).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(VariableDeclaration {
            keyword: keyword.span,
            read_only,
            type_clause,
            name,
            initializer,
        })
    }

    /// Parse if statement with optional else clause
    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.consume(TokenKind::If)?.span;

        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;

        let then_branch = Box::new(self.parse_statement()?);

        let else_clause = match self.eat(TokenKind::Else) {
            Some(else_kw) => Some(ElseClause {
                keyword: else_kw.span,
                statement: Box::new(self.parse_statement()?),
            }),
            None => None,
        };

        Ok(Statement::If {
            keyword,
            condition,
            then_branch,
            else_clause,
        })
    }

    /// Parse return statement; the value is absent before `;`, `}` or end of input
    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.consume(TokenKind::Return)?.span;

        let value = match self.current().kind {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => None,
            _ => Some(self.parse_expression()?),
        };

        Ok(Statement::Return { keyword, value })
    }

    /// Parse for statement: for (init; condition; step) body
    fn parse_for_statement(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.consume(TokenKind::For)?.span;

        self.consume(TokenKind::LParen)?;
        let init = Box::new(self.parse_variable_declaration()?);
        self.consume(TokenKind::Semicolon)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::Semicolon)?;
        let step = Box::new(self.parse_statement()?);
        self.consume(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);

        Ok(Statement::For {
            keyword,
            init,
            condition,
            step,
            body,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.consume(TokenKind::While)?.span;

        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);

        Ok(Statement::While {
            keyword,
            condition,
            body,
        })
    }
}
