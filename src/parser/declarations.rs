//! Declaration parsing implementation
//!
//! This module handles parsing of top-level members of a Tod program:
//!
//! - Function declarations: `set? fn name(params) Type? { ... }`
//! - External functions: `external fn name(params) Type?`
//! - Struct declarations: `struct Name { field Type, ... }`
//! - Package directives: `package name`, `using name`
//! - Type clauses: `pkg::name[Sub, ...]`
//!
//! # Grammar
//!
//! ```text
//! member      ::= function | external | struct | package_ref | package_use | statement
//! function    ::= "set"? "fn" IDENT "(" params ")" type? block
//! external    ::= "external" "fn" IDENT "(" params ")" type? ";"?
//! struct      ::= "struct" IDENT "{" (param ("," param)* ","?)? "}"
//! params      ::= (param ("," param)*)?
//! param       ::= IDENT type
//! type        ::= (IDENT "::")? IDENT ("[" type ("," type)* "]")?
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{ParseError, Parser};
use crate::parser::token::TokenKind;

impl Parser {
    /// Parse a top-level member; anything that is not a declaration is a global statement
    pub(crate) fn parse_member(&mut self) -> Result<Member, ParseError> {
        match self.current().kind {
            TokenKind::Fn => self.parse_function_declaration(),
            TokenKind::Set if self.peek(1).kind == TokenKind::Fn => self.parse_function_declaration(),
            TokenKind::External => self.parse_external_function_declaration(),
            TokenKind::Struct => self.parse_struct_declaration(),
            TokenKind::Package => self.parse_package_reference(),
            TokenKind::Using => self.parse_package_use(),
            _ => Ok(Member::GlobalStatement {
                statement: self.parse_statement()?,
            }),
        }
    }

    /// Parse function declaration: set? fn name(params) Type? { body }
    pub(crate) fn parse_function_declaration(&mut self) -> Result<Member, ParseError> {
        let public = self.eat(TokenKind::Set).map(|t| t.span);
        let keyword = self.consume(TokenKind::Fn)?.span;
        let name = Ident::from(&self.consume(TokenKind::Ident)?);

        self.consume(TokenKind::LParen)?;
        let parameters = self.parse_parameter_list()?;
        self.consume(TokenKind::RParen)?;

        let return_type = self.parse_optional_type_clause()?;
        let body = self.parse_block_statement()?;

        Ok(Member::Function {
            public,
            keyword,
            name,
            parameters,
            return_type,
            body,
        })
    }

    /// Parse external function declaration: external fn name(params) Type?
    pub(crate) fn parse_external_function_declaration(&mut self) -> Result<Member, ParseError> {
        let keyword = self.consume(TokenKind::External)?.span;
        self.consume(TokenKind::Fn)?;
        let name = Ident::from(&self.consume(TokenKind::Ident)?);

        self.consume(TokenKind::LParen)?;
        let parameters = self.parse_parameter_list()?;
        let close = self.consume(TokenKind::RParen)?.span;

        let return_type = self.parse_optional_type_clause()?;
        self.eat(TokenKind::Semicolon);

        Ok(Member::ExternalFunction {
            keyword,
            name,
            parameters,
            return_type,
            close,
        })
    }

    /// Parse struct declaration: struct Name { field Type, ... }
    pub(crate) fn parse_struct_declaration(&mut self) -> Result<Member, ParseError> {
        let keyword = self.consume(TokenKind::Struct)?.span;
        let name = Ident::from(&self.consume(TokenKind::Ident)?);

        self.consume(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            fields.push(self.parse_parameter()?);

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let close = self.consume(TokenKind::RBrace)?.span;
        self.eat(TokenKind::Semicolon);

        Ok(Member::Struct {
            keyword,
            name,
            fields,
            close,
        })
    }

    /// Parse package reference: package name
    pub(crate) fn parse_package_reference(&mut self) -> Result<Member, ParseError> {
        let keyword = self.consume(TokenKind::Package)?.span;
        let name = Ident::from(&self.consume(TokenKind::Ident)?);
        self.eat(TokenKind::Semicolon);

        Ok(Member::PackageReference { keyword, name })
    }

    /// Parse package use: using name
    pub(crate) fn parse_package_use(&mut self) -> Result<Member, ParseError> {
        let keyword = self.consume(TokenKind::Using)?.span;
        let name = Ident::from(&self.consume(TokenKind::Ident)?);
        self.eat(TokenKind::Semicolon);

        Ok(Member::PackageUse { keyword, name })
    }

    /// Parse parameter list up to (not including) the closing parenthesis
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>, ParseError> {
        let mut parameters = Vec::new();

        if self.check(TokenKind::RParen) {
            return Ok(parameters);
        }

        loop {
            parameters.push(self.parse_parameter()?);

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        Ok(parameters)
    }

    /// Parse `name Type`
    pub(crate) fn parse_parameter(&mut self) -> Result<Parameter, ParseError> {
        let name = Ident::from(&self.consume(TokenKind::Ident)?);
        let type_clause = self.parse_type_clause()?;
        Ok(Parameter { name, type_clause })
    }

    /// Parse a type clause if one starts here
    pub(crate) fn parse_optional_type_clause(&mut self) -> Result<Option<TypeClause>, ParseError> {
        if !self.check(TokenKind::Ident) {
            return Ok(None);
        }
        self.parse_type_clause().map(Some)
    }

    /// Parse type clause: (pkg ::)? name ([Type, ...])?
    pub(crate) fn parse_type_clause(&mut self) -> Result<TypeClause, ParseError> {
        let package = if self.peek(1).kind == TokenKind::PathSep {
            let package = Ident::from(&self.consume(TokenKind::Ident)?);
            self.consume(TokenKind::PathSep)?;
            Some(package)
        } else {
            None
        };

        let name = Ident::from(&self.consume(TokenKind::Ident)?);

        let mut sub_types = Vec::new();
        let mut close = None;

        if self.eat(TokenKind::LBrack).is_some() {
            loop {
                sub_types.push(self.parse_type_clause()?);

                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            close = Some(self.consume(TokenKind::RBrack)?.span);
        }

        Ok(TypeClause {
            package,
            name,
            sub_types,
            close,
        })
    }
}
