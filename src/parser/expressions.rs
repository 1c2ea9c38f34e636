//! Expression parsing implementation
//!
//! This module handles parsing of all Tod expressions using precedence climbing:
//!
//! - Assignments and variable edits: `x = v`, `x += v`, `x++`
//! - Binary operators, lowest to highest: `| ^`, `&`, comparisons and shifts,
//!   `+ -`, `* / %`
//! - Unary operators: `+ - !` (bind tighter than any binary operator)
//! - Postfix indexing: `a[i]`, `a[i] = v`
//! - Primaries: literals, names, calls, package calls, type calls, field
//!   access, references, dereferences, `make`, `this`
//! - Program-scope access: `main name`, `main f(args)`, `main name = v`
//!
//! # Ambiguous brackets
//!
//! `name[...]` is either a cast to a parametric type (`array[int](x)`) or an
//! index into `name` (`arr[0]`, `arr[0] = v`). The parser saves a checkpoint,
//! tries to read a type clause, and commits to the cast only when the clause
//! is well formed and directly followed by `(`. Otherwise it restores the
//! checkpoint and parses the same tokens as an array access. A package
//! qualified clause (`io::array[int](x)`) gets the same treatment before
//! falling back to a package call.
//!
//! # `main`
//!
//! `main` is only a keyword when another identifier follows it on the same
//! line, so `fn main()` and a variable called `main` still parse as names.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{ParseError, Parser};
use crate::parser::token::{TokenKind, MAIN_QUALIFIER};

impl Parser {
    /// Parse expression (entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        if self.check(TokenKind::Ident) {
            let next = self.peek(1).kind;
            let spaced = self.peek(1).space_after;

            match next {
                TokenKind::Assign => return self.parse_assignment_expression(),
                TokenKind::AddAssign
                | TokenKind::SubAssign
                | TokenKind::MulAssign
                | TokenKind::QuoAssign
                | TokenKind::RemAssign => return self.parse_variable_editor_expression(),
                TokenKind::Add | TokenKind::Sub if !spaced && self.peek(2).kind == next => {
                    return self.parse_single_step_editor();
                }
                _ => {}
            }
        }

        self.parse_binary_expression(0)
    }

    /// Parse assignment: name = value
    fn parse_assignment_expression(&mut self) -> Result<Expression, ParseError> {
        let target = Ident::from(&self.consume(TokenKind::Ident)?);
        self.consume(TokenKind::Assign)?;
        let value = Box::new(self.parse_expression()?);

        Ok(Expression::Assignment { target, value })
    }

    /// Parse compound edit: name op= value
    fn parse_variable_editor_expression(&mut self) -> Result<Expression, ParseError> {
        let target = Ident::from(&self.consume(TokenKind::Ident)?);
        let operator = Operator::from(&self.advance());
        let value = Box::new(self.parse_expression()?);

        Ok(Expression::VariableEditor {
            target,
            operator,
            value: Some(value),
        })
    }

    /// Parse `name++` / `name--`, written as two adjacent `+` or `-` tokens
    fn parse_single_step_editor(&mut self) -> Result<Expression, ParseError> {
        let target = Ident::from(&self.consume(TokenKind::Ident)?);
        let first = self.advance();
        let second = self.consume(first.kind)?;

        Ok(Expression::VariableEditor {
            target,
            operator: Operator {
                kind: first.kind,
                span: first.span.to(second.span),
            },
            value: None,
        })
    }

    /// Precedence climbing over unary and binary operators
    pub(crate) fn parse_binary_expression(&mut self, parent: u8) -> Result<Expression, ParseError> {
        let unary = self.current().kind.unary_precedence();

        let mut left = if unary != 0 && unary >= parent {
            let operator = Operator::from(&self.advance());
            let operand = self.parse_binary_expression(unary)?;
            Expression::Unary {
                operator,
                operand: Box::new(operand),
            }
        } else {
            self.parse_postfix_expression()?
        };

        loop {
            let precedence = self.current().kind.binary_precedence();
            if precedence == 0 || precedence <= parent {
                break;
            }

            let operator = Operator::from(&self.advance());
            let right = self.parse_binary_expression(precedence)?;

            left = Expression::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Primary expression followed by any number of `[index]` suffixes
    fn parse_postfix_expression(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_primary_expression()?;

        while self.check(TokenKind::LBrack) {
            expr = self.parse_array_suffix(expr)?;
            if matches!(expr, Expression::ArrayAssignment { .. }) {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse primary expression
    fn parse_primary_expression(&mut self) -> Result<Expression, ParseError> {
        let kind = self.current().kind;
        match kind {
            _ if kind.is_literal() => Ok(Expression::Literal {
                token: self.advance(),
            }),
            TokenKind::LParen => self.parse_parenthesized_expression(),
            TokenKind::This => Ok(Expression::This {
                keyword: self.advance().span,
            }),
            TokenKind::Make => self.parse_make_expression(),
            TokenKind::And => self.parse_reference_expression(),
            TokenKind::Mul => self.parse_dereference_expression(),
            TokenKind::Ident if self.at_main_qualifier() => self.parse_main_expression(),
            TokenKind::Ident => self.parse_name_or_call_expression(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_parenthesized_expression(&mut self) -> Result<Expression, ParseError> {
        let open = self.consume(TokenKind::LParen)?.span;
        let inner = Box::new(self.parse_expression()?);
        let close = self.consume(TokenKind::RParen)?.span;

        Ok(Expression::Parenthesized { open, inner, close })
    }

    /// Parse reference: &name
    fn parse_reference_expression(&mut self) -> Result<Expression, ParseError> {
        let ampersand = self.consume(TokenKind::And)?.span;
        let name = Ident::from(&self.consume(TokenKind::Ident)?);

        Ok(Expression::Reference { ampersand, name })
    }

    /// Parse dereference: *primary
    fn parse_dereference_expression(&mut self) -> Result<Expression, ParseError> {
        let star = self.consume(TokenKind::Mul)?.span;
        let operand = Box::new(self.parse_primary_expression()?);

        Ok(Expression::Dereference { star, operand })
    }

    /// `main` directly followed by an identifier on the same line
    fn at_main_qualifier(&self) -> bool {
        let keyword = self.current();
        let next = self.peek(1);
        keyword.literal == MAIN_QUALIFIER && next.is(TokenKind::Ident) && next.span.start_line == keyword.span.end_line
    }

    /// Parse `main name`, `main name(args)` or `main name = value`
    fn parse_main_expression(&mut self) -> Result<Expression, ParseError> {
        let keyword = self.consume(TokenKind::Ident)?.span;

        let inner = match self.peek(1).kind {
            TokenKind::LParen => self.parse_call_expression()?,
            TokenKind::Assign => self.parse_assignment_expression()?,
            _ => Expression::Name {
                name: Ident::from(&self.consume(TokenKind::Ident)?),
            },
        };

        Ok(Expression::Main {
            keyword,
            inner: Box::new(inner),
        })
    }

    /// Dispatch on the token after an identifier
    fn parse_name_or_call_expression(&mut self) -> Result<Expression, ParseError> {
        let next = self.peek(1).kind;
        match next {
            TokenKind::LParen => self.parse_call_expression(),
            TokenKind::PathSep if self.peek(3).is(TokenKind::LBrack) => self.parse_qualified_cast_or_package_call(),
            TokenKind::PathSep => self.parse_package_call_expression(),
            TokenKind::Period => self.parse_member_expression(),
            TokenKind::LBrack => self.parse_bracketed_name_expression(),
            _ => Ok(Expression::Name {
                name: Ident::from(&self.consume(TokenKind::Ident)?),
            }),
        }
    }

    /// Parse call: name(args)
    fn parse_call_expression(&mut self) -> Result<Expression, ParseError> {
        let callee = Ident::from(&self.consume(TokenKind::Ident)?);

        self.consume(TokenKind::LParen)?;
        let arguments = self.parse_arguments(TokenKind::RParen)?;
        let close = self.consume(TokenKind::RParen)?.span;

        Ok(Expression::Call {
            callee,
            cast_type: None,
            arguments,
            close,
        })
    }

    /// Parse package call: package::name(args)
    fn parse_package_call_expression(&mut self) -> Result<Expression, ParseError> {
        let package = Ident::from(&self.consume(TokenKind::Ident)?);
        self.consume(TokenKind::PathSep)?;
        let callee = Ident::from(&self.consume(TokenKind::Ident)?);

        self.consume(TokenKind::LParen)?;
        let arguments = self.parse_arguments(TokenKind::RParen)?;
        let close = self.consume(TokenKind::RParen)?.span;

        Ok(Expression::PackageCall {
            package,
            callee,
            arguments,
            close,
        })
    }

    /// Parse `receiver.name(args)`, `object.field` or `object.field = value`
    fn parse_member_expression(&mut self) -> Result<Expression, ParseError> {
        let object = Ident::from(&self.consume(TokenKind::Ident)?);
        self.consume(TokenKind::Period)?;
        let member = Ident::from(&self.consume(TokenKind::Ident)?);

        if self.eat(TokenKind::LParen).is_some() {
            let arguments = self.parse_arguments(TokenKind::RParen)?;
            let close = self.consume(TokenKind::RParen)?.span;

            return Ok(Expression::TypeCall {
                receiver: object,
                callee: member,
                arguments,
                close,
            });
        }

        if self.eat(TokenKind::Assign).is_some() {
            let value = Box::new(self.parse_expression()?);
            return Ok(Expression::FieldAssignment {
                object,
                field: member,
                value,
            });
        }

        Ok(Expression::FieldAccess {
            object,
            field: member,
        })
    }

    /// Parse `pkg::name[...]`: a qualified cast call, else a package call
    fn parse_qualified_cast_or_package_call(&mut self) -> Result<Expression, ParseError> {
        let checkpoint = self.checkpoint();
        if let Some(cast) = self.parse_cast_call()? {
            return Ok(cast);
        }

        self.restore(checkpoint);
        self.parse_package_call_expression()
    }

    /// Parse `name[...]`: a cast call when a type clause and `(` follow, else an index
    fn parse_bracketed_name_expression(&mut self) -> Result<Expression, ParseError> {
        let checkpoint = self.checkpoint();
        if let Some(cast) = self.parse_cast_call()? {
            return Ok(cast);
        }

        self.restore(checkpoint);

        let array = Expression::Name {
            name: Ident::from(&self.consume(TokenKind::Ident)?),
        };
        self.parse_array_suffix(array)
    }

    /// A type clause directly followed by a parenthesized argument list.
    ///
    /// `Ok(None)` leaves the cursor wherever the attempt stopped; callers
    /// restore their checkpoint.
    fn parse_cast_call(&mut self) -> Result<Option<Expression>, ParseError> {
        let Some(cast_type) = self.parse_uncertain_type_clause() else {
            return Ok(None);
        };
        if self.eat(TokenKind::LParen).is_none() {
            return Ok(None);
        }
        log::trace!("'{}' parsed as a cast call", cast_type);

        let arguments = self.parse_arguments(TokenKind::RParen)?;
        let close = self.consume(TokenKind::RParen)?.span;

        Ok(Some(Expression::Call {
            callee: cast_type.name.clone(),
            cast_type: Some(cast_type),
            arguments,
            close,
        }))
    }

    /// Try to read a type clause without failing; `None` means "not a type"
    fn parse_uncertain_type_clause(&mut self) -> Option<TypeClause> {
        let package = if self.peek(1).kind == TokenKind::PathSep {
            let package = Ident::from(&self.eat(TokenKind::Ident)?);
            self.eat(TokenKind::PathSep)?;
            Some(package)
        } else {
            None
        };

        let name = Ident::from(&self.eat(TokenKind::Ident)?);

        let mut sub_types = Vec::new();
        let mut close = None;

        if self.eat(TokenKind::LBrack).is_some() {
            loop {
                if !self.check(TokenKind::Ident) {
                    return None;
                }
                sub_types.push(self.parse_uncertain_type_clause()?);

                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            close = Some(self.eat(TokenKind::RBrack)?.span);
        }

        Some(TypeClause {
            package,
            name,
            sub_types,
            close,
        })
    }

    /// Parse `[index]` or `[index] = value` after an already parsed expression
    fn parse_array_suffix(&mut self, array: Expression) -> Result<Expression, ParseError> {
        self.consume(TokenKind::LBrack)?;
        let index = Box::new(self.parse_expression()?);
        let close = self.consume(TokenKind::RBrack)?.span;

        if self.eat(TokenKind::Assign).is_some() {
            let value = Box::new(self.parse_expression()?);
            return Ok(Expression::ArrayAssignment {
                array: Box::new(array),
                index,
                value,
            });
        }

        Ok(Expression::ArrayAccess {
            array: Box::new(array),
            index,
            close,
        })
    }

    /// Parse make: object, struct, sized array or array literal construction
    fn parse_make_expression(&mut self) -> Result<Expression, ParseError> {
        let keyword = self.consume(TokenKind::Make)?.span;
        let type_clause = self.parse_type_clause()?;

        if type_clause.is_generic() {
            if self.eat(TokenKind::LBrace).is_some() {
                let elements = self.parse_arguments(TokenKind::RBrace)?;
                let close = self.consume(TokenKind::RBrace)?.span;
                return Ok(Expression::MakeArray {
                    keyword,
                    type_clause,
                    contents: ArrayContents::Literal(elements),
                    close,
                });
            }

            self.consume(TokenKind::LParen)?;
            let length = Box::new(self.parse_expression()?);
            let close = self.consume(TokenKind::RParen)?.span;
            return Ok(Expression::MakeArray {
                keyword,
                type_clause,
                contents: ArrayContents::Sized(length),
                close,
            });
        }

        if self.eat(TokenKind::LBrace).is_some() {
            let fields = self.parse_arguments(TokenKind::RBrace)?;
            let close = self.consume(TokenKind::RBrace)?.span;
            return Ok(Expression::MakeStruct {
                keyword,
                type_clause,
                fields,
                close,
            });
        }

        self.consume(TokenKind::LParen)?;
        let arguments = self.parse_arguments(TokenKind::RParen)?;
        let close = self.consume(TokenKind::RParen)?.span;

        Ok(Expression::Make {
            keyword,
            type_clause,
            arguments,
            close,
        })
    }

    /// Comma separated expressions up to (not including) `close`
    fn parse_arguments(&mut self, close: TokenKind) -> Result<Vec<Expression>, ParseError> {
        let mut arguments = Vec::new();

        while !self.check(close) && !self.is_at_end() {
            arguments.push(self.parse_expression()?);

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        Ok(arguments)
    }
}
