//! Indented tree dumps of syntax trees
//!
//! Used by `todc --ast` and by the symbol dump of the binder. Colors come from
//! `crossterm::style` and can be switched off for plain text output.

use super::ast::*;
use super::token::TokenKind;
use crossterm::style::Stylize;

pub struct TreePrinter {
    out: String,
    color: bool,
}

impl TreePrinter {
    pub fn new(color: bool) -> Self {
        Self {
            out: String::new(),
            color,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    /// Write one node line: `- Label detail`
    pub fn line(&mut self, depth: usize, label: &str, detail: &str) {
        self.out.push_str(&"  ".repeat(depth));
        self.out.push_str("- ");
        if self.color {
            self.out.push_str(&label.cyan().to_string());
        } else {
            self.out.push_str(label);
        }
        if !detail.is_empty() {
            self.out.push(' ');
            if self.color {
                self.out.push_str(&detail.yellow().to_string());
            } else {
                self.out.push_str(detail);
            }
        }
        self.out.push('\n');
    }

    pub fn members(&mut self, members: &[Member]) {
        for member in members {
            self.member(0, member);
        }
    }

    pub fn member(&mut self, depth: usize, member: &Member) {
        let kind = member.kind().as_str();
        match member {
            Member::GlobalStatement { statement } => {
                self.line(depth, kind, "");
                self.statement(depth + 1, statement);
            }
            Member::Function {
                public,
                name,
                parameters,
                return_type,
                body,
                ..
            } => {
                let visibility = if public.is_some() { "public " } else { "" };
                self.line(depth, kind, &format!("{}{}", visibility, name.name));
                self.parameters(depth + 1, parameters);
                if let Some(ty) = return_type {
                    self.type_clause(depth + 1, ty);
                }
                self.block(depth + 1, body);
            }
            Member::ExternalFunction {
                name,
                parameters,
                return_type,
                ..
            } => {
                self.line(depth, kind, &name.name);
                self.parameters(depth + 1, parameters);
                if let Some(ty) = return_type {
                    self.type_clause(depth + 1, ty);
                }
            }
            Member::Struct { name, fields, .. } => {
                self.line(depth, kind, &name.name);
                self.parameters(depth + 1, fields);
            }
            Member::PackageReference { name, .. } | Member::PackageUse { name, .. } => {
                self.line(depth, kind, &name.name);
            }
        }
    }

    fn parameters(&mut self, depth: usize, parameters: &[Parameter]) {
        for parameter in parameters {
            self.line(
                depth,
                NodeKind::Parameter.as_str(),
                &format!("{} {}", parameter.name.name, parameter.type_clause),
            );
        }
    }

    fn type_clause(&mut self, depth: usize, clause: &TypeClause) {
        self.line(depth, NodeKind::TypeClause.as_str(), &clause.to_string());
    }

    fn block(&mut self, depth: usize, block: &BlockStatement) {
        self.line(depth, NodeKind::BlockStatement.as_str(), "");
        for statement in &block.statements {
            self.statement(depth + 1, statement);
        }
    }

    fn variable_declaration(&mut self, depth: usize, decl: &VariableDeclaration) {
        let keyword = if decl.read_only { "set" } else { "var" };
        self.line(
            depth,
            NodeKind::VariableDeclaration.as_str(),
            &format!("{} {}", keyword, decl.name.name),
        );
        if let Some(ty) = &decl.type_clause {
            self.type_clause(depth + 1, ty);
        }
        if let Some(init) = &decl.initializer {
            self.expression(depth + 1, init);
        }
    }

    pub fn statement(&mut self, depth: usize, statement: &Statement) {
        let kind = statement.kind().as_str();
        match statement {
            Statement::Block(block) => self.block(depth, block),
            Statement::VariableDeclaration(decl) => self.variable_declaration(depth, decl),
            Statement::If {
                condition,
                then_branch,
                else_clause,
                ..
            } => {
                self.line(depth, kind, "");
                self.expression(depth + 1, condition);
                self.statement(depth + 1, then_branch);
                if let Some(clause) = else_clause {
                    self.line(depth + 1, NodeKind::ElseClause.as_str(), "");
                    self.statement(depth + 2, &clause.statement);
                }
            }
            Statement::Return { value, .. } => {
                self.line(depth, kind, "");
                if let Some(value) = value {
                    self.expression(depth + 1, value);
                }
            }
            Statement::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                self.line(depth, kind, "");
                self.variable_declaration(depth + 1, init);
                self.expression(depth + 1, condition);
                self.statement(depth + 1, step);
                self.statement(depth + 1, body);
            }
            Statement::While {
                condition, body, ..
            } => {
                self.line(depth, kind, "");
                self.expression(depth + 1, condition);
                self.statement(depth + 1, body);
            }
            Statement::Break { .. } | Statement::Continue { .. } => self.line(depth, kind, ""),
            Statement::Expression(expr) => {
                self.line(depth, kind, "");
                self.expression(depth + 1, expr);
            }
        }
    }

    pub fn expression(&mut self, depth: usize, expr: &Expression) {
        let kind = expr.kind().as_str();
        match expr {
            Expression::Literal { token } => self.line(depth, kind, &token.literal),
            Expression::Parenthesized { inner, .. } => {
                self.line(depth, kind, "");
                self.expression(depth + 1, inner);
            }
            Expression::Name { name } => self.line(depth, kind, &name.name),
            Expression::Assignment { target, value } => {
                self.line(depth, kind, &target.name);
                self.expression(depth + 1, value);
            }
            Expression::Call {
                callee,
                cast_type,
                arguments,
                ..
            } => {
                match cast_type {
                    Some(ty) => self.line(depth, kind, &format!("cast {}", ty)),
                    None => self.line(depth, kind, &callee.name),
                }
                self.expressions(depth + 1, arguments);
            }
            Expression::PackageCall {
                package,
                callee,
                arguments,
                ..
            } => {
                self.line(depth, kind, &format!("{}::{}", package.name, callee.name));
                self.expressions(depth + 1, arguments);
            }
            Expression::TypeCall {
                receiver,
                callee,
                arguments,
                ..
            } => {
                self.line(depth, kind, &format!("{}.{}", receiver.name, callee.name));
                self.expressions(depth + 1, arguments);
            }
            Expression::Unary { operator, operand } => {
                self.line(depth, kind, operator.kind.as_str());
                self.expression(depth + 1, operand);
            }
            Expression::Binary {
                left,
                operator,
                right,
            } => {
                self.line(depth, kind, operator.kind.as_str());
                self.expression(depth + 1, left);
                self.expression(depth + 1, right);
            }
            Expression::VariableEditor {
                target,
                operator,
                value,
            } => match value {
                Some(value) => {
                    self.line(depth, kind, &format!("{} {}", target.name, operator.kind));
                    self.expression(depth + 1, value);
                }
                None => {
                    let step = if operator.kind == TokenKind::Add {
                        "++"
                    } else {
                        "--"
                    };
                    self.line(depth, kind, &format!("{}{}", target.name, step));
                }
            },
            Expression::FieldAccess { object, field } => {
                self.line(depth, kind, &format!("{}.{}", object.name, field.name));
            }
            Expression::FieldAssignment {
                object,
                field,
                value,
            } => {
                self.line(depth, kind, &format!("{}.{}", object.name, field.name));
                self.expression(depth + 1, value);
            }
            Expression::ArrayAccess { array, index, .. } => {
                self.line(depth, kind, "");
                self.expression(depth + 1, array);
                self.expression(depth + 1, index);
            }
            Expression::ArrayAssignment {
                array,
                index,
                value,
            } => {
                self.line(depth, kind, "");
                self.expression(depth + 1, array);
                self.expression(depth + 1, index);
                self.expression(depth + 1, value);
            }
            Expression::Reference { name, .. } => self.line(depth, kind, &name.name),
            Expression::Dereference { operand, .. } => {
                self.line(depth, kind, "");
                self.expression(depth + 1, operand);
            }
            Expression::Make {
                type_clause,
                arguments,
                ..
            } => {
                self.line(depth, kind, &type_clause.to_string());
                self.expressions(depth + 1, arguments);
            }
            Expression::MakeArray {
                type_clause,
                contents,
                ..
            } => match contents {
                ArrayContents::Sized(length) => {
                    self.line(depth, kind, &format!("{} sized", type_clause));
                    self.expression(depth + 1, length);
                }
                ArrayContents::Literal(elements) => {
                    self.line(depth, kind, &format!("{} literal", type_clause));
                    self.expressions(depth + 1, elements);
                }
            },
            Expression::MakeStruct {
                type_clause,
                fields,
                ..
            } => {
                self.line(depth, kind, &type_clause.to_string());
                self.expressions(depth + 1, fields);
            }
            Expression::This { .. } => self.line(depth, kind, ""),
            Expression::Main { inner, .. } => {
                self.line(depth, kind, "");
                self.expression(depth + 1, inner);
            }
        }
    }

    fn expressions(&mut self, depth: usize, exprs: &[Expression]) {
        for expr in exprs {
            self.expression(depth, expr);
        }
    }
}

/// Render members as a plain or colored tree
pub fn print_members(members: &[Member], color: bool) -> String {
    let mut printer = TreePrinter::new(color);
    printer.members(members);
    printer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::parse::parse;
    use crate::source::FileId;

    #[test]
    fn test_print_function() {
        let tokens = tokenize("fn add(a int, b int) int { return a + b }", FileId(0), true).unwrap();
        let members = parse(tokens).unwrap();
        let text = print_members(&members, false);

        let expected = "\
- Function Declaration add
  - Parameter a int
  - Parameter b int
  - Type Clause int
  - Block Statement
    - Return Statement
      - Binary Expression +
        - Name Expression a
        - Name Expression b
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_print_editor_and_cast() {
        let members = parse(tokenize("i++\narray[int](x)", FileId(0), true).unwrap()).unwrap();
        let text = print_members(&members, false);

        assert!(text.contains("- VariableEditor Expression i++"));
        assert!(text.contains("- Call Expression cast array[int]"));
    }

    #[test]
    fn test_print_main_expression() {
        let members = parse(tokenize("main report(1)", FileId(0), true).unwrap()).unwrap();
        let text = print_members(&members, false);

        assert!(text.contains("    - Main Expression\n      - Call Expression report\n"), "{}", text);
    }
}
