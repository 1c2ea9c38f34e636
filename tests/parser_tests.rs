// Integration tests for the Tod scanner and parser

use tod::parser::ast::{ArrayContents, Expression, Member, Statement};
use tod::parser::lexer::tokenize;
use tod::parser::parse;
use tod::parser::token::{TokenKind, TokenValue};
use tod::source::{FileId, Span};

fn parse_source(source: &str) -> Vec<Member> {
    let tokens = tokenize(source, FileId(0), true).expect("Tokenizing failed");
    parse(tokens).expect("Parsing failed")
}

/// The single expression of a one-statement program
fn expression(source: &str) -> Expression {
    let mut members = parse_source(source);
    assert_eq!(members.len(), 1, "Expected one member in {:?}", source);
    match members.remove(0) {
        Member::GlobalStatement {
            statement: Statement::Expression(expr),
        } => expr,
        other => panic!("Expected expression statement, got {:?}", other),
    }
}

fn int(expr: &Expression) -> i64 {
    match expr.literal_value() {
        Some(TokenValue::Int(value)) => *value,
        other => panic!("Expected int literal, got {:?}", other),
    }
}

/// Every child expression lies inside its parent
fn assert_spans_nest(expr: &Expression) {
    let parent = expr.span();
    let children: Vec<&Expression> = match expr {
        Expression::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        Expression::Unary { operand, .. } | Expression::Dereference { operand, .. } => vec![operand.as_ref()],
        Expression::Parenthesized { inner, .. } => vec![inner.as_ref()],
        Expression::Call { arguments, .. } => arguments.iter().collect(),
        Expression::ArrayAccess { array, index, .. } => vec![array.as_ref(), index.as_ref()],
        Expression::ArrayAssignment { array, index, value } => {
            vec![array.as_ref(), index.as_ref(), value.as_ref()]
        }
        Expression::Assignment { value, .. } => vec![value.as_ref()],
        _ => Vec::new(),
    };

    for child in children {
        assert!(
            parent.contains(&child.span()),
            "{:?} does not contain {:?}",
            parent,
            child.span()
        );
        assert_spans_nest(child);
    }
}

#[test]
fn test_precedence() {
    let expr = expression("1 + 2 * 3");

    let Expression::Binary { left, operator, right } = &expr else {
        panic!("Expected binary expression");
    };
    assert_eq!(operator.kind, TokenKind::Add);
    assert_eq!(int(left), 1);

    let Expression::Binary { left, operator, right } = right.as_ref() else {
        panic!("Expected nested binary expression");
    };
    assert_eq!(operator.kind, TokenKind::Mul);
    assert_eq!((int(left), int(right)), (2, 3));
}

#[test]
fn test_left_associativity() {
    let expr = expression("10 - 4 - 3");

    let Expression::Binary { left, right, .. } = &expr else {
        panic!("Expected binary expression");
    };
    assert!(matches!(left.as_ref(), Expression::Binary { .. }));
    assert_eq!(int(right), 3);
}

#[test]
fn test_unary_binds_tighter_than_binary() {
    let expr = expression("-1 * 2");

    let Expression::Binary { left, operator, right } = &expr else {
        panic!("Expected binary expression");
    };
    assert_eq!(operator.kind, TokenKind::Mul);
    assert!(matches!(
        left.as_ref(),
        Expression::Unary { operator, .. } if operator.kind == TokenKind::Sub
    ));
    assert_eq!(int(right), 2);
}

#[test]
fn test_spans_nest() {
    for source in [
        "1 + 2 * 3",
        "-(a + b) * *p",
        "f(1, g(2) + 3, x[4])",
        "grid[1][2] = value * 2",
        "total = (1 + 2) << 3",
    ] {
        assert_spans_nest(&expression(source));
    }
}

#[test]
fn test_binary_span_covers_operands() {
    let expr = expression("alpha + beta");
    let span = expr.span();
    assert_eq!((span.start, span.end), (0, 12));
    assert_eq!((span.start_column, span.end_column), (1, 13));
}

#[test]
fn test_bracket_as_cast() {
    let expr = expression("array[int](x)");

    let Expression::Call {
        callee,
        cast_type: Some(cast),
        arguments,
        ..
    } = &expr
    else {
        panic!("Expected cast call, got {:?}", expr);
    };
    assert_eq!(callee.name, "array");
    assert_eq!(cast.to_string(), "array[int]");
    assert_eq!(arguments.len(), 1);
}

#[test]
fn test_bracket_as_array_access() {
    let expr = expression("arr[0]");

    let Expression::ArrayAccess { array, index, .. } = &expr else {
        panic!("Expected array access, got {:?}", expr);
    };
    assert!(matches!(array.as_ref(), Expression::Name { name } if name.name == "arr"));
    assert_eq!(int(index), 0);
}

#[test]
fn test_bracket_as_array_assignment() {
    let expr = expression("arr[i + 1] = v");

    let Expression::ArrayAssignment { index, value, .. } = &expr else {
        panic!("Expected array assignment, got {:?}", expr);
    };
    assert!(matches!(index.as_ref(), Expression::Binary { .. }));
    assert!(matches!(value.as_ref(), Expression::Name { name } if name.name == "v"));
}

#[test]
fn test_bracket_with_type_then_no_call_is_access() {
    // `int` parses as a type but no `(` follows, so this is an access
    let expr = expression("table[int]");
    assert!(matches!(expr, Expression::ArrayAccess { .. }));
}

#[test]
fn test_make_forms() {
    let members = parse_source(
        "var a = make array[int](10)\nvar b = make array[int]{1, 2, 3}\nvar c = make Point{1, 2}",
    );

    let initializers: Vec<&Expression> = members
        .iter()
        .map(|m| match m {
            Member::GlobalStatement {
                statement: Statement::VariableDeclaration(decl),
            } => decl.initializer.as_ref().expect("Expected initializer"),
            other => panic!("Expected variable declaration, got {:?}", other),
        })
        .collect();

    assert!(matches!(
        initializers[0],
        Expression::MakeArray { contents: ArrayContents::Sized(_), .. }
    ));
    assert!(matches!(
        initializers[1],
        Expression::MakeArray { contents: ArrayContents::Literal(items), .. } if items.len() == 3
    ));
    assert!(matches!(initializers[2], Expression::MakeStruct { fields, .. } if fields.len() == 2));
}

#[test]
fn test_full_program() {
    let source = r#"
        package io
        using io

        struct Point {
            x int,
            y int,
        }

        external fn puts(text string) int;

        set fn main() {
            var total = 0
            for (var i = 0; i < 10; i++) {
                if (i % 2 == 0) total += i else continue
            }
            while (total > 0) { total -= 1 }
            io::write(string(total))
            return
        }
    "#;

    let members = parse_source(source);
    let kinds: Vec<&str> = members.iter().map(|m| m.kind().as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "Package Reference",
            "Package Use",
            "Struct Declaration",
            "External Function Declaration",
            "Function Declaration",
        ]
    );

    let Member::Function { public, body, .. } = &members[4] else {
        panic!("Expected function");
    };
    assert!(public.is_some());
    assert_eq!(body.statements.len(), 5);
    assert!(matches!(body.statements[4], Statement::Return { value: None, .. }));
}

#[test]
fn test_illegal_token_is_syntax_error() {
    let tokens = tokenize("var x = 1 @ 2", FileId(0), true).expect("Tokenizing failed");
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Illegal));

    let err = parse(tokens).unwrap_err();
    assert_eq!(err.found, TokenKind::Illegal);
    assert_eq!(err.span.start_column, 11);
}

#[test]
fn test_missing_paren_reports_expected_kind() {
    let tokens = tokenize("fn main( {}", FileId(0), true).expect("Tokenizing failed");
    let err = parse(tokens).unwrap_err();
    assert_eq!(err.found, TokenKind::LBrace);
}

#[test]
fn test_lexical_errors_are_fatal() {
    let err = tokenize("var s = \"open", FileId(0), true).unwrap_err();
    assert_eq!(err.span, Span::new(FileId(0), 8, 13, 1, 9, 1, 14));
}

#[test]
fn test_add_function_structure() {
    let members = parse_source("fn add(a int, b int) int { return a + b; }");
    assert_eq!(members.len(), 1);

    let Member::Function {
        name,
        parameters,
        return_type,
        body,
        ..
    } = &members[0]
    else {
        panic!("Expected function declaration");
    };
    assert_eq!(name.name, "add");

    let params: Vec<String> = parameters
        .iter()
        .map(|p| format!("{} {}", p.name.name, p.type_clause))
        .collect();
    assert_eq!(params, vec!["a int", "b int"]);
    assert_eq!(return_type.as_ref().map(|t| t.to_string()), Some("int".to_string()));

    assert_eq!(body.statements.len(), 1);
    let Statement::Return {
        value: Some(Expression::Binary { left, operator, right }),
        ..
    } = &body.statements[0]
    else {
        panic!("Expected return of a binary expression");
    };
    assert_eq!(operator.kind, TokenKind::Add);
    assert!(matches!(left.as_ref(), Expression::Name { name } if name.name == "a"));
    assert!(matches!(right.as_ref(), Expression::Name { name } if name.name == "b"));
}
