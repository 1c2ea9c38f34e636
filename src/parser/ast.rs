// AST (Abstract Syntax Tree) definitions for Tod programs
//
// Nodes are built once by the parser and never mutated afterwards. Each node
// keeps the spans of the tokens that delimit it, so `span()` is always derived
// from the node's own fields.

use super::token::{Token, TokenKind, TokenValue};
use crate::source::Span;
use std::fmt;

/// Kind tag of an AST node, used for diagnostics and tree printing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Members
    GlobalStatement,
    FunctionDeclaration,
    ExternalFunctionDeclaration,
    StructDeclaration,
    PackageReference,
    PackageUse,

    // General
    Parameter,
    TypeClause,

    // Statements
    BlockStatement,
    VariableDeclaration,
    IfStatement,
    ElseClause,
    ReturnStatement,
    ForStatement,
    WhileStatement,
    BreakStatement,
    ContinueStatement,
    ExpressionStatement,

    // Expressions
    LiteralExpression,
    ParenthesizedExpression,
    NameExpression,
    AssignmentExpression,
    CallExpression,
    PackageCallExpression,
    TypeCallExpression,
    UnaryExpression,
    BinaryExpression,
    VariableEditorExpression,
    FieldAccessExpression,
    FieldAssignmentExpression,
    ArrayAccessExpression,
    ArrayAssignmentExpression,
    ReferenceExpression,
    DereferenceExpression,
    MakeExpression,
    MakeArrayExpression,
    MakeStructExpression,
    ThisExpression,
    MainExpression,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::GlobalStatement => "Global Statement",
            NodeKind::FunctionDeclaration => "Function Declaration",
            NodeKind::ExternalFunctionDeclaration => "External Function Declaration",
            NodeKind::StructDeclaration => "Struct Declaration",
            NodeKind::PackageReference => "Package Reference",
            NodeKind::PackageUse => "Package Use",
            NodeKind::Parameter => "Parameter",
            NodeKind::TypeClause => "Type Clause",
            NodeKind::BlockStatement => "Block Statement",
            NodeKind::VariableDeclaration => "Variable Declaration",
            NodeKind::IfStatement => "If Statement",
            NodeKind::ElseClause => "Else Clause",
            NodeKind::ReturnStatement => "Return Statement",
            NodeKind::ForStatement => "For Statement",
            NodeKind::WhileStatement => "While Statement",
            NodeKind::BreakStatement => "Break Statement",
            NodeKind::ContinueStatement => "Continue Statement",
            NodeKind::ExpressionStatement => "Expression Statement",
            NodeKind::LiteralExpression => "Literal Expression",
            NodeKind::ParenthesizedExpression => "Parenthesized Expression",
            NodeKind::NameExpression => "Name Expression",
            NodeKind::AssignmentExpression => "Assignment Expression",
            NodeKind::CallExpression => "Call Expression",
            NodeKind::PackageCallExpression => "PackageCall Expression",
            NodeKind::TypeCallExpression => "TypeCall Expression",
            NodeKind::UnaryExpression => "Unary Expression",
            NodeKind::BinaryExpression => "Binary Expression",
            NodeKind::VariableEditorExpression => "VariableEditor Expression",
            NodeKind::FieldAccessExpression => "FieldAccess Expression",
            NodeKind::FieldAssignmentExpression => "FieldAssignment Expression",
            NodeKind::ArrayAccessExpression => "ArrayAccess Expression",
            NodeKind::ArrayAssignmentExpression => "ArrayAssignment Expression",
            NodeKind::ReferenceExpression => "Reference Expression",
            NodeKind::DereferenceExpression => "Dereference Expression",
            NodeKind::MakeExpression => "Make Expression",
            NodeKind::MakeArrayExpression => "MakeArray Expression",
            NodeKind::MakeStructExpression => "MakeStruct Expression",
            NodeKind::ThisExpression => "This Expression",
            NodeKind::MainExpression => "Main Expression",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An identifier together with where it was written
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

impl From<&Token> for Ident {
    fn from(token: &Token) -> Self {
        Ident::new(token.literal.clone(), token.span)
    }
}

/// An operator token, kept as its kind plus location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operator {
    pub kind: TokenKind,
    pub span: Span,
}

impl From<&Token> for Operator {
    fn from(token: &Token) -> Self {
        Operator {
            kind: token.kind,
            span: token.span,
        }
    }
}

/// Syntactic type reference: `pkg::name[sub, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeClause {
    pub package: Option<Ident>,
    pub name: Ident,
    pub sub_types: Vec<TypeClause>,
    /// Closing `]` of the sub-type list, when there is one
    pub close: Option<Span>,
}

impl TypeClause {
    pub fn simple(name: Ident) -> Self {
        TypeClause {
            package: None,
            name,
            sub_types: Vec::new(),
            close: None,
        }
    }

    pub fn span(&self) -> Span {
        let first = self.package.as_ref().map_or(self.name.span, |p| p.span);
        let last = self.close.unwrap_or(self.name.span);
        first.to(last)
    }

    pub fn is_generic(&self) -> bool {
        !self.sub_types.is_empty()
    }
}

impl fmt::Display for TypeClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(package) = &self.package {
            write!(f, "{}::", package.name)?;
        }
        write!(f, "{}", self.name.name)?;
        if !self.sub_types.is_empty() {
            write!(f, "[")?;
            for (i, sub) in self.sub_types.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", sub)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Function parameter or struct field: `name Type`
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Ident,
    pub type_clause: TypeClause,
}

impl Parameter {
    pub fn span(&self) -> Span {
        self.name.span.to(self.type_clause.span())
    }
}

/// `{ statements }`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub open: Span,
    pub statements: Vec<Statement>,
    pub close: Span,
}

impl BlockStatement {
    pub fn span(&self) -> Span {
        self.open.to(self.close)
    }
}

/// `var|set Type? name (= initializer)?`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub keyword: Span,
    pub read_only: bool,
    pub type_clause: Option<TypeClause>,
    pub name: Ident,
    pub initializer: Option<Expression>,
}

impl VariableDeclaration {
    pub fn span(&self) -> Span {
        match &self.initializer {
            Some(init) => self.keyword.to(init.span()),
            None => self.keyword.to(self.name.span),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseClause {
    pub keyword: Span,
    pub statement: Box<Statement>,
}

impl ElseClause {
    pub fn span(&self) -> Span {
        self.keyword.to(self.statement.span())
    }
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    GlobalStatement {
        statement: Statement,
    },
    Function {
        /// Leading `set`, marking the function public
        public: Option<Span>,
        keyword: Span,
        name: Ident,
        parameters: Vec<Parameter>,
        return_type: Option<TypeClause>,
        body: BlockStatement,
    },
    ExternalFunction {
        keyword: Span,
        name: Ident,
        parameters: Vec<Parameter>,
        return_type: Option<TypeClause>,
        close: Span,
    },
    Struct {
        keyword: Span,
        name: Ident,
        fields: Vec<Parameter>,
        close: Span,
    },
    PackageReference {
        keyword: Span,
        name: Ident,
    },
    PackageUse {
        keyword: Span,
        name: Ident,
    },
}

impl Member {
    pub fn kind(&self) -> NodeKind {
        match self {
            Member::GlobalStatement { .. } => NodeKind::GlobalStatement,
            Member::Function { .. } => NodeKind::FunctionDeclaration,
            Member::ExternalFunction { .. } => NodeKind::ExternalFunctionDeclaration,
            Member::Struct { .. } => NodeKind::StructDeclaration,
            Member::PackageReference { .. } => NodeKind::PackageReference,
            Member::PackageUse { .. } => NodeKind::PackageUse,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Member::GlobalStatement { statement } => statement.span(),
            Member::Function {
                public,
                keyword,
                body,
                ..
            } => public.unwrap_or(*keyword).to(body.span()),
            Member::ExternalFunction {
                keyword,
                return_type,
                close,
                ..
            } => match return_type {
                Some(ty) => keyword.to(ty.span()),
                None => keyword.to(*close),
            },
            Member::Struct { keyword, close, .. } => keyword.to(*close),
            Member::PackageReference { keyword, name } | Member::PackageUse { keyword, name } => {
                keyword.to(name.span)
            }
        }
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Block(BlockStatement),
    VariableDeclaration(VariableDeclaration),
    If {
        keyword: Span,
        condition: Expression,
        then_branch: Box<Statement>,
        else_clause: Option<ElseClause>,
    },
    Return {
        keyword: Span,
        value: Option<Expression>,
    },
    For {
        keyword: Span,
        init: Box<VariableDeclaration>,
        condition: Expression,
        step: Box<Statement>,
        body: Box<Statement>,
    },
    While {
        keyword: Span,
        condition: Expression,
        body: Box<Statement>,
    },
    Break {
        keyword: Span,
    },
    Continue {
        keyword: Span,
    },
    Expression(Expression),
}

impl Statement {
    pub fn kind(&self) -> NodeKind {
        match self {
            Statement::Block(_) => NodeKind::BlockStatement,
            Statement::VariableDeclaration(_) => NodeKind::VariableDeclaration,
            Statement::If { .. } => NodeKind::IfStatement,
            Statement::Return { .. } => NodeKind::ReturnStatement,
            Statement::For { .. } => NodeKind::ForStatement,
            Statement::While { .. } => NodeKind::WhileStatement,
            Statement::Break { .. } => NodeKind::BreakStatement,
            Statement::Continue { .. } => NodeKind::ContinueStatement,
            Statement::Expression(_) => NodeKind::ExpressionStatement,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Statement::Block(block) => block.span(),
            Statement::VariableDeclaration(decl) => decl.span(),
            Statement::If {
                keyword,
                then_branch,
                else_clause,
                ..
            } => match else_clause {
                Some(clause) => keyword.to(clause.span()),
                None => keyword.to(then_branch.span()),
            },
            Statement::Return { keyword, value } => match value {
                Some(value) => keyword.to(value.span()),
                None => *keyword,
            },
            Statement::For { keyword, body, .. } | Statement::While { keyword, body, .. } => {
                keyword.to(body.span())
            }
            Statement::Break { keyword } | Statement::Continue { keyword } => *keyword,
            Statement::Expression(expr) => expr.span(),
        }
    }
}

/// Contents of a `make` array expression
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayContents {
    /// `make array[int](len)`
    Sized(Box<Expression>),
    /// `make array[int]{a, b, c}`
    Literal(Vec<Expression>),
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal {
        token: Token,
    },
    Parenthesized {
        open: Span,
        inner: Box<Expression>,
        close: Span,
    },
    Name {
        name: Ident,
    },
    Assignment {
        target: Ident,
        value: Box<Expression>,
    },
    /// `name(args)`, or `Type[Sub](args)` when `cast_type` is present
    Call {
        callee: Ident,
        cast_type: Option<TypeClause>,
        arguments: Vec<Expression>,
        close: Span,
    },
    PackageCall {
        package: Ident,
        callee: Ident,
        arguments: Vec<Expression>,
        close: Span,
    },
    TypeCall {
        receiver: Ident,
        callee: Ident,
        arguments: Vec<Expression>,
        close: Span,
    },
    Unary {
        operator: Operator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        operator: Operator,
        right: Box<Expression>,
    },
    /// `x += v` style edits, or `x++`/`x--` when `value` is absent
    VariableEditor {
        target: Ident,
        operator: Operator,
        value: Option<Box<Expression>>,
    },
    FieldAccess {
        object: Ident,
        field: Ident,
    },
    FieldAssignment {
        object: Ident,
        field: Ident,
        value: Box<Expression>,
    },
    ArrayAccess {
        array: Box<Expression>,
        index: Box<Expression>,
        close: Span,
    },
    ArrayAssignment {
        array: Box<Expression>,
        index: Box<Expression>,
        value: Box<Expression>,
    },
    Reference {
        ampersand: Span,
        name: Ident,
    },
    Dereference {
        star: Span,
        operand: Box<Expression>,
    },
    /// `make Type(args)`
    Make {
        keyword: Span,
        type_clause: TypeClause,
        arguments: Vec<Expression>,
        close: Span,
    },
    MakeArray {
        keyword: Span,
        type_clause: TypeClause,
        contents: ArrayContents,
        close: Span,
    },
    MakeStruct {
        keyword: Span,
        type_clause: TypeClause,
        fields: Vec<Expression>,
        close: Span,
    },
    This {
        keyword: Span,
    },
    /// `main name`, `main f(args)` or `main name = value`, resolved in the program scope
    Main {
        keyword: Span,
        inner: Box<Expression>,
    },
}

impl Expression {
    pub fn kind(&self) -> NodeKind {
        match self {
            Expression::Literal { .. } => NodeKind::LiteralExpression,
            Expression::Parenthesized { .. } => NodeKind::ParenthesizedExpression,
            Expression::Name { .. } => NodeKind::NameExpression,
            Expression::Assignment { .. } => NodeKind::AssignmentExpression,
            Expression::Call { .. } => NodeKind::CallExpression,
            Expression::PackageCall { .. } => NodeKind::PackageCallExpression,
            Expression::TypeCall { .. } => NodeKind::TypeCallExpression,
            Expression::Unary { .. } => NodeKind::UnaryExpression,
            Expression::Binary { .. } => NodeKind::BinaryExpression,
            Expression::VariableEditor { .. } => NodeKind::VariableEditorExpression,
            Expression::FieldAccess { .. } => NodeKind::FieldAccessExpression,
            Expression::FieldAssignment { .. } => NodeKind::FieldAssignmentExpression,
            Expression::ArrayAccess { .. } => NodeKind::ArrayAccessExpression,
            Expression::ArrayAssignment { .. } => NodeKind::ArrayAssignmentExpression,
            Expression::Reference { .. } => NodeKind::ReferenceExpression,
            Expression::Dereference { .. } => NodeKind::DereferenceExpression,
            Expression::Make { .. } => NodeKind::MakeExpression,
            Expression::MakeArray { .. } => NodeKind::MakeArrayExpression,
            Expression::MakeStruct { .. } => NodeKind::MakeStructExpression,
            Expression::This { .. } => NodeKind::ThisExpression,
            Expression::Main { .. } => NodeKind::MainExpression,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expression::Literal { token } => token.span,
            Expression::Parenthesized { open, close, .. } => open.to(*close),
            Expression::Name { name } => name.span,
            Expression::Assignment { target, value } => target.span.to(value.span()),
            Expression::Call { callee, close, .. } => callee.span.to(*close),
            Expression::PackageCall { package, close, .. } => package.span.to(*close),
            Expression::TypeCall { receiver, close, .. } => receiver.span.to(*close),
            Expression::Unary { operator, operand } => operator.span.to(operand.span()),
            Expression::Binary { left, right, .. } => left.span().to(right.span()),
            Expression::VariableEditor {
                target,
                operator,
                value,
            } => match value {
                Some(value) => target.span.to(value.span()),
                None => target.span.to(operator.span),
            },
            Expression::FieldAccess { object, field } => object.span.to(field.span),
            Expression::FieldAssignment { object, value, .. } => object.span.to(value.span()),
            Expression::ArrayAccess { array, close, .. } => array.span().to(*close),
            Expression::ArrayAssignment { array, value, .. } => array.span().to(value.span()),
            Expression::Reference { ampersand, name } => ampersand.to(name.span),
            Expression::Dereference { star, operand } => star.to(operand.span()),
            Expression::Make { keyword, close, .. }
            | Expression::MakeArray { keyword, close, .. }
            | Expression::MakeStruct { keyword, close, .. } => keyword.to(*close),
            Expression::This { keyword } => *keyword,
            Expression::Main { keyword, inner } => keyword.to(inner.span()),
        }
    }

    /// Decoded value of a literal expression
    pub fn literal_value(&self) -> Option<&TokenValue> {
        match self {
            Expression::Literal { token } => token.value.as_ref(),
            _ => None,
        }
    }
}
