//! Token model shared by the scanner and the parser
//!
//! A [`Token`] is immutable once produced. Every stream ends with exactly one
//! [`TokenKind::Eof`] token.

use crate::source::Span;
use std::fmt;

/// Kind tag of a lexical token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,
    Ident,

    // Literals
    Int,
    Float,
    String,
    True,
    False,

    // Operators
    Assign,       // =
    Add,          // +
    Sub,          // -
    Mul,          // *
    Quo,          // /
    Rem,          // %
    And,          // &
    Or,           // |
    Xor,          // ^
    Shl,          // <<
    Shr,          // >>
    AndNot,       // &^
    LAnd,         // &&
    LOr,          // ||
    Eq,           // ==
    NotEq,        // !=
    Lt,           // <
    Leq,          // <=
    Gt,           // >
    Geq,          // >=
    Spaceship,    // <=>
    Bang,         // !
    AddAssign,    // +=
    SubAssign,    // -=
    MulAssign,    // *=
    QuoAssign,    // /=
    RemAssign,    // %=
    AndAssign,    // &=
    OrAssign,     // |=
    XorAssign,    // ^=
    ShlAssign,    // <<=
    ShrAssign,    // >>=
    AndNotAssign, // &^=
    Define,       // :=
    PathSep,      // ::

    // Punctuation
    Comma,     // ,
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Period,    // .
    LBrack,    // [
    RBrack,    // ]
    Semicolon, // ;

    // Keywords
    Fn,
    Var,
    Set,
    If,
    Else,
    While,
    For,
    Return,
    Break,
    Continue,
    Struct,
    Package,
    Using,
    External,
    Make,
    This,
}

/// Contextual keyword that qualifies a name with the program scope.
///
/// It lexes as an identifier so functions and variables may still be named
/// `main`; the parser treats it as a keyword only in front of another name.
pub const MAIN_QUALIFIER: &str = "main";

impl TokenKind {
    /// Keyword lookup for an identifier-shaped word
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "fn" => TokenKind::Fn,
            "var" => TokenKind::Var,
            "set" => TokenKind::Set,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "struct" => TokenKind::Struct,
            "package" => TokenKind::Package,
            "using" => TokenKind::Using,
            "external" => TokenKind::External,
            "make" => TokenKind::Make,
            "this" => TokenKind::This,
            _ => return None,
        };
        Some(kind)
    }

    /// Operator lookup for a run of symbol characters
    pub fn operator(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "=" => TokenKind::Assign,
            "+" => TokenKind::Add,
            "-" => TokenKind::Sub,
            "*" => TokenKind::Mul,
            "/" => TokenKind::Quo,
            "%" => TokenKind::Rem,
            "&" => TokenKind::And,
            "|" => TokenKind::Or,
            "^" => TokenKind::Xor,
            "<<" => TokenKind::Shl,
            ">>" => TokenKind::Shr,
            "&^" => TokenKind::AndNot,
            "&&" => TokenKind::LAnd,
            "||" => TokenKind::LOr,
            "==" => TokenKind::Eq,
            "!=" => TokenKind::NotEq,
            "<" => TokenKind::Lt,
            "<=" => TokenKind::Leq,
            ">" => TokenKind::Gt,
            ">=" => TokenKind::Geq,
            "<=>" => TokenKind::Spaceship,
            "!" => TokenKind::Bang,
            "+=" => TokenKind::AddAssign,
            "-=" => TokenKind::SubAssign,
            "*=" => TokenKind::MulAssign,
            "/=" => TokenKind::QuoAssign,
            "%=" => TokenKind::RemAssign,
            "&=" => TokenKind::AndAssign,
            "|=" => TokenKind::OrAssign,
            "^=" => TokenKind::XorAssign,
            "<<=" => TokenKind::ShlAssign,
            ">>=" => TokenKind::ShrAssign,
            "&^=" => TokenKind::AndNotAssign,
            ":=" => TokenKind::Define,
            "::" => TokenKind::PathSep,
            "," => TokenKind::Comma,
            "(" => TokenKind::LParen,
            ")" => TokenKind::RParen,
            "{" => TokenKind::LBrace,
            "}" => TokenKind::RBrace,
            "." => TokenKind::Period,
            "[" => TokenKind::LBrack,
            "]" => TokenKind::RBrack,
            ";" => TokenKind::Semicolon,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::String
                | TokenKind::True
                | TokenKind::False
        )
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Var
                | TokenKind::Set
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Struct
                | TokenKind::Package
                | TokenKind::Using
                | TokenKind::External
                | TokenKind::Make
                | TokenKind::This
        )
    }

    /// Precedence of a prefix operator, 0 when the kind is not one.
    ///
    /// Always one above the highest binary level.
    pub fn unary_precedence(self) -> u8 {
        match self {
            TokenKind::Add | TokenKind::Sub | TokenKind::Bang => 6,
            _ => 0,
        }
    }

    /// Precedence of an infix operator, 0 when the kind is not one.
    pub fn binary_precedence(self) -> u8 {
        match self {
            TokenKind::Mul | TokenKind::Quo | TokenKind::Rem => 5,
            TokenKind::Add | TokenKind::Sub => 4,
            TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Leq
            | TokenKind::Geq
            | TokenKind::Shl
            | TokenKind::Shr => 3,
            TokenKind::And => 2,
            TokenKind::Or | TokenKind::Xor => 1,
            _ => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Assign => "=",
            TokenKind::Add => "+",
            TokenKind::Sub => "-",
            TokenKind::Mul => "*",
            TokenKind::Quo => "/",
            TokenKind::Rem => "%",
            TokenKind::And => "&",
            TokenKind::Or => "|",
            TokenKind::Xor => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::AndNot => "&^",
            TokenKind::LAnd => "&&",
            TokenKind::LOr => "||",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Leq => "<=",
            TokenKind::Gt => ">",
            TokenKind::Geq => ">=",
            TokenKind::Spaceship => "<=>",
            TokenKind::Bang => "!",
            TokenKind::AddAssign => "+=",
            TokenKind::SubAssign => "-=",
            TokenKind::MulAssign => "*=",
            TokenKind::QuoAssign => "/=",
            TokenKind::RemAssign => "%=",
            TokenKind::AndAssign => "&=",
            TokenKind::OrAssign => "|=",
            TokenKind::XorAssign => "^=",
            TokenKind::ShlAssign => "<<=",
            TokenKind::ShrAssign => ">>=",
            TokenKind::AndNotAssign => "&^=",
            TokenKind::Define => ":=",
            TokenKind::PathSep => "::",
            TokenKind::Comma => ",",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Period => ".",
            TokenKind::LBrack => "[",
            TokenKind::RBrack => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Fn => "fn",
            TokenKind::Var => "var",
            TokenKind::Set => "set",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Struct => "struct",
            TokenKind::Package => "package",
            TokenKind::Using => "using",
            TokenKind::External => "external",
            TokenKind::Make => "make",
            TokenKind::This => "this",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded value of a literal token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Int(n) => write!(f, "{}", n),
            TokenValue::Float(x) => write!(f, "{}", x),
            TokenValue::Bool(b) => write!(f, "{}", b),
            TokenValue::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text exactly as written
    pub literal: String,
    pub value: Option<TokenValue>,
    pub span: Span,
    /// Whitespace immediately follows this token
    pub space_after: bool,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            literal: literal.into(),
            value: None,
            span,
            space_after: false,
        }
    }

    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn spaced(mut self, space_after: bool) -> Self {
        self.space_after = space_after;
        self
    }

    /// Synthetic end marker, returned when peeking outside the stream
    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, "", span)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident => write!(f, "identifier '{}'", self.literal),
            TokenKind::Int | TokenKind::Float => write!(f, "number {}", self.literal),
            TokenKind::String => write!(f, "string {}", self.literal),
            TokenKind::Illegal => write!(f, "illegal token '{}'", self.literal),
            TokenKind::Eof => write!(f, "end of file"),
            kind => write!(f, "'{}'", kind),
        }
    }
}
