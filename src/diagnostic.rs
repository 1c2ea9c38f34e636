//! Compiler diagnostics
//!
//! Fatal lexer and parser errors, as well as the non-fatal findings of the
//! binder, are all reported through a [`Diagnostic`]: a category tag, an error
//! kind identifier, the source span, and a formatted message.
//!
//! Rendering quotes the offending source line with a caret underline, in the
//! same spirit as `rustc` output:
//!
//! ```text
//! parser[UnexpectedToken] main.tod:3:9: unexpected ')', expected IDENT
//!   3 | fn add(a int, ) int {
//!     |               ^
//! ```

use crate::parser::lexer::LexError;
use crate::parser::parse::ParseError;
use crate::semantic::errors::SemanticError;
use crate::source::{SourceMap, Span};
use crossterm::style::Stylize;
use std::fmt;

/// Pipeline stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lexer,
    Parser,
    Semantic,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Lexer => write!(f, "lexer"),
            Category::Parser => write!(f, "parser"),
            Category::Semantic => write!(f, "semantic"),
        }
    }
}

/// Error kind identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Lexer
    RealValueConversion,
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape,

    // Parser
    UnexpectedToken,

    // Binder
    AlreadyDeclared,
    UndefinedName,
    UndefinedFunction,
    UndefinedType,
    UndefinedPackage,
    NotCallable,
    ArgumentCount,
    ReadOnlyAssignment,
    UndefinedField,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: Category,
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(category: Category, kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            category,
            kind,
            span,
            message: message.into(),
        }
    }

    /// Render with file position, source excerpt and caret underline
    pub fn render(&self, sources: &SourceMap, color: bool) -> String {
        let header = format!(
            "{}[{}] {}:{}:{}: {}",
            self.category,
            self.kind,
            sources.name(self.span.file),
            self.span.start_line,
            self.span.start_column,
            self.message
        );

        let mut out = if color {
            match self.category {
                Category::Semantic => header.yellow().to_string(),
                _ => header.red().bold().to_string(),
            }
        } else {
            header
        };

        let Some(line) = sources
            .get(self.span.file)
            .and_then(|file| file.line(self.span.start_line))
        else {
            return out;
        };

        let gutter = self.span.start_line.to_string();
        let pad = " ".repeat(gutter.len());
        // Empty spans (end of file) and multi-line spans get a single caret
        let width = if self.span.is_empty() || self.span.end_line != self.span.start_line {
            1
        } else {
            self.span.end_column.saturating_sub(self.span.start_column).max(1)
        };
        let carets = "^".repeat(width);

        out.push('\n');
        out.push_str(&format!("  {} | {}\n", gutter, line));
        out.push_str(&format!(
            "  {} | {}{}",
            pad,
            " ".repeat(self.span.start_column.saturating_sub(1)),
            if color { carets.red().to_string() } else { carets }
        ));
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] at line {}, column {}: {}",
            self.category, self.kind, self.span.start_line, self.span.start_column, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        Diagnostic::new(Category::Lexer, err.kind, err.span, err.message)
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        Diagnostic::new(Category::Parser, ErrorKind::UnexpectedToken, err.span, err.to_string())
    }
}

impl From<&SemanticError> for Diagnostic {
    fn from(err: &SemanticError) -> Self {
        Diagnostic::new(Category::Semantic, err.kind(), err.span(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileId;

    #[test]
    fn test_render_points_at_column() {
        let mut sources = SourceMap::new();
        let file = sources.add("main.tod", "var x = 1\nvar = 2");
        let span = Span::new(file, 14, 15, 2, 5, 2, 6);

        let diag = Diagnostic::new(Category::Parser, ErrorKind::UnexpectedToken, span, "unexpected '='");
        let rendered = diag.render(&sources, false);

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "parser[UnexpectedToken] main.tod:2:5: unexpected '='");
        assert_eq!(lines[1], "  2 | var = 2");
        assert_eq!(lines[2], "    |     ^");
    }

    #[test]
    fn test_render_without_source() {
        let sources = SourceMap::new();
        let diag = Diagnostic::new(
            Category::Lexer,
            ErrorKind::UnterminatedString,
            Span::point(FileId(3), 0, 1, 1),
            "unterminated string",
        );
        assert_eq!(
            diag.render(&sources, false),
            "lexer[UnterminatedString] <unknown>:1:1: unterminated string"
        );
    }

    #[test]
    fn test_render_caret_width() {
        let mut sources = SourceMap::new();
        let file = sources.add("main.tod", "print(total)");

        let word = Diagnostic::new(
            Category::Semantic,
            ErrorKind::UndefinedName,
            Span::new(file, 6, 11, 1, 7, 1, 12),
            "undefined name 'total'",
        );
        assert!(word.render(&sources, false).ends_with("|       ^^^^^"));

        let end = Diagnostic::new(
            Category::Parser,
            ErrorKind::UnexpectedToken,
            Span::point(file, 12, 1, 13),
            "unexpected end of file",
        );
        assert!(end.render(&sources, false).ends_with("|             ^"));
    }
}
