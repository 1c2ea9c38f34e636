//! Binder findings
//!
//! None of these stop binding. The binder collects them and the driver reports
//! them after the walk.

use crate::diagnostic::ErrorKind;
use crate::source::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("'{name}' is already declared in this scope")]
    AlreadyDeclared { name: String, span: Span },

    #[error("undefined name '{name}'")]
    UndefinedName { name: String, span: Span },

    #[error("undefined function '{name}'")]
    UndefinedFunction { name: String, span: Span },

    #[error("undefined type '{name}'")]
    UndefinedType { name: String, span: Span },

    #[error("undefined package '{name}'")]
    UndefinedPackage { name: String, span: Span },

    #[error("'{name}' is not a function")]
    NotCallable { name: String, span: Span },

    #[error("'{name}' takes {expected} argument(s) but {found} were given")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("cannot assign to read-only variable '{name}'")]
    ReadOnlyAssignment { name: String, span: Span },

    #[error("'{owner}' has no field '{name}'")]
    UndefinedField { owner: String, name: String, span: Span },
}

impl SemanticError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SemanticError::AlreadyDeclared { .. } => ErrorKind::AlreadyDeclared,
            SemanticError::UndefinedName { .. } => ErrorKind::UndefinedName,
            SemanticError::UndefinedFunction { .. } => ErrorKind::UndefinedFunction,
            SemanticError::UndefinedType { .. } => ErrorKind::UndefinedType,
            SemanticError::UndefinedPackage { .. } => ErrorKind::UndefinedPackage,
            SemanticError::NotCallable { .. } => ErrorKind::NotCallable,
            SemanticError::ArgumentCount { .. } => ErrorKind::ArgumentCount,
            SemanticError::ReadOnlyAssignment { .. } => ErrorKind::ReadOnlyAssignment,
            SemanticError::UndefinedField { .. } => ErrorKind::UndefinedField,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            SemanticError::AlreadyDeclared { span, .. }
            | SemanticError::UndefinedName { span, .. }
            | SemanticError::UndefinedFunction { span, .. }
            | SemanticError::UndefinedType { span, .. }
            | SemanticError::UndefinedPackage { span, .. }
            | SemanticError::NotCallable { span, .. }
            | SemanticError::ArgumentCount { span, .. }
            | SemanticError::ReadOnlyAssignment { span, .. }
            | SemanticError::UndefinedField { span, .. } => *span,
        }
    }
}
