//! Semantic analysis
//!
//! This module turns a parsed member list into resolved symbols:
//! - [`objects`]: Symbols, types and their fingerprints
//! - [`scope`]: Lexical scopes with shadowing and outward lookup
//! - [`binder`]: The declaration and resolution walk
//! - [`errors`]: Non-fatal binder findings
//!
//! # Scope tree
//!
//! ```text
//! prelude        built-in types and functions
//! └── program    packages, structs, functions, globals
//!     └── fn     parameters and top-level locals
//!         └── {} one scope per nested block
//! ```

pub mod binder;
pub mod errors;
pub mod objects;
pub mod scope;

pub use binder::{bind, BoundFunction, BoundProgram, Resolution};
pub use errors::SemanticError;
pub use objects::{IdAllocator, Symbol, SymbolKind};
pub use scope::Scope;

use crate::parser::tree::TreePrinter;

/// Render the program scope and each function's locals as a tree
pub fn print_symbols(program: &BoundProgram, color: bool) -> String {
    let mut printer = TreePrinter::new(color);

    for symbol in &program.symbols {
        printer.line(0, symbol.kind().as_str(), &symbol_detail(symbol));

        match symbol {
            Symbol::Struct(target) => {
                for field in &target.fields {
                    printer.line(1, "Field", &format!("{} {}", field.name, field.ty));
                }
            }
            Symbol::Function(function) => {
                // A rejected duplicate is bound after the declared function
                let fingerprint = function.fingerprint();
                let bound = program.functions.iter().find(|f| f.symbol.fingerprint() == fingerprint);
                if let Some(bound) = bound {
                    for local in &bound.locals {
                        printer.line(1, local.kind().as_str(), &symbol_detail(local));
                    }
                }
            }
            _ => {}
        }
    }

    printer.finish()
}

fn symbol_detail(symbol: &Symbol) -> String {
    match symbol.as_variable() {
        Some(variable) => format!("{} {} [{}]", variable.name, variable.ty, symbol.fingerprint()),
        None => format!("{} [{}]", symbol.name(), symbol.fingerprint()),
    }
}
