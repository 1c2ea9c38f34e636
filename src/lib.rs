//! # Introduction
//!
//! `tod` is the front end of the Tod compiler. It scans and parses Tod source
//! into a syntax tree, then binds every declaration and reference into a tree
//! of scopes whose symbols carry deterministic fingerprints, ready for
//! lowering to an intermediate representation.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Binder → Scopes + Resolutions
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds the AST. The first lexical
//!    or syntax error is fatal.
//! 2. [`semantic`]: declares symbols in nested [`semantic::Scope`]s and
//!    resolves names, calls and types, collecting non-fatal findings.
//! 3. [`diagnostic`]: uniform reporting of errors from every stage with a
//!    source excerpt.
//! 4. [`driver`]: runs the stages over files kept in a [`source::SourceMap`].
//!
//! ## Language at a glance
//!
//! Functions (`fn`, public with `set fn`), external functions, structs,
//! packages (`package`, `using`), `var`/`set` variables, `if/else`, `while`,
//! `for`, `return`, `break`, `continue`, references (`&x`), dereferences
//! (`*p`), `make` expressions for arrays and structs, and casts such as
//! `array[int](value)`.

pub mod config;
pub mod diagnostic;
pub mod driver;
pub mod parser;
pub mod semantic;
pub mod source;
