//! Compilation pipeline
//!
//! ```text
//! source → tokenize → parse → bind → Compilation
//! ```
//!
//! Lexer and parser errors abort with a [`Diagnostic`]. Binder findings do
//! not; they are returned alongside the bound program.
//!
//! Every compiled unit is registered as a package named after its file stem,
//! exporting its `set fn` functions. A later unit that says `package io`
//! binds against the unit compiled from `io.tod`.

use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::parser::ast::Member;
use crate::parser::lexer::tokenize;
use crate::parser::parse::parse;
use crate::parser::token::Token;
use crate::semantic::binder::{Binder, BoundProgram};
use crate::semantic::objects::{FunctionSymbol, IdAllocator, ModuleHandle, PackageSymbol};
use crate::semantic::Symbol;
use crate::source::{FileId, SourceMap};
use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("could not read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Diagnostic(#[from] Diagnostic),
}

/// Everything the front end produced for one file
#[derive(Debug)]
pub struct Compilation {
    pub file: FileId,
    pub tokens: Vec<Token>,
    pub members: Vec<Member>,
    pub program: BoundProgram,
    /// Non-fatal semantic findings, in discovery order
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Owns the sources and the id allocator shared by every file it compiles
#[derive(Debug)]
pub struct Driver {
    sources: SourceMap,
    ids: IdAllocator,
    /// Packages exported by the units compiled so far
    packages: FxHashMap<String, PackageSymbol>,
    hash_comments: bool,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Driver {
    pub fn new(hash_comments: bool) -> Self {
        Driver {
            sources: SourceMap::new(),
            ids: IdAllocator::new(),
            packages: FxHashMap::default(),
            hash_comments,
        }
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn package(&self, name: &str) -> Option<&PackageSymbol> {
        self.packages.get(name)
    }

    pub fn compile_file(&mut self, path: &Path) -> Result<Compilation, CompileError> {
        let text = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.compile_source(path.display().to_string(), text)?)
    }

    pub fn compile_source(&mut self, name: impl Into<String>, text: impl Into<String>) -> Result<Compilation, Diagnostic> {
        let text = text.into();
        let file = self.sources.add(name, text.as_str());
        log::info!("compiling {}", self.sources.name(file));

        let tokens = tokenize(&text, file, self.hash_comments)?;
        let members = parse(tokens.clone())?;
        let program = Binder::new(&self.ids)
            .with_packages(self.packages.values().cloned())
            .bind(&members);
        let diagnostics = program.errors.iter().map(Diagnostic::from).collect();
        self.register_package(file, &program);

        Ok(Compilation {
            file,
            tokens,
            members,
            program,
            diagnostics,
        })
    }

    /// Export the public functions declared in `file` under its file stem
    fn register_package(&mut self, file: FileId, program: &BoundProgram) {
        let path = self.sources.name(file).to_string();
        let Some(stem) = Path::new(&path).file_stem().and_then(|s| s.to_str()) else {
            return;
        };

        let functions: Vec<FunctionSymbol> = program
            .symbols
            .iter()
            .filter(|s| s.declaration().is_some_and(|span| span.file == file))
            .filter_map(Symbol::as_function)
            .filter(|f| f.public && !f.external)
            .cloned()
            .collect();

        log::debug!("registered package '{}' with {} functions", stem, functions.len());
        let package = PackageSymbol::new(stem).resolved(ModuleHandle { path: path.clone() }, functions);
        self.packages.insert(package.name.clone(), package);
    }
}

/// Compile the configured input with a fresh driver.
///
/// The driver is returned either way so errors can be rendered against its
/// sources.
pub fn compile(config: &Config) -> (Driver, Result<Compilation, CompileError>) {
    let mut driver = Driver::new(config.hash_comments);
    let result = driver.compile_file(&config.input);
    (driver, result)
}
