//! Symbol objects
//!
//! Every declaration the binder sees becomes a [`Symbol`]. Symbols are plain
//! values owned by the scope they were declared in; references between them
//! (a struct type pointing at its struct, a resolved package pointing at the
//! unresolved one) are [`SymbolRef`]s by kind and name, never embedded copies.
//!
//! # Fingerprints
//!
//! A fingerprint is a deterministic string naming a symbol's structural
//! identity. Two symbols with equal fingerprints are the same declaration.
//!
//! ```text
//! type             T_int_[]            TO_array_[T_int_[];]    TO_io::file_[]
//! function         F_add_T_int_[]T_int_[]->T_int_[]
//! type function    TF_TO_array_[]_push_[TO_any_[]]->T_void_[]
//! struct           S_Point_
//! package          P_io_
//! variables        GV_count_1  LV_i_7  PR_a_3
//! ```

use crate::source::Span;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Kind tag of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    TypeFunction,
    Struct,
    Type,
    Package,
    GlobalVariable,
    LocalVariable,
    Parameter,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Function => "FunctionSymbol",
            SymbolKind::TypeFunction => "TypeFunctionSymbol",
            SymbolKind::Struct => "StructSymbol",
            SymbolKind::Type => "TypeSymbol",
            SymbolKind::Package => "PackageSymbol",
            SymbolKind::GlobalVariable => "GlobalVariableSymbol",
            SymbolKind::LocalVariable => "LocalVariableSymbol",
            SymbolKind::Parameter => "ParameterSymbol",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-owning reference to a symbol declared elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    pub kind: SymbolKind,
    pub name: String,
}

/// Hands out process-wide unique ids for variables.
///
/// Shared by reference between binders so several compilation units never
/// reuse an id.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: AtomicU32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id, starting at 1
    pub fn next_id(&self) -> u32 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// A resolved type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSymbol {
    pub name: String,
    pub sub_types: Vec<TypeSymbol>,
    /// Heap-allocated object rather than a plain value
    pub is_object: bool,
    pub is_user_defined: bool,
    pub package: Option<String>,
    /// Declaration the type was derived from, e.g. its struct
    pub origin: Option<SymbolRef>,
}

/// Names of the types every program starts with
pub const BUILTIN_TYPES: &[&str] = &[
    "void", "bool", "byte", "int", "long", "float", "string", "any", "array", "pointer",
];

impl TypeSymbol {
    pub fn builtin(name: &str) -> Self {
        TypeSymbol {
            name: name.to_string(),
            sub_types: Vec::new(),
            is_object: matches!(name, "string" | "array" | "any"),
            is_user_defined: false,
            package: None,
            origin: None,
        }
    }

    pub fn void() -> Self {
        Self::builtin("void")
    }

    pub fn any() -> Self {
        Self::builtin("any")
    }

    pub fn with_sub_types(mut self, sub_types: Vec<TypeSymbol>) -> Self {
        self.sub_types = sub_types;
        self
    }

    pub fn fingerprint(&self) -> String {
        let mut id = String::from("T");
        if self.is_object {
            id.push('O');
        }
        id.push('_');
        if let Some(package) = &self.package {
            id.push_str(package);
            id.push_str("::");
        }
        id.push_str(&self.name);
        id.push_str("_[");
        for sub in &self.sub_types {
            id.push_str(&sub.fingerprint());
            id.push(';');
        }
        id.push(']');
        id
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(package) = &self.package {
            write!(f, "{}::", package)?;
        }
        write!(f, "{}", self.name)?;
        if !self.sub_types.is_empty() {
            let subs: Vec<String> = self.sub_types.iter().map(|t| t.to_string()).collect();
            write!(f, "[{}]", subs.join(", "))?;
        }
        Ok(())
    }
}

/// Global variable, local variable or parameter
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSymbol {
    pub name: String,
    pub read_only: bool,
    pub ty: TypeSymbol,
    pub unique_id: u32,
    pub declaration: Option<Span>,
}

impl VariableSymbol {
    pub fn new(name: impl Into<String>, read_only: bool, ty: TypeSymbol, ids: &IdAllocator) -> Self {
        VariableSymbol {
            name: name.into(),
            read_only,
            ty,
            unique_id: ids.next_id(),
            declaration: None,
        }
    }

    pub fn declared_at(mut self, span: Span) -> Self {
        self.declaration = Some(span);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    pub name: String,
    pub parameters: Vec<VariableSymbol>,
    pub return_type: TypeSymbol,
    pub declaration: Option<Span>,
    pub built_in: bool,
    pub external: bool,
    pub public: bool,
}

impl FunctionSymbol {
    pub fn new(name: impl Into<String>, parameters: Vec<VariableSymbol>, return_type: TypeSymbol) -> Self {
        FunctionSymbol {
            name: name.into(),
            parameters,
            return_type,
            declaration: None,
            built_in: false,
            external: false,
            public: false,
        }
    }

    /// Provided by the compiler itself; always public
    pub fn built_in(mut self) -> Self {
        self.built_in = true;
        self.public = true;
        self
    }

    /// Implemented outside the program; always public
    pub fn external(mut self) -> Self {
        self.external = true;
        self.public = true;
        self
    }

    pub fn fingerprint(&self) -> String {
        let mut id = format!("F_{}_", self.name);
        for parameter in &self.parameters {
            id.push_str(&parameter.ty.fingerprint());
        }
        id.push_str("->");
        id.push_str(&self.return_type.fingerprint());
        id
    }
}

/// Function attached to a type, called as `value.name(args)`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeFunctionSymbol {
    pub name: String,
    pub parameters: Vec<VariableSymbol>,
    pub return_type: TypeSymbol,
    pub origin: TypeSymbol,
}

impl TypeFunctionSymbol {
    pub fn fingerprint(&self) -> String {
        let mut id = format!("TF_{}_{}_", self.origin.fingerprint(), self.name);
        for parameter in &self.parameters {
            id.push('[');
            id.push_str(&parameter.ty.fingerprint());
            id.push(']');
        }
        id.push_str("->");
        id.push_str(&self.return_type.fingerprint());
        id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructSymbol {
    pub name: String,
    pub fields: Vec<VariableSymbol>,
    pub declaration: Option<Span>,
}

impl StructSymbol {
    /// The value type this struct declares
    pub fn type_symbol(&self) -> TypeSymbol {
        TypeSymbol {
            name: self.name.clone(),
            sub_types: Vec::new(),
            is_object: false,
            is_user_defined: true,
            package: None,
            origin: Some(SymbolRef {
                kind: SymbolKind::Struct,
                name: self.name.clone(),
            }),
        }
    }

    pub fn field(&self, name: &str) -> Option<&VariableSymbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fingerprint(&self) -> String {
        format!("S_{}_", self.name)
    }
}

/// Handle to a module that implements a package, resolved outside the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHandle {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageSymbol {
    pub name: String,
    pub functions: Vec<FunctionSymbol>,
    pub module: Option<ModuleHandle>,
    /// The unresolved package this one was resolved from
    pub original: Option<SymbolRef>,
    pub declaration: Option<Span>,
}

impl PackageSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        PackageSymbol {
            name: name.into(),
            functions: Vec::new(),
            module: None,
            original: None,
            declaration: None,
        }
    }

    /// A copy bound to its module, remembering the unresolved package
    pub fn resolved(&self, module: ModuleHandle, functions: Vec<FunctionSymbol>) -> Self {
        PackageSymbol {
            name: self.name.clone(),
            functions,
            module: Some(module),
            original: Some(SymbolRef {
                kind: SymbolKind::Package,
                name: self.name.clone(),
            }),
            declaration: self.declaration,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.module.is_some()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSymbol> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn fingerprint(&self) -> String {
        format!("P_{}_", self.name)
    }
}

/// Anything a scope can hold
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Function(FunctionSymbol),
    Struct(StructSymbol),
    Type(TypeSymbol),
    Package(PackageSymbol),
    GlobalVariable(VariableSymbol),
    LocalVariable(VariableSymbol),
    Parameter(VariableSymbol),
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Function(_) => SymbolKind::Function,
            Symbol::Struct(_) => SymbolKind::Struct,
            Symbol::Type(_) => SymbolKind::Type,
            Symbol::Package(_) => SymbolKind::Package,
            Symbol::GlobalVariable(_) => SymbolKind::GlobalVariable,
            Symbol::LocalVariable(_) => SymbolKind::LocalVariable,
            Symbol::Parameter(_) => SymbolKind::Parameter,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Function(f) => &f.name,
            Symbol::Struct(s) => &s.name,
            Symbol::Type(t) => &t.name,
            Symbol::Package(p) => &p.name,
            Symbol::GlobalVariable(v) | Symbol::LocalVariable(v) | Symbol::Parameter(v) => &v.name,
        }
    }

    pub fn fingerprint(&self) -> String {
        match self {
            Symbol::Function(f) => f.fingerprint(),
            Symbol::Struct(s) => s.fingerprint(),
            Symbol::Type(t) => t.fingerprint(),
            Symbol::Package(p) => p.fingerprint(),
            Symbol::GlobalVariable(v) => format!("GV_{}_{}", v.name, v.unique_id),
            Symbol::LocalVariable(v) => format!("LV_{}_{}", v.name, v.unique_id),
            Symbol::Parameter(v) => format!("PR_{}_{}", v.name, v.unique_id),
        }
    }

    pub fn as_variable(&self) -> Option<&VariableSymbol> {
        match self {
            Symbol::GlobalVariable(v) | Symbol::LocalVariable(v) | Symbol::Parameter(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionSymbol> {
        match self {
            Symbol::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructSymbol> {
        match self {
            Symbol::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_package(&self) -> Option<&PackageSymbol> {
        match self {
            Symbol::Package(p) => Some(p),
            _ => None,
        }
    }

    pub fn declaration(&self) -> Option<Span> {
        match self {
            Symbol::Function(f) => f.declaration,
            Symbol::Struct(s) => s.declaration,
            Symbol::Type(_) => None,
            Symbol::Package(p) => p.declaration,
            Symbol::GlobalVariable(v) | Symbol::LocalVariable(v) | Symbol::Parameter(v) => v.declaration,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.kind(), self.fingerprint())
    }
}
