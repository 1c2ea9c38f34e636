//! Lexical scopes
//!
//! A [`Scope`] borrows its parent, so a child can never outlive the region
//! that created it. Declaration only looks at the scope itself, which lets an
//! inner block shadow an outer name while still rejecting a second declaration
//! in the same block. Lookup walks outwards to the root.

use super::objects::{FunctionSymbol, PackageSymbol, StructSymbol, Symbol, VariableSymbol};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Default)]
pub struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    symbols: FxHashMap<String, Symbol>,
}

impl<'a> Scope<'a> {
    pub fn root() -> Self {
        Scope {
            parent: None,
            symbols: FxHashMap::default(),
        }
    }

    pub fn child(parent: &'a Scope<'a>) -> Self {
        Scope {
            parent: Some(parent),
            symbols: FxHashMap::default(),
        }
    }

    pub fn parent(&self) -> Option<&'a Scope<'a>> {
        self.parent
    }

    /// Insert `symbol` unless this scope already holds its name.
    ///
    /// Returns `false`, leaving the scope untouched, on a duplicate.
    #[must_use]
    pub fn declare(&mut self, symbol: Symbol) -> bool {
        if self.symbols.contains_key(symbol.name()) {
            return false;
        }
        self.symbols.insert(symbol.name().to_string(), symbol);
        true
    }

    /// Nearest declaration of `name`, searching outwards
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        match self.symbols.get(name) {
            Some(symbol) => Some(symbol),
            None => self.parent.and_then(|parent| parent.lookup(name)),
        }
    }

    /// Declaration of `name` in this scope only
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub(crate) fn lookup_local_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Take the symbols declared here, sorted by name
    pub fn into_symbols(self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.symbols.into_values().collect();
        symbols.sort_by(|a, b| a.name().cmp(b.name()));
        symbols
    }

    /// Every visible function, outermost shadowed names excluded
    pub fn all_functions(&self) -> Vec<&FunctionSymbol> {
        self.visible(Symbol::as_function)
    }

    /// Every visible global, local and parameter
    pub fn all_variables(&self) -> Vec<&VariableSymbol> {
        self.visible(Symbol::as_variable)
    }

    pub fn all_structs(&self) -> Vec<&StructSymbol> {
        self.visible(Symbol::as_struct)
    }

    pub fn all_packages(&self) -> Vec<&PackageSymbol> {
        self.visible(Symbol::as_package)
    }

    /// Visible symbols selected by `pick`, one per name, sorted by name.
    ///
    /// A name is claimed by its nearest declaration even when that
    /// declaration is of another kind, so a local `print` hides the
    /// built-in function.
    fn visible<'s, T: ?Sized>(&'s self, pick: impl Fn(&'s Symbol) -> Option<&'s T>) -> Vec<&'s T> {
        let mut seen: FxHashSet<&'s str> = FxHashSet::default();
        let mut found: Vec<(&'s str, &'s T)> = Vec::new();

        let mut scope: Option<&'s Scope<'a>> = Some(self);
        while let Some(current) = scope {
            for (name, symbol) in &current.symbols {
                if !seen.insert(name.as_str()) {
                    continue;
                }
                if let Some(item) = pick(symbol) {
                    found.push((name.as_str(), item));
                }
            }
            scope = current.parent;
        }

        found.sort_by(|a, b| a.0.cmp(b.0));
        found.into_iter().map(|(_, item)| item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::objects::{IdAllocator, StructSymbol, TypeSymbol};

    fn local(name: &str, ids: &IdAllocator) -> Symbol {
        Symbol::LocalVariable(VariableSymbol::new(name, false, TypeSymbol::builtin("int"), ids))
    }

    #[test]
    fn test_shadowing_allowed_redeclaration_rejected() {
        let ids = IdAllocator::new();
        let mut outer = Scope::root();
        assert!(outer.declare(local("x", &ids)));

        let mut inner = Scope::child(&outer);
        assert!(inner.declare(local("x", &ids)));
        assert!(!inner.declare(local("x", &ids)));

        // The failed declaration changed nothing
        assert_eq!(inner.len(), 1);
        assert_eq!(inner.lookup("x").unwrap().fingerprint(), "LV_x_2");
    }

    #[test]
    fn test_lookup_walks_outwards() {
        let ids = IdAllocator::new();
        let mut root = Scope::root();
        assert!(root.declare(local("a", &ids)));

        let middle = Scope::child(&root);
        let leaf = Scope::child(&middle);

        assert!(leaf.lookup("a").is_some());
        assert!(leaf.lookup_local("a").is_none());
        assert!(leaf.lookup("missing").is_none());
    }

    #[test]
    fn test_all_variables_prefers_nearest() {
        let ids = IdAllocator::new();
        let mut root = Scope::root();
        assert!(root.declare(local("x", &ids)));
        assert!(root.declare(local("y", &ids)));

        let mut inner = Scope::child(&root);
        assert!(inner.declare(local("x", &ids)));

        let vars = inner.all_variables();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].name, "x");
        assert_eq!(vars[0].unique_id, 3);
        assert_eq!(vars[1].name, "y");
    }

    #[test]
    fn test_all_functions_hidden_by_variable() {
        let ids = IdAllocator::new();
        let mut root = Scope::root();
        assert!(root.declare(Symbol::Function(FunctionSymbol::new("print", Vec::new(), TypeSymbol::void()))));
        assert!(root.declare(Symbol::Function(FunctionSymbol::new("read", Vec::new(), TypeSymbol::void()))));

        let mut inner = Scope::child(&root);
        assert!(inner.declare(local("print", &ids)));

        let names: Vec<&str> = inner.all_functions().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["read"]);
        assert_eq!(root.all_functions().len(), 2);
    }

    fn structure(name: &str, field_count: usize, ids: &IdAllocator) -> Symbol {
        let fields = (0..field_count)
            .map(|i| VariableSymbol::new(format!("f{}", i), false, TypeSymbol::builtin("int"), ids))
            .collect();
        Symbol::Struct(StructSymbol {
            name: name.to_string(),
            fields,
            declaration: None,
        })
    }

    #[test]
    fn test_all_structs_prefers_nearest() {
        let ids = IdAllocator::new();
        let mut root = Scope::root();
        assert!(root.declare(structure("Point", 2, &ids)));
        assert!(root.declare(structure("Line", 4, &ids)));
        assert!(root.declare(structure("Shape", 1, &ids)));

        let mut inner = Scope::child(&root);
        assert!(inner.declare(structure("Point", 3, &ids)));
        assert!(inner.declare(local("Shape", &ids)));

        let structs = inner.all_structs();
        let names: Vec<&str> = structs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Line", "Point"]);
        // The inner `Point` wins over the outer one
        assert_eq!(structs[1].fields.len(), 3);
        assert_eq!(root.all_structs().len(), 3);
    }

    #[test]
    fn test_all_packages_prefers_nearest() {
        let mut root = Scope::root();
        assert!(root.declare(Symbol::Package(PackageSymbol::new("io"))));
        assert!(root.declare(Symbol::Package(PackageSymbol::new("net"))));
        assert!(root.declare(Symbol::Package(PackageSymbol::new("fs"))));

        let mut middle = Scope::child(&root);
        let mut io = PackageSymbol::new("io");
        io.functions.push(FunctionSymbol::new("write", Vec::new(), TypeSymbol::void()));
        assert!(middle.declare(Symbol::Package(io)));

        let mut leaf = Scope::child(&middle);
        assert!(leaf.declare(Symbol::Function(FunctionSymbol::new("net", Vec::new(), TypeSymbol::void()))));

        let packages = leaf.all_packages();
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["fs", "io"]);
        assert!(packages[1].function("write").is_some());
    }
}
