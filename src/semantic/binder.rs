//! Semantic binder
//!
//! Walks the member list twice. The first pass declares every package,
//! struct, function and global in the program scope, so declaration order
//! does not matter. The second pass descends into function bodies and global
//! statements, opening one child scope per nested region, and resolves every
//! reference it meets into a [`Resolution`].
//!
//! Problems are collected as [`SemanticError`]s; binding always runs to the
//! end of the program.

use super::errors::SemanticError;
use super::objects::*;
use super::scope::Scope;
use crate::parser::ast::*;
use crate::parser::token::TokenKind;
use crate::source::Span;
use rustc_hash::FxHashMap;

/// A reference in the source and the declaration it resolved to
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub span: Span,
    pub name: String,
    /// `None` when the name could not be resolved
    pub fingerprint: Option<String>,
}

/// A function together with every symbol declared inside its body
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFunction {
    pub symbol: FunctionSymbol,
    pub locals: Vec<Symbol>,
}

/// Result of binding one compilation unit
#[derive(Debug, Clone, Default)]
pub struct BoundProgram {
    /// Program scope, sorted by name
    pub symbols: Vec<Symbol>,
    pub functions: Vec<BoundFunction>,
    pub resolutions: Vec<Resolution>,
    pub errors: Vec<SemanticError>,
}

impl BoundProgram {
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name() == name)
    }

    pub fn function(&self, name: &str) -> Option<&BoundFunction> {
        self.functions.iter().find(|f| f.symbol.name == name)
    }

    /// Every resolution of a name, in source order
    pub fn resolutions_of<'p>(&'p self, name: &'p str) -> impl Iterator<Item = &'p Resolution> + 'p {
        self.resolutions.iter().filter(move |r| r.name == name)
    }
}

/// Built-in types and functions every program can see
pub fn prelude(ids: &IdAllocator) -> Scope<'static> {
    let mut scope = Scope::root();

    let param = |name: &str, ty: &str| VariableSymbol::new(name, false, TypeSymbol::builtin(ty), ids);

    let types = BUILTIN_TYPES.iter().map(|name| Symbol::Type(TypeSymbol::builtin(name)));
    let functions = [
        FunctionSymbol::new("print", vec![param("text", "string")], TypeSymbol::void()).built_in(),
        FunctionSymbol::new("input", Vec::new(), TypeSymbol::builtin("string")).built_in(),
        FunctionSymbol::new("len", vec![param("value", "any")], TypeSymbol::builtin("int")).built_in(),
    ]
    .into_iter()
    .map(Symbol::Function);

    for symbol in types.chain(functions) {
        let fresh = scope.declare(symbol);
        debug_assert!(fresh, "prelude names are unique");
    }

    scope
}

/// Functions callable on values of built-in types
pub fn builtin_type_functions(ids: &IdAllocator) -> Vec<TypeFunctionSymbol> {
    let param = |name: &str, ty: &str| VariableSymbol::new(name, false, TypeSymbol::builtin(ty), ids);
    let array = TypeSymbol::builtin("array");
    let string = TypeSymbol::builtin("string");

    vec![
        TypeFunctionSymbol {
            name: "push".to_string(),
            parameters: vec![param("value", "any")],
            return_type: TypeSymbol::void(),
            origin: array.clone(),
        },
        TypeFunctionSymbol {
            name: "pop".to_string(),
            parameters: Vec::new(),
            return_type: TypeSymbol::any(),
            origin: array.clone(),
        },
        TypeFunctionSymbol {
            name: "length".to_string(),
            parameters: Vec::new(),
            return_type: TypeSymbol::builtin("int"),
            origin: array,
        },
        TypeFunctionSymbol {
            name: "length".to_string(),
            parameters: Vec::new(),
            return_type: TypeSymbol::builtin("int"),
            origin: string.clone(),
        },
        TypeFunctionSymbol {
            name: "substring".to_string(),
            parameters: vec![param("start", "int"), param("end", "int")],
            return_type: TypeSymbol::builtin("string"),
            origin: string,
        },
    ]
}

/// Bind a parsed program
pub fn bind(members: &[Member], ids: &IdAllocator) -> BoundProgram {
    Binder::new(ids).bind(members)
}

pub struct Binder<'ids> {
    ids: &'ids IdAllocator,
    /// Resolved packages a `package` reference may bind to, by name
    packages: FxHashMap<String, PackageSymbol>,
    type_functions: Vec<TypeFunctionSymbol>,
    functions: Vec<BoundFunction>,
    /// Symbols of scopes already closed in the current function
    locals: Vec<Symbol>,
    resolutions: Vec<Resolution>,
    errors: Vec<SemanticError>,
}

impl<'ids> Binder<'ids> {
    pub fn new(ids: &'ids IdAllocator) -> Self {
        Self {
            ids,
            packages: FxHashMap::default(),
            type_functions: builtin_type_functions(ids),
            functions: Vec::new(),
            locals: Vec::new(),
            resolutions: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Make already resolved packages available to `package` references
    pub fn with_packages(mut self, packages: impl IntoIterator<Item = PackageSymbol>) -> Self {
        self.packages
            .extend(packages.into_iter().map(|package| (package.name.clone(), package)));
        self
    }

    pub fn bind(mut self, members: &[Member]) -> BoundProgram {
        let prelude = prelude(self.ids);
        let mut program = Scope::child(&prelude);

        let declared = self.declare_members(&mut program, members);
        self.bind_members(&program, members, declared);

        log::debug!(
            "bound {} members: {} symbols, {} resolutions, {} errors",
            members.len(),
            program.len(),
            self.resolutions.len(),
            self.errors.len()
        );

        BoundProgram {
            symbols: program.into_symbols(),
            functions: self.functions,
            resolutions: self.resolutions,
            errors: self.errors,
        }
    }

    // ===== Pass 1: declarations =====

    /// Declare every member; returns the function symbols in member order
    fn declare_members(&mut self, program: &mut Scope<'_>, members: &[Member]) -> Vec<FunctionSymbol> {
        for member in members {
            if let Member::PackageReference { name, .. } = member {
                let mut package = match self.packages.get(&name.name) {
                    Some(resolved) => resolved.clone(),
                    None => {
                        log::debug!("package '{}' has no resolved module", name.name);
                        PackageSymbol::new(&name.name)
                    }
                };
                package.declaration = Some(member.span());
                self.declare(program, Symbol::Package(package), name.span);
            }
        }

        for member in members {
            if let Member::PackageUse { name, .. } = member {
                self.use_package(program, name);
            }
        }

        // Struct names first so fields may name any struct
        let mut structs: Vec<(&Ident, &[Parameter])> = Vec::new();
        for member in members {
            if let Member::Struct { name, fields, .. } = member {
                let symbol = StructSymbol {
                    name: name.name.clone(),
                    fields: Vec::new(),
                    declaration: Some(member.span()),
                };
                if self.declare(program, Symbol::Struct(symbol), name.span) {
                    structs.push((name, fields.as_slice()));
                }
            }
        }
        // A rejected duplicate never overwrites the fields of the first struct
        for (name, fields) in structs {
            let resolved = self.struct_fields(program, fields);
            if let Some(Symbol::Struct(symbol)) = program.lookup_local_mut(&name.name) {
                symbol.fields = resolved;
            }
        }

        let mut declared = Vec::new();
        for member in members {
            match member {
                Member::Function {
                    public,
                    name,
                    parameters,
                    return_type,
                    ..
                } => {
                    let mut symbol = FunctionSymbol::new(
                        &name.name,
                        self.parameters(program, parameters),
                        self.return_type(program, return_type.as_ref()),
                    );
                    symbol.declaration = Some(member.span());
                    symbol.public = public.is_some();

                    declared.push(symbol.clone());
                    self.declare(program, Symbol::Function(symbol), name.span);
                }
                Member::ExternalFunction {
                    name,
                    parameters,
                    return_type,
                    ..
                } => {
                    let mut symbol = FunctionSymbol::new(
                        &name.name,
                        self.parameters(program, parameters),
                        self.return_type(program, return_type.as_ref()),
                    )
                    .external();
                    symbol.declaration = Some(member.span());

                    self.declare(program, Symbol::Function(symbol), name.span);
                }
                _ => {}
            }
        }

        for member in members {
            if let Member::GlobalStatement {
                statement: Statement::VariableDeclaration(decl),
            } = member
            {
                let ty = self.variable_type(program, decl);
                let variable = VariableSymbol::new(&decl.name.name, decl.read_only, ty, self.ids)
                    .declared_at(decl.name.span);
                self.declare(program, Symbol::GlobalVariable(variable), decl.name.span);
            }
        }

        declared
    }

    /// `using pkg` makes the package's functions callable without qualification
    fn use_package(&mut self, program: &mut Scope<'_>, name: &Ident) {
        let Some(package) = program.lookup(&name.name).and_then(Symbol::as_package).cloned() else {
            self.errors.push(SemanticError::UndefinedPackage {
                name: name.name.clone(),
                span: name.span,
            });
            self.record(name, None);
            return;
        };

        self.record(name, Some(package.fingerprint()));
        for function in package.functions {
            self.declare(program, Symbol::Function(function), name.span);
        }
    }

    fn struct_fields(&mut self, scope: &Scope<'_>, fields: &[Parameter]) -> Vec<VariableSymbol> {
        let mut resolved: Vec<VariableSymbol> = Vec::new();

        for field in fields {
            let ty = self.resolve_type(scope, &field.type_clause);
            if resolved.iter().any(|f| f.name == field.name.name) {
                self.errors.push(SemanticError::AlreadyDeclared {
                    name: field.name.name.clone(),
                    span: field.name.span,
                });
                continue;
            }
            resolved.push(VariableSymbol::new(&field.name.name, false, ty, self.ids).declared_at(field.name.span));
        }

        resolved
    }

    fn parameters(&mut self, scope: &Scope<'_>, parameters: &[Parameter]) -> Vec<VariableSymbol> {
        parameters
            .iter()
            .map(|p| {
                let ty = self.resolve_type(scope, &p.type_clause);
                VariableSymbol::new(&p.name.name, false, ty, self.ids).declared_at(p.name.span)
            })
            .collect()
    }

    fn return_type(&mut self, scope: &Scope<'_>, clause: Option<&TypeClause>) -> TypeSymbol {
        match clause {
            Some(clause) => self.resolve_type(scope, clause),
            None => TypeSymbol::void(),
        }
    }

    /// Declare `symbol`, reporting a duplicate; returns whether it was added
    fn declare(&mut self, scope: &mut Scope<'_>, symbol: Symbol, span: Span) -> bool {
        let name = symbol.name().to_string();
        log::trace!("declaring {}", symbol);

        let fresh = scope.declare(symbol);
        if !fresh {
            self.errors.push(SemanticError::AlreadyDeclared { name, span });
        }
        fresh
    }

    // ===== Pass 2: bodies =====

    fn bind_members(&mut self, program: &Scope<'_>, members: &[Member], declared: Vec<FunctionSymbol>) {
        let mut declared = declared.into_iter();

        for member in members {
            match member {
                Member::Function { body, .. } => {
                    if let Some(symbol) = declared.next() {
                        self.bind_function(program, symbol, body);
                    }
                }
                Member::GlobalStatement {
                    statement: Statement::VariableDeclaration(decl),
                } => {
                    if let Some(init) = &decl.initializer {
                        self.bind_expression(program, init);
                    }
                }
                Member::GlobalStatement { statement } => {
                    self.bind_nested(program, statement);
                    self.locals.clear();
                }
                _ => {}
            }
        }
    }

    fn bind_function(&mut self, program: &Scope<'_>, symbol: FunctionSymbol, body: &BlockStatement) {
        let mut scope = Scope::child(program);
        self.locals.clear();

        for parameter in &symbol.parameters {
            let span = parameter.declaration.unwrap_or(body.open);
            self.declare(&mut scope, Symbol::Parameter(parameter.clone()), span);
        }

        for statement in &body.statements {
            self.bind_statement(&mut scope, statement);
        }

        let mut locals = scope.into_symbols();
        locals.append(&mut self.locals);

        log::debug!("bound function '{}' with {} locals", symbol.name, locals.len());
        self.functions.push(BoundFunction { symbol, locals });
    }

    /// Bind `statement` in a fresh child of `parent`
    fn bind_nested(&mut self, parent: &Scope<'_>, statement: &Statement) {
        let mut scope = Scope::child(parent);
        self.bind_statement(&mut scope, statement);
        self.locals.extend(scope.into_symbols());
    }

    fn bind_statement(&mut self, scope: &mut Scope<'_>, statement: &Statement) {
        match statement {
            Statement::Block(block) => {
                let mut inner = Scope::child(scope);
                for statement in &block.statements {
                    self.bind_statement(&mut inner, statement);
                }
                self.locals.extend(inner.into_symbols());
            }
            Statement::VariableDeclaration(decl) => self.bind_local(scope, decl),
            Statement::If {
                condition,
                then_branch,
                else_clause,
                ..
            } => {
                self.bind_expression(scope, condition);
                self.bind_nested(scope, then_branch);
                if let Some(clause) = else_clause {
                    self.bind_nested(scope, &clause.statement);
                }
            }
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.bind_expression(scope, value);
                }
            }
            Statement::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                let mut header = Scope::child(scope);
                self.bind_local(&mut header, init);
                self.bind_expression(&header, condition);
                self.bind_statement(&mut header, step);
                self.bind_nested(&header, body);
                self.locals.extend(header.into_symbols());
            }
            Statement::While {
                condition, body, ..
            } => {
                self.bind_expression(scope, condition);
                self.bind_nested(scope, body);
            }
            Statement::Break { .. } | Statement::Continue { .. } => {}
            Statement::Expression(expr) => self.bind_expression(scope, expr),
        }
    }

    fn bind_local(&mut self, scope: &mut Scope<'_>, decl: &VariableDeclaration) {
        // The initializer cannot see the variable it initializes
        if let Some(init) = &decl.initializer {
            self.bind_expression(scope, init);
        }

        let ty = self.variable_type(scope, decl);
        let variable =
            VariableSymbol::new(&decl.name.name, decl.read_only, ty, self.ids).declared_at(decl.name.span);
        self.declare(scope, Symbol::LocalVariable(variable), decl.name.span);
    }

    fn variable_type(&mut self, scope: &Scope<'_>, decl: &VariableDeclaration) -> TypeSymbol {
        match (&decl.type_clause, &decl.initializer) {
            (Some(clause), _) => self.resolve_type(scope, clause),
            (None, Some(init)) => infer_type(scope, &self.type_functions, init),
            (None, None) => TypeSymbol::any(),
        }
    }

    fn bind_expression(&mut self, scope: &Scope<'_>, expr: &Expression) {
        match expr {
            Expression::Literal { .. } | Expression::This { .. } => {}
            Expression::Main { inner, .. } => self.bind_main(scope, inner),
            Expression::Parenthesized { inner, .. } => self.bind_expression(scope, inner),
            Expression::Name { name } | Expression::Reference { name, .. } => self.resolve_name(scope, name),
            Expression::Assignment { target, value } => {
                self.bind_expression(scope, value);
                self.resolve_assignable(scope, target);
            }
            Expression::Call {
                callee,
                cast_type,
                arguments,
                ..
            } => {
                self.bind_all(scope, arguments);
                match cast_type {
                    Some(clause) => {
                        self.resolve_type(scope, clause);
                    }
                    None => self.resolve_call(scope, callee, arguments.len()),
                }
            }
            Expression::PackageCall {
                package,
                callee,
                arguments,
                ..
            } => {
                self.bind_all(scope, arguments);
                self.resolve_package_call(scope, package, callee, arguments.len());
            }
            Expression::TypeCall {
                receiver,
                callee,
                arguments,
                ..
            } => {
                self.bind_all(scope, arguments);
                self.resolve_type_call(scope, receiver, callee, arguments.len());
            }
            Expression::Unary { operand, .. } | Expression::Dereference { operand, .. } => {
                self.bind_expression(scope, operand)
            }
            Expression::Binary { left, right, .. } => {
                self.bind_expression(scope, left);
                self.bind_expression(scope, right);
            }
            Expression::VariableEditor { target, value, .. } => {
                if let Some(value) = value {
                    self.bind_expression(scope, value);
                }
                self.resolve_assignable(scope, target);
            }
            Expression::FieldAccess { object, field } => self.resolve_field(scope, object, field),
            Expression::FieldAssignment {
                object,
                field,
                value,
            } => {
                self.bind_expression(scope, value);
                self.resolve_field(scope, object, field);
            }
            Expression::ArrayAccess { array, index, .. } => {
                self.bind_expression(scope, array);
                self.bind_expression(scope, index);
            }
            Expression::ArrayAssignment {
                array,
                index,
                value,
            } => {
                self.bind_expression(scope, array);
                self.bind_expression(scope, index);
                self.bind_expression(scope, value);
            }
            Expression::Make {
                type_clause,
                arguments,
                ..
            } => {
                self.resolve_type(scope, type_clause);
                self.bind_all(scope, arguments);
            }
            Expression::MakeArray {
                type_clause,
                contents,
                ..
            } => {
                self.resolve_type(scope, type_clause);
                match contents {
                    ArrayContents::Sized(length) => self.bind_expression(scope, length),
                    ArrayContents::Literal(elements) => self.bind_all(scope, elements),
                }
            }
            Expression::MakeStruct {
                type_clause,
                fields,
                ..
            } => {
                let ty = self.resolve_type(scope, type_clause);
                self.bind_all(scope, fields);

                if let Some(target) = struct_of(scope, &ty) {
                    if !fields.is_empty() && fields.len() != target.fields.len() {
                        self.errors.push(SemanticError::ArgumentCount {
                            name: target.name.clone(),
                            expected: target.fields.len(),
                            found: fields.len(),
                            span: expr.span(),
                        });
                    }
                }
            }
        }
    }

    /// Arguments and assigned values bind where they are written; the
    /// qualified name itself skips every scope below the program
    fn bind_main(&mut self, scope: &Scope<'_>, inner: &Expression) {
        let program = program_scope(scope);
        match inner {
            Expression::Call { callee, arguments, .. } => {
                self.bind_all(scope, arguments);
                self.resolve_call(program, callee, arguments.len());
            }
            Expression::Assignment { target, value } => {
                self.bind_expression(scope, value);
                self.resolve_assignable(program, target);
            }
            other => self.bind_expression(program, other),
        }
    }

    fn bind_all(&mut self, scope: &Scope<'_>, exprs: &[Expression]) {
        for expr in exprs {
            self.bind_expression(scope, expr);
        }
    }

    // ===== Resolution =====

    fn record(&mut self, ident: &Ident, fingerprint: Option<String>) {
        self.resolutions.push(Resolution {
            span: ident.span,
            name: ident.name.clone(),
            fingerprint,
        });
    }

    fn resolve_name(&mut self, scope: &Scope<'_>, name: &Ident) {
        match scope.lookup(&name.name) {
            Some(symbol) => self.record(name, Some(symbol.fingerprint())),
            None => {
                self.errors.push(SemanticError::UndefinedName {
                    name: name.name.clone(),
                    span: name.span,
                });
                self.record(name, None);
            }
        }
    }

    fn resolve_assignable(&mut self, scope: &Scope<'_>, target: &Ident) {
        let Some(symbol) = scope.lookup(&target.name) else {
            self.errors.push(SemanticError::UndefinedName {
                name: target.name.clone(),
                span: target.span,
            });
            self.record(target, None);
            return;
        };

        self.record(target, Some(symbol.fingerprint()));
        if symbol.as_variable().is_some_and(|v| v.read_only) {
            self.errors.push(SemanticError::ReadOnlyAssignment {
                name: target.name.clone(),
                span: target.span,
            });
        }
    }

    fn check_arguments(&mut self, name: &str, expected: usize, found: usize, span: Span) {
        if expected != found {
            self.errors.push(SemanticError::ArgumentCount {
                name: name.to_string(),
                expected,
                found,
                span,
            });
        }
    }

    fn resolve_call(&mut self, scope: &Scope<'_>, callee: &Ident, argument_count: usize) {
        match scope.lookup(&callee.name) {
            Some(Symbol::Function(function)) => {
                self.check_arguments(&callee.name, function.parameters.len(), argument_count, callee.span);
                self.record(callee, Some(function.fingerprint()));
            }
            // Conversion call such as `string(42)`
            Some(Symbol::Type(ty)) => {
                self.check_arguments(&callee.name, 1, argument_count, callee.span);
                self.record(callee, Some(ty.fingerprint()));
            }
            Some(_) => {
                self.errors.push(SemanticError::NotCallable {
                    name: callee.name.clone(),
                    span: callee.span,
                });
                self.record(callee, None);
            }
            None => {
                self.errors.push(SemanticError::UndefinedFunction {
                    name: callee.name.clone(),
                    span: callee.span,
                });
                self.record(callee, None);
            }
        }
    }

    fn resolve_package_call(&mut self, scope: &Scope<'_>, package: &Ident, callee: &Ident, argument_count: usize) {
        let Some(symbol) = scope.lookup(&package.name).and_then(Symbol::as_package) else {
            self.errors.push(SemanticError::UndefinedPackage {
                name: package.name.clone(),
                span: package.span,
            });
            self.record(package, None);
            return;
        };

        self.record(package, Some(symbol.fingerprint()));

        match symbol.function(&callee.name) {
            Some(function) => {
                self.check_arguments(&callee.name, function.parameters.len(), argument_count, callee.span);
                self.record(callee, Some(function.fingerprint()));
            }
            None if symbol.is_resolved() => {
                self.errors.push(SemanticError::UndefinedFunction {
                    name: format!("{}::{}", package.name, callee.name),
                    span: callee.span,
                });
                self.record(callee, None);
            }
            // Contents of an unresolved package are only known once its module loads
            None => {
                log::debug!("'{}::{}' left unchecked", package.name, callee.name);
                self.record(callee, None);
            }
        }
    }

    fn resolve_type_call(&mut self, scope: &Scope<'_>, receiver: &Ident, callee: &Ident, argument_count: usize) {
        let Some(symbol) = scope.lookup(&receiver.name) else {
            self.errors.push(SemanticError::UndefinedName {
                name: receiver.name.clone(),
                span: receiver.span,
            });
            self.record(receiver, None);
            return;
        };

        self.record(receiver, Some(symbol.fingerprint()));

        let ty = match symbol {
            Symbol::Type(ty) => ty.clone(),
            other => match other.as_variable() {
                Some(variable) => variable.ty.clone(),
                None => {
                    self.errors.push(SemanticError::NotCallable {
                        name: format!("{}.{}", receiver.name, callee.name),
                        span: callee.span,
                    });
                    self.record(callee, None);
                    return;
                }
            },
        };

        let function = self
            .type_functions
            .iter()
            .find(|f| f.origin.name == ty.name && f.name == callee.name)
            .cloned();

        match function {
            Some(function) => {
                self.check_arguments(&callee.name, function.parameters.len(), argument_count, callee.span);
                self.record(callee, Some(function.fingerprint()));
            }
            // Values of unknown type may carry any function
            None if ty.name == "any" => self.record(callee, None),
            None => {
                self.errors.push(SemanticError::UndefinedFunction {
                    name: format!("{}.{}", ty.name, callee.name),
                    span: callee.span,
                });
                self.record(callee, None);
            }
        }
    }

    fn resolve_field(&mut self, scope: &Scope<'_>, object: &Ident, field: &Ident) {
        let Some(symbol) = scope.lookup(&object.name) else {
            self.errors.push(SemanticError::UndefinedName {
                name: object.name.clone(),
                span: object.span,
            });
            self.record(object, None);
            return;
        };

        self.record(object, Some(symbol.fingerprint()));

        let Some(owner) = symbol.as_variable().and_then(|v| struct_of(scope, &v.ty)) else {
            return;
        };

        if owner.field(&field.name).is_some() {
            self.record(field, Some(format!("{}.{}", owner.fingerprint(), field.name)));
        } else {
            self.errors.push(SemanticError::UndefinedField {
                owner: owner.name.clone(),
                name: field.name.clone(),
                span: field.span,
            });
            self.record(field, None);
        }
    }

    /// Resolve a type clause, reporting and recording the outcome
    fn resolve_type(&mut self, scope: &Scope<'_>, clause: &TypeClause) -> TypeSymbol {
        match lookup_type(scope, clause) {
            Ok(ty) => {
                self.record(&clause.name, Some(ty.fingerprint()));
                ty
            }
            Err(err) => {
                self.errors.push(err);
                self.record(&clause.name, None);
                TypeSymbol {
                    name: clause.name.name.clone(),
                    sub_types: Vec::new(),
                    is_object: false,
                    is_user_defined: true,
                    package: clause.package.as_ref().map(|p| p.name.clone()),
                    origin: None,
                }
            }
        }
    }
}

/// Resolve a type clause without reporting anything
fn lookup_type(scope: &Scope<'_>, clause: &TypeClause) -> Result<TypeSymbol, SemanticError> {
    let sub_types = clause
        .sub_types
        .iter()
        .map(|sub| lookup_type(scope, sub))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(package) = &clause.package {
        return match scope.lookup(&package.name).and_then(Symbol::as_package) {
            Some(symbol) => Ok(TypeSymbol {
                name: clause.name.name.clone(),
                sub_types,
                is_object: true,
                is_user_defined: true,
                package: Some(symbol.name.clone()),
                origin: None,
            }),
            None => Err(SemanticError::UndefinedPackage {
                name: package.name.clone(),
                span: package.span,
            }),
        };
    }

    match scope.lookup(&clause.name.name) {
        Some(Symbol::Type(ty)) => Ok(ty.clone().with_sub_types(sub_types)),
        Some(Symbol::Struct(symbol)) => Ok(symbol.type_symbol().with_sub_types(sub_types)),
        _ => Err(SemanticError::UndefinedType {
            name: clause.name.name.clone(),
            span: clause.name.span,
        }),
    }
}

/// The outermost scope below the prelude, where globals live
fn program_scope<'s, 'a>(scope: &'s Scope<'a>) -> &'s Scope<'a> {
    let mut current = scope;
    while let Some(parent) = current.parent() {
        if parent.parent().is_none() {
            break;
        }
        current = parent;
    }
    current
}

/// The struct a type was declared by, if any
fn struct_of<'s>(scope: &'s Scope<'_>, ty: &TypeSymbol) -> Option<&'s StructSymbol> {
    let origin = ty.origin.as_ref().filter(|o| o.kind == SymbolKind::Struct)?;
    scope.lookup(&origin.name).and_then(Symbol::as_struct)
}

/// Best-effort static type of an expression, `any` when unknown
pub fn infer_type(scope: &Scope<'_>, type_functions: &[TypeFunctionSymbol], expr: &Expression) -> TypeSymbol {
    let infer = |e: &Expression| infer_type(scope, type_functions, e);
    let variable_type = |name: &Ident| {
        scope
            .lookup(&name.name)
            .and_then(Symbol::as_variable)
            .map(|v| v.ty.clone())
            .unwrap_or_else(TypeSymbol::any)
    };

    match expr {
        Expression::Literal { token } => match token.kind {
            TokenKind::Int => TypeSymbol::builtin("int"),
            TokenKind::Float => TypeSymbol::builtin("float"),
            TokenKind::String => TypeSymbol::builtin("string"),
            TokenKind::True | TokenKind::False => TypeSymbol::builtin("bool"),
            _ => TypeSymbol::any(),
        },
        Expression::Parenthesized { inner, .. } => infer(inner.as_ref()),
        Expression::Main { inner, .. } => match inner.as_ref() {
            Expression::Assignment { value, .. } => infer(value.as_ref()),
            other => infer_type(program_scope(scope), type_functions, other),
        },
        Expression::Assignment { value, .. } => infer(value.as_ref()),
        Expression::Name { name } | Expression::VariableEditor { target: name, .. } => variable_type(name),
        Expression::Call {
            cast_type: Some(clause),
            ..
        } => lookup_type(scope, clause).unwrap_or_else(|_| TypeSymbol::any()),
        Expression::Call { callee, .. } => match scope.lookup(&callee.name) {
            Some(Symbol::Function(function)) => function.return_type.clone(),
            Some(Symbol::Type(ty)) => ty.clone(),
            _ => TypeSymbol::any(),
        },
        Expression::PackageCall { package, callee, .. } => scope
            .lookup(&package.name)
            .and_then(Symbol::as_package)
            .and_then(|p| p.function(&callee.name))
            .map(|f| f.return_type.clone())
            .unwrap_or_else(TypeSymbol::any),
        Expression::TypeCall { receiver, callee, .. } => {
            let receiver_type = variable_type(receiver);
            type_functions
                .iter()
                .find(|f| f.origin.name == receiver_type.name && f.name == callee.name)
                .map(|f| f.return_type.clone())
                .unwrap_or_else(TypeSymbol::any)
        }
        Expression::Unary { operator, operand } => match operator.kind {
            TokenKind::Bang => TypeSymbol::builtin("bool"),
            _ => infer(operand.as_ref()),
        },
        Expression::Binary { left, operator, .. } => match operator.kind {
            TokenKind::Eq | TokenKind::NotEq | TokenKind::Lt | TokenKind::Gt | TokenKind::Leq | TokenKind::Geq => {
                TypeSymbol::builtin("bool")
            }
            _ => infer(left.as_ref()),
        },
        Expression::FieldAccess { object, field } => {
            let object_type = variable_type(object);
            struct_of(scope, &object_type)
                .and_then(|s| s.field(&field.name))
                .map(|f| f.ty.clone())
                .unwrap_or_else(TypeSymbol::any)
        }
        Expression::ArrayAccess { array, .. } => {
            infer(array.as_ref()).sub_types.into_iter().next().unwrap_or_else(TypeSymbol::any)
        }
        Expression::Dereference { operand, .. } => {
            infer(operand.as_ref()).sub_types.into_iter().next().unwrap_or_else(TypeSymbol::any)
        }
        Expression::Reference { name, .. } => TypeSymbol::builtin("pointer").with_sub_types(vec![variable_type(name)]),
        Expression::Make { type_clause, .. }
        | Expression::MakeArray { type_clause, .. }
        | Expression::MakeStruct { type_clause, .. } => {
            lookup_type(scope, type_clause).unwrap_or_else(|_| TypeSymbol::any())
        }
        Expression::FieldAssignment { .. } | Expression::ArrayAssignment { .. } | Expression::This { .. } => {
            TypeSymbol::any()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::parse::parse;
    use crate::source::FileId;

    fn bind_source(source: &str) -> BoundProgram {
        let members = parse(tokenize(source, FileId(0), true).unwrap()).unwrap();
        bind(&members, &IdAllocator::new())
    }

    #[test]
    fn test_prelude_contents() {
        let ids = IdAllocator::new();
        let prelude = prelude(&ids);

        assert!(matches!(prelude.lookup("int"), Some(Symbol::Type(_))));
        let print = prelude.lookup("print").and_then(Symbol::as_function).unwrap();
        assert!(print.built_in && print.public);
        assert_eq!(prelude.all_functions().len(), 3);
    }

    #[test]
    fn test_call_before_declaration() {
        let program = bind_source("fn main() { helper(1) }\nfn helper(x int) {}");
        assert!(program.errors.is_empty(), "{:?}", program.errors);

        let helper = program.symbol("helper").unwrap().fingerprint();
        let call = program.resolutions_of("helper").next().unwrap();
        assert_eq!(call.fingerprint.as_deref(), Some(helper.as_str()));
    }

    #[test]
    fn test_undefined_and_not_callable() {
        let program = bind_source("var x = 1\nfn main() { y; x(); nothing() }");

        let kinds: Vec<_> = program.errors.iter().map(SemanticError::kind).collect();
        assert_eq!(
            kinds,
            vec![
                crate::diagnostic::ErrorKind::UndefinedName,
                crate::diagnostic::ErrorKind::NotCallable,
                crate::diagnostic::ErrorKind::UndefinedFunction,
            ]
        );
    }

    #[test]
    fn test_argument_count() {
        let program = bind_source("fn main() { print() }");
        assert!(matches!(
            &program.errors[..],
            [SemanticError::ArgumentCount { expected: 1, found: 0, .. }]
        ));
    }

    #[test]
    fn test_read_only_assignment() {
        let program = bind_source("set limit = 10\nfn main() { limit = 3; limit++ }");
        assert_eq!(program.errors.len(), 2);
        assert!(program
            .errors
            .iter()
            .all(|e| matches!(e, SemanticError::ReadOnlyAssignment { .. })));
    }

    #[test]
    fn test_initializer_sees_outer_variable() {
        let program = bind_source("fn main() { var x = 1; { var x = x + 1 } }");
        assert!(program.errors.is_empty(), "{:?}", program.errors);

        let main = program.function("main").unwrap();
        let xs: Vec<_> = main.locals.iter().filter(|s| s.name() == "x").collect();
        assert_eq!(xs.len(), 2);

        // `x` inside the initializer is the outer declaration
        let outer = xs.iter().min_by_key(|s| s.as_variable().unwrap().unique_id).unwrap();
        let use_site = program.resolutions_of("x").next().unwrap();
        assert_eq!(use_site.fingerprint, Some(outer.fingerprint()));
    }

    #[test]
    fn test_struct_fields_and_access() {
        let program = bind_source(
            "struct Point { x int, y int }\nfn main() { var p = make Point{1, 2}; p.x = 3; p.z }",
        );

        let point = program.symbol("Point").and_then(Symbol::as_struct).unwrap();
        assert_eq!(point.fields.len(), 2);
        assert_eq!(point.fields[0].ty.name, "int");

        let main = program.function("main").unwrap();
        let p = main.locals.iter().find(|s| s.name() == "p").and_then(Symbol::as_variable).unwrap();
        assert_eq!(p.ty.name, "Point");
        assert!(p.ty.is_user_defined);

        assert!(matches!(
            &program.errors[..],
            [SemanticError::UndefinedField { owner, name, .. }] if owner == "Point" && name == "z"
        ));
    }

    #[test]
    fn test_make_struct_field_count() {
        let program = bind_source("struct Pair { a int, b int }\nvar p = make Pair{1}");
        assert!(matches!(
            &program.errors[..],
            [SemanticError::ArgumentCount { expected: 2, found: 1, .. }]
        ));
    }

    #[test]
    fn test_packages() {
        let program = bind_source("package io\nusing io\nusing net\nfn main() { io::write(\"x\"); fs::open() }");

        assert!(matches!(program.symbol("io"), Some(Symbol::Package(_))));
        let undefined: Vec<&str> = program
            .errors
            .iter()
            .filter_map(|e| match e {
                SemanticError::UndefinedPackage { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(undefined, vec!["net", "fs"]);
    }

    #[test]
    fn test_package_qualified_type() {
        let program = bind_source("package io\nfn read(f io::file) {}");
        assert!(program.errors.is_empty(), "{:?}", program.errors);

        let read = program.symbol("read").and_then(Symbol::as_function).unwrap();
        assert_eq!(read.parameters[0].ty.fingerprint(), "TO_io::file_[]");
    }

    #[test]
    fn test_type_calls() {
        let program = bind_source("fn main() { var xs = make array[int](3); xs.push(1); xs.length(); xs.explode() }");

        let push = program.resolutions_of("push").next().unwrap();
        assert!(push.fingerprint.as_deref().unwrap().starts_with("TF_TO_array_[]_push_"));
        assert!(matches!(
            &program.errors[..],
            [SemanticError::UndefinedFunction { name, .. }] if name == "array.explode"
        ));
    }

    #[test]
    fn test_cast_resolves_type() {
        let program = bind_source("fn main() { var data = 1; var xs = array[int](data) }");
        assert!(program.errors.is_empty(), "{:?}", program.errors);

        let main = program.function("main").unwrap();
        let xs = main.locals.iter().find(|s| s.name() == "xs").and_then(Symbol::as_variable).unwrap();
        assert_eq!(xs.ty.to_string(), "array[int]");
    }

    #[test]
    fn test_duplicate_parameter() {
        let program = bind_source("fn f(a int, a string) {}");
        assert!(matches!(
            &program.errors[..],
            [SemanticError::AlreadyDeclared { name, .. }] if name == "a"
        ));
    }

    #[test]
    fn test_for_loop_scope() {
        let program = bind_source("fn main() { for (var i = 0; i < 3; i++) { print(\"x\") } i }");

        // `i` belongs to the loop header only
        assert!(matches!(
            &program.errors[..],
            [SemanticError::UndefinedName { name, .. }] if name == "i"
        ));
    }

    #[test]
    fn test_duplicate_struct_keeps_first_fields() {
        let program = bind_source("struct Point { x int, y int }\nstruct Point { a string }\nfn main() { var p = make Point{1, 2}; p.y }");

        assert!(matches!(
            &program.errors[..],
            [SemanticError::AlreadyDeclared { name, .. }] if name == "Point"
        ));
        let point = program.symbol("Point").and_then(Symbol::as_struct).unwrap();
        let fields: Vec<&str> = point.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["x", "y"]);
    }

    #[test]
    fn test_resolved_package_functions() {
        let ids = IdAllocator::new();
        let text = VariableSymbol::new("text", false, TypeSymbol::builtin("string"), &ids);
        let write = FunctionSymbol::new("write", vec![text], TypeSymbol::void());
        let io = PackageSymbol::new("io").resolved(
            ModuleHandle {
                path: "io.tod".to_string(),
            },
            vec![write.clone()],
        );

        let source = "package io\nfn main() { io::write(\"x\"); io::anything(1, 2, 3); io::write() }";
        let members = parse(tokenize(source, FileId(0), true).unwrap()).unwrap();
        let program = Binder::new(&ids).with_packages([io]).bind(&members);

        let package = program.symbol("io").and_then(Symbol::as_package).unwrap();
        assert!(package.is_resolved());
        assert!(package.declaration.is_some());

        let call = program.resolutions_of("write").next().unwrap();
        assert_eq!(call.fingerprint, Some(write.fingerprint()));

        assert_eq!(program.errors.len(), 2, "{:?}", program.errors);
        assert!(matches!(
            &program.errors[0],
            SemanticError::UndefinedFunction { name, .. } if name == "io::anything"
        ));
        assert!(matches!(
            &program.errors[1],
            SemanticError::ArgumentCount { expected: 1, found: 0, .. }
        ));
    }

    #[test]
    fn test_main_skips_local_shadowing() {
        let program = bind_source(
            "var x = 1\nfn f() { var x = \"s\"; main x; main x = 2; main g(x) }\nfn g(a int) {}\nfn h() { var y = 1; main y }",
        );

        let global = program.symbol("x").unwrap().fingerprint();
        let f = program.function("f").unwrap();
        let local = f.locals.iter().find(|s| s.name() == "x").unwrap().fingerprint();

        // `main x`, `main x = 2`, then the argument of `main g(x)`
        let uses: Vec<Option<String>> = program.resolutions_of("x").map(|r| r.fingerprint.clone()).collect();
        assert_eq!(uses, vec![Some(global.clone()), Some(global), Some(local)]);

        let g = program.symbol("g").unwrap().fingerprint();
        assert_eq!(program.resolutions_of("g").next().unwrap().fingerprint, Some(g));

        // A local is never reachable through `main`
        assert!(matches!(
            &program.errors[..],
            [SemanticError::UndefinedName { name, .. }] if name == "y"
        ));
    }
}
