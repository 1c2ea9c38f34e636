// Integration tests for the binder and the driver

use tod::diagnostic::{Category, ErrorKind};
use tod::driver::Driver;
use tod::semantic::objects::{FunctionSymbol, IdAllocator, TypeSymbol, VariableSymbol};
use tod::semantic::{BoundProgram, Scope, Symbol};

fn compile(source: &str) -> (Driver, BoundProgram) {
    let mut driver = Driver::default();
    let compilation = driver.compile_source("test.tod", source).expect("Compilation failed");
    (driver, compilation.program)
}

fn error_kinds(program: &BoundProgram) -> Vec<ErrorKind> {
    program.errors.iter().map(|e| e.kind()).collect()
}

#[test]
fn test_add_function_end_to_end() {
    let (_, program) = compile("fn add(a int, b int) int { return a + b; }");
    assert!(program.errors.is_empty(), "{:?}", program.errors);

    let add = program.symbol("add").and_then(Symbol::as_function).expect("add not declared");
    assert_eq!(add.fingerprint(), "F_add_T_int_[]T_int_[]->T_int_[]");
    assert_eq!(add.parameters.len(), 2);
    assert!(!add.public);

    // Both operands resolve to the parameters
    let bound = program.function("add").expect("add not bound");
    for name in ["a", "b"] {
        let parameter = bound.locals.iter().find(|s| s.name() == name).expect("missing parameter");
        assert!(matches!(parameter, Symbol::Parameter(_)));

        let uses: Vec<_> = program.resolutions_of(name).collect();
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].fingerprint, Some(parameter.fingerprint()));
    }
}

#[test]
fn test_shadowing_versus_redeclaration() {
    let (_, program) = compile(
        r#"
        fn main() {
            var x = 1
            {
                var x = "inner"
                print(x)
            }
            var x = 2
        }
    "#,
    );

    assert_eq!(error_kinds(&program), vec![ErrorKind::AlreadyDeclared]);

    let main = program.function("main").unwrap();
    let declared: Vec<&VariableSymbol> = main.locals.iter().filter_map(Symbol::as_variable).collect();
    assert_eq!(declared.len(), 2);

    // `print(x)` sees the inner string
    let inner = declared.iter().find(|v| v.ty.name == "string").unwrap();
    let use_site = program.resolutions_of("x").next().unwrap();
    assert_eq!(use_site.fingerprint, Some(format!("LV_x_{}", inner.unique_id)));
}

#[test]
fn test_overloads_have_distinct_fingerprints() {
    let ids = IdAllocator::new();
    let int_param = VariableSymbol::new("v", false, TypeSymbol::builtin("int"), &ids);
    let string_param = VariableSymbol::new("v", false, TypeSymbol::builtin("string"), &ids);

    let f_int = FunctionSymbol::new("f", vec![int_param.clone()], TypeSymbol::void());
    let f_string = FunctionSymbol::new("f", vec![string_param], TypeSymbol::void());
    let f_int_again = FunctionSymbol::new("f", vec![int_param], TypeSymbol::void());

    assert_ne!(f_int.fingerprint(), f_string.fingerprint());
    assert_eq!(f_int.fingerprint(), f_int_again.fingerprint());
}

#[test]
fn test_identical_declarations_in_two_files_match() {
    let mut driver = Driver::default();
    let a = driver.compile_source("a.tod", "fn f(v int) {}").unwrap();
    let b = driver.compile_source("b.tod", "fn f(v int) {}").unwrap();

    assert_eq!(
        a.program.symbol("f").unwrap().fingerprint(),
        b.program.symbol("f").unwrap().fingerprint()
    );
}

#[test]
fn test_duplicate_function() {
    let (driver, program) = compile("fn f() {}\nfn f() {}");
    assert_eq!(error_kinds(&program), vec![ErrorKind::AlreadyDeclared]);

    let rendered = tod::diagnostic::Diagnostic::from(&program.errors[0]).render(driver.sources(), false);
    assert!(rendered.starts_with("semantic[AlreadyDeclared] test.tod:2:4"));
}

#[test]
fn test_scope_aggregates_through_public_api() {
    let ids = IdAllocator::new();
    let prelude = tod::semantic::binder::prelude(&ids);
    let mut program = Scope::child(&prelude);
    assert!(program.declare(Symbol::Function(FunctionSymbol::new("main", Vec::new(), TypeSymbol::void()))));

    let names: Vec<&str> = program.all_functions().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["input", "len", "main", "print"]);
    assert!(program.all_variables().is_empty());
}

#[test]
fn test_many_findings_in_one_pass() {
    let (_, program) = compile(
        r#"
        struct Point { x int, y int }
        set limit = 3

        fn main() {
            var p = make Point{1, 2}
            p.w = 1
            limit += 1
            print(1, 2)
            missing(p)
            var q nothing = 0
        }
    "#,
    );

    assert_eq!(
        error_kinds(&program),
        vec![
            ErrorKind::UndefinedField,
            ErrorKind::ReadOnlyAssignment,
            ErrorKind::ArgumentCount,
            ErrorKind::UndefinedFunction,
            ErrorKind::UndefinedType,
        ]
    );
}

#[test]
fn test_lexer_error_is_fatal() {
    let mut driver = Driver::default();
    let err = driver.compile_source("bad.tod", "var n = 0x").unwrap_err();

    assert_eq!(err.category, Category::Lexer);
    assert_eq!(err.kind, ErrorKind::RealValueConversion);
}

#[test]
fn test_package_binds_to_earlier_unit() {
    let mut driver = Driver::default();
    let io = driver
        .compile_source("io.tod", "set fn write(text string) {}\nfn hidden() {}")
        .unwrap();
    assert!(!io.has_errors());

    let main = driver
        .compile_source(
            "main.tod",
            r#"
            package io
            using io

            fn main() {
                io::write("x")
                io::anything(1, 2, 3)
                write("y")
                io::write()
                hidden()
            }
        "#,
        )
        .unwrap();

    assert_eq!(
        error_kinds(&main.program),
        vec![
            ErrorKind::UndefinedFunction,
            ErrorKind::ArgumentCount,
            ErrorKind::UndefinedFunction,
        ]
    );

    let write = driver.package("io").and_then(|p| p.function("write")).unwrap().fingerprint();
    let uses: Vec<Option<String>> = main.program.resolutions_of("write").map(|r| r.fingerprint.clone()).collect();
    assert_eq!(uses, vec![Some(write.clone()), Some(write.clone()), Some(write)]);
}

#[test]
fn test_unknown_package_stays_unchecked() {
    let (_, program) = compile("package net\nfn main() { net::dial(1, 2) }");
    assert!(program.errors.is_empty(), "{:?}", program.errors);
    assert!(program.resolutions_of("dial").all(|r| r.fingerprint.is_none()));
}

#[test]
fn test_main_reaches_program_scope() {
    let (_, program) = compile(
        r#"
        var count = 0
        fn bump(by int) { main count = count + by }
        fn main() {
            var count = "shadow"
            main count
            main bump(1)
            print(count)
        }
    "#,
    );
    assert!(program.errors.is_empty(), "{:?}", program.errors);

    let global = program.symbol("count").unwrap().fingerprint();
    let local = program
        .function("main")
        .and_then(|f| f.locals.iter().find(|s| s.name() == "count"))
        .unwrap()
        .fingerprint();

    let uses: Vec<Option<String>> = program.resolutions_of("count").map(|r| r.fingerprint.clone()).collect();
    assert_eq!(
        uses,
        vec![Some(global.clone()), Some(global.clone()), Some(global), Some(local)]
    );
}

