use std::path::PathBuf;

use derw_compiler::{CompileOptions, Compiler, DiagnosticLevel, SourceFile, SourceId, Target};

fn source(path: &str, contents: &str) -> SourceFile {
    SourceFile::new(SourceId(0), PathBuf::from(path), contents.to_string())
}

fn compiler(target: Target) -> Compiler {
    Compiler::new(CompileOptions {
        target,
        ..CompileOptions::default()
    })
}

#[test]
fn targets_parse_from_names_and_extensions() {
    assert_eq!("ts".parse::<Target>().unwrap(), Target::TypeScript);
    assert_eq!("javascript".parse::<Target>().unwrap(), Target::JavaScript);
    assert_eq!("elm".parse::<Target>().unwrap(), Target::Elm);
    assert_eq!("derw".parse::<Target>().unwrap(), Target::Derw);
    assert!("python".parse::<Target>().is_err());
    assert_eq!(Target::default(), Target::TypeScript);
    assert_eq!(Target::Elm.to_string(), "elm");
}

#[test]
fn compiles_to_each_target() {
    let file = source("src/Maths.derw", "double: number -> number\ndouble x =\n    x * 2\n");

    let typescript = compiler(Target::TypeScript).compile(&file).unwrap();
    assert_eq!(typescript.module.name, "Maths");
    assert!(typescript.output.starts_with("function double(x: number): number {"));

    let javascript = compiler(Target::JavaScript).compile(&file).unwrap();
    assert!(javascript.output.starts_with("function double(x) {"));

    let elm = compiler(Target::Elm).compile(&file).unwrap();
    assert!(elm.output.starts_with("module Maths exposing (..)"));

    let derw = compiler(Target::Derw).compile(&file).unwrap();
    assert_eq!(derw.output, "double: number -> number\ndouble x =\n    x * 2");
}

#[test]
fn parse_errors_fail_compilation() {
    let mut compiler = compiler(Target::TypeScript);
    let error = compiler
        .compile(&source("Broken.derw", "x =\n    1 +\n"))
        .unwrap_err();
    assert_eq!(error.to_string(), "Parsing failed");

    let entries = compiler.diagnostics().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, DiagnosticLevel::Error);
    assert_eq!(entries[0].line, Some(2));
}

#[test]
fn type_problems_are_warnings_when_compiling() {
    let mut compiler = compiler(Target::TypeScript);
    let compilation = compiler
        .compile(&source("Main.derw", "x: string\nx =\n    1\n"))
        .unwrap();
    assert_eq!(compilation.output, "const x: string = 1;");

    let entries = compiler.diagnostics().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, DiagnosticLevel::Warning);
    assert_eq!(entries[0].message, "Expected string but got number in `x`");
    assert!(!compiler.diagnostics().has_errors());
}

#[test]
fn type_problems_are_errors_when_checking() {
    let mut checker = compiler(Target::TypeScript);
    let error = checker
        .check(&source("Main.derw", "x: string\nx =\n    1\n"))
        .unwrap_err();
    assert_eq!(error.to_string(), "Type checking failed");
    assert!(checker.diagnostics().has_errors());

    let mut clean = compiler(Target::TypeScript);
    let module = clean
        .check(&source("Main.derw", "x: number\nx =\n    1\n"))
        .unwrap();
    assert_eq!(module.body.len(), 1);
    assert!(clean.diagnostics().is_empty());
}
