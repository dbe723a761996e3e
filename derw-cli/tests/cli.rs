use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const MATHS: &str = "double: number -> number\ndouble x =\n    x * 2\n";

fn derw_binary() -> &'static str {
    env!("CARGO_BIN_EXE_derw")
}

fn derw(args: &[&str], path: &Path) -> Output {
    Command::new(derw_binary())
        .args(args)
        .arg(path)
        .output()
        .expect("run derw")
}

#[test]
fn compile_writes_typescript_beside_the_source() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("Maths.derw");
    fs::write(&file, MATHS).expect("write source");

    let output = derw(&["compile"], &file);
    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let generated = fs::read_to_string(dir.path().join("Maths.ts")).expect("read output");
    assert_eq!(
        generated,
        "function double(x: number): number {\n    return x * 2;\n}\n"
    );
}

#[test]
fn compile_mirrors_directories_under_output() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("nested")).expect("create dirs");
    fs::write(src.join("nested").join("Util.derw"), MATHS).expect("write source");
    fs::write(src.join("notes.txt"), "ignored").expect("write other file");
    let out = dir.path().join("out");

    let output = Command::new(derw_binary())
        .args(["compile", "--target", "elm", "--output"])
        .arg(&out)
        .arg(&src)
        .output()
        .expect("run derw compile");
    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let generated =
        fs::read_to_string(out.join("nested").join("Util.elm")).expect("read mirrored output");
    assert!(generated.starts_with("module Util exposing (..)"), "{generated}");
    assert!(!out.join("notes.elm").exists());
}

#[test]
fn compile_fails_on_parse_errors() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("Broken.derw");
    fs::write(&file, "x =\n    1 +\n").expect("write source");

    let output = derw(&["compile"], &file);
    assert!(!output.status.success(), "expected non-zero exit status");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parsing failed"), "{stderr}");
    assert!(stderr.contains(":2"), "{stderr}");
    assert!(!dir.path().join("Broken.ts").exists());
}

#[test]
fn compile_warns_about_type_problems_but_still_writes() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("Main.derw");
    fs::write(&file, "x: string\nx =\n    1\n").expect("write source");

    let output = derw(&["compile", "--target", "js"], &file);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("warning: Expected string but got number in `x`"),
        "{stderr}"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("Main.js")).expect("read output"),
        "const x = 1;\n"
    );
}

#[test]
fn compile_can_emit_the_ast() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("Maths.derw");
    fs::write(&file, MATHS).expect("write source");

    let output = derw(&["compile", "--emit-ast"], &file);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"name\": \"Maths\""), "{stdout}");
}

#[test]
fn compile_refuses_to_overwrite_sources() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("Maths.derw");
    fs::write(&file, MATHS).expect("write source");

    let output = derw(&["compile", "--target", "derw"], &file);
    assert!(!output.status.success());
    assert_eq!(fs::read_to_string(&file).expect("read source"), MATHS);
}

#[test]
fn unknown_targets_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("Maths.derw");
    fs::write(&file, MATHS).expect("write source");

    let output = derw(&["compile", "--target", "python"], &file);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown target `python`"), "{stderr}");
}

#[test]
fn check_reports_type_errors() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("Main.derw");
    fs::write(&file, "x: string\nx =\n    1\n").expect("write source");

    let output = derw(&["check"], &file);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error: Expected string but got number in `x`"),
        "{stderr}"
    );

    fs::write(&file, MATHS).expect("write source");
    assert!(derw(&["check"], &file).status.success());
}

#[test]
fn fmt_check_flags_unformatted_input() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("sample.derw");
    fs::write(&file, "x = 1").expect("write source");

    let output = derw(&["fmt", "--check"], &file);
    assert!(!output.status.success(), "expected non-zero exit status");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("needs formatting"), "{stderr}");
    assert_eq!(fs::read_to_string(&file).expect("read source"), "x = 1");
}

#[test]
fn fmt_rewrites_and_is_idempotent() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("sample.derw");
    fs::write(&file, "x = 1\n\npick y = if y then [1,2] else []").expect("write source");

    assert!(derw(&["fmt"], &file).status.success());
    assert_eq!(
        fs::read_to_string(&file).expect("read formatted"),
        "x =\n    1\n\npick y =\n    if y then\n        [ 1, 2 ]\n    else\n        [ ]\n"
    );

    assert!(derw(&["fmt", "--check"], &file).status.success());
}
