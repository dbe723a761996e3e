use derw_compiler::{generate_elm, parse, parse_module};

fn elm(source: &str) -> String {
    let module = parse(source);
    assert!(module.errors.is_empty(), "{:?}", module.errors);
    generate_elm(&module)
}

/// Output without the module header.
fn body(source: &str) -> String {
    let output = elm(source);
    output
        .split_once("\n\n")
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_default()
}

#[test]
fn modules_expose_everything_by_default() {
    assert_eq!(elm("x =\n    1\n"), "module Main exposing (..)\n\nx =\n    1");
}

#[test]
fn exposing_lists_become_the_module_header() {
    let output = elm("exposing (main)\n\nmain =\n    1\n");
    assert!(output.starts_with("module Main exposing (main)\n\n"), "{output}");
}

#[test]
fn test_modules_expose_their_tests() {
    let module = parse_module("testOne =\n    1\n", "Basic_test");
    assert!(generate_elm(&module).starts_with("module Basic_test exposing (testOne)"));
}

#[test]
fn functions_use_elm_types() {
    assert_eq!(
        body("add: number -> number -> number\nadd x y =\n    x + y\n"),
        "add : Float -> Float -> Float\nadd x y =\n    x + y"
    );
    assert_eq!(
        body("names: List string\nnames =\n    [ \"a\" ]\n"),
        "names : List String\nnames =\n    [ \"a\" ]"
    );
}

#[test]
fn union_types() {
    assert_eq!(
        body("type Result a e =\n    Ok { value: a }\n    | Err { error: e }\n"),
        "type Result a e\n    = Ok { value : a }\n    | Err { error : e }"
    );
}

#[test]
fn type_aliases() {
    assert_eq!(
        body("type alias Person = {\n    name: string,\n    age: number\n}\n"),
        "type alias Person =\n    { name : String\n    , age : Float\n    }"
    );
}

#[test]
fn if_expressions() {
    assert_eq!(
        body("pick x =\n    if x then true else false\n"),
        "pick x =\n    if x then\n        True\n\n    else\n        False"
    );
}

#[test]
fn case_expressions() {
    let source = r#"describe: Animal -> string
describe animal =
    case animal of
        Dog { name } ->
            name

        Cat {} ->
            "cat"

        default ->
            "other"
"#;
    assert_eq!(
        body(source),
        "describe : Animal -> String\ndescribe animal =\n    case animal of\n        Dog { name } ->\n            name\n\n        Cat _ ->\n            \"cat\"\n\n        _ ->\n            \"other\""
    );
}

#[test]
fn expressions() {
    assert_eq!(body("xs =\n    [ 1..5 ]\n"), "xs =\n    List.range 1 5");
    assert_eq!(body("xs =\n    []\n"), "xs =\n    []");
    assert_eq!(body("same =\n    a != b\n"), "same =\n    a /= b");
    assert_eq!(
        body("older =\n    { person, age: 2 }\n"),
        "older =\n    { person | age = 2 }"
    );
    assert_eq!(
        body("greeting =\n    `Hello ${name}!`\n"),
        "greeting =\n    \"Hello \" ++ name ++ \"!\""
    );
}

#[test]
fn relative_imports_are_named_after_the_file() {
    let output = elm("import \"./utils/helpers\" exposing (help)\n");
    assert!(output.ends_with("import helpers exposing (help)"), "{output}");
}

#[test]
fn unannotated_let_bindings_have_no_signature() {
    let source = "f: number -> number\nf x =\n    let\n        y: number\n        y =\n            x + 1\n\n        z = 2\n    in\n        y * z\n";
    assert_eq!(
        body(source),
        "f : Float -> Float\nf x =\n    let\n        y : Float\n        y =\n            x + 1\n\n        z =\n            2\n    in\n    y * z"
    );
}
