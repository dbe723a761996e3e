use derw_compiler::{generate_javascript, generate_typescript, parse};
use derw_support::hash_code;

fn javascript(source: &str) -> String {
    let module = parse(source);
    assert!(module.errors.is_empty(), "{:?}", module.errors);
    generate_javascript(&module)
}

#[test]
fn functions_drop_annotations() {
    assert_eq!(
        javascript("add: number -> number -> number\nadd x y =\n    x + y\n"),
        "function add(x, y) {\n    return x + y;\n}"
    );
    assert_eq!(
        javascript("map: (a -> b) -> a -> b\nmap fn x =\n    fn x\n"),
        "function map(fn, x) {\n    return fn(x);\n}"
    );
}

#[test]
fn constants_drop_annotations() {
    assert_eq!(
        javascript("greeting: string\ngreeting =\n    \"hi\"\n"),
        "const greeting = \"hi\";"
    );
}

#[test]
fn union_types_only_emit_constructors() {
    let source = "type Animal =\n    Dog { name: string }\n    | Cat { lives: number }\n";
    let expected = r#"function Dog(args) {
    return {
        kind: "Dog",
        ...args,
    };
}

function Cat(args) {
    return {
        kind: "Cat",
        ...args,
    };
}"#;
    assert_eq!(javascript(source), expected);
}

#[test]
fn type_aliases_only_emit_a_constructor() {
    let source = "type alias Person = {\n    name: string\n}\n";
    assert_eq!(
        javascript(source),
        "function Person(args) {\n    return {\n        ...args,\n    };\n}"
    );
}

#[test]
fn lambdas_have_untyped_arguments() {
    assert_eq!(
        javascript("inc =\n    \\x -> x + 1\n"),
        "const inc = function(x) {\n    return x + 1;\n};"
    );
}

#[test]
fn constants_with_let_bodies_are_immediately_invoked() {
    let source = "value =\n    let\n        y = 1\n    in\n        y + 1\n";
    assert_eq!(
        javascript(source),
        "const value = (function () {\n    const y = 1;\n    return y + 1;\n})();"
    );
}

#[test]
fn gap_searches_are_untyped() {
    let source = r#"speech parts =
    case parts of
        Speech {} :: middle :: Speech {} :: rest ->
            middle

        default ->
            []
"#;
    let output = javascript(source);
    assert!(output.contains("let _foundIndex2 = -1;"), "{output}");
    assert!(!output.contains(": number"), "{output}");
    assert!(
        output.contains(&format!("const _res{} = parts;", hash_code("parts"))),
        "{output}"
    );
}

#[test]
fn bodies_match_typescript_apart_from_types() {
    let source = "pick x =\n    if x then [ 1..3 ] else []\n";
    let module = parse(source);
    let typescript = generate_typescript(&module);
    let javascript = generate_javascript(&module);
    assert_eq!(typescript.replace("x: any): any", "x)"), javascript);
}
