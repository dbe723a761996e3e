use derw_compiler::{generate_typescript, parse, parse_module};
use derw_support::hash_code;

fn typescript(source: &str) -> String {
    let module = parse(source);
    assert!(module.errors.is_empty(), "{:?}", module.errors);
    generate_typescript(&module)
}

fn temp(predicate: &str) -> String {
    format!("_res{}", hash_code(predicate))
}

#[test]
fn functions_are_annotated() {
    assert_eq!(
        typescript("add: number -> number -> number\nadd x y =\n    x + y\n"),
        "function add(x: number, y: number): number {\n    return x + y;\n}"
    );
}

#[test]
fn unannotated_definitions_are_any() {
    assert_eq!(
        typescript("double x =\n    x * 2\n"),
        "function double(x: any): any {\n    return x * 2;\n}"
    );
}

#[test]
fn type_variables_become_generics() {
    assert_eq!(
        typescript("map: (a -> b) -> a -> b\nmap fn x =\n    fn x\n"),
        "function map<a, b>(fn: (arg0: a) => b, x: a): b {\n    return fn(x);\n}"
    );
}

#[test]
fn constants() {
    assert_eq!(
        typescript("greeting: string\ngreeting =\n    \"hi\"\n"),
        "const greeting: string = \"hi\";"
    );
    assert_eq!(
        typescript("names: List string\nnames =\n    [ \"a\", \"b\" ]\n"),
        "const names: string[] = [ \"a\", \"b\" ];"
    );
}

#[test]
fn union_types_become_tagged_objects() {
    let source = "type Animal =\n    Dog { name: string }\n    | Cat { lives: number }\n";
    let expected = r#"type Dog = {
    kind: "Dog";
    name: string;
};

function Dog(args: { name: string }): Dog {
    return {
        kind: "Dog",
        ...args,
    };
}

type Cat = {
    kind: "Cat";
    lives: number;
};

function Cat(args: { lives: number }): Cat {
    return {
        kind: "Cat",
        ...args,
    };
}

type Animal = Dog | Cat;"#;
    assert_eq!(typescript(source), expected);
}

#[test]
fn type_aliases_get_a_constructor() {
    let source = "type alias Person = {\n    name: string,\n    age: number\n}\n";
    let expected = r#"type Person = {
    name: string;
    age: number;
}

function Person(args: { name: string, age: number }): Person {
    return {
        ...args,
    };
}"#;
    assert_eq!(typescript(source), expected);
}

#[test]
fn if_statements_in_bodies_become_if_else() {
    assert_eq!(
        typescript("pick x =\n    if x then 1 else 2\n"),
        "function pick(x: any): any {\n    if (x) {\n        return 1;\n    } else {\n        return 2;\n    }\n}"
    );
}

#[test]
fn if_in_expression_position_is_a_ternary() {
    assert_eq!(
        typescript("value =\n    1 + (if x then 1 else 2)\n"),
        "const value: any = 1 + (x ? 1 : 2);"
    );
}

#[test]
fn case_on_tags_switches_on_kind() {
    let source = r#"describe: Animal -> string
describe animal =
    case animal of
        Dog { name } ->
            name

        Cat {} ->
            "cat"
"#;
    let name = temp("animal");
    let expected = format!(
        r#"function describe(animal: Animal): string {{
    const {name} = animal;
    switch ({name}.kind) {{
        case "Dog": {{
            const {{ name }} = {name};
            return name;
        }}
        case "Cat": {{
            return "cat";
        }}
    }}
}}"#
    );
    assert_eq!(typescript(source), expected);
}

#[test]
fn case_on_strings_switches_on_the_value() {
    let source = "greet x =\n    case x of\n        \"hi\" ->\n            1\n\n        default ->\n            2\n";
    let name = temp("x");
    let output = typescript(source);
    assert!(output.contains(&format!("switch ({name}) {{")), "{output}");
    assert!(output.contains("case \"hi\": {"), "{output}");
    assert!(output.contains("default: {"), "{output}");
}

#[test]
fn case_on_lists_switches_on_length() {
    let source = r#"first xs =
    case xs of
        [] ->
            0

        y :: ys ->
            y
"#;
    let name = temp("xs");
    let expected = format!(
        r#"function first(xs: any): any {{
    const {name} = xs;
    switch ({name}.length) {{
        case 0: {{
            if ({name}.length === 0) {{
                return 0;
            }}
        }}
        case {name}.length: {{
            if ({name}.length >= 1) {{
                const [ y, ...ys ] = {name};
                return y;
            }}
        }}
    }}
}}"#
    );
    assert_eq!(typescript(source), expected);
}

#[test]
fn list_patterns_with_gaps_search_for_anchors() {
    let source = r#"speech: List Part -> string
speech parts =
    case parts of
        Speech {} :: middle :: Speech {} :: rest ->
            "found"

        default ->
            "none"
"#;
    let name = temp("parts");
    let expected = format!(
        r#"function speech(parts: Part[]): string {{
    const {name} = parts;
    switch ({name}.length) {{
        case {name}.length: {{
            if ({name}.length >= 2) {{
                const [ _0, ..._rest0 ] = {name};
                if (_0.kind === "Speech") {{
                    let _foundIndex2: number = -1;
                    for (let _i2 = 0; _i2 < _rest0.length; _i2++) {{
                        if (_rest0[_i2].kind === "Speech") {{
                            _foundIndex2 = _i2;
                            break;
                        }}
                    }}
                    if (_foundIndex2 > -1) {{
                        const middle = _rest0.slice(0, _foundIndex2);
                        const _rest2 = _rest0.slice(_foundIndex2 + 1);
                        const rest = _rest2;
                        return "found";
                    }}
                }}
            }}
        }}
        default: {{
            return "none";
        }}
    }}
}}"#
    );
    assert_eq!(typescript(source), expected);
}

#[test]
fn names_before_an_empty_list_are_single_elements() {
    let source = "pair xs =\n    case xs of\n        a :: b :: [] ->\n            a\n\n        default ->\n            0\n";
    let name = temp("xs");
    let output = typescript(source);
    assert!(output.contains(&format!("if ({name}.length >= 1) {{")), "{output}");
    assert!(
        output.contains(&format!("const [ a, ..._rest0 ] = {name};")),
        "{output}"
    );
    assert!(output.contains("if (_rest0.length > 0) {"), "{output}");
    assert!(output.contains("const [ b, ..._rest1 ] = _rest0;"), "{output}");
    assert!(output.contains("if (_rest1.length === 0) {"), "{output}");
}

#[test]
fn pipes_become_calls() {
    assert_eq!(
        typescript("total =\n    xs |> List.map f |> sum\n"),
        "const total: any = sum(List.map(f, xs));"
    );
}

#[test]
fn operators() {
    assert_eq!(typescript("same =\n    a == b\n"), "const same: any = a === b;");
    assert_eq!(typescript("other =\n    a != b\n"), "const other: any = a !== b;");
    assert_eq!(
        typescript("xs =\n    1 :: [ 2, 3 ]\n"),
        "const xs: any = [ 1, ...[ 2, 3 ] ];"
    );
    assert_eq!(
        typescript("grouped =\n    a - (b - c)\n"),
        "const grouped: any = a - (b - c);"
    );
}

#[test]
fn ranges_and_objects() {
    assert_eq!(
        typescript("xs =\n    [ 1..5 ]\n"),
        "const xs: any = Array.from({ length: 5 - 1 + 1 }, (_x, i) => i + 1);"
    );
    assert_eq!(
        typescript("person =\n    { name: \"a\", age: 1 }\n"),
        "const person: any = {\n    name: \"a\",\n    age: 1\n};"
    );
    assert_eq!(
        typescript("older =\n    { person, age: 2 }\n"),
        "const older: any = {\n    ...person,\n    age: 2\n};"
    );
}

#[test]
fn imports_and_exports() {
    let source = "import fs\nimport \"./other\" as Other exposing (helper)\n\nexposing (main)\n";
    assert_eq!(
        typescript(source),
        "import * as fs from \"fs\";\n\nimport * as Other from \"./other\";\nimport { helper } from \"./other\";\n\nexport { main };"
    );
}

#[test]
fn test_modules_export_their_tests() {
    let module = parse_module("testAdd =\n    1\n\nhelper =\n    2\n", "Main_test");
    let output = generate_typescript(&module);
    assert!(output.starts_with("export { testAdd };\n\n"), "{output}");
    assert!(!output.contains("export { helper }"));
}

#[test]
fn let_bodies_become_local_statements() {
    let source = "f x =\n    let\n        y = 1\n    in\n        x + y\n";
    assert_eq!(
        typescript(source),
        "function f(x: any): any {\n    const y: any = 1;\n    return x + y;\n}"
    );
}

#[test]
fn generation_is_deterministic() {
    let source = r#"speech parts =
    case parts of
        Speech {} :: middle :: Speech {} :: rest ->
            middle

        default ->
            []
"#;
    assert_eq!(typescript(source), typescript(source));
}
