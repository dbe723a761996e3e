use derw_compiler::{
    parse, parse_expression, parse_module, BinaryOperator, Block, Destructure, Expression,
    FunctionArg, ImportNamespace, ListDestructurePart, Pattern, Type,
};

fn number() -> Type {
    Type::fixed("number")
}

#[test]
fn precedence_of_arithmetic() {
    let expression = parse_expression("1 + 2 * 3").unwrap();
    assert_eq!(
        expression,
        Expression::binary(
            BinaryOperator::Add,
            Expression::value("1"),
            Expression::binary(
                BinaryOperator::Multiply,
                Expression::value("2"),
                Expression::value("3")
            )
        )
    );
}

#[test]
fn subtraction_is_left_associative() {
    let expression = parse_expression("a - b - c").unwrap();
    assert_eq!(
        expression,
        Expression::binary(
            BinaryOperator::Subtract,
            Expression::binary(
                BinaryOperator::Subtract,
                Expression::value("a"),
                Expression::value("b")
            ),
            Expression::value("c")
        )
    );
}

#[test]
fn list_prepend_is_right_associative() {
    let expression = parse_expression("1 :: 2 :: []").unwrap();
    let Expression::Binary(outer) = expression else {
        panic!("expected a binary expression");
    };
    assert_eq!(outer.operator, BinaryOperator::ListPrepend);
    assert_eq!(*outer.left, Expression::value("1"));
    assert!(matches!(
        outer.right.as_ref(),
        Expression::Binary(inner) if inner.operator == BinaryOperator::ListPrepend
    ));
}

#[test]
fn boolean_operators_bind_loosest() {
    let expression = parse_expression("a == b || c < d && e").unwrap();
    let Expression::Binary(or) = expression else {
        panic!("expected a binary expression");
    };
    assert_eq!(or.operator, BinaryOperator::Or);
    assert!(matches!(
        or.right.as_ref(),
        Expression::Binary(and) if and.operator == BinaryOperator::And
    ));
}

#[test]
fn chained_comparisons_are_rejected() {
    let error = parse_expression("a < b < c").unwrap_err();
    assert!(error.message.contains("cannot be chained"), "{error}");
}

#[test]
fn function_application_binds_tightest() {
    let expression = parse_expression("f x + g y").unwrap();
    assert_eq!(
        expression,
        Expression::binary(
            BinaryOperator::Add,
            Expression::call("f", vec![Expression::value("x")]),
            Expression::call("g", vec![Expression::value("y")])
        )
    );
}

#[test]
fn pipes_parse_into_binary_nodes() {
    let expression = parse_expression("xs |> List.map f").unwrap();
    let Expression::Binary(pipe) = expression else {
        panic!("expected a pipe");
    };
    assert_eq!(pipe.operator, BinaryOperator::LeftPipe);
    let Expression::ModuleReference(reference) = pipe.right.as_ref() else {
        panic!("expected a module reference");
    };
    assert_eq!(reference.path, vec!["List".to_string()]);
    assert_eq!(
        *reference.value,
        Expression::call("map", vec![Expression::value("f")])
    );
}

#[test]
fn lists_and_ranges() {
    let Expression::ListValue(list) = parse_expression("[ 1, f 2, [ 3 ] ]").unwrap() else {
        panic!("expected a list");
    };
    assert_eq!(list.items.len(), 3);
    assert_eq!(list.items[1], Expression::call("f", vec![Expression::value("2")]));

    let Expression::ListRange(range) = parse_expression("[ 1..5 ]").unwrap() else {
        panic!("expected a range");
    };
    assert_eq!(range.start.body, "1");
    assert_eq!(range.end.body, "5");

    assert_eq!(
        parse_expression("[ ]").unwrap(),
        Expression::ListValue(derw_compiler::ListValue { items: vec![] })
    );
}

#[test]
fn object_literals_with_a_base() {
    let Expression::ObjectLiteral(object) = parse_expression("{ person, age: 1 + 1 }").unwrap()
    else {
        panic!("expected an object literal");
    };
    assert_eq!(object.base.map(|base| base.body), Some("person".to_string()));
    assert_eq!(object.fields.len(), 1);
    assert_eq!(object.fields[0].name, "age");
}

#[test]
fn constructors_take_an_object() {
    let Expression::Constructor(constructor) = parse_expression("Dog { name: \"rex\" }").unwrap()
    else {
        panic!("expected a constructor");
    };
    assert_eq!(constructor.constructor, "Dog");
    assert_eq!(
        constructor.pattern.fields[0].value,
        Expression::string("rex")
    );
}

#[test]
fn negative_numbers() {
    assert_eq!(parse_expression("-1").unwrap(), Expression::value("-1"));
    assert_eq!(
        parse_expression("x - 1").unwrap(),
        Expression::binary(
            BinaryOperator::Subtract,
            Expression::value("x"),
            Expression::value("1")
        )
    );
}

#[test]
fn if_with_let_in_a_branch() {
    let source = "if x then\n    let\n        y = 1\n    in\n        y\nelse\n    2";
    let Expression::IfStatement(statement) = parse_expression(source).unwrap() else {
        panic!("expected an if statement");
    };
    assert_eq!(statement.if_let_body.len(), 1);
    assert_eq!(*statement.if_body, Expression::value("y"));
    assert!(statement.else_let_body.is_empty());
    assert_eq!(*statement.else_body, Expression::value("2"));
}

#[test]
fn case_branches_and_patterns() {
    let source = r#"case x of
    Ok { value } ->
        value

    "hello" ->
        1

    [] ->
        2

    Speech {} :: middle :: Speech {} :: rest ->
        3

    default ->
        4"#;
    let Expression::CaseStatement(statement) = parse_expression(source).unwrap() else {
        panic!("expected a case statement");
    };
    let patterns: Vec<&Pattern> = statement.branches.iter().map(|b| &b.pattern).collect();
    assert_eq!(
        patterns[0],
        &Pattern::Destructure(Destructure {
            constructor: "Ok".to_string(),
            fields: vec!["value".to_string()],
        })
    );
    assert!(matches!(patterns[1], Pattern::StringValue(s) if s.body == "hello"));
    assert_eq!(patterns[2], &Pattern::EmptyList);
    let Pattern::ListDestructure(list) = patterns[3] else {
        panic!("expected a list destructure");
    };
    assert_eq!(list.parts.len(), 4);
    assert!(matches!(&list.parts[0], ListDestructurePart::Destructure(d) if d.constructor == "Speech"));
    assert!(matches!(&list.parts[1], ListDestructurePart::Value(v) if v.body == "middle"));
    assert_eq!(patterns[4], &Pattern::Default);
}

#[test]
fn nested_case_inside_a_branch() {
    let source = "case x of\n    A ->\n        case y of\n            B ->\n                1\n\n            C ->\n                2\n\n    D ->\n        3";
    let Expression::CaseStatement(outer) = parse_expression(source).unwrap() else {
        panic!("expected a case statement");
    };
    assert_eq!(outer.branches.len(), 2);
    let Expression::CaseStatement(inner) = &outer.branches[0].body else {
        panic!("expected a nested case");
    };
    assert_eq!(inner.branches.len(), 2);
}

#[test]
fn empty_list_must_end_a_list_pattern() {
    let error = parse_expression("case x of\n    [] :: xs ->\n        1").unwrap_err();
    assert!(error.message.contains("`[]` can only end"), "{error}");
}

#[test]
fn lambdas() {
    let Expression::Lambda(lambda) = parse_expression("\\x y -> x + y").unwrap() else {
        panic!("expected a lambda");
    };
    assert_eq!(lambda.args, vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn unknown_text_is_a_parse_error() {
    let error = parse_expression("1 ; 2").unwrap_err();
    assert!(error.message.contains("`;`"), "{error}");
}

#[test]
fn module_blocks() {
    let source = r#"import fs
import "./other" as Other exposing (helper, Thing)

exposing (main)

-- a note

type Result a e =
    Ok { value: a }
    | Err { error: e }

type alias Person = {
    name: string,
    age: number
}

names: List (List string)
names =
    [ [ "noah" ], [ "david" ] ]

map: (a -> b) -> a -> b
map fn x =
    fn x
"#;
    let module = parse(source);
    assert!(module.errors.is_empty(), "{:?}", module.errors);
    assert_eq!(module.name, "Main");
    assert_eq!(module.body.len(), 8);

    let Block::Import(relative) = &module.body[1] else {
        panic!("expected an import");
    };
    let import = &relative.modules[0];
    assert_eq!(import.name, "./other");
    assert_eq!(import.alias.as_deref(), Some("Other"));
    assert_eq!(import.exposing, vec!["helper".to_string(), "Thing".to_string()]);
    assert_eq!(import.namespace, ImportNamespace::Relative);

    assert!(matches!(&module.body[3], Block::Comment(comment) if comment.body == "-- a note"));

    let Block::UnionType(union) = &module.body[4] else {
        panic!("expected a union type");
    };
    assert_eq!(
        union.type_,
        Type::Fixed(
            "Result".into(),
            vec![Type::Generic("a".into()), Type::Generic("e".into())]
        )
    );
    assert_eq!(union.tags.len(), 2);
    assert_eq!(union.tags[1].args[0].type_, Type::Generic("e".into()));

    let Block::TypeAlias(alias) = &module.body[5] else {
        panic!("expected a type alias");
    };
    assert_eq!(alias.properties[1].type_, number());

    let Block::Const(names) = &module.body[6] else {
        panic!("expected a const");
    };
    assert_eq!(
        names.type_,
        Type::list(Type::list(Type::fixed("string")))
    );

    let Block::Function(map) = &module.body[7] else {
        panic!("expected a function");
    };
    assert_eq!(
        map.args[0].type_(),
        &Type::Function(vec![Type::Generic("a".into()), Type::Generic("b".into())])
    );
    assert_eq!(map.return_type, Type::Generic("b".into()));
}

#[test]
fn extra_signature_types_become_anonymous_arguments() {
    let module = parse("add: number -> number -> number\nadd x =\n    x\n");
    let Block::Function(add) = &module.body[0] else {
        panic!("expected a function");
    };
    assert!(matches!(&add.args[1], FunctionArg::Anonymous { index: 1, .. }));
}

#[test]
fn definitions_without_signatures_are_any() {
    let module = parse("double x =\n    x * 2\n\nanswer =\n    42\n");
    let Block::Function(double) = &module.body[0] else {
        panic!("expected a function");
    };
    assert!(double.return_type.is_any());
    assert!(double.args[0].type_().is_any());
    let Block::Const(answer) = &module.body[1] else {
        panic!("expected a const");
    };
    assert!(answer.type_.is_any());
}

#[test]
fn let_bodies_in_definitions() {
    let source = "f: number -> number\nf x =\n    let\n        y: number\n        y =\n            x + 1\n\n        z = 2\n    in\n        y * z\n";
    let module = parse(source);
    assert!(module.errors.is_empty(), "{:?}", module.errors);
    let Block::Function(function) = &module.body[0] else {
        panic!("expected a function");
    };
    assert_eq!(function.let_body.len(), 2);
}

#[test]
fn errors_are_collected_per_block() {
    let module = parse_module("x =\n    1 +\n\ny =\n    2\n", "Broken");
    assert_eq!(module.name, "Broken");
    assert_eq!(module.errors.len(), 1);
    assert_eq!(module.errors[0].line, 2);
    assert_eq!(module.body.len(), 1);
}

#[test]
fn too_many_argument_names_is_an_error() {
    let module = parse("f: number -> number\nf x y =\n    x\n");
    assert_eq!(module.errors.len(), 1);
    assert!(module.errors[0].message.contains("names 2 arguments"));
}
