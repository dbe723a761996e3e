use std::collections::HashSet;

use derw_support::name_from_path;

use super::export_tests;
use super::stmt::INDENT;
use crate::ast::*;

pub(crate) fn module(module: &Module) -> String {
    ElmGenerator::new(module).module(module)
}

struct ElmGenerator {
    /// Tags declared without fields; they are used bare rather than
    /// applied to a record.
    bare_tags: HashSet<String>,
}

impl ElmGenerator {
    fn new(module: &Module) -> Self {
        let bare_tags = module
            .body
            .iter()
            .filter_map(|block| match block {
                Block::UnionType(union) => Some(union),
                _ => None,
            })
            .flat_map(|union| union.tags.iter())
            .filter(|tag| tag.args.is_empty())
            .map(|tag| tag.name.clone())
            .collect();
        Self { bare_tags }
    }

    fn module(&self, module: &Module) -> String {
        let mut exposed: Vec<String> = module
            .body
            .iter()
            .filter_map(|block| match block {
                Block::Export(export) => Some(export.names.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        if let Some(tests) = export_tests(module) {
            exposed.extend(tests.names);
        }

        let header = if exposed.is_empty() {
            format!("module {} exposing (..)", module.name)
        } else {
            format!("module {} exposing ({})", module.name, exposed.join(", "))
        };

        let mut sections = vec![header];
        for block in &module.body {
            let generated = self.block(block);
            if !generated.is_empty() {
                sections.push(generated);
            }
        }
        sections.join("\n\n")
    }

    fn block(&self, block: &Block) -> String {
        match block {
            Block::Import(import) => import
                .modules
                .iter()
                .map(import_line)
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Export(_) => String::new(),
            Block::UnionType(union) => union_type(union),
            Block::TypeAlias(alias) => type_alias(alias),
            Block::Function(function) => self.function(function),
            Block::Const(constant) => self.constant(constant),
            Block::Comment(comment) | Block::MultilineComment(comment) => comment.body.clone(),
        }
    }

    fn function(&self, function: &Function) -> String {
        let mut types: Vec<Type> = function.args.iter().map(|arg| arg.type_().clone()).collect();
        types.push(function.return_type.clone());

        let args: Vec<&str> = function
            .args
            .iter()
            .map(|arg| match arg {
                FunctionArg::Named { name, .. } => name.as_str(),
                FunctionArg::Anonymous { .. } => "_",
            })
            .collect();

        format!(
            "{}{name} {} =\n{}",
            annotation(&function.name, &Type::Function(types)),
            args.join(" "),
            indent(&self.body(&function.let_body, &function.body)),
            name = function.name
        )
    }

    fn constant(&self, constant: &Const) -> String {
        format!(
            "{}{name} =\n{}",
            annotation(&constant.name, &constant.type_),
            indent(&self.body(&constant.let_body, &constant.value)),
            name = constant.name
        )
    }

    fn body(&self, let_body: &[Block], expression: &Expression) -> String {
        let expression = self.expression(expression);
        if let_body.is_empty() {
            return expression;
        }
        let blocks: Vec<String> = let_body.iter().map(|block| self.block(block)).collect();
        format!("let\n{}\nin\n{expression}", indent(&blocks.join("\n\n")))
    }

    fn expression(&self, expression: &Expression) -> String {
        match expression {
            Expression::Value(value) => match value.body.as_str() {
                "true" => "True".to_string(),
                "false" => "False".to_string(),
                other => other.to_string(),
            },
            Expression::StringValue(string) => format!("\"{}\"", string.body),
            Expression::FormatStringValue(string) => format_string(&string.body),
            Expression::ListValue(list) => {
                if list.items.is_empty() {
                    return "[]".to_string();
                }
                let items: Vec<String> = list.items.iter().map(|item| self.expression(item)).collect();
                format!("[ {} ]", items.join(", "))
            }
            Expression::ListRange(range) => {
                format!("List.range {} {}", range.start.body, range.end.body)
            }
            Expression::ObjectLiteral(object) => self.record(object),
            Expression::IfStatement(statement) => format!(
                "if {} then\n{}\n\nelse\n{}",
                self.expression(&statement.predicate),
                indent(&self.body(&statement.if_let_body, &statement.if_body)),
                indent(&self.body(&statement.else_let_body, &statement.else_body))
            ),
            Expression::CaseStatement(statement) => {
                let branches: Vec<String> = statement
                    .branches
                    .iter()
                    .map(|branch| {
                        format!(
                            "{} ->\n{}",
                            self.pattern(&branch.pattern),
                            indent(&self.body(&branch.let_body, &branch.body))
                        )
                    })
                    .collect();
                format!(
                    "case {} of\n{}",
                    self.expression(&statement.predicate),
                    indent(&branches.join("\n\n"))
                )
            }
            Expression::Binary(binary) => self.binary(binary),
            Expression::FunctionCall(call) => {
                let mut text = call.name.clone();
                for arg in &call.args {
                    text.push(' ');
                    text.push_str(&self.argument(arg));
                }
                text
            }
            Expression::Lambda(lambda) => {
                format!("\\{} -> {}", lambda.args.join(" "), self.expression(&lambda.body))
            }
            Expression::LambdaCall(call) => {
                let mut text = format!(
                    "({})",
                    self.expression(&Expression::Lambda(call.lambda.clone()))
                );
                for arg in &call.args {
                    text.push(' ');
                    text.push_str(&self.argument(arg));
                }
                text
            }
            Expression::Constructor(constructor) => {
                let pattern = &constructor.pattern;
                if pattern.fields.is_empty()
                    && pattern.base.is_none()
                    && self.bare_tags.contains(&constructor.constructor)
                {
                    constructor.constructor.clone()
                } else {
                    format!("{} {}", constructor.constructor, self.record(pattern))
                }
            }
            Expression::ModuleReference(reference) => format!(
                "{}.{}",
                reference.path.join("."),
                self.expression(&reference.value)
            ),
        }
    }

    fn record(&self, object: &ObjectLiteral) -> String {
        let fields: Vec<String> = object
            .fields
            .iter()
            .map(|field| format!("{} = {}", field.name, self.expression(&field.value)))
            .collect();

        match (&object.base, fields.is_empty()) {
            (None, true) => "{}".to_string(),
            (Some(base), true) => base.body.clone(),
            (None, false) => format!("{{ {} }}", fields.join(", ")),
            (Some(base), false) => format!("{{ {} | {} }}", base.body, fields.join(", ")),
        }
    }

    fn binary(&self, binary: &BinaryExpression) -> String {
        let operator = binary.operator;
        let left = self.operand(&binary.left, operator, false);
        let right = self.operand(&binary.right, operator, true);
        format!("{left} {} {right}", elm_symbol(operator))
    }

    fn operand(&self, operand: &Expression, parent: BinaryOperator, right_side: bool) -> String {
        let text = self.expression(operand);
        let needs_parens = match operand {
            Expression::Binary(child) => {
                let (own, outer) = (elm_precedence(child.operator), elm_precedence(parent));
                let leans_right = parent.associativity() == Associativity::Right;
                own < outer || (own == outer && right_side != leans_right)
            }
            Expression::FormatStringValue(string) => string.body.contains("${"),
            Expression::IfStatement(_) | Expression::CaseStatement(_) | Expression::Lambda(_) => true,
            _ => false,
        };
        if needs_parens {
            format!("({text})")
        } else {
            text
        }
    }

    fn argument(&self, argument: &Expression) -> String {
        let text = self.expression(argument);
        let atomic = match argument {
            Expression::Value(value) => !value.body.starts_with('-'),
            Expression::StringValue(_)
            | Expression::ListValue(_)
            | Expression::ObjectLiteral(_) => true,
            Expression::FormatStringValue(string) => !string.body.contains("${"),
            Expression::ModuleReference(reference) => {
                matches!(reference.value.as_ref(), Expression::Value(_))
            }
            Expression::Constructor(constructor) => {
                constructor.pattern.fields.is_empty()
                    && constructor.pattern.base.is_none()
                    && self.bare_tags.contains(&constructor.constructor)
            }
            _ => false,
        };
        if atomic {
            text
        } else {
            format!("({text})")
        }
    }

    fn pattern(&self, pattern: &Pattern) -> String {
        match pattern {
            Pattern::Destructure(destructure) => self.destructure(destructure),
            Pattern::StringValue(string) => format!("\"{}\"", string.body),
            Pattern::FormatStringValue(string) => format!("\"{}\"", string.body),
            Pattern::EmptyList => "[]".to_string(),
            Pattern::ListDestructure(list) => list
                .parts
                .iter()
                .map(|part| match part {
                    ListDestructurePart::EmptyList => "[]".to_string(),
                    ListDestructurePart::StringValue(string) => format!("\"{}\"", string.body),
                    ListDestructurePart::FormatStringValue(string) => {
                        format!("\"{}\"", string.body)
                    }
                    ListDestructurePart::Value(value) => value.body.clone(),
                    ListDestructurePart::Destructure(destructure) => {
                        let text = self.destructure(destructure);
                        if text.contains(' ') {
                            format!("({text})")
                        } else {
                            text
                        }
                    }
                })
                .collect::<Vec<_>>()
                .join(" :: "),
            Pattern::Default => "_".to_string(),
        }
    }

    fn destructure(&self, destructure: &Destructure) -> String {
        if !destructure.fields.is_empty() {
            format!("{} {{ {} }}", destructure.constructor, destructure.fields.join(", "))
        } else if self.bare_tags.contains(&destructure.constructor) {
            destructure.constructor.clone()
        } else {
            format!("{} _", destructure.constructor)
        }
    }
}

fn import_line(module: &ImportModule) -> String {
    let name = match module.namespace {
        ImportNamespace::Global => module.name.clone(),
        ImportNamespace::Relative => name_from_path(&module.name),
    };
    let mut line = format!("import {name}");
    if let Some(alias) = &module.alias {
        line.push_str(&format!(" as {alias}"));
    }
    if !module.exposing.is_empty() {
        line.push_str(&format!(" exposing ({})", module.exposing.join(", ")));
    }
    line
}

fn union_type(union: &UnionType) -> String {
    let tags: Vec<String> = union
        .tags
        .iter()
        .map(|tag| {
            if tag.args.is_empty() {
                return tag.name.clone();
            }
            let fields: Vec<String> = tag
                .args
                .iter()
                .map(|arg| format!("{} : {}", arg.name, elm_type(&arg.type_)))
                .collect();
            format!("{} {{ {} }}", tag.name, fields.join(", "))
        })
        .collect();

    format!(
        "type {}\n{INDENT}= {}",
        elm_type(&union.type_),
        tags.join(&format!("\n{INDENT}| "))
    )
}

fn type_alias(alias: &TypeAlias) -> String {
    let head = format!("type alias {} =", elm_type(&alias.type_));
    if alias.properties.is_empty() {
        return format!("{head}\n{INDENT}{{}}");
    }

    let mut lines = vec![head];
    for (index, property) in alias.properties.iter().enumerate() {
        let lead = if index == 0 { '{' } else { ',' };
        lines.push(format!(
            "{INDENT}{lead} {} : {}",
            property.name,
            elm_type(&property.type_)
        ));
    }
    lines.push(format!("{INDENT}}}"));
    lines.join("\n")
}

/// `name : type` on its own line; Elm has no `any`, so definitions that
/// mention it are left for Elm to infer.
fn annotation(name: &str, type_: &Type) -> String {
    if mentions_any(type_) {
        String::new()
    } else {
        format!("{name} : {}\n", elm_type(type_))
    }
}

fn mentions_any(type_: &Type) -> bool {
    match type_ {
        Type::Generic(_) => false,
        Type::Fixed(_, args) | Type::Function(args) => {
            type_.is_any() || args.iter().any(mentions_any)
        }
    }
}

fn elm_type(type_: &Type) -> String {
    match type_ {
        Type::Generic(name) => name.clone(),
        Type::Fixed(name, args) => {
            let mut text = match name.as_str() {
                "string" => "String".to_string(),
                "number" => "Float".to_string(),
                "boolean" => "Bool".to_string(),
                "void" => "()".to_string(),
                other => other.to_string(),
            };
            for arg in args {
                text.push(' ');
                match arg {
                    Type::Fixed(_, nested) if !nested.is_empty() => {
                        text.push_str(&format!("({})", elm_type(arg)))
                    }
                    Type::Function(_) => text.push_str(&format!("({})", elm_type(arg))),
                    _ => text.push_str(&elm_type(arg)),
                }
            }
            text
        }
        Type::Function(args) => args
            .iter()
            .map(|arg| match arg {
                Type::Function(_) => format!("({})", elm_type(arg)),
                _ => elm_type(arg),
            })
            .collect::<Vec<_>>()
            .join(" -> "),
    }
}

fn elm_symbol(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::NotEqual => "/=",
        other => other.symbol(),
    }
}

fn elm_precedence(operator: BinaryOperator) -> u8 {
    match operator {
        BinaryOperator::LeftPipe | BinaryOperator::RightPipe => 0,
        BinaryOperator::Or => 2,
        BinaryOperator::And => 3,
        BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::Greater
        | BinaryOperator::GreaterEqual => 4,
        BinaryOperator::ListPrepend => 5,
        BinaryOperator::Add | BinaryOperator::Subtract => 6,
        BinaryOperator::Multiply | BinaryOperator::Divide => 7,
    }
}

/// `` `Hello ${name}!` `` becomes `"Hello " ++ name ++ "!"`.
fn format_string(body: &str) -> String {
    let mut pieces = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("${") {
        if start > 0 {
            pieces.push(format!("\"{}\"", &rest[..start]));
        }
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                pieces.push(after[..end].trim().to_string());
                rest = &after[end + 1..];
            }
            None => {
                pieces.push(format!("\"{}\"", &rest[start..]));
                rest = "";
            }
        }
    }
    if !rest.is_empty() || pieces.is_empty() {
        pieces.push(format!("\"{rest}\""));
    }
    pieces.join(" ++ ")
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
