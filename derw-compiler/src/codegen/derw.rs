use super::stmt::INDENT;
use crate::ast::*;

/// Prints a module back as source text in one canonical layout. Parsing
/// the output and printing it again gives the same text.
pub(crate) struct DerwPrinter;

impl DerwPrinter {
    pub(crate) fn new() -> Self {
        DerwPrinter
    }

    pub(crate) fn module(&self, module: &Module) -> String {
        let mut output = String::new();
        let mut previous: Option<&Block> = None;

        for block in &module.body {
            if let Some(previous) = previous {
                let separator = match (previous, block) {
                    (Block::Import(_), Block::Import(_)) => "\n",
                    _ => "\n\n",
                };
                output.push_str(separator);
            }
            output.push_str(&self.block(block));
            previous = Some(block);
        }

        output
    }

    fn block(&self, block: &Block) -> String {
        match block {
            Block::Import(import) => import
                .modules
                .iter()
                .map(import_line)
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Export(export) => format!("exposing ({})", export.names.join(", ")),
            Block::UnionType(union) => union_type(union),
            Block::TypeAlias(alias) => type_alias(alias),
            Block::Function(function) => self.function(function),
            Block::Const(constant) => self.constant(constant),
            Block::Comment(comment) | Block::MultilineComment(comment) => comment.body.clone(),
        }
    }

    fn function(&self, function: &Function) -> String {
        let mut lines = Vec::new();

        let mut types: Vec<Type> = function.args.iter().map(|arg| arg.type_().clone()).collect();
        types.push(function.return_type.clone());
        if !types.iter().all(Type::is_any) {
            lines.push(format!("{}: {}", function.name, Type::Function(types)));
        }

        let mut head = function.name.clone();
        for arg in &function.args {
            if let FunctionArg::Named { name, .. } = arg {
                head.push(' ');
                head.push_str(name);
            }
        }
        lines.push(format!("{head} ="));
        lines.push(indent(&self.body(&function.let_body, &function.body), 1));
        lines.join("\n")
    }

    fn constant(&self, constant: &Const) -> String {
        let mut lines = Vec::new();
        if !constant.type_.is_any() {
            lines.push(format!("{}: {}", constant.name, constant.type_));
        }
        lines.push(format!("{} =", constant.name));
        lines.push(indent(&self.body(&constant.let_body, &constant.value), 1));
        lines.join("\n")
    }

    /// An expression, preceded by `let ... in` when there are local
    /// definitions.
    fn body(&self, let_body: &[Block], expression: &Expression) -> String {
        let expression = self.expression(expression);
        if let_body.is_empty() {
            return expression;
        }

        let blocks: Vec<String> = let_body.iter().map(|block| self.block(block)).collect();
        format!(
            "let\n{}\nin\n{}",
            indent(&blocks.join("\n\n"), 1),
            indent(&expression, 1)
        )
    }

    /// Continuation lines are indented relative to the line the
    /// expression starts on.
    fn expression(&self, expression: &Expression) -> String {
        match expression {
            Expression::Value(value) => value.body.clone(),
            Expression::StringValue(string) => format!("\"{}\"", string.body),
            Expression::FormatStringValue(string) => format!("`{}`", string.body),
            Expression::ListValue(list) => {
                if list.items.is_empty() {
                    return "[ ]".to_string();
                }
                let items: Vec<String> = list.items.iter().map(|item| self.expression(item)).collect();
                format!("[ {} ]", items.join(", "))
            }
            Expression::ListRange(range) => {
                format!("[ {}..{} ]", range.start.body, range.end.body)
            }
            Expression::ObjectLiteral(object) => self.object_literal(object),
            Expression::IfStatement(statement) => format!(
                "if {} then\n{}\nelse\n{}",
                self.expression(&statement.predicate),
                indent(&self.body(&statement.if_let_body, &statement.if_body), 1),
                indent(&self.body(&statement.else_let_body, &statement.else_body), 1)
            ),
            Expression::CaseStatement(statement) => {
                let branches: Vec<String> = statement
                    .branches
                    .iter()
                    .map(|branch| {
                        format!(
                            "{} ->\n{}",
                            pattern(&branch.pattern),
                            indent(&self.body(&branch.let_body, &branch.body), 1)
                        )
                    })
                    .collect();
                format!(
                    "case {} of\n{}",
                    self.expression(&statement.predicate),
                    indent(&branches.join("\n\n"), 1)
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
                let mut text = self.expression(&Expression::Lambda(call.lambda.clone()));
                for arg in &call.args {
                    text = format!("{} |> ({text})", self.argument(arg));
                }
                text
            }
            Expression::Constructor(constructor) => format!(
                "{} {}",
                constructor.constructor,
                self.object_literal(&constructor.pattern)
            ),
            Expression::ModuleReference(reference) => format!(
                "{}.{}",
                reference.path.join("."),
                self.expression(&reference.value)
            ),
        }
    }

    fn object_literal(&self, object: &ObjectLiteral) -> String {
        let mut entries = Vec::new();
        if let Some(base) = &object.base {
            entries.push(base.body.clone());
        }
        for field in &object.fields {
            entries.push(format!("{}: {}", field.name, self.expression(&field.value)));
        }

        if entries.is_empty() {
            "{ }".to_string()
        } else {
            format!("{{ {} }}", entries.join(", "))
        }
    }

    fn binary(&self, binary: &BinaryExpression) -> String {
        let operator = binary.operator;
        let left = self.operand(&binary.left, operator, Associativity::Left);
        let right = self.operand(&binary.right, operator, Associativity::Right);
        format!("{left} {} {right}", operator.symbol())
    }

    fn operand(&self, operand: &Expression, parent: BinaryOperator, side: Associativity) -> String {
        let text = self.expression(operand);
        let needs_parens = match operand {
            Expression::Binary(child) => {
                let (own, outer) = (child.operator.precedence(), parent.precedence());
                own < outer || (own == outer && parent.associativity() != side)
            }
            Expression::IfStatement(_) | Expression::CaseStatement(_) | Expression::Lambda(_) => true,
            _ => false,
        };
        if needs_parens {
            format!("({text})")
        } else {
            text
        }
    }

    /// An argument of a function application.
    fn argument(&self, argument: &Expression) -> String {
        let text = self.expression(argument);
        let atomic = match argument {
            Expression::Value(value) => !value.body.starts_with('-'),
            Expression::FunctionCall(call) => call.args.is_empty(),
            Expression::ModuleReference(reference) => {
                matches!(reference.value.as_ref(), Expression::Value(_))
            }
            Expression::StringValue(_)
            | Expression::FormatStringValue(_)
            | Expression::ListValue(_)
            | Expression::ListRange(_)
            | Expression::ObjectLiteral(_)
            | Expression::Constructor(_) => true,
            Expression::IfStatement(_)
            | Expression::CaseStatement(_)
            | Expression::Binary(_)
            | Expression::Lambda(_)
            | Expression::LambdaCall(_) => false,
        };
        if atomic {
            text
        } else {
            format!("({text})")
        }
    }
}

fn import_line(module: &ImportModule) -> String {
    let mut line = match module.namespace {
        ImportNamespace::Global => format!("import {}", module.name),
        ImportNamespace::Relative => format!("import \"{}\"", module.name),
    };
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
                .map(|arg| format!("{}: {}", arg.name, arg.type_))
                .collect();
            format!("{} {{ {} }}", tag.name, fields.join(", "))
        })
        .collect();

    format!("type {} =\n{INDENT}{}", union.type_, tags.join(&format!("\n{INDENT}| ")))
}

fn type_alias(alias: &TypeAlias) -> String {
    if alias.properties.is_empty() {
        return format!("type alias {} = {{ }}", alias.type_);
    }
    let properties: Vec<String> = alias
        .properties
        .iter()
        .map(|property| format!("{INDENT}{}: {}", property.name, property.type_))
        .collect();
    format!("type alias {} = {{\n{}\n}}", alias.type_, properties.join(",\n"))
}

fn pattern(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Destructure(destructure) => destructure_pattern(destructure),
        Pattern::StringValue(string) => format!("\"{}\"", string.body),
        Pattern::FormatStringValue(string) => format!("`{}`", string.body),
        Pattern::EmptyList => "[]".to_string(),
        Pattern::ListDestructure(list) => list
            .parts
            .iter()
            .map(|part| match part {
                ListDestructurePart::EmptyList => "[]".to_string(),
                ListDestructurePart::StringValue(string) => format!("\"{}\"", string.body),
                ListDestructurePart::FormatStringValue(string) => format!("`{}`", string.body),
                ListDestructurePart::Value(value) => value.body.clone(),
                ListDestructurePart::Destructure(destructure) => destructure_pattern(destructure),
            })
            .collect::<Vec<_>>()
            .join(" :: "),
        Pattern::Default => "default".to_string(),
    }
}

fn destructure_pattern(destructure: &Destructure) -> String {
    if destructure.fields.is_empty() {
        format!("{} {{}}", destructure.constructor)
    } else {
        format!("{} {{ {} }}", destructure.constructor, destructure.fields.join(", "))
    }
}

/// Prefix every non-blank line with `levels` indents.
fn indent(text: &str, levels: usize) -> String {
    let prefix = INDENT.repeat(levels);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_leaves_blank_lines_empty() {
        assert_eq!(indent("a\n\nb", 1), "    a\n\n    b");
    }

    #[test]
    fn arguments_that_are_not_atoms_are_parenthesised() {
        let printer = DerwPrinter::new();
        let call = Expression::call(
            "f",
            vec![
                Expression::value("-1"),
                Expression::call("g", vec![Expression::value("x")]),
                Expression::value("y"),
            ],
        );
        assert_eq!(printer.expression(&call), "f (-1) (g x) y");
    }

    #[test]
    fn right_associative_chains_need_no_parens() {
        let printer = DerwPrinter::new();
        let list = Expression::binary(
            BinaryOperator::ListPrepend,
            Expression::value("1"),
            Expression::binary(
                BinaryOperator::ListPrepend,
                Expression::value("2"),
                Expression::value("xs"),
            ),
        );
        assert_eq!(printer.expression(&list), "1 :: 2 :: xs");

        let grouped = Expression::binary(
            BinaryOperator::Subtract,
            Expression::value("a"),
            Expression::binary(
                BinaryOperator::Subtract,
                Expression::value("b"),
                Expression::value("c"),
            ),
        );
        assert_eq!(printer.expression(&grouped), "a - (b - c)");
    }
}
