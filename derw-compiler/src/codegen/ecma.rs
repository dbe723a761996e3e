use derw_support::{is_builtin_type, name_from_path};

use super::stmt::{indent_tail, render, Stmt, INDENT};
use super::{export_tests, flatten_pipes, TempNames};
use crate::ast::*;

/// TypeScript and JavaScript output. The two differ only in whether type
/// declarations and annotations are emitted.
pub(crate) struct EcmaGenerator {
    pub(super) typed: bool,
    pub(super) temps: TempNames,
}

impl EcmaGenerator {
    pub(crate) fn new(typed: bool) -> Self {
        Self {
            typed,
            temps: TempNames::default(),
        }
    }

    pub(crate) fn module(&mut self, module: &Module) -> String {
        self.temps = TempNames::default();

        let mut blocks = Vec::new();
        if let Some(export) = export_tests(module) {
            blocks.push(export_block(&export));
        }
        for block in &module.body {
            let generated = self.block(block);
            if !generated.is_empty() {
                blocks.push(generated);
            }
        }
        blocks.join("\n\n")
    }

    fn block(&mut self, block: &Block) -> String {
        match block {
            Block::Import(import) => import_block(import),
            Block::Export(export) => export_block(export),
            Block::UnionType(union) => self.union_type(union),
            Block::TypeAlias(alias) => self.type_alias(alias),
            Block::Function(function) => self.function(function),
            Block::Const(constant) => self.constant(constant),
            Block::Comment(_) | Block::MultilineComment(_) => String::new(),
        }
    }

    fn union_type(&self, union: &UnionType) -> String {
        let mut sections: Vec<String> = union.tags.iter().map(|tag| self.tag(tag)).collect();

        if self.typed {
            let alternatives: Vec<String> = union.tags.iter().map(tag_type_name).collect();
            sections.push(format!(
                "type {} = {};",
                ts_type(&union.type_),
                alternatives.join(" | ")
            ));
        }

        sections.join("\n\n")
    }

    fn tag(&self, tag: &Tag) -> String {
        let constructor = format!(
            "    return {{\n        kind: \"{}\",\n        ...args,\n    }};\n}}",
            tag.name
        );

        if !self.typed {
            return format!("function {}(args) {{\n{constructor}", tag.name);
        }

        let name = tag_type_name(tag);
        let mut declaration = format!("type {name} = {{\n{INDENT}kind: \"{}\";", tag.name);
        for arg in &tag.args {
            declaration.push_str(&format!("\n{INDENT}{}: {};", arg.name, ts_type(&arg.type_)));
        }
        declaration.push_str("\n};");

        let args = if tag.args.is_empty() {
            "{}".to_string()
        } else {
            let fields: Vec<String> = tag
                .args
                .iter()
                .map(|arg| format!("{}: {}", arg.name, ts_type(&arg.type_)))
                .collect();
            format!("{{ {} }}", fields.join(", "))
        };

        format!("{declaration}\n\nfunction {name}(args: {args}): {name} {{\n{constructor}")
    }

    fn type_alias(&self, alias: &TypeAlias) -> String {
        let constructor = "    return {\n        ...args,\n    };\n}";
        let name = ts_type(&alias.type_);

        if !self.typed {
            return format!("function {name}(args) {{\n{constructor}");
        }

        let properties: Vec<String> = alias
            .properties
            .iter()
            .map(|property| format!("{}: {}", property.name, ts_type(&property.type_)))
            .collect();

        let mut declaration = format!("type {name} = {{");
        for property in &properties {
            declaration.push_str(&format!("\n{INDENT}{property};"));
        }
        declaration.push_str("\n}");

        let args = if properties.is_empty() {
            "{ }".to_string()
        } else {
            format!("{{ {} }}", properties.join(", "))
        };

        format!("{declaration}\n\nfunction {name}(args: {args}): {name} {{\n{constructor}")
    }

    fn function(&mut self, function: &Function) -> String {
        let args: Vec<String> = function
            .args
            .iter()
            .map(|arg| {
                let name = match arg {
                    FunctionArg::Named { name, .. } => name.clone(),
                    FunctionArg::Anonymous { index, .. } => format!("_{index}"),
                };
                self.annotated(&name, arg.type_())
            })
            .collect();

        let header = if self.typed {
            let mut parameters = Vec::new();
            for type_ in function
                .args
                .iter()
                .map(FunctionArg::type_)
                .chain(std::iter::once(&function.return_type))
            {
                collect_type_parameters(type_, &mut parameters);
            }
            let generics = if parameters.is_empty() {
                String::new()
            } else {
                format!("<{}>", parameters.join(", "))
            };
            format!(
                "function {}{generics}({}): {}",
                function.name,
                args.join(", "),
                ts_top_level_type(&function.return_type)
            )
        } else {
            format!("function {}({})", function.name, args.join(", "))
        };

        let body = self.body_statements(&function.let_body, &function.body);
        render(&[Stmt::block(header, body)])
    }

    fn constant(&mut self, constant: &Const) -> String {
        let value = if constant.let_body.is_empty() {
            self.expression(&constant.value)
        } else {
            let statements = self.body_statements(&constant.let_body, &constant.value);
            self.immediately_invoked(statements)
        };
        format!(
            "const {} = {};",
            self.annotated(&constant.name, &constant.type_),
            value
        )
    }

    fn annotated(&self, name: &str, type_: &Type) -> String {
        if self.typed {
            format!("{name}: {}", ts_top_level_type(type_))
        } else {
            name.to_string()
        }
    }

    /// Local definitions followed by the statements returning `body`.
    pub(super) fn body_statements(&mut self, let_body: &[Block], body: &Expression) -> Vec<Stmt> {
        let mut statements = Vec::new();
        for block in let_body {
            statements.push(Stmt::Line(self.block(block)));
        }
        statements.extend(self.returns(body));
        statements
    }

    fn returns(&mut self, expression: &Expression) -> Vec<Stmt> {
        match expression {
            Expression::IfStatement(statement) => vec![Stmt::IfElse {
                condition: self.expression(&statement.predicate),
                then_body: self.body_statements(&statement.if_let_body, &statement.if_body),
                else_body: self.body_statements(&statement.else_let_body, &statement.else_body),
            }],
            Expression::CaseStatement(statement) => self.case_statement(statement),
            _ => vec![Stmt::line(format!("return {};", self.expression(expression)))],
        }
    }

    fn immediately_invoked(&self, statements: Vec<Stmt>) -> String {
        let header = if self.typed {
            "(function (): any"
        } else {
            "(function ()"
        };
        let mut rendered = render(&[Stmt::block(header, statements)]);
        rendered.push_str(")()");
        rendered
    }

    /// Render in expression position: `if` becomes a ternary and `case`
    /// an immediately invoked function.
    pub(super) fn expression(&mut self, expression: &Expression) -> String {
        match expression {
            Expression::Value(value) => value.body.clone(),
            Expression::StringValue(string) => format!("\"{}\"", string.body),
            Expression::FormatStringValue(string) => format!("`{}`", string.body),
            Expression::ListValue(list) => {
                if list.items.is_empty() {
                    return "[ ]".to_string();
                }
                let items: Vec<String> =
                    list.items.iter().map(|item| self.expression(item)).collect();
                format!("[ {} ]", items.join(", "))
            }
            Expression::ListRange(range) => format!(
                "Array.from({{ length: {end} - {start} + 1 }}, (_x, i) => i + {start})",
                start = range.start.body,
                end = range.end.body
            ),
            Expression::ObjectLiteral(object) => self.object_literal(object),
            Expression::IfStatement(statement) => {
                if statement.if_let_body.is_empty() && statement.else_let_body.is_empty() {
                    self.inline_if(statement)
                } else {
                    let statements = self.returns(expression);
                    self.immediately_invoked(statements)
                }
            }
            Expression::CaseStatement(statement) => {
                let statements = self.case_statement(statement);
                self.immediately_invoked(statements)
            }
            Expression::Binary(binary) => self.binary(expression, binary),
            Expression::FunctionCall(call) => {
                let args: Vec<String> = call.args.iter().map(|arg| self.expression(arg)).collect();
                format!("{}({})", call.name, args.join(", "))
            }
            Expression::Lambda(lambda) => self.lambda(lambda),
            Expression::LambdaCall(call) => {
                let args: Vec<String> = call.args.iter().map(|arg| self.expression(arg)).collect();
                format!("({})({})", self.lambda(&call.lambda), args.join(", "))
            }
            Expression::Constructor(constructor) => {
                let pattern = &constructor.pattern;
                if pattern.fields.is_empty() && pattern.base.is_none() {
                    format!("{}({{ }})", constructor.constructor)
                } else {
                    format!("{}({})", constructor.constructor, self.object_literal(pattern))
                }
            }
            Expression::ModuleReference(reference) => {
                format!("{}.{}", reference.path.join("."), self.expression(&reference.value))
            }
        }
    }

    fn inline_if(&mut self, statement: &IfStatement) -> String {
        let predicate = self.operand(&statement.predicate, 1, false);
        let if_body = self.branch_value(&statement.if_body);
        let else_body = self.branch_value(&statement.else_body);
        format!("{predicate} ? {if_body} : {else_body}")
    }

    fn branch_value(&mut self, body: &Expression) -> String {
        let text = self.expression(body);
        if matches!(body, Expression::IfStatement(_)) && !text.starts_with("(function") {
            format!("( {text} )")
        } else {
            text
        }
    }

    fn object_literal(&mut self, object: &ObjectLiteral) -> String {
        let mut entries = Vec::new();
        if let Some(base) = &object.base {
            entries.push(format!("...{}", base.body));
        }
        for field in &object.fields {
            let value = self.expression(&field.value);
            if value == field.name {
                entries.push(field.name.clone());
            } else {
                entries.push(format!("{}: {}", field.name, value));
            }
        }

        match entries.len() {
            0 => "{ }".to_string(),
            1 => format!("{{ {} }}", entries[0]),
            _ => {
                let lines: Vec<String> = entries
                    .iter()
                    .map(|entry| format!("{INDENT}{}", indent_tail(entry, 1)))
                    .collect();
                format!("{{\n{}\n}}", lines.join(",\n"))
            }
        }
    }

    fn lambda(&mut self, lambda: &Lambda) -> String {
        let args: Vec<String> = lambda
            .args
            .iter()
            .map(|arg| {
                if self.typed {
                    format!("{arg}: any")
                } else {
                    arg.clone()
                }
            })
            .collect();
        let body = self.returns(&lambda.body);
        render(&[Stmt::block(format!("function({})", args.join(", ")), body)])
    }

    fn binary(&mut self, expression: &Expression, binary: &BinaryExpression) -> String {
        match binary.operator {
            BinaryOperator::LeftPipe | BinaryOperator::RightPipe => {
                let flattened = flatten_pipes(expression);
                if let Expression::Binary(unflattened) = &flattened {
                    let (function, argument) = match unflattened.operator {
                        BinaryOperator::LeftPipe => (&unflattened.right, &unflattened.left),
                        _ => (&unflattened.left, &unflattened.right),
                    };
                    let function = self.expression(function);
                    let argument = self.expression(argument);
                    return format!("({function})({argument})");
                }
                self.expression(&flattened)
            }
            BinaryOperator::ListPrepend => {
                let left = self.expression(&binary.left);
                let right = self.operand(&binary.right, PREFIX, false);
                format!("[ {left}, ...{right} ]")
            }
            operator => {
                let precedence = precedence_of(operator);
                let left = self.operand(&binary.left, precedence, false);
                let right = self.operand(&binary.right, precedence, true);
                format!("{left} {} {right}", symbol(operator))
            }
        }
    }

    /// Parenthesise `operand` when it binds looser than its parent.
    fn operand(&mut self, operand: &Expression, parent: u8, right_side: bool) -> String {
        let text = self.expression(operand);
        let own = expression_precedence(operand);
        if own < parent || (right_side && own == parent) {
            format!("({text})")
        } else {
            text
        }
    }
}

const PREFIX: u8 = 9;
const ATOM: u8 = 10;

fn precedence_of(operator: BinaryOperator) -> u8 {
    match operator {
        BinaryOperator::Or => 1,
        BinaryOperator::And => 2,
        BinaryOperator::Equal | BinaryOperator::NotEqual => 3,
        BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::Greater
        | BinaryOperator::GreaterEqual => 4,
        BinaryOperator::Add | BinaryOperator::Subtract => 5,
        BinaryOperator::Multiply | BinaryOperator::Divide => 6,
        BinaryOperator::ListPrepend | BinaryOperator::LeftPipe | BinaryOperator::RightPipe => ATOM,
    }
}

fn expression_precedence(expression: &Expression) -> u8 {
    match expression {
        Expression::Binary(binary) => precedence_of(binary.operator),
        Expression::IfStatement(statement)
            if statement.if_let_body.is_empty() && statement.else_let_body.is_empty() =>
        {
            0
        }
        Expression::Lambda(_) => 0,
        Expression::Value(value) if value.body.starts_with('-') => PREFIX,
        _ => ATOM,
    }
}

fn symbol(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::Equal => "===",
        BinaryOperator::NotEqual => "!==",
        other => other.symbol(),
    }
}

fn import_block(import: &Import) -> String {
    let lines: Vec<String> = import
        .modules
        .iter()
        .map(|module| {
            let name = match (&module.alias, module.namespace) {
                (Some(alias), _) => alias.clone(),
                (None, ImportNamespace::Relative) => name_from_path(&module.name),
                (None, ImportNamespace::Global) => module.name.clone(),
            };
            let source = format!("\"{}\"", module.name);
            let everything = format!("import * as {name} from {source};");

            if module.exposing.is_empty() {
                return everything;
            }
            let exposing = format!(
                "import {{ {} }} from {source};",
                module.exposing.join(", ")
            );
            if module.alias.is_some() {
                format!("{everything}\n{exposing}")
            } else {
                exposing
            }
        })
        .collect();
    lines.join("\n")
}

fn export_block(export: &Export) -> String {
    export
        .names
        .iter()
        .map(|name| format!("export {{ {name} }};"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The type name of a tag, generic over its non-builtin argument types.
fn tag_type_name(tag: &Tag) -> String {
    let args = tag
        .args
        .iter()
        .map(|arg| arg.type_.clone())
        .filter(|type_| !type_.name().is_some_and(is_builtin_type))
        .collect();
    ts_type(&Type::Fixed(tag.name.clone(), args))
}

/// Type parameters of a signature, deduplicated in order of appearance.
fn collect_type_parameters(type_: &Type, parameters: &mut Vec<String>) {
    match type_ {
        Type::Generic(name) => {
            if !is_builtin_type(name) && !parameters.contains(name) {
                parameters.push(name.clone());
            }
        }
        Type::Fixed(_, args) | Type::Function(args) => {
            for arg in args {
                collect_type_parameters(arg, parameters);
            }
        }
    }
}

fn ts_list_type(args: &[Type], element: fn(&Type) -> String) -> String {
    if let Some(first @ Type::Generic(_)) = args.first() {
        return format!("{}[]", element(first));
    }
    let fixed: Vec<String> = args
        .iter()
        .filter(|arg| matches!(arg, Type::Fixed(..)))
        .map(element)
        .collect();
    match fixed.as_slice() {
        [] => "any[]".to_string(),
        [single] => format!("{single}[]"),
        many => format!("({})[]", many.join(" | ")),
    }
}

/// A type in declaration position; only type variables are kept as
/// arguments of named types.
fn ts_type(type_: &Type) -> String {
    match type_ {
        Type::Generic(name) => name.clone(),
        Type::Fixed(name, args) if name == "List" => ts_list_type(args, ts_type),
        Type::Fixed(name, args) => {
            let generics: Vec<String> = args
                .iter()
                .filter(|arg| arg.is_generic())
                .map(ts_type)
                .collect();
            if generics.is_empty() {
                name.clone()
            } else {
                format!("{name}<{}>", generics.join(", "))
            }
        }
        Type::Function(args) => ts_function_type(args),
    }
}

/// A type annotating a value; concrete arguments are kept too.
fn ts_top_level_type(type_: &Type) -> String {
    match type_ {
        Type::Fixed(name, args) if name == "List" => ts_list_type(args, ts_top_level_type),
        Type::Fixed(name, args) if !args.is_empty() => {
            let rendered: Vec<String> = args.iter().map(ts_top_level_type).collect();
            format!("{name}<{}>", rendered.join(", "))
        }
        other => ts_type(other),
    }
}

fn ts_function_type(args: &[Type]) -> String {
    let Some((result, parameters)) = args.split_last() else {
        return "() => void".to_string();
    };
    let parameters: Vec<String> = parameters
        .iter()
        .enumerate()
        .map(|(index, parameter)| format!("arg{index}: {}", ts_type(parameter)))
        .collect();
    format!("({}) => {}", parameters.join(", "), ts_type(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_types_render_as_arrays() {
        assert_eq!(ts_type(&Type::list(Type::Generic("a".into()))), "a[]");
        assert_eq!(ts_type(&Type::list(Type::fixed("string"))), "string[]");
        assert_eq!(ts_type(&Type::fixed("List")), "any[]");
        assert_eq!(
            ts_type(&Type::list(Type::list(Type::fixed("number")))),
            "number[][]"
        );
    }

    #[test]
    fn declaration_types_keep_only_type_variables() {
        let maybe = Type::Fixed(
            "Result".into(),
            vec![Type::Generic("e".into()), Type::fixed("string")],
        );
        assert_eq!(ts_type(&maybe), "Result<e>");
        assert_eq!(ts_top_level_type(&maybe), "Result<e, string>");
    }

    #[test]
    fn function_types_name_their_parameters() {
        let mapper = Type::Function(vec![
            Type::Generic("a".into()),
            Type::Generic("b".into()),
        ]);
        assert_eq!(ts_type(&mapper), "(arg0: a) => b");
    }

    #[test]
    fn type_parameters_are_collected_once_in_order() {
        let mut parameters = Vec::new();
        for type_ in [
            Type::Function(vec![Type::Generic("a".into()), Type::Generic("b".into())]),
            Type::list(Type::Generic("a".into())),
            Type::Fixed("Maybe".into(), vec![Type::Generic("c".into())]),
        ] {
            collect_type_parameters(&type_, &mut parameters);
        }
        assert_eq!(parameters, vec!["a", "b", "c"]);
    }
}
