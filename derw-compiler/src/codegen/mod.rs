mod case;
mod derw;
mod ecma;
mod elm;
mod stmt;

use std::collections::{HashMap, HashSet};

use derw_support::hash_code;
use tracing::debug;

use crate::ast::*;

pub(crate) use derw::DerwPrinter;

pub fn generate_typescript(module: &Module) -> String {
    debug!(module = %module.name, "generating TypeScript");
    ecma::EcmaGenerator::new(true).module(module)
}

pub fn generate_javascript(module: &Module) -> String {
    debug!(module = %module.name, "generating JavaScript");
    ecma::EcmaGenerator::new(false).module(module)
}

pub fn generate_elm(module: &Module) -> String {
    debug!(module = %module.name, "generating Elm");
    elm::module(module)
}

/// Print `module` back as canonical source text.
pub fn generate_derw(module: &Module) -> String {
    debug!(module = %module.name, "printing source");
    DerwPrinter::new().module(module)
}

/// Modules named `*_test` export their `test*` definitions.
pub fn export_tests(module: &Module) -> Option<Export> {
    if !module.name.ends_with("_test") {
        return None;
    }

    let names: Vec<String> = module
        .body
        .iter()
        .filter_map(|block| match block {
            Block::Function(function) => Some(&function.name),
            Block::Const(constant) => Some(&constant.name),
            _ => None,
        })
        .filter(|name| name.starts_with("test"))
        .cloned()
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(Export { names })
    }
}

/// Rewrite pipes as direct application: `x |> f a` is `f a x` and
/// `f <| x` is `f x`. Pipes whose function side is not a name, call,
/// module reference or lambda are left as they are.
pub(crate) fn flatten_pipes(expression: &Expression) -> Expression {
    let Expression::Binary(binary) = expression else {
        return expression.clone();
    };
    let (function, argument) = match binary.operator {
        BinaryOperator::LeftPipe => (&binary.right, &binary.left),
        BinaryOperator::RightPipe => (&binary.left, &binary.right),
        _ => return expression.clone(),
    };

    let argument = flatten_pipes(argument);
    let function = flatten_pipes(function);
    apply(&function, argument).unwrap_or_else(|| expression.clone())
}

fn apply(function: &Expression, argument: Expression) -> Option<Expression> {
    match function {
        Expression::Value(value) => Some(Expression::call(&value.body, vec![argument])),
        Expression::FunctionCall(call) => {
            let mut args = call.args.clone();
            args.push(argument);
            Some(Expression::call(&call.name, args))
        }
        Expression::ModuleReference(reference) => {
            let value = apply(&reference.value, argument)?;
            Some(Expression::ModuleReference(ModuleReference {
                path: reference.path.clone(),
                value: Box::new(value),
            }))
        }
        Expression::Lambda(lambda) => Some(Expression::LambdaCall(LambdaCall {
            lambda: lambda.clone(),
            args: vec![argument],
        })),
        Expression::LambdaCall(call) => {
            let mut args = call.args.clone();
            args.push(argument);
            Some(Expression::LambdaCall(LambdaCall {
                lambda: call.lambda.clone(),
                args,
            }))
        }
        _ => None,
    }
}

/// Temporary names for case predicates: `_res` plus the hash of the
/// rendered predicate. Two different predicates that hash alike get
/// `_1`, `_2`, ... suffixes in order of first use.
#[derive(Debug, Default)]
pub(crate) struct TempNames {
    by_predicate: HashMap<String, String>,
    taken: HashSet<String>,
}

impl TempNames {
    pub(crate) fn name_for(&mut self, predicate: &str) -> String {
        if let Some(name) = self.by_predicate.get(predicate) {
            return name.clone();
        }

        let base = format!("_res{}", hash_code(predicate));
        let mut name = base.clone();
        let mut suffix = 1;
        while self.taken.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }

        self.taken.insert(name.clone());
        self.by_predicate.insert(predicate.to_string(), name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_names_are_stable_per_predicate() {
        let mut names = TempNames::default();
        let first = names.name_for("x");
        assert_eq!(first, format!("_res{}", hash_code("x")));
        assert_eq!(names.name_for("x"), first);
        assert_ne!(names.name_for("y"), first);
    }

    #[test]
    fn colliding_hashes_get_suffixes() {
        // "Aa" and "BB" share a 31-based hash.
        assert_eq!(hash_code("Aa"), hash_code("BB"));
        let mut names = TempNames::default();
        let first = names.name_for("Aa");
        let second = names.name_for("BB");
        assert_eq!(second, format!("{first}_1"));
    }

    #[test]
    fn pipes_flatten_into_calls() {
        let piped = Expression::binary(
            BinaryOperator::LeftPipe,
            Expression::binary(
                BinaryOperator::LeftPipe,
                Expression::value("xs"),
                Expression::call("map", vec![Expression::value("f")]),
            ),
            Expression::value("sum"),
        );
        assert_eq!(
            flatten_pipes(&piped),
            Expression::call(
                "sum",
                vec![Expression::call(
                    "map",
                    vec![Expression::value("f"), Expression::value("xs")]
                )]
            )
        );
    }

    #[test]
    fn right_pipe_applies_directly() {
        let piped = Expression::binary(
            BinaryOperator::RightPipe,
            Expression::value("f"),
            Expression::value("x"),
        );
        assert_eq!(
            flatten_pipes(&piped),
            Expression::call("f", vec![Expression::value("x")])
        );
    }
}
