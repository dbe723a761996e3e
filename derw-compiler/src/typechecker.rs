use thiserror::Error;
use tracing::debug;

use crate::ast::*;
use crate::diagnostics::Diagnostics;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Conflicting types: {0}, {1}")]
    Conflicting(Type, Type),
    #[error("Mismatching types between {0} and {1}")]
    Mismatching(Type, Type),
    #[error("Invalid types in :: - lefthand ({0}) must match elements of righthand ({1})")]
    InvalidListPrepend(String, String),
}

/// Infer the type of `expression` given the union types in scope.
///
/// Inference is structural and does not unify: branches and list items
/// must agree, arithmetic needs numbers, and names, calls, pipes and
/// lambdas are `any`. `any` and type variables agree with everything.
pub fn infer_type(expression: &Expression, unions: &[UnionType]) -> Result<Type, TypeError> {
    Inference { unions }.infer(expression)
}

struct Inference<'u> {
    unions: &'u [UnionType],
}

impl Inference<'_> {
    fn infer(&self, expression: &Expression) -> Result<Type, TypeError> {
        match expression {
            Expression::Value(value) => Ok(value_type(&value.body)),
            Expression::StringValue(_) | Expression::FormatStringValue(_) => {
                Ok(Type::fixed("string"))
            }
            Expression::ListValue(list) => {
                let element = self.agreeing(list.items.iter())?;
                Ok(Type::list(element))
            }
            Expression::ListRange(_) => Ok(Type::list(Type::fixed("number"))),
            Expression::ObjectLiteral(_) => Ok(Type::any()),
            Expression::IfStatement(statement) => {
                let if_type = self.infer(&statement.if_body)?;
                let else_type = self.infer(&statement.else_body)?;
                merge(if_type, else_type).map_err(|(a, b)| TypeError::Conflicting(a, b))
            }
            Expression::CaseStatement(statement) => {
                self.agreeing(statement.branches.iter().map(|branch| &branch.body))
            }
            Expression::Binary(binary) => self.binary(binary),
            Expression::FunctionCall(_)
            | Expression::Lambda(_)
            | Expression::LambdaCall(_)
            | Expression::ModuleReference(_) => Ok(Type::any()),
            Expression::Constructor(constructor) => Ok(self.union_of(&constructor.constructor)),
        }
    }

    /// The shared type of `expressions`, `any` when there are none.
    fn agreeing<'e>(
        &self,
        expressions: impl Iterator<Item = &'e Expression>,
    ) -> Result<Type, TypeError> {
        let mut current: Option<Type> = None;
        for expression in expressions {
            let next = self.infer(expression)?;
            current = Some(match current {
                None => next,
                Some(existing) => {
                    merge(existing, next).map_err(|(a, b)| TypeError::Conflicting(a, b))?
                }
            });
        }
        Ok(current.unwrap_or_else(Type::any))
    }

    fn binary(&self, binary: &BinaryExpression) -> Result<Type, TypeError> {
        let operator = binary.operator;
        if operator.is_arithmetic() {
            let left = self.infer(&binary.left)?;
            let right = self.infer(&binary.right)?;
            let number = Type::fixed("number");
            let accepts = |t: &Type| t.is_any() || *t == number;
            if accepts(&left) && accepts(&right) {
                return Ok(number);
            }
            return Err(TypeError::Mismatching(left, right));
        }

        match operator {
            BinaryOperator::ListPrepend => self.list_prepend(&binary.left, &binary.right),
            BinaryOperator::LeftPipe | BinaryOperator::RightPipe => Ok(Type::any()),
            _ => Ok(Type::fixed("boolean")),
        }
    }

    fn list_prepend(&self, left: &Expression, right: &Expression) -> Result<Type, TypeError> {
        let head = self.infer(left)?;
        let tail = self.infer(right)?;

        if tail.is_any() || tail.is_generic() {
            return Ok(Type::list(head));
        }

        let conflict = |element: &Type| {
            TypeError::InvalidListPrepend(
                self.label(left, &head),
                match first_item(right) {
                    Some(item) => self.label(item, element),
                    None => element.to_string(),
                },
            )
        };

        match tail.list_element() {
            Some(element) => merge(head.clone(), element.clone())
                .map(Type::list)
                .map_err(|_| conflict(element)),
            None => Err(conflict(&tail)),
        }
    }

    /// Constructor operands are named after their union.
    fn label(&self, expression: &Expression, inferred: &Type) -> String {
        match (expression, inferred.name()) {
            (Expression::Constructor(_), Some(name)) => name.to_string(),
            _ => inferred.to_string(),
        }
    }

    fn union_of(&self, tag: &str) -> Type {
        self.unions
            .iter()
            .find(|union| union.tags.iter().any(|candidate| candidate.name == tag))
            .map(|union| union.type_.clone())
            .unwrap_or_else(|| Type::fixed(tag))
    }
}

fn first_item(expression: &Expression) -> Option<&Expression> {
    match expression {
        Expression::ListValue(list) => list.items.first(),
        Expression::Binary(binary) if binary.operator == BinaryOperator::ListPrepend => {
            Some(&binary.left)
        }
        _ => None,
    }
}

fn value_type(body: &str) -> Type {
    let digits = body.strip_prefix('-').unwrap_or(body);
    if digits.starts_with(|ch: char| ch.is_ascii_digit()) && digits.parse::<f64>().is_ok() {
        Type::fixed("number")
    } else if body == "true" || body == "false" {
        Type::fixed("boolean")
    } else {
        Type::any()
    }
}

/// Whether two types can describe the same value, treating `any` and type
/// variables as wildcards.
pub(crate) fn agree(a: &Type, b: &Type) -> bool {
    if a.is_any() || b.is_any() || a.is_generic() || b.is_generic() {
        return true;
    }
    match (a, b) {
        (Type::Fixed(left_name, left_args), Type::Fixed(right_name, right_args)) => {
            left_name == right_name
                && left_args.len() == right_args.len()
                && left_args.iter().zip(right_args).all(|(l, r)| agree(l, r))
        }
        (Type::Function(left), Type::Function(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| agree(l, r))
        }
        _ => false,
    }
}

/// The more specific of two agreeing types.
fn merge(a: Type, b: Type) -> Result<Type, (Type, Type)> {
    if !agree(&a, &b) {
        return Err((a, b));
    }
    if a.is_any() || a.is_generic() {
        Ok(b)
    } else {
        Ok(a)
    }
}

/// Checks declared types of constants and function bodies against what
/// their expressions infer to.
pub struct TypeChecker {
    diagnostics: Diagnostics,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn check_module(&mut self, module: &Module) {
        let unions: Vec<UnionType> = module
            .body
            .iter()
            .filter_map(|block| match block {
                Block::UnionType(union) => Some(union.clone()),
                _ => None,
            })
            .collect();

        for block in &module.body {
            match block {
                Block::Const(constant) => {
                    self.check_value(&constant.name, &constant.type_, &constant.value, &unions)
                }
                Block::Function(function) => {
                    self.check_value(&function.name, &function.return_type, &function.body, &unions)
                }
                _ => {}
            }
        }

        debug!(
            module = %module.name,
            problems = self.diagnostics.entries().len(),
            "type checked module"
        );
    }

    fn check_value(&mut self, name: &str, declared: &Type, value: &Expression, unions: &[UnionType]) {
        match infer_type(value, unions) {
            Ok(inferred) if !agree(declared, &inferred) => self
                .diagnostics
                .push(format!("Expected {declared} but got {inferred} in `{name}`")),
            Ok(_) => {}
            Err(error) => self.diagnostics.push(format!("{error} in `{name}`")),
        }
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

/// Type-check every definition of `module`.
pub fn check_module(module: &Module) -> Diagnostics {
    let mut checker = TypeChecker::new();
    checker.check_module(module);
    checker.into_diagnostics()
}
