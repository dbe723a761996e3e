use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    pub body: Vec<Block>,
    pub errors: Vec<ParseError>,
}

impl Module {
    pub fn new(name: impl Into<String>, body: Vec<Block>, errors: Vec<ParseError>) -> Self {
        Self {
            name: name.into(),
            body,
            errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Type {
    Generic(String),
    Fixed(String, Vec<Type>),
    /// Argument types followed by the return type.
    Function(Vec<Type>),
}

impl Type {
    pub fn fixed(name: impl Into<String>) -> Self {
        Type::Fixed(name.into(), Vec::new())
    }

    pub fn list(element: Type) -> Self {
        Type::Fixed("List".to_string(), vec![element])
    }

    pub fn any() -> Self {
        Type::fixed("any")
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Fixed(name, args) if name == "any" && args.is_empty())
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Type::Generic(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Generic(name) | Type::Fixed(name, _) => Some(name),
            Type::Function(_) => None,
        }
    }

    /// Element type when this is `List t`.
    pub fn list_element(&self) -> Option<&Type> {
        match self {
            Type::Fixed(name, args) if name == "List" && args.len() == 1 => args.first(),
            _ => None,
        }
    }

    fn fmt_argument(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Fixed(_, args) if !args.is_empty() => write!(f, "({self})"),
            Type::Function(_) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

/// Renders in source syntax: `List (Maybe a)`, `(a -> b) -> a -> b`.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Generic(name) => write!(f, "{name}"),
            Type::Fixed(name, args) => {
                write!(f, "{name}")?;
                for arg in args {
                    write!(f, " ")?;
                    arg.fmt_argument(f)?;
                }
                Ok(())
            }
            Type::Function(args) => {
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, " -> ")?;
                    }
                    match arg {
                        Type::Function(_) => write!(f, "({arg})")?,
                        _ => write!(f, "{arg}")?,
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Block {
    Import(Import),
    Export(Export),
    UnionType(UnionType),
    TypeAlias(TypeAlias),
    Function(Function),
    Const(Const),
    Comment(Comment),
    MultilineComment(Comment),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub modules: Vec<ImportModule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportNamespace {
    /// A bare module name such as `fs`.
    Global,
    /// A quoted path such as `"./utils"`.
    Relative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportModule {
    pub name: String,
    pub alias: Option<String>,
    pub exposing: Vec<String>,
    pub namespace: ImportNamespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionType {
    pub type_: Type,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub args: Vec<TagArg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagArg {
    pub name: String,
    pub type_: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeAlias {
    pub type_: Type,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name: String,
    pub type_: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    pub args: Vec<FunctionArg>,
    pub let_body: Vec<Block>,
    pub body: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FunctionArg {
    Named { name: String, type_: Type },
    /// Declared in the signature but not bound to a name in the definition.
    Anonymous { index: usize, type_: Type },
}

impl FunctionArg {
    pub fn type_(&self) -> &Type {
        match self {
            FunctionArg::Named { type_, .. } | FunctionArg::Anonymous { type_, .. } => type_,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Const {
    pub name: String,
    pub type_: Type,
    pub let_body: Vec<Block>,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expression {
    Value(Value),
    StringValue(StringValue),
    FormatStringValue(FormatStringValue),
    ListValue(ListValue),
    ListRange(ListRange),
    ObjectLiteral(ObjectLiteral),
    IfStatement(IfStatement),
    CaseStatement(CaseStatement),
    Binary(BinaryExpression),
    FunctionCall(FunctionCall),
    Lambda(Lambda),
    LambdaCall(LambdaCall),
    Constructor(Constructor),
    ModuleReference(ModuleReference),
}

impl Expression {
    pub fn value(body: impl Into<String>) -> Self {
        Expression::Value(Value { body: body.into() })
    }

    pub fn string(body: impl Into<String>) -> Self {
        Expression::StringValue(StringValue { body: body.into() })
    }

    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall(FunctionCall {
            name: name.into(),
            args,
        })
    }
}

/// Numbers, booleans and identifiers, kept as their source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Value {
    pub body: String,
}

/// Text between the quotes, escapes preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringValue {
    pub body: String,
}

/// Text between the backticks, `${...}` holes preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatStringValue {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListValue {
    pub items: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRange {
    pub start: Value,
    pub end: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectLiteral {
    pub base: Option<Value>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IfStatement {
    pub predicate: Box<Expression>,
    pub if_body: Box<Expression>,
    pub if_let_body: Vec<Block>,
    pub else_body: Box<Expression>,
    pub else_let_body: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseStatement {
    pub predicate: Box<Expression>,
    pub branches: Vec<Branch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub pattern: Pattern,
    pub body: Expression,
    pub let_body: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Pattern {
    Destructure(Destructure),
    StringValue(StringValue),
    FormatStringValue(FormatStringValue),
    EmptyList,
    ListDestructure(ListDestructure),
    Default,
}

/// `Tag { a, b }`: match a tag and bind some of its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destructure {
    pub constructor: String,
    pub fields: Vec<String>,
}

/// `head :: middle :: Tag {} :: rest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListDestructure {
    pub parts: Vec<ListDestructurePart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ListDestructurePart {
    EmptyList,
    StringValue(StringValue),
    FormatStringValue(FormatStringValue),
    Value(Value),
    Destructure(Destructure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    ListPrepend,
    LeftPipe,
    RightPipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
    None,
}

impl BinaryOperator {
    /// Binding power in source syntax; application binds tighter than all.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual => 3,
            BinaryOperator::Add | BinaryOperator::Subtract => 4,
            BinaryOperator::Multiply | BinaryOperator::Divide => 5,
            BinaryOperator::LeftPipe | BinaryOperator::RightPipe => 6,
            BinaryOperator::ListPrepend => 7,
        }
    }

    pub fn associativity(self) -> Associativity {
        match self {
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual => Associativity::None,
            BinaryOperator::ListPrepend | BinaryOperator::RightPipe => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::ListPrepend => "::",
            BinaryOperator::LeftPipe => "|>",
            BinaryOperator::RightPipe => "<|",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
        )
    }

    pub fn is_comparison(self) -> bool {
        self.associativity() == Associativity::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lambda {
    pub args: Vec<String>,
    pub body: Box<Expression>,
}

/// A lambda applied in place; produced when a pipe feeds a lambda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LambdaCall {
    pub lambda: Lambda,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constructor {
    pub constructor: String,
    pub pattern: ObjectLiteral,
}

/// `List.map f xs` is `ModuleReference { path: ["List"], value: map f xs }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleReference {
    pub path: Vec<String>,
    pub value: Box<Expression>,
}
