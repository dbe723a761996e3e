mod ast;
mod codegen;
mod compiler;
mod diagnostics;
mod formatter;
mod lexer;
mod parser;
mod source;
mod typechecker;

pub use crate::ast::{
    Associativity, BinaryExpression, BinaryOperator, Block, Branch, CaseStatement, Comment, Const,
    Constructor, Destructure, Export, Expression, Field, FormatStringValue, Function, FunctionArg,
    FunctionCall, IfStatement, Import, ImportModule, ImportNamespace, Lambda, LambdaCall,
    ListDestructure, ListDestructurePart, ListRange, ListValue, Module, ModuleReference,
    ObjectLiteral, ParseError, Pattern, Property, StringValue, Tag, TagArg, Type, TypeAlias,
    UnionType, Value,
};
pub use crate::codegen::{
    export_tests, generate_derw, generate_elm, generate_javascript, generate_typescript,
};
pub use crate::compiler::{Compilation, CompileOptions, Compiler, Target};
pub use crate::diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics};
pub use crate::formatter::format_source;
pub use crate::lexer::{
    tokenize, tokenize_at, tokenize_type, tokens_to_string, Keyword, Lexer, Operator, Token,
    TokenKind, TypeToken, TypeTokenError,
};
pub use crate::parser::{parse, parse_expression, parse_module};
pub use crate::source::{SourceFile, SourceId};
pub use crate::typechecker::{check_module, infer_type, TypeChecker, TypeError};
