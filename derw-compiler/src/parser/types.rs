use derw_support::is_builtin_type;

use super::{is_capitalised, ParseResult};
use crate::ast::{ParseError, Type};
use crate::lexer::{tokenize_type, Token, TokenKind, TypeToken};

/// A type name on its own: builtins and capitalised names are fixed,
/// anything else is a type variable.
pub(crate) fn named_type(name: &str) -> Type {
    if is_builtin_type(name) || is_capitalised(name) {
        Type::fixed(name)
    } else {
        Type::Generic(name.to_string())
    }
}

/// Each arrow-separated type of a signature, in order.
pub(super) fn parse_signature(tokens: &[Token]) -> ParseResult<Vec<Type>> {
    let line = line_of(tokens);
    let type_tokens =
        tokenize_type(tokens).map_err(|error| ParseError::new(error.to_string(), line))?;
    type_tokens
        .iter()
        .map(|type_token| from_type_token(type_token, line))
        .collect()
}

/// A single type; an unparenthesised arrow chain becomes a function type.
pub(super) fn parse_type(tokens: &[Token]) -> ParseResult<Type> {
    let mut types = parse_signature(tokens)?;
    if types.len() == 1 {
        Ok(types.remove(0))
    } else {
        Ok(Type::Function(types))
    }
}

fn from_type_token(type_token: &TypeToken, line: usize) -> ParseResult<Type> {
    match type_token {
        TypeToken::FunctionType(tokens) => Ok(Type::Function(parse_signature(tokens)?)),
        TypeToken::BaseType(tokens) => base_type(tokens, line),
    }
}

/// `name arg arg`, where each argument is a name or a parenthesised type.
fn base_type(tokens: &[Token], line: usize) -> ParseResult<Type> {
    let Some((head, rest)) = tokens.split_first() else {
        return Err(ParseError::new("Expected a type name", line));
    };
    if head.kind != TokenKind::Identifier {
        return Err(ParseError::new(
            format!("Expected a type name but found `{}`", head.body),
            head.line,
        ));
    }

    let mut args = Vec::new();
    let mut index = 0;
    while index < rest.len() {
        let token = &rest[index];
        match token.kind {
            TokenKind::Identifier => {
                args.push(named_type(&token.body));
                index += 1;
            }
            TokenKind::OpenBracket => {
                let close = closing_bracket(rest, index).ok_or_else(|| {
                    ParseError::new("Expected `)` to close type argument", token.line)
                })?;
                args.push(parse_type(&rest[index + 1..close])?);
                index = close + 1;
            }
            _ => {
                return Err(ParseError::new(
                    format!("Unexpected `{}` in type `{}`", token.body, head.body),
                    token.line,
                ))
            }
        }
    }

    if args.is_empty() {
        Ok(named_type(&head.body))
    } else {
        Ok(Type::Fixed(head.body.clone(), args))
    }
}

fn closing_bracket(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::OpenBracket => depth += 1,
            TokenKind::CloseBracket => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn line_of(tokens: &[Token]) -> usize {
    tokens.first().map(|token| token.line).unwrap_or(1)
}
