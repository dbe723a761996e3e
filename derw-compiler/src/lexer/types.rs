use serde::Serialize;
use thiserror::Error;

use super::{tokens_to_string, Token, TokenKind};

/// One arrow-separated segment of a type annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeToken {
    /// A plain type such as `number` or `List (Maybe a)`. Redundant
    /// wrapping parentheses are removed.
    BaseType(Vec<Token>),
    /// A parenthesised function type such as `(a -> b)`, holding the
    /// tokens between the parentheses.
    FunctionType(Vec<Token>),
}

impl TypeToken {
    pub fn tokens(&self) -> &[Token] {
        match self {
            TypeToken::BaseType(tokens) | TypeToken::FunctionType(tokens) => tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeTokenError {
    #[error("Expected a type but found nothing")]
    Empty,
    #[error("Unbalanced brackets in type `{0}`")]
    Unbalanced(String),
    #[error("Expected a type on both sides of `->` in `{0}`")]
    MissingSegment(String),
}

/// Classify the tokens of a type annotation into its top-level segments.
/// Whitespace and comments are dropped.
///
/// `(a -> b) -> a -> b` yields
/// `[FunctionType(a -> b), BaseType(a), BaseType(b)]`.
pub fn tokenize_type(tokens: &[Token]) -> Result<Vec<TypeToken>, TypeTokenError> {
    let significant: Vec<Token> = tokens
        .iter()
        .filter(|token| !token.is_trivia())
        .cloned()
        .collect();

    if significant.is_empty() {
        return Err(TypeTokenError::Empty);
    }
    if !balanced(&significant) {
        return Err(TypeTokenError::Unbalanced(tokens_to_string(tokens)));
    }

    let mut segments = Vec::new();
    for segment in split_top_level_arrows(&significant) {
        if segment.is_empty() {
            return Err(TypeTokenError::MissingSegment(
                tokens_to_string(tokens).trim().to_string(),
            ));
        }
        segments.push(classify(segment));
    }
    Ok(segments)
}

fn classify(segment: &[Token]) -> TypeToken {
    let mut inner = segment;
    while let Some(stripped) = strip_wrapping_parens(inner) {
        if split_top_level_arrows(stripped).len() > 1 {
            return TypeToken::FunctionType(stripped.to_vec());
        }
        inner = stripped;
    }
    TypeToken::BaseType(inner.to_vec())
}

/// The contents of `tokens` when its first `(` is closed by its last `)`.
fn strip_wrapping_parens(tokens: &[Token]) -> Option<&[Token]> {
    let first = tokens.first()?;
    let last = tokens.last()?;
    if tokens.len() < 2
        || first.kind != TokenKind::OpenBracket
        || last.kind != TokenKind::CloseBracket
    {
        return None;
    }

    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::OpenBracket => depth += 1,
            TokenKind::CloseBracket => {
                depth -= 1;
                if depth == 0 && index != tokens.len() - 1 {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(&tokens[1..tokens.len() - 1])
}

fn split_top_level_arrows(tokens: &[Token]) -> Vec<&[Token]> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::OpenBracket => depth += 1,
            TokenKind::CloseBracket => depth = depth.saturating_sub(1),
            TokenKind::Arrow if depth == 0 => {
                segments.push(&tokens[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    segments.push(&tokens[start..]);
    segments
}

fn balanced(tokens: &[Token]) -> bool {
    let mut depth = 0i64;
    for token in tokens {
        match token.kind {
            TokenKind::OpenBracket => depth += 1,
            TokenKind::CloseBracket => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
