use super::{is_capitalised, unquote, ParseResult, Parser};
use crate::ast::*;
use crate::lexer::{Keyword, Operator, Token, TokenKind};

fn is_empty_list(token: &Token) -> bool {
    token.kind == TokenKind::Literal
        && token.body.starts_with('[')
        && token.body[1..token.body.len() - 1].trim().is_empty()
}

impl<'t> Parser<'t> {
    /// The pattern left of a case branch's `->`.
    pub(super) fn pattern(&mut self) -> ParseResult<Pattern> {
        if self.at_end() {
            return Err(self.error("Expected a pattern before `->`"));
        }

        let cons = TokenKind::Operator(Operator::Cons);
        if (self.pos..self.end).any(|index| self.tokens[index].kind == cons) {
            return self.list_destructure().map(Pattern::ListDestructure);
        }

        let Some(token) = self.advance() else {
            return Err(self.error("Expected a pattern before `->`"));
        };
        let pattern = match token.kind {
            TokenKind::String => Pattern::StringValue(StringValue {
                body: unquote(&token.body),
            }),
            TokenKind::FormatString => Pattern::FormatStringValue(FormatStringValue {
                body: unquote(&token.body),
            }),
            TokenKind::Literal if is_empty_list(token) => Pattern::EmptyList,
            TokenKind::Keyword(Keyword::Default) => Pattern::Default,
            TokenKind::Identifier if is_capitalised(&token.body) => {
                Pattern::Destructure(self.destructure(&token.body)?)
            }
            _ => {
                return Err(ParseError::new(
                    format!("Expected a pattern but found `{}`", token.body),
                    token.line,
                ))
            }
        };

        self.finish("pattern")?;
        Ok(pattern)
    }

    /// The optional `{ a, b }` after a tag name.
    fn destructure(&mut self, constructor: &str) -> ParseResult<Destructure> {
        let mut fields = Vec::new();
        if self.check(TokenKind::OpenCurly) {
            self.pos += 1;
            loop {
                match self.advance() {
                    Some(token) if token.kind == TokenKind::CloseCurly => break,
                    Some(token) if token.kind == TokenKind::Identifier => {
                        fields.push(token.body.clone());
                        if !self.check(TokenKind::CloseCurly) {
                            self.expect(TokenKind::Comma, "between destructured fields")?;
                        }
                    }
                    Some(token) => {
                        return Err(ParseError::new(
                            format!(
                                "Expected a field name in `{constructor}` pattern but found `{}`",
                                token.body
                            ),
                            token.line,
                        ))
                    }
                    None => {
                        return Err(self.error(format!(
                            "Expected `}}` to close the `{constructor}` pattern"
                        )))
                    }
                }
            }
        }

        Ok(Destructure {
            constructor: constructor.to_string(),
            fields,
        })
    }

    /// `a :: B { x } :: "c" :: rest`
    fn list_destructure(&mut self) -> ParseResult<ListDestructure> {
        let segments =
            self.split_top_level(self.pos, self.end, TokenKind::Operator(Operator::Cons));
        let count = segments.len();

        let mut parts = Vec::with_capacity(count);
        for (position, (start, end)) in segments.into_iter().enumerate() {
            let mut segment = self.window(start, end);
            let part = segment.list_part()?;
            if part == ListDestructurePart::EmptyList && position + 1 != count {
                return Err(segment.error("`[]` can only end a list pattern"));
            }
            parts.push(part);
        }

        self.pos = self.end;
        Ok(ListDestructure { parts })
    }

    fn list_part(&mut self) -> ParseResult<ListDestructurePart> {
        let Some(token) = self.advance() else {
            return Err(self.error("Expected a pattern on each side of `::`"));
        };

        let part = match token.kind {
            TokenKind::String => ListDestructurePart::StringValue(StringValue {
                body: unquote(&token.body),
            }),
            TokenKind::FormatString => ListDestructurePart::FormatStringValue(FormatStringValue {
                body: unquote(&token.body),
            }),
            TokenKind::Literal if is_empty_list(token) => ListDestructurePart::EmptyList,
            TokenKind::Identifier if is_capitalised(&token.body) => {
                ListDestructurePart::Destructure(self.destructure(&token.body)?)
            }
            TokenKind::Identifier if !token.body.contains('.') => {
                ListDestructurePart::Value(Value {
                    body: token.body.clone(),
                })
            }
            _ => {
                return Err(ParseError::new(
                    format!("Invalid list pattern part `{}`", token.body),
                    token.line,
                ))
            }
        };

        self.finish("list pattern part")?;
        Ok(part)
    }
}
