use std::ops::Range;

use tracing::{debug, warn};

use super::types::{parse_signature, parse_type};
use super::{significant, unquote, ParseResult, Parser};
use crate::ast::*;
use crate::lexer::{tokenize, Keyword, Operator, Token, TokenKind};

pub fn parse(source: &str) -> Module {
    parse_module(source, "Main")
}

/// Parse a whole module. A block that fails to parse is recorded in
/// `Module::errors` and the remaining blocks still parse.
pub fn parse_module(source: &str, name: &str) -> Module {
    let tokens: Vec<Token> = tokenize(source)
        .into_iter()
        .filter(|token| token.kind != TokenKind::Whitespace)
        .collect();

    let mut body = Vec::new();
    let mut errors = Vec::new();
    for range in split_blocks(&tokens, 0..tokens.len()) {
        match parse_block(&tokens[range]) {
            Ok(Some(block)) => body.push(block),
            Ok(None) => {}
            Err(error) => {
                warn!(module = name, line = error.line, "{}", error.message);
                errors.push(error);
            }
        }
    }

    debug!(module = name, blocks = body.len(), errors = errors.len(), "parsed module");
    Module::new(name, body, errors)
}

/// Partition `range` into blocks. A block starts at every token that opens
/// a line at or left of the first token's column, except for closing
/// brackets, union `|` continuations, and a definition following its own
/// signature.
fn split_blocks(tokens: &[Token], range: Range<usize>) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let Some(first) = tokens.get(range.start) else {
        return blocks;
    };
    let column = first.column;

    let mut start = range.start;
    for index in range.start + 1..range.end {
        if opens_block(tokens, start, index, column) {
            blocks.push(start..index);
            start = index;
        }
    }
    blocks.push(start..range.end);
    blocks
}

fn opens_block(tokens: &[Token], block_start: usize, index: usize, column: usize) -> bool {
    let token = &tokens[index];
    let starts_line = tokens[index - 1].end_line() < token.line;
    if !starts_line || token.column > column {
        return false;
    }

    let head = &tokens[block_start];
    if is_comment(token) || is_comment(head) {
        return true;
    }
    if matches!(
        token.kind,
        TokenKind::CloseCurly | TokenKind::CloseBracket | TokenKind::Pipe
    ) {
        return false;
    }

    let continues_signature = head.kind == TokenKind::Identifier
        && token.kind == TokenKind::Identifier
        && token.body == head.body
        && tokens.get(block_start + 1).map(|t| t.kind) == Some(TokenKind::Colon)
        && !tokens[block_start..index]
            .iter()
            .any(|t| t.kind == TokenKind::Assign);
    !continues_signature
}

fn is_comment(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Comment | TokenKind::MultilineComment)
}

fn parse_block(tokens: &[Token]) -> ParseResult<Option<Block>> {
    if let [comment] = tokens {
        let body = comment.body.clone();
        match comment.kind {
            TokenKind::Comment => return Ok(Some(Block::Comment(Comment { body }))),
            TokenKind::MultilineComment => {
                return Ok(Some(Block::MultilineComment(Comment { body })))
            }
            _ => {}
        }
    }

    let tokens = significant(tokens.to_vec());
    if tokens.is_empty() {
        return Ok(None);
    }
    Parser::new(&tokens).block().map(Some)
}

impl<'t> Parser<'t> {
    fn block(&mut self) -> ParseResult<Block> {
        let Some(token) = self.peek() else {
            return Err(self.error("Expected a declaration but found end of input"));
        };

        match token.kind {
            TokenKind::Keyword(Keyword::Import) => self.import().map(Block::Import),
            TokenKind::Keyword(Keyword::Exposing) => self.export().map(Block::Export),
            TokenKind::Keyword(Keyword::Type) => {
                if self.peek_at(1).map(|t| t.kind) == Some(TokenKind::Keyword(Keyword::Alias)) {
                    self.type_alias().map(Block::TypeAlias)
                } else {
                    self.union_type().map(Block::UnionType)
                }
            }
            TokenKind::Identifier => self.definition(),
            TokenKind::Unknown => Err(self.error(format!("Unrecognised text `{}`", token.body))),
            _ => Err(self.error(format!(
                "Expected a declaration but found `{}`",
                token.body
            ))),
        }
    }

    /// The blocks of a `let`, laid out at the column of their first token.
    pub(super) fn let_blocks(&mut self) -> ParseResult<Vec<Block>> {
        if self.at_end() {
            return Err(self.error("Expected at least one definition after `let`"));
        }

        let mut blocks = Vec::new();
        for range in split_blocks(self.tokens, self.pos..self.end) {
            let mut parser = self.window(range.start, range.end);
            match parser.block()? {
                block @ (Block::Function(_) | Block::Const(_)) => blocks.push(block),
                _ => {
                    return Err(ParseError::new(
                        "Only functions and constants can be defined in `let`",
                        self.tokens[range.start].line,
                    ))
                }
            }
        }
        self.pos = self.end;
        Ok(blocks)
    }

    fn import(&mut self) -> ParseResult<Import> {
        self.expect(TokenKind::Keyword(Keyword::Import), "to start an import")?;

        let (name, namespace) = match self.advance() {
            Some(token) if token.kind == TokenKind::Identifier => {
                (token.body.clone(), ImportNamespace::Global)
            }
            Some(token) if token.kind == TokenKind::String => {
                (unquote(&token.body), ImportNamespace::Relative)
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.error(format!(
                    "Expected a module name or path after `import` but found {}",
                    self.found()
                )));
            }
        };

        let alias = if self.check(TokenKind::Keyword(Keyword::As)) {
            self.pos += 1;
            Some(self.expect(TokenKind::Identifier, "after `as`")?.body.clone())
        } else {
            None
        };

        let exposing = if self.check(TokenKind::Keyword(Keyword::Exposing)) {
            self.pos += 1;
            self.name_list()?
        } else {
            Vec::new()
        };

        self.finish("import")?;
        Ok(Import {
            modules: vec![ImportModule {
                name,
                alias,
                exposing,
                namespace,
            }],
        })
    }

    fn export(&mut self) -> ParseResult<Export> {
        self.expect(TokenKind::Keyword(Keyword::Exposing), "to start an export")?;
        let names = self.name_list()?;
        self.finish("exposing list")?;
        Ok(Export { names })
    }

    /// `(a, b, c)`; a `..` entry is accepted and ignored.
    fn name_list(&mut self) -> ParseResult<Vec<String>> {
        self.expect(TokenKind::OpenBracket, "to open a name list")?;
        let mut names = Vec::new();
        loop {
            match self.advance() {
                Some(token) if token.kind == TokenKind::CloseBracket => break,
                Some(token) if token.kind == TokenKind::Identifier => names.push(token.body.clone()),
                Some(token)
                    if matches!(
                        token.kind,
                        TokenKind::Comma | TokenKind::Operator(Operator::Range)
                    ) => {}
                Some(token) => {
                    return Err(ParseError::new(
                        format!("Expected a name in exposing list but found `{}`", token.body),
                        token.line,
                    ))
                }
                None => return Err(self.error("Expected `)` to close the exposing list")),
            }
        }
        Ok(names)
    }

    fn union_type(&mut self) -> ParseResult<UnionType> {
        self.expect(TokenKind::Keyword(Keyword::Type), "to start a union type")?;
        let head = self.expect(TokenKind::Identifier, "after `type`")?.body.clone();
        let generics = self.type_parameters();
        self.expect(TokenKind::Assign, &format!("after `type {head}`"))?;

        let mut tags = Vec::new();
        loop {
            let name = self
                .expect(TokenKind::Identifier, "as a union tag name")?
                .body
                .clone();
            let args = if self.check(TokenKind::OpenCurly) {
                self.typed_fields()?
                    .into_iter()
                    .map(|(name, type_)| TagArg { name, type_ })
                    .collect()
            } else {
                Vec::new()
            };
            tags.push(Tag { name, args });

            if self.check(TokenKind::Pipe) {
                self.pos += 1;
            } else {
                break;
            }
        }

        self.finish("union type")?;
        Ok(UnionType {
            type_: Type::Fixed(head, generics),
            tags,
        })
    }

    fn type_alias(&mut self) -> ParseResult<TypeAlias> {
        self.expect(TokenKind::Keyword(Keyword::Type), "to start a type alias")?;
        self.expect(TokenKind::Keyword(Keyword::Alias), "after `type`")?;
        let name = self.expect(TokenKind::Identifier, "after `type alias`")?.body.clone();
        let generics = self.type_parameters();
        self.expect(TokenKind::Assign, &format!("after `type alias {name}`"))?;

        let properties = self
            .typed_fields()?
            .into_iter()
            .map(|(name, type_)| Property { name, type_ })
            .collect();

        self.finish("type alias")?;
        Ok(TypeAlias {
            type_: Type::Fixed(name, generics),
            properties,
        })
    }

    fn type_parameters(&mut self) -> Vec<Type> {
        let mut generics = Vec::new();
        while let Some(token) = self.peek().filter(|t| t.kind == TokenKind::Identifier) {
            generics.push(Type::Generic(token.body.clone()));
            self.pos += 1;
        }
        generics
    }

    /// `{ name: type, ... }`
    fn typed_fields(&mut self) -> ParseResult<Vec<(String, Type)>> {
        let open = self.pos;
        self.expect(TokenKind::OpenCurly, "to open a field list")?;
        let close = self.matching(open)?;

        let mut fields = Vec::new();
        if close > open + 1 {
            for (start, end) in self.split_top_level(open + 1, close, TokenKind::Comma) {
                match &self.tokens[start..end] {
                    [name, colon, rest @ ..]
                        if name.kind == TokenKind::Identifier
                            && colon.kind == TokenKind::Colon
                            && !rest.is_empty() =>
                    {
                        fields.push((name.body.clone(), parse_type(rest)?));
                    }
                    segment => {
                        let line = segment
                            .first()
                            .map(|token| token.line)
                            .unwrap_or(self.tokens[open].line);
                        return Err(ParseError::new("Expected `name: type` in field list", line));
                    }
                }
            }
        }

        self.pos = close + 1;
        Ok(fields)
    }

    /// A function or constant, with or without a signature line.
    fn definition(&mut self) -> ParseResult<Block> {
        let name_token = self.expect(TokenKind::Identifier, "to start a definition")?;
        let name = name_token.body.clone();

        let signature = if self.check(TokenKind::Colon) {
            self.pos += 1;
            let start = self.pos;
            let definition = (start..self.end)
                .find(|&index| {
                    let token = &self.tokens[index];
                    token.kind == TokenKind::Identifier
                        && token.body == name
                        && self.starts_line(index)
                })
                .ok_or_else(|| {
                    ParseError::new(
                        format!("Expected a definition of `{name}` after its type signature"),
                        name_token.line,
                    )
                })?;
            let types = parse_signature(&self.tokens[start..definition])?;
            self.pos = definition + 1;
            Some(types)
        } else {
            None
        };

        let mut arg_names = Vec::new();
        while let Some(token) = self.peek().filter(|t| t.kind == TokenKind::Identifier) {
            arg_names.push(token.body.clone());
            self.pos += 1;
        }
        self.expect(TokenKind::Assign, &format!("in the definition of `{name}`"))?;
        let (let_body, body) = self.window(self.pos, self.end).branch_body()?;
        self.pos = self.end;

        let Some(mut types) = signature else {
            if arg_names.is_empty() {
                return Ok(Block::Const(Const {
                    name,
                    type_: Type::any(),
                    let_body,
                    value: body,
                }));
            }
            let args = arg_names
                .into_iter()
                .map(|name| FunctionArg::Named {
                    name,
                    type_: Type::any(),
                })
                .collect();
            return Ok(Block::Function(Function {
                name,
                return_type: Type::any(),
                args,
                let_body,
                body,
            }));
        };

        if arg_names.is_empty() {
            let type_ = if types.len() == 1 {
                types.remove(0)
            } else {
                Type::Function(types)
            };
            return Ok(Block::Const(Const {
                name,
                type_,
                let_body,
                value: body,
            }));
        }

        let return_type = types.pop().unwrap_or_else(Type::any);
        if arg_names.len() > types.len() {
            return Err(ParseError::new(
                format!(
                    "`{name}` names {} arguments but its type signature declares {}",
                    arg_names.len(),
                    types.len()
                ),
                name_token.line,
            ));
        }

        let args = types
            .into_iter()
            .enumerate()
            .map(|(index, type_)| match arg_names.get(index) {
                Some(name) => FunctionArg::Named {
                    name: name.clone(),
                    type_,
                },
                None => FunctionArg::Anonymous { index, type_ },
            })
            .collect();

        Ok(Block::Function(Function {
            name,
            return_type,
            args,
            let_body,
            body,
        }))
    }
}
