mod blocks;
mod patterns;
mod types;

use tracing::debug;

use crate::ast::*;
use crate::lexer::{tokenize, tokenize_at, Keyword, Operator, Token, TokenKind};

pub use blocks::{parse, parse_module};

type ParseResult<T> = Result<T, ParseError>;

/// Parse a single expression such as `1 + 2` or `case x of ...`.
pub fn parse_expression(source: &str) -> Result<Expression, ParseError> {
    let tokens = significant(tokenize(source));
    debug!(tokens = tokens.len(), "parsing expression");
    Parser::new(&tokens).expression()
}

fn significant(tokens: Vec<Token>) -> Vec<Token> {
    tokens.into_iter().filter(|token| !token.is_trivia()).collect()
}

fn operator_of(kind: TokenKind) -> Option<BinaryOperator> {
    let TokenKind::Operator(operator) = kind else {
        return None;
    };
    let binary = match operator {
        Operator::Plus => BinaryOperator::Add,
        Operator::Minus => BinaryOperator::Subtract,
        Operator::Star => BinaryOperator::Multiply,
        Operator::Slash => BinaryOperator::Divide,
        Operator::Equal => BinaryOperator::Equal,
        Operator::NotEqual => BinaryOperator::NotEqual,
        Operator::Less => BinaryOperator::Less,
        Operator::LessEqual => BinaryOperator::LessEqual,
        Operator::Greater => BinaryOperator::Greater,
        Operator::GreaterEqual => BinaryOperator::GreaterEqual,
        Operator::And => BinaryOperator::And,
        Operator::Or => BinaryOperator::Or,
        Operator::Cons => BinaryOperator::ListPrepend,
        Operator::PipeRight => BinaryOperator::LeftPipe,
        Operator::PipeLeft => BinaryOperator::RightPipe,
        Operator::Range => return None,
    };
    Some(binary)
}

fn describe(kind: TokenKind) -> String {
    match kind {
        TokenKind::Identifier => "a name".to_string(),
        TokenKind::Literal => "a literal".to_string(),
        TokenKind::String => "a string".to_string(),
        TokenKind::FormatString => "a format string".to_string(),
        TokenKind::Keyword(keyword) => format!("`{}`", keyword.as_str()),
        TokenKind::Operator(operator) => format!("`{}`", operator.symbol()),
        TokenKind::Assign => "`=`".to_string(),
        TokenKind::Arrow => "`->`".to_string(),
        TokenKind::Colon => "`:`".to_string(),
        TokenKind::Comma => "`,`".to_string(),
        TokenKind::Pipe => "`|`".to_string(),
        TokenKind::Backslash => "`\\`".to_string(),
        TokenKind::OpenBracket => "`(`".to_string(),
        TokenKind::CloseBracket => "`)`".to_string(),
        TokenKind::OpenCurly => "`{`".to_string(),
        TokenKind::CloseCurly => "`}`".to_string(),
        TokenKind::Whitespace => "whitespace".to_string(),
        TokenKind::Comment | TokenKind::MultilineComment => "a comment".to_string(),
        TokenKind::Unknown => "unrecognised text".to_string(),
    }
}

pub(crate) fn is_capitalised(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn unquote(body: &str) -> String {
    body.get(1..body.len().saturating_sub(1))
        .unwrap_or_default()
        .to_string()
}

/// A cursor over a window `[pos, end)` of significant tokens. Nested
/// constructs (branches, parenthesised groups, let bodies) are parsed by
/// narrower windows over the same token slice.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    end: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            end: tokens.len(),
        }
    }

    fn window(&self, start: usize, end: usize) -> Parser<'t> {
        Parser {
            tokens: self.tokens,
            pos: start,
            end,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.end
    }

    fn peek(&self) -> Option<&'t Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        let index = self.pos + offset;
        if index < self.end {
            self.tokens.get(index)
        } else {
            None
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == kind)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> ParseResult<&'t Token> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.error(format!(
                "Expected {} {context} but found {}",
                describe(kind),
                self.found()
            ))),
        }
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(token) => format!("`{}`", token.body),
            None => "end of input".to_string(),
        }
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.get(self.pos.min(self.end).saturating_sub(1)))
            .map(|token| token.line)
            .unwrap_or(1)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.line())
    }

    fn finish(&self, what: &str) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.error(format!("Unexpected `{}` after {what}", token.body))),
        }
    }

    /// Whether the token at `index` is the first on its line.
    fn starts_line(&self, index: usize) -> bool {
        index == 0 || self.tokens[index - 1].end_line() < self.tokens[index].line
    }

    /// Index of the bracket closing the one at `open`.
    fn matching(&self, open: usize) -> ParseResult<usize> {
        let (opening, closing) = match self.tokens[open].kind {
            TokenKind::OpenCurly => (TokenKind::OpenCurly, TokenKind::CloseCurly),
            _ => (TokenKind::OpenBracket, TokenKind::CloseBracket),
        };
        let mut depth = 0usize;
        for index in open..self.end {
            let kind = self.tokens[index].kind;
            if kind == opening {
                depth += 1;
            } else if kind == closing {
                depth -= 1;
                if depth == 0 {
                    return Ok(index);
                }
            }
        }
        Err(ParseError::new(
            format!("Expected {} to close {}", describe(closing), describe(opening)),
            self.tokens[open].line,
        ))
    }

    /// Split `[start, end)` on `separator` outside any brackets.
    fn split_top_level(&self, start: usize, end: usize, separator: TokenKind) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        let mut depth = 0usize;
        let mut segment_start = start;
        for index in start..end {
            match self.tokens[index].kind {
                TokenKind::OpenBracket | TokenKind::OpenCurly => depth += 1,
                TokenKind::CloseBracket | TokenKind::CloseCurly => depth = depth.saturating_sub(1),
                kind if kind == separator && depth == 0 => {
                    segments.push((segment_start, index));
                    segment_start = index + 1;
                }
                _ => {}
            }
        }
        segments.push((segment_start, end));
        segments
    }

    /// First index in `[from, end)` holding `target`, skipping over nested
    /// constructs opened by `opener` and closed by `closer`.
    fn find_keyword(
        &self,
        from: usize,
        target: Keyword,
        opener: Keyword,
        closer: Option<Keyword>,
    ) -> Option<usize> {
        let mut depth = 0usize;
        for index in from..self.end {
            let TokenKind::Keyword(keyword) = self.tokens[index].kind else {
                continue;
            };
            if keyword == target && depth == 0 {
                return Some(index);
            }
            if keyword == opener {
                depth += 1;
            } else if Some(keyword) == closer || (closer.is_none() && keyword == target) {
                depth = depth.saturating_sub(1);
            }
        }
        None
    }

    /// Parse the whole window as one expression.
    fn expression(&mut self) -> ParseResult<Expression> {
        if self.at_end() {
            return Err(self.error("Expected an expression but found end of input"));
        }
        let expression = self.binary(1)?;
        self.finish("expression")?;
        Ok(expression)
    }

    fn binary(&mut self, min_precedence: u8) -> ParseResult<Expression> {
        let mut left = self.application()?;
        let mut previous: Option<BinaryOperator> = None;

        while let Some(operator) = self.peek().and_then(|token| operator_of(token.kind)) {
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            if let Some(previous) = previous {
                if previous.is_comparison() && operator.is_comparison() {
                    return Err(self.error(format!(
                        "Comparison operators cannot be chained: `{}` followed by `{}`",
                        previous.symbol(),
                        operator.symbol()
                    )));
                }
            }
            self.pos += 1;

            let next_precedence = match operator.associativity() {
                Associativity::Right => precedence,
                Associativity::Left | Associativity::None => precedence + 1,
            };
            let right = self.binary(next_precedence)?;
            left = Expression::binary(operator, left, right);
            previous = Some(operator);
        }

        Ok(left)
    }

    fn application(&mut self) -> ParseResult<Expression> {
        let Some(token) = self.peek() else {
            return Err(self.error("Expected an expression but found end of input"));
        };

        match token.kind {
            TokenKind::Keyword(Keyword::If) => self.if_statement(),
            TokenKind::Keyword(Keyword::Case) => self.case_statement(),
            TokenKind::Backslash => self.lambda().map(Expression::Lambda),
            TokenKind::Identifier if !is_capitalised(&token.body) || token.body.contains('.') => {
                self.pos += 1;
                let mut args = Vec::new();
                while self.starts_atom() {
                    args.push(self.atom()?);
                }
                Ok(reference(&token.body, args))
            }
            _ => self.atom(),
        }
    }

    fn starts_atom(&self) -> bool {
        matches!(
            self.peek().map(|token| token.kind),
            Some(
                TokenKind::Identifier
                    | TokenKind::Literal
                    | TokenKind::String
                    | TokenKind::FormatString
                    | TokenKind::OpenBracket
                    | TokenKind::OpenCurly
            )
        )
    }

    fn atom(&mut self) -> ParseResult<Expression> {
        let Some(token) = self.advance() else {
            return Err(self.error("Expected an expression but found end of input"));
        };

        match token.kind {
            TokenKind::Literal if token.body.starts_with('[') => self.list_literal(token),
            TokenKind::Literal => Ok(Expression::value(&token.body)),
            TokenKind::String => Ok(Expression::string(unquote(&token.body))),
            TokenKind::FormatString => Ok(Expression::FormatStringValue(FormatStringValue {
                body: unquote(&token.body),
            })),
            TokenKind::OpenBracket => {
                let close = self.matching(self.pos - 1)?;
                let inner = self.window(self.pos, close).expression()?;
                self.pos = close + 1;
                Ok(inner)
            }
            TokenKind::OpenCurly => {
                self.pos -= 1;
                self.object_literal().map(Expression::ObjectLiteral)
            }
            TokenKind::Identifier
                if is_capitalised(&token.body)
                    && !token.body.contains('.')
                    && self.check(TokenKind::OpenCurly) =>
            {
                let pattern = self.object_literal()?;
                Ok(Expression::Constructor(Constructor {
                    constructor: token.body.clone(),
                    pattern,
                }))
            }
            TokenKind::Identifier => Ok(reference(&token.body, Vec::new())),
            TokenKind::Operator(Operator::Minus) => match self.peek() {
                Some(number)
                    if number.kind == TokenKind::Literal
                        && number.line == token.line
                        && number.column == token.column + 1
                        && number.body.starts_with(|ch: char| ch.is_ascii_digit()) =>
                {
                    self.pos += 1;
                    Ok(Expression::value(format!("-{}", number.body)))
                }
                _ => Err(ParseError::new(
                    "Expected a number after prefix `-`",
                    token.line,
                )),
            },
            TokenKind::Unknown => Err(ParseError::new(
                format!("Unrecognised text `{}`", token.body),
                token.line,
            )),
            _ => Err(ParseError::new(
                format!("Expected an expression but found `{}`", token.body),
                token.line,
            )),
        }
    }

    /// `[ a, b ]` and `[ 1..n ]`, re-tokenized from the opaque literal.
    fn list_literal(&self, token: &Token) -> ParseResult<Expression> {
        let interior = token
            .body
            .get(1..token.body.len() - 1)
            .unwrap_or_default();
        let tokens = significant(tokenize_at(interior, token.line, token.column + 1));
        if tokens.is_empty() {
            return Ok(Expression::ListValue(ListValue { items: Vec::new() }));
        }

        let inner = Parser::new(&tokens);
        let range = tokens
            .iter()
            .position(|token| token.kind == TokenKind::Operator(Operator::Range));
        if let Some(range) = range {
            let start = inner.range_bound(0, range)?;
            let end = inner.range_bound(range + 1, tokens.len())?;
            return Ok(Expression::ListRange(ListRange { start, end }));
        }

        let mut items = Vec::new();
        for (start, end) in inner.split_top_level(0, tokens.len(), TokenKind::Comma) {
            if start == end {
                return Err(ParseError::new(
                    "Expected a list item between commas",
                    token.line,
                ));
            }
            items.push(inner.window(start, end).expression()?);
        }
        Ok(Expression::ListValue(ListValue { items }))
    }

    fn range_bound(&self, start: usize, end: usize) -> ParseResult<Value> {
        match &self.tokens[start..end] {
            [token] if matches!(token.kind, TokenKind::Literal | TokenKind::Identifier) => Ok(Value {
                body: token.body.clone(),
            }),
            tokens => Err(ParseError::new(
                "Expected a number or a name on each side of `..`",
                tokens.first().map(|token| token.line).unwrap_or(1),
            )),
        }
    }

    /// `{ }`, `{ a: 1 }`, `{ base, a: 1 }`
    fn object_literal(&mut self) -> ParseResult<ObjectLiteral> {
        let open = self.pos;
        self.expect(TokenKind::OpenCurly, "to open an object literal")?;
        let close = self.matching(open)?;

        let mut base = None;
        let mut fields = Vec::new();
        if close > open + 1 {
            for (index, (start, end)) in self
                .split_top_level(open + 1, close, TokenKind::Comma)
                .into_iter()
                .enumerate()
            {
                let segment = &self.tokens[start..end];
                match segment {
                    [name] if index == 0 && name.kind == TokenKind::Identifier => {
                        base = Some(Value {
                            body: name.body.clone(),
                        });
                    }
                    [name, colon, ..]
                        if name.kind == TokenKind::Identifier && colon.kind == TokenKind::Colon =>
                    {
                        let value = self.window(start + 2, end).expression()?;
                        fields.push(Field {
                            name: name.body.clone(),
                            value,
                        });
                    }
                    [first, ..] => {
                        return Err(ParseError::new(
                            format!("Expected `name: value` in object literal but found `{}`", first.body),
                            first.line,
                        ))
                    }
                    [] => {
                        return Err(ParseError::new(
                            "Expected a field between commas in object literal",
                            self.tokens[open].line,
                        ))
                    }
                }
            }
        }

        self.pos = close + 1;
        Ok(ObjectLiteral { base, fields })
    }

    fn if_statement(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::Keyword(Keyword::If), "to start a conditional")?;

        let then_index = self
            .find_keyword(self.pos, Keyword::Then, Keyword::If, Some(Keyword::Else))
            .ok_or_else(|| self.error("Expected `then` after the condition of `if`"))?;
        let else_index = self
            .find_keyword(then_index + 1, Keyword::Else, Keyword::If, None)
            .ok_or_else(|| self.error("Expected `else` to complete `if`"))?;

        let predicate = self.window(self.pos, then_index).expression()?;
        let (if_let_body, if_body) = self.window(then_index + 1, else_index).branch_body()?;
        let (else_let_body, else_body) = self.window(else_index + 1, self.end).branch_body()?;
        self.pos = self.end;

        Ok(Expression::IfStatement(IfStatement {
            predicate: Box::new(predicate),
            if_body: Box::new(if_body),
            if_let_body,
            else_body: Box::new(else_body),
            else_let_body,
        }))
    }

    fn case_statement(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::Keyword(Keyword::Case), "to start a case")?;

        let of_index = self
            .find_keyword(self.pos, Keyword::Of, Keyword::Case, None)
            .ok_or_else(|| self.error("Expected `of` after the predicate of `case`"))?;
        let predicate = self.window(self.pos, of_index).expression()?;

        let first = of_index + 1;
        if first >= self.end {
            self.pos = first;
            return Err(self.error("Expected at least one branch after `of`"));
        }

        let column = self.tokens[first].column;
        let mut starts = vec![first];
        starts.extend(
            (first + 1..self.end)
                .filter(|&index| self.starts_line(index) && self.tokens[index].column <= column),
        );

        let mut branches = Vec::with_capacity(starts.len());
        for (position, &start) in starts.iter().enumerate() {
            let stop = starts.get(position + 1).copied().unwrap_or(self.end);
            branches.push(self.window(start, stop).branch()?);
        }
        self.pos = self.end;

        Ok(Expression::CaseStatement(CaseStatement {
            predicate: Box::new(predicate),
            branches,
        }))
    }

    fn branch(&mut self) -> ParseResult<Branch> {
        let arrow = (self.pos..self.end)
            .find(|&index| self.tokens[index].kind == TokenKind::Arrow)
            .ok_or_else(|| self.error(format!("Expected `->` after the pattern {}", self.found())))?;

        let pattern = self.window(self.pos, arrow).pattern()?;
        let (let_body, body) = self.window(arrow + 1, self.end).branch_body()?;
        self.pos = self.end;

        Ok(Branch {
            pattern,
            body,
            let_body,
        })
    }

    /// An expression optionally preceded by `let <blocks> in`.
    fn branch_body(&mut self) -> ParseResult<(Vec<Block>, Expression)> {
        if !self.check(TokenKind::Keyword(Keyword::Let)) {
            return Ok((Vec::new(), self.expression()?));
        }

        let let_index = self.pos;
        let in_index = self
            .find_keyword(let_index + 1, Keyword::In, Keyword::Let, None)
            .ok_or_else(|| self.error("Expected `in` to close `let`"))?;

        let blocks = self.window(let_index + 1, in_index).let_blocks()?;
        let body = self.window(in_index + 1, self.end).expression()?;
        self.pos = self.end;
        Ok((blocks, body))
    }

    fn lambda(&mut self) -> ParseResult<Lambda> {
        self.expect(TokenKind::Backslash, "to start a lambda")?;

        let mut args = Vec::new();
        while let Some(token) = self.peek().filter(|token| token.kind == TokenKind::Identifier) {
            args.push(token.body.clone());
            self.pos += 1;
        }
        if args.is_empty() {
            return Err(self.error(format!(
                "Expected a lambda argument but found {}",
                self.found()
            )));
        }
        self.expect(TokenKind::Arrow, "after lambda arguments")?;

        let body = self.window(self.pos, self.end).expression()?;
        self.pos = self.end;
        Ok(Lambda {
            args,
            body: Box::new(body),
        })
    }
}

/// A name applied to `args`. Dotted names with a capitalised head are
/// references into another module.
fn reference(name: &str, args: Vec<Expression>) -> Expression {
    let segments: Vec<&str> = name.split('.').collect();
    if let [path @ .., last] = segments.as_slice() {
        if !path.is_empty() && is_capitalised(path[0]) {
            let value = if args.is_empty() {
                Expression::value(*last)
            } else {
                Expression::call(*last, args)
            };
            return Expression::ModuleReference(ModuleReference {
                path: path.iter().map(|segment| segment.to_string()).collect(),
                value: Box::new(value),
            });
        }
    }

    if args.is_empty() {
        Expression::value(name)
    } else {
        Expression::call(name, args)
    }
}
