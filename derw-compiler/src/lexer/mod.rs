mod types;

use serde::Serialize;

pub use types::{tokenize_type, TypeToken, TypeTokenError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub body: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, body: String, line: usize, column: usize) -> Self {
        Self {
            kind,
            body,
            line,
            column,
        }
    }

    /// Line on which the token's text ends; differs from `line` for
    /// whitespace runs and multiline comments.
    pub fn end_line(&self) -> usize {
        self.line + self.body.matches('\n').count()
    }

    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::MultilineComment
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Identifier,
    Literal,
    String,
    FormatString,
    Keyword(Keyword),
    Operator(Operator),
    Assign,
    Arrow,
    Colon,
    Comma,
    Pipe,
    Backslash,
    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    Whitespace,
    Comment,
    MultilineComment,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Keyword {
    If,
    Then,
    Else,
    Case,
    Of,
    Let,
    In,
    Type,
    Alias,
    Import,
    Exposing,
    As,
    Default,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Then => "then",
            Keyword::Else => "else",
            Keyword::Case => "case",
            Keyword::Of => "of",
            Keyword::Let => "let",
            Keyword::In => "in",
            Keyword::Type => "type",
            Keyword::Alias => "alias",
            Keyword::Import => "import",
            Keyword::Exposing => "exposing",
            Keyword::As => "as",
            Keyword::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    Minus,
    Plus,
    Star,
    Slash,
    PipeRight,
    PipeLeft,
    And,
    Or,
    Cons,
    Range,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Minus => "-",
            Operator::Plus => "+",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::PipeRight => "|>",
            Operator::PipeLeft => "<|",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Cons => "::",
            Operator::Range => "..",
        }
    }
}

/// Split source text into tokens. Every character of `source` ends up in
/// exactly one token body, so `tokens_to_string(&tokenize(s)) == s`.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

/// Tokenize a fragment that starts at `line`/`column` of some enclosing
/// source, such as the interior of a list literal.
pub fn tokenize_at(source: &str, line: usize, column: usize) -> Vec<Token> {
    Lexer::starting_at(source, line, column).tokenize()
}

pub fn tokens_to_string(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.body.as_str()).collect()
}

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::starting_at(input, 1, 1)
    }

    pub fn starting_at(input: &'a str, line: usize, column: usize) -> Self {
        Self {
            input,
            position: 0,
            line,
            column,
        }
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek_char() {
            let token = match ch {
                c if c.is_whitespace() => self.lex_whitespace(),
                '"' => self.lex_quoted('"', TokenKind::String),
                '`' => self.lex_quoted('`', TokenKind::FormatString),
                '[' => self.lex_list_literal(),
                '0'..='9' => self.lex_number(),
                c if c.is_alphabetic() || c == '_' => self.lex_identifier_or_keyword(),
                '-' => self.lex_minus_variants(),
                '{' => self.lex_curly_variants(),
                '}' => self.simple_token(TokenKind::CloseCurly),
                '(' => self.simple_token(TokenKind::OpenBracket),
                ')' => self.simple_token(TokenKind::CloseBracket),
                ',' => self.simple_token(TokenKind::Comma),
                '\\' => self.simple_token(TokenKind::Backslash),
                ':' => self.lex_pair(&[(':', TokenKind::Operator(Operator::Cons))], TokenKind::Colon),
                '=' => self.lex_pair(&[('=', TokenKind::Operator(Operator::Equal))], TokenKind::Assign),
                '!' => self.lex_pair(
                    &[('=', TokenKind::Operator(Operator::NotEqual))],
                    TokenKind::Unknown,
                ),
                '<' => self.lex_pair(
                    &[
                        ('=', TokenKind::Operator(Operator::LessEqual)),
                        ('|', TokenKind::Operator(Operator::PipeLeft)),
                    ],
                    TokenKind::Operator(Operator::Less),
                ),
                '>' => self.lex_pair(
                    &[('=', TokenKind::Operator(Operator::GreaterEqual))],
                    TokenKind::Operator(Operator::Greater),
                ),
                '|' => self.lex_pair(
                    &[
                        ('>', TokenKind::Operator(Operator::PipeRight)),
                        ('|', TokenKind::Operator(Operator::Or)),
                    ],
                    TokenKind::Pipe,
                ),
                '&' => self.lex_pair(&[('&', TokenKind::Operator(Operator::And))], TokenKind::Unknown),
                '.' => self.lex_pair(&[('.', TokenKind::Operator(Operator::Range))], TokenKind::Unknown),
                '+' => self.simple_token(TokenKind::Operator(Operator::Plus)),
                '*' => self.simple_token(TokenKind::Operator(Operator::Star)),
                '/' => self.simple_token(TokenKind::Operator(Operator::Slash)),
                _ => self.simple_token(TokenKind::Unknown),
            };
            tokens.push(token);
        }

        tokens
    }

    fn lex_whitespace(&mut self) -> Token {
        let (start, line, column) = self.mark();
        while matches!(self.peek_char(), Some(ch) if ch.is_whitespace()) {
            self.advance_char();
        }
        self.finish(TokenKind::Whitespace, start, line, column)
    }

    /// Strings and format strings. A backslash escapes the following
    /// character; an unterminated literal runs to the end of its line and
    /// is reported as `Unknown`.
    fn lex_quoted(&mut self, quote: char, kind: TokenKind) -> Token {
        let (start, line, column) = self.mark();
        self.advance_char(); // opening quote

        while let Some(ch) = self.peek_char() {
            if ch == '\\' {
                self.advance_char();
                if self.peek_char().is_some() {
                    self.advance_char();
                }
                continue;
            }
            if ch == quote {
                self.advance_char();
                return self.finish(kind, start, line, column);
            }
            if ch == '\n' && quote == '"' {
                break;
            }
            self.advance_char();
        }

        self.finish(TokenKind::Unknown, start, line, column)
    }

    /// A bracketed list or range is kept as one opaque literal, nested
    /// brackets and quoted text included. The parser re-tokenizes the
    /// interior with `tokenize_at`.
    fn lex_list_literal(&mut self) -> Token {
        let (start, line, column) = self.mark();
        match self.matching_square_bracket() {
            Some(end) => {
                while self.position < end {
                    self.advance_char();
                }
                self.finish(TokenKind::Literal, start, line, column)
            }
            None => self.simple_token(TokenKind::Unknown),
        }
    }

    /// Byte offset just past the `]` closing the `[` at the cursor.
    fn matching_square_bracket(&self) -> Option<usize> {
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;

        for (offset, ch) in self.input[self.position..].char_indices() {
            if let Some(open) = quote {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == open {
                    quote = None;
                }
                continue;
            }
            match ch {
                '"' | '`' => quote = Some(ch),
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(self.position + offset + ch.len_utf8());
                    }
                }
                _ => {}
            }
        }

        None
    }

    fn lex_number(&mut self) -> Token {
        let (start, line, column) = self.mark();
        while matches!(self.peek_char(), Some('0'..='9')) {
            self.advance_char();
        }
        if self.peek_char() == Some('.') && matches!(self.peek_next_char(), Some('0'..='9')) {
            self.advance_char();
            while matches!(self.peek_char(), Some('0'..='9')) {
                self.advance_char();
            }
        }
        self.finish(TokenKind::Literal, start, line, column)
    }

    fn lex_identifier_or_keyword(&mut self) -> Token {
        let (start, line, column) = self.mark();
        self.advance_char();

        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance_char();
            } else if ch == '.'
                && matches!(self.peek_next_char(), Some(next) if next.is_alphabetic() || next == '_')
            {
                self.advance_char();
            } else {
                break;
            }
        }

        let lexeme = &self.input[start..self.position];
        let kind = if let Some(keyword) = keyword_from_lexeme(lexeme) {
            TokenKind::Keyword(keyword)
        } else if lexeme == "true" || lexeme == "false" {
            TokenKind::Literal
        } else {
            TokenKind::Identifier
        };
        self.finish(kind, start, line, column)
    }

    fn lex_minus_variants(&mut self) -> Token {
        match self.peek_next_char() {
            Some('-') => {
                let (start, line, column) = self.mark();
                while matches!(self.peek_char(), Some(ch) if ch != '\n') {
                    self.advance_char();
                }
                self.finish(TokenKind::Comment, start, line, column)
            }
            Some('>') => self.fixed_token(TokenKind::Arrow, 2),
            _ => self.simple_token(TokenKind::Operator(Operator::Minus)),
        }
    }

    fn lex_curly_variants(&mut self) -> Token {
        if self.peek_next_char() != Some('-') {
            return self.simple_token(TokenKind::OpenCurly);
        }

        let (start, line, column) = self.mark();
        self.advance_char(); // '{'
        self.advance_char(); // '-'
        while self.peek_char().is_some() {
            if self.input[self.position..].starts_with("-}") {
                self.advance_char();
                self.advance_char();
                return self.finish(TokenKind::MultilineComment, start, line, column);
            }
            self.advance_char();
        }
        self.finish(TokenKind::Unknown, start, line, column)
    }

    /// Two-character operators first, falling back to the single character.
    fn lex_pair(&mut self, pairs: &[(char, TokenKind)], single: TokenKind) -> Token {
        if let Some(next) = self.peek_next_char() {
            if let Some((_, kind)) = pairs.iter().find(|(second, _)| *second == next) {
                return self.fixed_token(*kind, 2);
            }
        }
        self.simple_token(single)
    }

    fn simple_token(&mut self, kind: TokenKind) -> Token {
        self.fixed_token(kind, 1)
    }

    fn fixed_token(&mut self, kind: TokenKind, chars: usize) -> Token {
        let (start, line, column) = self.mark();
        for _ in 0..chars {
            self.advance_char();
        }
        self.finish(kind, start, line, column)
    }

    fn mark(&self) -> (usize, usize, usize) {
        (self.position, self.line, self.column)
    }

    fn finish(&self, kind: TokenKind, start: usize, line: usize, column: usize) -> Token {
        Token::new(kind, self.input[start..self.position].to_string(), line, column)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.input[self.position..].chars();
        iter.next()?;
        iter.next()
    }

    fn advance_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }
}

fn keyword_from_lexeme(lexeme: &str) -> Option<Keyword> {
    match lexeme {
        "if" => Some(Keyword::If),
        "then" => Some(Keyword::Then),
        "else" => Some(Keyword::Else),
        "case" => Some(Keyword::Case),
        "of" => Some(Keyword::Of),
        "let" => Some(Keyword::Let),
        "in" => Some(Keyword::In),
        "type" => Some(Keyword::Type),
        "alias" => Some(Keyword::Alias),
        "import" => Some(Keyword::Import),
        "exposing" => Some(Keyword::Exposing),
        "as" => Some(Keyword::As),
        "default" => Some(Keyword::Default),
        _ => None,
    }
}
