mod cursor;
mod error;
pub mod formatter;
mod token;

use cursor::SourceChar;
pub use error::{LexicalError, LexicalErrorKind};
use std::{rc::Rc, str::Chars};
pub use token::{Span, SpanIndex, Token, TokenKind, KEYWORD_HASHMAP};

/// Maps byte offsets of a source text onto 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineBreaks {
    newlines: Rc<[SpanIndex]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let newlines: Vec<SpanIndex> = text
            .bytes()
            .enumerate()
            .filter(|(_, byte)| *byte == b'\n')
            .map(|(offset, _)| offset.into())
            .collect();
        Self {
            newlines: newlines.into(),
        }
    }

    pub fn get_max_line(&self) -> u32 {
        (self.newlines.len() + 1) as u32
    }

    pub fn get_line(&self, offset: SpanIndex) -> u32 {
        (self.newlines.partition_point(|&newline| newline < offset) + 1) as u32
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start)
    }
}

/// Runs the lexer to completion, stopping at the first lexical error.
///
/// The returned tokens always end with exactly one [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        tokens.push(token);
        if matches!(token.kind, TokenKind::Eof) {
            return Ok(tokens);
        }
    }
}

#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: Chars<'src>,
    offset: SpanIndex,
    lookahead: Option<SourceChar>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars(),
            offset: 0.into(),
            lookahead: None,
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        LineBreaks::new(self.source)
    }
}

impl<'src> Lexer<'src> {
    fn next_char(&mut self) -> Option<SourceChar> {
        if let Some(lookahead) = self.lookahead.take() {
            return Some(lookahead);
        }
        let c = self.chars.next()?;
        let old_offset = self.offset;
        self.offset = self.offset + c.len_utf8();
        Some(SourceChar {
            value: c,
            offset: old_offset,
        })
    }

    fn put_back_char(&mut self, c: SourceChar) {
        self.lookahead = Some(c);
    }

    fn eat_if(&mut self, expected: char) -> Option<SourceChar> {
        let c = self.next_char()?;
        if c.value == expected {
            Some(c)
        } else {
            self.put_back_char(c);
            None
        }
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) -> SpanIndex {
        loop {
            match self.next_char() {
                Some(c) if predicate(c.value) => {}
                Some(c) => {
                    self.put_back_char(c);
                    return c.offset;
                }
                None => return self.offset,
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            let Some(c) = self.next_char() else {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(self.offset, self.offset),
                });
            };

            let just = |kind: TokenKind| {
                Ok(Token {
                    kind,
                    span: Span::new(c.offset, c.next_offset()),
                })
            };

            return match c.value {
                // Single character tokens
                '(' => just(TokenKind::LeftParenthesis),
                ')' => just(TokenKind::RightParenthesis),
                '{' => just(TokenKind::LeftBrace),
                '}' => just(TokenKind::RightBrace),
                '[' => just(TokenKind::LeftBracket),
                ']' => just(TokenKind::RightBracket),
                ',' => just(TokenKind::Comma),
                ':' => just(TokenKind::Colon),
                ';' => just(TokenKind::Semicolon),
                '-' => just(TokenKind::Minus),
                '+' => just(TokenKind::Plus),
                '*' => just(TokenKind::Star),
                // One or two character tokens
                '=' => Ok(self.lex_double(c, '=', TokenKind::Equal, TokenKind::EqualEqual)),
                '!' => Ok(self.lex_double(c, '=', TokenKind::Bang, TokenKind::BangEqual)),
                '<' => Ok(self.lex_double(
                    c,
                    '=',
                    TokenKind::LessThan,
                    TokenKind::LessThanEqual,
                )),
                '>' => Ok(self.lex_double(
                    c,
                    '=',
                    TokenKind::GreaterThan,
                    TokenKind::GreaterThanEqual,
                )),
                '/' => {
                    if self.eat_if('/').is_some() {
                        self.eat_while(|c| c != '\n');
                        continue;
                    }
                    just(TokenKind::Slash)
                }
                '"' => self.lex_string(c),
                '0'..='9' => self.lex_integer(c),
                'a'..='z' | 'A'..='Z' | '_' => Ok(self.lex_ident_or_keyword(c)),
                value if value.is_whitespace() => continue,
                value => Err(LexicalError {
                    kind: LexicalErrorKind::Unrecognized(value),
                    span: Span::new(c.offset, c.next_offset()),
                }),
            };
        }
    }

    fn lex_double(
        &mut self,
        first: SourceChar,
        second: char,
        single: TokenKind,
        double: TokenKind,
    ) -> Token {
        match self.eat_if(second) {
            Some(c) => Token {
                kind: double,
                span: Span::new(first.offset, c.next_offset()),
            },
            None => Token {
                kind: single,
                span: Span::new(first.offset, first.next_offset()),
            },
        }
    }

    fn lex_string(&mut self, quote: SourceChar) -> Result<Token, LexicalError> {
        loop {
            match self.next_char() {
                Some(c) if c.value == '"' => {
                    return Ok(Token {
                        kind: TokenKind::StringLiteral,
                        span: Span::new(quote.offset, c.next_offset()),
                    });
                }
                Some(_) => {}
                None => {
                    return Err(LexicalError {
                        kind: LexicalErrorKind::UnclosedString,
                        span: Span::new(quote.offset, self.offset),
                    });
                }
            }
        }
    }

    fn lex_integer(&mut self, first: SourceChar) -> Result<Token, LexicalError> {
        let end = self.eat_while(|c| c.is_ascii_digit());
        let span = Span::new(first.offset, end);
        let lexeme = &self.source[span.range()];
        match lexeme.parse::<i64>() {
            Ok(_) => Ok(Token {
                kind: TokenKind::IntegerLiteral,
                span,
            }),
            Err(_) => Err(LexicalError {
                kind: LexicalErrorKind::IntegerOverflow(lexeme.into()),
                span,
            }),
        }
    }

    fn lex_ident_or_keyword(&mut self, first: SourceChar) -> Token {
        let end = self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let span = Span::new(first.offset, end);
        let lexeme = &self.source[span.range()];
        Token {
            kind: KEYWORD_HASHMAP
                .get(lexeme)
                .copied()
                .unwrap_or(TokenKind::Ident),
            span,
        }
    }
}
