//! Tokenizer shared by the policy and whitelist languages (panic-free).
//!
//! Lexical rules:
//! - `//` line comments and `/* */` block comments are skipped.
//! - `{ } ; ,` are single-character punctuation tokens.
//! - `"..."` / `'...'` are quoted values; `\n`, `\t` and `\<c>` escapes apply.
//!   A quoted value may not span lines.
//! - Anything else up to whitespace, punctuation, or a quote is a bare word.
//!
//! Every token remembers its 1-based line so parse errors can point at it.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{ConfigSource, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Quoted,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn is_punct(&self, p: char) -> bool {
        self.kind == TokenKind::Punct && self.text.len() == 1 && self.text.starts_with(p)
    }

    pub fn is_word(&self, w: &str) -> bool {
        self.kind == TokenKind::Word && self.text == w
    }

    /// Words and quoted strings both carry values.
    pub fn is_value(&self) -> bool {
        self.kind != TokenKind::Punct
    }
}

fn is_punct(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ',')
}

/// Split `src` into tokens.
pub fn tokenize(src: &str, config: ConfigSource) -> Result<Vec<Token>, ParseError> {
    let mut out = Vec::new();
    let mut chars = src.chars().peekable();
    let mut line = 1usize;

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let start = line;
                let mut prev = '\0';
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                    }
                    if prev == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    prev = c;
                }
                if !closed {
                    return Err(ParseError::new(config, start, "unterminated comment"));
                }
            }
            '"' | '\'' => {
                let text = quoted(&mut chars, c)
                    .ok_or_else(|| ParseError::new(config, line, "unterminated string"))?;
                out.push(Token {
                    kind: TokenKind::Quoted,
                    text,
                    line,
                });
            }
            c if is_punct(c) => out.push(Token {
                kind: TokenKind::Punct,
                text: c.to_string(),
                line,
            }),
            c => {
                let mut text = String::from(c);
                while let Some(&n) = chars.peek() {
                    if n.is_whitespace() || is_punct(n) || n == '"' || n == '\'' {
                        break;
                    }
                    text.push(n);
                    chars.next();
                }
                out.push(Token {
                    kind: TokenKind::Word,
                    text,
                    line,
                });
            }
        }
    }

    Ok(out)
}

fn quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> Option<String> {
    let mut text = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\n' => return None,
            '\\' => match chars.next()? {
                'n' => text.push('\n'),
                't' => text.push('\t'),
                other => text.push(other),
            },
            c if c == quote => return Some(text),
            c => text.push(c),
        }
    }
    None
}

/// Cursor over a token list with parse-error helpers.
#[derive(Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    config: ConfigSource,
}

impl TokenStream {
    pub fn new(src: &str, config: ConfigSource) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: tokenize(src, config)?,
            pos: 0,
            config,
        })
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Line of the most recently consumed token (or of the next one at start).
    pub fn line(&self) -> usize {
        let idx = self.pos.saturating_sub(1);
        self.tokens.get(idx).map(|t| t.line).unwrap_or(1)
    }

    pub fn error(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.config, self.line(), msg)
    }

    pub fn next(&mut self) -> Result<Token, ParseError> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.pos += 1;
        Ok(tok)
    }

    /// Next token, which must be a word or quoted string.
    pub fn next_value(&mut self, what: &str) -> Result<String, ParseError> {
        let tok = self.next()?;
        if !tok.is_value() {
            return Err(self.error(format!("expected {what}, found '{}'", tok.text)));
        }
        Ok(tok.text)
    }

    pub fn expect_punct(&mut self, p: char) -> Result<(), ParseError> {
        let tok = self.next()?;
        if tok.is_punct(p) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{p}', found '{}'", tok.text)))
        }
    }
}
