//! Rule text tokenizer.
//!
//! Keywords (`ENTRY`, `EXIT`, `AND`, `OR`) are matched case-insensitively.
//! An identifier directly followed by `(` is a function name. Both function
//! names and data identifiers keep their source spelling; the validator folds
//! function names when looking them up.

use crate::domain::ast::CompareOp;
use crate::domain::error::LexError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Entry,
    Exit,
    And,
    Or,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Keyword> {
        match word.to_ascii_uppercase().as_str() {
            "ENTRY" => Some(Keyword::Entry),
            "EXIT" => Some(Keyword::Exit),
            "AND" => Some(Keyword::And),
            "OR" => Some(Keyword::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Keyword::Entry => "ENTRY",
            Keyword::Exit => "EXIT",
            Keyword::And => "AND",
            Keyword::Or => "OR",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Function(String),
    Number(f64),
    Operator(CompareOp),
    Keyword(Keyword),
    LParen,
    RParen,
    Comma,
    Colon,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) | TokenKind::Function(name) => write!(f, "'{}'", name),
            TokenKind::Number(v) => write!(f, "'{}'", v),
            TokenKind::Operator(op) => write!(f, "'{}'", op),
            TokenKind::Keyword(kw) => write!(f, "'{}'", kw),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::End => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character in the source text.
    pub position: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.remaining().chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '#' {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
        &self.input[start..self.pos]
    }

    fn next_is_open_paren(&self) -> bool {
        self.remaining()
            .chars()
            .find(|c| !c.is_whitespace())
            .is_some_and(|c| c == '(')
    }

    fn lex_word(&mut self) -> TokenKind {
        let word = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if let Some(kw) = Keyword::from_word(word) {
            TokenKind::Keyword(kw)
        } else if self.next_is_open_paren() {
            TokenKind::Function(word.to_string())
        } else {
            TokenKind::Identifier(word.to_string())
        }
    }

    fn lex_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.take_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.take_while(|c| c.is_ascii_digit());
        }
        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| LexError {
                character: text.chars().next().unwrap_or('0'),
                position: start,
            })
    }

    fn lex_operator(&mut self, first: char) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.advance();
        let followed_by_eq = self.peek() == Some('=');
        let op = match (first, followed_by_eq) {
            ('>', true) => CompareOp::Ge,
            ('>', false) => CompareOp::Gt,
            ('<', true) => CompareOp::Le,
            ('<', false) => CompareOp::Lt,
            ('=', true) => CompareOp::Eq,
            _ => {
                return Err(LexError {
                    character: first,
                    position: start,
                });
            }
        };
        if followed_by_eq {
            self.advance();
        }
        Ok(TokenKind::Operator(op))
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let position = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::End,
                position,
            });
        };

        let kind = match ch {
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_word(),
            c if c.is_ascii_digit() => self.lex_number()?,
            '>' | '<' | '=' => self.lex_operator(ch)?,
            '(' | ')' | ',' | ':' => {
                self.advance();
                match ch {
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    ',' => TokenKind::Comma,
                    _ => TokenKind::Colon,
                }
            }
            other => {
                return Err(LexError {
                    character: other,
                    position,
                });
            }
        };

        Ok(Token { kind, position })
    }
}

/// Tokenize rule text. The returned sequence always ends with a
/// [`TokenKind::End`] token.
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::End;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
