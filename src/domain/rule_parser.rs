//! Rule DSL parser.
//!
//! Recursive descent over the token stream with meaningful error messages
//! including byte offset and expected/found tokens.
//!
//! ```text
//! program     := [ENTRY ':' expression] [EXIT ':' expression]   (either order)
//! expression  := and_expr {'OR' and_expr}
//! and_expr    := comp_expr {'AND' comp_expr}
//! comp_expr   := primary [comp_op primary]
//! primary     := IDENT | NUMBER | IDENT '(' [expression {',' expression}] ')'
//!              | '(' expression ')'
//! ```

use crate::domain::ast::{BoolOp, Node, RuleSet};
use crate::domain::error::{ParseError, SyntaxError};
use crate::domain::lexer::{lex, Keyword, Token, TokenKind};

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        // lex() guarantees a trailing End token, and advance() never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::End {
            self.pos += 1;
        }
        token
    }

    fn error(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError {
            message: format!("expected {}, found {}", expected, token.kind),
            position: token.position,
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(expected))
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek().kind == TokenKind::Keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_program(&mut self) -> Result<RuleSet, ParseError> {
        let mut rules = RuleSet::default();

        loop {
            let header = self.peek().clone();
            let keyword = match header.kind {
                TokenKind::End => return Ok(rules),
                TokenKind::Keyword(kw @ (Keyword::Entry | Keyword::Exit)) => kw,
                _ => {
                    let expected = if rules.entry.is_none() && rules.exit.is_none() {
                        "'ENTRY' or 'EXIT'"
                    } else {
                        "'ENTRY', 'EXIT' or end of input"
                    };
                    return Err(self.error(expected));
                }
            };

            let slot = match keyword {
                Keyword::Entry => &mut rules.entry,
                _ => &mut rules.exit,
            };
            if slot.is_some() {
                return Err(ParseError {
                    message: format!("duplicate '{}' block", keyword),
                    position: header.position,
                });
            }

            self.advance();
            if self.peek().kind != TokenKind::Colon {
                return Err(self.error(&format!("':' after '{}'", keyword)));
            }
            self.advance();

            if matches!(
                self.peek().kind,
                TokenKind::End | TokenKind::Keyword(Keyword::Entry) | TokenKind::Keyword(Keyword::Exit)
            ) {
                return Err(self.error(&format!("expression after '{}:'", keyword)));
            }

            let expr = self.parse_expression()?;
            *slot = Some(expr);
        }
    }

    fn parse_expression(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_and()?;
        while self.consume_keyword(Keyword::Or) {
            let right = self.parse_and()?;
            left = Node::BooleanOp {
                op: BoolOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_comparison()?;
        while self.consume_keyword(Keyword::And) {
            let right = self.parse_comparison()?;
            left = Node::BooleanOp {
                op: BoolOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_primary()?;
        let TokenKind::Operator(op) = self.peek().kind else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_primary()?;

        if let TokenKind::Operator(next) = self.peek().kind {
            return Err(ParseError {
                message: format!("chained comparison: unexpected '{}' after comparison", next),
                position: self.peek().position,
            });
        }

        Ok(Node::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Node::Identifier(name))
            }
            TokenKind::Number(value) => {
                self.advance();
                Ok(Node::NumberLiteral(value))
            }
            TokenKind::Function(name) => {
                self.advance();
                self.parse_call(name)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.error("expression")),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Node, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;

        let mut args = Vec::new();
        if self.peek().kind == TokenKind::RParen {
            self.advance();
            return Ok(Node::FunctionCall { name, args });
        }

        loop {
            args.push(self.parse_expression()?);
            match self.peek().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error("',' or ')'")),
            }
        }

        Ok(Node::FunctionCall { name, args })
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        if self.peek().kind == TokenKind::End {
            Ok(())
        } else {
            Err(self.error("end of input"))
        }
    }
}

/// Parse a full rule program into its entry and exit trees.
pub fn parse(input: &str) -> Result<RuleSet, SyntaxError> {
    let tokens = lex(input)?;
    let mut parser = Parser::new(tokens);
    Ok(parser.parse_program()?)
}

/// Parse a single expression with no `ENTRY:`/`EXIT:` header.
pub fn parse_expression(input: &str) -> Result<Node, SyntaxError> {
    let tokens = lex(input)?;
    let mut parser = Parser::new(tokens);
    let node = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(node)
}
