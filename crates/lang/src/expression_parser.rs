//! Recursive-descent parser for the expression language
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := sum ('=' sum)?
//! sum     := prod (('+' | '-') prod)*
//! prod    := atom (('*' | '/') atom)*
//! atom    := int | double | string | path | '(' expr ')'
//! path    := ident ('.' ident)*
//! string  := '"' (char | '\' esc)* '"'
//! ```
//!
//! Paths must be rooted at `memory`, `context`, or `message`; any other
//! identifier is a parse error.

use crate::ast::{BinaryOp, ExpressionAst};
use agerun_core::{ErrorKind, RuntimeError};

/// Parse a complete expression; trailing input is an error.
pub fn parse_expression(source: &str) -> Result<ExpressionAst, RuntimeError> {
    let mut parser = ExpressionParser::new(source);
    let expr = parser.parse_equality()?;
    parser.skip_whitespace();
    if !parser.is_at_end() {
        return Err(parser.error(format!(
            "unexpected input after expression: '{}'",
            parser.remaining()
        )));
    }
    Ok(expr)
}

struct ExpressionParser {
    chars: Vec<char>,
    pos: usize,
}

impl ExpressionParser {
    fn new(source: &str) -> ExpressionParser {
        ExpressionParser {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> RuntimeError {
        RuntimeError::new(ErrorKind::Parse, message)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn remaining(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }

    fn parse_equality(&mut self) -> Result<ExpressionAst, RuntimeError> {
        let left = self.parse_sum()?;
        self.skip_whitespace();
        if self.peek() == Some('=') {
            self.advance();
            let right = self.parse_sum()?;
            return Ok(ExpressionAst::Binary {
                op: BinaryOp::Equal,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_sum(&mut self) -> Result<ExpressionAst, RuntimeError> {
        let mut left = self.parse_product()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('+') => BinaryOp::Add,
                // A '-' that begins a numeric literal belongs to the atom,
                // but after a complete left operand it is always subtraction.
                Some('-') => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_product()?;
            left = ExpressionAst::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_product(&mut self) -> Result<ExpressionAst, RuntimeError> {
        let mut left = self.parse_atom()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('*') => BinaryOp::Multiply,
                Some('/') => BinaryOp::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_atom()?;
            left = ExpressionAst::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<ExpressionAst, RuntimeError> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.advance();
                let expr = self.parse_equality()?;
                self.skip_whitespace();
                if self.advance() != Some(')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(expr)
            }
            Some('"') => self.parse_string(),
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some('-') if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.parse_number()
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.parse_path(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn parse_string(&mut self) -> Result<ExpressionAst, RuntimeError> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(ExpressionAst::StringLiteral(text)),
                Some('\\') => match self.advance() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(c) => text.push(c),
                    None => return Err(self.error("unterminated string literal")),
                },
                Some(c) => text.push(c),
                None => return Err(self.error("unterminated string literal")),
            }
        }
    }

    fn parse_number(&mut self) -> Result<ExpressionAst, RuntimeError> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            text.push(self.advance().unwrap());
        }
        // A dot followed by a digit makes this a double literal; a bare
        // trailing dot belongs to nothing and is rejected below.
        let mut is_double = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_double = true;
            text.push('.');
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                text.push(self.advance().unwrap());
            }
        }
        if is_double {
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(format!("invalid double literal '{}'", text)))?;
            Ok(ExpressionAst::DoubleLiteral(value))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| self.error(format!("invalid integer literal '{}'", text)))?;
            Ok(ExpressionAst::IntLiteral(value))
        }
    }

    fn parse_identifier(&mut self) -> Result<String, RuntimeError> {
        let mut ident = String::new();
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            ident.push(self.advance().unwrap());
        }
        if ident.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(ident)
    }

    fn parse_path(&mut self) -> Result<ExpressionAst, RuntimeError> {
        let root = self.parse_identifier()?;
        let mut segments = Vec::new();
        while self.peek() == Some('.') {
            self.advance();
            segments.push(self.parse_identifier()?);
        }
        match root.as_str() {
            "memory" => Ok(ExpressionAst::MemoryAccess(segments)),
            "context" => Ok(ExpressionAst::ContextAccess(segments)),
            "message" => Ok(ExpressionAst::MessageAccess(segments)),
            other => Err(self.error(format!(
                "unknown accessor root '{}' (expected memory, context, or message)",
                other
            ))),
        }
    }
}
