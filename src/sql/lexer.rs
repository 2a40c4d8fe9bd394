//! SQL Lexer (Tokenizer)
//!
//! This module converts a command line into a stream of tokens.

use super::token::Token;
use crate::error::{Error, Result};

/// SQL Lexer
pub struct Lexer {
    /// Input characters
    input: Vec<char>,
    /// Current position in input
    position: usize,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        if self.is_at_end() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();

        let single = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            '=' => Some(Token::Eq),
            '*' => Some(Token::Asterisk),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        if ch == '\'' {
            return self.read_string();
        }

        // Negative numbers and other dash-prefixed bare values
        if ch == '-' && self.peek_char().is_some_and(is_word_char) {
            return Ok(self.read_word());
        }

        if is_word_char(ch) {
            return Ok(self.read_word());
        }

        Err(Error::UnexpectedCharacter(ch, self.position))
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get the current character
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    /// Peek at the next character
    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    /// Read a string literal (single-quoted)
    fn read_string(&mut self) -> Result<Token> {
        let start_pos = self.position;
        self.advance(); // skip opening quote

        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch == '\'' {
                // Check for escaped quote ''
                if self.peek_char() == Some('\'') {
                    value.push('\'');
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // skip closing quote
                    return Ok(Token::StringLiteral(value));
                }
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Err(Error::UnterminatedString(start_pos))
    }

    /// Read a bare word: keyword, identifier or unquoted value.
    ///
    /// A `.` is kept only when another word character follows, so `3.5`
    /// is one word while a trailing dot is rejected by the caller.
    fn read_word(&mut self) -> Token {
        let mut value = String::new();
        value.push(self.current_char());
        self.advance();

        while !self.is_at_end() {
            let ch = self.current_char();

            if is_word_char(ch) {
                value.push(ch);
                self.advance();
            } else if ch == '.' && self.peek_char().is_some_and(is_word_char) {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::Word(value)
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
