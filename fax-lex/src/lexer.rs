//! The tokenizer.
//!
//! `tokenize` linearizes an entire source string in one pass. It never
//! backtracks: each call to `next_token` consumes exactly one token (or
//! fails), and the previous token's end is the next token's start.

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{Token, TokenKind};
use fax_util::SourceLocation;

const TWO_CHAR_OPERATORS: &[&str] = &["==", "!=", "<=", ">=", "=>"];
const ONE_CHAR_OPERATORS: &[u8] = b"+-*/%=<>";
const PUNCTUATION: &[u8] = b"(){},;:";

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    file: String,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: impl Into<String>) -> Self {
        Self {
            cursor: Cursor::new(source),
            file: file.into(),
        }
    }

    fn here(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.cursor.line(), self.cursor.column())
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current() {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.cursor.advance();
                }
                b'/' if self.cursor.peek(1) == b'/' => self.skip_line_comment(),
                b'#' => self.skip_line_comment(),
                _ => break,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while !self.cursor.is_at_end() && self.cursor.current() != b'\n' {
            self.cursor.advance();
        }
    }

    fn lex_int_literal(&mut self) -> Token {
        let start = self.here();
        let mut text = String::new();
        while self.cursor.current().is_ascii_digit() {
            text.push(self.cursor.advance() as char);
        }
        Token::new(text, TokenKind::IntLiteral, start)
    }

    fn lex_identifier(&mut self) -> Token {
        let start = self.here();
        let mut text = String::new();
        while is_ident_continue(self.cursor.current()) {
            text.push(self.cursor.advance() as char);
        }
        Token::new(text, TokenKind::Identifier, start)
    }

    fn lex_operator(&mut self) -> Token {
        let start = self.here();
        for op in TWO_CHAR_OPERATORS {
            let bytes = op.as_bytes();
            if self.cursor.current() == bytes[0] && self.cursor.peek(1) == bytes[1] {
                self.cursor.advance();
                self.cursor.advance();
                return Token::new(*op, TokenKind::Operator, start);
            }
        }
        let c = self.cursor.advance();
        Token::new((c as char).to_string(), TokenKind::Operator, start)
    }

    fn lex_punctuation(&mut self) -> Token {
        let start = self.here();
        let c = self.cursor.advance();
        Token::new((c as char).to_string(), TokenKind::Punctuation, start)
    }

    /// Produces the next token, or `Ok(None)` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace_and_comments();
        if self.cursor.is_at_end() {
            return Ok(None);
        }

        let c = self.cursor.current();
        let token = if c.is_ascii_digit() {
            self.lex_int_literal()
        } else if TWO_CHAR_OPERATORS
            .iter()
            .any(|op| op.as_bytes()[0] == c)
            || ONE_CHAR_OPERATORS.contains(&c)
        {
            self.lex_operator()
        } else if PUNCTUATION.contains(&c) {
            self.lex_punctuation()
        } else if is_ident_start(c) {
            self.lex_identifier()
        } else {
            let location = self.here();
            let character = c as char;
            self.cursor.advance();
            return Err(LexError {
                character,
                location,
            });
        };
        Ok(Some(token))
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Tokenizes the entire source, appending a trailing [`TokenKind::End`]
/// token so the parser never has to special-case "ran off the end".
pub fn tokenize(source: &str, file: impl Into<String>) -> Result<Vec<Token>, LexError> {
    let file = file.into();
    let mut lexer = Lexer::new(source, file.clone());
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    tokens.push(Token::end(lexer.here()));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(String, TokenKind)> {
        tokenize(src, "test")
            .unwrap()
            .into_iter()
            .map(|t| (t.text, t.kind))
            .collect()
    }

    #[test]
    fn numbers_operators_and_punctuation() {
        let toks = kinds("1 + 2 * 3");
        assert_eq!(
            toks,
            vec![
                ("1".into(), TokenKind::IntLiteral),
                ("+".into(), TokenKind::Operator),
                ("2".into(), TokenKind::IntLiteral),
                ("*".into(), TokenKind::Operator),
                ("3".into(), TokenKind::IntLiteral),
                ("".into(), TokenKind::End),
            ]
        );
    }

    #[test]
    fn two_char_operators_take_priority() {
        let toks = kinds("a >= b");
        assert_eq!(toks[1], (">=".into(), TokenKind::Operator));
    }

    #[test]
    fn line_comments_are_discarded() {
        let toks = kinds("1 // comment\n+ 2");
        assert_eq!(toks.len(), 4); // 1, +, 2, End
    }

    #[test]
    fn hash_comments_are_discarded() {
        let toks = kinds("1 # comment\n+ 2");
        assert_eq!(toks.len(), 4);
    }

    #[test]
    fn identifiers_allow_underscore_and_digits() {
        let toks = kinds("my_var2");
        assert_eq!(toks[0], ("my_var2".into(), TokenKind::Identifier));
    }

    #[test]
    fn newline_tracks_location() {
        let tokens = tokenize("a\nb", "f").unwrap();
        assert_eq!(tokens[1].location.line, 2);
        assert_eq!(tokens[1].location.column, 1);
    }

    #[test]
    fn unknown_character_is_lex_error() {
        let err = tokenize("1 @ 2", "f").unwrap_err();
        assert_eq!(err.character, '@');
    }

    #[test]
    fn colon_is_punctuation_not_operator() {
        let toks = kinds("x: Int");
        assert_eq!(toks[1], (":".into(), TokenKind::Punctuation));
    }
}
