use fax_util::SourceLocation;
use std::fmt;

/// The kind of a lexed token. Two-character operators are matched before
/// one-character ones so the lexer always takes the longest match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    IntLiteral,
    Operator,
    Punctuation,
    Identifier,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::IntLiteral => "int literal",
            TokenKind::Operator => "operator",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Identifier => "identifier",
            TokenKind::End => "end of input",
        };
        write!(f, "{s}")
    }
}

/// A single lexed token: its exact source text, kind, and location.
///
/// Keywords (`if`, `while`, `fun`, `var`, `true`, ...) are *not* a distinct
/// kind — they are [`TokenKind::Identifier`] tokens whose text the parser
/// recognizes. The lexer has no keyword table (§4.1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, location: SourceLocation) -> Self {
        Self {
            text: text.into(),
            kind,
            location,
        }
    }

    pub fn end(location: SourceLocation) -> Self {
        Self::new("", TokenKind::End, location)
    }

    pub fn is_text(&self, text: &str) -> bool {
        self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::End {
            write!(f, "end of input")
        } else {
            write!(f, "'{}'", self.text)
        }
    }
}
