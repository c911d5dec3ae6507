//! fax-lex - the tokenizer.
//!
//! Linearizes a source string into a flat [`Token`] stream. Whitespace and
//! line comments (`//` and `#`) are discarded; everything else becomes a
//! token with an attached [`fax_util::SourceLocation`].

mod cursor;
mod error;
mod lexer;
mod token;

pub use error::LexError;
pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind};
