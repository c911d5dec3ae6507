use fax_lex::Token;
use fax_util::SourceLocation;
use thiserror::Error;

/// §7: unexpected token, forbidden construct at a position, malformed block.
#[derive(Debug, Error)]
#[error("{location}: {message}")]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }

    pub fn unexpected(expected: &str, found: &Token) -> Self {
        Self::new(
            format!("expected {expected}, found {found}"),
            found.location.clone(),
        )
    }
}
