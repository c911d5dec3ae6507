use fax_util::SourceLocation;
use thiserror::Error;

/// §7: raised when a character matches none of the tokenizer's rules.
#[derive(Debug, Error)]
#[error("{location}: unexpected character '{character}'")]
pub struct LexError {
    pub character: char,
    pub location: SourceLocation,
}
