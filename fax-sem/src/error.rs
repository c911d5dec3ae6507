use fax_util::SourceLocation;
use thiserror::Error;

/// §4.3/§7: a typing rule was violated.
#[derive(Debug, Error)]
#[error("{location}: {message}")]
pub struct TypeError {
    pub message: String,
    pub location: SourceLocation,
}

impl TypeError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}
