use fax_util::SourceLocation;
use thiserror::Error;

/// §4.4/§7: the IR generator's own failure modes. Most are defensive —
/// the type checker is expected to have already rejected the program —
/// except the two this naive single-pass generator cannot lower at all.
#[derive(Debug, Error)]
pub enum IrError {
    #[error("{location}: 'break' outside a loop")]
    BreakOutsideLoop { location: SourceLocation },

    #[error("{location}: 'continue' outside a loop")]
    ContinueOutsideLoop { location: SourceLocation },

    #[error("{location}: 'return' outside a function")]
    ReturnOutsideFunction { location: SourceLocation },

    #[error("{location}: undefined identifier '{name}' reached IR generation")]
    UndefinedIdentifier {
        name: String,
        location: SourceLocation,
    },

    #[error("{location}: call target must be a plain function name, not a computed value")]
    UnsupportedCallTarget { location: SourceLocation },
}
