use thiserror::Error;

/// §4.5/§7: a structurally malformed IR reached the asm generator, or an
/// instruction shape it does not know how to lower. The type checker and
/// IR generator are expected to rule these out; these are last-resort
/// internal-invariant checks.
#[derive(Debug, Error)]
pub enum AsmError {
    #[error("call to operator '{0}' has the wrong argument count ({1})")]
    WrongOperatorArity(String, usize),

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// §6: invoking the system assembler/linker failed.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with status {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: i32,
        stderr: String,
    },
}
