//! fax-drv - the compiler driver: CLI argument parsing, pipeline
//! orchestration, and the JSON server.
//!
//! `main.rs` is a thin wrapper that calls into `run` and reports the error;
//! everything else lives here so it can be exercised directly in tests.

mod cli;
mod pipeline;
mod server;

pub use cli::{parse_args, Command, Config};
pub use pipeline::compile_to_executable;

use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_OUTPUT: &str = "a.out";

/// Runs the driver for one process invocation: parses `args`, then either
/// compiles one file or starts the server, per `config.command`.
pub fn run<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let config = cli::parse_args(args)?;
    match config.command {
        Command::Compile => run_compile(&config),
        Command::Serve => server::run(&config.host, config.port),
    }
}

fn run_compile(config: &Config) -> Result<()> {
    let input_file = config
        .input_file
        .as_ref()
        .context("compile requires an input file")?;
    let source = std::fs::read_to_string(input_file)
        .with_context(|| format!("reading {}", input_file.display()))?;

    let work_dir = tempfile::tempdir().context("creating work directory")?;
    let output_path = config
        .output_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    pipeline::compile_to_executable(&source, work_dir.path(), &output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_without_input_file_is_an_error() {
        let err = run(["compile"]).expect_err("missing input file must fail");
        assert!(err.to_string().contains("input file"));
    }

    #[test]
    fn compile_with_missing_file_reports_io_error() {
        let err = run(["compile", "does-not-exist.fax"]).expect_err("missing file must fail");
        assert!(err.to_string().contains("does-not-exist.fax"));
    }
}
