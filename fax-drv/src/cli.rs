//! Argument parsing for the driver: positional `command` and `input-file`,
//! `--key=value` flags recognized in any order, any other `-`-prefixed
//! token is a hard error. Hand-rolled rather than built on a declarative
//! flag-parsing crate, since the grammar mixes positionals and flags
//! freely and there's no derive-friendly struct worth building for three
//! flags.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Compile,
    Serve,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,
    pub input_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub host: String,
    pub port: u16,
}

/// Parses `args` (already stripped of the program name, as
/// `std::env::args().skip(1)` gives you).
pub fn parse_args<I, S>(args: I) -> Result<Config>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut command: Option<String> = None;
    let mut input_file: Option<PathBuf> = None;
    let mut output_file: Option<PathBuf> = None;
    let mut host = DEFAULT_HOST.to_string();
    let mut port = DEFAULT_PORT;

    for arg in args {
        let arg = arg.as_ref();
        if let Some(value) = arg.strip_prefix("--output=") {
            output_file = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--host=") {
            host = value.to_string();
        } else if let Some(value) = arg.strip_prefix("--port=") {
            port = value
                .parse()
                .with_context(|| format!("invalid port value: {value}"))?;
        } else if arg.starts_with('-') {
            bail!("unknown argument: {arg}");
        } else if command.is_none() {
            command = Some(arg.to_string());
        } else if input_file.is_none() {
            input_file = Some(PathBuf::from(arg));
        } else {
            bail!("multiple input files not supported");
        }
    }

    let command = command.context("command argument missing")?;
    let command = match command.as_str() {
        "compile" => Command::Compile,
        "serve" => Command::Serve,
        other => bail!("unknown command: {other}"),
    };

    Ok(Config {
        command,
        input_file,
        output_file,
        host,
        port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        parse_args(args.iter().copied())
    }

    #[test]
    fn compile_with_input_file() {
        let config = parse(&["compile", "main.fax"]).expect("parses");
        assert_eq!(config.command, Command::Compile);
        assert_eq!(config.input_file, Some(PathBuf::from("main.fax")));
    }

    #[test]
    fn output_flag_is_recognized_in_any_position() {
        let config = parse(&["--output=a.out", "compile", "main.fax"]).expect("parses");
        assert_eq!(config.output_file, Some(PathBuf::from("a.out")));
    }

    #[test]
    fn serve_defaults_host_and_port() {
        let config = parse(&["serve"]).expect("parses");
        assert_eq!(config.command, Command::Serve);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn host_and_port_flags_override_defaults() {
        let config = parse(&["serve", "--host=0.0.0.0", "--port=8080"]).expect("parses");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn missing_command_is_an_error() {
        assert!(parse(&["--output=a.out"]).is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse(&["launch"]).is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(parse(&["compile", "main.fax", "--bogus"]).is_err());
    }

    #[test]
    fn invalid_port_value_is_an_error() {
        assert!(parse(&["serve", "--port=not-a-number"]).is_err());
    }

    #[test]
    fn second_positional_after_input_file_is_an_error() {
        assert!(parse(&["compile", "main.fax", "extra.fax"]).is_err());
    }
}
