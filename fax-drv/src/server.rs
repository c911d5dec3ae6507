//! JSON-over-TCP server. Accepts a single JSON document per connection and
//! replies with a single JSON document, rather than speaking HTTP — a
//! plain `TcpListener` is enough for a one-shot request/response contract
//! with no headers, routing, or keep-alive to manage.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::pipeline::compile_to_executable;

#[derive(Debug, Deserialize)]
struct Request {
    command: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Default, Serialize)]
struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Response {
    fn error(message: impl Into<String>) -> Self {
        Self {
            program: None,
            error: Some(message.into()),
        }
    }

    fn program(bytes: &[u8]) -> Self {
        Self {
            program: Some(BASE64.encode(bytes)),
            error: None,
        }
    }
}

/// Binds `host:port` and serves the JSON contract forever, one thread per
/// connection. Never returns on success; the caller (`main`) treats a
/// returned error as fatal.
pub fn run(host: &str, port: u16) -> Result<()> {
    let address = format!("{host}:{port}");
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("binding to {address}"))?;
    eprintln!("Server running on: {address}");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                std::thread::spawn(move || handle_connection(stream));
            }
            Err(err) => eprintln!("accept failed: {err}"),
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream) {
    let mut body = Vec::new();
    if let Err(err) = stream.read_to_end(&mut body) {
        eprintln!("read failed: {err}");
        return;
    }

    let response = match serde_json::from_slice::<Request>(&body) {
        Ok(request) => handle_request(&request),
        Err(err) => Response::error(format!("invalid JSON: {err}")),
    };

    let encoded = match serde_json::to_vec(&response) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("failed to encode response: {err}");
            return;
        }
    };
    if let Err(err) = stream.write_all(&encoded) {
        eprintln!("write failed: {err}");
    }
}

fn handle_request(request: &Request) -> Response {
    match request.command.as_str() {
        "ping" => Response::default(),
        "compile" => compile_request(&request.code),
        other => Response::error(format!("Unknown command: {other}")),
    }
}

fn compile_request(code: &str) -> Response {
    let work_dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => return Response::error(format!("failed to create work directory: {err}")),
    };
    let output_path = work_dir.path().join("a.out");
    match compile_to_executable(code, work_dir.path(), &output_path) {
        Ok(()) => match std::fs::read(&output_path) {
            Ok(bytes) => Response::program(&bytes),
            Err(err) => Response::error(format!("failed to read compiled output: {err}")),
        },
        Err(err) => Response::error(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_request_yields_empty_object() {
        let response = handle_request(&Request {
            command: "ping".to_string(),
            code: String::new(),
        });
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn unknown_command_yields_error_field() {
        let response = handle_request(&Request {
            command: "teleport".to_string(),
            code: String::new(),
        });
        assert!(response.error.unwrap().contains("Unknown command"));
    }

    #[test]
    fn malformed_source_yields_error_not_panic() {
        let response = compile_request("a + b c");
        assert!(response.error.is_some());
        assert!(response.program.is_none());
    }
}
