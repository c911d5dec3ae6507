//! Drives the system assembler and linker on generated GAS text by
//! shelling out to `as` and `ld`.

use std::path::Path;
use std::process::Command;

use crate::error::LinkError;

fn run(program: &str, args: &[&str]) -> Result<(), LinkError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| LinkError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(LinkError::NonZeroExit {
            program: program.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

/// Assembles `asm_path` into `object_path` with `as`.
pub fn assemble(asm_path: &Path, object_path: &Path) -> Result<(), LinkError> {
    run(
        "as",
        &[
            "-o",
            &object_path.to_string_lossy(),
            &asm_path.to_string_lossy(),
        ],
    )
}

/// Links `object_paths` (the compiled program plus `fax-runtime`'s
/// assembled object) into a fully static executable. `print_int`/
/// `print_bool`/`read_int` are implemented with raw syscalls, so no libc
/// and no dynamic linker are needed; `fax-runtime`'s `_start` is the
/// process entry point `ld` resolves by default for a static binary.
pub fn link(object_paths: &[&Path], output_path: &Path) -> Result<(), LinkError> {
    let mut args: Vec<String> = vec![
        "-static".to_string(),
        "-o".to_string(),
        output_path.to_string_lossy().into_owned(),
    ];
    args.extend(object_paths.iter().map(|p| p.to_string_lossy().into_owned()));
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    run("ld", &arg_refs)
}
