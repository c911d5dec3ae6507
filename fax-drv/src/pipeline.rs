//! End-to-end orchestration: source text in, a linked executable's bytes
//! out. Runs every compiler phase in order (lex -> parse -> typecheck ->
//! IR -> asm) and then assembles and links the result.

use std::path::Path;

use anyhow::{Context, Result};

/// Runs every compiler phase over `source` and writes a statically linked
/// executable to `output_path`. `work_dir` holds the intermediate `.s`/`.o`
/// files; the caller owns its lifetime (a real directory for `compile`, a
/// fresh temp directory per connection for `serve`).
pub fn compile_to_executable(source: &str, work_dir: &Path, output_path: &Path) -> Result<()> {
    let tokens = fax_lex::tokenize(source, "input").context("lexing failed")?;
    let program = fax_par::parse(tokens).context("parsing failed")?;
    let check = fax_sem::check_program(&program).context("type checking failed")?;
    let ir = fax_ir::generate_program(&program, &check).context("IR generation failed")?;
    let asm = fax_gen::generate_program(&ir).context("assembly generation failed")?;

    let program_asm_path = work_dir.join("program.s");
    let program_obj_path = work_dir.join("program.o");
    let runtime_asm_path = work_dir.join("runtime.s");
    let runtime_obj_path = work_dir.join("runtime.o");

    std::fs::write(&program_asm_path, asm)
        .with_context(|| format!("writing {}", program_asm_path.display()))?;
    fax_runtime::write_source(&runtime_asm_path)
        .with_context(|| format!("writing {}", runtime_asm_path.display()))?;

    fax_gen::assemble(&program_asm_path, &program_obj_path).context("assembling program.s")?;
    fax_gen::assemble(&runtime_asm_path, &runtime_obj_path).context("assembling runtime.s")?;

    fax_gen::link(
        &[program_obj_path.as_path(), runtime_obj_path.as_path()],
        output_path,
    )
    .context("linking executable")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_source_before_touching_the_filesystem() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("a.out");
        let err = compile_to_executable("a + b c", dir.path(), &output)
            .expect_err("malformed source must fail");
        assert!(err.to_string().contains("parsing failed"));
        assert!(!output.exists());
    }

    #[test]
    fn emits_program_and_runtime_assembly_before_linking() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("a.out");
        // `as`/`ld` are not necessarily present in every test environment;
        // only the phases before assembling are guaranteed to run here.
        let _ = compile_to_executable("1 + 2 * 3", dir.path(), &output);
        assert!(dir.path().join("program.s").exists());
        assert!(dir.path().join("runtime.s").exists());
    }
}
