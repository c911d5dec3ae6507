//! fax-runtime - the symbols the generated program links against.
//!
//! `print_int`, `print_bool`, and `read_int` are assembled separately from
//! the compiler's own output and linked statically, so this crate ships
//! their GAS source rather than Rust code — there is no Rust translation
//! unit in the final executable, only an extra object file `fax-drv`
//! assembles alongside the generated program.
//!
//! ABI contract, preserved across every implementation:
//!
//! - `print_int(%rdi: i64) -> %rax`: writes the signed decimal
//!   representation followed by `\n` to fd 1.
//! - `print_bool(%rdi: i64) -> %rax`: writes `"true\n"` if `%rdi` is
//!   nonzero, else `"false\n"`.
//! - `read_int() -> %rax`: reads one line from fd 0, parses it as signed
//!   decimal, and exits with status 1 on parse failure or empty input.
//! - `_start`: the process entry point. Calls `main`, then exits with
//!   `main`'s return value — there is no libc to provide this, so the
//!   runtime provides it itself.
//!
//! All preserve `%rbp` and keep `%rsp` 16-byte aligned at every syscall,
//! the same discipline `fax-gen` holds the generated code to at every
//! `call`.

use std::io;
use std::path::Path;

/// The runtime's GAS source, embedded at compile time so `fax-drv` can
/// write it out next to the program being compiled without shipping a
/// separate data file.
pub const SOURCE: &str = include_str!("runtime.s");

/// Writes [`SOURCE`] to `path`, ready for `fax-gen::assemble`.
pub fn write_source(path: &Path) -> io::Result<()> {
    std::fs::write(path, SOURCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_declares_all_entry_symbols() {
        assert!(SOURCE.contains(".globl print_int"));
        assert!(SOURCE.contains(".globl print_bool"));
        assert!(SOURCE.contains(".globl read_int"));
        assert!(SOURCE.contains(".globl _start"));
    }

    #[test]
    fn write_source_round_trips() {
        let dir = std::env::temp_dir().join(format!("fax-runtime-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("runtime.s");
        write_source(&path).expect("write ok");
        let contents = std::fs::read_to_string(&path).expect("read back ok");
        assert_eq!(contents, SOURCE);
        std::fs::remove_dir_all(&dir).ok();
    }
}
