//! Shared `rustc` subprocess helpers (spec §4.4, §4.8 gates 4-5). Rust has
//! no stable embeddable compiler, so both the Validator's compile/test
//! gates and the Benchmarker's recompile-and-run cycle shell out to the
//! installed toolchain the same way `vcs.rs` shells out to `git`.

use std::io::Write as _;
use std::process::{Command, Output};

use evo_shared::EvoError;

/// Write `source` to a fresh temporary `.rs` file.
pub fn write_temp_source(source: &str) -> Result<tempfile::NamedTempFile, EvoError> {
    let mut file = tempfile::Builder::new()
        .suffix(".rs")
        .tempfile()
        .map_err(|_| EvoError::TestExecutionFailed)?;
    file.write_all(source.as_bytes())
        .map_err(|_| EvoError::TestExecutionFailed)?;
    file.flush().map_err(|_| EvoError::TestExecutionFailed)?;
    Ok(file)
}

/// Compile `source` as a library crate, discarding the artifact. Used by
/// Gate 4, which only cares whether compilation succeeds.
pub fn compile_lib(source: &str) -> Result<Output, EvoError> {
    let tmp = write_temp_source(source)?;
    let out = tmp.path().with_extension("rlib");

    let output = Command::new("rustc")
        .arg("--edition")
        .arg("2021")
        .arg("--crate-type")
        .arg("lib")
        .arg("-o")
        .arg(&out)
        .arg(tmp.path())
        .output()
        .map_err(|_| EvoError::TestExecutionFailed)?;

    let _ = std::fs::remove_file(&out);
    Ok(output)
}

/// Compile `source` as a binary (optionally a `--test` harness) and run it,
/// returning the child process's output. Used by Gate 5 (test harness) and
/// by the Benchmarker (plain binary embedding a timing harness) — both
/// need "compile what's on disk right now, then execute it", which is the
/// only portable stand-in for hot-reloading a running target (spec §9).
pub fn compile_and_run_bin(source: &str, test_harness: bool) -> Result<(Output, Output), EvoError> {
    let tmp = write_temp_source(source)?;
    let bin = tmp.path().with_extension("");

    let mut cmd = Command::new("rustc");
    cmd.arg("--edition").arg("2021");
    if test_harness {
        cmd.arg("--test");
    }
    cmd.arg("-o").arg(&bin).arg(tmp.path());

    let build = cmd.output().map_err(|_| EvoError::TestExecutionFailed)?;
    if !build.status.success() {
        let _ = std::fs::remove_file(&bin);
        return Err(EvoError::CompilationFailed(
            String::from_utf8_lossy(&build.stderr).to_string(),
        ));
    }

    let run = Command::new(&bin).output().map_err(|_| EvoError::TestExecutionFailed)?;
    let _ = std::fs::remove_file(&bin);
    Ok((build, run))
}
