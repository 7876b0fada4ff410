//! Helpers for invoking the built `mymake` binary in tests.
//!
//! These utilities use `assert_cmd` to locate the current workspace's
//! `mymake` executable and run it in a controlled working directory,
//! capturing stdout/stderr for assertions.

use std::path::Path;

use anyhow::{Context, Result};
use assert_cmd::Command;
use mymake_env::{MYMAKE_FILE_ENV, MYMAKE_SHELL_ENV};

/// Captured output from a `mymake` invocation.
#[derive(Debug)]
pub struct MymakeRun {
    /// Captured stdout (lossy UTF-8).
    pub stdout: String,
    /// Captured stderr (lossy UTF-8).
    pub stderr: String,
    /// Whether the command exited successfully.
    pub success: bool,
}

/// A `mymake` command rooted at `current_dir`, with the mymake environment
/// variables cleared so the host cannot influence the run.
///
/// # Errors
///
/// Returns an error when the `mymake` binary cannot be located.
pub fn mymake_cmd(current_dir: &Path) -> Result<Command> {
    let mut cmd = Command::cargo_bin("mymake").context("locate mymake binary")?;
    cmd.current_dir(current_dir)
        .env_remove(MYMAKE_FILE_ENV)
        .env_remove(MYMAKE_SHELL_ENV);
    Ok(cmd)
}

/// Run `mymake` in `current_dir` with the supplied args.
///
/// # Errors
///
/// Returns an error when `mymake` cannot be located or the process cannot be
/// spawned.
pub fn run_mymake_in(current_dir: &Path, args: &[&str]) -> Result<MymakeRun> {
    let output = mymake_cmd(current_dir)?
        .args(args)
        .output()
        .context("run mymake command")?;
    Ok(MymakeRun {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    })
}
