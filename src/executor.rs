//! Recipe execution.
//!
//! [`RecipeExecutor`] is the seam between the build engine and the outside
//! world. [`ShellExecutor`] runs each recipe line through the platform shell,
//! one blocking child process per line, and forwards the child's output to
//! the caller's sinks.
//!
//! Line prefixes follow make: `@` suppresses the echo of the command and `-`
//! ignores a non-zero exit status.

use std::env;
use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};

use mymake_env::MYMAKE_SHELL_ENV;
use tracing::{info, warn};

#[cfg(windows)]
const SHELL: &str = "cmd";
#[cfg(windows)]
const SHELL_ARGS: &[&str] = &["/C"];

#[cfg(not(windows))]
const SHELL: &str = "sh";
#[cfg(not(windows))]
const SHELL_ARGS: &[&str] = &["-c"];

/// Output and error channels a build writes to.
pub struct Sinks<'a> {
    /// Progress, echoed commands and child stdout.
    pub out: &'a mut dyn Write,
    /// Diagnostics and child stderr.
    pub err: &'a mut dyn Write,
}

impl<'a> Sinks<'a> {
    /// Bundle an output and an error writer.
    #[must_use]
    pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Self { out, err }
    }
}

/// Runs recipes on behalf of the build engine.
pub trait RecipeExecutor {
    /// Run `recipe` in order, or only report it when `dry_run` is set.
    ///
    /// Returns `true` when the recipe was carried out (or reported) in full.
    fn execute(&mut self, recipe: &[String], sinks: &mut Sinks<'_>, dry_run: bool) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct LineFlags {
    silent: bool,
    ignore_errors: bool,
}

fn split_prefixes(line: &str) -> (LineFlags, &str) {
    let mut flags = LineFlags::default();
    let mut rest = line.trim_start();
    loop {
        if let Some(stripped) = rest.strip_prefix('@') {
            flags.silent = true;
            rest = stripped.trim_start();
        } else if let Some(stripped) = rest.strip_prefix('-') {
            flags.ignore_errors = true;
            rest = stripped.trim_start();
        } else {
            return (flags, rest);
        }
    }
}

/// Executes recipe lines with `sh -c` (`cmd /C` on Windows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellExecutor {
    program: String,
    args: Vec<String>,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellExecutor {
    /// Use the platform shell, or the program named by `MYMAKE_SHELL`.
    #[must_use]
    pub fn new() -> Self {
        let program = env::var(MYMAKE_SHELL_ENV).unwrap_or_else(|_| SHELL.to_owned());
        Self::with_shell(program, SHELL_ARGS.iter().copied())
    }

    /// Run recipe lines as `program <args...> <line>`.
    #[must_use]
    pub fn with_shell<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn run_line(&self, command: &str, sinks: &mut Sinks<'_>) -> io::Result<ExitStatus> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(command)
            .stdin(Stdio::null())
            .output()?;
        sinks.out.write_all(&output.stdout)?;
        sinks.err.write_all(&output.stderr)?;
        Ok(output.status)
    }

    fn run_recipe(&self, recipe: &[String], sinks: &mut Sinks<'_>) -> io::Result<bool> {
        for line in recipe {
            let (flags, command) = split_prefixes(line);
            if !flags.silent {
                writeln!(sinks.out, "{command}")?;
            }
            info!(command, "running recipe line");
            let status = self.run_line(command, sinks)?;
            if status.success() {
                continue;
            }
            let code = status
                .code()
                .map_or_else(|| "signal".to_owned(), |c| c.to_string());
            if flags.ignore_errors {
                writeln!(sinks.err, "mymake: [{command}] Error {code} (ignored)")?;
                continue;
            }
            writeln!(sinks.err, "mymake: *** [{command}] Error {code}")?;
            return Ok(false);
        }
        Ok(true)
    }
}

impl RecipeExecutor for ShellExecutor {
    fn execute(&mut self, recipe: &[String], sinks: &mut Sinks<'_>, dry_run: bool) -> bool {
        if recipe.is_empty() {
            return false;
        }
        if dry_run {
            return report(recipe, &mut *sinks.out)
                .inspect_err(|err| warn!(error = %err, "failed to report recipe"))
                .is_ok();
        }
        match self.run_recipe(recipe, sinks) {
            Ok(done) => done,
            Err(err) => {
                warn!(program = %self.program, error = %err, "recipe could not be run");
                if let Err(write_err) = writeln!(sinks.err, "mymake: {err}") {
                    warn!(error = %write_err, "failed to write to error sink");
                }
                false
            }
        }
    }
}

fn report(recipe: &[String], out: &mut dyn Write) -> io::Result<()> {
    for line in recipe {
        let (_, command) = split_prefixes(line);
        writeln!(out, "{command}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, reason = "tests use expect to keep fixtures terse")]
    use super::*;
    use rstest::{fixture, rstest};

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[fixture]
    fn shell() -> ShellExecutor {
        ShellExecutor::with_shell(SHELL, SHELL_ARGS.iter().copied())
    }

    fn run(executor: &mut ShellExecutor, recipe: &[String], dry_run: bool) -> (bool, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let done = executor.execute(recipe, &mut Sinks::new(&mut out, &mut err), dry_run);
        (
            done,
            String::from_utf8_lossy(&out).into_owned(),
            String::from_utf8_lossy(&err).into_owned(),
        )
    }

    #[rstest]
    #[case("echo hi", LineFlags::default(), "echo hi")]
    #[case("@echo hi", LineFlags { silent: true, ignore_errors: false }, "echo hi")]
    #[case("-false", LineFlags { silent: false, ignore_errors: true }, "false")]
    #[case("@- rm x", LineFlags { silent: true, ignore_errors: true }, "rm x")]
    fn prefixes_are_recognised(#[case] line: &str, #[case] flags: LineFlags, #[case] command: &str) {
        assert_eq!(split_prefixes(line), (flags, command));
    }

    #[rstest]
    fn dry_run_reports_without_running(mut shell: ShellExecutor) {
        let dir = tempfile::tempdir().expect("temp dir");
        let marker = dir.path().join("marker");
        let recipe = lines(&[&format!("@touch {}", marker.display())]);
        let (done, out, _) = run(&mut shell, &recipe, true);
        assert!(done);
        assert_eq!(out, format!("touch {}\n", marker.display()));
        assert!(!marker.exists());
    }

    #[rstest]
    fn empty_recipe_does_not_execute(mut shell: ShellExecutor) {
        let (done, out, _) = run(&mut shell, &[], false);
        assert!(!done);
        assert!(out.is_empty());
    }

    #[cfg(unix)]
    #[rstest]
    fn runs_lines_and_forwards_output(mut shell: ShellExecutor) {
        let (done, out, _) = run(&mut shell, &lines(&["echo one", "@echo two"]), false);
        assert!(done);
        assert_eq!(out, "echo one\none\ntwo\n");
    }

    #[cfg(unix)]
    #[rstest]
    fn failing_line_stops_the_recipe(mut shell: ShellExecutor) {
        let (done, out, err) = run(&mut shell, &lines(&["exit 3", "echo never"]), false);
        assert!(!done);
        assert!(!out.contains("never"));
        assert!(err.contains("Error 3"), "stderr: {err}");
    }

    #[cfg(unix)]
    #[rstest]
    fn ignored_failure_continues(mut shell: ShellExecutor) {
        let (done, out, err) = run(&mut shell, &lines(&["-exit 1", "@echo after"]), false);
        assert!(done);
        assert!(out.ends_with("after\n"));
        assert!(err.contains("(ignored)"));
    }

    #[rstest]
    fn missing_shell_is_a_failed_execution() {
        let mut executor = ShellExecutor::with_shell("/nonexistent/mymake-shell", ["-c"]);
        let (done, _, err) = run(&mut executor, &lines(&["echo hi"]), false);
        assert!(!done);
        assert!(err.starts_with("mymake: "));
    }
}
