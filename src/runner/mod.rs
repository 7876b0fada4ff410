//! CLI execution and build dispatch.
//!
//! This module keeps `main` minimal: [`run`] loads the description file,
//! registers its rules and builds each requested target in turn. A failed
//! target is reported on the error sink and the remaining targets are still
//! built.

mod error;

pub use error::RunnerError;

use std::io::Write;

use anyhow::{Context, Result};
use camino::Utf8Path;
use tracing::{debug, info, warn};

use crate::build::{BuildOutcome, Builder};
use crate::cli::Cli;
use crate::executor::{RecipeExecutor, ShellExecutor, Sinks};
use crate::model::BuildModel;
use crate::parser::{self, Makefile};
use crate::timestamps::{DiskTimestamps, Timestamps};

/// Tally of the build requests made by one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Requests that finished without error.
    pub succeeded: usize,
    /// Requests that reported an error.
    pub failed: usize,
}

/// Execute the parsed [`Cli`] against the filesystem and the system shell.
///
/// # Errors
///
/// Returns an error when the description file is missing or malformed, or
/// when the sinks cannot be written. Failed targets are not errors; they are
/// counted in the returned [`RunSummary`].
pub fn run(cli: &Cli, sinks: &mut Sinks<'_>) -> Result<RunSummary> {
    if cli.echo {
        writeln!(sinks.out, "{}", cli.echo_line()).context("failed to echo invocation")?;
    }
    let makefile = load_makefile(&cli.file)?;
    let mut model = BuildModel::new();
    register_rules(&mut model, &makefile, sinks)?;

    let mut builder = Builder::with_options(
        DiskTimestamps::new(),
        ShellExecutor::new(),
        cli.build_options(),
    );
    build_targets(&mut builder, &mut model, &cli.targets, sinks)
}

fn load_makefile(path: &Utf8Path) -> Result<Makefile> {
    if !path.exists() {
        return Err(RunnerError::MakefileNotFound {
            path: path.to_owned(),
        }
        .into());
    }
    debug!(file = %path, "reading description file");
    parser::from_path(path)
}

/// Register every rule of `makefile` in `model`.
///
/// Rejected targets are reported on the error sink and skipped. Variable
/// assignments are not expanded and only produce a warning.
///
/// # Errors
///
/// Returns an error if the error sink cannot be written.
pub fn register_rules(
    model: &mut BuildModel,
    makefile: &Makefile,
    sinks: &mut Sinks<'_>,
) -> Result<()> {
    for variable in &makefile.variables {
        warn!(
            name = %variable.name,
            line = variable.line,
            "variable assignments are not expanded; ignoring"
        );
    }
    for rule in &makefile.rules {
        if let Err(err) = model.add_rule(rule) {
            writeln!(sinks.err, "mymake: line {}: {err}", rule.line)
                .context("failed to report rejected rule")?;
        }
    }
    Ok(())
}

/// Build each of `targets`, or the default target when the list is empty.
///
/// Every target is attempted independently.
///
/// # Errors
///
/// Returns an error only when the sinks cannot be written.
pub fn build_targets<T, X>(
    builder: &mut Builder<T, X>,
    model: &mut BuildModel,
    targets: &[String],
    sinks: &mut Sinks<'_>,
) -> Result<RunSummary>
where
    T: Timestamps,
    X: RecipeExecutor,
{
    let requests: Vec<Option<&str>> = if targets.is_empty() {
        vec![None]
    } else {
        targets.iter().map(|t| Some(t.as_str())).collect()
    };

    let mut summary = RunSummary::default();
    for request in requests {
        match builder.build(model, request, sinks) {
            Ok(outcome) => {
                summary.succeeded += 1;
                let name = request
                    .or_else(|| model.default_target().and_then(|id| model.name(id)))
                    .unwrap_or_default();
                report_outcome(name, outcome, sinks).context("failed to write build status")?;
            }
            Err(err) => {
                summary.failed += 1;
                warn!(target = request.unwrap_or_default(), error = %err, "build failed");
                writeln!(sinks.err, "mymake: *** {err}").context("failed to report build error")?;
            }
        }
    }
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "run finished"
    );
    Ok(summary)
}

fn report_outcome(name: &str, outcome: BuildOutcome, sinks: &mut Sinks<'_>) -> std::io::Result<()> {
    match outcome {
        BuildOutcome::Executed => Ok(()),
        BuildOutcome::UpToDate => writeln!(sinks.out, "mymake: '{name}' is up to date."),
        BuildOutcome::NothingToDo => writeln!(sinks.out, "mymake: no targets. Nothing to be done."),
    }
}
