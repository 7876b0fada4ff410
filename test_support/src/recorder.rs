//! A recipe executor that records instead of running.

use std::io::Write;

use mymake::executor::{RecipeExecutor, Sinks};

/// One call made to a [`RecordingExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    /// Recipe lines passed in.
    pub recipe: Vec<String>,
    /// Whether the call was a dry run.
    pub dry_run: bool,
}

/// Records every recipe it is asked to execute and reports a fixed result.
///
/// Each recipe line is also written to the output sink, mirroring what a
/// shell-backed executor echoes.
#[derive(Debug, Clone)]
pub struct RecordingExecutor {
    runs: Vec<RecordedRun>,
    result: bool,
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::succeeding()
    }
}

impl RecordingExecutor {
    /// An executor whose every call reports success.
    pub const fn succeeding() -> Self {
        Self {
            runs: Vec::new(),
            result: true,
        }
    }

    /// An executor whose every call reports failure.
    pub const fn failing() -> Self {
        Self {
            runs: Vec::new(),
            result: false,
        }
    }

    /// All calls in order.
    pub fn runs(&self) -> &[RecordedRun] {
        &self.runs
    }

    /// The first line of each executed recipe, in execution order.
    pub fn first_lines(&self) -> Vec<&str> {
        self.runs
            .iter()
            .filter_map(|run| run.recipe.first().map(String::as_str))
            .collect()
    }
}

impl RecipeExecutor for RecordingExecutor {
    fn execute(&mut self, recipe: &[String], sinks: &mut Sinks<'_>, dry_run: bool) -> bool {
        for line in recipe {
            // Sink failures are irrelevant to what was recorded.
            drop(writeln!(sinks.out, "{line}"));
        }
        self.runs.push(RecordedRun {
            recipe: recipe.to_vec(),
            dry_run,
        });
        self.result
    }
}
