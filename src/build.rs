//! Building targets from a [`BuildModel`].
//!
//! [`Builder`] resolves the requested target, rejects graphs that loop back
//! on themselves and then walks the dependencies in post order, running every
//! recipe whose inputs are newer than its output.

mod cycle;
mod error;
mod staleness;

pub use cycle::detect_cycle;
pub use error::BuildError;

use tracing::{debug, info};

use crate::executor::{RecipeExecutor, Sinks};
use crate::model::BuildModel;
use crate::timestamps::Timestamps;
use staleness::Evaluator;

/// Switches that change how a build reports and runs recipes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Write every node considered to the output sink.
    pub verbose: bool,
    /// Report recipes instead of running them.
    pub dry_run: bool,
}

/// Result of a successful build request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// At least one recipe was dispatched.
    Executed,
    /// The target was already newer than everything it depends on.
    UpToDate,
    /// No target was requested and none is registered.
    NothingToDo,
}

/// Drives builds against a timestamp source and a recipe executor.
#[derive(Debug)]
pub struct Builder<T, X> {
    timestamps: T,
    executor: X,
    options: BuildOptions,
}

impl<T, X> Builder<T, X>
where
    T: Timestamps,
    X: RecipeExecutor,
{
    /// Create a builder with default options.
    #[must_use]
    pub fn new(timestamps: T, executor: X) -> Self {
        Self::with_options(timestamps, executor, BuildOptions::default())
    }

    /// Create a builder with explicit options.
    #[must_use]
    pub const fn with_options(timestamps: T, executor: X, options: BuildOptions) -> Self {
        Self {
            timestamps,
            executor,
            options,
        }
    }

    /// Options in effect for every build.
    #[must_use]
    pub const fn options(&self) -> BuildOptions {
        self.options
    }

    /// Borrow the executor, e.g. to inspect what it ran.
    #[must_use]
    pub const fn executor(&self) -> &X {
        &self.executor
    }

    /// Build `target`, or the default target when `target` is `None`.
    ///
    /// # Errors
    ///
    /// - [`BuildError::TargetNotFound`] when `target` names no node.
    /// - [`BuildError::CycleDetected`] when the target's graph has a cycle;
    ///   no recipe runs.
    /// - [`BuildError::NoRuleForTarget`] when a dependency is missing and has
    ///   no recipe; recipes already dispatched are not undone.
    /// - [`BuildError::Output`] when the output sink cannot be written.
    ///
    /// # Examples
    ///
    /// ```
    /// use mymake::build::{BuildError, Builder};
    /// use mymake::executor::{ShellExecutor, Sinks};
    /// use mymake::model::BuildModel;
    /// use mymake::timestamps::DiskTimestamps;
    ///
    /// let mut model = BuildModel::new();
    /// let mut builder = Builder::new(DiskTimestamps::new(), ShellExecutor::new());
    /// let (mut out, mut err) = (Vec::new(), Vec::new());
    /// let result = builder.build(&mut model, Some("ghost"), &mut Sinks::new(&mut out, &mut err));
    /// assert!(matches!(result, Err(BuildError::TargetNotFound { .. })));
    /// ```
    pub fn build(
        &mut self,
        model: &mut BuildModel,
        target: Option<&str>,
        sinks: &mut Sinks<'_>,
    ) -> Result<BuildOutcome, BuildError> {
        let root = match target {
            Some(name) => model
                .lookup(name)
                .ok_or_else(|| BuildError::TargetNotFound {
                    name: name.to_owned(),
                })?,
            None => match model.default_target() {
                Some(root) => root,
                None => {
                    debug!("no targets registered");
                    return Ok(BuildOutcome::NothingToDo);
                }
            },
        };
        let name = model.name(root).unwrap_or_default().to_owned();

        if detect_cycle(model.graph_mut(), root) {
            return Err(BuildError::CycleDetected { target: name });
        }

        info!(target = %name, dry_run = self.options.dry_run, "building");
        let required = self.timestamps.last_modification(&name);
        let mut evaluator = Evaluator {
            graph: model.graph(),
            root,
            timestamps: &self.timestamps,
            executor: &mut self.executor,
            sinks,
            options: self.options,
            open: Vec::new(),
        };
        if evaluator.visit(root, required)? {
            Ok(BuildOutcome::Executed)
        } else {
            debug!(target = %name, "up to date");
            Ok(BuildOutcome::UpToDate)
        }
    }
}
