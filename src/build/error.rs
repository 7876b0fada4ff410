//! Errors raised while building a target.

use std::io;

use miette::Diagnostic;
use thiserror::Error;

/// Failures that abort a single build request.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    /// The requested name is not in the graph.
    #[error("could not find target '{name}'")]
    #[diagnostic(code(mymake::build::target_not_found))]
    TargetNotFound {
        /// Requested target name.
        name: String,
    },
    /// The graph reachable from the target loops back on itself.
    #[error("cycle in dependency graph of '{target}', cannot build")]
    #[diagnostic(code(mymake::build::cycle_detected))]
    CycleDetected {
        /// Target whose dependency graph contains the cycle.
        target: String,
    },
    /// A dependency neither exists on disk nor has a recipe.
    #[error("no rule to make target '{missing}', needed by '{needed_by}'")]
    #[diagnostic(
        code(mymake::build::no_rule),
        help("create the file or add a rule that produces it")
    )]
    NoRuleForTarget {
        /// Name that could not be produced.
        missing: String,
        /// Target that depends on it.
        needed_by: String,
    },
    /// Writing progress output failed.
    #[error("failed to write build output")]
    #[diagnostic(code(mymake::build::output))]
    Output(#[from] io::Error),
}
