//! Error types for the runner module.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that stop a run before any target is built.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The description file does not exist at the expected path.
    #[error("description file '{path}' not found")]
    #[diagnostic(
        code(mymake::runner::makefile_not_found),
        help("pass `-f <file>` or set MYMAKE_FILE to choose another description file")
    )]
    MakefileNotFound {
        /// The path that was attempted.
        path: Utf8PathBuf,
    },
}
