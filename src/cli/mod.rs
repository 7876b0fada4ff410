//! Command line interface definition using clap.
//!
//! `-h` does not print help: it echoes the invocation and the run carries on.
//! Arguments pass through [`normalise_args`] before clap sees them so
//! that `-f` followed by another flag falls back to the default description
//! file.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};
use mymake_env::{DEFAULT_MAKEFILE, MYMAKE_FILE_ENV};

use crate::build::BuildOptions;

mod parsing;

pub use parsing::normalise_args;

/// A minimal make: rebuild targets whose dependencies changed.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "mymake", author, version, about, long_about = None, disable_help_flag = true)]
pub struct Cli {
    /// Description file to read.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = MYMAKE_FILE_ENV,
        default_value = DEFAULT_MAKEFILE
    )]
    pub file: Utf8PathBuf,

    /// Report every target considered and log decisions.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print recipes instead of running them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Echo the invocation before building.
    #[arg(short = 'h', action = ArgAction::SetTrue)]
    pub echo: bool,

    /// Targets to build; the first rule's target when omitted.
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Arguments as given on the command line, program name included.
    #[arg(skip)]
    pub invocation: Vec<String>,
}

impl Cli {
    /// Build options selected by the flags.
    #[must_use]
    pub const fn build_options(&self) -> BuildOptions {
        BuildOptions {
            verbose: self.verbose,
            dry_run: self.dry_run,
        }
    }

    /// The line printed for `-h`.
    #[must_use]
    pub fn echo_line(&self) -> String {
        let mut line = String::from("mymake");
        for arg in &self.invocation {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            file: Utf8PathBuf::from(DEFAULT_MAKEFILE),
            verbose: false,
            dry_run: false,
            echo: false,
            targets: Vec::new(),
            invocation: Vec::new(),
        }
    }
}

/// Parse `args` (program name first) into a [`Cli`].
///
/// # Errors
///
/// Returns a `clap::Error` for unknown flags or a missing `-f` value.
///
/// # Examples
///
/// ```
/// use mymake::cli::parse_from;
///
/// let cli = parse_from(["mymake", "-f", "-n", "app"]).expect("parse");
/// assert!(cli.dry_run);
/// assert_eq!(cli.targets, vec!["app"]);
/// ```
pub fn parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let invocation: Vec<String> = args
        .into_iter()
        .map(|arg| arg.into().to_string_lossy().into_owned())
        .collect();
    let mut cli = Cli::try_parse_from(normalise_args(&invocation))?;
    cli.invocation = invocation;
    Ok(cli)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, reason = "parser tests use expect for clearer failures")]
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_when_no_flags_given() {
        let cli = parse_from(["mymake"]).expect("parse");
        assert!(!cli.verbose && !cli.dry_run && !cli.echo);
        assert!(cli.targets.is_empty());
        assert_eq!(cli.build_options(), BuildOptions::default());
    }

    #[rstest]
    fn flags_and_targets_are_collected() {
        let cli = parse_from(["mymake", "-v", "-n", "-f", "rules.mk", "app", "clean"]).expect("parse");
        assert_eq!(cli.file, Utf8PathBuf::from("rules.mk"));
        assert_eq!(
            cli.build_options(),
            BuildOptions {
                verbose: true,
                dry_run: true
            }
        );
        assert_eq!(cli.targets, vec!["app", "clean"]);
    }

    #[rstest]
    fn echo_line_repeats_the_invocation() {
        let cli = parse_from(["mymake", "-h", "app"]).expect("parse");
        assert!(cli.echo);
        assert_eq!(cli.echo_line(), "mymake mymake -h app");
    }

    #[rstest]
    fn unknown_flag_after_f_is_ignored() {
        let cli = parse_from(["mymake", "-f", "-x", "-n", "app"]).expect("parse");
        assert_eq!(cli.file, Utf8PathBuf::from(DEFAULT_MAKEFILE));
        assert!(cli.dry_run);
        assert_eq!(cli.targets, vec!["app"]);
    }

    #[rstest]
    fn unknown_flag_is_rejected() {
        assert!(parse_from(["mymake", "-x"]).is_err());
    }
}
