#![forbid(unsafe_code)]

//! Shared environment constants used across mymake crates (library, tests, and
//! helpers).

/// Environment variable naming the description file read when `-f` is absent.
///
/// # Examples
///
/// ```
/// use mymake_env::MYMAKE_FILE_ENV;
/// assert_eq!(MYMAKE_FILE_ENV, "MYMAKE_FILE");
/// ```
pub const MYMAKE_FILE_ENV: &str = "MYMAKE_FILE";

/// Environment variable override for the shell that runs recipe lines.
///
/// # Examples
///
/// ```
/// use mymake_env::MYMAKE_SHELL_ENV;
/// // SAFETY: doctests run single-threaded with respect to this variable.
/// unsafe { std::env::set_var(MYMAKE_SHELL_ENV, "/bin/bash") };
/// assert_eq!(
///     std::env::var(MYMAKE_SHELL_ENV).expect("MYMAKE_SHELL should be set"),
///     "/bin/bash",
/// );
/// unsafe { std::env::remove_var(MYMAKE_SHELL_ENV) };
/// ```
pub const MYMAKE_SHELL_ENV: &str = "MYMAKE_SHELL";

/// Description file used when neither `-f` nor [`MYMAKE_FILE_ENV`] names one.
pub const DEFAULT_MAKEFILE: &str = "Makefile.mymake";
