//! Test utilities shared by the mymake integration tests.
//!
//! Provides scripted collaborators for driving the build engine without a
//! filesystem or a shell, scratch workspaces with controllable modification
//! times, and a wrapper around the compiled `mymake` binary.

pub mod clock;
pub mod command;
pub mod recorder;
pub mod workspace;

pub use clock::ScriptedClock;
pub use recorder::{RecordedRun, RecordingExecutor};
pub use workspace::Workspace;

/// Convert string literals into owned recipe or target lines.
pub fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
