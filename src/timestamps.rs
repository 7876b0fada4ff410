//! Modification-time lookups for build targets.
//!
//! Times are nanoseconds since the Unix epoch. Zero means the file does not
//! exist, which makes any existing file compare as newer. Symlinks are
//! followed wherever they point.

use std::io;
use std::time::UNIX_EPOCH;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use tracing::{debug, warn};

/// Source of file modification times.
#[cfg_attr(test, mockall::automock)]
pub trait Timestamps {
    /// Modification time of `name`, or `0` when it does not exist.
    fn last_modification(&self, name: &str) -> u64;
}

/// Reads modification times from the filesystem, relative to the working
/// directory unless `name` is absolute.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskTimestamps;

impl DiskTimestamps {
    /// Create a filesystem-backed timestamp source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn parent_and_entry(path: &Utf8Path) -> (&Utf8Path, &str) {
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let entry = path.file_name().unwrap_or(".");
    (parent, entry)
}

fn modified_nanos(path: &Utf8Path) -> io::Result<u64> {
    let resolved = path.canonicalize_utf8()?;
    let (parent, entry) = parent_and_entry(&resolved);
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    let modified = dir.metadata(entry)?.modified()?.into_std();
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .map_err(io::Error::other)?;
    Ok(u64::try_from(since_epoch.as_nanos())
        .unwrap_or(u64::MAX)
        .max(1))
}

impl Timestamps for DiskTimestamps {
    fn last_modification(&self, name: &str) -> u64 {
        match modified_nanos(Utf8Path::new(name)) {
            Ok(nanos) => nanos,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(file = name, "file does not exist");
                0
            }
            Err(err) => {
                warn!(file = name, error = %err, "could not read modification time");
                0
            }
        }
    }
}

impl<T: Timestamps + ?Sized> Timestamps for &T {
    fn last_modification(&self, name: &str) -> u64 {
        (**self).last_modification(name)
    }
}
