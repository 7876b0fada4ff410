//! Scratch directories for end-to-end builds.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir, fs_utf8::OpenOptions};
use mymake_env::DEFAULT_MAKEFILE;
use tempfile::TempDir;

/// A temporary directory holding a description file and its inputs.
///
/// The directory is removed when the workspace is dropped.
#[derive(Debug)]
pub struct Workspace {
    _temp: TempDir,
    root: Utf8PathBuf,
    dir: Dir,
}

impl Workspace {
    /// Create an empty workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its path is
    /// not valid UTF-8.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("create temp dir")?;
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("non-UTF-8 temp dir: {}", path.display()))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .with_context(|| format!("open {root}"))?;
        Ok(Self {
            _temp: temp,
            root,
            dir,
        })
    }

    /// Absolute path of the workspace.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `name` inside the workspace.
    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Write `contents` to `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, name: &str, contents: &str) -> Result<()> {
        self.dir
            .write(name, contents)
            .with_context(|| format!("write {name}"))
    }

    /// Write the default description file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_makefile(&self, contents: &str) -> Result<()> {
        self.write(DEFAULT_MAKEFILE, contents)
    }

    /// Create `name` (if needed) and set its modification time to `secs`
    /// seconds after the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or its time set.
    pub fn touch_at(&self, name: &str, secs: u64) -> Result<()> {
        let file = self
            .dir
            .open_with(name, OpenOptions::new().create(true).write(true))
            .with_context(|| format!("open {name}"))?;
        file.into_std()
            .set_modified(at(secs))
            .with_context(|| format!("set mtime of {name}"))
    }

    /// Whether `name` exists in the workspace.
    pub fn exists(&self, name: &str) -> bool {
        self.dir.exists(name)
    }

    /// Read `name` as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self, name: &str) -> Result<String> {
        self.dir
            .read_to_string(name)
            .with_context(|| format!("read {name}"))
    }
}

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}
