use crate::error::{Result, ZettelkastenError};
use crate::model::{Format, RawNote};
use crate::vfs::{DependencyTracker, FileSystem};
use std::path::{Path, PathBuf};

/// Reads note files, registering each one with the dependency tracker first.
pub struct ContentLoader<'a> {
    root: &'a Path,
    fs: &'a dyn FileSystem,
    tracker: &'a dyn DependencyTracker,
}

impl<'a> ContentLoader<'a> {
    pub fn new(root: &'a Path, fs: &'a dyn FileSystem, tracker: &'a dyn DependencyTracker) -> Self {
        Self { root, fs, tracker }
    }

    /// Load a file given relative to the notes directory.
    ///
    /// Malformed UTF-8 is replaced rather than rejected; I/O failures are fatal.
    pub fn load(&self, format: Format, path: PathBuf) -> Result<RawNote> {
        let abs_path = self.root.join(&path);
        self.tracker.need(&abs_path);

        let bytes = self
            .fs
            .read_bytes(&abs_path)
            .map_err(|e| ZettelkastenError::io(&abs_path, e))?;
        let text = String::from_utf8_lossy(&bytes).into_owned();

        Ok(RawNote { format, path, text })
    }
}
