use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

/// Abstract interface for file system operations.
pub trait FileSystem: Send + Sync {
    /// Read the entire contents of a file as raw bytes.
    fn read_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>>;

    /// Write a whole file, creating parent directories as needed.
    fn write_all(&self, path: &Path, data: &[u8]) -> std::io::Result<()>;

    /// List all files with the given extension under the root directory,
    /// descending into subdirectories only when `recursive` is set.
    /// Results are in a stable, name-sorted discovery order. Any entry that
    /// cannot be walked fails the whole listing.
    fn list_files(
        &self,
        root: &Path,
        extension: &str,
        recursive: bool,
    ) -> std::io::Result<Vec<PathBuf>>;
}

/// Standard implementation of FileSystem using std::fs and walkdir.
pub struct PhysicalFileSystem;

impl FileSystem for PhysicalFileSystem {
    fn read_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_all(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)
    }

    fn list_files(
        &self,
        root: &Path,
        extension: &str,
        recursive: bool,
    ) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let mut walker = WalkDir::new(root).follow_links(true).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext == extension {
                        files.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(files)
    }
}

/// Build-system hook notified of every file the pipeline reads,
/// so an outer incremental layer can invalidate on change.
pub trait DependencyTracker: Send + Sync {
    fn need(&self, path: &Path);
}

/// Tracker that ignores all dependencies.
pub struct NullTracker;

impl DependencyTracker for NullTracker {
    fn need(&self, _path: &Path) {}
}

/// Tracker that remembers every path it was asked to track, in call order.
#[derive(Default)]
pub struct RecordingTracker {
    needed: Mutex<Vec<PathBuf>>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn needed(&self) -> Vec<PathBuf> {
        match self.needed.lock() {
            Ok(needed) => needed.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DependencyTracker for RecordingTracker {
    fn need(&self, path: &Path) {
        match self.needed.lock() {
            Ok(mut needed) => needed.push(path.to_path_buf()),
            Err(poisoned) => poisoned.into_inner().push(path.to_path_buf()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_flat_and_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("b.md"), "b").unwrap();
        fs::write(root.join("a.md"), "a").unwrap();
        fs::write(root.join("c.org"), "c").unwrap();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("d.md"), "d").unwrap();

        let fs_impl = PhysicalFileSystem;
        let flat = fs_impl.list_files(root, "md", false).unwrap();
        assert_eq!(flat, vec![root.join("a.md"), root.join("b.md")]);

        let deep = fs_impl.list_files(root, "md", true).unwrap();
        assert_eq!(
            deep,
            vec![root.join("a.md"), root.join("b.md"), root.join("sub").join("d.md")]
        );
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = PhysicalFileSystem
            .list_files(&temp_dir.path().join("absent"), "md", true)
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_fails_recursive_listing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.md"), "a").unwrap();
        fs::create_dir_all(root.join("sub")).unwrap();
        std::os::unix::fs::symlink(root, root.join("sub").join("back")).unwrap();

        assert!(PhysicalFileSystem.list_files(root, "md", true).is_err());
        // The loop sits below the flat scan's depth.
        assert_eq!(
            PhysicalFileSystem.list_files(root, "md", false).unwrap(),
            vec![root.join("a.md")]
        );
    }

    #[test]
    fn test_recording_tracker_keeps_order() {
        let tracker = RecordingTracker::new();
        tracker.need(Path::new("/x/2.md"));
        tracker.need(Path::new("/x/1.md"));
        assert_eq!(
            tracker.needed(),
            vec![PathBuf::from("/x/2.md"), PathBuf::from("/x/1.md")]
        );
    }
}
