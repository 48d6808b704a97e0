use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ZettelkastenError};
use crate::graph::ZettelGraph;
use crate::model::ErrorMap;
use crate::vfs::FileSystem;

/// Sink for the finished (graph, errors) pair of a build, and the source
/// for read-only consumers in later invocations. Implementations store
/// exactly what they are given.
pub trait GraphCache: Send + Sync {
    fn store(&self, graph: &ZettelGraph, errors: &ErrorMap) -> Result<()>;
    fn retrieve(&self) -> Result<(ZettelGraph, ErrorMap)>;
}

#[derive(Serialize, Deserialize)]
struct PersistentState {
    version: u32,
    graph: ZettelGraph,
    errors: ErrorMap,
}

impl PersistentState {
    const CURRENT_VERSION: u32 = 1;
}

/// bincode snapshot on disk, `<root>/.zettel/cache.bin` by default.
pub struct FileGraphCache {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FileGraphCache {
    pub const DEFAULT_DIR: &'static str = ".zettel";
    pub const DEFAULT_FILE: &'static str = "cache.bin";

    pub fn new(path: PathBuf, fs: Arc<dyn FileSystem>) -> Self {
        Self { path, fs }
    }

    /// Cache at the default location inside a notes directory
    pub fn in_dir(root: &Path, fs: Arc<dyn FileSystem>) -> Self {
        Self::new(root.join(Self::DEFAULT_DIR).join(Self::DEFAULT_FILE), fs)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GraphCache for FileGraphCache {
    fn store(&self, graph: &ZettelGraph, errors: &ErrorMap) -> Result<()> {
        let state = PersistentState {
            version: PersistentState::CURRENT_VERSION,
            graph: graph.clone(),
            errors: errors.clone(),
        };
        let buffer = bincode::serialize(&state)?;
        self.fs
            .write_all(&self.path, &buffer)
            .map_err(|e| ZettelkastenError::io(&self.path, e))?;
        log::debug!("Cache written to {:?} ({} bytes)", self.path, buffer.len());
        Ok(())
    }

    fn retrieve(&self) -> Result<(ZettelGraph, ErrorMap)> {
        let buffer = self
            .fs
            .read_bytes(&self.path)
            .map_err(|e| ZettelkastenError::io(&self.path, e))?;
        let state: PersistentState = bincode::deserialize(&buffer)?;

        if state.version != PersistentState::CURRENT_VERSION {
            return Err(ZettelkastenError::Cache(format!(
                "Incompatible cache version {} (expected {})",
                state.version,
                PersistentState::CURRENT_VERSION
            )));
        }

        Ok((state.graph, state.errors))
    }
}

/// In-process cache; last store wins.
#[derive(Default)]
pub struct MemoryGraphCache {
    slot: Mutex<Option<(ZettelGraph, ErrorMap)>>,
}

impl MemoryGraphCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphCache for MemoryGraphCache {
    fn store(&self, graph: &ZettelGraph, errors: &ErrorMap) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| ZettelkastenError::Cache("memory cache lock poisoned".to_string()))?;
        *slot = Some((graph.clone(), errors.clone()));
        Ok(())
    }

    fn retrieve(&self) -> Result<(ZettelGraph, ErrorMap)> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| ZettelkastenError::Cache("memory cache lock poisoned".to_string()))?;
        slot.clone()
            .ok_or_else(|| ZettelkastenError::Cache("nothing has been stored yet".to_string()))
    }
}
