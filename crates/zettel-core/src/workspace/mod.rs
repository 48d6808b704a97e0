use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ZettelConfig;
use crate::error::{Result, ZettelkastenError};
use crate::graph::ZettelGraph;
use crate::model::{ErrorMap, Format, Zettel, ZettelId};
use crate::vfs::{DependencyTracker, FileSystem};

mod assembler;
mod builder;
mod engine;
mod extractor;
mod indexer;
mod loader;

#[cfg(test)]
mod cache_tests;

pub use assembler::{compute_digest, NoteAssembler};
pub use builder::{BuiltGraph, GraphBuilder};
pub use engine::{BuildReport, SiteEngine};
pub use extractor::{Extraction, GraphContext, LinkExtractor, QueryExtractor};
pub use indexer::{Indexer, IndexingStats, Resolution, ResolvedFiles};
pub use loader::ContentLoader;

/// A notes directory together with the I/O it is read through.
pub struct Workspace {
    pub(crate) root: PathBuf,
    pub(crate) config: ZettelConfig,
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) tracker: Arc<dyn DependencyTracker>,
}

/// Everything one build derives from the notes directory
#[derive(Debug, Clone)]
pub struct Zettelkasten {
    pub graph: ZettelGraph,
    /// Ambiguity, parse and query errors, at most one per identifier
    pub errors: ErrorMap,
    pub stats: IndexingStats,
}

impl Zettelkasten {
    /// Successfully parsed notes, in the graph's canonical order
    pub fn contents(&self) -> Vec<&Zettel> {
        self.graph.zettels().collect()
    }
}

impl Workspace {
    pub fn new(
        root: PathBuf,
        config: ZettelConfig,
        fs: Arc<dyn FileSystem>,
        tracker: Arc<dyn DependencyTracker>,
    ) -> Self {
        Self {
            root,
            config,
            fs,
            tracker,
        }
    }

    /// Open a notes directory, reading its `zettel.yaml` if present.
    pub fn open(
        root: PathBuf,
        fs: Arc<dyn FileSystem>,
        tracker: Arc<dyn DependencyTracker>,
    ) -> Result<Self> {
        let config = ZettelConfig::load(&root, &*fs)?;
        Ok(Self::new(root, config, fs, tracker))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ZettelConfig {
        &self.config
    }

    /// Note files in processing order: configured format order first,
    /// then discovery order within each format. Paths are relative to the root.
    pub fn discover(&self) -> Result<Vec<(Format, PathBuf)>> {
        let mut files = Vec::new();
        for format in self.config.enabled_formats() {
            let listed = self
                .fs
                .list_files(&self.root, format.extension(), self.config.recurse_dir)
                .map_err(|e| ZettelkastenError::io(&self.root, e))?;
            for abs_path in listed {
                let rel_path = abs_path
                    .strip_prefix(&self.root)
                    .map(Path::to_path_buf)
                    .unwrap_or(abs_path);
                files.push((format, rel_path));
            }
        }
        Ok(files)
    }

    /// Scan, deduplicate and build the graph.
    pub fn load_zettelkasten(&self, extractor: &dyn QueryExtractor) -> Result<Zettelkasten> {
        let files = self.discover()?;
        log::debug!("Discovered {} candidate file(s) in {:?}", files.len(), self.root);

        let loader = ContentLoader::new(&self.root, &*self.fs, &*self.tracker);
        let (resolved, stats) = Indexer::new(loader).resolve_all(files)?;

        let claimed: BTreeSet<ZettelId> = resolved
            .files
            .keys()
            .chain(resolved.dups.keys())
            .cloned()
            .collect();

        let built = GraphBuilder::new(extractor).build(resolved.files, &claimed);

        let mut errors = resolved.dups;
        errors.extend(built.errors);

        log::info!(
            "Loaded {} zettel(s) from {} file(s); {} with errors",
            built.graph.len(),
            stats.total_files,
            errors.len()
        );

        Ok(Zettelkasten {
            graph: built.graph,
            errors,
            stats,
        })
    }
}
