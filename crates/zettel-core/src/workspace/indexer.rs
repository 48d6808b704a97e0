use super::loader::ContentLoader;
use crate::error::Result;
use crate::identity::resolve_zettel_id;
use crate::model::{ErrorMap, Format, RawNote, ZettelError, ZettelId};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// What the files seen so far say about one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Only one file claims the identifier; its content is loaded.
    Unique(RawNote),
    /// Two or more files claim it, in discovery order. No content is kept.
    Ambiguous(Vec<PathBuf>),
}

impl Resolution {
    /// Another file claims the same identifier.
    /// A unique entry drops its content and can never become unique again.
    fn with_claimant(self, path: PathBuf) -> Resolution {
        match self {
            Resolution::Unique(note) => Resolution::Ambiguous(vec![note.path, path]),
            Resolution::Ambiguous(mut paths) => {
                paths.push(path);
                Resolution::Ambiguous(paths)
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexingStats {
    pub total_files: usize,
    /// Files whose path is not a valid identifier for their format
    pub unresolved: usize,
    pub loaded: usize,
    /// Claimants beyond the first for ambiguous identifiers
    pub duplicates: usize,
}

/// Output of the deduplication fold
#[derive(Debug, Default, Clone)]
pub struct ResolvedFiles {
    /// Identifiers claimed by exactly one file
    pub files: BTreeMap<ZettelId, RawNote>,
    /// Ambiguity errors for identifiers claimed by several files
    pub dups: ErrorMap,
}

/// Folds discovered files, in order, into one [`Resolution`] per identifier.
pub struct Indexer<'a> {
    loader: ContentLoader<'a>,
    stats: IndexingStats,
}

impl<'a> Indexer<'a> {
    pub fn new(loader: ContentLoader<'a>) -> Self {
        Self {
            loader,
            stats: IndexingStats::default(),
        }
    }

    /// Resolve every file. Order matters: the first claimant of an identifier
    /// is the one whose content gets loaded.
    pub fn resolve_all<I>(mut self, files: I) -> Result<(ResolvedFiles, IndexingStats)>
    where
        I: IntoIterator<Item = (Format, PathBuf)>,
    {
        let table = files
            .into_iter()
            .try_fold(BTreeMap::new(), |table, (format, path)| {
                self.step(table, format, path)
            })?;

        let mut resolved = ResolvedFiles::default();
        for (id, resolution) in table {
            match resolution {
                Resolution::Unique(note) => {
                    resolved.files.insert(id, note);
                }
                Resolution::Ambiguous(paths) => {
                    resolved.dups.insert(id, ZettelError::AmbiguousFiles(paths));
                }
            }
        }

        Ok((resolved, self.stats))
    }

    fn step(
        &mut self,
        mut table: BTreeMap<ZettelId, Resolution>,
        format: Format,
        path: PathBuf,
    ) -> Result<BTreeMap<ZettelId, Resolution>> {
        self.stats.total_files += 1;

        let Some(id) = resolve_zettel_id(format, &path) else {
            log::debug!("Skipping {:?}: not a valid {} zettel path", path, format);
            self.stats.unresolved += 1;
            return Ok(table);
        };

        let next = match table.remove(&id) {
            None => {
                let note = self.loader.load(format, path)?;
                self.stats.loaded += 1;
                Resolution::Unique(note)
            }
            Some(existing) => {
                log::warn!("Identifier '{}' is also claimed by {:?}", id, path);
                self.stats.duplicates += 1;
                existing.with_claimant(path)
            }
        };
        table.insert(id, next);
        Ok(table)
    }
}
