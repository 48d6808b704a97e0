use super::assembler::NoteAssembler;
use super::extractor::{GraphContext, QueryExtractor};
use crate::graph::ZettelGraph;
use crate::model::{ErrorMap, Format, RawNote, Zettel, ZettelError, ZettelId};
use crate::reader::reader_for;
use crate::route::is_reserved_id;
use std::collections::{BTreeMap, BTreeSet};

/// Graph plus the parse/query errors found while building it
#[derive(Debug, Clone, Default)]
pub struct BuiltGraph {
    pub graph: ZettelGraph,
    /// Disjoint from ambiguity errors: only unique files reach the builder.
    pub errors: ErrorMap,
}

/// Parses deduplicated notes and wires their queries into a [`ZettelGraph`].
pub struct GraphBuilder<'a> {
    extractor: &'a dyn QueryExtractor,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(extractor: &'a dyn QueryExtractor) -> Self {
        Self { extractor }
    }

    /// * `files` - identifiers claimed by exactly one file, with that file's content
    /// * `claimed` - every identifier some file claims, including ambiguous ones
    pub fn build(
        &self,
        files: BTreeMap<ZettelId, RawNote>,
        claimed: &BTreeSet<ZettelId>,
    ) -> BuiltGraph {
        let mut batches: BTreeMap<Format, Vec<(ZettelId, RawNote)>> = BTreeMap::new();
        let mut zettels: BTreeMap<ZettelId, Zettel> = BTreeMap::new();
        let mut errors = ErrorMap::new();

        for (id, note) in files {
            if is_reserved_id(&id) {
                log::warn!("{:?} claims reserved identifier '{}'", note.path, id);
                errors.insert(id.clone(), ZettelError::ReservedIdentifier(id));
                continue;
            }
            batches.entry(note.format).or_default().push((id, note));
        }

        for (format, batch) in batches {
            let reader = reader_for(format);
            log::debug!("Parsing {} {} note(s)", batch.len(), format);
            for (id, note) in batch {
                match reader.parse(&note.text) {
                    Ok(parsed) => {
                        let zettel = NoteAssembler::assemble(id.clone(), &note, parsed);
                        zettels.insert(id, zettel);
                    }
                    Err(msg) => {
                        log::debug!("Parse error in {:?}: {}", note.path, msg);
                        errors.insert(id, ZettelError::ParseError(msg));
                    }
                }
            }
        }

        let mut links = Vec::new();
        {
            let ctx = GraphContext::new(claimed, &zettels);
            for zettel in zettels.values() {
                let extraction = self.extractor.extract(zettel, &ctx);
                links.extend(
                    extraction
                        .links
                        .into_iter()
                        .map(|(target, connection)| (zettel.id.clone(), target, connection)),
                );
                if !extraction.errors.is_empty() {
                    errors.insert(
                        zettel.id.clone(),
                        ZettelError::QueryResultErrors(extraction.errors),
                    );
                }
            }
        }

        BuiltGraph {
            graph: ZettelGraph::from_parts(zettels.into_values().collect(), links),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connection, QueryResultError};
    use crate::workspace::extractor::LinkExtractor;
    use std::path::PathBuf;

    fn raw(format: Format, path: &str, text: &str) -> RawNote {
        RawNote {
            format,
            path: PathBuf::from(path),
            text: text.to_string(),
        }
    }

    fn id(s: &str) -> ZettelId {
        ZettelId::new(s)
    }

    #[test]
    fn test_build_mixed_formats() {
        let mut files = BTreeMap::new();
        files.insert(id("a"), raw(Format::Markdown, "a.md", "# A\n\n[[[b]]] [[missing]]"));
        files.insert(id("b"), raw(Format::Org, "b.org", "#+TITLE: B\n[[a]]"));
        files.insert(id("c"), raw(Format::Markdown, "c.md", "---\ntags: [oops\n---\n"));
        let claimed: BTreeSet<ZettelId> = files.keys().cloned().collect();

        let built = GraphBuilder::new(&LinkExtractor).build(files, &claimed);

        assert_eq!(built.graph.len(), 2);
        assert_eq!(built.graph.get_zettel(&id("a")).unwrap().title, "A");
        assert_eq!(built.graph.get_zettel(&id("b")).unwrap().title, "B");
        assert_eq!(built.graph.connection(&id("a"), &id("b")), Some(Connection::Folgezettel));
        assert_eq!(
            built.graph.connection(&id("b"), &id("a")),
            Some(Connection::OrdinaryConnection)
        );

        assert_eq!(
            built.errors[&id("a")],
            ZettelError::QueryResultErrors(vec![QueryResultError::NoSuchZettel(id("missing"))])
        );
        assert!(matches!(built.errors[&id("c")], ZettelError::ParseError(_)));
        assert!(!built.graph.contains(&id("c")));
    }

    #[test]
    fn test_reserved_identifier_is_not_parsed() {
        let mut files = BTreeMap::new();
        files.insert(id("index"), raw(Format::Markdown, "index.md", "# Home"));
        files.insert(id("a"), raw(Format::Markdown, "a.md", "[[index]]"));
        let claimed: BTreeSet<ZettelId> = files.keys().cloned().collect();

        let built = GraphBuilder::new(&LinkExtractor).build(files, &claimed);

        assert!(!built.graph.contains(&id("index")));
        assert_eq!(
            built.errors[&id("index")],
            ZettelError::ReservedIdentifier(id("index"))
        );
        assert!(!built.errors.contains_key(&id("a")));
    }

    #[test]
    fn test_link_to_parse_failure_adds_no_error() {
        let mut files = BTreeMap::new();
        files.insert(id("a"), raw(Format::Markdown, "a.md", "[[broken]]"));
        files.insert(id("broken"), raw(Format::Org, "broken.org", "#+begin_src\nnever closed"));
        let claimed: BTreeSet<ZettelId> = files.keys().cloned().collect();

        let built = GraphBuilder::new(&LinkExtractor).build(files, &claimed);

        assert_eq!(built.errors.len(), 1);
        assert!(matches!(built.errors[&id("broken")], ZettelError::ParseError(_)));
        assert_eq!(built.graph.edge_count(), 0);
    }
}
