use crate::model::{Connection, QueryResultError, Zettel, ZettelId, ZettelQuery};
use crate::reader::tag_matches;
use std::collections::{BTreeMap, BTreeSet};

/// What the extractor may look up while resolving a zettel's queries.
pub struct GraphContext<'a> {
    claimed: &'a BTreeSet<ZettelId>,
    zettels: &'a BTreeMap<ZettelId, Zettel>,
}

impl<'a> GraphContext<'a> {
    pub fn new(claimed: &'a BTreeSet<ZettelId>, zettels: &'a BTreeMap<ZettelId, Zettel>) -> Self {
        Self { claimed, zettels }
    }

    /// A parsed zettel that will be a graph node
    pub fn zettel(&self, id: &ZettelId) -> Option<&'a Zettel> {
        self.zettels.get(id)
    }

    /// Some file claims this identifier, whether or not it made it into the graph.
    pub fn is_claimed(&self, id: &ZettelId) -> bool {
        self.claimed.contains(id) || self.zettels.contains_key(id)
    }

    /// Zettels with a tag matching `pattern`, in identifier order
    pub fn zettels_tagged(&self, pattern: &str) -> Vec<&'a Zettel> {
        self.zettels
            .values()
            .filter(|z| z.tags.iter().any(|tag| tag_matches(pattern, tag)))
            .collect()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub links: Vec<(ZettelId, Connection)>,
    pub errors: Vec<QueryResultError>,
}

/// Turns a zettel's queries into graph edges and query-result errors.
pub trait QueryExtractor: Send + Sync {
    fn extract(&self, zettel: &Zettel, ctx: &GraphContext<'_>) -> Extraction;
}

/// Default extractor for `[[id]]`, `[[[id]]]` and `z:zettels` queries.
pub struct LinkExtractor;

impl QueryExtractor for LinkExtractor {
    fn extract(&self, zettel: &Zettel, ctx: &GraphContext<'_>) -> Extraction {
        let mut out = Extraction::default();

        for query in &zettel.queries {
            match query {
                ZettelQuery::Zettel(target, connection) => {
                    if ctx.zettel(target).is_some() {
                        out.links.push((target.clone(), *connection));
                    } else if !ctx.is_claimed(target) {
                        out.errors.push(QueryResultError::NoSuchZettel(target.clone()));
                    }
                    // Claimed but unparsed or ambiguous targets already carry their own error.
                }
                ZettelQuery::Zettels { tag, connection } => {
                    out.links.extend(
                        ctx.zettels_tagged(tag)
                            .into_iter()
                            .filter(|z| z.id != zettel.id)
                            .map(|z| (z.id.clone(), *connection)),
                    );
                }
                ZettelQuery::Invalid(uri) => {
                    out.errors.push(QueryResultError::InvalidQuery(uri.clone()));
                }
            }
        }

        out
    }
}
