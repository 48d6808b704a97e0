use crate::model::{Connection, Zettel, ZettelId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Directed link graph over zettels.
///
/// Built in one go by [`crate::workspace::GraphBuilder`]; there is no API to
/// add or remove single nodes from outside the crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZettelGraph {
    pub(crate) zettels: BTreeMap<ZettelId, Zettel>,
    pub(crate) edges: BTreeMap<ZettelId, BTreeMap<ZettelId, Connection>>,
}

impl ZettelGraph {
    pub(crate) fn from_parts(
        zettels: Vec<Zettel>,
        links: Vec<(ZettelId, ZettelId, Connection)>,
    ) -> Self {
        let mut graph = Self {
            zettels: zettels.into_iter().map(|z| (z.id.clone(), z)).collect(),
            edges: BTreeMap::new(),
        };
        for (source, target, connection) in links {
            graph.connect(source, target, connection);
        }
        graph
    }

    /// Both endpoints must already be nodes; self-links are dropped.
    fn connect(&mut self, source: ZettelId, target: ZettelId, connection: Connection) {
        if source == target
            || !self.zettels.contains_key(&source)
            || !self.zettels.contains_key(&target)
        {
            return;
        }
        self.edges
            .entry(source)
            .or_default()
            .entry(target)
            .and_modify(|existing| *existing = existing.merge(connection))
            .or_insert(connection);
    }

    pub fn get_zettel(&self, id: &ZettelId) -> Option<&Zettel> {
        self.zettels.get(id)
    }

    pub fn contains(&self, id: &ZettelId) -> bool {
        self.zettels.contains_key(id)
    }

    /// All zettels in canonical (identifier) order
    pub fn zettels(&self) -> impl Iterator<Item = &Zettel> {
        self.zettels.values()
    }

    pub fn len(&self) -> usize {
        self.zettels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zettels.is_empty()
    }

    pub fn connection(&self, source: &ZettelId, target: &ZettelId) -> Option<Connection> {
        self.edges.get(source)?.get(target).copied()
    }

    /// Outgoing links of a zettel
    pub fn outgoing(&self, id: &ZettelId) -> Vec<(&ZettelId, Connection)> {
        self.edges
            .get(id)
            .map(|targets| targets.iter().map(|(t, c)| (t, *c)).collect())
            .unwrap_or_default()
    }

    /// Get backlinks (incoming edges)
    pub fn backlinks(&self, id: &ZettelId) -> Vec<(&ZettelId, Connection)> {
        self.edges
            .iter()
            .filter_map(|(source, targets)| targets.get(id).map(|c| (source, *c)))
            .collect()
    }

    /// Number of directed edges
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }
}
