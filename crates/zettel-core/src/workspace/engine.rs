use super::{IndexingStats, LinkExtractor, QueryExtractor, Workspace, Zettelkasten};
use crate::cache::GraphCache;
use crate::config::RUNNING_VERSION;
use crate::error::Result;
use crate::graph::ZettelGraph;
use crate::identity::is_valid_id;
use crate::model::{ErrorMap, ZettelId};
use crate::report::report_errors;
use crate::route::{is_reserved_id, Route, RoutePayload, RouteWriter};
use std::io::Write;
use std::sync::Arc;

/// Summary of one site build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub stats: IndexingStats,
    pub zettels: usize,
    pub errors: usize,
    pub routes_written: usize,
    pub redirects: usize,
}

/// The SiteEngine drives a full build of a zettelkasten.
///
/// Order of a build:
/// 1. version gate (fatal, before any output)
/// 2. scan, deduplicate, parse and link ([`Workspace::load_zettelkasten`])
/// 3. hand the (graph, errors) snapshot to the cache
/// 4. emit one route per zettel, then index, search and alias redirects
/// 5. report per-zettel errors to the operator
pub struct SiteEngine {
    pub workspace: Workspace,
    cache: Arc<dyn GraphCache>,
    extractor: Box<dyn QueryExtractor>,
    running_version: String,
}

impl SiteEngine {
    pub fn new(workspace: Workspace, cache: Arc<dyn GraphCache>) -> Self {
        Self {
            workspace,
            cache,
            extractor: Box::new(LinkExtractor),
            running_version: RUNNING_VERSION.to_string(),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn QueryExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Override the version checked against `min_version`
    pub fn with_running_version(mut self, version: impl Into<String>) -> Self {
        self.running_version = version.into();
        self
    }

    pub fn build(
        &self,
        writer: &mut dyn RouteWriter,
        operator: &mut dyn Write,
    ) -> Result<BuildReport> {
        self.workspace.config.check_version(&self.running_version)?;

        let kasten = self.workspace.load_zettelkasten(&*self.extractor)?;
        self.cache.store(&kasten.graph, &kasten.errors)?;

        let mut report = BuildReport {
            stats: kasten.stats.clone(),
            zettels: kasten.graph.len(),
            errors: kasten.errors.len(),
            ..Default::default()
        };

        report.routes_written += self.write_routes(&kasten, writer)?;

        for (from, to) in self.resolve_aliases(&kasten.graph, &kasten.errors) {
            let payload = RoutePayload::Redirect { target: to.clone() };
            writer.write_route(&Route::Redirect { from, to }, &payload)?;
            report.routes_written += 1;
            report.redirects += 1;
        }

        report_errors(&kasten.errors, operator);

        log::info!(
            "Build finished: {} zettel(s), {} route(s), {} error(s)",
            report.zettels,
            report.routes_written,
            report.errors
        );
        Ok(report)
    }

    /// Read-only access to the snapshot stored by the last build
    pub fn load_graph(&self) -> Result<(ZettelGraph, ErrorMap)> {
        self.cache.retrieve()
    }

    fn write_routes(&self, kasten: &Zettelkasten, writer: &mut dyn RouteWriter) -> Result<usize> {
        let mut written = 0;
        for zettel in kasten.graph.zettels() {
            let payload = RoutePayload::zettel_page(&kasten.graph, &kasten.errors, zettel);
            writer.write_route(&Route::Zettel(zettel.id.clone()), &payload)?;
            written += 1;
        }

        let index = RoutePayload::index(
            &self.workspace.config.site_title,
            &kasten.graph,
            &kasten.errors,
        );
        writer.write_route(&Route::Index, &index)?;
        writer.write_route(&Route::Search, &RoutePayload::search(&kasten.graph))?;
        Ok(written + 2)
    }

    /// Aliases that can be materialised: the source slot must be free (not a
    /// zettel, an erroring identifier or a built-in page) and the target must
    /// be a zettel in the graph.
    fn resolve_aliases(&self, graph: &ZettelGraph, errors: &ErrorMap) -> Vec<(ZettelId, ZettelId)> {
        let mut out = Vec::new();
        for (from, to) in &self.workspace.config.aliases {
            if !is_valid_id(from) {
                log::warn!("Alias '{}' is not a valid identifier; skipped", from);
                continue;
            }
            let from = ZettelId::new(from.as_str());
            let to = ZettelId::new(to.as_str());
            if graph.contains(&from) || errors.contains_key(&from) || is_reserved_id(&from) {
                log::warn!("Alias '{}' collides with an existing zettel; skipped", from);
                continue;
            }
            if !graph.contains(&to) {
                log::warn!("Alias '{}' points to missing zettel '{}'; skipped", from, to);
                continue;
            }
            out.push((from, to));
        }
        out
    }
}
