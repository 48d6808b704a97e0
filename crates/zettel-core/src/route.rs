use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::graph::ZettelGraph;
use crate::model::{Connection, ErrorMap, Zettel, ZettelId};

/// A logical output of the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Zettel(ZettelId),
    Index,
    Search,
    Redirect { from: ZettelId, to: ZettelId },
}

/// Identifiers whose output path is taken by a built-in page
pub const RESERVED_IDS: [&str; 2] = ["index", "search"];

pub fn is_reserved_id(id: &ZettelId) -> bool {
    RESERVED_IDS.contains(&id.as_str())
}

impl Route {
    /// Output path relative to the output directory
    pub fn output_path(&self) -> PathBuf {
        match self {
            Route::Zettel(id) => PathBuf::from(format!("{}.html", id)),
            Route::Index => PathBuf::from("index.html"),
            Route::Search => PathBuf::from("search.html"),
            Route::Redirect { from, .. } => PathBuf::from(format!("{}.html", from)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub id: ZettelId,
    pub title: String,
    pub connection: Connection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub id: ZettelId,
    pub title: String,
    pub tags: Vec<String>,
    pub date: Option<String>,
}

impl From<&Zettel> for SearchEntry {
    fn from(zettel: &Zettel) -> Self {
        Self {
            id: zettel.id.clone(),
            title: zettel.title.clone(),
            tags: zettel.tags.clone(),
            date: zettel.date.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZettelPage {
    pub zettel: Zettel,
    pub outgoing: Vec<LinkEntry>,
    pub backlinks: Vec<LinkEntry>,
    /// Query-result errors of this zettel, if any
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPage {
    pub site_title: String,
    pub zettels: Vec<SearchEntry>,
    pub error_count: usize,
}

/// Data handed to a [`RouteWriter`] for one route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutePayload {
    Zettel(ZettelPage),
    Index(IndexPage),
    Search(Vec<SearchEntry>),
    Redirect { target: ZettelId },
}

impl RoutePayload {
    pub fn zettel_page(graph: &ZettelGraph, errors: &ErrorMap, zettel: &Zettel) -> Self {
        let entry = |(id, connection): (&ZettelId, Connection)| {
            graph.get_zettel(id).map(|target| LinkEntry {
                id: id.clone(),
                title: target.title.clone(),
                connection,
            })
        };
        RoutePayload::Zettel(ZettelPage {
            zettel: zettel.clone(),
            outgoing: graph.outgoing(&zettel.id).into_iter().filter_map(entry).collect(),
            backlinks: graph.backlinks(&zettel.id).into_iter().filter_map(entry).collect(),
            errors: errors
                .get(&zettel.id)
                .map(|e| e.messages())
                .unwrap_or_default(),
        })
    }

    pub fn index(site_title: &str, graph: &ZettelGraph, errors: &ErrorMap) -> Self {
        RoutePayload::Index(IndexPage {
            site_title: site_title.to_string(),
            zettels: graph.zettels().map(SearchEntry::from).collect(),
            error_count: errors.len(),
        })
    }

    pub fn search(graph: &ZettelGraph) -> Self {
        RoutePayload::Search(graph.zettels().map(SearchEntry::from).collect())
    }
}

/// Emits one logical output. The physical format is up to the implementation.
pub trait RouteWriter {
    fn write_route(&mut self, route: &Route, payload: &RoutePayload) -> Result<()>;
}

/// Keeps every written route in memory, in write order.
#[derive(Debug, Default)]
pub struct MemoryRouteWriter {
    pub routes: Vec<(Route, RoutePayload)>,
}

impl MemoryRouteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, route: &Route) -> Option<&RoutePayload> {
        self.routes
            .iter()
            .find(|(r, _)| r == route)
            .map(|(_, payload)| payload)
    }
}

impl RouteWriter for MemoryRouteWriter {
    fn write_route(&mut self, route: &Route, payload: &RoutePayload) -> Result<()> {
        self.routes.push((route.clone(), payload.clone()));
        Ok(())
    }
}
