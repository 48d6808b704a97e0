//! Zettel Core Library
//!
//! Builds a link graph out of a directory of Markdown and Org notes.
//! File access goes through [`vfs::FileSystem`] so the whole pipeline
//! can run against an in-memory tree in tests.
//!

pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod identity;
pub mod model;
pub mod reader;
pub mod report;
pub mod route;
pub mod vfs;
pub mod workspace;

pub use cache::{FileGraphCache, GraphCache, MemoryGraphCache};
pub use config::ZettelConfig;
pub use error::{Result, ZettelkastenError};
pub use graph::ZettelGraph;
pub use identity::resolve_zettel_id;
pub use model::{Connection, ErrorMap, Format, Zettel, ZettelError, ZettelId};
pub use workspace::{SiteEngine, Workspace, Zettelkasten};
