use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Canonical note identifier, derived from a note's file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZettelId(pub String);

impl ZettelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZettelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supported note formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Markdown,
    Org,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Markdown, Format::Org];

    /// File extension (without the dot) claimed by this format
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Markdown => "md",
            Format::Org => "org",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Markdown => f.write_str("markdown"),
            Format::Org => f.write_str("org"),
        }
    }
}

/// A discovered note file, decoded but not yet parsed.
/// `path` is relative to the notes directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNote {
    pub format: Format,
    pub path: PathBuf,
    pub text: String,
}

/// How two zettels are connected by a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connection {
    /// `[[[id]]]`: the target is a branch of the source
    Folgezettel,
    /// `[[id]]`
    OrdinaryConnection,
}

impl Connection {
    /// Folgezettel dominates when two links join the same pair.
    pub fn merge(self, other: Connection) -> Connection {
        if self == Connection::Folgezettel || other == Connection::Folgezettel {
            Connection::Folgezettel
        } else {
            Connection::OrdinaryConnection
        }
    }
}

/// Query embedded in a note's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZettelQuery {
    /// Link to a single zettel
    Zettel(ZettelId, Connection),
    /// Link to every zettel carrying a matching tag
    Zettels { tag: String, connection: Connection },
    /// A `z:` URI that could not be understood
    Invalid(String),
}

/// Structured result of a reader's parse, before identity is attached
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedNote {
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<String>,
    pub body: String,
    pub queries: Vec<ZettelQuery>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zettel {
    pub id: ZettelId,
    pub format: Format,
    pub path: PathBuf,
    pub title: String,
    pub tags: Vec<String>,
    pub date: Option<String>,
    pub body: String,
    pub queries: Vec<ZettelQuery>,
    /// SHA-256 of the source text
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryResultError {
    NoSuchZettel(ZettelId),
    InvalidQuery(String),
}

impl fmt::Display for QueryResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResultError::NoSuchZettel(id) => write!(f, "Zettel '{}' not found", id),
            QueryResultError::InvalidQuery(uri) => write!(f, "Unsupported query: {}", uri),
        }
    }
}

/// Per-identifier error. Exactly one kind is kept per identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZettelError {
    ParseError(String),
    /// Never empty
    QueryResultErrors(Vec<QueryResultError>),
    /// Colliding paths in discovery order, at least two
    AmbiguousFiles(Vec<PathBuf>),
    /// The identifier's output path belongs to a built-in page
    ReservedIdentifier(ZettelId),
}

impl ZettelError {
    /// Human-readable messages; one per underlying problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ZettelError::ParseError(msg) => vec![format!("Parse error: {}", msg)],
            ZettelError::QueryResultErrors(errs) => errs.iter().map(|e| e.to_string()).collect(),
            ZettelError::AmbiguousFiles(paths) => {
                let mut msg = String::from("Multiple files use the same identifier:");
                for path in paths {
                    msg.push('\n');
                    msg.push_str(&path.display().to_string());
                }
                vec![msg]
            }
            ZettelError::ReservedIdentifier(id) => vec![format!(
                "Identifier '{}' is reserved for a built-in page",
                id
            )],
        }
    }
}

pub type ErrorMap = BTreeMap<ZettelId, ZettelError>;
