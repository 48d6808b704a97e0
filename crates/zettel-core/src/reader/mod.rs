use crate::identity::is_valid_id;
use crate::model::{Connection, Format, ParsedNote, ZettelId, ZettelQuery};
use regex::Regex;
use std::sync::OnceLock;

mod markdown;
mod org;

pub use markdown::MarkdownReader;
pub use org::OrgReader;

/// Reader plugin: turns the raw text of one note format into structured content.
/// Implementations must be pure functions of the text.
pub trait NoteReader: Send + Sync {
    /// Parse a note; the error string is reported verbatim as a parse error.
    fn parse(&self, text: &str) -> Result<ParsedNote, String>;
}

/// The reader registered for each supported format
pub fn reader_for(format: Format) -> &'static dyn NoteReader {
    match format {
        Format::Markdown => &MarkdownReader,
        Format::Org => &OrgReader,
    }
}

fn wiki_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[\[\[([^\[\]\n]+)\]\]\]|\[\[([^\[\]\n]+)\]\]").expect("valid link regex")
    })
}

/// Extract queries from prose: `[[id]]`, `[[[id]]]` and `[[z:...]]`.
pub(crate) fn extract_wiki_queries(text: &str) -> Vec<ZettelQuery> {
    wiki_link_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            if let Some(m) = caps.get(1) {
                query_from_target(m.as_str(), Connection::Folgezettel)
            } else {
                caps.get(2)
                    .and_then(|m| query_from_target(m.as_str(), Connection::OrdinaryConnection))
            }
        })
        .collect()
}

/// Interpret a link target. Targets that are neither identifiers nor `z:`
/// URIs are plain links and yield no query.
pub(crate) fn query_from_target(raw: &str, connection: Connection) -> Option<ZettelQuery> {
    // [[target|label]]
    let target = raw.split('|').next().unwrap_or(raw).trim();

    if let Some(uri) = target.strip_prefix("z:") {
        let query = parse_z_uri(uri, connection)
            .unwrap_or_else(|| ZettelQuery::Invalid(target.to_string()));
        return Some(query);
    }

    if is_valid_id(target) {
        Some(ZettelQuery::Zettel(ZettelId::new(target), connection))
    } else {
        None
    }
}

fn parse_z_uri(uri: &str, connection: Connection) -> Option<ZettelQuery> {
    let (kind, query) = match uri.split_once('?') {
        Some((kind, query)) => (kind, query),
        None => (uri, ""),
    };
    match kind {
        "zettels" => {
            let tag = query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == "tag")
                .map(|(_, value)| value.to_string())?;
            if tag.is_empty() {
                return None;
            }
            Some(ZettelQuery::Zettels { tag, connection })
        }
        _ => None,
    }
}

/// Does `tag` match `pattern`? A pattern ending in `/**` also matches descendants.
pub fn tag_matches(pattern: &str, tag: &str) -> bool {
    match pattern.strip_suffix("/**") {
        Some(prefix) => {
            tag == prefix
                || (tag.len() > prefix.len()
                    && tag.starts_with(prefix)
                    && tag.as_bytes()[prefix.len()] == b'/')
        }
        None => tag == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_and_folgezettel() {
        let queries = extract_wiki_queries("See [[a]] then [[[b]]] and [[c|Label]].");
        assert_eq!(
            queries,
            vec![
                ZettelQuery::Zettel(ZettelId::new("a"), Connection::OrdinaryConnection),
                ZettelQuery::Zettel(ZettelId::new("b"), Connection::Folgezettel),
                ZettelQuery::Zettel(ZettelId::new("c"), Connection::OrdinaryConnection),
            ]
        );
    }

    #[test]
    fn test_extract_tag_query() {
        let queries = extract_wiki_queries("[[z:zettels?tag=science/**]] [[[z:zettels?tag=x]]]");
        assert_eq!(
            queries,
            vec![
                ZettelQuery::Zettels {
                    tag: "science/**".to_string(),
                    connection: Connection::OrdinaryConnection
                },
                ZettelQuery::Zettels {
                    tag: "x".to_string(),
                    connection: Connection::Folgezettel
                },
            ]
        );
    }

    #[test]
    fn test_invalid_z_uri() {
        let queries = extract_wiki_queries("[[z:unknown]] [[z:zettels]]");
        assert_eq!(
            queries,
            vec![
                ZettelQuery::Invalid("z:unknown".to_string()),
                ZettelQuery::Invalid("z:zettels".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_id_targets_are_ignored() {
        assert!(extract_wiki_queries("[[http://example.com]] [[a/b]]").is_empty());
    }

    #[test]
    fn test_tag_matches() {
        assert!(tag_matches("science", "science"));
        assert!(!tag_matches("science", "science/physics"));
        assert!(tag_matches("science/**", "science/physics"));
        assert!(tag_matches("science/**", "science"));
        assert!(!tag_matches("science/**", "sciences"));
    }
}
