use super::{query_from_target, NoteReader};
use crate::model::{Connection, ParsedNote};
use regex::Regex;
use std::sync::OnceLock;

/// Org-mode notes. Only the keywords and link syntax the graph needs are understood.
pub struct OrgReader;

impl NoteReader for OrgReader {
    fn parse(&self, text: &str) -> Result<ParsedNote, String> {
        parse_org(text)
    }
}

fn org_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // [[target]] or [[target][description]]
    RE.get_or_init(|| {
        Regex::new(r"\[\[([^\[\]\n]+)\](?:\[[^\[\]\n]*\])?\]").expect("valid org link regex")
    })
}

pub(crate) fn parse_org(text: &str) -> Result<ParsedNote, String> {
    let mut note = ParsedNote::default();
    let mut body_lines = Vec::new();
    // (kind, line the block opened on)
    let mut verbatim: Option<(&'static str, usize)> = None;

    for (lineno, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        let upper = trimmed.to_ascii_uppercase();

        if let Some((kind, _)) = verbatim {
            if block_delimiter(&upper, "#+END_") == Some(kind) {
                verbatim = None;
            }
            body_lines.push(line);
            continue;
        }

        if let Some(kind) = block_delimiter(&upper, "#+BEGIN_") {
            verbatim = Some((kind, lineno));
            body_lines.push(line);
            continue;
        }

        if let Some((key, value)) = keyword(trimmed) {
            match key.as_str() {
                "TITLE" => note.title = Some(value.to_string()),
                "DATE" => note.date = Some(value.to_string()),
                "FILETAGS" => {
                    note.tags = value
                        .split(':')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                _ => body_lines.push(line),
            }
            continue;
        }

        for caps in org_link_regex().captures_iter(line) {
            if let Some(query) = caps
                .get(1)
                .and_then(|m| query_from_target(m.as_str(), Connection::OrdinaryConnection))
            {
                note.queries.push(query);
            }
        }
        body_lines.push(line);
    }

    if let Some((kind, start)) = verbatim {
        return Err(format!(
            "Unterminated {} block opened on line {}",
            kind,
            start + 1
        ));
    }

    note.body = body_lines.join("\n").trim().to_string();
    Ok(note)
}

/// Kind of a verbatim block delimited by `prefix`, e.g. `#+BEGIN_SRC rust` -> `SRC`.
/// `line` must already be upper-cased.
fn block_delimiter(line: &str, prefix: &str) -> Option<&'static str> {
    let rest = line.strip_prefix(prefix)?;
    let kind = rest.split_whitespace().next().unwrap_or("");
    ["SRC", "EXAMPLE"].into_iter().find(|k| *k == kind)
}

/// `#+KEY: value`
fn keyword(line: &str) -> Option<(String, &str)> {
    let rest = line.strip_prefix("#+")?;
    let (key, value) = rest.split_once(':')?;
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key.to_ascii_uppercase(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ZettelId, ZettelQuery};

    #[test]
    fn test_parse_keywords() {
        let text = "#+TITLE: Org Note\n#+date: 2021-01-01\n#+FILETAGS: :a:b/c:\n\nBody text";
        let note = parse_org(text).unwrap();
        assert_eq!(note.title, Some("Org Note".to_string()));
        assert_eq!(note.date, Some("2021-01-01".to_string()));
        assert_eq!(note.tags, vec!["a".to_string(), "b/c".to_string()]);
        assert_eq!(note.body, "Body text");
    }

    #[test]
    fn test_parse_links() {
        let text = "See [[other]] and [[z:zettels?tag=a][all of a]] and [[https://x.org][web]].";
        let note = parse_org(text).unwrap();
        assert_eq!(
            note.queries,
            vec![
                ZettelQuery::Zettel(ZettelId::new("other"), Connection::OrdinaryConnection),
                ZettelQuery::Zettels {
                    tag: "a".to_string(),
                    connection: Connection::OrdinaryConnection
                },
            ]
        );
    }

    #[test]
    fn test_links_in_src_blocks_are_ignored() {
        let text = "#+BEGIN_SRC\n[[hidden]]\n#+END_SRC\n[[shown]]";
        let note = parse_org(text).unwrap();
        assert_eq!(
            note.queries,
            vec![ZettelQuery::Zettel(
                ZettelId::new("shown"),
                Connection::OrdinaryConnection
            )]
        );
    }

    #[test]
    fn test_unterminated_block_is_a_parse_error() {
        let err = parse_org("Intro\n#+begin_src rust\nfn main() {}").unwrap_err();
        assert_eq!(err, "Unterminated SRC block opened on line 2");
    }

    #[test]
    fn test_src_block_may_quote_org_blocks() {
        let text = "#+BEGIN_SRC org
#+BEGIN_EXAMPLE
[[quoted]]
#+END_EXAMPLE
#+END_SRC
[[after]]";
        let note = parse_org(text).unwrap();
        assert_eq!(
            note.queries,
            vec![ZettelQuery::Zettel(
                ZettelId::new("after"),
                Connection::OrdinaryConnection
            )]
        );
    }

    #[test]
    fn test_block_closes_only_on_matching_end() {
        let err = parse_org("#+BEGIN_EXAMPLE
#+END_SRC
[[inside]]").unwrap_err();
        assert_eq!(err, "Unterminated EXAMPLE block opened on line 1");

        let note = parse_org("#+begin_example
#+end_src
[[inside]]
#+end_example
[[out]]").unwrap();
        assert_eq!(
            note.queries,
            vec![ZettelQuery::Zettel(
                ZettelId::new("out"),
                Connection::OrdinaryConnection
            )]
        );
    }
}
