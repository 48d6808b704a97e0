use crate::model::{Format, ZettelId};
use std::path::Path;

/// Resolve the identifier a file claims under the given format.
///
/// The identifier is the file stem; directory components do not take part,
/// so `a/x.md` and `b/x.md` claim the same identifier. Returns `None` when
/// the extension does not belong to `format` or the stem is not a valid
/// identifier.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use zettel_core::identity::resolve_zettel_id;
/// use zettel_core::model::{Format, ZettelId};
///
/// assert_eq!(
///     resolve_zettel_id(Format::Markdown, Path::new("notes/2011401.md")),
///     Some(ZettelId::new("2011401"))
/// );
/// assert_eq!(resolve_zettel_id(Format::Org, Path::new("2011401.md")), None);
/// assert_eq!(resolve_zettel_id(Format::Markdown, Path::new(".hidden.md")), None);
/// ```
pub fn resolve_zettel_id(format: Format, path: &Path) -> Option<ZettelId> {
    if path.extension()? != format.extension() {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if is_valid_id(stem) {
        Some(ZettelId::new(stem))
    } else {
        None
    }
}

/// Grammar shared by file stems and link targets.
pub fn is_valid_id(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('.')
        && s.chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_and_nested() {
        assert_eq!(
            resolve_zettel_id(Format::Markdown, Path::new("note.md")),
            Some(ZettelId::new("note"))
        );
        assert_eq!(
            resolve_zettel_id(Format::Markdown, Path::new("a/b/note.md")),
            Some(ZettelId::new("note"))
        );
        assert_eq!(
            resolve_zettel_id(Format::Org, Path::new("my note.org")),
            Some(ZettelId::new("my note"))
        );
    }

    #[test]
    fn test_resolve_rejects_foreign_extension() {
        assert_eq!(resolve_zettel_id(Format::Markdown, Path::new("note.org")), None);
        assert_eq!(resolve_zettel_id(Format::Markdown, Path::new("note")), None);
        assert_eq!(resolve_zettel_id(Format::Markdown, Path::new("note.markdown")), None);
    }

    #[test]
    fn test_resolve_rejects_bad_stems() {
        assert_eq!(resolve_zettel_id(Format::Markdown, Path::new(".md")), None);
        assert_eq!(resolve_zettel_id(Format::Markdown, Path::new(".draft.md")), None);
        assert_eq!(resolve_zettel_id(Format::Markdown, Path::new("what?.md")), None);
        assert_eq!(resolve_zettel_id(Format::Markdown, Path::new("a#b.md")), None);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let path = Path::new("dir/2020-01-01.v2.md");
        let first = resolve_zettel_id(Format::Markdown, path);
        assert_eq!(first, Some(ZettelId::new("2020-01-01.v2")));
        assert_eq!(first, resolve_zettel_id(Format::Markdown, path));
    }
}
