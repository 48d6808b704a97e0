use crate::model::{ParsedNote, RawNote, Zettel, ZettelId};
use sha2::{Digest, Sha256};

/// Assembler responsible for converting a reader's ParsedNote into a Zettel.
pub struct NoteAssembler;

impl NoteAssembler {
    /// Assembles a Zettel from a ParsedNote.
    ///
    /// # Arguments
    /// * `id` - The identifier resolved for the note's file.
    /// * `raw` - The loaded file the note was parsed from.
    /// * `parsed` - The reader's output for `raw.text`.
    pub fn assemble(id: ZettelId, raw: &RawNote, parsed: ParsedNote) -> Zettel {
        let title = parsed
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| id.to_string());

        Zettel {
            title,
            format: raw.format,
            path: raw.path.clone(),
            tags: parsed.tags,
            date: parsed.date,
            body: parsed.body,
            queries: parsed.queries,
            digest: compute_digest(&raw.text),
            id,
        }
    }
}

pub fn compute_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text);
    format!("{:x}", hasher.finalize())
}
