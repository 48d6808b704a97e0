use super::{extract_wiki_queries, NoteReader};
use crate::model::ParsedNote;
use pulldown_cmark::{Event, HeadingLevel, MetadataBlockKind, Options, Parser, Tag, TagEnd};
use serde_json::Value;

/// Markdown notes with optional YAML front matter
pub struct MarkdownReader;

impl NoteReader for MarkdownReader {
    fn parse(&self, text: &str) -> Result<ParsedNote, String> {
        parse_markdown(text)
    }
}

pub(crate) fn parse_markdown(text: &str) -> Result<ParsedNote, String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);

    let parser = Parser::new_ext(text, options);

    let mut note = ParsedNote::default();
    let mut heading_title = None;
    let mut content_start_offset = 0;

    let mut in_frontmatter = false;
    let mut frontmatter_content = String::new();

    let mut in_code_block = false;
    let mut in_h1 = false;
    let mut h1_text = String::new();

    // Prose of the current block; links are matched once the block closes
    // since pulldown splits bracketed text into several events.
    let mut prose = String::new();

    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::MetadataBlock(MetadataBlockKind::YamlStyle)) => {
                in_frontmatter = true;
            }
            Event::End(TagEnd::MetadataBlock(MetadataBlockKind::YamlStyle)) => {
                in_frontmatter = false;
                apply_frontmatter(&frontmatter_content, &mut note)?;
                content_start_offset = range.end;
            }

            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
            }

            Event::Start(Tag::Heading { level, .. }) => {
                if level == HeadingLevel::H1 && heading_title.is_none() {
                    in_h1 = true;
                    h1_text.clear();
                }
            }
            Event::End(TagEnd::Heading(..)) => {
                if in_h1 {
                    let trimmed = h1_text.trim();
                    if !trimmed.is_empty() {
                        heading_title = Some(trimmed.to_string());
                    }
                    in_h1 = false;
                }
                flush_prose(&mut prose, &mut note);
            }

            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::TableCell) => {
                flush_prose(&mut prose, &mut note);
            }

            Event::Text(cow_str) => {
                let chunk = cow_str.as_ref();
                if in_frontmatter {
                    frontmatter_content.push_str(chunk);
                } else if !in_code_block {
                    if in_h1 {
                        h1_text.push_str(chunk);
                    }
                    prose.push_str(chunk);
                }
            }
            Event::Code(_) => {
                // Inline code never carries links; keep it from gluing neighbours together.
                prose.push(' ');
            }
            Event::SoftBreak | Event::HardBreak => {
                prose.push('\n');
            }
            _ => {}
        }
    }
    flush_prose(&mut prose, &mut note);

    if note.title.is_none() {
        note.title = heading_title;
    }
    note.body = text[content_start_offset..].trim_start().to_string();
    Ok(note)
}

fn flush_prose(prose: &mut String, note: &mut ParsedNote) {
    if !prose.is_empty() {
        note.queries.extend(extract_wiki_queries(prose));
        prose.clear();
    }
}

fn apply_frontmatter(content: &str, note: &mut ParsedNote) -> Result<(), String> {
    let json = serde_yaml::from_str::<Value>(content)
        .map_err(|e| format!("Invalid YAML front matter: {e}"))?;

    let map = match json {
        Value::Object(map) => map,
        Value::Null => return Ok(()),
        _ => return Err("YAML front matter must be a mapping".to_string()),
    };

    if let Some(t) = map.get("title").and_then(|v| v.as_str()) {
        note.title = Some(t.to_string());
    }
    note.date = map.get("date").and_then(scalar_to_string);
    note.tags = match map.get("tags") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(other).into_iter().collect(),
        None => Vec::new(),
    };
    Ok(())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
