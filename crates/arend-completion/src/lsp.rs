//
// lsp.rs
//
// Conversion of keyword candidates into LSP completion items.
//

use ropey::Rope;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, InsertTextFormat, Position, Range,
    TextEdit,
};

use crate::config::CompletionConfig;
use crate::insertion::{Candidate, Insertion};
use crate::syntax::TextRange;

/// Convert a byte offset into an LSP position (UTF-16 columns).
///
/// Offsets past the end clamp to the end of the document.
pub fn offset_to_position(rope: &Rope, offset: usize) -> Position {
    let char_idx = rope.byte_to_char(offset.min(rope.len_bytes()));
    let line = rope.char_to_line(char_idx);
    let line_start = rope.line_to_char(line);
    let column = rope.char_to_utf16_cu(char_idx) - rope.char_to_utf16_cu(line_start);
    Position::new(line as u32, column as u32)
}

fn to_lsp_range(rope: &Rope, range: TextRange) -> Range {
    Range::new(
        offset_to_position(rope, range.start),
        offset_to_position(rope, range.end),
    )
}

fn escape_snippet(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '$' | '}') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Snippet form of an insertion: the selection becomes tab stop 1, a cursor
/// short of the end becomes the final tab stop.
pub fn snippet_text(insertion: &Insertion) -> String {
    let text = &insertion.text;
    match insertion.selection {
        Some((start, end)) if start <= end && end <= text.len() => format!(
            "{}${{1:{}}}{}",
            escape_snippet(&text[..start]),
            escape_snippet(&text[start..end]),
            escape_snippet(&text[end..])
        ),
        _ if insertion.cursor < text.len() => format!(
            "{}$0{}",
            escape_snippet(&text[..insertion.cursor]),
            escape_snippet(&text[insertion.cursor..])
        ),
        _ => escape_snippet(text),
    }
}

/// Sort key putting higher priorities first, then `index` order among
/// equal priorities.
pub fn sort_text(priority: f64, index: usize) -> String {
    let bits = priority.to_bits();
    // Map the float onto an unsigned key with the same total order.
    let ordered = if bits >> 63 == 0 { bits | (1 << 63) } else { !bits };
    format!("{:016x}{:04}", u64::MAX - ordered, index)
}

/// Build completion items for `candidates`, which are expected in the
/// engine's order. `text` is the document the offsets refer to.
pub fn to_completion_items(
    text: &str,
    candidates: &[Candidate],
    config: &CompletionConfig,
) -> Vec<CompletionItem> {
    let rope = Rope::from_str(text);

    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let insertion = candidate.insertion();
            let (new_text, format) = if config.snippet_support {
                (snippet_text(&insertion), InsertTextFormat::SNIPPET)
            } else {
                (insertion.text, InsertTextFormat::PLAIN_TEXT)
            };

            CompletionItem {
                label: candidate.display_text.to_string(),
                kind: Some(CompletionItemKind::KEYWORD),
                filter_text: Some(candidate.keyword.to_string()),
                sort_text: Some(sort_text(candidate.priority, index)),
                insert_text_format: Some(format),
                text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(
                    to_lsp_range(&rope, candidate.replace),
                    new_text,
                ))),
                ..Default::default()
            }
        })
        .collect()
}
