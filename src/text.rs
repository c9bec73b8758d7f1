//! Flattening HTML documents into plain text

use scraper::{Html, Node};

use crate::backend::collapse_whitespace;

const HIDDEN_ELEMENTS: &[&str] = &["script", "style"];

/// Visible text of `html`, whitespace-collapsed and cut to `max_chars` characters
///
/// `script` and `style` contents are dropped. Text nodes are joined with a
/// space so words from adjacent cells or paragraphs stay apart.
pub fn visible_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            raw.push_str(text);
            raw.push(' ');
        }
    }

    truncate_chars(collapse_whitespace(&raw), max_chars)
}

/// Cut `text` to at most `max_chars` characters, respecting char boundaries
pub fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}
