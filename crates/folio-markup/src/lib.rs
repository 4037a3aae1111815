//! Canonical markup for Folio documents.
//!
//! Parsing runs in four stages, each total over arbitrary input:
//! - `lexer`: tag soup to tokens
//! - `tree`: tokens to an element tree, recovering from bad nesting
//! - `sanitize`: element and attribute allow-list
//! - `reader`: element tree to [`Document`]
//!
//! [`serialize`] writes the canonical form back out. Parsing that output
//! yields the same document, and serializing again yields the same bytes.

pub mod lexer;
pub mod reader;
pub mod sanitize;
pub mod store;
pub mod tree;
pub mod writer;

use folio_core::Document;

pub use store::{DocumentStore, FileStore};
pub use writer::{serialize, serialize_page};

/// Parse markup into a document. Never fails.
pub fn parse(text: &str) -> Document {
    let tokens = lexer::tokenize(text);
    let nodes = sanitize::sanitize(tree::build(tokens));
    reader::read(nodes)
}

/// Reformat markup into canonical form.
pub fn canonicalize(text: &str) -> String {
    serialize(&parse(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Block, MediaKind};

    #[test]
    fn test_parse_ignores_page_envelope() {
        let doc = Document::new(vec![Block::heading(1, "Home"), Block::paragraph("Hi.")]);
        let page = serialize_page(&doc, "");
        assert_eq!(parse(&page), doc);
        assert_eq!(parse(&page).title().as_deref(), Some("Home"));
    }

    #[test]
    fn test_canonicalize_messy_markup() {
        let input = "<html><head><title>x</title></head><body>\n\
            <H1>Trip</h1><div><p>Day one. We <i>walked</b>.\n\
            <img src=\"https://cdn.example/assets/a1b2c3d4e5f6-1600.jpg\" width=5>\
            <video src=\"assets/0123456789ab-540p.mp4\"></video>\n\
            <ul><li>a<li>b</ul></body></html>";
        let expected = concat!(
            "<h1>\n    Trip\n</h1>\n",
            "<p>\n    Day one.\n    We <em>walked.</em>\n</p>\n",
            "<img src=\"assets/a1b2c3d4e5f6.jpg\">",
            "<video src=\"assets/0123456789ab.mp4\" poster=\"assets/0123456789ab-poster.jpg\" controls></video>\n",
            "<ul>\n    <li>a</li>\n    <li>b</li>\n</ul>\n",
        );
        let out = canonicalize(input);
        assert_eq!(out, expected);
        assert_eq!(canonicalize(&out), out);

        let doc = parse(&out);
        let kinds: Vec<_> = doc.media().map(|(_, _, m)| m.kind).collect();
        assert_eq!(kinds, vec![MediaKind::Image, MediaKind::Video]);
    }
}
