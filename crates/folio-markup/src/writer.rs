//! Canonical text form of a document.

use std::fmt::Write as _;

use folio_assets::{canonical_path, poster_path};
use folio_core::{Block, Document, Inline, InlineRun, List, MediaItem, MediaKind, MediaRow};
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::reader::normalize;

const INDENT: &str = "    ";

/// Serialize `doc` to its canonical text.
///
/// Inline runs are normalized on the way out and blocks left empty by that
/// are skipped, so the output always parses back to the same text.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for block in &doc.blocks {
        write_block(&mut out, block);
    }
    out
}

/// Serialize `doc` as a full page: viewer bootstrap, then the document.
///
/// `root` is the relative prefix from the page to the site root, such as
/// `"../"`, and is empty for the top-level page.
pub fn serialize_page(doc: &Document, root: &str) -> String {
    let mut out = format!(
        "<!DOCTYPE html><script src=\"{root}_script/view.js\"></script>\
         <noscript><p><a href=\"{root}sitemap/index.html\">Sitemap</a></p></noscript>\n"
    );
    out.push_str(&serialize(doc));
    out
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Heading(heading) => {
            let tag = format!("h{}", heading.level.clamp(1, 6));
            write_text_block(out, &tag, &heading.inline);
        }
        Block::Paragraph(inline) => write_text_block(out, "p", inline),
        Block::List(list) => {
            if write_list(out, list, 0) {
                out.push('\n');
            }
        }
        Block::MediaRow(row) => write_row(out, row),
    }
}

fn write_text_block(out: &mut String, tag: &str, inline: &InlineRun) {
    let inline = normalize(inline.clone());
    if inline.is_empty() {
        return;
    }
    let _ = write!(out, "<{tag}>\n{INDENT}");
    write_inline(out, &inline, true);
    let _ = writeln!(out, "\n</{tag}>");
}

fn write_inline(out: &mut String, run: &[Inline], wrap: bool) {
    for span in run {
        match span {
            Inline::Text(text) => {
                let text = encode_text(text);
                if wrap {
                    out.push_str(&wrap_sentences(&text));
                } else {
                    out.push_str(&text);
                }
            }
            Inline::Link { href, children } => {
                let _ = write!(out, "<a href=\"{}\">", encode_double_quoted_attribute(href));
                write_inline(out, children, wrap);
                out.push_str("</a>");
            }
            Inline::Bold { children } => {
                out.push_str("<strong>");
                write_inline(out, children, wrap);
                out.push_str("</strong>");
            }
            Inline::Italic { children } => {
                out.push_str("<em>");
                write_inline(out, children, wrap);
                out.push_str("</em>");
            }
        }
    }
}

/// Start each sentence on its own indented line.
///
/// A sentence break is `.`, `!` or `?`, exactly one space, then an ASCII
/// uppercase letter.
fn wrap_sentences(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for i in 1..bytes.len().saturating_sub(1) {
        if bytes[i] == b' '
            && matches!(bytes[i - 1], b'.' | b'!' | b'?')
            && bytes[i + 1].is_ascii_uppercase()
        {
            out.push_str(&text[last..i]);
            out.push('\n');
            out.push_str(INDENT);
            last = i + 1;
        }
    }
    out.push_str(&text[last..]);
    out
}

fn pad(out: &mut String, width: usize) {
    out.extend(std::iter::repeat(' ').take(width));
}

/// Write `list` with its items at `indent + 4` spaces. Returns false when
/// nothing was written because no item has content.
fn write_list(out: &mut String, list: &List, indent: usize) -> bool {
    let mut body = String::new();
    for item in &list.items {
        let inline = normalize(item.inline.clone());
        let mut nested = String::new();
        let has_nested = item
            .nested
            .as_ref()
            .is_some_and(|list| write_list(&mut nested, list, indent + 8));
        if inline.is_empty() && !has_nested {
            continue;
        }

        pad(&mut body, indent + 4);
        body.push_str("<li>");
        write_inline(&mut body, &inline, false);
        if has_nested {
            body.push('\n');
            pad(&mut body, indent + 8);
            body.push_str(&nested);
            body.push('\n');
            pad(&mut body, indent + 4);
        }
        body.push_str("</li>\n");
    }
    if body.is_empty() {
        return false;
    }

    out.push_str("<ul>\n");
    out.push_str(&body);
    pad(out, indent);
    out.push_str("</ul>");
    true
}

fn write_row(out: &mut String, row: &MediaRow) {
    if row.is_empty() {
        return;
    }
    for item in &row.items {
        match item.kind {
            MediaKind::Image => write_image(out, item),
            MediaKind::Video => write_video(out, item),
        }
    }
    out.push('\n');
}

fn write_common(out: &mut String, item: &MediaItem) {
    if !item.alt.is_empty() {
        let _ = write!(out, " alt=\"{}\"", encode_double_quoted_attribute(&item.alt));
    }
    if let Some(fit) = item.fit.as_attr() {
        let _ = write!(out, " data-fit=\"{fit}\"");
    }
}

fn write_dimensions(out: &mut String, item: &MediaItem) {
    if let Some(dims) = item.dimensions.filter(|d| d.width > 0 && d.height > 0) {
        let _ = write!(out, " data-width=\"{}\" data-height=\"{}\"", dims.width, dims.height);
    }
}

fn write_image(out: &mut String, item: &MediaItem) {
    let _ = write!(out, "<img src=\"{}\"", canonical_path(&item.asset_id, MediaKind::Image));
    write_common(out, item);

    let t = &item.transform;
    if t.rotate_degrees() != 0 {
        let _ = write!(out, " data-rotate=\"{}\"", t.rotate_degrees());
    }
    if t.zoom_percent() != 100 {
        let _ = write!(out, " data-zoom=\"{}\"", t.zoom_percent());
    }
    if t.pan_x_percent() != 0 {
        let _ = write!(out, " data-pan-x=\"{}\"", t.pan_x_percent());
    }
    if t.pan_y_percent() != 0 {
        let _ = write!(out, " data-pan-y=\"{}\"", t.pan_y_percent());
    }
    write_dimensions(out, item);
    out.push('>');
}

fn write_video(out: &mut String, item: &MediaItem) {
    let _ = write!(
        out,
        "<video src=\"{}\" poster=\"{}\"",
        canonical_path(&item.asset_id, MediaKind::Video),
        poster_path(&item.asset_id)
    );
    write_common(out, item);
    write_dimensions(out, item);
    if let Some(seconds) = item.duration_seconds.filter(|d| d.is_finite() && *d >= 0.0) {
        let _ = write!(out, " data-duration=\"{seconds}\"");
    }
    out.push_str(" controls></video>");
}
